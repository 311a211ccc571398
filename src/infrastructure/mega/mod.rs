pub mod fetcher;

pub use fetcher::{FetchError, MegadlFetcher, RemoteFetcher};
