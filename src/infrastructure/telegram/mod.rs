pub mod client;

pub use client::{MediaKind, TelegramClient, TelegramError};
