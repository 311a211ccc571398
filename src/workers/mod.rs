pub mod dispatcher;
pub mod relay;
pub mod scratch;
