pub mod task;
pub mod webhook;
