pub mod task_key;
pub mod webhook_token;
