pub mod mega;
pub mod telegram;
