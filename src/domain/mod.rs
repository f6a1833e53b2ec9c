pub mod conversation;
pub mod stream;
pub mod types;
