pub mod chat;
pub mod session;
pub mod settings;
pub mod upload;
