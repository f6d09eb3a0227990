pub mod document;
pub mod line;
pub mod notification;
pub mod user;
