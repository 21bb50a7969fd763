pub mod compose;
pub mod init;
pub mod layout;
pub mod records;
pub mod render;
pub mod upload;
