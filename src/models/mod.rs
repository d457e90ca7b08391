pub mod application;
pub mod question;
