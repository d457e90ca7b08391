pub mod application_service;
pub mod identity_service;
pub mod notify_service;
