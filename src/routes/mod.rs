pub mod application_routes;
pub mod health;
