// Presentation layer - HTTP surface for the host dashboard
pub mod app_state;
pub mod handlers;
