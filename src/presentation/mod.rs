// Presentation layer - Local HTTP control surface for UI gestures
pub mod app_state;
pub mod handlers;
pub mod routes;
