// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod grid_layout;
pub mod http_api;
