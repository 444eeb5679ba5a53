// Application layer - Dashboard use cases and event coordination
pub mod coordinator;
pub mod dashboard_api;
pub mod dashboard_service;
pub mod debounce;
pub mod error;
pub mod events;
pub mod widget_factory;
