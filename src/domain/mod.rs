// Domain layer - Dashboard and widget models
pub mod arrangement;
pub mod dashboard;
pub mod layout;
pub mod widget;
