// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::events::EventBus;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub bus: EventBus,
    /// Whether the "dashboard is empty" message is shown
    pub empty_banner: watch::Receiver<bool>,
    pub widget_template: String,
}
