// Remote API trait for dashboard persistence
use crate::application::error::ApiError;
use crate::domain::arrangement::Arrangement;
use crate::domain::dashboard::DashboardId;
use crate::domain::widget::WidgetId;
use async_trait::async_trait;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Create a widget of the given type and return the id the server assigned
    async fn create_widget(&self, dashboard: &DashboardId, type_id: &str) -> Result<WidgetId, ApiError>;

    async fn delete_widget(&self, dashboard: &DashboardId, widget: &WidgetId) -> Result<(), ApiError>;

    async fn delete_dashboard(&self, dashboard: &DashboardId) -> Result<(), ApiError>;

    /// Overwrite all widget positions of the dashboard
    async fn save_arrangement(
        &self,
        dashboard: &DashboardId,
        arrangement: &Arrangement,
    ) -> Result<(), ApiError>;
}
