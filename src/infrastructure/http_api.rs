// HTTP implementation of the dashboard API (form posts)
use crate::application::dashboard_api::DashboardApi;
use crate::application::error::ApiError;
use crate::domain::arrangement::Arrangement;
use crate::domain::dashboard::DashboardId;
use crate::domain::widget::WidgetId;
use async_trait::async_trait;
use serde::Deserialize;

const ADD_WIDGET: &str = "ViewDashboard-AddWidget";
const DELETE_WIDGET: &str = "ViewDashboard-DeleteWidget";
const DELETE_DASHBOARD: &str = "ViewDashboard-Delete";
const SAVE_ARRANGEMENT: &str = "ViewDashboard-SaveDashboardArrangement";

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AddedWidget {
    id: WidgetId,
}

impl HttpDashboardApi {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, action: &str, fields: &[(&str, &str)]) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/{}", self.base_url, action);
        let mut form = Vec::with_capacity(fields.len() + 1);
        form.push(("SynchronizerToken", self.token.as_str()));
        form.extend_from_slice(fields);

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} answered with status {}", action, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn create_widget(&self, dashboard: &DashboardId, type_id: &str) -> Result<WidgetId, ApiError> {
        let response = self
            .post(
                ADD_WIDGET,
                &[("DashboardID", dashboard.as_str()), ("WidgetTypeID", type_id)],
            )
            .await?;

        let added = response
            .json::<AddedWidget>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(added.id)
    }

    async fn delete_widget(&self, dashboard: &DashboardId, widget: &WidgetId) -> Result<(), ApiError> {
        self.post(
            DELETE_WIDGET,
            &[("DashboardID", dashboard.as_str()), ("WidgetID", widget.as_str())],
        )
        .await?;
        Ok(())
    }

    async fn delete_dashboard(&self, dashboard: &DashboardId) -> Result<(), ApiError> {
        self.post(DELETE_DASHBOARD, &[("DashboardID", dashboard.as_str())])
            .await?;
        Ok(())
    }

    async fn save_arrangement(
        &self,
        dashboard: &DashboardId,
        arrangement: &Arrangement,
    ) -> Result<(), ApiError> {
        let widget_data = arrangement
            .to_json()
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        self.post(
            SAVE_ARRANGEMENT,
            &[
                ("DashboardID", dashboard.as_str()),
                ("WidgetData", widget_data.as_str()),
            ],
        )
        .await?;
        Ok(())
    }
}
