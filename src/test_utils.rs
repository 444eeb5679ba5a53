// Shared test fixtures
use crate::application::dashboard_api::DashboardApi;
use crate::application::dashboard_service::DashboardService;
use crate::application::error::ApiError;
use crate::application::widget_factory::WidgetFactory;
use crate::domain::arrangement::{Arrangement, ArrangementEntry};
use crate::domain::dashboard::{DashboardId, WidgetSize};
use crate::domain::widget::WidgetId;
use crate::infrastructure::grid_layout::GridLayout;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateWidget,
    DeleteWidget,
    DeleteDashboard,
    SaveArrangement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateWidget { dashboard: String, type_id: String },
    DeleteWidget { dashboard: String, widget: String },
    DeleteDashboard { dashboard: String },
    SaveArrangement {
        dashboard: String,
        entries: Vec<ArrangementEntry>,
    },
}

/// Recording `DashboardApi` with scripted ids and one-shot failures.
#[derive(Default)]
pub struct StubApi {
    calls: Mutex<Vec<ApiCall>>,
    ids: Mutex<VecDeque<String>>,
    failures: Mutex<Vec<(Operation, ApiError)>>,
}

impl StubApi {
    pub fn with_ids<const N: usize>(ids: [&str; N]) -> Self {
        let stub = Self::default();
        stub.ids
            .lock()
            .unwrap()
            .extend(ids.iter().map(|id| id.to_string()));
        stub
    }

    /// The next call of `op` fails with `error`
    pub fn fail_once(&self, op: Operation, error: ApiError) {
        self.failures.lock().unwrap().push((op, error));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saves(&self) -> Vec<Vec<ArrangementEntry>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::SaveArrangement { entries, .. } => Some(entries),
                _ => None,
            })
            .collect()
    }

    fn record(&self, op: Operation, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(o, _)| *o == op) {
            Some(idx) => Err(failures.remove(idx).1),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DashboardApi for StubApi {
    async fn create_widget(&self, dashboard: &DashboardId, type_id: &str) -> Result<WidgetId, ApiError> {
        self.record(
            Operation::CreateWidget,
            ApiCall::CreateWidget {
                dashboard: dashboard.to_string(),
                type_id: type_id.to_string(),
            },
        )?;
        let mut ids = self.ids.lock().unwrap();
        let id = ids
            .pop_front()
            .unwrap_or_else(|| format!("w{}", self.calls.lock().unwrap().len()));
        Ok(WidgetId::new(id))
    }

    async fn delete_widget(&self, dashboard: &DashboardId, widget: &WidgetId) -> Result<(), ApiError> {
        self.record(
            Operation::DeleteWidget,
            ApiCall::DeleteWidget {
                dashboard: dashboard.to_string(),
                widget: widget.to_string(),
            },
        )
    }

    async fn delete_dashboard(&self, dashboard: &DashboardId) -> Result<(), ApiError> {
        self.record(
            Operation::DeleteDashboard,
            ApiCall::DeleteDashboard {
                dashboard: dashboard.to_string(),
            },
        )
    }

    async fn save_arrangement(
        &self,
        dashboard: &DashboardId,
        arrangement: &Arrangement,
    ) -> Result<(), ApiError> {
        self.record(
            Operation::SaveArrangement,
            ApiCall::SaveArrangement {
                dashboard: dashboard.to_string(),
                entries: arrangement.entries().to_vec(),
            },
        )
    }
}

/// Dashboard "d1" on a 4-column grid with default widget size 1x4
pub fn dashboard_with(api: Arc<StubApi>) -> (DashboardService, Arc<GridLayout>) {
    let layout = Arc::new(GridLayout::new(4));
    let id = DashboardId::new("d1");
    let factory = WidgetFactory::new(
        id.clone(),
        "ViewWidget-Start?DashboardID=${dashboard}&WidgetID=${widget}".to_string(),
        "ViewWidget-Configure?DashboardID=${dashboard}&WidgetID=${widget}".to_string(),
        layout.clone(),
    );
    let dashboard = DashboardService::new(id, api, layout.clone(), factory, WidgetSize::new(1, 4));
    (dashboard, layout)
}
