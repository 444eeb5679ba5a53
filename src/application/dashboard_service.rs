// Dashboard service - Client-side dashboard state synchronized with the server
use crate::application::dashboard_api::DashboardApi;
use crate::application::error::{ApiError, DashboardError};
use crate::application::widget_factory::WidgetFactory;
use crate::domain::arrangement::Arrangement;
use crate::domain::dashboard::{DashboardId, WidgetSize};
use crate::domain::layout::{LayoutEngine, Placement};
use crate::domain::widget::{Coords, Widget, WidgetData, WidgetId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The dashboard of the current page session.
///
/// Local state only changes after the corresponding server call succeeded,
/// so a failed call never leaves a partial add or removal behind.
pub struct DashboardService {
    id: DashboardId,
    api: Arc<dyn DashboardApi>,
    layout: Arc<dyn LayoutEngine>,
    factory: WidgetFactory,
    default_size: WidgetSize,
    widgets: RwLock<HashMap<WidgetId, Widget>>,
}

impl DashboardService {
    pub fn new(
        id: DashboardId,
        api: Arc<dyn DashboardApi>,
        layout: Arc<dyn LayoutEngine>,
        factory: WidgetFactory,
        default_size: WidgetSize,
    ) -> Self {
        Self {
            id,
            api,
            layout,
            factory,
            default_size,
            widgets: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &DashboardId {
        &self.id
    }

    pub fn layout(&self) -> &Arc<dyn LayoutEngine> {
        &self.layout
    }

    pub fn factory(&self) -> &WidgetFactory {
        &self.factory
    }

    /// Delete the dashboard on the server. The local object stays untouched,
    /// the caller is expected to navigate away.
    pub async fn remove(&self) -> Result<(), ApiError> {
        tracing::info!("Deleting dashboard {}", self.id);
        self.api.delete_dashboard(&self.id).await.inspect_err(|e| {
            tracing::warn!("Deleting dashboard {} failed: {}", self.id, e);
        })
    }

    /// Add a widget to the dashboard.
    ///
    /// With `persist` the widget is created on the server first and highlighted
    /// as new; without it the widget is only displayed, which is how already
    /// persisted widgets are hydrated on load.
    pub async fn add_widget(
        &self,
        mut data: WidgetData,
        coords: Coords,
        persist: bool,
    ) -> Result<Widget, DashboardError> {
        let widget = if persist {
            tracing::debug!("Creating widget of type {} on {}", data.type_id, self.id);
            let id = self
                .api
                .create_widget(&self.id, &data.type_id)
                .await
                .inspect_err(|e| {
                    tracing::warn!("Creating widget of type {} failed: {}", data.type_id, e);
                })?;
            data.id = Some(id.clone());

            let mut widget = self.factory.build(id, data);
            widget.set_highlighted(true);
            widget
        } else {
            let id = data.id.clone().ok_or(DashboardError::MissingWidgetId)?;
            self.factory.build(id, data)
        };

        let placement = self.placement(coords);
        let mut widgets = self.widgets.write().await;
        if widgets.contains_key(widget.id()) {
            tracing::warn!("Widget {} was already laid out, replacing it", widget.id());
            self.layout.remove_widget(widget.id());
        }
        let geometry = self.layout.add_widget(widget.id(), placement);
        widgets.insert(widget.id().clone(), widget.clone());

        tracing::debug!("Widget {} placed at {:?}", widget.id(), geometry);
        Ok(widget)
    }

    /// Remove a widget on the server, then detach it from the layout and forget it.
    pub async fn remove_widget(&self, id: &WidgetId) -> Result<(), DashboardError> {
        if !self.widgets.read().await.contains_key(id) {
            return Err(DashboardError::UnknownWidget(id.clone()));
        }

        self.api
            .delete_widget(&self.id, id)
            .await
            .inspect_err(|e| tracing::warn!("Deleting widget {} failed: {}", id, e))?;

        let mut widgets = self.widgets.write().await;
        if !self.layout.remove_widget(id) {
            tracing::debug!("Widget {} had no layout node", id);
        }
        widgets.remove(id);
        Ok(())
    }

    pub async fn is_empty(&self) -> bool {
        self.widgets.read().await.is_empty()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.widgets.read().await.len()
    }

    pub async fn widget(&self, id: &WidgetId) -> Option<Widget> {
        self.widgets.read().await.get(id).cloned()
    }

    /// All widgets, ordered by id
    pub async fn widgets(&self) -> Vec<Widget> {
        let mut widgets: Vec<Widget> = self.widgets.read().await.values().cloned().collect();
        widgets.sort_by(|a, b| a.id().cmp(b.id()));
        widgets
    }

    /// Current arrangement as reported by the layout engine
    pub fn arrangement(&self) -> Arrangement {
        self.layout.serialize().into_iter().collect()
    }

    /// Persist the current arrangement. An empty arrangement is not sent.
    pub async fn save(&self) -> Result<(), ApiError> {
        let arrangement = self.arrangement();
        if arrangement.is_empty() {
            tracing::debug!("Nothing to save for dashboard {}", self.id);
            return Ok(());
        }

        tracing::debug!(
            "Saving {} widget positions of dashboard {}",
            arrangement.len(),
            self.id
        );
        self.api.save_arrangement(&self.id, &arrangement).await
    }

    /// Update title and content of a widget without touching the layout.
    /// Returns false for unknown widgets.
    pub async fn refresh_widget(&self, id: &WidgetId, title: &str, url: Option<&str>) -> bool {
        match self.widgets.write().await.get_mut(id) {
            Some(widget) => {
                widget.set_title(title);
                widget.refresh(url);
                true
            }
            None => false,
        }
    }

    fn placement(&self, coords: Coords) -> Placement {
        Placement {
            col: coords.col,
            row: coords.row,
            width: coords
                .width
                .filter(|w| *w > 0)
                .unwrap_or(self.default_size.width),
            height: coords
                .height
                .filter(|h| *h > 0)
                .unwrap_or(self.default_size.height),
        }
    }
}
