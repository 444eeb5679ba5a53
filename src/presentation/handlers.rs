// HTTP request handlers - translate UI gestures into dashboard events
use crate::application::error::{ApiError, DashboardError};
use crate::application::events::{Callbacks, DashboardEvent, EventBus};
use crate::domain::layout::{BaseDimensions, Geometry};
use crate::domain::widget::{Coords, Widget, WidgetData, WidgetId};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWidget {
    pub type_id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub coords: Coords,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub col: u32,
    pub row: u32,
}

#[derive(Debug, Deserialize)]
pub struct SizeRequest {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    pub width: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub id: WidgetId,
    pub type_id: String,
    pub title: String,
    pub url: String,
    pub external: bool,
    pub geometry: Option<GeometryView>,
}

#[derive(Debug, Serialize)]
pub struct GeometryView {
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

/// Pixel size of one grid cell
#[derive(Debug, Serialize)]
pub struct CellView {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub id: String,
    /// Whether the "dashboard is empty" message is shown
    pub empty: bool,
    pub cell: Option<CellView>,
    pub widgets: Vec<WidgetView>,
}

impl From<Geometry> for GeometryView {
    fn from(g: Geometry) -> Self {
        Self {
            col: g.col,
            row: g.row,
            width: g.width,
            height: g.height,
        }
    }
}

impl From<BaseDimensions> for CellView {
    fn from(base: BaseDimensions) -> Self {
        Self {
            width: base.width,
            height: base.height,
        }
    }
}

impl From<&Widget> for WidgetView {
    fn from(widget: &Widget) -> Self {
        Self {
            id: widget.id().clone(),
            type_id: widget.type_id().to_string(),
            title: widget.title().to_string(),
            url: widget.url().to_string(),
            external: widget.is_external(),
            geometry: widget.geometry().map(GeometryView::from),
        }
    }
}

#[derive(Debug)]
pub enum HandlerError {
    Dashboard(DashboardError),
    UnknownWidget(WidgetId),
    /// The dispatch loop is gone
    Unavailable,
}

impl From<ApiError> for HandlerError {
    fn from(e: ApiError) -> Self {
        HandlerError::Dashboard(DashboardError::Api(e))
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HandlerError::Dashboard(DashboardError::UnknownWidget(id))
            | HandlerError::UnknownWidget(id) => {
                (StatusCode::NOT_FOUND, format!("unknown widget {}", id))
            }
            HandlerError::Dashboard(e) if e.is_ignorable() => {
                (StatusCode::UNAUTHORIZED, e.to_string())
            }
            HandlerError::Dashboard(e) => {
                tracing::error!("Dashboard operation failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            HandlerError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "dashboard is shutting down".to_string(),
            ),
        };
        (status, message).into_response()
    }
}

/// Publish an event carrying callbacks and wait until one of them fires
async fn settle<T, F>(bus: &EventBus, event: F) -> Result<T, HandlerError>
where
    T: Send + 'static,
    F: FnOnce(Callbacks<T>) -> DashboardEvent,
{
    let (tx, mut rx) = mpsc::channel(1);
    let fail_tx = tx.clone();
    let callbacks = Callbacks::none()
        .on_done(move |value| {
            let _ = tx.try_send(Ok(value));
        })
        .on_fail(move |e| {
            let _ = fail_tx.try_send(Err(e));
        });

    if !bus.publish(event(callbacks)) {
        return Err(HandlerError::Unavailable);
    }
    rx.recv()
        .await
        .ok_or(HandlerError::Unavailable)?
        .map_err(HandlerError::Dashboard)
}

async fn known_widget(state: &AppState, id: &WidgetId) -> Result<Widget, HandlerError> {
    state
        .dashboard
        .widget(id)
        .await
        .ok_or_else(|| HandlerError::UnknownWidget(id.clone()))
}

fn accepted(state: &AppState, event: DashboardEvent) -> Result<StatusCode, HandlerError> {
    if state.bus.publish(event) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(HandlerError::Unavailable)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let widgets = state.dashboard.widgets().await;
    let empty = *state.empty_banner.borrow();
    Json(DashboardView {
        id: state.dashboard.id().to_string(),
        empty,
        cell: state.dashboard.layout().base_dimensions().map(CellView::from),
        widgets: widgets.iter().map(WidgetView::from).collect(),
    })
}

pub async fn add_widget(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewWidget>,
) -> Result<(StatusCode, Json<WidgetView>), HandlerError> {
    let mut data = WidgetData::new(body.type_id, body.title);
    if let Some(url) = body.url {
        data = data.with_url(url);
    }
    let coords = body.coords;

    let widget = settle(&state.bus, |callbacks| DashboardEvent::AddWidget {
        data,
        coords,
        callbacks,
    })
    .await?;
    Ok((StatusCode::CREATED, Json(WidgetView::from(&widget))))
}

pub async fn remove_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    let id = WidgetId::new(id);
    settle(&state.bus, |callbacks| DashboardEvent::RemoveWidget { id, callbacks }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<StatusCode, HandlerError> {
    let id = WidgetId::new(id);
    known_widget(&state, &id).await?;
    accepted(
        &state,
        DashboardEvent::RefreshWidget {
            id,
            title: body.title,
            url: body.url,
        },
    )
}

/// Drag gesture finished
pub async fn move_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PositionRequest>,
) -> Result<Json<GeometryView>, HandlerError> {
    let id = WidgetId::new(id);
    let geometry = state
        .dashboard
        .layout()
        .move_widget(&id, body.col, body.row)
        .ok_or_else(|| HandlerError::UnknownWidget(id.clone()))?;
    accepted(&state, DashboardEvent::DraggedWidget)?;
    Ok(Json(geometry.into()))
}

/// Resize gesture finished
pub async fn resize_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SizeRequest>,
) -> Result<Json<GeometryView>, HandlerError> {
    let id = WidgetId::new(id);
    let geometry = state
        .dashboard
        .layout()
        .resize_widget(&id, body.width, body.height)
        .ok_or_else(|| HandlerError::UnknownWidget(id.clone()))?;
    accepted(&state, DashboardEvent::ResizedWidget)?;
    Ok(Json(geometry.into()))
}

pub async fn configure_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let widget = known_widget(&state, &WidgetId::new(id)).await?;
    let url = state.dashboard.factory().configure_url(widget.id());
    Ok(Json(serde_json::json!({ "url": url })))
}

/// Widget panel rendered through the configured template
pub async fn render_widget(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, HandlerError> {
    let widget = known_widget(&state, &WidgetId::new(id)).await?;
    let markup = widget.node().render(&state.widget_template);
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], markup).into_response())
}

pub async fn save_dashboard(State(state): State<Arc<AppState>>) -> Result<StatusCode, HandlerError> {
    accepted(&state, DashboardEvent::Save)
}

pub async fn resize_viewport(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ViewportRequest>,
) -> Result<StatusCode, HandlerError> {
    accepted(&state, DashboardEvent::WindowResized { width: body.width })
}

pub async fn delete_dashboard(State(state): State<Arc<AppState>>) -> Result<StatusCode, HandlerError> {
    state.dashboard.remove().await?;
    Ok(StatusCode::NO_CONTENT)
}
