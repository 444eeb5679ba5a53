// Main entry point - Dependency injection and control surface setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_utils;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::coordinator::{DashboardContext, GridSettings};
use crate::application::dashboard_service::DashboardService;
use crate::application::events::{DashboardEvent, EventBus};
use crate::application::widget_factory::WidgetFactory;
use crate::domain::dashboard::{DashboardId, WidgetSize};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::grid_layout::GridLayout;
use crate::infrastructure::http_api::HttpDashboardApi;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config().context("Failed to load config/dashboard")?;
    let settings = &config.dashboard;

    // Remote API and layout engine (infrastructure layer)
    let api = Arc::new(HttpDashboardApi::new(
        config.remote.base_url.clone(),
        config.remote.token.clone(),
    ));
    let layout = Arc::new(GridLayout::new(settings.columns));

    // Dashboard and its event wiring (application layer)
    let dashboard_id = DashboardId::new(settings.id.clone());
    let factory = WidgetFactory::new(
        dashboard_id.clone(),
        settings.content_url.clone(),
        settings.configure_url.clone(),
        layout.clone(),
    );
    let dashboard = Arc::new(DashboardService::new(
        dashboard_id,
        api,
        layout,
        factory,
        WidgetSize::new(settings.default_width, settings.default_height),
    ));

    let (bus, queue) = EventBus::new();
    let context = DashboardContext::new(
        dashboard.clone(),
        bus.clone(),
        GridSettings {
            columns: settings.columns,
            widget_margin: settings.widget_margin,
            widget_height: settings.widget_height,
        },
        settings.viewport_width,
        Duration::from_millis(settings.resize_debounce_ms),
    );

    // Display the widgets the server already knows about
    for widget in config.widgets.iter().cloned() {
        let (data, coords) = widget.into_parts();
        bus.publish(DashboardEvent::LoadWidget { data, coords });
    }
    let empty_banner = context.empty_banner();
    let mut dispatcher = tokio::spawn(context.run(queue));

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        dashboard,
        bus: bus.clone(),
        empty_banner,
        widget_template: settings.widget_template.clone(),
    });
    let router = create_router(state);

    let addr: SocketAddr = config
        .server
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen))?;
    tracing::info!("Starting dashboard-sync on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let shutdown_bus = bus.clone();
    let server = async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down");
                shutdown_bus.shutdown();
            })
            .await
    };

    tokio::select! {
        served = server => served?,
        finished = &mut dispatcher => {
            // The dispatcher only stops on its own after an unrecoverable fault
            finished??;
            return Ok(());
        }
    }
    dispatcher.await??;

    Ok(())
}
