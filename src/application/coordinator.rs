// Dashboard context - dispatches bus events to dashboard operations and UI reactions
use crate::application::dashboard_service::DashboardService;
use crate::application::debounce::Debouncer;
use crate::application::error::DashboardError;
use crate::application::events::{DashboardEvent, EventBus, EventKind, EventQueue};
use crate::domain::layout::BaseDimensions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Horizontal space of the page not available to the grid
const VIEWPORT_PADDING: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub columns: u32,
    pub widget_margin: u32,
    pub widget_height: u32,
}

impl GridSettings {
    /// Pixel width of one grid column for the given viewport width
    pub fn widget_width(&self, viewport_width: u32) -> u32 {
        let available = viewport_width.saturating_sub(VIEWPORT_PADDING);
        (available / self.columns.max(1))
            .saturating_sub(2 * self.widget_margin)
            .max(1)
    }
}

/// The one active dashboard of a session together with its event wiring.
pub struct DashboardContext {
    dispatcher: Dispatcher,
    faults: mpsc::UnboundedReceiver<DashboardError>,
}

struct Dispatcher {
    dashboard: Arc<DashboardService>,
    bus: EventBus,
    grid: GridSettings,
    viewport_width: u32,
    resize: Debouncer,
    empty_banner: watch::Sender<bool>,
    faults: mpsc::UnboundedSender<DashboardError>,
}

impl DashboardContext {
    pub fn new(
        dashboard: Arc<DashboardService>,
        bus: EventBus,
        grid: GridSettings,
        viewport_width: u32,
        resize_delay: Duration,
    ) -> Self {
        let (faults_tx, faults_rx) = mpsc::unbounded_channel();
        let (empty_banner, _) = watch::channel(true);
        Self {
            dispatcher: Dispatcher {
                dashboard,
                bus,
                grid,
                viewport_width,
                resize: Debouncer::new(resize_delay),
                empty_banner,
                faults: faults_tx,
            },
            faults: faults_rx,
        }
    }

    /// Visibility of the "dashboard is empty" message
    pub fn empty_banner(&self) -> watch::Receiver<bool> {
        self.dispatcher.empty_banner.subscribe()
    }

    /// Dispatch events until shutdown. A save failure other than an expired
    /// session cannot be recovered and ends the loop with an error.
    pub async fn run(self, mut queue: EventQueue) -> Result<(), DashboardError> {
        let DashboardContext {
            mut dispatcher,
            mut faults,
        } = self;
        tracing::info!("Dashboard {} ready", dispatcher.dashboard.id());

        loop {
            tokio::select! {
                event = queue.recv() => match event {
                    Some(DashboardEvent::Shutdown) | None => {
                        dispatcher.bus.notify(EventKind::Shutdown);
                        tracing::info!("Dashboard {} shutting down", dispatcher.dashboard.id());
                        return Ok(());
                    }
                    Some(event) => dispatcher.dispatch(event).await,
                },
                Some(fault) = faults.recv() => {
                    tracing::error!("Unrecoverable dashboard fault: {}", fault);
                    return Err(fault);
                }
            }
        }
    }
}

impl Dispatcher {
    async fn dispatch(&mut self, event: DashboardEvent) {
        let kind = event.kind();
        tracing::debug!("Dispatching {}", kind);
        self.bus.notify(kind);

        match event {
            DashboardEvent::LoadWidget { data, coords } => {
                let dashboard = self.dashboard.clone();
                let bus = self.bus.clone();
                tokio::spawn(async move {
                    match dashboard.add_widget(data, coords, false).await {
                        Ok(widget) => {
                            bus.publish(DashboardEvent::LoadedWidget(widget));
                        }
                        Err(e) => tracing::warn!("Loading widget failed: {}", e),
                    }
                });
            }
            DashboardEvent::AddWidget {
                data,
                coords,
                callbacks,
            } => {
                let dashboard = self.dashboard.clone();
                let bus = self.bus.clone();
                tokio::spawn(async move {
                    let result = dashboard.add_widget(data, coords, true).await;
                    if let Ok(widget) = &result {
                        bus.publish(DashboardEvent::AddedWidget(widget.clone()));
                    }
                    callbacks.settle(result);
                });
            }
            DashboardEvent::RemoveWidget { id, callbacks } => {
                let dashboard = self.dashboard.clone();
                let bus = self.bus.clone();
                tokio::spawn(async move {
                    let result = dashboard.remove_widget(&id).await;
                    if result.is_ok() {
                        bus.publish(DashboardEvent::RemovedWidget(id));
                    }
                    callbacks.settle(result);
                });
            }
            DashboardEvent::RefreshWidget { id, title, url } => {
                if !self
                    .dashboard
                    .refresh_widget(&id, &title, url.as_deref())
                    .await
                {
                    tracing::debug!("Ignoring refresh of unknown widget {}", id);
                }
            }
            DashboardEvent::LoadedWidget(_) | DashboardEvent::AddedWidget(_) => {
                self.empty_banner.send_replace(false);
                self.schedule_resize();
            }
            DashboardEvent::RemovedWidget(_) => {
                if self.dashboard.is_empty().await {
                    self.empty_banner.send_replace(true);
                }
            }
            DashboardEvent::WindowResized { width } => {
                self.viewport_width = width;
                self.schedule_resize();
            }
            DashboardEvent::DraggedWidget
            | DashboardEvent::ResizedWidget
            | DashboardEvent::Save
            | DashboardEvent::Saved
            | DashboardEvent::Shutdown => {}
        }

        if kind.triggers_save() {
            self.spawn_save();
        }
    }

    /// Every save runs on its own; overlapping saves race and the last
    /// response wins at the server.
    fn spawn_save(&self) {
        let dashboard = self.dashboard.clone();
        let bus = self.bus.clone();
        let faults = self.faults.clone();
        tokio::spawn(async move {
            match dashboard.save().await {
                Ok(()) => {
                    bus.publish(DashboardEvent::Saved);
                }
                Err(e) if e.is_ignorable() => {
                    tracing::debug!("Ignoring failed save of {}: {}", dashboard.id(), e);
                }
                Err(e) => {
                    tracing::error!("Saving dashboard {} failed: {}", dashboard.id(), e);
                    let _ = faults.send(DashboardError::Unrecoverable {
                        context: "saving the current dashboard failed",
                        source: e,
                    });
                }
            }
        });
    }

    fn schedule_resize(&mut self) {
        let base = BaseDimensions {
            width: self.grid.widget_width(self.viewport_width),
            height: self.grid.widget_height,
        };
        let dashboard = self.dashboard.clone();
        self.resize.call(async move {
            dashboard.layout().resize_widget_dimensions(base);
            if dashboard.is_empty().await {
                dashboard.layout().set_grid_width();
            }
        });
    }
}
