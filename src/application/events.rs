// Dashboard event bus - typed publish/subscribe channel owned by the dashboard context
use crate::application::error::DashboardError;
use crate::domain::widget::{Coords, Widget, WidgetData, WidgetId};
use std::fmt;
use tokio::sync::{broadcast, mpsc};

/// Broadcast capacity for event notifications. Lagging observers skip old kinds.
pub const NOTICE_CAPACITY: usize = 64;

pub type DoneFn<T> = Box<dyn FnOnce(T) + Send>;
pub type FailFn = Box<dyn FnOnce(DashboardError) + Send>;

/// Optional continuations for callers that want to hear about the outcome of
/// an operation triggered through the bus.
pub struct Callbacks<T> {
    done: Option<DoneFn<T>>,
    fail: Option<FailFn>,
}

impl<T> Callbacks<T> {
    pub fn none() -> Self {
        Self {
            done: None,
            fail: None,
        }
    }

    pub fn on_done(mut self, done: impl FnOnce(T) + Send + 'static) -> Self {
        self.done = Some(Box::new(done));
        self
    }

    pub fn on_fail(mut self, fail: impl FnOnce(DashboardError) + Send + 'static) -> Self {
        self.fail = Some(Box::new(fail));
        self
    }

    /// Invoke the continuation matching the outcome, if one was given
    pub fn settle(self, result: Result<T, DashboardError>) {
        match result {
            Ok(value) => {
                if let Some(done) = self.done {
                    done(value);
                }
            }
            Err(e) => {
                if let Some(fail) = self.fail {
                    fail(e);
                }
            }
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("done", &self.done.is_some())
            .field("fail", &self.fail.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub enum DashboardEvent {
    /// Display an already persisted widget
    LoadWidget { data: WidgetData, coords: Coords },
    /// Create and display a new widget
    AddWidget {
        data: WidgetData,
        coords: Coords,
        callbacks: Callbacks<Widget>,
    },
    RemoveWidget {
        id: WidgetId,
        callbacks: Callbacks<()>,
    },
    /// Update displayed title and content without touching the layout
    RefreshWidget {
        id: WidgetId,
        title: String,
        url: Option<String>,
    },
    DraggedWidget,
    ResizedWidget,
    Save,
    LoadedWidget(Widget),
    AddedWidget(Widget),
    RemovedWidget(WidgetId),
    Saved,
    WindowResized { width: u32 },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LoadWidget,
    AddWidget,
    RemoveWidget,
    RefreshWidget,
    DraggedWidget,
    ResizedWidget,
    Save,
    LoadedWidget,
    AddedWidget,
    RemovedWidget,
    Saved,
    WindowResized,
    Shutdown,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::LoadWidget => "loadwidget",
            EventKind::AddWidget => "addwidget",
            EventKind::RemoveWidget => "removewidget",
            EventKind::RefreshWidget => "refreshwidget",
            EventKind::DraggedWidget => "draggedwidget",
            EventKind::ResizedWidget => "resizedwidget",
            EventKind::Save => "save",
            EventKind::LoadedWidget => "loadedwidget",
            EventKind::AddedWidget => "addedwidget",
            EventKind::RemovedWidget => "removedwidget",
            EventKind::Saved => "saved",
            EventKind::WindowResized => "windowresized",
            EventKind::Shutdown => "shutdown",
        }
    }

    /// Structural mutations and explicit requests that persist the arrangement
    pub fn triggers_save(&self) -> bool {
        matches!(
            self,
            EventKind::Save
                | EventKind::RemovedWidget
                | EventKind::AddedWidget
                | EventKind::DraggedWidget
                | EventKind::ResizedWidget
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DashboardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DashboardEvent::LoadWidget { .. } => EventKind::LoadWidget,
            DashboardEvent::AddWidget { .. } => EventKind::AddWidget,
            DashboardEvent::RemoveWidget { .. } => EventKind::RemoveWidget,
            DashboardEvent::RefreshWidget { .. } => EventKind::RefreshWidget,
            DashboardEvent::DraggedWidget => EventKind::DraggedWidget,
            DashboardEvent::ResizedWidget => EventKind::ResizedWidget,
            DashboardEvent::Save => EventKind::Save,
            DashboardEvent::LoadedWidget(_) => EventKind::LoadedWidget,
            DashboardEvent::AddedWidget(_) => EventKind::AddedWidget,
            DashboardEvent::RemovedWidget(_) => EventKind::RemovedWidget,
            DashboardEvent::Saved => EventKind::Saved,
            DashboardEvent::WindowResized { .. } => EventKind::WindowResized,
            DashboardEvent::Shutdown => EventKind::Shutdown,
        }
    }
}

/// Publishing handle of the bus. Events are dispatched in publish order by
/// the single loop holding the matching `EventQueue`.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<DashboardEvent>,
    notices: broadcast::Sender<EventKind>,
}

pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<DashboardEvent>,
}

impl EventBus {
    pub fn new() -> (EventBus, EventQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        (EventBus { tx, notices }, EventQueue { rx })
    }

    /// Returns false once the dispatch loop is gone
    pub fn publish(&self, event: DashboardEvent) -> bool {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Dropping {} event, dispatcher has stopped", kind);
                false
            }
        }
    }

    /// Observe the kind of every dispatched event
    #[cfg(test)]
    pub fn subscribe(&self) -> broadcast::Receiver<EventKind> {
        self.notices.subscribe()
    }

    pub fn shutdown(&self) {
        self.publish(DashboardEvent::Shutdown);
    }

    pub(crate) fn notify(&self, kind: EventKind) {
        // No observers is fine
        let _ = self.notices.send(kind);
    }
}

impl EventQueue {
    pub async fn recv(&mut self) -> Option<DashboardEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_save_triggers() {
        let triggers: Vec<&str> = [
            EventKind::LoadWidget,
            EventKind::AddWidget,
            EventKind::RemoveWidget,
            EventKind::RefreshWidget,
            EventKind::DraggedWidget,
            EventKind::ResizedWidget,
            EventKind::Save,
            EventKind::LoadedWidget,
            EventKind::AddedWidget,
            EventKind::RemovedWidget,
            EventKind::Saved,
        ]
        .iter()
        .filter(|k| k.triggers_save())
        .map(|k| k.name())
        .collect();

        assert_eq!(
            triggers,
            vec!["draggedwidget", "resizedwidget", "save", "addedwidget", "removedwidget"]
        );
    }

    #[test]
    fn test_callbacks_settle() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let done_seen = seen.clone();
        let fail_seen = seen.clone();
        Callbacks::none()
            .on_done(move |v: u32| done_seen.lock().unwrap().push(format!("done {}", v)))
            .on_fail(move |e| fail_seen.lock().unwrap().push(format!("fail {}", e)))
            .settle(Ok(7));

        let fail_seen = seen.clone();
        Callbacks::<u32>::none()
            .on_fail(move |e| fail_seen.lock().unwrap().push(format!("fail {}", e)))
            .settle(Err(DashboardError::MissingWidgetId));

        // Missing continuations are skipped
        Callbacks::<u32>::none().settle(Err(DashboardError::MissingWidgetId));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "done 7".to_string(),
                "fail persisted widget data carries no id".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_preserves_order() {
        let (bus, mut queue) = EventBus::new();
        assert!(bus.publish(DashboardEvent::DraggedWidget));
        assert!(bus.publish(DashboardEvent::Save));
        bus.shutdown();

        assert_eq!(queue.recv().await.map(|e| e.kind()), Some(EventKind::DraggedWidget));
        assert_eq!(queue.recv().await.map(|e| e.kind()), Some(EventKind::Save));
        assert_eq!(queue.recv().await.map(|e| e.kind()), Some(EventKind::Shutdown));
    }

    #[tokio::test]
    async fn test_publish_after_dispatcher_stopped() {
        let (bus, queue) = EventBus::new();
        drop(queue);
        assert!(!bus.publish(DashboardEvent::Save));
    }
}
