// Cancel-and-reschedule timer for bursty triggers
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Run `action` after the delay unless another call arrives first
    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
