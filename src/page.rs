use crate::client::UpdateClient;
use crate::models::{Delta, UpdateOutcome};
use crate::refresh::Refresh;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The device page's request helper: sends an update and reloads on success.
///
/// Updates are fire-and-forget. Each call spawns its own task and returns
/// immediately; failures are logged and never reach the caller. There is no
/// deduplication, so two quick calls produce two requests and, if both
/// succeed, two reloads in whatever order the responses land.
///
/// Spawning requires a running tokio runtime.
pub struct DevicePage<R> {
    client: UpdateClient,
    refresh: Arc<R>,
}

impl<R> Clone for DevicePage<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            refresh: Arc::clone(&self.refresh),
        }
    }
}

impl<R: Refresh> DevicePage<R> {
    pub fn new(client: UpdateClient, refresh: R) -> Self {
        Self {
            client,
            refresh: Arc::new(refresh),
        }
    }

    pub fn client(&self) -> &UpdateClient {
        &self.client
    }

    pub fn refresher(&self) -> &R {
        &self.refresh
    }

    pub fn extend_active_window(&self, ip: &str) -> JoinHandle<()> {
        self.modify_and_reload(ip, Delta::extend())
    }

    pub fn retract_active_window(&self, ip: &str) -> JoinHandle<()> {
        self.modify_and_reload(ip, Delta::retract())
    }

    pub fn modify_and_reload(&self, ip: &str, delta: Delta) -> JoinHandle<()> {
        let refresh = Arc::clone(&self.refresh);
        self.send_update(ip, delta, move || async move { refresh.refresh().await })
    }

    pub async fn reload_page(&self) {
        self.refresh.refresh().await;
    }

    /// Posts `ip`/`delta` to `/modifyActiveUntil` and runs `on_success` once
    /// if, and only if, the server answers 200.
    pub fn send_update<F, Fut>(&self, ip: &str, delta: Delta, on_success: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let client = self.client.clone();
        let ip = ip.to_string();
        tokio::spawn(async move {
            let outcome = client.modify_active_until(&ip, &delta).await;
            settle(outcome, &ip, delta.as_str(), on_success).await;
        })
    }

    pub fn block(&self, ip: &str) -> JoinHandle<()> {
        let client = self.client.clone();
        let refresh = Arc::clone(&self.refresh);
        let ip = ip.to_string();
        tokio::spawn(async move {
            let outcome = client.block(&ip).await;
            settle(outcome, &ip, "block", || refresh.refresh()).await;
        })
    }

    pub fn unblock(&self, ip: &str, hours: i64) -> JoinHandle<()> {
        let client = self.client.clone();
        let refresh = Arc::clone(&self.refresh);
        let ip = ip.to_string();
        tokio::spawn(async move {
            let outcome = client.unblock(&ip, hours).await;
            let action = format!("unblock {hours}h");
            settle(outcome, &ip, &action, || refresh.refresh()).await;
        })
    }

    pub fn add_device(&self, ip: &str, name: &str) -> JoinHandle<()> {
        let client = self.client.clone();
        let refresh = Arc::clone(&self.refresh);
        let ip = ip.to_string();
        let name = name.to_string();
        tokio::spawn(async move {
            let outcome = client.add_device(&ip, &name).await;
            settle(outcome, &ip, "add device", || refresh.refresh()).await;
        })
    }
}

async fn settle<F, Fut>(outcome: UpdateOutcome, ip: &str, action: &str, on_success: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    match outcome {
        UpdateOutcome::Applied => {
            info!(ip, action, "update applied");
            on_success().await;
        }
        UpdateOutcome::Rejected(status) => {
            warn!(ip, action, %status, "update rejected");
        }
        UpdateOutcome::Failed(err) => {
            warn!(ip, action, "update failed: {err}");
        }
    }
}
