use crate::client::UpdateClient;
use crate::models::PageSnapshot;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Resynchronizes local state with the server after a successful update.
pub trait Refresh: Send + Sync + 'static {
    fn refresh(&self) -> impl Future<Output = ()> + Send;
}

/// Re-fetches the device list and swaps it in as the current page.
#[derive(Clone)]
pub struct PageReload {
    client: UpdateClient,
    snapshot: Arc<RwLock<PageSnapshot>>,
}

impl PageReload {
    pub fn new(client: UpdateClient) -> Self {
        Self {
            client,
            snapshot: Arc::new(RwLock::new(PageSnapshot::default())),
        }
    }

    pub async fn snapshot(&self) -> PageSnapshot {
        self.snapshot.read().await.clone()
    }
}

impl Refresh for PageReload {
    async fn refresh(&self) {
        match self.client.device_list().await {
            Ok(devices) => {
                let mut page = self.snapshot.write().await;
                page.generation += 1;
                page.fetched_at = Some(Utc::now());
                info!(devices = devices.len(), generation = page.generation, "page reloaded");
                page.devices = devices;
            }
            Err(err) => warn!("failed to reload device list: {err}"),
        }
    }
}
