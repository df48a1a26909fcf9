use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::models::{
    AddDeviceForm, BlockForm, BlockList, Delta, Device, ModifyForm, UnblockForm, UpdateOutcome,
};
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub const MODIFY_ACTIVE_UNTIL_PATH: &str = "/modifyActiveUntil";
pub const BLOCK_PATH: &str = "/block";
pub const UNBLOCK_PATH: &str = "/unblock";
pub const ADD_DEVICE_PATH: &str = "/addDevice";
pub const DEVICE_LIST_PATH: &str = "/deviceList";
pub const BLOCK_LIST_PATH: &str = "/blockList";

/// Thin HTTP layer over the device-management endpoints.
///
/// Every update is one form POST with no retry. The caller decides what a
/// non-applied outcome means.
#[derive(Debug, Clone)]
pub struct UpdateClient {
    http: Client,
    config: ClientConfig,
}

impl UpdateClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub async fn modify_active_until(&self, ip: &str, delta: &Delta) -> UpdateOutcome {
        self.post_form(MODIFY_ACTIVE_UNTIL_PATH, &ModifyForm { ip, delta }).await
    }

    pub async fn block(&self, ip: &str) -> UpdateOutcome {
        self.post_form(BLOCK_PATH, &BlockForm { ip }).await
    }

    pub async fn unblock(&self, ip: &str, hours: i64) -> UpdateOutcome {
        self.post_form(UNBLOCK_PATH, &UnblockForm { ip, hours }).await
    }

    pub async fn add_device(&self, ip: &str, name: &str) -> UpdateOutcome {
        self.post_form(ADD_DEVICE_PATH, &AddDeviceForm { ip, name }).await
    }

    pub async fn device_list(&self) -> Result<Vec<Device>, ClientError> {
        // The server writes `null` for an empty device table.
        let devices: Option<Vec<Device>> = self.get_json(DEVICE_LIST_PATH).await?;
        Ok(devices.unwrap_or_default())
    }

    /// Devices the firewall currently blocks, and when that set next changes.
    pub async fn block_list(&self) -> Result<BlockList, ClientError> {
        self.get_json(BLOCK_LIST_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.config.endpoint(path)?;
        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn post_form<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> UpdateOutcome {
        match self.send_form(path, form).await {
            Ok(status) => UpdateOutcome::from_status(status),
            Err(err) => UpdateOutcome::Failed(err),
        }
    }

    async fn send_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
    ) -> Result<StatusCode, ClientError> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "posting form");
        // `.form` sets `Content-Type: application/x-www-form-urlencoded`.
        let response = self.http.post(url).form(form).send().await?;
        let status = response.status();
        // Drain the body so the request is fully settled before reporting.
        response.bytes().await?;
        Ok(status)
    }
}
