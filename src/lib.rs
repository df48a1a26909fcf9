pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod page;
pub mod refresh;
pub mod ui;

pub use client::UpdateClient;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use models::{BlockList, Delta, Device, PageSnapshot, UpdateOutcome};
pub use page::DevicePage;
pub use refresh::{PageReload, Refresh};
