use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::ClientError;

/// Relative shift applied to a device's active-until time.
///
/// The server parses the token as a duration; the client never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Delta(String);

impl Delta {
    pub const EXTEND: &'static str = "1h";
    pub const RETRACT: &'static str = "-1h";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn extend() -> Self {
        Self::new(Self::EXTEND)
    }

    pub fn retract() -> Self {
        Self::new(Self::RETRACT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Delta {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

#[derive(Debug, Serialize)]
pub struct ModifyForm<'a> {
    pub ip: &'a str,
    pub delta: &'a Delta,
}

#[derive(Debug, Serialize)]
pub struct BlockForm<'a> {
    pub ip: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UnblockForm<'a> {
    pub ip: &'a str,
    pub hours: i64,
}

#[derive(Debug, Serialize)]
pub struct AddDeviceForm<'a> {
    pub ip: &'a str,
    pub name: &'a str,
}

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`, the server's
/// "never" value for `ActiveUntil` and `goodUntil`.
const ZERO_TIME_UNIX: i64 = -62_135_596_800;

fn is_zero_time(time: &DateTime<Utc>) -> bool {
    time.timestamp() == ZERO_TIME_UNIX && time.timestamp_subsec_nanos() == 0
}

fn kitchen(time: &DateTime<Utc>) -> String {
    time.with_timezone(&chrono::Local).format("%-I:%M%p").to_string()
}

/// One entry of `GET /deviceList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    #[serde(rename = "IP")]
    pub ip: String,
    pub name: String,
    pub active_until: DateTime<Utc>,
}

impl Device {
    /// Only the zero time means "no window". A past time stays a time; the
    /// server clamps retracted windows to "now" rather than zeroing them.
    pub fn has_active_window(&self) -> bool {
        !is_zero_time(&self.active_until)
    }

    pub fn active_until_label(&self) -> String {
        if self.has_active_window() {
            kitchen(&self.active_until)
        } else {
            "-".to_string()
        }
    }
}

/// Body of `GET /blockList`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockList {
    #[serde(deserialize_with = "null_as_empty")]
    pub blocked: Vec<String>,
    pub good_until: DateTime<Utc>,
}

impl BlockList {
    pub fn good_until_label(&self) -> String {
        if is_zero_time(&self.good_until) {
            "-".to_string()
        } else {
            kitchen(&self.good_until)
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Applied,
    Rejected(StatusCode),
    Failed(ClientError),
}

impl UpdateOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::OK {
            Self::Applied
        } else {
            Self::Rejected(status)
        }
    }

    /// Only a settled 200 counts; any other 2xx is treated like a failure.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

}

#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub devices: Vec<Device>,
    pub generation: u64,
    pub fetched_at: Option<DateTime<Utc>>,
}
