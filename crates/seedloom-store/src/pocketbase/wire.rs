use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use seedloom_core::GeneratedRecord;

use crate::error::{Result, StoreError};

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub identity: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub page: u32,
    /// `-1` when the server skipped the total count.
    #[serde(default = "unknown_total")]
    pub total_pages: i64,
    #[serde(default)]
    pub items: Vec<Map<String, Value>>,
}

fn unknown_total() -> i64 {
    -1
}

impl ListPage {
    pub fn is_last(&self, per_page: u32) -> bool {
        if self.total_pages >= 0 && i64::from(self.page) >= self.total_pages {
            return true;
        }
        self.items.len() < per_page as usize
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Error for a non-2xx reply, preferring the `message` field of PocketBase's error body.
pub fn status_error(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.message)
        .ok()
        .filter(|message| !message.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    StoreError::Status {
        status: status.as_u16(),
        message,
    }
}

pub fn to_record(object: Map<String, Value>) -> Result<GeneratedRecord> {
    GeneratedRecord::from_store_object(object)
        .ok_or_else(|| StoreError::InvalidResponse("record without an id".to_string()))
}
