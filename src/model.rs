use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound create payload. Required fields are optional here on purpose:
/// validation rejects absent keys, while an empty string is accepted as-is.
/// Unknown fields are kept and written through to the store unchanged.
#[derive(Debug, Deserialize, Clone)]
pub struct CreateCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The persisted shape: caller fields plus the derived metadata.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub created_at: String,
    pub status: String,
    /// Epoch seconds for the store's own TTL expiry; absent when TTL is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateResp {
    pub message: String,
    pub customer_id: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ListResp {
    pub count: i32,
    pub items: Vec<Value>,
}
