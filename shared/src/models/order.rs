//! Finalized order records (remote-owned) and the staged submission payload

use super::cart::CartLine;
use serde::{Deserialize, Serialize};

/// A finalized order as stored by the remote order service
///
/// Records fetched from the remote (or staged locally while offline) may
/// carry server-side metadata; those fields are tolerated here and stripped
/// by construction when building an [`OrderSubmission`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub products: Vec<CartLine>,
    pub total_amount: i64,
    #[serde(default)]
    pub delivery: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub phone: Option<String>,
    /// Unix millis
    pub timestamp: i64,
    /// Server-side document id (never resubmitted)
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Server-side document version (never resubmitted)
    #[serde(default, rename = "__v", skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
}

/// Payload POSTed to the remote order-creation endpoint
///
/// Built from an [`OrderRecord`]: server-only fields are stripped by
/// construction and an absent or empty phone is normalized to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub id: String,
    pub products: Vec<CartLine>,
    pub total_amount: i64,
    pub delivery: i64,
    pub discount: i64,
    /// Serialized as an explicit `null` when absent
    pub phone: Option<String>,
    pub timestamp: i64,
}

impl From<&OrderRecord> for OrderSubmission {
    fn from(record: &OrderRecord) -> Self {
        Self {
            id: record.id.clone(),
            products: record.products.clone(),
            total_amount: record.total_amount,
            delivery: record.delivery,
            discount: record.discount,
            phone: record.phone.clone().filter(|p| !p.is_empty()),
            timestamp: record.timestamp,
        }
    }
}
