//! Scratchpad - process-wide named-blob store
//!
//! Cross-navigation handoff state (draft cart, variety draft, ticket
//! queues, active order type) lives here as string-serialized blobs,
//! mirrored to a JSON file so a restart picks up where the terminal left
//! off. Loaded once on start; every set/remove rewrites the full file.
//!
//! All reads and writes route through the owning service (Cart Aggregator,
//! Ticket Store) — nothing else touches these keys.

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::AppError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known scratchpad keys
pub mod keys {
    use shared::models::OrderType;

    /// The in-progress draft cart (also the invoice handoff payload)
    pub const DRAFT_CART: &str = "draft_cart";
    /// Variety selections in the size-picker, keyed per product
    pub const VARIETY_DRAFT: &str = "variety_draft";
    /// Order type handed to the invoice finalization flow
    pub const ACTIVE_ORDER_TYPE: &str = "active_order_type";

    /// Per-order-type kitchen ticket queue
    pub fn ticket_queue(order_type: OrderType) -> String {
        format!("kot_{}", order_type.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ScratchpadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ScratchpadError> for AppError {
    fn from(err: ScratchpadError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Process-wide key-value scratchpad backed by a JSON file
pub struct Scratchpad {
    file_path: PathBuf,
    data: RwLock<HashMap<String, String>>,
}

impl Scratchpad {
    /// Load the scratchpad from disk; a missing file starts empty
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScratchpadError> {
        let file_path = path.as_ref().to_path_buf();

        let data = if file_path.exists() {
            let content = std::fs::read_to_string(&file_path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            file_path,
            data: RwLock::new(data),
        })
    }

    /// Get a raw blob
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().get(key).cloned()
    }

    /// Set a raw blob and persist
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), ScratchpadError> {
        {
            let mut data = self.data.write();
            data.insert(key.to_string(), value.into());
        }
        self.save()
    }

    /// Remove a blob and persist
    pub fn remove(&self, key: &str) -> Result<(), ScratchpadError> {
        let removed = {
            let mut data = self.data.write();
            data.remove(key).is_some()
        };
        if removed {
            self.save()?;
        }
        Ok(())
    }

    /// Clear every blob (navigation-trigger teardown)
    pub fn clear(&self) -> Result<(), ScratchpadError> {
        self.data.write().clear();
        self.save()
    }

    /// Deserialize a JSON blob; unparsable or missing blobs read as `None`
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unparsable scratchpad blob");
                None
            }
        }
    }

    /// Serialize a value into a JSON blob
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ScratchpadError> {
        self.set(key, serde_json::to_string(value)?)
    }

    /// Rewrite the backing file with the full snapshot
    fn save(&self) -> Result<(), ScratchpadError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = {
            let data = self.data.read();
            serde_json::to_string_pretty(&*data)?
        };
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CartLine, OrderType};

    fn temp_scratchpad() -> (tempfile::TempDir, Scratchpad) {
        let dir = tempfile::tempdir().unwrap();
        let pad = Scratchpad::load(dir.path().join("scratchpad.json")).unwrap();
        (dir, pad)
    }

    #[test]
    fn test_set_get_remove() {
        let (_dir, pad) = temp_scratchpad();
        assert_eq!(pad.get(keys::ACTIVE_ORDER_TYPE), None);

        pad.set(keys::ACTIVE_ORDER_TYPE, "delivery").unwrap();
        assert_eq!(pad.get(keys::ACTIVE_ORDER_TYPE).as_deref(), Some("delivery"));

        pad.remove(keys::ACTIVE_ORDER_TYPE).unwrap();
        assert_eq!(pad.get(keys::ACTIVE_ORDER_TYPE), None);
        // Removing twice is harmless
        pad.remove(keys::ACTIVE_ORDER_TYPE).unwrap();
    }

    #[test]
    fn test_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratchpad.json");

        let lines = vec![CartLine::paid("Cheese pizza", None, 300, 2)];
        {
            let pad = Scratchpad::load(&path).unwrap();
            pad.set_json(keys::DRAFT_CART, &lines).unwrap();
        }

        let pad = Scratchpad::load(&path).unwrap();
        let restored: Vec<CartLine> = pad.get_json(keys::DRAFT_CART).unwrap();
        assert_eq!(restored, lines);
    }

    #[test]
    fn test_unparsable_blob_reads_as_none() {
        let (_dir, pad) = temp_scratchpad();
        pad.set(keys::DRAFT_CART, "not json").unwrap();
        assert!(pad.get_json::<Vec<CartLine>>(keys::DRAFT_CART).is_none());
    }

    #[test]
    fn test_queue_keys_are_distinct() {
        let keys: Vec<String> = OrderType::ALL.iter().map(|t| keys::ticket_queue(*t)).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.starts_with("kot_")));
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
    }
}
