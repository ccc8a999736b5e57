use serde_json::{json, Value};
use thiserror::Error;

use super::ledger::Credits;
use super::types::{ItemId, ItemKind};

/// Why a single action was refused. The prior state is always left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// Unknown `action` tag or a payload that does not fit it
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// No stack in bag or chest carries this id
    #[error("item not found: {0}")]
    NotFound(ItemId),

    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("invalid sale: {0}")]
    InvalidSale(String),

    /// Equipping would exceed the per-category cap
    #[error("cannot equip more than {limit} {kind} items")]
    EquipLimitExceeded { kind: ItemKind, limit: usize },

    /// Plain items have no equip slot
    #[error("item {0} cannot be equipped")]
    NotEquippable(ItemId),

    /// The purchase costs more than the balance; `missing` is the shortfall
    #[error("insufficient funds: {missing} credits missing")]
    InsufficientFunds { missing: Credits },

    /// Shop lookup failed
    #[error("unknown shop item '{name}' in category '{category}'")]
    UnknownItem { category: String, name: String },

    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    #[error("unknown skill: {0}")]
    UnknownSkill(String),
}

impl ActionError {
    /// Stable machine-readable code for callers and the journal
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::InvalidAction(_) => "invalid_action",
            ActionError::NotFound(_) => "not_found",
            ActionError::InvalidTransfer(_) => "invalid_transfer",
            ActionError::InvalidSale(_) => "invalid_sale",
            ActionError::EquipLimitExceeded { .. } => "equip_limit_exceeded",
            ActionError::NotEquippable(_) => "not_equippable",
            ActionError::InsufficientFunds { .. } => "insufficient_funds",
            ActionError::UnknownItem { .. } => "unknown_item",
            ActionError::UnknownAbility(_) => "unknown_ability",
            ActionError::UnknownSkill(_) => "unknown_skill",
        }
    }

    /// JSON body for transports: code, message and, for funds, the shortfall.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let ActionError::InsufficientFunds { missing } = self {
            body["missing"] = json!(missing.as_f64());
        }
        body
    }
}

/// Errors raised by the persistence adapter and seed loaders.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Seed files, journal entries
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when no character has been stored yet.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Seed content that parses but cannot form a valid sheet
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// A previous writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}
