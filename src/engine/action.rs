//! Closed set of actions accepted by the dispatcher.
//!
//! Wire format is a JSON object tagged by `action`:
//!
//! ```json
//! {"action": "transfer_item", "from": "bag", "to": "chest", "id": "…", "qty": "2"}
//! ```
//!
//! Numeric fields stay as raw [`Value`]s until the dispatcher coerces them through
//! [`crate::validation`], so "2", 2 and 2.0 are all accepted where a count is due.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ActionError;
use super::types::{ContainerKind, ItemId, ItemKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    UpdateStat {
        name: String,
        score: Value,
    },
    ToggleSkill {
        name: String,
        specialized: bool,
    },
    UpdateCredits {
        credits: Value,
    },
    /// New items always land in the bag
    AddItem(ItemFields),
    UpdateItem {
        id: ItemId,
        #[serde(flatten)]
        patch: ItemFields,
    },
    TransferItem {
        from: ContainerKind,
        to: ContainerKind,
        id: ItemId,
        qty: Value,
    },
    ToggleEquip {
        id: ItemId,
        #[serde(alias = "equiped")]
        equipped: bool,
    },
    Sell {
        id: ItemId,
        qty: Value,
    },
    Buy {
        #[serde(alias = "sheet")]
        category: String,
        name: String,
        qty: Value,
    },
    AssignType {
        id: ItemId,
        #[serde(rename = "type")]
        kind: ItemKind,
        #[serde(flatten)]
        fields: ItemFields,
    },
    Sort {
        key: SortKey,
        #[serde(default, alias = "source")]
        container: ContainerKind,
    },
}

impl Action {
    /// Parse a decoded JSON payload. Any mismatch is an `InvalidAction`.
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        serde_json::from_value(value).map_err(|e| ActionError::InvalidAction(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, ActionError> {
        serde_json::from_str(text).map_err(|e| ActionError::InvalidAction(e.to_string()))
    }

    /// Wire tag, used in logs and the journal
    pub fn tag(&self) -> &'static str {
        match self {
            Action::UpdateStat { .. } => "update_stat",
            Action::ToggleSkill { .. } => "toggle_skill",
            Action::UpdateCredits { .. } => "update_credits",
            Action::AddItem(_) => "add_item",
            Action::UpdateItem { .. } => "update_item",
            Action::TransferItem { .. } => "transfer_item",
            Action::ToggleEquip { .. } => "toggle_equip",
            Action::Sell { .. } => "sell",
            Action::Buy { .. } => "buy",
            Action::AssignType { .. } => "assign_type",
            Action::Sort { .. } => "sort",
        }
    }
}

/// Item fields a caller may provide. Every field is optional: `add_item` fills
/// gaps with defaults, `update_item` only touches what is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Value>,
    pub unit_weight: Option<Value>,
    #[serde(alias = "qty")]
    pub quantity: Option<Value>,
    #[serde(alias = "type")]
    pub kind: Option<ItemKind>,
    #[serde(alias = "equiped")]
    pub equipped: Option<bool>,
    pub range: Option<Value>,
    pub hit: Option<Value>,
    pub damage: Option<Value>,
    pub ac_bonus: Option<Value>,
    #[serde(alias = "effet")]
    pub effect: Option<String>,
}

impl ItemFields {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn has_combat_fields(&self) -> bool {
        self.range.is_some() || self.hit.is_some() || self.damage.is_some()
    }

    pub fn has_defense_fields(&self) -> bool {
        self.ac_bonus.is_some() || self.effect.is_some()
    }
}

/// Bag ordering keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Alpha,
    #[serde(alias = "prix")]
    Price,
    #[serde(alias = "poids")]
    Weight,
}
