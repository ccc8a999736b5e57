//! Single entry point for state changes.
//!
//! [`Engine::apply`] works on a clone of the incoming state and hands the clone
//! back only when the whole action succeeded.

use log::{debug, info, warn};
use serde_json::Value;

use super::action::Action;
use super::character::{set_score, set_specialization};
use super::errors::ActionError;
use super::inventory;
use super::ledger::{apply_credit_edit, apply_sale};
use super::shop::{self, Catalog};
use super::snapshot::Snapshot;
use super::types::{SheetRules, SheetState};
use crate::logutil::escape_log;
use crate::validation::positive_count;

/// Result of [`Engine::dispatch`]. A rejection carries the snapshot of the
/// unchanged state so callers always have something to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(Box<Snapshot>),
    Rejected {
        error: ActionError,
        snapshot: Box<Snapshot>,
    },
}

impl Outcome {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Outcome::Applied(snapshot) => snapshot,
            Outcome::Rejected { snapshot, .. } => snapshot,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected { error, .. } => Some(error),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    /// `"ok"` or the error code
    pub fn code(&self) -> &'static str {
        self.error().map(ActionError::code).unwrap_or("ok")
    }
}

/// Rules and catalog shared by every action on a sheet
#[derive(Debug, Clone, Default)]
pub struct Engine {
    rules: SheetRules,
    catalog: Catalog,
}

fn count(raw: &Value, what: &str) -> Option<u32> {
    let qty = positive_count(raw);
    if qty.is_none() {
        debug!("{}: rejected quantity {}", what, raw);
    }
    qty
}

impl Engine {
    pub fn new(rules: SheetRules, catalog: Catalog) -> Self {
        Self { rules, catalog }
    }

    pub fn rules(&self) -> &SheetRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self, state: &SheetState) -> Snapshot {
        Snapshot::build(state, &self.rules, &self.catalog)
    }

    /// Apply one action. On `Err` the caller's state is the current state.
    pub fn apply(&self, state: &SheetState, action: &Action) -> Result<SheetState, ActionError> {
        debug!("apply: {}", action.tag());
        let mut next = state.clone();
        let rules = &self.rules;

        match action {
            Action::UpdateStat { name, score } => {
                let score = set_score(&mut next, rules, name, score)?;
                debug!("update_stat: {} = {}", escape_log(name), score);
            }
            Action::ToggleSkill { name, specialized } => {
                set_specialization(&mut next, name, *specialized)?;
            }
            Action::UpdateCredits { credits } => {
                next.credits = apply_credit_edit(credits);
            }
            Action::AddItem(fields) => {
                inventory::add_item(&mut next, fields)?;
            }
            Action::UpdateItem { id, patch } => {
                inventory::update_item(&mut next, rules, id, patch)?;
            }
            Action::TransferItem { from, to, id, qty } => {
                let qty = count(qty, "transfer_item").ok_or_else(|| {
                    ActionError::InvalidTransfer("quantity must be a whole number of at least 1".to_string())
                })?;
                inventory::transfer(&mut next, *from, *to, id, qty)?;
            }
            Action::ToggleEquip { id, equipped } => {
                inventory::toggle_equip(&mut next, rules, id, *equipped)?;
            }
            Action::Sell { id, qty } => {
                let qty = count(qty, "sell").ok_or_else(|| {
                    ActionError::InvalidSale("quantity must be a whole number of at least 1".to_string())
                })?;
                let proceeds = inventory::sell(&mut next, id, qty)?;
                next.credits = apply_sale(next.credits, proceeds);
                info!("sold {} x{} for {} credits", id, qty, proceeds);
            }
            Action::Buy {
                category,
                name,
                qty,
            } => {
                let qty = count(qty, "buy").ok_or_else(|| {
                    ActionError::InvalidAction("quantity must be a whole number of at least 1".to_string())
                })?;
                let purchase = shop::buy(&mut next, &self.catalog, category, name, qty)?;
                info!(
                    "bought {} x{} from {} for {} credits",
                    escape_log(name),
                    purchase.quantity,
                    escape_log(category),
                    purchase.cost
                );
            }
            Action::AssignType { id, kind, fields } => {
                inventory::assign_type(&mut next, id, *kind, fields)?;
            }
            Action::Sort { key, container } => {
                inventory::sort(next.container_mut(*container), *key);
            }
        }

        Ok(next)
    }

    /// Parse and apply a raw JSON payload.
    pub fn apply_value(&self, state: &SheetState, payload: Value) -> Result<SheetState, ActionError> {
        let action = Action::from_value(payload)?;
        self.apply(state, &action)
    }

    /// Apply and always return a state plus a renderable outcome.
    pub fn dispatch(&self, state: SheetState, action: &Action) -> (SheetState, Outcome) {
        match self.apply(&state, action) {
            Ok(next) => {
                let snapshot = self.snapshot(&next);
                (next, Outcome::Applied(Box::new(snapshot)))
            }
            Err(error) => {
                warn!("{} rejected: {}", action.tag(), escape_log(&error.to_string()));
                let snapshot = self.snapshot(&state);
                (
                    state,
                    Outcome::Rejected {
                        error,
                        snapshot: Box::new(snapshot),
                    },
                )
            }
        }
    }
}
