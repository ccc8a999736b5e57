//! Read-only shop catalog and the purchase path into the bag.

use log::debug;
use serde::{Deserialize, Serialize};

use super::errors::ActionError;
use super::inventory::{check_bag_room, receive_into_bag};
use super::ledger::{apply_purchase, Credits};
use super::types::{CombatProfile, DefenseProfile, Item, ItemId, ItemKind, SheetState, DEFAULT_EFFECT};

/// One purchasable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    #[serde(alias = "prix")]
    pub unit_price: Credits,
    #[serde(default, alias = "poids")]
    pub unit_weight: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub hit: Option<String>,
    #[serde(default)]
    pub damage: Option<String>,
    #[serde(default)]
    pub ac_bonus: Option<i32>,
    #[serde(default)]
    pub effect: Option<String>,
    /// Image reference for front ends; never read by the engine
    #[serde(default)]
    pub image: Option<String>,
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

impl Listing {
    /// Weapon when any combat field is filled, equipment when it grants AC, item otherwise.
    pub fn kind(&self) -> ItemKind {
        if has_text(&self.range) || has_text(&self.hit) || has_text(&self.damage) {
            ItemKind::Weapon
        } else if self.ac_bonus.is_some() {
            ItemKind::Equipment
        } else {
            ItemKind::Item
        }
    }

    /// Item template for this listing. Id and quantity are set by the bag on receipt.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new(
            ItemId::new(""),
            self.name.clone(),
            self.unit_price,
            self.unit_weight.max(0.0),
            0,
        )
        .with_description(self.description.clone());
        item.kind = self.kind();
        match item.kind {
            ItemKind::Weapon => {
                item.combat = Some(CombatProfile {
                    range: self.range.clone().unwrap_or_default(),
                    hit: self.hit.clone().unwrap_or_default(),
                    damage: self.damage.clone().unwrap_or_default(),
                });
            }
            ItemKind::Equipment => {
                item.defense = Some(DefenseProfile {
                    ac_bonus: self.ac_bonus.unwrap_or(0),
                    effect: self
                        .effect
                        .clone()
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_EFFECT.to_string()),
                });
            }
            ItemKind::Item => {}
        }
        item
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCategory {
    #[serde(alias = "sheet")]
    pub category: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

/// Shop categories in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub categories: Vec<CatalogCategory>,
}

impl Catalog {
    pub fn new(categories: Vec<CatalogCategory>) -> Self {
        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.listings.is_empty())
    }

    pub fn category(&self, name: &str) -> Option<&CatalogCategory> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// Exact lookup by category and listing name
    pub fn find_listing(&self, category: &str, name: &str) -> Result<&Listing, ActionError> {
        self.category(category)
            .and_then(|c| c.listings.iter().find(|l| l.name == name))
            .ok_or_else(|| ActionError::UnknownItem {
                category: category.to_string(),
                name: name.to_string(),
            })
    }
}

/// Result of a committed purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub item_id: ItemId,
    pub quantity: u32,
    pub cost: Credits,
}

/// Debit `qty` × price and stock the bag. Bag room and funds are checked before
/// anything moves.
pub fn buy(
    state: &mut SheetState,
    catalog: &Catalog,
    category: &str,
    name: &str,
    qty: u32,
) -> Result<Purchase, ActionError> {
    let listing = catalog.find_listing(category, name)?;
    let template = listing.to_item();
    check_bag_room(state, &template, qty)?;
    let cost = listing.unit_price.times(qty);
    let remaining = apply_purchase(state.credits, cost)?;

    let item_id = receive_into_bag(state, template, qty)?;
    state.credits = remaining;
    debug!("buy: {} x{} for {} (left {})", listing.name, qty, cost, remaining);
    Ok(Purchase {
        item_id,
        quantity: qty,
        cost,
    })
}

/// Text listing of the whole catalog
pub fn format_catalog(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    if catalog.is_empty() {
        lines.push("The shop is empty".to_string());
        return lines;
    }

    for category in &catalog.categories {
        lines.push(format!("=== {} ===", category.category));
        for listing in &category.listings {
            let mut line = format!(
                "{} - {} cr, {:.2} kg",
                listing.name, listing.unit_price, listing.unit_weight
            );
            match listing.kind() {
                ItemKind::Weapon => line.push_str(&format!(
                    " [dmg {}]",
                    listing.damage.as_deref().unwrap_or("-")
                )),
                ItemKind::Equipment => {
                    line.push_str(&format!(" [AC {:+}]", listing.ac_bonus.unwrap_or(0)))
                }
                ItemKind::Item => {}
            }
            lines.push(line);
        }
    }
    lines
}
