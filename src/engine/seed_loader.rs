//! Seed data loaders for the shop catalog and the starting character.
//!
//! Seeds live in `data/seeds/` as JSON so a game master can edit the shop and
//! the starting sheet without recompiling.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::action::ItemFields;
use super::errors::StoreError;
use super::inventory::{equipped_count, item_from_fields};
use super::ledger::Credits;
use super::shop::Catalog;
use super::types::{AbilityScore, Container, Item, ItemId, ItemKind, SheetRules, SheetState, Skill};
use crate::validation::{coerce_amount, coerce_score};

fn invalid_data(path: &Path, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("Failed to parse {}: {}", path.display(), detail),
    ))
}

/// Load the shop from data/seeds/catalog.json
pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> Result<Catalog, StoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_catalog(&contents).map_err(|e| invalid_data(path, e))
}

pub fn parse_catalog(contents: &str) -> Result<Catalog, StoreError> {
    Ok(serde_json::from_str(contents)?)
}

/// Load the starting sheet from data/seeds/character.json
pub fn load_character_from_json<P: AsRef<Path>>(path: P) -> Result<SheetState, StoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_character(&contents).map_err(|e| invalid_data(path, e))
}

pub fn parse_character(contents: &str) -> Result<SheetState, StoreError> {
    let seed: CharacterSeed = serde_json::from_str(contents)?;
    seed.into_state()
}

// ============================================================================
// Seed formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct CharacterSeed {
    name: String,
    #[serde(default)]
    credits: serde_json::Value,
    #[serde(default, alias = "stats")]
    abilities: Vec<AbilitySeed>,
    #[serde(default)]
    skills: Vec<Skill>,
    #[serde(default, alias = "sac à dos")]
    bag: Vec<ItemSeed>,
    #[serde(default, alias = "coffre")]
    chest: Vec<ItemSeed>,
}

#[derive(Debug, Deserialize)]
struct AbilitySeed {
    name: String,
    score: serde_json::Value,
}

/// Item entry; `id` is optional and minted when absent.
#[derive(Debug, Deserialize)]
struct ItemSeed {
    #[serde(default)]
    id: Option<ItemId>,
    #[serde(flatten)]
    fields: ItemFields,
}

impl CharacterSeed {
    fn into_state(self) -> Result<SheetState, StoreError> {
        let mut state = SheetState::new(self.name.trim());
        state.credits = Credits::from_f64(coerce_amount(&self.credits));
        state.abilities = self
            .abilities
            .into_iter()
            .map(|a| {
                let score = coerce_score(&a.score, 1, 20).unwrap_or(10);
                AbilityScore::new(a.name, score)
            })
            .collect();
        state.skills = self.skills;

        let bag = build_container(&mut state, self.bag, "bag")?;
        let chest = build_container(&mut state, self.chest, "chest")?;
        state.bag = bag;
        state.chest = chest;
        check_equip_caps(&state, &SheetRules::default())?;
        Ok(state)
    }
}

/// A seed must not start with more worn items than the equip caps allow.
fn check_equip_caps(state: &SheetState, rules: &SheetRules) -> Result<(), StoreError> {
    for kind in [ItemKind::Weapon, ItemKind::Equipment] {
        let worn = equipped_count(state, kind);
        if let Some(limit) = rules.equip_limit(kind) {
            if worn > limit {
                return Err(StoreError::InvalidSeed(format!(
                    "{} {} items equipped, at most {} allowed",
                    worn, kind, limit
                )));
            }
        }
    }
    Ok(())
}

fn build_container(
    state: &mut SheetState,
    seeds: Vec<ItemSeed>,
    label: &str,
) -> Result<Container, StoreError> {
    let mut seen = HashSet::new();
    let mut items: Vec<Item> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let id = match seed.id {
            Some(id) => id,
            None => state.mint_item_id(),
        };
        if !seen.insert(id.clone()) {
            return Err(StoreError::InvalidSeed(format!("duplicate item id {} in {}", id, label)));
        }
        let mut item = item_from_fields(id, &seed.fields)
            .map_err(|e| StoreError::InvalidSeed(format!("{} item: {}", label, e)))?;
        item.equipped = seed.fields.equipped.unwrap_or(false) && item.kind.is_equippable();
        items.push(item);
    }
    Ok(Container::new(items))
}
