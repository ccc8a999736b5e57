use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::engine::ledger::Credits;

pub const SHEET_SCHEMA_VERSION: u8 = 1;

/// Effect text shown for equipment that never had one assigned.
pub const DEFAULT_EFFECT: &str = "No effect";

// ============================================================================
// Rules
// ============================================================================

/// Tunable constants of the sheet engine. Loaded from the `[rules]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRules {
    /// Bag weight (kg) above which the character counts as overweight
    pub overweight_threshold_kg: f64,
    /// Dexterity bonus reduction while overweight
    pub overweight_dex_penalty: i32,
    /// Armor class before Dexterity and equipment bonuses
    pub base_armor_class: i32,
    /// Maximum simultaneously equipped weapons
    pub max_equipped_weapons: usize,
    /// Maximum simultaneously equipped equipment pieces
    pub max_equipped_equipments: usize,
    /// Bonus added to a skill when the character is specialized in it
    pub specialization_bonus: i32,
    /// Case-insensitive prefix identifying the Dexterity ability ("Dex", "Dextérité", ...)
    pub dexterity_key: String,
    pub score_min: i32,
    pub score_max: i32,
}

impl Default for SheetRules {
    fn default() -> Self {
        Self {
            overweight_threshold_kg: 50.0,
            overweight_dex_penalty: 1,
            base_armor_class: 10,
            max_equipped_weapons: 4,
            max_equipped_equipments: 3,
            specialization_bonus: 2,
            dexterity_key: "dex".to_string(),
            score_min: 1,
            score_max: 20,
        }
    }
}

impl SheetRules {
    /// Equip cap for a category; `None` for categories that cannot be equipped.
    pub fn equip_limit(&self, kind: ItemKind) -> Option<usize> {
        match kind {
            ItemKind::Weapon => Some(self.max_equipped_weapons),
            ItemKind::Equipment => Some(self.max_equipped_equipments),
            ItemKind::Item => None,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Opaque, stable item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id for the `seq`-th item minted by a sheet. Same input, same id.
    pub fn from_sequence(seq: u64) -> Self {
        let name = format!("charsheet-item-{seq}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Item category tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Item,
    #[serde(alias = "arme")]
    Weapon,
    #[serde(alias = "equipement", alias = "équipement")]
    Equipment,
}

impl ItemKind {
    pub fn is_equippable(&self) -> bool {
        !matches!(self, ItemKind::Item)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Item => "item",
            ItemKind::Weapon => "weapon",
            ItemKind::Equipment => "equipment",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weapon fields. Kept as free text: "30/120", "+5", "1d8+2".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatProfile {
    pub range: String,
    pub hit: String,
    pub damage: String,
}

/// Equipment fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    pub ac_bonus: i32,
    pub effect: String,
}

impl Default for DefenseProfile {
    fn default() -> Self {
        Self {
            ac_bonus: 0,
            effect: DEFAULT_EFFECT.to_string(),
        }
    }
}

/// One stack of an item inside a container.
///
/// `combat` and `defense` survive recategorization: a weapon turned back into
/// equipment keeps its combat fields, they are simply not read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: Credits,
    pub unit_weight: f64,
    pub quantity: u32,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default, alias = "equiped")]
    pub equipped: bool,
    #[serde(default)]
    pub combat: Option<CombatProfile>,
    #[serde(default)]
    pub defense: Option<DefenseProfile>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, unit_price: Credits, unit_weight: f64, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            unit_price,
            unit_weight,
            quantity,
            kind: ItemKind::Item,
            equipped: false,
            combat: None,
            defense: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn weapon(mut self, range: &str, hit: &str, damage: &str) -> Self {
        self.kind = ItemKind::Weapon;
        self.combat = Some(CombatProfile {
            range: range.to_string(),
            hit: hit.to_string(),
            damage: damage.to_string(),
        });
        self
    }

    pub fn equipment(mut self, ac_bonus: i32, effect: &str) -> Self {
        self.kind = ItemKind::Equipment;
        self.defense = Some(DefenseProfile {
            ac_bonus,
            effect: effect.to_string(),
        });
        self
    }

    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    /// Σ price for this stack
    pub fn total_value(&self) -> Credits {
        self.unit_price.times(self.quantity)
    }

    /// Σ weight (kg) for this stack
    pub fn total_weight(&self) -> f64 {
        self.unit_weight * f64::from(self.quantity)
    }

    /// Equipped flag as read by the rules: only weapons and equipment can be worn.
    pub fn is_worn(&self) -> bool {
        self.equipped && self.kind.is_equippable()
    }

    /// Armor class contributed while worn
    pub fn armor_bonus(&self) -> i32 {
        match (&self.kind, &self.defense) {
            (ItemKind::Equipment, Some(defense)) => defense.ac_bonus,
            _ => 0,
        }
    }
}

// ============================================================================
// Containers
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    #[default]
    #[serde(alias = "sac à dos", alias = "sac")]
    Bag,
    #[serde(alias = "coffre")]
    Chest,
}

impl ContainerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerKind::Bag => "bag",
            ContainerKind::Chest => "chest",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered item stacks, ids unique within the container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub items: Vec<Item>,
}

impl Container {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    /// Quantity held under `id`, 0 when absent
    pub fn quantity_of(&self, id: &ItemId) -> u32 {
        self.get(id).map(|item| item.quantity).unwrap_or(0)
    }
}

// ============================================================================
// Character
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub name: String,
    pub score: i32,
}

impl AbilityScore {
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Governing ability, matched by name or prefix ("Dex" governs "Dextérité")
    pub ability: String,
    #[serde(default)]
    pub specialized: bool,
}

impl Skill {
    pub fn new(name: impl Into<String>, ability: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ability: ability.into(),
            specialized: false,
        }
    }
}

/// The single authoritative state of one character.
///
/// Holds only source-of-truth data. Weights, totals, bonuses and armor class are
/// derived on demand (see [`crate::engine::snapshot`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetState {
    pub schema_version: u8,
    pub name: String,
    pub abilities: Vec<AbilityScore>,
    pub skills: Vec<Skill>,
    pub credits: Credits,
    pub bag: Container,
    pub chest: Container,
    /// Counter feeding [`ItemId::from_sequence`]
    pub next_item_seq: u64,
}

impl SheetState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_version: SHEET_SCHEMA_VERSION,
            name: name.into(),
            abilities: Vec::new(),
            skills: Vec::new(),
            credits: Credits::ZERO,
            bag: Container::default(),
            chest: Container::default(),
            next_item_seq: 0,
        }
    }

    pub fn container(&self, kind: ContainerKind) -> &Container {
        match kind {
            ContainerKind::Bag => &self.bag,
            ContainerKind::Chest => &self.chest,
        }
    }

    pub fn container_mut(&mut self, kind: ContainerKind) -> &mut Container {
        match kind {
            ContainerKind::Bag => &mut self.bag,
            ContainerKind::Chest => &mut self.chest,
        }
    }

    /// Every stack in bag order then chest order, tagged with its location
    pub fn stacks(&self) -> impl Iterator<Item = (ContainerKind, &Item)> {
        self.bag
            .iter()
            .map(|item| (ContainerKind::Bag, item))
            .chain(self.chest.iter().map(|item| (ContainerKind::Chest, item)))
    }

    /// First stack carrying `id`, bag before chest
    pub fn find_item(&self, id: &ItemId) -> Option<(ContainerKind, &Item)> {
        self.stacks().find(|(_, item)| &item.id == id)
    }

    pub fn contains_item(&self, id: &ItemId) -> bool {
        self.bag.contains(id) || self.chest.contains(id)
    }

    /// Apply `f` to every stack carrying `id`; returns how many stacks were touched.
    pub fn for_each_stack_mut(&mut self, id: &ItemId, mut f: impl FnMut(&mut Item)) -> usize {
        let mut touched = 0;
        for item in self
            .bag
            .items
            .iter_mut()
            .chain(self.chest.items.iter_mut())
            .filter(|item| &item.id == id)
        {
            f(item);
            touched += 1;
        }
        touched
    }

    /// Mint a fresh id, skipping any id already present (seeded items carry their own).
    pub fn mint_item_id(&mut self) -> ItemId {
        loop {
            let id = ItemId::from_sequence(self.next_item_seq);
            self.next_item_seq += 1;
            if !self.contains_item(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ids_are_deterministic() {
        assert_eq!(ItemId::from_sequence(7), ItemId::from_sequence(7));
        assert_ne!(ItemId::from_sequence(7), ItemId::from_sequence(8));
    }

    #[test]
    fn test_mint_item_id_skips_taken_ids() {
        let mut state = SheetState::new("Aria");
        let taken = ItemId::from_sequence(0);
        state
            .bag
            .items
            .push(Item::new(taken.clone(), "Rope", Credits::whole(1), 1.0, 1));

        let minted = state.mint_item_id();
        assert_ne!(minted, taken);
        assert_eq!(minted, ItemId::from_sequence(1));
        assert_eq!(state.next_item_seq, 2);
    }

    #[test]
    fn test_armor_bonus_only_for_equipment() {
        let id = ItemId::new("shield");
        let shield = Item::new(id.clone(), "Shield", Credits::whole(10), 3.0, 1).equipment(2, "");
        assert_eq!(shield.armor_bonus(), 2);

        // Same defense fields, but the item was reclassified as a weapon
        let mut bash = shield.clone();
        bash.kind = ItemKind::Weapon;
        assert_eq!(bash.armor_bonus(), 0);
    }

    #[test]
    fn test_container_kind_accepts_french_names() {
        let bag: ContainerKind = serde_json::from_str("\"sac à dos\"").unwrap();
        let chest: ContainerKind = serde_json::from_str("\"coffre\"").unwrap();
        assert_eq!(bag, ContainerKind::Bag);
        assert_eq!(chest, ContainerKind::Chest);
    }

    #[test]
    fn test_stack_totals() {
        let item = Item::new(ItemId::new("arrows"), "Arrow", Credits::from_minor(5), 0.05, 20);
        assert_eq!(item.total_value(), Credits::whole(1));
        assert!((item.total_weight() - 1.0).abs() < 1e-9);
    }
}
