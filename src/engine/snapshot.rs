//! Read-only view returned after every action.
//!
//! Everything derived (totals, weight, bonuses, armor class, equip views) is
//! computed here from a [`SheetState`] and never written back.

use serde::Serialize;

use super::character::{compute_armor_class, compute_bonus, compute_skill_bonus, effective_bonus};
use super::inventory::equipped_count;
use super::ledger::{container_value, container_weight, recompute_weight, Credits};
use super::shop::Catalog;
use super::types::{
    CombatProfile, Container, ContainerKind, DefenseProfile, Item, ItemId, ItemKind, SheetRules,
    SheetState,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatView {
    pub name: String,
    pub score: i32,
    /// Bonus from the raw score alone
    pub base_bonus: i32,
    /// Bonus after the overweight penalty
    pub bonus: i32,
    pub penalized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub name: String,
    pub ability: String,
    pub specialized: bool,
    pub bonus: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub item: Item,
    pub total_value: Credits,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerView {
    pub entries: Vec<EntryView>,
    pub total_value: Credits,
    pub total_weight: f64,
}

impl ContainerView {
    fn build(container: &Container) -> Self {
        Self {
            entries: container
                .iter()
                .map(|item| EntryView {
                    item: item.clone(),
                    total_value: item.total_value(),
                    total_weight: item.total_weight(),
                })
                .collect(),
            total_value: container_value(container),
            total_weight: container_weight(container),
        }
    }
}

/// One row of the weapons or equipments view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub id: ItemId,
    pub name: String,
    pub location: ContainerKind,
    pub quantity: u32,
    pub equipped: bool,
    pub combat: Option<CombatProfile>,
    pub defense: Option<DefenseProfile>,
}

fn slot_views(state: &SheetState, kind: ItemKind) -> Vec<SlotView> {
    state
        .stacks()
        .filter(|(_, item)| item.kind == kind)
        .map(|(location, item)| SlotView {
            id: item.id.clone(),
            name: item.name.clone(),
            location,
            quantity: item.quantity,
            equipped: item.equipped,
            combat: item.combat.clone(),
            defense: item.defense.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub stats: Vec<StatView>,
    pub skills: Vec<SkillView>,
    pub armor_class: i32,
    pub credits: Credits,
    pub bag: ContainerView,
    pub chest: ContainerView,
    pub weapons: Vec<SlotView>,
    pub equipments: Vec<SlotView>,
    pub equipped_weapons: usize,
    pub equipped_equipments: usize,
    pub bag_weight: f64,
    pub overweight: bool,
    pub catalog: Catalog,
}

impl Snapshot {
    pub fn build(state: &SheetState, rules: &SheetRules, catalog: &Catalog) -> Self {
        let weight = recompute_weight(&state.bag, rules.overweight_threshold_kg);

        let stats = state
            .abilities
            .iter()
            .map(|ability| {
                let base_bonus = compute_bonus(ability.score);
                let bonus = effective_bonus(ability, rules, weight.overweight);
                StatView {
                    name: ability.name.clone(),
                    score: ability.score,
                    base_bonus,
                    bonus,
                    penalized: bonus != base_bonus,
                }
            })
            .collect();

        let skills = state
            .skills
            .iter()
            .map(|skill| SkillView {
                name: skill.name.clone(),
                ability: skill.ability.clone(),
                specialized: skill.specialized,
                bonus: compute_skill_bonus(state, rules, skill),
            })
            .collect();

        Self {
            name: state.name.clone(),
            stats,
            skills,
            armor_class: compute_armor_class(state, rules),
            credits: state.credits,
            bag: ContainerView::build(&state.bag),
            chest: ContainerView::build(&state.chest),
            weapons: slot_views(state, ItemKind::Weapon),
            equipments: slot_views(state, ItemKind::Equipment),
            equipped_weapons: equipped_count(state, ItemKind::Weapon),
            equipped_equipments: equipped_count(state, ItemKind::Equipment),
            bag_weight: weight.total_kg,
            overweight: weight.overweight,
            catalog: catalog.clone(),
        }
    }

    /// Header lines for text front ends: identity, purse, AC, abilities and skills.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("=== {} ===", self.name)];
        lines.push(format!(
            "Credits: {}  AC: {}  Bag: {:.2} kg{}",
            self.credits,
            self.armor_class,
            self.bag_weight,
            if self.overweight { " (overweight)" } else { "" }
        ));
        for stat in &self.stats {
            let marker = if stat.penalized { "*" } else { "" };
            lines.push(format!("{} {} ({:+}){}", stat.name, stat.score, stat.bonus, marker));
        }
        for skill in &self.skills {
            let marker = if skill.specialized { " [specialized]" } else { "" };
            lines.push(format!("{} {:+}{}", skill.name, skill.bonus, marker));
        }
        lines.push(format!(
            "Equipped: {} weapons, {} equipments",
            self.equipped_weapons, self.equipped_equipments
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::AbilityScore;

    #[test]
    fn test_snapshot_reports_penalty_and_locations() {
        let rules = SheetRules::default();
        let mut state = SheetState::new("Aria");
        state.abilities = vec![AbilityScore::new("Dextérité", 14)];
        state.credits = Credits::whole(7);
        state
            .bag
            .items
            .push(Item::new(ItemId::new("anvil"), "Anvil", Credits::whole(4), 51.0, 1));
        state.chest.items.push(
            Item::new(ItemId::new("bow"), "Bow", Credits::whole(20), 1.0, 1)
                .weapon("30/120", "+4", "1d6")
                .equipped(),
        );

        let snapshot = Snapshot::build(&state, &rules, &Catalog::default());
        assert!(snapshot.overweight);
        assert_eq!(snapshot.stats[0].base_bonus, 2);
        assert_eq!(snapshot.stats[0].bonus, 1);
        assert!(snapshot.stats[0].penalized);
        assert_eq!(snapshot.armor_class, 11);
        assert_eq!(snapshot.weapons.len(), 1);
        assert_eq!(snapshot.weapons[0].location, ContainerKind::Chest);
        assert_eq!(snapshot.equipped_weapons, 1);
        assert_eq!(snapshot.bag.total_value, Credits::whole(4));
        assert_eq!(snapshot.chest.entries[0].total_value, Credits::whole(20));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut state = SheetState::new("Aria");
        state.bag.items.push(Item::new(ItemId::new("rope"), "Rope", Credits::from_f64(1.5), 2.0, 2));
        let snapshot = Snapshot::build(&state, &SheetRules::default(), &Catalog::default());

        let json = serde_json::to_value(&snapshot).unwrap();
        let entry = &json["bag"]["entries"][0];
        assert_eq!(entry["id"], "rope");
        assert_eq!(entry["total_value"], 3.0);
        assert_eq!(entry["total_weight"], 4.0);
        assert_eq!(json["overweight"], false);
        assert_eq!(json["catalog"], serde_json::json!([]));
    }

    #[test]
    fn test_summary_lines() {
        let mut state = SheetState::new("Aria");
        state.abilities = vec![AbilityScore::new("Force", 15)];
        let snapshot = Snapshot::build(&state, &SheetRules::default(), &Catalog::default());
        let lines = snapshot.summary_lines();
        assert_eq!(lines[0], "=== Aria ===");
        assert_eq!(lines[1], "Credits: 0.00  AC: 10  Bag: 0.00 kg");
        assert_eq!(lines[2], "Force 15 (+2)");
    }
}
