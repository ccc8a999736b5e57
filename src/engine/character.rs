//! Ability scores, skills and the numbers derived from them.
//!
//! Bonuses are never stored. They are recomputed from the raw scores and the
//! current bag weight every time a snapshot is built.

use serde_json::Value;

use super::errors::ActionError;
use super::ledger::recompute_weight;
use super::types::{AbilityScore, SheetRules, SheetState, Skill};
use crate::validation::coerce_score;

/// `floor((score - 10) / 2)`, so 9 gives -1 and 8 gives -1.
pub fn compute_bonus(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Locate an ability by exact (case-insensitive) name, falling back to prefix:
/// "Dex" finds "Dextérité".
pub fn find_ability(abilities: &[AbilityScore], name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    abilities
        .iter()
        .position(|a| a.name.to_lowercase() == wanted)
        .or_else(|| {
            abilities
                .iter()
                .position(|a| a.name.to_lowercase().starts_with(&wanted))
        })
}

/// Exact case-insensitive lookup, used when writing a score.
pub fn find_ability_exact(abilities: &[AbilityScore], name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    abilities.iter().position(|a| a.name.to_lowercase() == wanted)
}

pub fn find_skill(skills: &[Skill], name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    skills.iter().position(|s| s.name.to_lowercase() == wanted)
}

pub fn is_dexterity(ability: &AbilityScore, rules: &SheetRules) -> bool {
    let key = rules.dexterity_key.to_lowercase();
    !key.is_empty() && ability.name.to_lowercase().starts_with(&key)
}

pub fn is_overweight(state: &SheetState, rules: &SheetRules) -> bool {
    recompute_weight(&state.bag, rules.overweight_threshold_kg).overweight
}

/// Bonus after read-side penalties. Only Dexterity is penalized, and only while
/// the bag is overweight.
pub fn effective_bonus(ability: &AbilityScore, rules: &SheetRules, overweight: bool) -> i32 {
    let base = compute_bonus(ability.score);
    if overweight && is_dexterity(ability, rules) {
        base - rules.overweight_dex_penalty
    } else {
        base
    }
}

/// Effective Dexterity bonus. A sheet without a Dexterity score counts as 10.
pub fn dexterity_bonus(state: &SheetState, rules: &SheetRules) -> i32 {
    let overweight = is_overweight(state, rules);
    match state.abilities.iter().find(|a| is_dexterity(a, rules)) {
        Some(dex) => effective_bonus(dex, rules, overweight),
        None if overweight => -rules.overweight_dex_penalty,
        None => 0,
    }
}

/// Base AC + effective Dexterity + every worn equipment bonus (each id counted once).
pub fn compute_armor_class(state: &SheetState, rules: &SheetRules) -> i32 {
    let mut seen = std::collections::BTreeSet::new();
    let armor: i32 = state
        .stacks()
        .map(|(_, item)| item)
        .filter(|item| item.is_worn() && seen.insert(&item.id))
        .map(|item| item.armor_bonus())
        .sum();
    rules.base_armor_class + dexterity_bonus(state, rules) + armor
}

/// Governing effective bonus plus the specialization bonus when specialized.
/// A skill whose governing ability is missing reads as 0.
pub fn compute_skill_bonus(state: &SheetState, rules: &SheetRules, skill: &Skill) -> i32 {
    let overweight = is_overweight(state, rules);
    let governing = find_ability(&state.abilities, &skill.ability)
        .map(|idx| effective_bonus(&state.abilities[idx], rules, overweight))
        .unwrap_or(0);
    if skill.specialized {
        governing + rules.specialization_bonus
    } else {
        governing
    }
}

/// Overwrite a raw score, clamped to the configured range. The ability must be
/// named in full; abbreviations are only resolved for skills.
pub fn set_score(
    state: &mut SheetState,
    rules: &SheetRules,
    name: &str,
    raw: &Value,
) -> Result<i32, ActionError> {
    let idx = find_ability_exact(&state.abilities, name)
        .ok_or_else(|| ActionError::UnknownAbility(name.to_string()))?;
    let score = coerce_score(raw, rules.score_min, rules.score_max).ok_or_else(|| {
        ActionError::InvalidAction(format!("score for {} is not a number", name))
    })?;
    state.abilities[idx].score = score;
    Ok(score)
}

pub fn set_specialization(
    state: &mut SheetState,
    name: &str,
    specialized: bool,
) -> Result<(), ActionError> {
    let idx = find_skill(&state.skills, name)
        .ok_or_else(|| ActionError::UnknownSkill(name.to_string()))?;
    state.skills[idx].specialized = specialized;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::Credits;
    use crate::engine::types::{Item, ItemId};
    use serde_json::json;

    fn test_sheet() -> SheetState {
        let mut state = SheetState::new("Aria");
        state.abilities = vec![
            AbilityScore::new("Force", 12),
            AbilityScore::new("Dextérité", 14),
            AbilityScore::new("Constitution", 9),
        ];
        state.skills = vec![Skill::new("Acrobaties", "Dex"), Skill::new("Athlétisme", "For")];
        state
    }

    #[test]
    fn test_compute_bonus_floors() {
        assert_eq!(compute_bonus(10), 0);
        assert_eq!(compute_bonus(11), 0);
        assert_eq!(compute_bonus(14), 2);
        assert_eq!(compute_bonus(9), -1);
        assert_eq!(compute_bonus(8), -1);
        assert_eq!(compute_bonus(1), -5);
        assert_eq!(compute_bonus(20), 5);
    }

    #[test]
    fn test_find_ability_prefers_exact_match() {
        let abilities = vec![AbilityScore::new("Constitution", 9), AbilityScore::new("Con", 11)];
        assert_eq!(find_ability(&abilities, "con"), Some(1));
        assert_eq!(find_ability(&abilities, "Const"), Some(0));
        assert_eq!(find_ability(&abilities, "Wis"), None);
        assert_eq!(find_ability(&abilities, "  "), None);
    }

    #[test]
    fn test_armor_class_with_overweight_penalty() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        state.chest.items.push(
            Item::new(ItemId::new("ring"), "Ring", Credits::whole(50), 0.0, 1)
                .equipment(1, "Shiny")
                .equipped(),
        );
        assert_eq!(compute_armor_class(&state, &rules), 13);

        state
            .bag
            .items
            .push(Item::new(ItemId::new("rocks"), "Rocks", Credits::ZERO, 11.0, 5));
        assert!(is_overweight(&state, &rules));
        assert_eq!(compute_armor_class(&state, &rules), 12);
    }

    #[test]
    fn test_armor_class_ignores_unworn_and_weapons() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        state.bag.items.push(
            Item::new(ItemId::new("helm"), "Helm", Credits::ZERO, 1.0, 1).equipment(3, ""),
        );
        let mut spiked = Item::new(ItemId::new("spiked"), "Spiked shield", Credits::ZERO, 1.0, 1)
            .equipment(2, "")
            .equipped();
        spiked.kind = crate::engine::types::ItemKind::Weapon;
        state.bag.items.push(spiked);
        assert_eq!(compute_armor_class(&state, &rules), 12);
    }

    #[test]
    fn test_split_worn_stack_counts_once() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        let cloak = Item::new(ItemId::new("cloak"), "Cloak", Credits::ZERO, 1.0, 1)
            .equipment(1, "")
            .equipped();
        state.bag.items.push(cloak.clone());
        state.chest.items.push(cloak);
        assert_eq!(compute_armor_class(&state, &rules), 13);
    }

    #[test]
    fn test_skill_bonus_uses_prefix_and_specialization() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        let acrobatics = state.skills[0].clone();
        assert_eq!(compute_skill_bonus(&state, &rules, &acrobatics), 2);

        set_specialization(&mut state, "acrobaties", true).unwrap();
        let acrobatics = state.skills[0].clone();
        assert_eq!(compute_skill_bonus(&state, &rules, &acrobatics), 4);

        let orphan = Skill::new("Chant", "Charisme");
        assert_eq!(compute_skill_bonus(&state, &rules, &orphan), 0);
    }

    #[test]
    fn test_set_score_clamps_and_rejects() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        assert_eq!(set_score(&mut state, &rules, "Force", &json!("25")).unwrap(), 20);
        assert_eq!(state.abilities[0].score, 20);

        let err = set_score(&mut state, &rules, "Sagesse", &json!(10)).unwrap_err();
        assert_eq!(err, ActionError::UnknownAbility("Sagesse".to_string()));

        let err = set_score(&mut state, &rules, "Force", &json!("lots")).unwrap_err();
        assert_eq!(err.code(), "invalid_action");
        assert_eq!(state.abilities[0].score, 20);
    }

    #[test]
    fn test_set_score_requires_full_name() {
        let rules = SheetRules::default();
        let mut state = test_sheet();
        let err = set_score(&mut state, &rules, "C", &json!(18)).unwrap_err();
        assert_eq!(err, ActionError::UnknownAbility("C".to_string()));
        assert_eq!(state.abilities[2].score, 9);

        set_score(&mut state, &rules, "constitution", &json!(18)).unwrap();
        assert_eq!(state.abilities[2].score, 18);
    }

    #[test]
    fn test_set_specialization_unknown_skill() {
        let mut state = test_sheet();
        let err = set_specialization(&mut state, "Pêche", true).unwrap_err();
        assert_eq!(err.code(), "unknown_skill");
    }
}
