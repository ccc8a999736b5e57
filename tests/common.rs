//! Test utilities & fixtures shared by the integration tests.

use std::path::{Path, PathBuf};

use charsheet::engine::{
    load_catalog_from_json, load_character_from_json, AbilityScore, Catalog, Credits, Engine,
    Item, ItemId, SheetRules, SheetState, Skill,
};

/// Seed directory shipped with the crate
pub fn seeds_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("seeds")
}

#[allow(dead_code)]
pub fn seed_catalog() -> Catalog {
    load_catalog_from_json(seeds_root().join("catalog.json")).expect("catalog seed")
}

#[allow(dead_code)]
pub fn seed_character() -> SheetState {
    load_character_from_json(seeds_root().join("character.json")).expect("character seed")
}

/// Engine with default rules and the shipped catalog
#[allow(dead_code)]
pub fn seeded_engine() -> Engine {
    Engine::new(SheetRules::default(), seed_catalog())
}

/// Small hand-built sheet: Dex 14, 10 credits, 5 × X at 2.0 in the bag.
#[allow(dead_code)]
pub fn sample_state() -> SheetState {
    let mut state = SheetState::new("Aria");
    state.abilities = vec![
        AbilityScore::new("Force", 10),
        AbilityScore::new("Dextérité", 14),
    ];
    state.skills = vec![Skill::new("Acrobaties", "Dex")];
    state.credits = Credits::whole(10);
    state
        .bag
        .items
        .push(Item::new(ItemId::new("x"), "X", Credits::whole(2), 1.0, 5));
    state
}

/// Sum of a stack quantity over bag and chest
#[allow(dead_code)]
pub fn held(state: &SheetState, id: &str) -> u64 {
    charsheet::engine::total_quantity(state, &ItemId::new(id))
}
