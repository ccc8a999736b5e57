//! Checks on the seed files shipped in data/seeds/

mod common;

use charsheet::engine::{ItemId, ItemKind, SheetRules};

#[test]
fn test_catalog_seed_categories() {
    let catalog = common::seed_catalog();
    let names: Vec<&str> = catalog.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, ["armes", "armures", "objets"]);

    let sword = catalog.find_listing("armes", "Épée longue").unwrap();
    assert_eq!(sword.unit_price.as_f64(), 15.0);
    assert_eq!(sword.kind(), ItemKind::Weapon);

    let arrows = catalog.find_listing("armes", "Flèches (20)").unwrap();
    assert_eq!(arrows.kind(), ItemKind::Item);

    let mail = catalog.find_listing("armures", "Cotte de mailles").unwrap();
    assert_eq!(mail.kind(), ItemKind::Equipment);
}

#[test]
fn test_character_seed_is_consistent() {
    let state = common::seed_character();
    let rules = SheetRules::default();
    assert_eq!(state.name, "Aria");
    assert_eq!(state.abilities.len(), 6);
    assert_eq!(state.skills.len(), 6);

    let dagger = state.bag.get(&ItemId::new("seed-dagger")).unwrap();
    assert_eq!(dagger.kind, ItemKind::Weapon);
    assert!(dagger.equipped);

    let engine = common::seeded_engine();
    let snapshot = engine.snapshot(&state);
    assert!(!snapshot.overweight);
    assert!(snapshot.equipped_weapons <= rules.max_equipped_weapons);
    assert!(snapshot.equipped_equipments <= rules.max_equipped_equipments);
    // Dex 14 (+2) and leather armor +1
    assert_eq!(snapshot.armor_class, 13);
    // Discrétion is specialized: +2 Dex +2
    let stealth = snapshot.skills.iter().find(|s| s.name == "Discrétion").unwrap();
    assert_eq!(stealth.bonus, 4);
}
