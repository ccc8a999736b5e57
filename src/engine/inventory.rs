//! Item store: bag and chest stacks, equip slots, transfers and sales.
//!
//! All functions mutate a working copy handed over by the dispatcher. On `Err`
//! the copy is discarded, so a failed call may leave it half-edited.

use std::collections::BTreeSet;

use log::debug;

use super::action::{ItemFields, SortKey};
use super::errors::ActionError;
use super::ledger::{container_value, container_weight, Credits};
use super::types::{
    CombatProfile, Container, ContainerKind, DefenseProfile, Item, ItemId, ItemKind, SheetRules,
    SheetState, DEFAULT_EFFECT,
};
use crate::logutil::escape_log;
use crate::validation::{clean_name, coerce_amount, coerce_bonus, coerce_quantity, coerce_text};

// ============================================================================
// Lookups
// ============================================================================

/// Quantity held under `id` across bag and chest
pub fn total_quantity(state: &SheetState, id: &ItemId) -> u64 {
    u64::from(state.bag.quantity_of(id)) + u64::from(state.chest.quantity_of(id))
}

/// Distinct ids currently equipped as `kind`, bag and chest included
pub fn equipped_ids(state: &SheetState, kind: ItemKind) -> BTreeSet<&ItemId> {
    state
        .stacks()
        .map(|(_, item)| item)
        .filter(|item| item.kind == kind && item.is_worn())
        .map(|item| &item.id)
        .collect()
}

pub fn equipped_count(state: &SheetState, kind: ItemKind) -> usize {
    equipped_ids(state, kind).len()
}

/// Verify `id` may be worn as `kind` without breaking the category cap.
fn check_equip(
    state: &SheetState,
    rules: &SheetRules,
    id: &ItemId,
    kind: ItemKind,
) -> Result<(), ActionError> {
    let limit = rules
        .equip_limit(kind)
        .ok_or_else(|| ActionError::NotEquippable(id.clone()))?;
    let worn = equipped_ids(state, kind);
    if worn.contains(id) {
        return Ok(());
    }
    if worn.len() >= limit {
        return Err(ActionError::EquipLimitExceeded { kind, limit });
    }
    Ok(())
}

// ============================================================================
// Field merging
// ============================================================================

fn merge_combat(existing: Option<CombatProfile>, fields: &ItemFields) -> Option<CombatProfile> {
    if !fields.has_combat_fields() {
        return existing;
    }
    let mut profile = existing.unwrap_or_default();
    if let Some(range) = &fields.range {
        profile.range = coerce_text(range);
    }
    if let Some(hit) = &fields.hit {
        profile.hit = coerce_text(hit);
    }
    if let Some(damage) = &fields.damage {
        profile.damage = coerce_text(damage);
    }
    Some(profile)
}

fn merge_defense(existing: Option<DefenseProfile>, fields: &ItemFields) -> Option<DefenseProfile> {
    if !fields.has_defense_fields() {
        return existing;
    }
    let mut profile = existing.unwrap_or_default();
    if let Some(bonus) = &fields.ac_bonus {
        profile.ac_bonus = coerce_bonus(bonus);
    }
    if let Some(effect) = &fields.effect {
        let effect = effect.trim();
        profile.effect = if effect.is_empty() {
            DEFAULT_EFFECT.to_string()
        } else {
            effect.to_string()
        };
    }
    Some(profile)
}

// ============================================================================
// Operations
// ============================================================================

/// Build a stack from caller fields with boundary coercion. Unequipped.
pub fn item_from_fields(id: ItemId, fields: &ItemFields) -> Result<Item, ActionError> {
    let name = fields
        .name
        .as_deref()
        .and_then(clean_name)
        .ok_or_else(|| ActionError::InvalidAction("item name is required".to_string()))?;

    let unit_price = fields
        .unit_price
        .as_ref()
        .map(|v| Credits::from_f64(coerce_amount(v)))
        .unwrap_or(Credits::ZERO);
    let unit_weight = fields.unit_weight.as_ref().map(coerce_amount).unwrap_or(0.0);
    let quantity = fields.quantity.as_ref().map(coerce_quantity).unwrap_or(1);

    let mut item = Item::new(id, name, unit_price, unit_weight, quantity);
    if let Some(description) = &fields.description {
        item.description = description.trim().to_string();
    }
    item.kind = fields.kind.unwrap_or_default();
    item.combat = merge_combat(None, fields);
    item.defense = merge_defense(None, fields);
    if item.kind == ItemKind::Equipment && item.defense.is_none() {
        item.defense = Some(DefenseProfile::default());
    }
    Ok(item)
}

/// Create a new stack in the bag. New items start unequipped.
pub fn add_item(state: &mut SheetState, fields: &ItemFields) -> Result<ItemId, ActionError> {
    let id = state.mint_item_id();
    let item = item_from_fields(id.clone(), fields)?;
    debug!("add_item: {} x{} into bag as {}", escape_log(&item.name), item.quantity, id);
    state.bag.items.push(item);
    Ok(id)
}

/// Patch every stack carrying `id`. Only fields present in `patch` change;
/// a quantity patch targets the first stack (bag before chest).
pub fn update_item(
    state: &mut SheetState,
    rules: &SheetRules,
    id: &ItemId,
    patch: &ItemFields,
) -> Result<(), ActionError> {
    let current_kind = state
        .find_item(id)
        .map(|(_, item)| item.kind)
        .ok_or_else(|| ActionError::NotFound(id.clone()))?;

    let name = match &patch.name {
        Some(raw) => Some(
            clean_name(raw)
                .ok_or_else(|| ActionError::InvalidAction("item name cannot be empty".to_string()))?,
        ),
        None => None,
    };

    let kind = patch.kind.unwrap_or(current_kind);
    let kind_changed = kind != current_kind;
    if patch.equipped == Some(true) {
        check_equip(state, rules, id, kind)?;
    }

    let unit_price = patch
        .unit_price
        .as_ref()
        .map(|v| Credits::from_f64(coerce_amount(v)));
    let unit_weight = patch.unit_weight.as_ref().map(coerce_amount);

    state.for_each_stack_mut(id, |item| {
        if let Some(name) = &name {
            item.name = name.clone();
        }
        if let Some(description) = &patch.description {
            item.description = description.trim().to_string();
        }
        if let Some(price) = unit_price {
            item.unit_price = price;
        }
        if let Some(weight) = unit_weight {
            item.unit_weight = weight;
        }
        item.kind = kind;
        item.combat = merge_combat(item.combat.take(), patch);
        item.defense = merge_defense(item.defense.take(), patch);
        if kind == ItemKind::Equipment && item.defense.is_none() {
            item.defense = Some(DefenseProfile::default());
        }
        item.equipped = match patch.equipped {
            Some(flag) => flag && kind.is_equippable(),
            None if kind_changed => false,
            None => item.equipped,
        };
    });

    if let Some(raw) = &patch.quantity {
        let quantity = coerce_quantity(raw);
        let stack = match state.bag.get_mut(id) {
            Some(stack) => Some(stack),
            None => state.chest.get_mut(id),
        };
        if let Some(stack) = stack {
            stack.quantity = quantity;
        }
    }
    Ok(())
}

/// Move `qty` units of `id` between containers, merging by id at the destination.
pub fn transfer(
    state: &mut SheetState,
    from: ContainerKind,
    to: ContainerKind,
    id: &ItemId,
    qty: u32,
) -> Result<(), ActionError> {
    if from == to {
        return Err(ActionError::InvalidTransfer(format!(
            "source and destination are both the {}",
            from
        )));
    }
    if qty == 0 {
        return Err(ActionError::InvalidTransfer(
            "quantity must be at least 1".to_string(),
        ));
    }

    let source = state.container(from);
    let pos = source.position(id).ok_or_else(|| {
        ActionError::InvalidTransfer(format!("item {} is not in the {}", id, from))
    })?;
    let stock = source.items[pos].quantity;
    if qty > stock {
        return Err(ActionError::InvalidTransfer(format!(
            "cannot move {} units, only {} in the {}",
            qty, stock, from
        )));
    }

    if let Some(existing) = state.container(to).get(id) {
        if existing.quantity.checked_add(qty).is_none() {
            return Err(ActionError::InvalidTransfer(format!(
                "the {} cannot hold {} more units of {}",
                to, qty, id
            )));
        }
    }

    let source = state.container_mut(from);
    let moved = if qty == stock {
        source.items.remove(pos)
    } else {
        let stack = &mut source.items[pos];
        stack.quantity -= qty;
        let mut split = stack.clone();
        split.quantity = qty;
        split
    };

    let destination = state.container_mut(to);
    match destination.get_mut(id) {
        Some(existing) => existing.quantity += qty,
        None => destination.items.push(moved),
    }
    debug!("transfer: {} x{} {} -> {}", id, qty, from, to);
    Ok(())
}

/// Set the equipped flag on every stack of `id`, enforcing category caps.
pub fn toggle_equip(
    state: &mut SheetState,
    rules: &SheetRules,
    id: &ItemId,
    equipped: bool,
) -> Result<(), ActionError> {
    let kind = state
        .find_item(id)
        .map(|(_, item)| item.kind)
        .ok_or_else(|| ActionError::NotFound(id.clone()))?;
    if !kind.is_equippable() {
        return Err(ActionError::NotEquippable(id.clone()));
    }
    if equipped {
        check_equip(state, rules, id, kind)?;
    }
    state.for_each_stack_mut(id, |item| item.equipped = equipped);
    Ok(())
}

/// Reclassify an item as weapon or equipment, attaching the given type fields.
/// A category change unequips the item; it never equips it.
pub fn assign_type(
    state: &mut SheetState,
    id: &ItemId,
    kind: ItemKind,
    fields: &ItemFields,
) -> Result<(), ActionError> {
    if !kind.is_equippable() {
        return Err(ActionError::InvalidAction(
            "assign_type expects weapon or equipment".to_string(),
        ));
    }
    let touched = state.for_each_stack_mut(id, |item| {
        if item.kind != kind {
            item.equipped = false;
        }
        item.kind = kind;
        match kind {
            ItemKind::Weapon => {
                item.combat = Some(merge_combat(item.combat.take(), fields).unwrap_or_default());
            }
            ItemKind::Equipment => {
                item.defense = Some(merge_defense(item.defense.take(), fields).unwrap_or_default());
            }
            ItemKind::Item => {}
        }
    });
    if touched == 0 {
        return Err(ActionError::NotFound(id.clone()));
    }
    Ok(())
}

/// Remove `qty` units from the first stack of `id` (bag before chest) and return
/// the sale proceeds. An exhausted stack is deleted.
pub fn sell(state: &mut SheetState, id: &ItemId, qty: u32) -> Result<Credits, ActionError> {
    if qty == 0 {
        return Err(ActionError::InvalidSale(
            "quantity must be at least 1".to_string(),
        ));
    }
    let location = [ContainerKind::Bag, ContainerKind::Chest]
        .into_iter()
        .find(|kind| state.container(*kind).contains(id))
        .ok_or_else(|| ActionError::InvalidSale(format!("item {} is not in the bag or chest", id)))?;

    let container = state.container_mut(location);
    let pos = container
        .position(id)
        .ok_or_else(|| ActionError::NotFound(id.clone()))?;
    let stack = &mut container.items[pos];
    if qty > stack.quantity {
        return Err(ActionError::InvalidSale(format!(
            "cannot sell {} units, only {} in stock",
            qty, stack.quantity
        )));
    }

    let proceeds = stack.unit_price.times(qty);
    stack.quantity -= qty;
    if stack.quantity == 0 {
        container.items.remove(pos);
    }
    Ok(proceeds)
}

fn bag_match(bag: &Container, template: &Item) -> Option<usize> {
    bag.items.iter().position(|item| {
        item.name == template.name
            && item.kind == template.kind
            && item.unit_price == template.unit_price
    })
}

/// Verify the bag stack `template` would merge into can take `qty` more units.
pub fn check_bag_room(state: &SheetState, template: &Item, qty: u32) -> Result<(), ActionError> {
    let full = bag_match(&state.bag, template)
        .map(|pos| state.bag.items[pos].quantity.checked_add(qty).is_none())
        .unwrap_or(false);
    if full {
        return Err(ActionError::InvalidAction(format!(
            "the bag cannot hold {} more units of {}",
            qty,
            escape_log(&template.name)
        )));
    }
    Ok(())
}

/// Put `qty` units of `template` into the bag, stacking onto a bag entry with the
/// same name, category and unit price when one exists.
pub fn receive_into_bag(
    state: &mut SheetState,
    template: Item,
    qty: u32,
) -> Result<ItemId, ActionError> {
    check_bag_room(state, &template, qty)?;
    if let Some(pos) = bag_match(&state.bag, &template) {
        let existing = &mut state.bag.items[pos];
        existing.quantity += qty;
        return Ok(existing.id.clone());
    }
    let id = state.mint_item_id();
    let mut item = template;
    item.id = id.clone();
    item.quantity = qty;
    item.equipped = false;
    state.bag.items.push(item);
    Ok(id)
}

/// Reorder a container. Stable: ties keep their previous relative order.
pub fn sort(container: &mut Container, key: SortKey) {
    match key {
        SortKey::Alpha => container
            .items
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Price => container.items.sort_by_key(|item| item.unit_price),
        SortKey::Weight => container
            .items
            .sort_by(|a, b| a.unit_weight.total_cmp(&b.unit_weight)),
    }
}

// ============================================================================
// Display
// ============================================================================

/// Compact text listing of a container
pub fn format_container(title: &str, container: &Container) -> Vec<String> {
    let mut lines = vec![format!("=== {} ===", title)];
    if container.is_empty() {
        lines.push("Empty".to_string());
        return lines;
    }

    for (idx, item) in container.iter().enumerate() {
        let qty_str = if item.quantity != 1 {
            format!("{}x ", item.quantity)
        } else {
            String::new()
        };
        let tag = match (item.kind, item.is_worn()) {
            (ItemKind::Item, _) => String::new(),
            (kind, true) => format!(" [{}, equipped]", kind),
            (kind, false) => format!(" [{}]", kind),
        };
        lines.push(format!(
            "{}. {}{} ({} cr, {:.2} kg){} #{}",
            idx + 1,
            qty_str,
            item.name,
            item.total_value(),
            item.total_weight(),
            tag,
            item.id
        ));
    }

    lines.push(format!(
        "Total: {} cr, {:.2} kg",
        container_value(container),
        container_weight(container)
    ));
    lines
}

// ============================================================================
// Unit Tests
// ============================================================================
