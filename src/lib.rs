//! # Charsheet - character sheet, inventory and shop engine
//!
//! Charsheet tracks one tabletop RPG character: ability scores, skills, armor
//! class, a carried bag, a stored chest, equip-limited weapon and equipment
//! slots, a credit purse and a shop catalog.
//!
//! ## Features
//!
//! - **Pure Dispatcher**: every change is a named [`engine::Action`] applied by
//!   [`engine::Engine::apply`], which returns a new state or a typed error.
//! - **Derived Views**: weights, totals, bonuses, armor class and equip views are
//!   recomputed into an [`engine::Snapshot`] after every action.
//! - **Loose Input**: numeric fields accept numbers, `"12,5"` style strings and
//!   booleans, coerced once in [`validation`].
//! - **Persistence**: a sled-backed [`engine::SheetStore`] with an action journal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use charsheet::engine::{Action, Engine, SheetState};
//!
//! let engine = Engine::default();
//! let state = SheetState::new("Aria");
//! let action = Action::from_json(r#"{"action":"update_credits","credits":"120"}"#)?;
//! let next = engine.apply(&state, &action)?;
//! println!("{}", engine.snapshot(&next).credits);
//! # Ok::<(), charsheet::engine::ActionError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - data model, actions, rules, shop, snapshots and storage
//! - [`config`] - configuration management
//! - [`validation`] - boundary coercion of loosely typed values
//! - [`logutil`] - single-line escaping for logged user text

pub mod config;
pub mod engine;
pub mod logutil;
pub mod validation;
