//! Character sheet engine: data model, actions, derived views and persistence.
//!
//! The state is a plain value ([`SheetState`]). Every change goes through
//! [`Engine::apply`], which returns a new state or an [`ActionError`] and never
//! touches its input. Derived numbers live only in [`Snapshot`].

pub mod action;
pub mod character;
pub mod dispatch;
pub mod errors;
pub mod inventory;
pub mod ledger;
pub mod seed_loader;
pub mod shop;
pub mod snapshot;
pub mod storage;
pub mod types;

pub use action::{Action, ItemFields, SortKey};
pub use character::{compute_armor_class, compute_bonus, compute_skill_bonus};
pub use dispatch::{Engine, Outcome};
pub use errors::{ActionError, StoreError};
pub use inventory::{equipped_count, format_container, total_quantity};
pub use ledger::{recompute_weight, Credits, WeightReport};
pub use seed_loader::{load_catalog_from_json, load_character_from_json};
pub use shop::{format_catalog, Catalog, CatalogCategory, Listing};
pub use snapshot::Snapshot;
pub use storage::{JournalEntry, SheetStore};
pub use types::*;
