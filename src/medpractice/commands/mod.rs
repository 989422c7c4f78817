//! # Command Layer
//!
//! Business logic for each entity type. Commands read the current [`Records`]
//! and produce new, fully validated entity values; they never write anything.
//! Committing a value to its table and persisting the snapshot is the job of
//! [`crate::api::PracticeApi`], which runs commands under its lock.
//!
//! Every input type implements [`Draft`], which is what lets the API, the REST
//! router and the client proxy share one generic create/update path.

use crate::error::Result;
use crate::model::{Id, Searchable};
use crate::store::table::{Records, Tabled};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod appointments;
pub mod notes;
pub mod patients;
pub mod physicians;

/// User-supplied fields of an entity, without its identity.
pub trait Draft: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Entity: Tabled;

    /// Validate against `records` and build the entity that will be stored
    /// under `id`. `previous` holds the value being replaced on update.
    fn build(
        self,
        records: &Records,
        id: Id,
        previous: Option<&Self::Entity>,
    ) -> Result<Self::Entity>;
}

pub fn create<D: Draft>(records: &Records, draft: D) -> Result<D::Entity> {
    let id = D::Entity::table(records).peek_next_id();
    draft.build(records, id, None)
}

pub fn update<D: Draft>(records: &Records, id: Id, draft: D) -> Result<D::Entity> {
    let previous = D::Entity::table(records).require(id)?;
    draft.build(records, id, Some(previous))
}

/// Case-insensitive substring search. A blank query returns every row.
pub fn search<T: Searchable + Tabled>(records: &Records, query: &str) -> Vec<T> {
    let table = T::table(records);
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return table.rows().to_vec();
    }
    table.iter().filter(|row| row.matches(&needle)).cloned().collect()
}

/// Trim, and turn blank optional text into `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
