//! # API Facade
//!
//! [`PracticeApi`] is the repository every surface talks to: the REST router,
//! the CLI and the client proxy. It owns the four tables behind one exclusive
//! lock and the storage backend they are persisted to.
//!
//! ## Mutation discipline
//!
//! Every create, update and delete runs the same sequence while holding the lock:
//!
//! 1. run the command, which validates and builds the new value
//! 2. apply it to a copy of the affected table
//! 3. write that table's snapshot through the backend
//! 4. swap the copy in
//!
//! Validation failures return before step 2 and write failures before step 4,
//! so a rejected or failed mutation leaves memory and disk exactly as they were.
//! The guard is dropped on every exit path.
//!
//! Reads lock only long enough to clone what they return.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `PracticeApi<FileStore>`
//! - Testing and offline proxies: `PracticeApi<InMemoryStore>`

use crate::commands::{self, appointments::AppointmentFilter, notes::NoteFilter, Draft};
use crate::error::{PracticeError, Result};
use crate::model::{Appointment, Entity, Id, MedicalNote, Searchable};
use crate::store::table::{Records, Table, Tabled};
use crate::store::{load_rows, save_rows, StorageBackend};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

pub struct PracticeApi<S: StorageBackend> {
    records: Mutex<Records>,
    backend: S,
}

impl<S: StorageBackend> PracticeApi<S> {
    /// Load every collection from `backend` and start serving from it.
    pub fn open(backend: S) -> Result<Self> {
        let records = Records {
            patients: Table::from_rows(load_rows(&backend)?)?,
            physicians: Table::from_rows(load_rows(&backend)?)?,
            appointments: Table::from_rows(load_rows(&backend)?)?,
            notes: Table::from_rows(load_rows(&backend)?)?,
        };
        info!(
            patients = records.patients.len(),
            physicians = records.physicians.len(),
            appointments = records.appointments.len(),
            notes = records.notes.len(),
            "practice loaded"
        );
        Ok(Self {
            records: Mutex::new(records),
            backend,
        })
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|_| PracticeError::Store("practice lock poisoned".to_string()))
    }

    fn commit<T: Tabled>(&self, records: &mut Records, table: Table<T>) -> Result<()> {
        save_rows(&self.backend, table.rows())?;
        *T::table_mut(records) = table;
        Ok(())
    }

    pub fn list<T: Tabled>(&self) -> Result<Vec<T>> {
        let records = self.lock()?;
        Ok(T::table(&records).rows().to_vec())
    }

    pub fn get<T: Tabled>(&self, id: Id) -> Result<T> {
        let records = self.lock()?;
        let found = T::table(&records).require(id).cloned();
        found
    }

    pub fn search<T: Searchable + Tabled>(&self, query: &str) -> Result<Vec<T>> {
        let records = self.lock()?;
        Ok(commands::search(&records, query))
    }

    pub fn appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
        let records = self.lock()?;
        Ok(commands::appointments::list(&records, filter))
    }

    pub fn notes(&self, filter: NoteFilter) -> Result<Vec<MedicalNote>> {
        let records = self.lock()?;
        Ok(commands::notes::list(&records, filter))
    }

    pub fn create<D: Draft>(&self, draft: D) -> Result<D::Entity> {
        let mut records = self.lock()?;
        let entity = commands::create(&records, draft)?;

        let mut table = D::Entity::table(&records).clone();
        table.upsert(entity.clone())?;
        self.commit(&mut records, table)?;

        info!(kind = %D::Entity::KIND, id = entity.id(), "created");
        Ok(entity)
    }

    pub fn update<D: Draft>(&self, id: Id, draft: D) -> Result<D::Entity> {
        let mut records = self.lock()?;
        let entity = commands::update(&records, id, draft)?;

        let mut table = D::Entity::table(&records).clone();
        table.upsert(entity.clone())?;
        self.commit(&mut records, table)?;

        info!(kind = %D::Entity::KIND, id, "updated");
        Ok(entity)
    }

    /// Remove by id. Dependent appointments and notes are left alone.
    pub fn delete<T: Tabled>(&self, id: Id) -> Result<T> {
        let mut records = self.lock()?;

        let mut table = T::table(&records).clone();
        let removed = table.remove(id)?;
        self.commit(&mut records, table)?;

        info!(kind = %T::KIND, id, "deleted");
        Ok(removed)
    }

    /// Validate a create without applying it.
    pub fn check_create<D: Draft>(&self, draft: &D) -> Result<()> {
        let records = self.lock()?;
        commands::create(&records, draft.clone()).map(|_| ())
    }

    /// Validate an update without applying it.
    pub fn check_update<D: Draft>(&self, id: Id, draft: &D) -> Result<()> {
        let records = self.lock()?;
        commands::update(&records, id, draft.clone()).map(|_| ())
    }

    /// Store a value produced by another repository as-is, keeping its id.
    pub fn mirror<T: Tabled>(&self, entity: T) -> Result<T> {
        let mut records = self.lock()?;
        let mut table = T::table(&records).clone();
        table.upsert(entity.clone())?;
        self.commit(&mut records, table)?;
        Ok(entity)
    }

    /// Replace a whole table with another repository's listing.
    pub fn mirror_all<T: Tabled>(&self, rows: Vec<T>) -> Result<Vec<T>> {
        let mut records = self.lock()?;
        let mut table = T::table(&records).clone();
        table.replace_all(rows)?;
        let listed = table.rows().to_vec();
        self.commit(&mut records, table)?;
        Ok(listed)
    }

    /// Drop a mirrored value if present.
    pub fn forget<T: Tabled>(&self, id: Id) -> Result<()> {
        let mut records = self.lock()?;
        if !T::table(&records).contains(id) {
            return Ok(());
        }
        let mut table = T::table(&records).clone();
        table.remove(id)?;
        self.commit(&mut records, table)
    }
}
