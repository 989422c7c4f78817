//! # Client Proxy
//!
//! [`ProxyPractice`] gives clients the same CRUD and search contract as
//! [`PracticeApi`], backed by a remote server when one is configured and
//! reachable, and by a local mirror otherwise.
//!
//! - Reads ask the server first and copy what it returns into the mirror. If the
//!   server cannot be reached, the mirror answers with the last known state.
//! - Writes are validated against the mirror with the same rules the server
//!   applies. When the mirror refuses a write that fresher data could allow
//!   (a missing reference, a clash, an unknown id), the mirror is re-synced
//!   and checked once more; a write that still fails never reaches the
//!   network. The server then gets the write; its reply, including the id it assigned, is copied into
//!   the mirror. If the server cannot be reached, the write is applied to the
//!   mirror alone and the mirror's table assigns the id.
//! - A refusal from the server (4xx) is returned as an error, never masked.
//!
//! Writes applied while offline are not replayed later; the next successful
//! listing replaces the mirror with the server's state.

use crate::api::PracticeApi;
use crate::commands::appointments::AppointmentFilter;
use crate::commands::notes::NoteFilter;
use crate::commands::Draft;
use crate::error::{ErrorKind, Result};
use crate::model::{Appointment, Id, MedicalNote, Patient, Physician, Searchable};
use crate::remote::RemoteClient;
use crate::store::table::Tabled;
use crate::store::StorageBackend;
use tracing::{debug, info};

pub struct ProxyPractice<S: StorageBackend> {
    local: PracticeApi<S>,
    remote: Option<RemoteClient>,
}

impl<S: StorageBackend> ProxyPractice<S> {
    pub fn new(local: PracticeApi<S>, remote: Option<RemoteClient>) -> Self {
        Self { local, remote }
    }

    /// A proxy with no server behind it.
    pub fn offline(local: PracticeApi<S>) -> Self {
        Self::new(local, None)
    }

    pub fn local(&self) -> &PracticeApi<S> {
        &self.local
    }

    pub fn remote(&self) -> Option<&RemoteClient> {
        self.remote.as_ref()
    }

    /// Refresh every mirrored table. Returns `false` when no server answered.
    pub fn sync(&self) -> Result<bool> {
        let Some(remote) = &self.remote else {
            return Ok(false);
        };
        // Referenced tables first so the mirror never points at missing rows
        let synced = self.refresh::<Patient>(remote)?
            && self.refresh::<Physician>(remote)?
            && self.refresh::<Appointment>(remote)?
            && self.refresh::<MedicalNote>(remote)?;
        if synced {
            info!(remote = remote.base_url(), "mirror synchronised");
        }
        Ok(synced)
    }

    fn refresh<T: Tabled>(&self, remote: &RemoteClient) -> Result<bool> {
        match remote.list::<T>()? {
            Some(rows) => {
                self.local.mirror_all(rows)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn list<T: Tabled>(&self) -> Result<Vec<T>> {
        if let Some(remote) = &self.remote {
            if let Some(rows) = remote.list::<T>()? {
                return self.local.mirror_all(rows);
            }
        }
        self.local.list()
    }

    pub fn get<T: Tabled>(&self, id: Id) -> Result<T> {
        if let Some(remote) = &self.remote {
            match remote.get::<T>(id) {
                Ok(Some(found)) => return self.local.mirror(found),
                Ok(None) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.local.forget::<T>(id)?;
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        self.local.get(id)
    }

    pub fn search<T: Searchable + Tabled>(&self, query: &str) -> Result<Vec<T>> {
        if let Some(remote) = &self.remote {
            if let Some(rows) = remote.search::<T>(query)? {
                return rows.into_iter().map(|row| self.local.mirror(row)).collect();
            }
        }
        self.local.search(query)
    }

    pub fn appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
        if let Some(remote) = &self.remote {
            if let Some(rows) = remote.list_filtered::<Appointment, _>(&filter)? {
                if filter.is_empty() {
                    return self.local.mirror_all(rows);
                }
                return rows.into_iter().map(|row| self.local.mirror(row)).collect();
            }
        }
        self.local.appointments(filter)
    }

    pub fn notes(&self, filter: NoteFilter) -> Result<Vec<MedicalNote>> {
        if let Some(remote) = &self.remote {
            if let Some(rows) = remote.list_filtered::<MedicalNote, _>(&filter)? {
                if filter.patient_id.is_none() {
                    return self.local.mirror_all(rows);
                }
                return rows.into_iter().map(|row| self.local.mirror(row)).collect();
            }
        }
        self.local.notes(filter)
    }

    /// Run a mirror check, re-syncing once when the refusal may come from stale rows.
    fn validated(&self, check: impl Fn() -> Result<()>) -> Result<()> {
        let err = match check() {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        let stale = matches!(
            err.kind(),
            ErrorKind::NotFound
                | ErrorKind::ReferenceNotFound
                | ErrorKind::DoubleBooked
                | ErrorKind::DuplicateLicense
        );
        if self.remote.is_none() || !stale {
            return Err(err);
        }
        debug!(kind = ?err.kind(), "mirror refused a write, re-syncing");
        if self.sync()? {
            check()
        } else {
            Err(err)
        }
    }

    pub fn create<D: Draft>(&self, draft: D) -> Result<D::Entity> {
        self.validated(|| self.local.check_create(&draft))?;
        if let Some(remote) = &self.remote {
            if let Some(created) = remote.create(&draft)? {
                return self.local.mirror(created);
            }
        }
        self.local.create(draft)
    }

    pub fn update<D: Draft>(&self, id: Id, draft: D) -> Result<D::Entity> {
        self.validated(|| self.local.check_update(id, &draft))?;
        if let Some(remote) = &self.remote {
            if let Some(updated) = remote.update(id, &draft)? {
                return self.local.mirror(updated);
            }
        }
        self.local.update(id, draft)
    }

    /// Delete by id. Returns the removed value when the mirror knew it.
    pub fn delete<T: Tabled>(&self, id: Id) -> Result<Option<T>> {
        if let Some(remote) = &self.remote {
            match remote.delete::<T>(id) {
                Ok(Some(())) => {
                    let known = self.local.get::<T>(id).ok();
                    self.local.forget::<T>(id)?;
                    return Ok(known);
                }
                Ok(None) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.local.forget::<T>(id)?;
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        self.local.delete(id).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::test_utils::{appointment_draft, patient_draft, physician_draft};
    use std::time::Duration;

    fn with_dead_server() -> ProxyPractice<InMemoryStore> {
        let local = PracticeApi::open(InMemoryStore::new()).unwrap();
        let remote = RemoteClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        ProxyPractice::new(local, Some(remote))
    }

    #[test]
    fn writes_fall_back_to_the_mirror_when_the_server_is_down() {
        let proxy = with_dead_server();
        let patient = proxy.create(patient_draft("Ada", "Lovelace")).unwrap();
        assert_eq!(patient.id, 1);

        let listed: Vec<Patient> = proxy.list().unwrap();
        assert_eq!(listed, vec![patient.clone()]);
        assert_eq!(proxy.get::<Patient>(1).unwrap(), patient);
        assert!(!proxy.sync().unwrap());
    }

    #[test]
    fn validation_still_applies_offline() {
        let proxy = with_dead_server();
        proxy.create(patient_draft("Ada", "Lovelace")).unwrap();
        proxy.create(physician_draft("ABC123")).unwrap();
        proxy.create(appointment_draft(1, 1, (9, 0), (10, 0))).unwrap();

        let err = proxy
            .create(appointment_draft(1, 1, (9, 30), (10, 30)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleBooked);
        let err = proxy.create(physician_draft("abc123")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateLicense);
    }

    #[test]
    fn offline_update_and_delete_hit_the_mirror() {
        let proxy = with_dead_server();
        proxy.create(patient_draft("Ada", "Byron")).unwrap();
        let updated = proxy.update(1, patient_draft("Ada", "Lovelace")).unwrap();
        assert_eq!(updated.last_name, "Lovelace");

        let removed = proxy.delete::<Patient>(1).unwrap();
        assert_eq!(removed.map(|p| p.last_name), Some("Lovelace".to_string()));
        let err = proxy.delete::<Patient>(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn offline_proxies_never_touch_the_network() {
        let proxy = ProxyPractice::offline(PracticeApi::open(InMemoryStore::new()).unwrap());
        assert!(proxy.remote().is_none());
        assert!(!proxy.sync().unwrap());
        let found: Vec<Patient> = proxy.search("").unwrap();
        assert!(found.is_empty());
    }
}
