use crate::error::{PracticeError, Result};
use crate::model::{Appointment, Entity, EntityKind, Id, MedicalNote, Patient, Physician};

/// An id-ordered collection of one entity type plus its id counter.
///
/// This is the only place identities are handed out. The counter never moves
/// backwards, so ids freed by a delete are not reused for the life of the table.
#[derive(Debug, Clone)]
pub struct Table<T: Entity> {
    rows: Vec<T>,
    next_id: Id,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// The id that follows `id`. The last representable id leaves no room for another row.
fn id_after(kind: EntityKind, id: Id) -> Result<Id> {
    id.checked_add(1)
        .ok_or_else(|| PracticeError::Store(format!("{} id {} is out of range", kind, id)))
}

impl<T: Entity> Table<T> {
    pub fn from_rows(mut rows: Vec<T>) -> Result<Self> {
        rows.sort_by_key(|r| r.id());
        rows.dedup_by_key(|r| r.id());
        let next_id = match rows.last() {
            Some(last) => id_after(T::KIND, last.id())?,
            None => 1,
        };
        Ok(Self { rows, next_id })
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The id the next insert will receive.
    pub fn peek_next_id(&self) -> Id {
        self.next_id
    }

    fn position(&self, id: Id) -> Option<usize> {
        self.rows.binary_search_by_key(&id, |r| r.id()).ok()
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.position(id).map(|i| &self.rows[i])
    }

    pub fn contains(&self, id: Id) -> bool {
        self.position(id).is_some()
    }

    pub fn require(&self, id: Id) -> Result<&T> {
        self.get(id).ok_or(PracticeError::NotFound { kind: T::KIND, id })
    }

    /// Insert or replace by id, keeping the rows sorted. The counter advances
    /// past any id seen, whoever assigned it.
    pub fn upsert(&mut self, row: T) -> Result<()> {
        let id = row.id();
        let after = id_after(T::KIND, id)?;
        match self.rows.binary_search_by_key(&id, |r| r.id()) {
            Ok(i) => self.rows[i] = row,
            Err(i) => self.rows.insert(i, row),
        }
        self.next_id = self.next_id.max(after);
        Ok(())
    }

    pub fn remove(&mut self, id: Id) -> Result<T> {
        let i = self
            .position(id)
            .ok_or(PracticeError::NotFound { kind: T::KIND, id })?;
        Ok(self.rows.remove(i))
    }

    /// Replace every row with a mirrored snapshot.
    pub fn replace_all(&mut self, rows: Vec<T>) -> Result<()> {
        let mut replaced = Self::from_rows(rows)?;
        replaced.next_id = replaced.next_id.max(self.next_id);
        *self = replaced;
        Ok(())
    }
}

/// All four tables of a practice.
#[derive(Debug, Clone, Default)]
pub struct Records {
    pub patients: Table<Patient>,
    pub physicians: Table<Physician>,
    pub appointments: Table<Appointment>,
    pub notes: Table<MedicalNote>,
}

/// Gives generic code access to the table that holds a given entity type.
pub trait Tabled: Entity {
    fn table(records: &Records) -> &Table<Self>;
    fn table_mut(records: &mut Records) -> &mut Table<Self>;
}

macro_rules! tabled {
    ($ty:ty, $field:ident) => {
        impl Tabled for $ty {
            fn table(records: &Records) -> &Table<Self> {
                &records.$field
            }

            fn table_mut(records: &mut Records) -> &mut Table<Self> {
                &mut records.$field
            }
        }
    };
}

tabled!(Patient, patients);
tabled!(Physician, physicians);
tabled!(Appointment, appointments);
tabled!(MedicalNote, notes);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::patient_with_id;

    #[test]
    fn counter_starts_after_the_highest_loaded_id() {
        let table = Table::from_rows(vec![patient_with_id(4), patient_with_id(2)]).unwrap();
        assert_eq!(table.peek_next_id(), 5);
        assert_eq!(
            table.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![2, 4]
        );
    }

    #[test]
    fn empty_tables_start_at_one() {
        let table: Table<Patient> = Table::default();
        assert_eq!(table.peek_next_id(), 1);
    }

    #[test]
    fn removing_the_newest_row_does_not_rewind_the_counter() {
        let mut table = Table::default();
        table.upsert(patient_with_id(1)).unwrap();
        table.upsert(patient_with_id(2)).unwrap();
        table.remove(2).unwrap();
        assert_eq!(table.peek_next_id(), 3);
    }

    #[test]
    fn removing_a_missing_row_is_not_found() {
        let mut table: Table<Patient> = Table::default();
        let err = table.remove(9).unwrap_err();
        assert!(matches!(err, PracticeError::NotFound { id: 9, .. }));
    }

    #[test]
    fn replace_all_keeps_the_counter_monotonic() {
        let mut table = Table::from_rows(vec![patient_with_id(8)]).unwrap();
        table.replace_all(vec![patient_with_id(3)]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.peek_next_id(), 9);
    }

    #[test]
    fn the_last_representable_id_is_refused() {
        let err = Table::from_rows(vec![patient_with_id(Id::MAX)]).unwrap_err();
        assert!(matches!(err, PracticeError::Store(_)));

        let mut table = Table::from_rows(vec![patient_with_id(1)]).unwrap();
        assert!(table.upsert(patient_with_id(Id::MAX)).is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.peek_next_id(), 2);
    }
}
