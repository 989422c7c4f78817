use super::Draft;
use crate::error::Result;
use crate::model::{Id, MedicalNote, NoteDraft};
use crate::store::table::Records;
use crate::validation::check_references;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl Draft for NoteDraft {
    type Entity = MedicalNote;

    fn build(
        self,
        records: &Records,
        id: Id,
        previous: Option<&MedicalNote>,
    ) -> Result<MedicalNote> {
        check_references(records, self.patient_id, self.physician_id)?;

        Ok(MedicalNote {
            id,
            patient_id: self.patient_id,
            physician_id: self.physician_id,
            // Set once; updates keep the first timestamp
            created: previous.map_or_else(now, |p| p.created),
            diagnoses: self.diagnoses.trim().to_string(),
            prescriptions: self.prescriptions.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Id>,
}

pub fn list(records: &Records, filter: NoteFilter) -> Vec<MedicalNote> {
    records
        .notes
        .iter()
        .filter(|n| filter.patient_id.map_or(true, |id| n.patient_id == id))
        .cloned()
        .collect()
}
