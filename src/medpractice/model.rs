use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-local identity, assigned by the owning table starting at 1.
pub type Id = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Physician,
    Appointment,
    MedicalNote,
}

impl EntityKind {
    /// Collection name, used both as the REST path segment and the snapshot file stem.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Physician => "physicians",
            EntityKind::Appointment => "appointments",
            EntityKind::MedicalNote => "notes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Patient => "Patient",
            EntityKind::Physician => "Physician",
            EntityKind::Appointment => "Appointment",
            EntityKind::MedicalNote => "Medical note",
        };
        f.write_str(label)
    }
}

/// Anything that lives in a table and is persisted as a JSON array.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Id;
}

/// Entities that support free-text search.
pub trait Searchable: Entity {
    /// `needle` is already lowercased and non-blank.
    fn matches(&self, needle: &str) -> bool;
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn id(&self) -> Id {
        self.id
    }
}

impl Searchable for Patient {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.first_name, needle)
            || contains_ci(&self.last_name, needle)
            || contains_ci(&self.address, needle)
    }
}

impl From<&Patient> for PatientDraft {
    fn from(p: &Patient) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            address: p.address.clone(),
            birthdate: p.birthdate,
            race: p.race.clone(),
            gender: p.gender.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physician {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub graduation: NaiveDate,
    #[serde(default)]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicianDraft {
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub graduation: NaiveDate,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl Entity for Physician {
    const KIND: EntityKind = EntityKind::Physician;

    fn id(&self) -> Id {
        self.id
    }
}

impl Searchable for Physician {
    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.first_name, needle)
            || contains_ci(&self.last_name, needle)
            || contains_ci(&self.license_number, needle)
            || self
                .specialization
                .as_deref()
                .is_some_and(|s| contains_ci(s, needle))
    }
}

impl From<&Physician> for PhysicianDraft {
    fn from(p: &Physician) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            license_number: p.license_number.clone(),
            graduation: p.graduation,
            specialization: p.specialization.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Id,
    pub patient_id: Id,
    pub physician_id: Id,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub patient_id: Id,
    pub physician_id: Id,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Entity for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;

    fn id(&self) -> Id {
        self.id
    }
}

impl From<&Appointment> for AppointmentDraft {
    fn from(a: &Appointment) -> Self {
        Self {
            patient_id: a.patient_id,
            physician_id: a.physician_id,
            start: a.start,
            end: a.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalNote {
    pub id: Id,
    pub patient_id: Id,
    pub physician_id: Id,
    pub created: NaiveDateTime,
    #[serde(default)]
    pub diagnoses: String,
    #[serde(default)]
    pub prescriptions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub patient_id: Id,
    pub physician_id: Id,
    #[serde(default)]
    pub diagnoses: String,
    #[serde(default)]
    pub prescriptions: String,
}

impl Entity for MedicalNote {
    const KIND: EntityKind = EntityKind::MedicalNote;

    fn id(&self) -> Id {
        self.id
    }
}

impl From<&MedicalNote> for NoteDraft {
    fn from(n: &MedicalNote) -> Self {
        Self {
            patient_id: n.patient_id,
            physician_id: n.physician_id,
            diagnoses: n.diagnoses.clone(),
            prescriptions: n.prescriptions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            address: "12 St James's Square".into(),
            birthdate: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            race: None,
            gender: Some("F".into()),
        }
    }

    #[test]
    fn dates_serialize_as_plain_calendar_dates() {
        let json = serde_json::to_value(patient()).unwrap();
        assert_eq!(json["birthdate"], "1815-12-10");
    }

    #[test]
    fn patient_search_covers_names_and_address() {
        let p = patient();
        assert!(p.matches("love"));
        assert!(p.matches("james"));
        assert!(!p.matches("babbage"));
    }

    #[test]
    fn drafts_ignore_the_id_of_a_full_record() {
        let json = serde_json::to_string(&patient()).unwrap();
        let draft: PatientDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(draft, PatientDraft::from(&patient()));
    }

    #[test]
    fn collection_names_are_plural() {
        assert_eq!(EntityKind::MedicalNote.collection(), "notes");
        assert_eq!(EntityKind::Physician.to_string(), "Physician");
    }
}
