//! Fixtures shared by the unit tests.

use crate::commands;
use crate::model::{
    AppointmentDraft, Id, NoteDraft, Patient, PatientDraft, PhysicianDraft,
};
use crate::store::table::Records;
use chrono::{NaiveDate, NaiveDateTime};

/// Monday 2025-01-06 at the given wall-clock time.
pub fn monday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 6)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn patient_draft(first: &str, last: &str) -> PatientDraft {
    PatientDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: String::new(),
        birthdate: NaiveDate::from_ymd_opt(1990, 1, 31).unwrap(),
        race: None,
        gender: None,
    }
}

pub fn patient_with_id(id: Id) -> Patient {
    Patient {
        id,
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        address: String::new(),
        birthdate: NaiveDate::from_ymd_opt(1990, 1, 31).unwrap(),
        race: None,
        gender: None,
    }
}

pub fn physician_draft(license: &str) -> PhysicianDraft {
    PhysicianDraft {
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
        license_number: license.to_string(),
        graduation: NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
        specialization: None,
    }
}

pub fn appointment_draft(
    patient_id: Id,
    physician_id: Id,
    start: (u32, u32),
    end: (u32, u32),
) -> AppointmentDraft {
    AppointmentDraft {
        patient_id,
        physician_id,
        start: monday(start.0, start.1),
        end: monday(end.0, end.1),
    }
}

pub fn note_draft(patient_id: Id, physician_id: Id) -> NoteDraft {
    NoteDraft {
        patient_id,
        physician_id,
        diagnoses: "Seasonal flu".to_string(),
        prescriptions: "Rest".to_string(),
    }
}

/// Two patients (ids 1, 2) and two physicians (ids 1, 2).
pub fn seeded_records() -> Records {
    let mut records = Records::default();
    for (first, last) in [("Ada", "Lovelace"), ("Alan", "Turing")] {
        let p = commands::create(&records, patient_draft(first, last)).unwrap();
        records.patients.upsert(p).unwrap();
    }
    for license in ["LIC-1", "LIC-2"] {
        let d = commands::create(&records, physician_draft(license)).unwrap();
        records.physicians.upsert(d).unwrap();
    }
    records
}
