//! # Validation Rules
//!
//! Pure checks applied by the commands before anything is written. None of these
//! functions touch storage; they look at the candidate value and, where needed,
//! at the current tables.
//!
//! - Required text fields must be non-blank.
//! - Appointments must sit inside business hours: Monday to Friday, starting no
//!   earlier than 08:00 and ending no later than 17:00 on the same date.
//! - A physician cannot hold two appointments whose `[start, end)` intervals
//!   intersect. Back-to-back slots are fine.
//! - License numbers are unique across physicians, ignoring case.
//! - Appointments and notes may only point at patients and physicians that exist.

use crate::error::{PracticeError, Result};
use crate::model::{Appointment, EntityKind, Id, Physician};
use crate::store::table::Records;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

pub const OPENING_HOUR: u32 = 8;
pub const CLOSING_HOUR: u32 = 17;

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(hour))
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PracticeError::ValidationFailed(format!("{} is required", field)));
    }
    Ok(())
}

pub fn check_business_hours(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    let reject = |reason: &str| Err(PracticeError::OutOfBusinessHours(reason.to_string()));

    if start >= end {
        return reject("start must be before end");
    }
    if start.date() != end.date() {
        return reject("start and end must fall on the same day");
    }
    if is_weekend(start.weekday()) || is_weekend(end.weekday()) {
        return reject("appointments are only booked Monday to Friday");
    }

    let day = start.date();
    if start < at_hour(day, OPENING_HOUR) || end > at_hour(day, CLOSING_HOUR) {
        return reject("appointments must be between 08:00 and 17:00");
    }
    Ok(())
}

/// Half-open interval intersection.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// First appointment of the same physician that collides with `candidate`,
/// skipping the candidate's own id so an update never conflicts with itself.
pub fn find_conflict<'a>(
    existing: impl IntoIterator<Item = &'a Appointment>,
    candidate: &Appointment,
) -> Option<&'a Appointment> {
    existing.into_iter().find(|a| {
        a.physician_id == candidate.physician_id
            && a.id != candidate.id
            && overlaps(a.start, a.end, candidate.start, candidate.end)
    })
}

pub fn check_schedule<'a>(
    existing: impl IntoIterator<Item = &'a Appointment>,
    candidate: &Appointment,
) -> Result<()> {
    check_business_hours(candidate.start, candidate.end)?;
    if let Some(conflict) = find_conflict(existing, candidate) {
        return Err(PracticeError::DoubleBooked {
            physician_id: candidate.physician_id,
            conflicting_id: conflict.id,
        });
    }
    Ok(())
}

pub fn check_license_unique<'a>(
    physicians: impl IntoIterator<Item = &'a Physician>,
    id: Id,
    license_number: &str,
) -> Result<()> {
    let wanted = license_number.to_lowercase();
    let taken = physicians
        .into_iter()
        .any(|p| p.id != id && p.license_number.to_lowercase() == wanted);
    if taken {
        return Err(PracticeError::DuplicateLicense(license_number.to_string()));
    }
    Ok(())
}

pub fn check_references(records: &Records, patient_id: Id, physician_id: Id) -> Result<()> {
    if !records.patients.contains(patient_id) {
        return Err(PracticeError::ReferenceNotFound {
            kind: EntityKind::Patient,
            id: patient_id,
        });
    }
    if !records.physicians.contains(physician_id) {
        return Err(PracticeError::ReferenceNotFound {
            kind: EntityKind::Physician,
            id: physician_id,
        });
    }
    Ok(())
}
