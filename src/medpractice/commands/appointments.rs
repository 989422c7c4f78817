use super::Draft;
use crate::error::Result;
use crate::model::{Appointment, AppointmentDraft, Id};
use crate::store::table::Records;
use crate::validation::{check_references, check_schedule};
use serde::{Deserialize, Serialize};

impl Draft for AppointmentDraft {
    type Entity = Appointment;

    fn build(
        self,
        records: &Records,
        id: Id,
        _previous: Option<&Appointment>,
    ) -> Result<Appointment> {
        check_references(records, self.patient_id, self.physician_id)?;

        let candidate = Appointment {
            id,
            patient_id: self.patient_id,
            physician_id: self.physician_id,
            start: self.start,
            end: self.end,
        };
        check_schedule(records.appointments.iter(), &candidate)?;
        Ok(candidate)
    }
}

/// Optional narrowing of an appointment listing. Both filters combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physician_id: Option<Id>,
}

impl AppointmentFilter {
    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none() && self.physician_id.is_none()
    }

    pub fn accepts(&self, appointment: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.physician_id.map_or(true, |id| appointment.physician_id == id)
    }
}

pub fn list(records: &Records, filter: AppointmentFilter) -> Vec<Appointment> {
    records
        .appointments
        .iter()
        .filter(|a| filter.accepts(a))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, update};
    use crate::error::ErrorKind;
    use crate::test_utils::{appointment_draft, seeded_records};

    fn booked(records: &mut Records, draft: AppointmentDraft) -> Appointment {
        let appointment = create(records, draft).unwrap();
        records.appointments.upsert(appointment.clone()).unwrap();
        appointment
    }

    #[test]
    fn books_a_free_weekday_slot() {
        let mut records = seeded_records();
        let a = booked(&mut records, appointment_draft(1, 1, (9, 0), (10, 0)));
        assert_eq!(a.id, 1);
        assert_eq!(list(&records, AppointmentFilter::default()), vec![a]);
    }

    #[test]
    fn references_are_checked_before_hours() {
        let records = seeded_records();
        // Unknown patient on a Saturday still reports the dangling reference
        let mut draft = appointment_draft(99, 1, (9, 0), (10, 0));
        draft.start = draft.start - chrono::TimeDelta::days(2);
        draft.end = draft.end - chrono::TimeDelta::days(2);
        let err = create(&records, draft).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);

        let err = create(&records, appointment_draft(1, 99, (9, 0), (10, 0))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    }

    #[test]
    fn overlapping_slot_is_double_booked() {
        let mut records = seeded_records();
        booked(&mut records, appointment_draft(1, 1, (9, 0), (10, 0)));
        let err = create(&records, appointment_draft(2, 1, (9, 30), (10, 30))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DoubleBooked);
    }

    #[test]
    fn back_to_back_slots_are_allowed() {
        let mut records = seeded_records();
        booked(&mut records, appointment_draft(1, 1, (9, 0), (10, 0)));
        assert!(create(&records, appointment_draft(2, 1, (10, 0), (11, 0))).is_ok());
    }

    #[test]
    fn moving_an_appointment_within_its_own_slot_is_not_a_conflict() {
        let mut records = seeded_records();
        booked(&mut records, appointment_draft(1, 1, (9, 0), (10, 0)));
        let moved = update(&records, 1, appointment_draft(1, 1, (9, 30), (10, 30))).unwrap();
        assert_eq!(moved.id, 1);
    }

    #[test]
    fn filters_by_patient_and_physician() {
        let mut records = seeded_records();
        booked(&mut records, appointment_draft(1, 1, (9, 0), (10, 0)));
        booked(&mut records, appointment_draft(2, 2, (9, 0), (10, 0)));
        booked(&mut records, appointment_draft(2, 1, (11, 0), (12, 0)));

        let for_doctor = AppointmentFilter {
            physician_id: Some(1),
            ..Default::default()
        };
        assert_eq!(list(&records, for_doctor).len(), 2);

        let both = AppointmentFilter {
            patient_id: Some(2),
            physician_id: Some(1),
        };
        let found = list(&records, both);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);
    }
}
