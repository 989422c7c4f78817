use super::{clean_optional, Draft};
use crate::error::Result;
use crate::model::{Id, Patient, PatientDraft};
use crate::store::table::Records;
use crate::validation::require_text;

impl Draft for PatientDraft {
    type Entity = Patient;

    fn build(self, _records: &Records, id: Id, _previous: Option<&Patient>) -> Result<Patient> {
        require_text("First name", &self.first_name)?;
        require_text("Last name", &self.last_name)?;

        Ok(Patient {
            id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address: self.address.trim().to_string(),
            birthdate: self.birthdate,
            race: clean_optional(self.race),
            gender: clean_optional(self.gender),
        })
    }
}
