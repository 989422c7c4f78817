use super::{clean_optional, Draft};
use crate::error::Result;
use crate::model::{Id, Physician, PhysicianDraft};
use crate::store::table::Records;
use crate::validation::{check_license_unique, require_text};

impl Draft for PhysicianDraft {
    type Entity = Physician;

    fn build(self, records: &Records, id: Id, _previous: Option<&Physician>) -> Result<Physician> {
        require_text("First name", &self.first_name)?;
        require_text("Last name", &self.last_name)?;
        require_text("License number", &self.license_number)?;

        let license_number = self.license_number.trim().to_string();
        check_license_unique(records.physicians.iter(), id, &license_number)?;

        Ok(Physician {
            id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            license_number,
            graduation: self.graduation,
            specialization: clean_optional(self.specialization),
        })
    }
}
