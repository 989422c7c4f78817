//! # CLI Layer
//!
//! The terminal client is one consumer of the library, like the REST server.
//! It is the only place that knows about stdout, stderr and exit codes.
//!
//! ## Local or mirrored
//!
//! Every command goes through a [`ProxyPractice`]. With no server configured
//! (or with `--offline`) the proxy has no remote and reads and writes
//! `<home>/data` directly. With a server configured it mirrors that server into
//! `<home>/cache` and keeps working from the mirror when the server is down.
//!
//! ## Updates
//!
//! `update` fetches the current value, turns it into a draft, and overlays only
//! the flags that were given. Absent flags keep their value.

use super::args::{
    AppointmentCommands, AppointmentFields, Cli, Commands, NoteCommands, NoteFields,
    PatientCommands, PatientFields, PhysicianCommands, PhysicianFields,
};
use super::print::{
    print_appointment, print_appointments, print_config, print_message, print_note, print_notes,
    print_patient, print_patients, print_physician, print_physicians, MessageLevel,
};
use chrono::NaiveDate;
use clap::Parser;
use medpractice::api::PracticeApi;
use medpractice::commands::appointments::AppointmentFilter;
use medpractice::commands::notes::NoteFilter;
use medpractice::config::{self, PracticeConfig, KEYS};
use medpractice::error::{PracticeError, Result};
use medpractice::logging;
use medpractice::model::{
    Appointment, AppointmentDraft, EntityKind, Id, MedicalNote, NoteDraft, Patient, PatientDraft,
    Physician, PhysicianDraft,
};
use medpractice::proxy::ProxyPractice;
use medpractice::remote::RemoteClient;
use medpractice::store::fs::FileStore;
use std::path::PathBuf;

struct AppContext {
    proxy: ProxyPractice<FileStore>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "warn" });

    let home = config::resolve_home(cli.home.clone())?;

    // Config never needs the store or the network
    if let Commands::Config { key, value } = &cli.command {
        return handle_config(home, key.clone(), value.clone());
    }

    let ctx = init_context(&cli, home)?;
    match cli.command {
        Commands::Patients(cmd) => handle_patients(&ctx, cmd),
        Commands::Physicians(cmd) => handle_physicians(&ctx, cmd),
        Commands::Appointments(cmd) => handle_appointments(&ctx, cmd),
        Commands::Notes(cmd) => handle_notes(&ctx, cmd),
        Commands::Config { .. } => Ok(()),
    }
}

fn init_context(cli: &Cli, home: PathBuf) -> Result<AppContext> {
    let config = PracticeConfig::load(&home)?;
    let remote_url = if cli.offline {
        None
    } else {
        cli.remote.clone().or(config.remote_url.clone())
    };

    let proxy = match remote_url {
        Some(url) => {
            let remote = RemoteClient::new(&url, config.timeout())?;
            let local = PracticeApi::open(FileStore::new(config::cache_dir(&home)))?;
            let proxy = ProxyPractice::new(local, Some(remote));
            if !proxy.sync()? {
                print_message(
                    MessageLevel::Warning,
                    &format!("{} is unreachable, working from the local mirror", url),
                );
            }
            proxy
        }
        None => ProxyPractice::offline(PracticeApi::open(FileStore::new(config::data_dir(
            &home,
        )))?),
    };

    Ok(AppContext { proxy })
}

fn handle_config(home: PathBuf, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = PracticeConfig::load(&home)?;
    match (key, value) {
        (None, _) => {
            let entries = KEYS
                .iter()
                .map(|k| config.get(k).map(|v| (*k, v)))
                .collect::<Result<Vec<_>>>()?;
            print_config(&entries);
        }
        (Some(key), None) => println!("{}", config.get(&key)?),
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(&home)?;
            print_message(
                MessageLevel::Success,
                &format!("{} = {}", key, config.get(&key)?),
            );
        }
    }
    Ok(())
}

fn required<T>(flag: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| PracticeError::ValidationFailed(format!("--{} is required", flag)))
}

fn created(kind: EntityKind, id: Id) {
    print_message(MessageLevel::Success, &format!("{} {} created", kind, id));
}

fn updated(kind: EntityKind, id: Id) {
    print_message(MessageLevel::Success, &format!("{} {} updated", kind, id));
}

fn deleted(kind: EntityKind, id: Id) {
    print_message(MessageLevel::Success, &format!("{} {} deleted", kind, id));
}

fn join_query(words: Vec<String>) -> String {
    words.join(" ")
}

fn handle_patients(ctx: &AppContext, cmd: PatientCommands) -> Result<()> {
    let proxy = &ctx.proxy;
    match cmd {
        PatientCommands::List => print_patients(&proxy.list::<Patient>()?),
        PatientCommands::Get { id } => print_patient(&proxy.get::<Patient>(id)?),
        PatientCommands::Search { query } => {
            print_patients(&proxy.search::<Patient>(&join_query(query))?)
        }
        PatientCommands::Create(fields) => {
            let draft = PatientDraft {
                first_name: String::new(),
                last_name: String::new(),
                address: String::new(),
                birthdate: required("birthdate", fields.birthdate)?,
                race: None,
                gender: None,
            };
            let patient = proxy.create(apply_patient(draft, fields))?;
            created(EntityKind::Patient, patient.id);
        }
        PatientCommands::Update { id, fields } => {
            let current = proxy.get::<Patient>(id)?;
            let patient = proxy.update(id, apply_patient(PatientDraft::from(&current), fields))?;
            updated(EntityKind::Patient, patient.id);
        }
        PatientCommands::Delete { id } => {
            proxy.delete::<Patient>(id)?;
            deleted(EntityKind::Patient, id);
        }
    }
    Ok(())
}

fn apply_patient(mut draft: PatientDraft, fields: PatientFields) -> PatientDraft {
    if let Some(v) = fields.first_name {
        draft.first_name = v;
    }
    if let Some(v) = fields.last_name {
        draft.last_name = v;
    }
    if let Some(v) = fields.address {
        draft.address = v;
    }
    if let Some(v) = fields.birthdate {
        draft.birthdate = v;
    }
    if let Some(v) = fields.race {
        draft.race = Some(v);
    }
    if let Some(v) = fields.gender {
        draft.gender = Some(v);
    }
    draft
}

fn handle_physicians(ctx: &AppContext, cmd: PhysicianCommands) -> Result<()> {
    let proxy = &ctx.proxy;
    match cmd {
        PhysicianCommands::List => print_physicians(&proxy.list::<Physician>()?),
        PhysicianCommands::Get { id } => print_physician(&proxy.get::<Physician>(id)?),
        PhysicianCommands::Search { query } => {
            print_physicians(&proxy.search::<Physician>(&join_query(query))?)
        }
        PhysicianCommands::Create(fields) => {
            let draft = PhysicianDraft {
                first_name: String::new(),
                last_name: String::new(),
                license_number: String::new(),
                graduation: required("graduation", fields.graduation)?,
                specialization: None,
            };
            let physician = proxy.create(apply_physician(draft, fields))?;
            created(EntityKind::Physician, physician.id);
        }
        PhysicianCommands::Update { id, fields } => {
            let current = proxy.get::<Physician>(id)?;
            let physician =
                proxy.update(id, apply_physician(PhysicianDraft::from(&current), fields))?;
            updated(EntityKind::Physician, physician.id);
        }
        PhysicianCommands::Delete { id } => {
            proxy.delete::<Physician>(id)?;
            deleted(EntityKind::Physician, id);
        }
    }
    Ok(())
}

fn apply_physician(mut draft: PhysicianDraft, fields: PhysicianFields) -> PhysicianDraft {
    if let Some(v) = fields.first_name {
        draft.first_name = v;
    }
    if let Some(v) = fields.last_name {
        draft.last_name = v;
    }
    if let Some(v) = fields.license {
        draft.license_number = v;
    }
    if let Some(v) = fields.graduation {
        draft.graduation = v;
    }
    if let Some(v) = fields.specialization {
        draft.specialization = Some(v);
    }
    draft
}

fn handle_appointments(ctx: &AppContext, cmd: AppointmentCommands) -> Result<()> {
    let proxy = &ctx.proxy;
    match cmd {
        AppointmentCommands::List { physician, patient } => {
            let filter = AppointmentFilter {
                patient_id: patient,
                physician_id: physician,
            };
            print_appointments(&proxy.appointments(filter)?)
        }
        AppointmentCommands::Get { id } => print_appointment(&proxy.get::<Appointment>(id)?),
        AppointmentCommands::Create(fields) => {
            let date = required("date", fields.date)?;
            let draft = AppointmentDraft {
                patient_id: required("patient", fields.patient)?,
                physician_id: required("physician", fields.physician)?,
                start: date.and_time(required("start", fields.start)?),
                end: date.and_time(required("end", fields.end)?),
            };
            let appointment = proxy.create(draft)?;
            created(EntityKind::Appointment, appointment.id);
        }
        AppointmentCommands::Update { id, fields } => {
            let current = proxy.get::<Appointment>(id)?;
            let appointment =
                proxy.update(id, apply_appointment(AppointmentDraft::from(&current), fields))?;
            updated(EntityKind::Appointment, appointment.id);
        }
        AppointmentCommands::Delete { id } => {
            proxy.delete::<Appointment>(id)?;
            deleted(EntityKind::Appointment, id);
        }
    }
    Ok(())
}

/// `--date` moves the whole slot; `--start`/`--end` change the times on that day.
fn apply_appointment(mut draft: AppointmentDraft, fields: AppointmentFields) -> AppointmentDraft {
    if let Some(v) = fields.patient {
        draft.patient_id = v;
    }
    if let Some(v) = fields.physician {
        draft.physician_id = v;
    }
    let date: NaiveDate = fields.date.unwrap_or(draft.start.date());
    draft.start = date.and_time(fields.start.unwrap_or(draft.start.time()));
    draft.end = date.and_time(fields.end.unwrap_or(draft.end.time()));
    draft
}

fn handle_notes(ctx: &AppContext, cmd: NoteCommands) -> Result<()> {
    let proxy = &ctx.proxy;
    match cmd {
        NoteCommands::List { patient } => {
            print_notes(&proxy.notes(NoteFilter { patient_id: patient })?)
        }
        NoteCommands::Get { id } => print_note(&proxy.get::<MedicalNote>(id)?),
        NoteCommands::Create(fields) => {
            let draft = NoteDraft {
                patient_id: required("patient", fields.patient)?,
                physician_id: required("physician", fields.physician)?,
                diagnoses: fields.diagnoses.unwrap_or_default(),
                prescriptions: fields.prescriptions.unwrap_or_default(),
            };
            let note = proxy.create(draft)?;
            created(EntityKind::MedicalNote, note.id);
        }
        NoteCommands::Update { id, fields } => {
            let current = proxy.get::<MedicalNote>(id)?;
            let note = proxy.update(id, apply_note(NoteDraft::from(&current), fields))?;
            updated(EntityKind::MedicalNote, note.id);
        }
        NoteCommands::Delete { id } => {
            proxy.delete::<MedicalNote>(id)?;
            deleted(EntityKind::MedicalNote, id);
        }
    }
    Ok(())
}

fn apply_note(mut draft: NoteDraft, fields: NoteFields) -> NoteDraft {
    if let Some(v) = fields.patient {
        draft.patient_id = v;
    }
    if let Some(v) = fields.physician {
        draft.physician_id = v;
    }
    if let Some(v) = fields.diagnoses {
        draft.diagnoses = v;
    }
    if let Some(v) = fields.prescriptions {
        draft.prescriptions = v;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn booked() -> AppointmentDraft {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        AppointmentDraft {
            patient_id: 1,
            physician_id: 1,
            start: day.and_time(at(9, 0)),
            end: day.and_time(at(10, 0)),
        }
    }

    #[test]
    fn absent_flags_keep_the_current_values() {
        let draft = apply_appointment(booked(), AppointmentFields::default());
        assert_eq!(draft, booked());

        let note = NoteDraft {
            patient_id: 1,
            physician_id: 2,
            diagnoses: "Flu".into(),
            prescriptions: "Rest".into(),
        };
        let changed = apply_note(
            note.clone(),
            NoteFields {
                prescriptions: Some("Fluids".into()),
                ..Default::default()
            },
        );
        assert_eq!(changed.diagnoses, "Flu");
        assert_eq!(changed.prescriptions, "Fluids");
    }

    #[test]
    fn moving_the_date_keeps_the_times() {
        let draft = apply_appointment(
            booked(),
            AppointmentFields {
                date: NaiveDate::from_ymd_opt(2025, 1, 7),
                end: Some(at(11, 0)),
                ..Default::default()
            },
        );
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(draft.start, tuesday.and_time(at(9, 0)));
        assert_eq!(draft.end, tuesday.and_time(at(11, 0)));
    }

    #[test]
    fn patient_flags_overlay_the_draft() {
        let base = PatientDraft {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            address: "London".into(),
            birthdate: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            race: None,
            gender: Some("F".into()),
        };
        let draft = apply_patient(
            base,
            PatientFields {
                last_name: Some("Lovelace".into()),
                ..Default::default()
            },
        );
        assert_eq!(draft.first_name, "Ada");
        assert_eq!(draft.last_name, "Lovelace");
        assert_eq!(draft.gender.as_deref(), Some("F"));
    }

    #[test]
    fn missing_required_flags_are_validation_errors() {
        let err = required::<u32>("patient", None).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: --patient is required");
    }
}
