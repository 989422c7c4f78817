use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use medpractice::model::Id;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "medpractice", bin_name = "medpractice", version)]
#[command(about = "Patients, physicians, appointments and medical notes for a small practice", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Home directory holding config.json and data
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub home: Option<PathBuf>,

    /// Mirror this server instead of the configured one
    #[arg(
        long,
        global = true,
        value_name = "URL",
        conflicts_with = "offline",
        help_heading = "Options"
    )]
    pub remote: Option<String>,

    /// Ignore any configured server and use local data only
    #[arg(long, global = true, help_heading = "Options")]
    pub offline: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage patients
    #[command(subcommand)]
    Patients(PatientCommands),

    /// Manage physicians
    #[command(subcommand)]
    Physicians(PhysicianCommands),

    /// Schedule appointments
    #[command(subcommand)]
    Appointments(AppointmentCommands),

    /// Record medical notes
    #[command(subcommand)]
    Notes(NoteCommands),

    /// Show or set configuration
    Config {
        /// Key to read or write (remote-url, listen, timeout-secs)
        key: Option<String>,

        /// New value; omit to print the current one
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    /// List all patients
    #[command(alias = "ls")]
    List,

    /// Show one patient
    Get { id: Id },

    /// Search first name, last name and address
    Search {
        /// Words to look for (empty lists everything)
        query: Vec<String>,
    },

    /// Register a patient
    #[command(alias = "new")]
    Create(PatientFields),

    /// Change a patient; omitted flags keep their value
    Update {
        id: Id,
        #[command(flatten)]
        fields: PatientFields,
    },

    /// Remove a patient
    #[command(alias = "rm")]
    Delete { id: Id },
}

#[derive(Args, Debug, Default)]
pub struct PatientFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub birthdate: Option<NaiveDate>,

    #[arg(long)]
    pub race: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PhysicianCommands {
    /// List all physicians
    #[command(alias = "ls")]
    List,

    /// Show one physician
    Get { id: Id },

    /// Search names, license number and specialization
    Search { query: Vec<String> },

    /// Register a physician
    #[command(alias = "new")]
    Create(PhysicianFields),

    /// Change a physician; omitted flags keep their value
    Update {
        id: Id,
        #[command(flatten)]
        fields: PhysicianFields,
    },

    /// Remove a physician
    #[command(alias = "rm")]
    Delete { id: Id },
}

#[derive(Args, Debug, Default)]
pub struct PhysicianFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// License number, unique regardless of case
    #[arg(long)]
    pub license: Option<String>,

    /// Graduation date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub graduation: Option<NaiveDate>,

    #[arg(long)]
    pub specialization: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// List appointments, optionally for one physician or patient
    #[command(alias = "ls")]
    List {
        #[arg(long, value_name = "ID")]
        physician: Option<Id>,

        #[arg(long, value_name = "ID")]
        patient: Option<Id>,
    },

    /// Show one appointment
    Get { id: Id },

    /// Book an appointment
    #[command(alias = "new")]
    Create(AppointmentFields),

    /// Move or reassign an appointment; omitted flags keep their value
    Update {
        id: Id,
        #[command(flatten)]
        fields: AppointmentFields,
    },

    /// Cancel an appointment
    #[command(alias = "rm")]
    Delete { id: Id },
}

#[derive(Args, Debug, Default)]
pub struct AppointmentFields {
    #[arg(long, value_name = "ID")]
    pub patient: Option<Id>,

    #[arg(long, value_name = "ID")]
    pub physician: Option<Id>,

    /// Day of the appointment (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Start time (HH:MM)
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    pub start: Option<NaiveTime>,

    /// End time (HH:MM)
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    pub end: Option<NaiveTime>,
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// List notes, optionally for one patient
    #[command(alias = "ls")]
    List {
        #[arg(long, value_name = "ID")]
        patient: Option<Id>,
    },

    /// Show one note
    Get { id: Id },

    /// Write a note
    #[command(alias = "new")]
    Create(NoteFields),

    /// Amend a note; omitted flags keep their value
    Update {
        id: Id,
        #[command(flatten)]
        fields: NoteFields,
    },

    /// Remove a note
    #[command(alias = "rm")]
    Delete { id: Id },
}

#[derive(Args, Debug, Default)]
pub struct NoteFields {
    #[arg(long, value_name = "ID")]
    pub patient: Option<Id>,

    #[arg(long, value_name = "ID")]
    pub physician: Option<Id>,

    #[arg(long)]
    pub diagnoses: Option<String>,

    #[arg(long)]
    pub prescriptions: Option<String>,
}

/// Accepts `HH:MM` and `HH:MM:SS`.
fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got '{}'", value))
}
