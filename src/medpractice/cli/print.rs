use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use medpractice::model::{Appointment, Id, MedicalNote, Patient, Physician};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const RIGHT_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MessageLevel {
    Success,
    Warning,
}

pub(super) fn print_message(level: MessageLevel, content: &str) {
    match level {
        MessageLevel::Success => println!("{}", content.green()),
        MessageLevel::Warning => println!("{}", content.yellow()),
    }
}

/// One listing line: id, main text, and a dimmed right-aligned column.
struct Row {
    id: Id,
    text: String,
    right: String,
}

fn print_rows(rows: &[Row], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.dimmed());
        return;
    }

    let id_width = rows
        .iter()
        .map(|r| r.id.to_string().width())
        .max()
        .unwrap_or(1);

    for row in rows {
        let idx = format!("{:>width$}. ", row.id, width = id_width);
        let available = LINE_WIDTH.saturating_sub(idx.width() + RIGHT_WIDTH);
        let text = truncate_to_width(&row.text, available);
        let padding = available.saturating_sub(text.width());
        println!(
            "{}{}{}{}",
            idx.yellow(),
            text,
            " ".repeat(padding),
            format!("{:>width$}", row.right, width = RIGHT_WIDTH).dimmed()
        );
    }
}

fn print_fields(title: String, fields: &[(&str, String)]) {
    println!("{}", title.bold());
    println!("--------------------------------");
    let label_width = fields.iter().map(|(l, _)| l.width()).max().unwrap_or(0);
    for (label, value) in fields {
        let value = if value.is_empty() { "-" } else { value.as_str() };
        println!(
            "{}  {}",
            format!("{:<width$}", label, width = label_width).dimmed(),
            value
        );
    }
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

pub(super) fn print_patients(patients: &[Patient]) {
    let rows: Vec<Row> = patients
        .iter()
        .map(|p| Row {
            id: p.id,
            text: format!("{}, {}  {}", p.last_name, p.first_name, p.address),
            right: format!("born {}", p.birthdate),
        })
        .collect();
    print_rows(&rows, "No patients found.");
}

pub(super) fn print_patient(p: &Patient) {
    print_fields(
        format!("{} {} {}", p.id.to_string().yellow(), p.first_name, p.last_name),
        &[
            ("Address", p.address.clone()),
            ("Birthdate", p.birthdate.to_string()),
            ("Race", or_dash(&p.race)),
            ("Gender", or_dash(&p.gender)),
        ],
    );
}

pub(super) fn print_physicians(physicians: &[Physician]) {
    let rows: Vec<Row> = physicians
        .iter()
        .map(|d| Row {
            id: d.id,
            text: format!(
                "Dr. {} {}  {}",
                d.first_name,
                d.last_name,
                d.specialization.as_deref().unwrap_or("")
            ),
            right: d.license_number.clone(),
        })
        .collect();
    print_rows(&rows, "No physicians found.");
}

pub(super) fn print_physician(d: &Physician) {
    print_fields(
        format!("{} Dr. {} {}", d.id.to_string().yellow(), d.first_name, d.last_name),
        &[
            ("License", d.license_number.clone()),
            ("Graduated", d.graduation.to_string()),
            ("Specialization", or_dash(&d.specialization)),
        ],
    );
}

fn slot(a: &Appointment) -> String {
    format!("{} {}-{}", a.start.format("%a %Y-%m-%d"), a.start.format("%H:%M"), a.end.format("%H:%M"))
}

pub(super) fn print_appointments(appointments: &[Appointment]) {
    let rows: Vec<Row> = appointments
        .iter()
        .map(|a| Row {
            id: a.id,
            text: format!("patient {} with physician {}", a.patient_id, a.physician_id),
            right: slot(a),
        })
        .collect();
    print_rows(&rows, "No appointments found.");
}

pub(super) fn print_appointment(a: &Appointment) {
    print_fields(
        format!("{} {}", a.id.to_string().yellow(), slot(a)),
        &[
            ("Patient", a.patient_id.to_string()),
            ("Physician", a.physician_id.to_string()),
            ("Start", a.start.to_string()),
            ("End", a.end.to_string()),
        ],
    );
}

pub(super) fn print_notes(notes: &[MedicalNote]) {
    let rows: Vec<Row> = notes
        .iter()
        .map(|n| Row {
            id: n.id,
            text: format!(
                "patient {}: {}",
                n.patient_id,
                n.diagnoses.replace('\n', " ")
            ),
            right: format_time_ago(n.created),
        })
        .collect();
    print_rows(&rows, "No notes found.");
}

pub(super) fn print_note(n: &MedicalNote) {
    print_fields(
        format!("{} Note for patient {}", n.id.to_string().yellow(), n.patient_id),
        &[
            ("Physician", n.physician_id.to_string()),
            ("Created", n.created.to_string()),
            ("Diagnoses", n.diagnoses.clone()),
            ("Prescriptions", n.prescriptions.clone()),
        ],
    );
}

pub(super) fn print_config(entries: &[(&str, String)]) {
    for (key, value) in entries {
        let value = if value.is_empty() { "(unset)" } else { value.as_str() };
        println!("{} = {}", key.bold(), value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

/// Note timestamps are local wall-clock, so compare against local now.
fn format_time_ago(created: NaiveDateTime) -> String {
    let elapsed = Local::now().naive_local().signed_duration_since(created);
    Formatter::new().convert(elapsed.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Lovelace, Ada", 40), "Lovelace, Ada");
    }

    #[test]
    fn long_text_ends_with_an_ellipsis() {
        let truncated = truncate_to_width("Lovelace, Ada  12 St James's Square", 10);
        assert_eq!(truncated, "Lovelace,…");
        assert_eq!(truncated.width(), 10);
    }

    #[test]
    fn wide_characters_count_double() {
        let truncated = truncate_to_width("診療所診療所", 5);
        assert_eq!(truncated, "診療…");
    }

    #[test]
    fn future_timestamps_read_as_now() {
        let later = Local::now().naive_local() + chrono::TimeDelta::hours(1);
        assert_eq!(format_time_ago(later), "now");
    }
}
