use std::io;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Deserialize;

use crate::error::{DataError, Dataset};
use crate::models::{CoachDirectory, CoachProfile, Roster, SessionRecord};

const SESSION_COLUMNS: [&str; 5] = ["student", "coach", "date", "minutes", "drill_type"];
const ROSTER_COLUMNS: [&str; 1] = ["student"];
const COACH_COLUMNS: [&str; 3] = ["coach", "specialties", "rating"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Deserialize)]
struct SessionRow {
    student: String,
    coach: String,
    date: String,
    minutes: String,
    drill_type: String,
}

#[derive(Deserialize)]
struct RosterRow {
    student: String,
}

#[derive(Deserialize)]
struct CoachRow {
    coach: String,
    specialties: String,
    rating: String,
}

/// Headers are trimmed and lower-cased before the required columns are checked.
fn open_table<R: io::Read>(
    reader: R,
    dataset: Dataset,
    required: &[&str],
) -> Result<csv::Reader<R>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: StringRecord = reader
        .headers()
        .map_err(|source| DataError::Read { dataset, source })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns {
            dataset,
            columns: missing,
        });
    }

    reader.set_headers(headers);
    Ok(reader)
}

fn invalid(
    dataset: Dataset,
    row: usize,
    field: &'static str,
    value: &str,
    reason: &'static str,
) -> DataError {
    DataError::InvalidField {
        dataset,
        row,
        field,
        value: value.to_string(),
        reason,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn read_sessions<R: io::Read>(reader: R) -> Result<Vec<SessionRecord>, DataError> {
    let dataset = Dataset::Sessions;
    let mut reader = open_table(reader, dataset, &SESSION_COLUMNS)?;
    let mut sessions = Vec::new();

    for (idx, result) in reader.deserialize::<SessionRow>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|source| DataError::Read { dataset, source })?;

        let date = parse_date(&raw.date)
            .ok_or_else(|| invalid(dataset, row, "date", &raw.date, "is not a recognized date"))?;
        let minutes = parse_number(&raw.minutes)
            .ok_or_else(|| invalid(dataset, row, "minutes", &raw.minutes, "is not a number"))?;

        let record = SessionRecord {
            student: raw.student,
            coach: raw.coach,
            date,
            minutes,
            drill_type: raw.drill_type,
        };
        record.check(row)?;
        sessions.push(record);
    }

    tracing::debug!(rows = sessions.len(), "loaded sessions");
    Ok(sessions)
}

pub fn read_roster<R: io::Read>(reader: R) -> Result<Roster, DataError> {
    let dataset = Dataset::Roster;
    let mut reader = open_table(reader, dataset, &ROSTER_COLUMNS)?;
    let mut students = Vec::new();

    for (idx, result) in reader.deserialize::<RosterRow>().enumerate() {
        let raw = result.map_err(|source| DataError::Read { dataset, source })?;
        if raw.student.is_empty() {
            return Err(invalid(dataset, idx + 1, "student", "", "must not be empty"));
        }
        students.push(raw.student);
    }

    let roster = Roster::new(students);
    tracing::debug!(students = roster.len(), "loaded roster");
    Ok(roster)
}

pub fn read_coaches<R: io::Read>(reader: R) -> Result<CoachDirectory, DataError> {
    let dataset = Dataset::Coaches;
    let mut reader = open_table(reader, dataset, &COACH_COLUMNS)?;
    let mut profiles = Vec::new();

    for (idx, result) in reader.deserialize::<CoachRow>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|source| DataError::Read { dataset, source })?;
        if raw.coach.is_empty() {
            return Err(invalid(dataset, row, "coach", "", "must not be empty"));
        }

        let rating = if raw.rating.is_empty() {
            None
        } else {
            let value = parse_number(&raw.rating)
                .ok_or_else(|| invalid(dataset, row, "rating", &raw.rating, "is not a number"))?;
            Some(value)
        };

        profiles.push(CoachProfile::new(
            raw.coach,
            raw.specialties.split(','),
            rating,
        ));
    }

    let directory = CoachDirectory::from_profiles(profiles)?;
    tracing::debug!(coaches = directory.len(), "loaded coach profiles");
    Ok(directory)
}
