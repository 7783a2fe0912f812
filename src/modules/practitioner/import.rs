use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::collections::HashSet;
use validator::ValidateEmail;

use super::model::PractitionerRow;
use super::schema::SkippedRow;
use crate::modules::users::interface::DirectoryError;

pub const REQUIRED_COLUMNS: [&str; 2] = ["email", "name"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    specialty: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip: Option<String>,
}

#[derive(Debug, Default)]
pub struct ParsedCsv {
    /// `(line, row)` pairs ready to persist.
    pub rows: Vec<(u64, PractitionerRow)>,
    pub skipped: Vec<SkippedRow>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses an uploaded practitioner sheet. Header names are matched
/// case-insensitively; a missing required column rejects the whole file,
/// bad rows are only skipped.
pub fn parse_practitioner_csv(data: &[u8]) -> Result<ParsedCsv, DirectoryError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| DirectoryError::Validation(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DirectoryError::Validation(format!(
                "CSV is missing the '{}' column",
                column
            )));
        }
    }

    let mut parsed = ParsedCsv::default();
    let mut seen = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.skipped.push(SkippedRow {
                    line: fallback_line,
                    email: None,
                    reason: format!("Unreadable row: {}", e),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        let row: CsvRow = match record.deserialize(Some(&headers)) {
            Ok(row) => row,
            Err(e) => {
                parsed.skipped.push(SkippedRow {
                    line,
                    email: None,
                    reason: format!("Unreadable row: {}", e),
                });
                continue;
            }
        };

        let email = non_empty(row.email);
        let skip = |reason: &str| SkippedRow {
            line,
            email: email.clone(),
            reason: reason.to_string(),
        };

        let Some(address) = email.clone().filter(|e| e.validate_email()) else {
            parsed.skipped.push(skip("Missing or invalid email"));
            continue;
        };

        let Some(name) = non_empty(row.name) else {
            parsed.skipped.push(skip("Missing name"));
            continue;
        };

        if !seen.insert(address.clone()) {
            parsed.skipped.push(skip("Duplicate email in file"));
            continue;
        }

        parsed.rows.push((
            line,
            PractitionerRow {
                email: address,
                name,
                phone: non_empty(row.phone),
                specialty: non_empty(row.specialty),
                organization: non_empty(row.organization),
                city: non_empty(row.city),
                state: non_empty(row.state),
                zip: non_empty(row.zip),
            },
        ));
    }

    Ok(parsed)
}
