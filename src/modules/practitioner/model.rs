use serde::Serialize;
use sqlx::FromRow;

/// Public practitioner profile, used by the listing and the PDF export.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub organization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// One validated CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct PractitionerRow {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub organization: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
    /// The email belongs to an account that is not a practitioner.
    Conflict,
}
