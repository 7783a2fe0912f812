use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::services::ingest::CrmContact;

/// Contacts reached within this many days count as engaged.
pub const ENGAGED_WITHIN_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Engaged,
    Dormant,
    Unknown,
}

impl Engagement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engagement::Engaged => "engaged",
            Engagement::Dormant => "dormant",
            Engagement::Unknown => "unknown",
        }
    }
}

/// Accepts RFC 3339 or epoch milliseconds, both of which the CRM emits.
fn parse_contact_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

pub fn derive_engagement(last_contacted: Option<&str>, now: DateTime<Utc>) -> Engagement {
    match last_contacted.and_then(parse_contact_time) {
        Some(at) if now - at <= Duration::days(ENGAGED_WITHIN_DAYS) => Engagement::Engaged,
        Some(_) => Engagement::Dormant,
        None => Engagement::Unknown,
    }
}

/// CRM fields written onto a local user's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmUpdate {
    pub email: String,
    pub contact_id: String,
    pub lifecycle_stage: Option<String>,
    pub lead_status: Option<String>,
    pub engagement: Engagement,
    pub synced_at: DateTime<Utc>,
}

impl CrmUpdate {
    /// `None` when the contact carries no email to match on.
    pub fn from_contact(contact: &CrmContact, now: DateTime<Utc>) -> Option<Self> {
        let props = &contact.properties;
        let email = props
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())?;

        Some(Self {
            email: email.to_string(),
            contact_id: contact.id.clone(),
            lifecycle_stage: props.lifecycle_stage.clone(),
            lead_status: props.lead_status.clone(),
            engagement: derive_engagement(props.last_contacted.as_deref(), now),
            synced_at: now,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}
