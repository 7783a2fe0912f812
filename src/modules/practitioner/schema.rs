use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PractitionerQuery {
    pub search: Option<String>,
    pub specialty: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PdfDataRequest {
    #[validate(length(min = 1, max = 100, message = "Provide between 1 and 100 ids"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: u32,
    pub updated: u32,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// 1-based line in the uploaded file.
    pub line: u64,
    pub email: Option<String>,
    pub reason: String,
}
