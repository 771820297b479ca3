use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::models::Status;

/// A student's graduation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: i64,
    pub student_number: String,
    pub student_name: String,
    pub submitted_at: DateTime<Utc>,
    pub content: String,
    pub status: Status,
    pub advisor_comment: Option<String>,
    pub department_comment: Option<String>,
    pub dean_comment: Option<String>,
    pub student_affairs_comment: Option<String>,
    pub rejection_reason: Option<String>,
    pub files: Vec<SubmissionFile>,
    pub gpa: Option<f64>,
}

/// Attachment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_type: String,
    #[serde(default, alias = "uploadDate")]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default, alias = "url")]
    pub download_url: Option<String>,
}

/// Wire shape of a submission; everything except `id` may be missing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    pub id: i64,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub student_number: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default, alias = "submissionDate", alias = "createdAt")]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub advisor_comment: Option<String>,
    #[serde(default, alias = "departmentSecretaryComment")]
    pub department_comment: Option<String>,
    #[serde(default, alias = "deansOfficeComment")]
    pub dean_comment: Option<String>,
    #[serde(default)]
    pub student_affairs_comment: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<SubmissionFile>,
    #[serde(default)]
    pub gpa: Option<JsonValue>,
}

impl Submission {
    /// Map a wire record, filling defaults. `None` when the status is unknown.
    pub fn from_raw(raw: RawSubmission, now: DateTime<Utc>) -> Option<Self> {
        let status = match raw.status.as_deref() {
            Some(name) => match Status::from_wire(name) {
                Some(s) => s,
                None => {
                    warn!("submission {}: unknown status {:?}, skipped", raw.id, name);
                    return None;
                }
            },
            None => Status::Pending,
        };

        Some(Self {
            id: raw.id,
            student_number: raw.student_number.unwrap_or_default(),
            student_name: raw.student_name.unwrap_or_default(),
            submitted_at: raw
                .submitted_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(now),
            content: raw.content.unwrap_or_default(),
            status,
            advisor_comment: raw.advisor_comment,
            department_comment: raw.department_comment,
            dean_comment: raw.dean_comment,
            student_affairs_comment: raw.student_affairs_comment,
            rejection_reason: raw.rejection_reason,
            files: raw.files,
            gpa: raw.gpa.as_ref().and_then(gpa_from_json),
        })
    }

    /// Map a JSON array, dropping items that do not fit
    pub fn list_from_json(items: Vec<JsonValue>, now: DateTime<Utc>) -> Vec<Self> {
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RawSubmission>(item) {
                Ok(raw) => Submission::from_raw(raw, now),
                Err(e) => {
                    warn!("dropping malformed submission record: {}", e);
                    None
                }
            })
            .collect()
    }

    /// GPA absent or outside the 4.0 scale
    pub fn needs_gpa(&self) -> bool {
        !self.gpa.is_some_and(is_valid_gpa)
    }
}

impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}) [{}]",
            self.id, self.student_name, self.student_number, self.status
        )?;
        match self.gpa {
            Some(gpa) => write!(f, " GPA {:.2}", gpa),
            None => write!(f, " GPA -"),
        }
    }
}

pub fn is_valid_gpa(gpa: f64) -> bool {
    gpa.is_finite() && (0.0..=4.0).contains(&gpa)
}

/// GPA arrives as a number or a numeric string
pub fn gpa_from_json(value: &JsonValue) -> Option<f64> {
    let gpa = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }?;
    is_valid_gpa(gpa).then_some(gpa)
}

/// RFC 3339, or a zone-less `LocalDateTime` taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// JSON `null` reads as the field's default, same as a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer identifier")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
