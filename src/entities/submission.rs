//! Submission entity type
//!
//! One institution's data package under review. Field names on disk are the
//! ones the review dashboards have always used (`institutionName`,
//! `Established`, `hostel_facilities`, ...), so the serde renames below are
//! part of the storage format and must not change.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::entity::Status;
use crate::core::identity::KeyId;

/// Errors raised before any record is created or moved
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{field}' is empty")]
    MissingField { field: &'static str },

    #[error("A rejection requires a non-empty comment")]
    EmptyComment,

    #[error("Invalid course '{input}': {reason}")]
    InvalidCourse { input: String, reason: String },
}

/// A course offered by the institution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    #[serde(rename = "placementStats", default, deserialize_with = "lenient_text")]
    pub placement_stats: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub cutoff: String,
}

impl Course {
    pub fn new(
        name: impl Into<String>,
        placement_stats: impl Into<String>,
        cutoff: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            placement_stats: placement_stats.into(),
            cutoff: cutoff.into(),
        }
    }

    /// Parse `name:placementStats:cutoff`; trailing parts may be omitted
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut parts = input.splitn(3, ':').map(str::trim);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::InvalidCourse {
                input: input.to_string(),
                reason: "course name is empty".to_string(),
            });
        }
        Ok(Self::new(
            name,
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        ))
    }
}

impl std::str::FromStr for Course {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Course::parse(s)
    }
}

/// The descriptive attributes of a submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionFields {
    #[serde(rename = "institutionName", default, deserialize_with = "lenient_text")]
    pub institution_name: String,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "String::is_empty")]
    pub location: String,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub institution_type: String,

    #[serde(
        rename = "websiteLink",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub website_link: String,

    #[serde(
        rename = "Established",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub established: String,

    #[serde(
        rename = "Affiliation",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub affiliation: String,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "String::is_empty")]
    pub hostel_facilities: String,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "String::is_empty")]
    pub mess_facilities: String,

    #[serde(
        rename = "admissionFees",
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub admission_fees: Option<f64>,

    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "String::is_empty")]
    pub reap_percentile_required: String,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub placement_records: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_package: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub highest_package: Option<f64>,
}

impl SubmissionFields {
    /// Fields with only the institution name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            institution_name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.institution_name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "institutionName",
            });
        }
        Ok(())
    }
}

/// A partial set of fields; `None` leaves the current value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub institution_name: Option<String>,
    pub location: Option<String>,
    pub institution_type: Option<String>,
    pub website_link: Option<String>,
    pub established: Option<String>,
    pub affiliation: Option<String>,
    pub hostel_facilities: Option<String>,
    pub mess_facilities: Option<String>,
    pub admission_fees: Option<f64>,
    pub reap_percentile_required: Option<String>,
    pub placement_records: Option<f64>,
    pub average_package: Option<f64>,
    pub highest_package: Option<f64>,
    pub pdf_content: Option<String>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        *self == FieldUpdate::default()
    }

    /// Copy of `fields` with this update applied
    pub fn applied_to(&self, fields: &SubmissionFields) -> SubmissionFields {
        let mut next = fields.clone();
        self.apply(&mut next);
        next
    }

    fn apply(&self, fields: &mut SubmissionFields) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_num(target: &mut Option<f64>, value: Option<f64>) {
            if value.is_some() {
                *target = value;
            }
        }

        set(&mut fields.institution_name, &self.institution_name);
        set(&mut fields.location, &self.location);
        set(&mut fields.institution_type, &self.institution_type);
        set(&mut fields.website_link, &self.website_link);
        set(&mut fields.established, &self.established);
        set(&mut fields.affiliation, &self.affiliation);
        set(&mut fields.hostel_facilities, &self.hostel_facilities);
        set(&mut fields.mess_facilities, &self.mess_facilities);
        set_num(&mut fields.admission_fees, self.admission_fees);
        set(
            &mut fields.reap_percentile_required,
            &self.reap_percentile_required,
        );
        set_num(&mut fields.placement_records, self.placement_records);
        set_num(&mut fields.average_package, self.average_package);
        set_num(&mut fields.highest_package, self.highest_package);
    }
}

/// Full replacement of the text fields. Numeric fields that are `None` in the
/// source keep their stored value.
impl From<SubmissionFields> for FieldUpdate {
    fn from(f: SubmissionFields) -> Self {
        Self {
            institution_name: Some(f.institution_name),
            location: Some(f.location),
            institution_type: Some(f.institution_type),
            website_link: Some(f.website_link),
            established: Some(f.established),
            affiliation: Some(f.affiliation),
            hostel_facilities: Some(f.hostel_facilities),
            mess_facilities: Some(f.mess_facilities),
            admission_fees: f.admission_fees,
            reap_percentile_required: Some(f.reap_percentile_required),
            placement_records: f.placement_records,
            average_package: f.average_package,
            highest_package: f.highest_package,
            pdf_content: None,
        }
    }
}

/// A submission under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier, stable for the whole lifecycle
    #[serde(rename = "keyId")]
    pub key_id: KeyId,

    #[serde(flatten)]
    pub fields: SubmissionFields,

    /// Courses in the order they were entered
    #[serde(default)]
    pub courses: Vec<Course>,

    /// Text extracted from an attached PDF
    #[serde(rename = "pdfContent", default, skip_serializing_if = "Option::is_none")]
    pub pdf_content: Option<String>,

    /// Reviewer's reason, present only while rejected
    #[serde(
        rename = "rejectionComment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "submittedAt", default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Create a new submission with a freshly generated key
    pub fn create(fields: SubmissionFields, courses: Vec<Course>) -> Result<Self, ValidationError> {
        fields.validate()?;
        Ok(Self {
            key_id: KeyId::generate(),
            fields,
            courses,
            pdf_content: None,
            rejection_comment: None,
            status: None,
            submitted_at: Some(Utc::now()),
            updated_at: None,
        })
    }

    /// Institution name, used as the display title
    pub fn title(&self) -> &str {
        &self.fields.institution_name
    }

    /// Copy with the rejection comment attached
    pub fn with_rejection(&self, comment: &str) -> Result<Self, ValidationError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        Ok(Self {
            rejection_comment: Some(comment.to_string()),
            ..self.clone()
        })
    }

    /// Copy with the rejection comment removed
    pub fn clear_rejection(&self) -> Self {
        Self {
            rejection_comment: None,
            ..self.clone()
        }
    }

    /// Copy with `update` and `courses` merged in. The key never changes.
    pub fn merged(
        &self,
        update: &FieldUpdate,
        courses: Option<Vec<Course>>,
    ) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        update.apply(&mut next.fields);
        next.fields.validate()?;
        if let Some(courses) = courses {
            next.courses = courses;
        }
        if update.pdf_content.is_some() {
            next.pdf_content = update.pdf_content.clone();
        }
        Ok(next)
    }

    /// Copy tagged with `status` and a fresh `updatedAt`
    pub(crate) fn moved_to(&self, status: Status) -> Self {
        Self {
            status: Some(status),
            updated_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}

/// Accept strings, numbers and booleans for text fields
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        None => String::new(),
        Some(Text::Str(s)) => s,
        Some(Text::Int(n)) => n.to_string(),
        Some(Text::Float(n)) => n.to_string(),
        Some(Text::Bool(b)) => b.to_string(),
    })
}

/// Accept numbers and numeric strings; empty strings read as absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, found '{}'", s)))
        }
    }
}
