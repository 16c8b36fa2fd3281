//! Import of browser-storage dumps
//!
//! The legacy web dashboards kept each collection under a storage key
//! (`institutionData`, `approvedData`, `rejectedData`) as a JSON string.
//! A dump is a JSON object mapping those keys, or the plain collection
//! names, to either an array or a string holding an encoded array.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::entity::Status;
use crate::core::identity::KeyId;
use crate::core::store::RecordStore;
use crate::core::team::Action;
use crate::core::workflow::{WorkflowEngine, WorkflowError};
use crate::entities::submission::Submission;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid legacy dump: {0}")]
    Parse(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

/// Raw records of a dump, grouped by collection
#[derive(Debug, Default, Deserialize)]
pub struct LegacyDump {
    #[serde(default, alias = "institutionData", deserialize_with = "array_or_encoded")]
    pub pending: Vec<Value>,
    #[serde(default, alias = "approvedData", deserialize_with = "array_or_encoded")]
    pub approved: Vec<Value>,
    #[serde(default, alias = "rejectedData", deserialize_with = "array_or_encoded")]
    pub rejected: Vec<Value>,
}

impl LegacyDump {
    pub fn parse(content: &str) -> Result<Self, ImportError> {
        serde_json::from_str(content).map_err(|e| ImportError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn records(&self, status: Status) -> &[Value] {
        match status {
            Status::Pending => &self.pending,
            Status::Approved => &self.approved,
            Status::Rejected => &self.rejected,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.approved.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A record left out of the import
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub status: Status,
    /// Position within its collection in the dump
    pub index: usize,
    pub key_id: Option<KeyId>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<(Status, KeyId)>,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    pub fn imported_into(&self, status: Status) -> usize {
        self.imported.iter().filter(|(s, _)| *s == status).count()
    }
}

/// Merge `dump` into the engine's store
///
/// Records missing a `keyId` get a fresh one. Records whose key already
/// exists anywhere, unnamed records, and rejected records without a comment
/// are skipped. Everything accepted is written in one batch.
pub fn import<S: RecordStore>(
    engine: &mut WorkflowEngine<S>,
    dump: &LegacyDump,
) -> Result<ImportReport, ImportError> {
    engine.authorize(Action::Import)?;

    let mut collections: Vec<(Status, Vec<Submission>)> = Vec::with_capacity(3);
    let mut known: HashSet<KeyId> = HashSet::new();
    for status in Status::ALL {
        let records: Vec<Submission> = engine
            .store()
            .read_collection(status.collection_name())
            .map_err(WorkflowError::from)?;
        known.extend(records.iter().map(|s| s.key_id.clone()));
        collections.push((status, records));
    }

    let mut report = ImportReport::default();
    for (status, records) in collections.iter_mut() {
        let status = *status;
        for (index, raw) in dump.records(status).iter().enumerate() {
            match normalize(raw, status) {
                Ok(sub) if known.contains(&sub.key_id) => {
                    report.skipped.push(SkippedRecord {
                        status,
                        index,
                        key_id: Some(sub.key_id),
                        reason: "key already exists".to_string(),
                    });
                }
                Ok(sub) => {
                    known.insert(sub.key_id.clone());
                    report.imported.push((status, sub.key_id.clone()));
                    records.push(sub);
                }
                Err((key_id, reason)) => {
                    report.skipped.push(SkippedRecord {
                        status,
                        index,
                        key_id,
                        reason,
                    });
                }
            }
        }
    }

    for skipped in &report.skipped {
        tracing::warn!(
            collection = %skipped.status,
            index = skipped.index,
            key_id = ?skipped.key_id,
            reason = %skipped.reason,
            "skipped legacy record"
        );
    }

    if !report.imported.is_empty() {
        let batch: Vec<(&str, &[Submission])> = collections
            .iter()
            .map(|(status, records)| (status.collection_name(), records.as_slice()))
            .collect();
        engine
            .store_mut()
            .write_collections(&batch)
            .map_err(WorkflowError::from)?;
    }

    tracing::info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        "legacy import finished"
    );
    Ok(report)
}

/// Turn one raw legacy record into a submission held in `status`
fn normalize(raw: &Value, status: Status) -> Result<Submission, (Option<KeyId>, String)> {
    let Value::Object(map) = raw else {
        return Err((None, "not an object".to_string()));
    };
    let mut map = map.clone();

    let key_id = match map.get("keyId") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => KeyId::generate().to_string(),
    };
    map.insert("keyId".to_string(), Value::String(key_id.clone()));
    let key = key_id.parse::<KeyId>().ok();

    let mut sub: Submission =
        serde_json::from_value(Value::Object(map)).map_err(|e| (key.clone(), e.to_string()))?;

    sub.fields
        .validate()
        .map_err(|e| (key.clone(), e.to_string()))?;

    match status {
        Status::Rejected => {
            let comment = sub.rejection_comment.take().unwrap_or_default();
            sub = sub
                .with_rejection(&comment)
                .map_err(|_| (key.clone(), "rejected record has no comment".to_string()))?;
        }
        // Resubmitted records in old dumps still carry the reviewer's comment
        _ => sub.rejection_comment = None,
    }
    sub.status = Some(status);
    Ok(sub)
}

fn array_or_encoded<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "expected an array or JSON string, got {}",
            other
        ))),
    }
}
