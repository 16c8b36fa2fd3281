//! Workflow engine for submission review
//!
//! Moves submissions between the `pending`, `approved` and `rejected`
//! collections of a [`RecordStore`]. Every transition reads the collections it
//! touches, computes the new state in memory and writes all of them in one
//! batch, so a failed transition leaves the store exactly as it was.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::entity::Status;
use crate::core::identity::KeyId;
use crate::core::store::{RecordStore, StoreError};
use crate::core::team::{Action, Role};
use crate::entities::submission::{Course, FieldUpdate, Submission, SubmissionFields, ValidationError};

/// Errors that can occur during workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Submission {key_id} not found in {collection}")]
    NotFound { key_id: KeyId, collection: String },

    #[error("Submission {key_id} has already been approved")]
    Duplicate { key_id: KeyId },

    #[error("Invalid status transition: {from} → {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Role '{role}' is not allowed to {action}")]
    Unauthorized { role: Role, action: Action },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    fn not_found(key_id: &KeyId, statuses: &[Status]) -> Self {
        let collection = statuses
            .iter()
            .map(|s| s.collection_name())
            .collect::<Vec<_>>()
            .join(" or ");
        WorkflowError::NotFound {
            key_id: key_id.clone(),
            collection,
        }
    }
}

/// A broken invariant found by [`WorkflowEngine::check`]
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    DuplicateInCollection {
        key_id: KeyId,
        status: Status,
        count: usize,
    },
    InMultipleCollections {
        key_id: KeyId,
        statuses: Vec<Status>,
    },
    RejectedWithoutComment {
        key_id: KeyId,
    },
    CommentOutsideRejected {
        key_id: KeyId,
        status: Status,
    },
    StatusMismatch {
        key_id: KeyId,
        collection: Status,
        tag: Status,
    },
    MissingName {
        key_id: KeyId,
        status: Status,
    },
}

impl IntegrityIssue {
    pub fn key_id(&self) -> &KeyId {
        match self {
            IntegrityIssue::DuplicateInCollection { key_id, .. }
            | IntegrityIssue::InMultipleCollections { key_id, .. }
            | IntegrityIssue::RejectedWithoutComment { key_id }
            | IntegrityIssue::CommentOutsideRejected { key_id, .. }
            | IntegrityIssue::StatusMismatch { key_id, .. }
            | IntegrityIssue::MissingName { key_id, .. } => key_id,
        }
    }
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::DuplicateInCollection {
                key_id,
                status,
                count,
            } => write!(f, "{} appears {} times in {}", key_id, count, status),
            IntegrityIssue::InMultipleCollections { key_id, statuses } => {
                let names: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
                write!(f, "{} is in several collections: {}", key_id, names.join(", "))
            }
            IntegrityIssue::RejectedWithoutComment { key_id } => {
                write!(f, "{} is rejected without a rejection comment", key_id)
            }
            IntegrityIssue::CommentOutsideRejected { key_id, status } => {
                write!(f, "{} carries a rejection comment while {}", key_id, status)
            }
            IntegrityIssue::StatusMismatch {
                key_id,
                collection,
                tag,
            } => write!(
                f,
                "{} is stored in {} but tagged '{}'",
                key_id, collection, tag
            ),
            IntegrityIssue::MissingName { key_id, status } => {
                write!(f, "{} in {} has no institution name", key_id, status)
            }
        }
    }
}

/// Number of submissions held in each collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl CollectionCounts {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::Approved => self.approved,
            Status::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

/// Workflow engine for managing submission transitions
pub struct WorkflowEngine<S: RecordStore> {
    store: S,
    role: Option<Role>,
}

impl<S: RecordStore> WorkflowEngine<S> {
    /// Create a new workflow engine over `store` with no role checks
    pub fn new(store: S) -> Self {
        Self { store, role: None }
    }

    /// Act as `role`; `None` disables role checks
    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Check if a status transition is valid
    pub fn is_valid_transition(&self, from: Status, to: Status) -> bool {
        matches!(
            (from, to),
            (Status::Pending, Status::Approved)
                | (Status::Pending, Status::Rejected)
                // Withdrawal of an approval
                | (Status::Approved, Status::Rejected)
                // Resubmission
                | (Status::Rejected, Status::Pending)
        )
    }

    /// Fail unless the acting role may perform `action`
    pub fn authorize(&self, action: Action) -> Result<(), WorkflowError> {
        // No role = no auth checks
        let Some(role) = self.role else {
            return Ok(());
        };
        if role.permits(action) {
            Ok(())
        } else {
            Err(WorkflowError::Unauthorized { role, action })
        }
    }

    fn can(&self, action: Action) -> bool {
        self.authorize(action).is_ok()
    }

    fn load(&self, status: Status) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.store.read_collection(status.collection_name())?)
    }

    /// All submissions in one collection, in stored order
    pub fn list(&self, status: Status) -> Result<Vec<Submission>, WorkflowError> {
        self.authorize(Action::View(status))?;
        self.load(status)
    }

    /// Size of every collection
    pub fn counts(&self) -> Result<CollectionCounts, WorkflowError> {
        Ok(CollectionCounts {
            pending: self.load(Status::Pending)?.len(),
            approved: self.load(Status::Approved)?.len(),
            rejected: self.load(Status::Rejected)?.len(),
        })
    }

    /// Locate a submission in any collection the acting role may view
    pub fn find(&self, key_id: &KeyId) -> Result<Option<(Status, Submission)>, WorkflowError> {
        for status in Status::ALL {
            if !self.can(Action::View(status)) {
                continue;
            }
            if let Some(sub) = self.load(status)?.into_iter().find(|s| &s.key_id == key_id) {
                return Ok(Some((status, sub)));
            }
        }
        Ok(None)
    }

    /// Create a submission and append it to `pending`
    pub fn submit(
        &mut self,
        fields: SubmissionFields,
        courses: Vec<Course>,
    ) -> Result<Submission, WorkflowError> {
        self.authorize(Action::Submit)?;
        let submission = Submission::create(fields, courses)?;
        self.append(Status::Pending, submission)
    }

    /// Append an already built submission (e.g. with `pdfContent`) to `pending`
    ///
    /// Any review state the caller left on the record is dropped: a new
    /// submission has no status tag and no rejection comment.
    pub fn submit_record(&mut self, submission: Submission) -> Result<Submission, WorkflowError> {
        self.authorize(Action::Submit)?;
        submission.fields.validate()?;
        let submission = Submission {
            status: None,
            ..submission.clear_rejection()
        };
        self.append(Status::Pending, submission)
    }

    fn append(&mut self, status: Status, submission: Submission) -> Result<Submission, WorkflowError> {
        // A key lives in exactly one collection
        for held in Status::ALL {
            if self.load(held)?.iter().any(|s| s.key_id == submission.key_id) {
                return Err(WorkflowError::Duplicate {
                    key_id: submission.key_id.clone(),
                });
            }
        }
        let mut records = self.load(status)?;
        records.push(submission.clone());
        self.store
            .write_collection(status.collection_name(), &records)?;

        tracing::info!(
            key_id = %submission.key_id,
            institution = submission.title(),
            to = %status,
            "submitted"
        );
        Ok(submission)
    }

    /// Move a pending submission to `approved`
    ///
    /// Approving a key that is already in `approved` is a duplicate and leaves
    /// every collection untouched.
    pub fn approve(&mut self, key_id: &KeyId) -> Result<Submission, WorkflowError> {
        self.authorize(Action::Approve)?;

        let mut approved = self.load(Status::Approved)?;
        if approved.iter().any(|s| &s.key_id == key_id) {
            return Err(WorkflowError::Duplicate {
                key_id: key_id.clone(),
            });
        }

        let mut pending = self.load(Status::Pending)?;
        let index = pending
            .iter()
            .position(|s| &s.key_id == key_id)
            .ok_or_else(|| WorkflowError::not_found(key_id, &[Status::Pending]))?;

        let record = pending.remove(index).moved_to(Status::Approved);
        approved.push(record.clone());

        self.store.write_collections(&[
            (Status::Approved.collection_name(), approved.as_slice()),
            (Status::Pending.collection_name(), pending.as_slice()),
        ])?;

        tracing::info!(
            key_id = %key_id,
            from = %Status::Pending,
            to = %Status::Approved,
            "approved submission"
        );
        Ok(record)
    }

    /// Reject a submission from whichever collection holds it
    ///
    /// `pending` is searched first, then `approved` (withdrawing an approval).
    pub fn reject(&mut self, key_id: &KeyId, comment: &str) -> Result<Submission, WorkflowError> {
        let sources = [Status::Pending, Status::Approved];
        if !sources.iter().any(|s| self.can(Action::Reject(*s))) {
            self.authorize(Action::Reject(Status::Pending))?;
        }

        for from in sources {
            if self.load(from)?.iter().any(|s| &s.key_id == key_id) {
                return self.reject_from(from, key_id, comment);
            }
        }
        Err(WorkflowError::not_found(key_id, &sources))
    }

    /// Reject a submission held in `from`
    pub fn reject_from(
        &mut self,
        from: Status,
        key_id: &KeyId,
        comment: &str,
    ) -> Result<Submission, WorkflowError> {
        if !self.is_valid_transition(from, Status::Rejected) {
            return Err(WorkflowError::InvalidTransition {
                from,
                to: Status::Rejected,
            });
        }
        self.authorize(Action::Reject(from))?;

        let mut source = self.load(from)?;
        let index = source
            .iter()
            .position(|s| &s.key_id == key_id)
            .ok_or_else(|| WorkflowError::not_found(key_id, &[from]))?;

        let record = source[index]
            .with_rejection(comment)?
            .moved_to(Status::Rejected);
        source.remove(index);

        let mut rejected = self.load(Status::Rejected)?;
        rejected.retain(|s| &s.key_id != key_id);
        rejected.push(record.clone());

        self.store.write_collections(&[
            (Status::Rejected.collection_name(), rejected.as_slice()),
            (from.collection_name(), source.as_slice()),
        ])?;

        tracing::info!(
            key_id = %key_id,
            from = %from,
            to = %Status::Rejected,
            "rejected submission"
        );
        Ok(record)
    }

    /// Apply the provider's changes to a rejected submission and send it
    /// back to `pending` without its rejection comment
    pub fn resubmit(
        &mut self,
        key_id: &KeyId,
        update: &FieldUpdate,
        courses: Option<Vec<Course>>,
    ) -> Result<Submission, WorkflowError> {
        self.authorize(Action::Resubmit)?;

        let mut rejected = self.load(Status::Rejected)?;
        let index = rejected
            .iter()
            .position(|s| &s.key_id == key_id)
            .ok_or_else(|| WorkflowError::not_found(key_id, &[Status::Rejected]))?;

        let record = rejected[index]
            .merged(update, courses)?
            .clear_rejection()
            .moved_to(Status::Pending);
        rejected.remove(index);

        // Insert-or-replace keeps a stale pending copy from being duplicated
        let mut pending = self.load(Status::Pending)?;
        match pending.iter().position(|s| &s.key_id == key_id) {
            Some(i) => pending[i] = record.clone(),
            None => pending.push(record.clone()),
        }

        self.store.write_collections(&[
            (Status::Pending.collection_name(), pending.as_slice()),
            (Status::Rejected.collection_name(), rejected.as_slice()),
        ])?;

        tracing::info!(
            key_id = %key_id,
            from = %Status::Rejected,
            to = %Status::Pending,
            "resubmitted submission"
        );
        Ok(record)
    }

    /// Apply changes in place, wherever the submission currently is
    ///
    /// Membership never changes: an edited approved submission stays approved
    /// and an edited rejected one keeps its comment until resubmitted.
    pub fn edit(
        &mut self,
        key_id: &KeyId,
        update: &FieldUpdate,
        courses: Option<Vec<Course>>,
    ) -> Result<(Status, Submission), WorkflowError> {
        self.authorize(Action::Edit)?;

        for status in Status::ALL {
            let mut records = self.load(status)?;
            let Some(index) = records.iter().position(|s| &s.key_id == key_id) else {
                continue;
            };

            let record = records[index].merged(update, courses)?.moved_to(status);
            records[index] = record.clone();
            self.store
                .write_collection(status.collection_name(), &records)?;

            tracing::info!(key_id = %key_id, collection = %status, "edited submission");
            return Ok((status, record));
        }

        Err(WorkflowError::not_found(key_id, &Status::ALL))
    }

    /// Scan every collection for broken invariants
    pub fn check(&self) -> Result<Vec<IntegrityIssue>, WorkflowError> {
        self.authorize(Action::Check)?;

        let mut issues = Vec::new();
        let mut seen: BTreeMap<KeyId, Vec<Status>> = BTreeMap::new();

        for status in Status::ALL {
            let records = self.load(status)?;
            let mut counts: BTreeMap<&KeyId, usize> = BTreeMap::new();

            for sub in &records {
                *counts.entry(&sub.key_id).or_default() += 1;

                let has_comment = sub
                    .rejection_comment
                    .as_deref()
                    .is_some_and(|c| !c.trim().is_empty());
                if status == Status::Rejected && !has_comment {
                    issues.push(IntegrityIssue::RejectedWithoutComment {
                        key_id: sub.key_id.clone(),
                    });
                }
                if status != Status::Rejected && sub.rejection_comment.is_some() {
                    issues.push(IntegrityIssue::CommentOutsideRejected {
                        key_id: sub.key_id.clone(),
                        status,
                    });
                }
                if let Some(tag) = sub.status {
                    if tag != status {
                        issues.push(IntegrityIssue::StatusMismatch {
                            key_id: sub.key_id.clone(),
                            collection: status,
                            tag,
                        });
                    }
                }
                if sub.fields.institution_name.trim().is_empty() {
                    issues.push(IntegrityIssue::MissingName {
                        key_id: sub.key_id.clone(),
                        status,
                    });
                }
            }

            for (key_id, count) in counts {
                if count > 1 {
                    issues.push(IntegrityIssue::DuplicateInCollection {
                        key_id: key_id.clone(),
                        status,
                        count,
                    });
                }
                seen.entry(key_id.clone()).or_default().push(status);
            }
        }

        for (key_id, statuses) in seen {
            if statuses.len() > 1 {
                issues.push(IntegrityIssue::InMultipleCollections { key_id, statuses });
            }
        }

        Ok(issues)
    }
}
