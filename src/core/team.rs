//! Review roles and what each may do
//!
//! The four dashboards of the review pipeline differ only in which workflow
//! operations and collections they may use. That table lives here.

use serde::{Deserialize, Serialize};

use crate::core::entity::Status;

/// A participant in the review pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Institution Provider - submits and revises institution data
    #[serde(alias = "institution-provider")]
    Provider,
    /// Institution Admin - screens pending submissions
    #[serde(alias = "institution-admin")]
    Admin,
    /// Government Verifier - final approval, may withdraw approvals
    #[serde(alias = "gov-verifier")]
    Verifier,
    /// Super Admin - views approved results
    SuperAdmin,
}

/// An operation gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Edit,
    Resubmit,
    Approve,
    /// Reject a submission currently held in the given collection
    Reject(Status),
    View(Status),
    Import,
    Check,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Submit => write!(f, "submit"),
            Action::Edit => write!(f, "edit"),
            Action::Resubmit => write!(f, "resubmit"),
            Action::Approve => write!(f, "approve"),
            Action::Reject(from) => write!(f, "reject {} submissions", from),
            Action::View(status) => write!(f, "view {} submissions", status),
            Action::Import => write!(f, "import"),
            Action::Check => write!(f, "check"),
        }
    }
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Provider, Role::Admin, Role::Verifier, Role::SuperAdmin];

    /// Whether this role may perform `action`
    pub fn permits(&self, action: Action) -> bool {
        use Status::*;

        match self {
            Role::Provider => matches!(
                action,
                Action::Submit
                    | Action::Edit
                    | Action::Resubmit
                    | Action::View(Pending)
                    | Action::View(Rejected)
            ),
            Role::Admin => matches!(
                action,
                Action::Approve | Action::Reject(Pending) | Action::View(Pending)
            ),
            Role::Verifier => matches!(
                action,
                Action::Approve
                    | Action::Reject(Pending)
                    | Action::Reject(Approved)
                    | Action::View(Pending)
                    | Action::View(Approved)
            ),
            Role::SuperAdmin => matches!(
                action,
                Action::View(_) | Action::Import | Action::Check
            ),
        }
    }

    /// Collections this role may list
    pub fn visible_collections(&self) -> Vec<Status> {
        Status::ALL
            .into_iter()
            .filter(|s| self.permits(Action::View(*s)))
            .collect()
    }

    /// Human readable title used in headings
    pub fn title(&self) -> &'static str {
        match self {
            Role::Provider => "Institution Provider",
            Role::Admin => "Institution Admin",
            Role::Verifier => "Government Verifier",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Provider => write!(f, "provider"),
            Role::Admin => write!(f, "admin"),
            Role::Verifier => write!(f, "verifier"),
            Role::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "provider" | "institution-provider" => Ok(Role::Provider),
            "admin" | "institution-admin" => Ok(Role::Admin),
            "verifier" | "gov-verifier" | "government-verifier" => Ok(Role::Verifier),
            "super-admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(format!(
                "Unknown role: {} (expected provider, admin, verifier or super-admin)",
                s
            )),
        }
    }
}
