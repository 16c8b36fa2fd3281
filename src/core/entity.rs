//! Review status - the collection a submission currently lives in

use serde::{Deserialize, Serialize};

/// Review status of a submission.
///
/// Each status names one collection of the record store, so a status is also
/// the address of the collection holding submissions in that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// All statuses, in lifecycle order
    pub const ALL: [Status; 3] = [Status::Pending, Status::Approved, Status::Rejected];

    /// Name of the record store collection for this status
    pub fn collection_name(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection_name())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "institutiondata" => Ok(Status::Pending),
            "approved" | "approveddata" => Ok(Status::Approved),
            "rejected" | "rejecteddata" => Ok(Status::Rejected),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}
