//! Filter enums shared by list commands

use clap::ValueEnum;

use crate::core::entity::Status;

/// Which collection(s) a list command reads
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum CollectionFilter {
    /// Awaiting review - default
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Every collection the role may view
    All,
}

impl CollectionFilter {
    /// Collections selected by this filter, in lifecycle order
    pub fn statuses(&self) -> Vec<Status> {
        match self {
            CollectionFilter::Pending => vec![Status::Pending],
            CollectionFilter::Approved => vec![Status::Approved],
            CollectionFilter::Rejected => vec![Status::Rejected],
            CollectionFilter::All => Status::ALL.to_vec(),
        }
    }
}

impl std::fmt::Display for CollectionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionFilter::Pending => write!(f, "pending"),
            CollectionFilter::Approved => write!(f, "approved"),
            CollectionFilter::Rejected => write!(f, "rejected"),
            CollectionFilter::All => write!(f, "all"),
        }
    }
}

/// Source collection for a rejection
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RejectSource {
    Pending,
    Approved,
}

impl From<RejectSource> for Status {
    fn from(source: RejectSource) -> Self {
        match source {
            RejectSource::Pending => Status::Pending,
            RejectSource::Approved => Status::Approved,
        }
    }
}
