//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{bail, Result};
use std::io::{self, BufRead, IsTerminal};

use crate::cli::args::GlobalOpts;
use crate::core::entity::Status;
use crate::core::identity::KeyId;
use crate::core::store::{FileStore, RecordStore};
use crate::core::team::Action;
use crate::core::workflow::WorkflowEngine;
use crate::core::Config;
use crate::entities::submission::Submission;

/// Format a KeyId for display, truncating if too long
///
/// Keys longer than 16 characters are truncated to 13 chars with "..." suffix.
/// Any unique prefix is accepted back on the command line.
pub fn format_short_id(id: &KeyId) -> String {
    format_short_id_str(id.as_str())
}

/// Same as format_short_id but works with &str
pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 16 {
        format!("{}...", id.chars().take(13).collect::<String>())
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Read keys from stdin if available (Unix philosophy support)
///
/// Returns `Some(Vec<String>)` with keys if stdin is piped (not a terminal),
/// or `None` if stdin is a terminal (interactive mode).
///
/// This enables pipelines like:
/// ```bash
/// institrack sub list pending --format id | institrack approve -y -
/// ```
pub fn read_ids_from_stdin() -> Option<Vec<String>> {
    let stdin = io::stdin();

    // Only read from stdin if it's piped (not a terminal)
    if stdin.is_terminal() {
        return None;
    }

    let ids: Vec<String> = stdin
        .lock()
        .lines()
        .map_while(|line| line.ok())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Expand a `-` argument into keys read from stdin
pub fn collect_key_args(args: &[String]) -> Result<Vec<String>> {
    if args.len() == 1 && args[0] == "-" {
        return match read_ids_from_stdin() {
            Some(ids) => Ok(ids),
            None => bail!("Expected keys on stdin"),
        };
    }
    Ok(args.to_vec())
}

/// Open the configured file store with the effective role
pub fn open_engine(global: &GlobalOpts) -> Result<WorkflowEngine<FileStore>> {
    let config = Config::load();

    let Some(data_dir) = global.data_dir.clone().or(config.data_dir) else {
        bail!(
            "Not an institrack project.\n\
             Run 'institrack init' or pass --data-dir / set INSTITRACK_DATA_DIR"
        );
    };
    let format = global.store_format.unwrap_or(config.store_format);
    let role = global.role.or(config.default_role);

    tracing::debug!(
        data_dir = %data_dir.display(),
        format = %format,
        role = ?role,
        "opening store"
    );

    Ok(WorkflowEngine::new(FileStore::new(data_dir, format)).with_role(role))
}

/// Resolve a full key or any unique, case-insensitive prefix of one
///
/// References that match nothing are returned unchanged so the workflow
/// operation reports the key as not found.
pub fn resolve_key<S: RecordStore>(engine: &WorkflowEngine<S>, reference: &str) -> Result<KeyId> {
    let reference = reference.trim();
    let Ok(key) = reference.parse::<KeyId>() else {
        bail!("Invalid key: '{}'", reference);
    };

    let mut candidates: Vec<KeyId> = Vec::new();
    for status in Status::ALL {
        // Records the role cannot view never resolve or collide
        if engine.authorize(Action::View(status)).is_err() {
            continue;
        }
        let records: Vec<Submission> = engine
            .store()
            .read_collection(status.collection_name())
            .map_err(|e| miette::miette!("{}", e))?;
        for sub in records {
            if sub.key_id == key {
                return Ok(key);
            }
            if sub.key_id.matches_prefix(reference) && !candidates.contains(&sub.key_id) {
                candidates.push(sub.key_id);
            }
        }
    }

    match candidates.len() {
        0 => Ok(key),
        1 => Ok(candidates.remove(0)),
        _ => {
            candidates.sort();
            bail!(
                "Ambiguous key '{}' matches: {}",
                reference,
                candidates
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::core::team::Role;
    use crate::entities::submission::SubmissionFields;

    #[test]
    fn test_format_short_id() {
        let id = KeyId::generate();
        let formatted = format_short_id(&id);
        // SUB- plus a 26 char ULID, so it is always truncated
        assert_eq!(formatted.chars().count(), 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_format_short_id_str() {
        assert_eq!(format_short_id_str("SHORT"), "SHORT");
        assert_eq!(format_short_id_str("SUB-01J123456789ABCDEF123456"), "SUB-01J123456...");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Université Côte", 8), "Unive...");
    }

    #[test]
    fn test_collect_key_args_passthrough() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(collect_key_args(&args).unwrap(), args);
    }

    #[test]
    fn test_resolve_key_by_prefix() {
        let mut engine = WorkflowEngine::new(MemoryStore::new());
        let sub = engine.submit(SubmissionFields::named("Alpha"), vec![]).unwrap();

        let full = sub.key_id.as_str();
        assert_eq!(resolve_key(&engine, full).unwrap(), sub.key_id);
        assert_eq!(resolve_key(&engine, &full[..10].to_lowercase()).unwrap(), sub.key_id);
    }

    #[test]
    fn test_resolve_key_unknown_passes_through() {
        let engine = WorkflowEngine::new(MemoryStore::new());
        let key = resolve_key(&engine, "nope").unwrap();
        assert_eq!(key.as_str(), "nope");
        assert!(resolve_key(&engine, "   ").is_err());
    }

    #[test]
    fn test_resolve_key_ambiguous() {
        let mut engine = WorkflowEngine::new(MemoryStore::new());
        engine.submit(SubmissionFields::named("A"), vec![]).unwrap();
        engine.submit(SubmissionFields::named("B"), vec![]).unwrap();
        assert!(resolve_key(&engine, "SUB-").is_err());
    }

    #[test]
    fn test_resolve_key_ignores_hidden_collections() {
        let mut engine = WorkflowEngine::new(MemoryStore::new());
        let a = engine.submit(SubmissionFields::named("A"), vec![]).unwrap();
        let b = engine.submit(SubmissionFields::named("B"), vec![]).unwrap();
        engine.approve(&b.key_id).unwrap();

        // Admins only see pending, so the approved key cannot make "SUB-" ambiguous
        let admin = WorkflowEngine::new(engine.into_store()).with_role(Some(Role::Admin));
        assert_eq!(resolve_key(&admin, "SUB-").unwrap(), a.key_id);

        // A prefix of a hidden key is passed through and later reported as not found
        let hidden = &b.key_id.as_str()[..20];
        assert_eq!(resolve_key(&admin, hidden).unwrap().as_str(), hidden);
    }
}
