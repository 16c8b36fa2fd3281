//! Institrack: institution submission review pipeline
//!
//! Providers submit institution data, admins and verifiers approve or reject
//! it, and rejected submissions are revised and resubmitted. Every submission
//! lives in exactly one of three collections (`pending`, `approved`,
//! `rejected`) kept in a pluggable record store.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
