//! Review workflow tests driven through the CLI

mod common;

use common::{create_test_submission, institrack, list_keys, setup_test_project};
use predicates::prelude::*;

// ============================================================================
// Full Workflow Test
// ============================================================================

#[test]
fn test_full_review_cycle() {
    let tmp = setup_test_project();

    let key = create_test_submission(&tmp, "Tech Institute");
    assert!(key.starts_with("SUB-"));
    assert_eq!(list_keys(&tmp, "pending"), vec![key.clone()]);

    // Admin rejects
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "reject", &key, "-r", "Missing fees", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected"));

    assert!(list_keys(&tmp, "pending").is_empty());
    assert_eq!(list_keys(&tmp, "rejected"), vec![key.clone()]);

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejectionComment: Missing fees"));

    // Provider fixes and resubmits
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "provider", "resubmit", &key, "--fees", "50000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resubmitted"));

    assert!(list_keys(&tmp, "rejected").is_empty());
    assert_eq!(list_keys(&tmp, "pending"), vec![key.clone()]);

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"admissionFees\": 50000.0"))
        .stdout(predicate::str::contains("rejectionComment").not());

    // Verifier approves
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "verifier", "approve", &key, "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Approved"));

    assert!(list_keys(&tmp, "pending").is_empty());
    assert_eq!(list_keys(&tmp, "approved"), vec![key.clone()]);

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: approved"));

    institrack()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_second_approval_is_duplicate() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Alpha College");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "-y"])
        .assert()
        .success();

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already been approved"));

    assert_eq!(list_keys(&tmp, "approved"), vec![key]);
    assert!(list_keys(&tmp, "pending").is_empty());
}

#[test]
fn test_verifier_withdraws_approval() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Beta University");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "-y"])
        .assert()
        .success();

    institrack()
        .current_dir(tmp.path())
        .args([
            "--role", "verifier", "reject", &key, "--from", "approved", "-r", "Fake data", "-y",
        ])
        .assert()
        .success();

    assert!(list_keys(&tmp, "approved").is_empty());
    assert_eq!(list_keys(&tmp, "rejected"), vec![key]);
}

#[test]
fn test_admin_cannot_withdraw_approval() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Gamma Institute");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "-y"])
        .assert()
        .success();

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "reject", &key, "-r", "Changed my mind", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));

    assert_eq!(list_keys(&tmp, "approved"), vec![key]);
}

#[test]
fn test_reject_requires_reason() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Delta College");

    institrack()
        .current_dir(tmp.path())
        .args(["reject", &key, "-r", "   ", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-empty reason"));

    assert_eq!(list_keys(&tmp, "pending"), vec![key]);
    assert!(list_keys(&tmp, "rejected").is_empty());
}

#[test]
fn test_unknown_key_is_not_found() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .args(["approve", "SUB-DOESNOTEXIST", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in pending"));
}

#[test]
fn test_resubmit_requires_rejected() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Epsilon Academy");

    institrack()
        .current_dir(tmp.path())
        .args(["resubmit", &key, "--location", "Pune"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in rejected"));
}

#[test]
fn test_approve_by_prefix() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Zeta Polytechnic");
    let prefix = key[..12].to_lowercase();

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &prefix, "-y"])
        .assert()
        .success();

    assert_eq!(list_keys(&tmp, "approved"), vec![key]);
}

#[test]
fn test_dry_run_changes_nothing() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Eta Institute");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes made"));

    assert_eq!(list_keys(&tmp, "pending"), vec![key]);
}

#[test]
fn test_batch_approve_from_stdin() {
    let tmp = setup_test_project();
    let a = create_test_submission(&tmp, "Theta College");
    let b = create_test_submission(&tmp, "Iota College");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", "-", "-y"])
        .write_stdin(format!("{}\n{}\n", a, b))
        .assert()
        .success();

    assert_eq!(list_keys(&tmp, "approved"), vec![a, b]);
}

#[test]
fn test_edit_keeps_collection() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Kappa Institute");

    institrack()
        .current_dir(tmp.path())
        .args(["reject", &key, "-r", "Incomplete", "-y"])
        .assert()
        .success();

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "edit", &key, "--location", "Chennai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"));

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("location: Chennai"))
        .stdout(predicate::str::contains("rejectionComment: Incomplete"));
}
