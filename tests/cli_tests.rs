//! CLI surface tests: init, submission creation, listing, import

mod common;

use common::{create_test_submission, institrack, list_keys, setup_test_project};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = TempDir::new().unwrap();

    institrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized institrack project"));

    assert!(tmp.path().join(".institrack/config.yaml").is_file());
    assert!(tmp.path().join(".institrack/data").is_dir());
}

#[test]
fn test_init_twice_fails_without_force() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    institrack()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not an institrack project"));
}

#[test]
fn test_data_dir_flag_works_without_project() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("store");

    institrack()
        .current_dir(tmp.path())
        .args(["--data-dir", data.to_str().unwrap(), "sub", "new", "--name", "Solo"])
        .assert()
        .success();

    assert!(data.join("pending.yaml").is_file());
}

#[test]
fn test_store_format_json() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join(".institrack/config.yaml"),
        "store_format: json\n",
    )
    .unwrap();

    create_test_submission(&tmp, "Json College");
    let contents = fs::read_to_string(tmp.path().join(".institrack/data/pending.json")).unwrap();
    assert!(contents.contains("\"institutionName\": \"Json College\""));
}

// ============================================================================
// Submission creation
// ============================================================================

#[test]
fn test_new_requires_name() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "new", "--location", "Jaipur"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("institutionName"));

    assert!(list_keys(&tmp, "pending").is_empty());
}

#[test]
fn test_new_with_courses_and_pdf_text() {
    let tmp = setup_test_project();
    let pdf = tmp.path().join("brochure.txt");
    fs::write(&pdf, "Extracted brochure text").unwrap();

    institrack()
        .current_dir(tmp.path())
        .args([
            "sub",
            "new",
            "--name",
            "Course College",
            "--fees",
            "75000",
            "--course",
            "CSE:92%:98.5",
            "--course",
            "ECE:88%:96",
            "--pdf-text",
            pdf.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submitted"));

    let key = list_keys(&tmp, "pending").remove(0);
    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"placementStats\": \"92%\""))
        .stdout(predicate::str::contains("\"name\": \"ECE\""))
        .stdout(predicate::str::contains("Extracted brochure text"));
}

#[test]
fn test_new_from_file() {
    let tmp = setup_test_project();
    let file = tmp.path().join("institution.yaml");
    fs::write(
        &file,
        "institutionName: File Institute\nEstablished: 1987\nadmissionFees: '42000'\n",
    )
    .unwrap();

    let key = {
        let output = institrack()
            .current_dir(tmp.path())
            .args(["sub", "new", "--file", file.to_str().unwrap(), "-f", "id"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    };

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", &key, "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("institutionName: File Institute"))
        .stdout(predicate::str::contains("1987"))
        .stdout(predicate::str::contains("admissionFees: 42000"));
}

#[test]
fn test_invalid_course_rejected_by_parser() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "new", "--name", "X", "--course", ":90%:95"])
        .assert()
        .failure();
}

// ============================================================================
// Roles
// ============================================================================

#[test]
fn test_provider_cannot_approve() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Role College");

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "provider", "approve", &key, "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to approve"));

    assert_eq!(list_keys(&tmp, "pending"), vec![key]);
}

#[test]
fn test_admin_cannot_list_approved() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "sub", "list", "approved"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to view approved"));
}

#[test]
fn test_default_role_from_config() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Config Role College");
    fs::write(
        tmp.path().join(".institrack/config.yaml"),
        "default_role: institution-provider\n",
    )
    .unwrap();

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &key, "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed"));

    // The flag overrides the configured role
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "approve", &key, "-y"])
        .assert()
        .success();
}

#[test]
fn test_unknown_role_rejected() {
    institrack()
        .args(["--role", "janitor", "sub", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown role"));
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_list_formats() {
    let tmp = setup_test_project();
    create_test_submission(&tmp, "Alpha, Institute");
    create_test_submission(&tmp, "Beta Institute");

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "key,collection,institution,location,type,fees,courses,comment",
        ))
        .stdout(predicate::str::contains("\"Alpha, Institute\""));

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("key\tcollection\tinstitution"))
        .stdout(predicate::str::contains("\tpending\tBeta Institute\t"));

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"institutionName\": \"Beta Institute\""));

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_list_search_and_limit() {
    let tmp = setup_test_project();
    create_test_submission(&tmp, "Northern Engineering");
    create_test_submission(&tmp, "Southern Medical");
    create_test_submission(&tmp, "Northern Medical");

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", "--search", "northern", "--count"])
        .assert()
        .success()
        .stdout("2\n");

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", "--limit", "1", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^SUB-[0-9A-Z]{26}\n$").unwrap());
}

#[test]
fn test_list_all_for_super_admin() {
    let tmp = setup_test_project();
    let a = create_test_submission(&tmp, "One");
    let b = create_test_submission(&tmp, "Two");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &a, "-y"])
        .assert()
        .success();

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "super-admin", "sub", "list", "all", "--format", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", b, a));
}

#[test]
fn test_list_all_only_shows_visible_collections() {
    let tmp = setup_test_project();
    let pending = create_test_submission(&tmp, "Still Pending");
    let approved = create_test_submission(&tmp, "Already Approved");
    let rejected = create_test_submission(&tmp, "Sent Back");

    institrack()
        .current_dir(tmp.path())
        .args(["approve", &approved, "-y"])
        .assert()
        .success();
    institrack()
        .current_dir(tmp.path())
        .args(["reject", &rejected, "-r", "Missing brochure", "-y"])
        .assert()
        .success();

    // Providers see pending and rejected, never approved
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "provider", "sub", "list", "all", "--format", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", pending, rejected));

    // Admins see pending only
    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "sub", "list", "all", "--format", "id"])
        .assert()
        .success()
        .stdout(format!("{}\n", pending));
}

#[test]
fn test_show_missing_key() {
    let tmp = setup_test_project();

    institrack()
        .current_dir(tmp.path())
        .args(["sub", "show", "SUB-NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Import and validate
// ============================================================================

#[test]
fn test_import_legacy_dump() {
    let tmp = setup_test_project();
    let dump = tmp.path().join("dump.json");
    fs::write(
        &dump,
        r#"{
            "institutionData": "[{\"keyId\":\"a1\",\"institutionName\":\"Legacy Pending\"}]",
            "approvedData": [{"keyId":"b2","institutionName":"Legacy Approved","status":"approved"}],
            "rejectedData": [{"keyId":"c3","institutionName":"No Comment"}]
        }"#,
    )
    .unwrap();

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "super-admin", "import", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 submission(s), skipped 1"));

    assert_eq!(list_keys(&tmp, "pending"), vec!["a1".to_string()]);
    assert_eq!(list_keys(&tmp, "approved"), vec!["b2".to_string()]);
    assert!(list_keys(&tmp, "rejected").is_empty());

    // Importing again skips everything
    institrack()
        .current_dir(tmp.path())
        .args(["import", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 submission(s), skipped 3"));
}

#[test]
fn test_import_denied_for_admin() {
    let tmp = setup_test_project();
    let dump = tmp.path().join("dump.json");
    fs::write(&dump, "{}").unwrap();

    institrack()
        .current_dir(tmp.path())
        .args(["--role", "admin", "import", dump.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not allowed to import"));
}

#[test]
fn test_validate_reports_corruption() {
    let tmp = setup_test_project();
    let key = create_test_submission(&tmp, "Twice");

    // Hand-edit the store so the key is both pending and rejected without a comment
    let pending = fs::read_to_string(tmp.path().join(".institrack/data/pending.yaml")).unwrap();
    fs::write(tmp.path().join(".institrack/data/rejected.yaml"), pending).unwrap();

    institrack()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains(&key[..13]))
        .stderr(predicate::str::contains("integrity problem"));
}

#[test]
fn test_completions() {
    institrack()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("institrack"));
}
