use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db_with_data, ok, sakip, setup_test_db, temp_out};

#[test]
fn test_data_submit_validate_cycle() {
    let db_path = setup_test_db("data_cycle");
    init_db_with_data(&db_path);

    sakip()
        .args(["--db", &db_path, "data", "list"])
        .assert()
        .success()
        .stdout(contains("2025-03").and(contains("85.00%")).and(contains("draft")));

    // only submitted data can be validated
    sakip()
        .args(["--db", &db_path, "data", "validate", "1"])
        .assert()
        .failure()
        .stderr(contains("cannot be validated from status draft"));

    sakip()
        .args(["--db", &db_path, "data", "submit", "1"])
        .assert()
        .success()
        .stdout(contains("submitted"));

    // submitted rows are frozen
    sakip()
        .args(["--db", &db_path, "data", "edit", "1", "--value", "90"])
        .assert()
        .failure();

    sakip()
        .args(["--db", &db_path, "data", "reject", "1"])
        .assert()
        .failure()
        .stderr(contains("rejection reason"));

    sakip()
        .args(["--db", &db_path, "data", "reject", "1", "--reason", "Bukti tidak lengkap"])
        .assert()
        .success()
        .stdout(contains("rejected"));

    ok(&db_path, &["data", "edit", "1", "--value", "92"]);
    ok(&db_path, &["data", "submit", "1"]);
    ok(&db_path, &["data", "validate", "1"]);

    sakip()
        .args(["--db", &db_path, "data", "list", "--status", "validated"])
        .assert()
        .success()
        .stdout(contains("92.00%").and(contains("good")));
}

#[test]
fn test_duplicate_period_and_bad_period() {
    let db_path = setup_test_db("data_duplicate");
    init_db_with_data(&db_path);

    sakip()
        .args([
            "--db", &db_path, "data", "add", "--indicator", "1", "--instansi", "1", "--period",
            "2025-03", "--value", "10",
        ])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    sakip()
        .args([
            "--db", &db_path, "data", "add", "--indicator", "1", "--instansi", "1", "--period",
            "2025-13", "--value", "10",
        ])
        .assert()
        .failure();
}

#[test]
fn test_assessment_flow() {
    let db_path = setup_test_db("assessment_flow");
    init_db_with_data(&db_path);

    // draft data cannot be assessed
    sakip()
        .args(["--db", &db_path, "assessment", "add", "--data", "1"])
        .assert()
        .failure()
        .stderr(contains("Only submitted or validated"));

    ok(&db_path, &["data", "submit", "1"]);
    ok(&db_path, &["assessment", "add", "--data", "1"]);

    // no score yet
    sakip()
        .args(["--db", &db_path, "assessment", "complete", "1"])
        .assert()
        .failure();

    sakip()
        .args(["--db", &db_path, "assessment", "edit", "1", "--score", "84.5"])
        .assert()
        .success()
        .stdout(contains("grade B").and(contains("in_review")));

    sakip()
        .args(["--db", &db_path, "assessment", "edit", "1", "--score", "101"])
        .assert()
        .failure()
        .stderr(contains("between 0 and 100"));

    ok(&db_path, &["assessment", "complete", "1"]);
    sakip()
        .args(["--db", &db_path, "assessment", "approve", "1"])
        .assert()
        .success()
        .stdout(contains("approved"));

    sakip()
        .args(["--db", &db_path, "assessment", "add", "--data", "1"])
        .assert()
        .failure()
        .stderr(contains("already been assessed"));

    // assessed data is kept
    sakip()
        .args(["--db", &db_path, "data", "del", "1"])
        .assert()
        .failure();
}

#[test]
fn test_dashboard_json() {
    let db_path = setup_test_db("dashboard_json");
    init_db_with_data(&db_path);

    sakip()
        .args(["--db", &db_path, "dashboard", "--year", "2025", "--json"])
        .assert()
        .success()
        .stdout(
            contains("\"total_indicators\": 1")
                .and(contains("\"active_targets\": 1"))
                .and(contains("\"overall_achievement\": 0.0")),
        );

    ok(&db_path, &["data", "submit", "1"]);
    sakip()
        .args(["--db", &db_path, "dashboard", "--year", "2025", "--json"])
        .assert()
        .success()
        .stdout(
            contains("\"submitted_data\": 1")
                .and(contains("\"compliance_rate\": 100.0"))
                .and(contains("data_submission")),
        );

    ok(&db_path, &["data", "validate", "1"]);
    sakip()
        .args(["--db", &db_path, "dashboard", "--year", "2025", "--json"])
        .assert()
        .success()
        .stdout(
            contains("\"overall_achievement\": 85.0")
                .and(contains("\"indicator_code\": \"IKU-01\""))
                .and(contains("\"underperforming_indicators\": []")),
        );

    sakip()
        .args(["--db", &db_path, "dashboard", "--year", "2025"])
        .assert()
        .success()
        .stdout(contains("Top performers").and(contains("Cakupan imunisasi")));
}

#[test]
fn test_export_csv_and_relative_path() {
    let db_path = setup_test_db("export_csv");
    init_db_with_data(&db_path);
    let out = temp_out("export_csv", "csv");

    sakip()
        .args([
            "--db",
            &db_path,
            "export",
            "--type",
            "indicators",
            "--format",
            "csv",
            "--file",
            &out,
        ])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).expect("read csv");
    assert!(content.contains("IKU-01"));
    assert!(content.contains("Cakupan imunisasi"));

    sakip()
        .args([
            "--db", &db_path, "export", "--type", "indicators", "--format", "json", "--file",
            "relative.json",
        ])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_export_performance_data_xlsx_and_pdf() {
    let db_path = setup_test_db("export_binary");
    init_db_with_data(&db_path);

    for ext in ["xlsx", "pdf"] {
        let out = temp_out("export_binary", ext);
        sakip()
            .args([
                "--db",
                &db_path,
                "export",
                "--type",
                "performance-data",
                "--format",
                ext,
                "--file",
                &out,
                "--range",
                "2025",
            ])
            .assert()
            .success();
        let bytes = fs::read(&out).expect("read export");
        assert!(!bytes.is_empty());
        if ext == "pdf" {
            assert!(bytes.starts_with(b"%PDF"));
        } else {
            assert!(bytes.starts_with(b"PK"));
        }
    }
}

#[test]
fn test_data_quality_check() {
    let db_path = setup_test_db("data_check");
    init_db_with_data(&db_path);

    // mandatory indicator, no evidence yet, reported long after March 2025
    sakip()
        .args(["--db", &db_path, "data", "check", "1"])
        .assert()
        .success()
        .stderr(contains("[missing_evidence]"))
        .stdout(
            contains("[late_submission]")
                .and(contains("quality score 75 (good)"))
                .and(contains("85.00%")),
        );

    sakip()
        .args(["--db", &db_path, "data", "check", "1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"severity\": \"critical\"").and(contains("\"is_valid\": true")));

    sakip()
        .args(["--db", &db_path, "data", "check", "99"])
        .assert()
        .failure();
}
