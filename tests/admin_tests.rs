use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{ok, sakip, setup_test_db, temp_dir};

fn init_seeded(name: &str) -> String {
    let db_path = setup_test_db(name);
    sakip()
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));
    sakip()
        .args(["--db", &db_path, "seed"])
        .assert()
        .success()
        .stdout(contains("Seed completed"));
    db_path
}

#[test]
fn test_seed_is_idempotent() {
    let db_path = init_seeded("seed_twice");

    sakip()
        .args(["--db", &db_path, "seed"])
        .assert()
        .success()
        .stdout(contains("0 permission(s), 0 role(s) created"));

    sakip()
        .args(["--db", &db_path, "role", "list"])
        .assert()
        .success()
        .stdout(contains("superadmin").and(contains("data_collector")));
}

#[test]
fn test_user_roles_and_permissions() {
    let db_path = init_seeded("user_roles");

    sakip()
        .args([
            "--db",
            &db_path,
            "user",
            "add",
            "--name",
            "Operator Bappeda",
            "--email",
            "Operator@Bappeda.go.id",
            "--password",
            "rahasia-123",
            "--role",
            "data_collector",
        ])
        .assert()
        .success()
        .stdout(contains("operator@bappeda.go.id").and(contains("Role 'data_collector' assigned")));

    sakip()
        .args([
            "--db", &db_path, "user", "add", "--name", "Lagi", "--email",
            "operator@bappeda.go.id", "--password", "rahasia-123",
        ])
        .assert()
        .failure()
        .stderr(contains("already been taken"));

    sakip()
        .args(["--db", &db_path, "role", "check", "operator@bappeda.go.id", "sakip.data_collector"])
        .assert()
        .success()
        .stdout(contains("has sakip.data_collector"));

    sakip()
        .args(["--db", &db_path, "role", "check", "1", "sakip.assessor"])
        .assert()
        .success()
        .stdout(contains("lacks sakip.assessor"));

    sakip()
        .args(["--db", &db_path, "role", "assign", "1", "data_collector"])
        .assert()
        .success()
        .stdout(contains("already has role"));

    sakip()
        .args(["--db", &db_path, "role", "assign", "1", "kepala_dinas"])
        .assert()
        .failure();

    ok(&db_path, &["role", "grant", "1", "sakip.assessor"]);
    sakip()
        .args(["--db", &db_path, "role", "check", "1", "sakip.assessor"])
        .assert()
        .success()
        .stdout(contains("has sakip.assessor"));

    ok(&db_path, &["role", "remove", "1", "data_collector"]);
    sakip()
        .args(["--db", &db_path, "user", "list"])
        .assert()
        .success()
        .stdout(contains("Operator Bappeda"));
}

#[test]
fn test_token_login_and_deactivation() {
    let db_path = init_seeded("user_token");
    ok(
        &db_path,
        &[
            "user", "add", "--name", "Evaluator", "--email", "evaluator@inspektorat.go.id",
            "--password", "benar-sekali",
        ],
    );

    sakip()
        .args([
            "--db", &db_path, "user", "token", "--email", "evaluator@inspektorat.go.id",
            "--password", "salah",
        ])
        .assert()
        .failure()
        .stderr(contains("credentials are incorrect"));

    sakip()
        .args([
            "--db", &db_path, "user", "token", "--email", "evaluator@inspektorat.go.id",
            "--password", "benar-sekali",
        ])
        .assert()
        .success()
        .stdout(contains("Token for evaluator@inspektorat.go.id"));

    ok(&db_path, &["user", "deactivate", "evaluator@inspektorat.go.id"]);
    sakip()
        .args([
            "--db", &db_path, "user", "token", "--email", "evaluator@inspektorat.go.id",
            "--password", "benar-sekali",
        ])
        .assert()
        .failure()
        .stderr(contains("deactivated"));
}

#[test]
fn test_add_permissions_modes() {
    let db_path = init_seeded("add_permissions");
    ok(
        &db_path,
        &["user", "add", "--name", "Tanpa Akses", "--email", "staf@bappeda.go.id", "--password", "rahasia-123"],
    );

    sakip()
        .args(["--db", &db_path, "add-permissions"])
        .assert()
        .success()
        .stdout(
            contains("All 11 SAKIP permissions exist")
                .and(contains("without any SAKIP permission"))
                .and(contains("staf@bappeda.go.id")),
        );

    sakip()
        .args(["--db", &db_path, "add-permissions", "--user", "staf@bappeda.go.id"])
        .assert()
        .success()
        .stdout(contains("6 permission(s) added to staf@bappeda.go.id"));

    sakip()
        .args(["--db", &db_path, "add-permissions", "--fix-all"])
        .assert()
        .success()
        .stdout(contains("superadmin now holds every permission"));

    sakip()
        .args(["--db", &db_path, "add-permissions"])
        .assert()
        .success()
        .stdout(contains("Every user holds at least one SAKIP permission"));
}

#[test]
fn test_remove_test_users() {
    let db_path = init_seeded("remove_test_users");
    ok(
        &db_path,
        &["user", "add", "--name", "Demo", "--email", "demo@pemda.go.id", "--password", "rahasia-123"],
    );
    ok(
        &db_path,
        &["user", "add", "--name", "Contoh", "--email", "admin@example.com", "--password", "rahasia-123", "--role", "superadmin"],
    );
    ok(
        &db_path,
        &["user", "add", "--name", "Asli", "--email", "kabid@bappeda.go.id", "--password", "rahasia-123"],
    );

    sakip()
        .args(["--db", &db_path, "remove-test-users", "--dry-run"])
        .assert()
        .success()
        .stdout(
            contains("2 test user(s) found")
                .and(contains("Dry run"))
                .and(contains("kabid@bappeda.go.id").not()),
        );

    sakip()
        .args(["--db", &db_path, "remove-test-users", "--force"])
        .assert()
        .success()
        .stdout(contains("2 test user(s) removed"));

    sakip()
        .args(["--db", &db_path, "user", "list"])
        .assert()
        .success()
        .stdout(contains("kabid@bappeda.go.id").and(contains("demo@pemda.go.id").not()));

    sakip()
        .args(["--db", &db_path, "remove-test-users", "--force"])
        .assert()
        .success()
        .stdout(contains("No test users found"));
}

#[test]
fn test_check_missing_classes() {
    let root = temp_dir("php_project");
    let write = |rel: &str, body: &str| {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().expect("parent")).expect("mkdir");
        fs::write(p, body).expect("write php");
    };
    write(
        "app/Http/Requests/Sakip/StoreIndicatorRequest.php",
        "<?php\nnamespace App\\Http\\Requests\\Sakip;\nclass StoreIndicatorRequest {}\n",
    );
    write(
        "app/Http/Controllers/IndicatorController.php",
        "<?php\nnamespace App\\Http\\Controllers;\nuse App\\Http\\Requests\\StoreIndicatorRequest;\nclass IndicatorController {}\n",
    );
    let root_arg = root.to_string_lossy().to_string();

    sakip()
        .args(["check-missing-classes", "--root", &root_arg])
        .assert()
        .failure()
        .stdout(contains("StoreIndicatorRequest").and(contains("wrong namespace")))
        .stderr(contains("1 class issue(s) found"));

    sakip()
        .args(["check-missing-classes", "--root", &root_arg, "--fix"])
        .assert()
        .failure()
        .stdout(contains("Fixed 1 issue(s)"));

    sakip()
        .args(["check-missing-classes", "--root", &root_arg])
        .assert()
        .success()
        .stdout(contains("No missing classes found"));

    sakip()
        .args(["check-missing-classes", "--root", &root_arg, "--path", "app/Missing"])
        .assert()
        .failure()
        .stderr(contains("Path does not exist"));
}

#[test]
fn test_validate_upload() {
    let dir = temp_dir("uploads");

    let pdf = dir.join("laporan.pdf");
    fs::write(&pdf, b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF").expect("write pdf");
    sakip()
        .args(["validate-upload", &pdf.to_string_lossy()])
        .assert()
        .success()
        .stdout(contains("laporan.pdf accepted").and(contains("application/pdf")));

    let disguised = dir.join("foto.jpg");
    fs::write(&disguised, b"%PDF-1.7\n%%EOF").expect("write jpg");
    sakip()
        .args(["validate-upload", &disguised.to_string_lossy()])
        .assert()
        .failure()
        .stderr(contains("does not match its extension"));

    let script = dir.join("shell.php");
    fs::write(&script, b"<?php system($_GET['c']);").expect("write php");
    sakip()
        .args(["validate-upload", &script.to_string_lossy()])
        .assert()
        .failure()
        .stderr(contains("not allowed for security reasons"));
}

#[test]
fn test_db_info_log_and_config_check() {
    let db_path = init_seeded("db_info");

    sakip()
        .args(["--db", &db_path, "db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed").and(contains("Schema is up to date")));

    sakip()
        .args(["--db", &db_path, "db", "--info"])
        .assert()
        .success()
        .stdout(contains("Performance data").and(contains("Roles")));

    sakip()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"));

    sakip()
        .args(["--db", &db_path, "config", "--check"])
        .assert()
        .success()
        .stdout(contains("Configuration is valid"));
}
