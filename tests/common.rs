#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn sakip() -> Command {
    cargo_bin_cmd!("sakip")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_sakip.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_sakip_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh directory under the temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("{name}_sakip_dir"));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// Run `sakip --db <db> <args>` and expect success.
pub fn ok(db_path: &str, args: &[&str]) {
    sakip().arg("--db").arg(db_path).args(args).assert().success();
}

/// Initialize DB and add one instansi (#1), one indicator (#1) with an
/// approved 2025 target of 100 and one draft data row (#1) for 2025-03.
pub fn init_db_with_data(db_path: &str) {
    sakip()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    ok(
        db_path,
        &["instansi", "add", "--kode", "DINKES", "--nama", "Dinas Kesehatan"],
    );
    ok(
        db_path,
        &[
            "indicator",
            "add",
            "--instansi",
            "1",
            "--code",
            "IKU-01",
            "--name",
            "Cakupan imunisasi",
            "--unit",
            "persen",
            "--category",
            "outcome",
            "--frequency",
            "monthly",
            "--weight",
            "10",
            "--mandatory",
            "true",
        ],
    );
    ok(
        db_path,
        &["target", "add", "--indicator", "1", "--year", "2025", "--value", "100"],
    );
    ok(db_path, &["target", "approve", "1"]);
    ok(
        db_path,
        &[
            "data",
            "add",
            "--indicator",
            "1",
            "--instansi",
            "1",
            "--period",
            "2025-03",
            "--value",
            "85",
        ],
    );
}
