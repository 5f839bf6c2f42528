//! Drives the `expense` binary against a temporary data directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn expense(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("expense").unwrap();
    cmd.env("EXPENSE_TRACKER_DATA_DIR", dir.path())
        .env_remove("EXPENSE_TRACKER_USER")
        .env_remove("EXPENSE_TRACKER_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    expense(&dir)
        .arg("init")
        .env("EXPENSE_TRACKER_ADMIN_PASSWORD", "admin-pass")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    expense(&dir)
        .args(["register", "alice"])
        .env("EXPENSE_TRACKER_PASSWORD", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, alice"));
    dir
}

fn as_alice(dir: &TempDir) -> Command {
    let mut cmd = expense(dir);
    cmd.env("EXPENSE_TRACKER_USER", "alice")
        .env("EXPENSE_TRACKER_PASSWORD", "secret");
    cmd
}

fn as_admin(dir: &TempDir) -> Command {
    let mut cmd = expense(dir);
    cmd.args(["--user", "admin"])
        .env("EXPENSE_TRACKER_PASSWORD", "admin-pass");
    cmd
}

#[test]
fn init_creates_store_and_categories() {
    let dir = initialized();
    assert!(dir.path().join("expense_tracker.db").exists());
    assert!(dir.path().join("config.json").exists());

    as_alice(&dir)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transportation"))
        .stdout(predicate::str::contains("Salary"));
}

#[test]
fn duplicate_registration_fails() {
    let dir = initialized();
    expense(&dir)
        .args(["register", "alice"])
        .env("EXPENSE_TRACKER_PASSWORD", "other")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Username already exists"));
}

#[test]
fn register_before_init_is_refused() {
    let dir = TempDir::new().unwrap();
    expense(&dir)
        .args(["register", "admin"])
        .env("EXPENSE_TRACKER_PASSWORD", "mallory")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expense init"));

    expense(&dir)
        .arg("init")
        .env("EXPENSE_TRACKER_ADMIN_PASSWORD", "admin-pass")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created administrator account 'admin'"));
}

#[test]
fn login_reports_bad_credentials() {
    let dir = initialized();
    expense(&dir)
        .args(["--user", "alice", "login"])
        .env("EXPENSE_TRACKER_PASSWORD", "wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect password!"));

    expense(&dir)
        .args(["--user", "zed", "login"])
        .env("EXPENSE_TRACKER_PASSWORD", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Username not found!"));

    as_alice(&dir)
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as alice."));
}

#[test]
fn add_list_and_report() {
    let dir = initialized();

    as_alice(&dir)
        .args(["txn", "add", "expense", "12.50", "Food", "--date", "2024-01-15", "--note", "lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transaction added successfully!"));
    as_alice(&dir)
        .args(["txn", "add", "income", "100", "Salary", "--date", "2024-01-01"])
        .assert()
        .success();

    as_alice(&dir)
        .args(["txn", "add", "expense", "0", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));

    as_alice(&dir)
        .args(["txn", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lunch"))
        .stdout(predicate::str::contains("-$12.50"));

    as_alice(&dir)
        .args(["report", "period", "--from", "2024-01-01", "--to", "2024-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance: $87.50"))
        .stdout(predicate::str::contains("2024-01"));

    as_alice(&dir)
        .args(["txn", "export", "--from", "2024-01-01", "--to", "2024-01-31"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("date,type,amount,category,note\n"))
        .stdout(predicate::str::contains("2024-01-15,expense,12.50,Food,lunch"));
}

#[test]
fn admin_commands_require_admin() {
    let dir = initialized();

    as_alice(&dir)
        .args(["admin", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));

    as_admin(&dir)
        .args(["admin", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Users:"));

    as_admin(&dir)
        .args(["admin", "users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));
}

#[test]
fn admin_deletes_user_and_backs_up() {
    let dir = initialized();
    as_alice(&dir)
        .args(["txn", "add", "expense", "5", "Food", "--date", "2024-01-15"])
        .assert()
        .success();

    as_admin(&dir)
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));
    as_admin(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backup-"));

    // Retyping the wrong name cancels
    as_admin(&dir)
        .args(["admin", "delete-user", "alice"])
        .write_stdin("bob\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deletion cancelled."));

    as_admin(&dir)
        .args(["admin", "delete-user", "alice"])
        .write_stdin("alice\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted user 'alice' (1 transactions"));

    as_admin(&dir)
        .args(["admin", "delete-user", "admin", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Protected account"));

    as_admin(&dir)
        .args(["admin", "audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));
}
