//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn parkpal() -> Command {
    let mut cmd = Command::cargo_bin("parkpal").unwrap();
    for var in [
        "DB_HOST",
        "DB_PORT",
        "DB_USER",
        "DB_PASSWORD",
        "DB_NAME",
        "DB_CONNECT_TIMEOUT",
        "PARKPAL_BIND",
        "PARKPAL_RESERVATION_MODE",
        "PARKPAL_STORE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    parkpal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_serve_help() {
    parkpal()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--reservation-mode"))
        .stdout(predicate::str::contains("--db-password"));
}

#[test]
fn test_rejects_unknown_reservation_mode() {
    parkpal()
        .args(["serve", "--store", "memory", "--reservation-mode", "optimistic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reservation mode"));
}

#[test]
fn test_missing_password_is_reported() {
    parkpal()
        .args(["migrate", "--db-user", "parkpal", "--db-name", "parkpal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DB_PASSWORD"));
}
