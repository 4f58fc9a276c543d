use std::fs;

use tempfile::TempDir;
use warden_cli::commands::{load_policy, roles};
use warden_core::Method;

const AMIV: &str = include_str!("../../policies/amiv.yaml");

#[test]
fn test_lists_one_role() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("policy.yaml");
    fs::write(&path, AMIV).unwrap();
    let policy = load_policy(&path).unwrap();

    let rows = roles::rows(&policy, Some("event-admin")).unwrap();
    let resources: Vec<&str> = rows.iter().map(|(_, r, _)| r.as_str()).collect();
    assert_eq!(resources, vec!["events", "eventsignups"]);
    assert!(rows.iter().all(|(role, _, m)| role == "event-admin" && m.len() == 5));
    assert!(rows[0].2.contains(Method::Delete));
}

#[test]
fn test_lists_every_role() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("policy.yaml");
    fs::write(&path, AMIV).unwrap();
    let policy = load_policy(&path).unwrap();

    let rows = roles::rows(&policy, None).unwrap();
    let mut seen: Vec<&str> = rows.iter().map(|(role, _, _)| role.as_str()).collect();
    seen.dedup();
    assert_eq!(
        seen,
        vec![
            "event-admin",
            "job-admin",
            "mail-admin",
            "read-everything",
            "studydocs-admin",
            "vorstand"
        ]
    );
    assert!(roles::run(&path, None).is_ok());
}

#[test]
fn test_unknown_role_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("policy.yaml");
    fs::write(&path, AMIV).unwrap();
    let policy = load_policy(&path).unwrap();

    assert!(roles::rows(&policy, Some("janitor")).is_err());
}
