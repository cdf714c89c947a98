use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_offline_payment_intent() {
    let mut input = NamedTempFile::new().unwrap();
    write!(
        input,
        r#"{{"amount": 1999, "currency": "usd", "receiptEmail": "a@b.com"}}"#
    )
    .unwrap();

    let output = Command::new(cargo_bin!("checkout"))
        .arg("payment-intent")
        .arg(input.path())
        .env_remove("STRIPE_SECRET_KEY")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("offline in-memory gateway"));

    let intent: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(intent["id"].as_str().unwrap().starts_with("pi_"));
    assert_eq!(intent["amount"], 1999);
    assert_eq!(intent["currency"], "usd");
    assert_eq!(intent["payment_method_types"], serde_json::json!(["card"]));
    assert_eq!(intent["description"], "Shop purchase");
    assert_eq!(intent["receipt_email"], "a@b.com");
}

#[test]
fn test_rejected_payment_intent_fails() {
    let mut input = NamedTempFile::new().unwrap();
    write!(
        input,
        r#"{{"amount": 0, "currency": "usd", "receiptEmail": "a@b.com"}}"#
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("checkout"));
    cmd.arg("payment-intent")
        .arg(input.path())
        .env_remove("STRIPE_SECRET_KEY");

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Gateway rejected request (400)"));
}
