//! Integration tests for the audit trail
//!
//! Mirrors a session where several agents log actions into one trail and
//! an operator queries and verifies it afterwards.

use audit_trail::{AuditQuery, AuditTrail, NewEntry, ReasoningStep};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn populated_trail(dir: &TempDir) -> AuditTrail {
    let trail = AuditTrail::open(dir.path().join("test_audit_log.jsonl")).unwrap();

    trail
        .log_action(
            "ModelOutputSummarizer",
            "summary",
            Some(json!({
                "predictions": [0.85, 0.30, 0.60],
                "shap_values": [
                    {"age": 0.3, "chol": 0.5, "sex": -0.1},
                    {"age": -0.1, "chol": -0.2, "sex": 0.05},
                    {"age": 0.2, "chol": 0.25, "sex": -0.05}
                ]
            })),
            Some(json!([
                "Prediction 1: High risk (0.85)",
                "Prediction 2: Low risk (0.30)",
                "Prediction 3: Moderate risk (0.60)"
            ])),
            Some("Test run with sample SHAP values"),
        )
        .unwrap();

    trail
        .record(
            NewEntry::new("DataQualityValidator", "validation")
                .with_inputs(json!({"dataset": "heart_disease_uci.csv"}))
                .with_outputs(json!({
                    "severity": "HIGH",
                    "blocking_issues": ["ca missing 66%", "thal missing 52%"]
                }))
                .with_notes("Initial data validation for heart disease dataset")
                .with_reasoning_step(
                    ReasoningStep::new("missing-values", "2 columns above critical threshold")
                        .with_detail(json!({"ca": 0.6641, "thal": 0.5217})),
                ),
        )
        .unwrap();

    trail
        .log_action(
            "RandomAgent",
            "custom_action",
            Some(json!({"param": 42})),
            Some(json!({"result": "Success"})),
            Some("Testing custom action logging"),
        )
        .unwrap();

    trail
}

#[test]
fn test_all_logs_in_order() {
    let dir = TempDir::new().unwrap();
    let trail = populated_trail(&dir);

    let all = trail.query_logs(None, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(
        all.iter().map(|e| e.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn test_query_by_agent_and_action() {
    let dir = TempDir::new().unwrap();
    let trail = populated_trail(&dir);

    let summarizer = trail.query_logs(Some("ModelOutputSummarizer"), None).unwrap();
    assert_eq!(summarizer.len(), 1);
    assert_eq!(summarizer[0].action_type, "summary");

    let validations = trail.query_logs(None, Some("validation")).unwrap();
    assert_eq!(validations.len(), 1);
    assert_eq!(validations[0].agent_name, "DataQualityValidator");
    assert_eq!(validations[0].reasoning.len(), 1);
    assert_eq!(validations[0].outputs["severity"], "HIGH");
}

#[test]
fn test_query_with_limit_and_pattern() {
    let dir = TempDir::new().unwrap();
    let trail = populated_trail(&dir);

    let query = AuditQuery::new().notes_matching("(?i)test").unwrap().limit(1);
    let matched = trail.query(&query).unwrap();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].agent_name, "RandomAgent");
}

#[test]
fn test_log_is_one_json_object_per_line() {
    let dir = TempDir::new().unwrap();
    let trail = populated_trail(&dir);

    let content = std::fs::read_to_string(trail.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("timestamp").is_some());
        assert!(value.get("entry_hash").is_some());
    }
}

#[test]
fn test_reopened_trail_verifies() {
    let dir = TempDir::new().unwrap();
    let path = populated_trail(&dir).path().to_path_buf();

    let reopened = AuditTrail::open(&path).unwrap();
    reopened
        .log_action("DataQualityValidator", "validation", None, None, Some("rerun"))
        .unwrap();

    let report = reopened.verify().unwrap();
    assert!(report.valid);
    assert_eq!(report.entries_checked, 4);
}

#[test]
fn test_concurrent_appends_form_one_chain() {
    let dir = TempDir::new().unwrap();
    let trail = Arc::new(AuditTrail::open(dir.path().join("shared.jsonl")).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let trail = Arc::clone(&trail);
            thread::spawn(move || {
                for step in 0..25 {
                    trail
                        .log_action(
                            &format!("Worker{}", worker),
                            "step",
                            Some(json!({ "step": step })),
                            None,
                            None,
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(trail.len(), 100);
    let entries = trail.entries().unwrap();
    let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, (1..=100).collect::<Vec<u64>>());

    let report = trail.verify().unwrap();
    assert!(report.valid);
    assert_eq!(report.entries_checked, 100);
    assert_eq!(
        trail.query(&AuditQuery::new().agent("Worker2")).unwrap().len(),
        25
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_any_sequence_of_actions_verifies(
        actions in prop::collection::vec(("[a-zA-Z]{1,12}", "[a-z_]{1,10}", any::<i64>(), -1.0e6f64..1.0e6f64), 1..8)
    ) {
        let dir = TempDir::new().unwrap();
        let trail = AuditTrail::open(dir.path().join("audit.jsonl")).unwrap();

        for (agent, action, n, x) in &actions {
            trail
                .log_action(agent, action, Some(json!({"n": n, "x": x})), None, None)
                .unwrap();
        }

        let report = trail.verify().unwrap();
        prop_assert!(report.valid);
        prop_assert_eq!(report.entries_checked, actions.len() as u64);
    }
}
