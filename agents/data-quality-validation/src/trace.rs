//! Execution trace of a validation run
//!
//! A trace records one step per rule: when it ran, what it concluded and
//! the statistics it produced. The steps become the structured `reasoning`
//! of the audit entry written for the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use audit_trail::ReasoningStep;

/// Status of a trace or trace step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Running,
    Completed,
    Failed,
}

fn elapsed_ms(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - started_at).num_milliseconds().max(0) as u64
}

/// One rule evaluation within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub rule_id: String,
    pub status: TraceStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Short outcome, e.g. "2 column(s) flagged"
    pub conclusion: String,
    /// Statistics produced by the rule
    pub artifact: serde_json::Value,
}

impl TraceStep {
    pub fn start(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            status: TraceStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            conclusion: String::new(),
            artifact: serde_json::Value::Null,
        }
    }

    /// Mark the step as completed with its outcome
    pub fn complete(&mut self, conclusion: impl Into<String>, artifact: serde_json::Value) {
        let now = Utc::now();
        self.status = TraceStatus::Completed;
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
        self.conclusion = conclusion.into();
        self.artifact = artifact;
    }

    /// Mark the step as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        let now = Utc::now();
        self.status = TraceStatus::Failed;
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
        self.conclusion = error.into();
    }
}

/// Trace of a full validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub execution_id: Uuid,
    pub agent_name: String,
    pub status: TraceStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub steps: Vec<TraceStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionTrace {
    pub fn start(agent_name: impl Into<String>) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            agent_name: agent_name.into(),
            status: TraceStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
            steps: Vec::new(),
            error: None,
        }
    }

    pub fn add_step(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    pub fn complete(&mut self) {
        let now = Utc::now();
        self.status = TraceStatus::Completed;
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        let now = Utc::now();
        self.status = TraceStatus::Failed;
        self.ended_at = Some(now);
        self.duration_ms = Some(elapsed_ms(self.started_at, now));
        self.error = Some(error.into());
    }

    /// Steps expressed as audit reasoning
    pub fn to_reasoning(&self) -> Vec<ReasoningStep> {
        self.steps
            .iter()
            .map(|step| {
                ReasoningStep::new(step.rule_id.clone(), step.conclusion.clone())
                    .with_detail(step.artifact.clone())
            })
            .collect()
    }
}
