//! Audit entry structure
//!
//! An [`AuditEntry`] records one action taken by an agent: who acted, what
//! kind of action it was, the inputs it saw, the outputs it produced and the
//! rationale behind them. Entries are immutable once sealed and are chained
//! together by hash so that any later edit of the log is detectable.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuditError, Result};

const FIELD_SEPARATOR: &[u8] = &[0x1f];

/// One structured step of an agent's rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Check or decision this step describes (e.g. "missing-values")
    pub check: String,

    /// Short conclusion reached by the step
    pub conclusion: String,

    /// Supporting data for the conclusion
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

impl ReasoningStep {
    pub fn new(check: impl Into<String>, conclusion: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            conclusion: conclusion.into(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// An action waiting to be appended to the trail
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub agent_name: String,
    pub action_type: String,
    pub inputs: serde_json::Value,
    pub outputs: serde_json::Value,
    pub notes: Option<String>,
    pub reasoning: Vec<ReasoningStep>,
}

impl NewEntry {
    /// Start a new entry for the given agent and action type
    pub fn new(agent_name: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            action_type: action_type.into(),
            inputs: serde_json::Value::Null,
            outputs: serde_json::Value::Null,
            notes: None,
            reasoning: Vec::new(),
        }
    }

    /// Set the inputs the agent acted on
    pub fn with_inputs(mut self, inputs: serde_json::Value) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the outputs the agent produced
    pub fn with_outputs(mut self, outputs: serde_json::Value) -> Self {
        self.outputs = outputs;
        self
    }

    /// Attach free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Append a reasoning step
    pub fn with_reasoning_step(mut self, step: ReasoningStep) -> Self {
        self.reasoning.push(step);
        self
    }

    /// Replace the reasoning steps
    pub fn with_reasoning(mut self, steps: Vec<ReasoningStep>) -> Self {
        self.reasoning = steps;
        self
    }

    /// Reject entries that cannot be attributed or categorized
    pub fn validate(&self) -> Result<()> {
        if self.agent_name.trim().is_empty() {
            return Err(AuditError::invalid_entry("agent_name must not be empty"));
        }
        if self.action_type.trim().is_empty() {
            return Err(AuditError::invalid_entry("action_type must not be empty"));
        }
        Ok(())
    }
}

/// A sealed, hash-chained audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// Position in the trail, starting at 1
    pub sequence: u64,

    /// When the action was recorded
    pub timestamp: DateTime<Utc>,

    /// Name of the agent performing the action
    pub agent_name: String,

    /// Type of action (e.g. "validation", "summary")
    pub action_type: String,

    /// Inputs to the agent
    pub inputs: serde_json::Value,

    /// Outputs from the agent
    pub outputs: serde_json::Value,

    /// Optional notes or context
    pub notes: Option<String>,

    /// Structured rationale behind the outputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning: Vec<ReasoningStep>,

    /// SHA-256 of the inputs, for deduplication and tracing
    pub inputs_hash: String,

    /// Hash of the previous entry, `None` for the first one
    pub prev_hash: Option<String>,

    /// Hash over every other field of this entry
    pub entry_hash: String,
}

impl AuditEntry {
    /// Seal a new entry at the given position in the chain
    pub fn seal(
        entry: NewEntry,
        sequence: u64,
        prev_hash: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        entry.validate()?;

        let inputs_hash = hash_value(&entry.inputs)?;
        let mut sealed = Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp,
            agent_name: entry.agent_name,
            action_type: entry.action_type,
            inputs: entry.inputs,
            outputs: entry.outputs,
            notes: entry.notes,
            reasoning: entry.reasoning,
            inputs_hash,
            prev_hash,
            entry_hash: String::new(),
        };
        sealed.entry_hash = sealed.compute_hash()?;
        Ok(sealed)
    }

    /// Recompute the hash of this entry from its contents
    pub fn compute_hash(&self) -> Result<String> {
        let mut hasher = Sha256::new();

        hasher.update(self.sequence.to_be_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(self.id.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(
            self.timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        hasher.update(FIELD_SEPARATOR);
        hasher.update(self.agent_name.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(self.action_type.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(serde_json::to_string(&self.inputs)?.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(serde_json::to_string(&self.outputs)?.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        if let Some(ref notes) = self.notes {
            hasher.update(notes.as_bytes());
        }
        hasher.update(FIELD_SEPARATOR);
        hasher.update(serde_json::to_string(&self.reasoning)?.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(self.inputs_hash.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        if let Some(ref prev) = self.prev_hash {
            hasher.update(prev.as_bytes());
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Check that the stored hashes still match the contents
    pub fn hash_is_valid(&self) -> bool {
        let inputs_ok = hash_value(&self.inputs)
            .map(|h| h == self.inputs_hash)
            .unwrap_or(false);
        let entry_ok = self
            .compute_hash()
            .map(|h| h == self.entry_hash)
            .unwrap_or(false);
        inputs_ok && entry_ok
    }

    /// One-line summary for logging and table output
    pub fn summary(&self) -> String {
        format!(
            "#{} [{}] {} / {}{}",
            self.sequence,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.agent_name,
            self.action_type,
            self.notes
                .as_deref()
                .map(|n| format!(" - {}", n))
                .unwrap_or_default(),
        )
    }
}

/// SHA-256 of a JSON value's compact encoding
pub fn hash_value(value: &serde_json::Value) -> Result<String> {
    let encoded = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
