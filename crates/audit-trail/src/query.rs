//! Filters over the audit trail

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::entry::AuditEntry;
use crate::error::{AuditError, Result};

/// Query over stored entries; all set filters must match
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    agent_name: Option<String>,
    action_type: Option<String>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    notes_pattern: Option<Regex>,
    limit: Option<usize>,
}

impl AuditQuery {
    /// Query matching every entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Only entries written by this agent
    pub fn agent(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    /// Only entries of this action type
    pub fn action(mut self, action_type: impl Into<String>) -> Self {
        self.action_type = Some(action_type.into());
        self
    }

    /// Only entries recorded at or after `since`
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Only entries recorded at or before `until`
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Only entries whose notes match the regular expression
    pub fn notes_matching(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| AuditError::invalid_query(format!("bad notes pattern: {}", e)))?;
        self.notes_pattern = Some(regex);
        Ok(self)
    }

    /// Keep only the most recent `limit` matches
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether a single entry passes every filter
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(ref agent) = self.agent_name {
            if &entry.agent_name != agent {
                return false;
            }
        }
        if let Some(ref action) = self.action_type {
            if &entry.action_type != action {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.timestamp > until {
                return false;
            }
        }
        if let Some(ref pattern) = self.notes_pattern {
            match entry.notes {
                Some(ref notes) if pattern.is_match(notes) => {}
                _ => return false,
            }
        }
        true
    }

    /// Apply the query to entries in chronological order
    pub fn apply<I>(&self, entries: I) -> Vec<AuditEntry>
    where
        I: IntoIterator<Item = AuditEntry>,
    {
        let mut matched: Vec<AuditEntry> =
            entries.into_iter().filter(|e| self.matches(e)).collect();

        if let Some(limit) = self.limit {
            if matched.len() > limit {
                matched.drain(..matched.len() - limit);
            }
        }
        matched
    }
}
