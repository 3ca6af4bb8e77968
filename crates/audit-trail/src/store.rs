//! Append-only JSON Lines store
//!
//! Each entry occupies exactly one line of the log file. The file is only
//! ever opened in append mode for writes; existing lines are never
//! rewritten. On open, the store scans the file once to recover the tail of
//! the hash chain so that new entries link to the last stored one.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::entry::{AuditEntry, NewEntry};
use crate::error::{AuditError, Result};
use crate::query::AuditQuery;

/// Position of the last entry in the chain
#[derive(Debug, Default)]
struct ChainTail {
    sequence: u64,
    hash: Option<String>,
}

/// Outcome of a full-chain verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Number of entries that were checked before stopping
    pub entries_checked: u64,

    /// Whether the whole chain is intact
    pub valid: bool,

    /// First line (1-based) at which the chain breaks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at_line: Option<usize>,

    /// Why the chain is broken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationReport {
    fn intact(entries_checked: u64) -> Self {
        Self {
            entries_checked,
            valid: true,
            broken_at_line: None,
            reason: None,
        }
    }

    fn broken(entries_checked: u64, line: usize, reason: impl Into<String>) -> Self {
        Self {
            entries_checked,
            valid: false,
            broken_at_line: Some(line),
            reason: Some(reason.into()),
        }
    }
}

/// Append-only audit trail backed by a JSON Lines file
#[derive(Debug)]
pub struct AuditTrail {
    path: PathBuf,
    tail: Mutex<ChainTail>,
}

impl AuditTrail {
    /// Default log file name
    pub const DEFAULT_PATH: &'static str = "audit_log.jsonl";

    /// Open the trail at `path`, creating an empty log if it does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tail = if path.exists() {
            let entries = read_entries(&path)?;
            terminate_last_line(&path)?;
            match entries.last() {
                Some(last) => ChainTail {
                    sequence: last.sequence,
                    hash: Some(last.entry_hash.clone()),
                },
                None => ChainTail::default(),
            }
        } else {
            File::create(&path)?;
            tracing::debug!(path = %path.display(), "Created audit log");
            ChainTail::default()
        };

        tracing::debug!(
            path = %path.display(),
            last_sequence = tail.sequence,
            "Opened audit trail"
        );

        Ok(Self {
            path,
            tail: Mutex::new(tail),
        })
    }

    /// Path of the backing log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far
    pub fn len(&self) -> u64 {
        self.lock_tail().sequence
    }

    /// Whether the trail holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log an agent's action
    pub fn log_action(
        &self,
        agent_name: &str,
        action_type: &str,
        inputs: Option<serde_json::Value>,
        outputs: Option<serde_json::Value>,
        notes: Option<&str>,
    ) -> Result<AuditEntry> {
        let mut entry = NewEntry::new(agent_name, action_type)
            .with_inputs(inputs.unwrap_or(serde_json::Value::Null))
            .with_outputs(outputs.unwrap_or(serde_json::Value::Null));
        if let Some(notes) = notes {
            entry = entry.with_notes(notes);
        }
        self.record(entry)
    }

    /// Seal and append a fully specified entry
    pub fn record(&self, entry: NewEntry) -> Result<AuditEntry> {
        let mut tail = self.lock_tail();

        let sealed = AuditEntry::seal(entry, tail.sequence + 1, tail.hash.clone(), Utc::now())?;

        let mut line = serde_json::to_string(&sealed)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        append_line(&mut file, line.as_bytes())?;
        file.sync_data()?;

        tail.sequence = sealed.sequence;
        tail.hash = Some(sealed.entry_hash.clone());

        tracing::info!(
            sequence = sealed.sequence,
            agent = %sealed.agent_name,
            action = %sealed.action_type,
            "Appended audit entry"
        );

        Ok(sealed)
    }

    /// All entries in chronological order
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        read_entries(&self.path)
    }

    /// Entries for a specific agent and/or action type
    pub fn query_logs(
        &self,
        agent_name: Option<&str>,
        action_type: Option<&str>,
    ) -> Result<Vec<AuditEntry>> {
        let mut query = AuditQuery::new();
        if let Some(agent) = agent_name {
            query = query.agent(agent);
        }
        if let Some(action) = action_type {
            query = query.action(action);
        }
        self.query(&query)
    }

    /// Entries matching an arbitrary query
    pub fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
        Ok(query.apply(self.entries()?))
    }

    /// Verify the hash chain of this trail
    pub fn verify(&self) -> Result<VerificationReport> {
        let _guard = self.lock_tail();
        verify_path(&self.path)
    }

    fn lock_tail(&self) -> MutexGuard<'_, ChainTail> {
        self.tail.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Destination of appended log lines that can be cut back to a known length
trait LogSink: Write {
    fn end_offset(&mut self) -> std::io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> std::io::Result<()>;
}

impl LogSink for File {
    fn end_offset(&mut self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
}

/// Append a full line, cutting the sink back to its old length on failure
fn append_line<S: LogSink>(sink: &mut S, line: &[u8]) -> std::io::Result<()> {
    let start = sink.end_offset()?;
    let written = sink.write_all(line).and_then(|_| sink.flush());
    if let Err(e) = written {
        if let Err(rollback) = sink.truncate_to(start) {
            tracing::error!(
                error = %rollback,
                offset = start,
                "Failed to roll back partial audit entry"
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Make sure the next append starts on a fresh line
fn terminate_last_line(path: &Path) -> Result<()> {
    let mut file = OpenOptions::new().read(true).append(true).open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        tracing::warn!(path = %path.display(), "Audit log missing final newline, terminating last line");
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(())
}

/// Read every entry from a log file
pub fn read_entries(path: &Path) -> Result<Vec<AuditEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuditEntry =
            serde_json::from_str(&line).map_err(|e| AuditError::Corrupted {
                line: index + 1,
                reason: e.to_string(),
            })?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Verify a log file without opening it for writes
///
/// Unparseable lines are reported as a broken chain rather than an error,
/// so a damaged log can still be inspected.
pub fn verify_path(path: &Path) -> Result<VerificationReport> {
    let reader = BufReader::new(File::open(path)?);
    let mut expected_sequence = 1u64;
    let mut prev_hash: Option<String> = None;
    let mut checked = 0u64;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry: AuditEntry = match serde_json::from_str(&line) {
            Ok(entry) => entry,
            Err(e) => {
                return Ok(VerificationReport::broken(
                    checked,
                    line_no,
                    format!("unparseable entry: {}", e),
                ))
            }
        };

        if entry.sequence != expected_sequence {
            return Ok(VerificationReport::broken(
                checked,
                line_no,
                format!(
                    "expected sequence {} but found {}",
                    expected_sequence, entry.sequence
                ),
            ));
        }
        if entry.prev_hash != prev_hash {
            return Ok(VerificationReport::broken(
                checked,
                line_no,
                "previous hash does not match the preceding entry",
            ));
        }
        if !entry.hash_is_valid() {
            return Ok(VerificationReport::broken(
                checked,
                line_no,
                "entry contents do not match its hash",
            ));
        }

        checked += 1;
        expected_sequence += 1;
        prev_hash = Some(entry.entry_hash);
    }

    Ok(VerificationReport::intact(checked))
}
