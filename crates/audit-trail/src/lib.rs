//! Audit Trail
//!
//! A structured, append-only record of the actions taken by agents.
//!
//! ## Features
//!
//! - **Append-only**: entries are written as JSON Lines and never rewritten
//! - **Tamper-evident**: each entry carries the hash of its predecessor
//! - **Traceable**: inputs are hashed for deduplication and correlation
//! - **Queryable**: filter by agent, action type, time window and notes
//!
//! ## Example
//!
//! ```rust,no_run
//! use audit_trail::{AuditQuery, AuditTrail};
//! use serde_json::json;
//!
//! let trail = AuditTrail::open("audit_log.jsonl").unwrap();
//! trail
//!     .log_action(
//!         "DataQualityValidator",
//!         "validation",
//!         Some(json!({"dataset": "heart_disease_uci.csv"})),
//!         Some(json!({"severity": "HIGH"})),
//!         Some("Initial data validation"),
//!     )
//!     .unwrap();
//!
//! let validations = trail.query(&AuditQuery::new().action("validation")).unwrap();
//! assert!(!validations.is_empty());
//! ```

pub mod entry;
pub mod error;
pub mod query;
pub mod store;

pub use entry::{hash_value, AuditEntry, NewEntry, ReasoningStep};
pub use error::{AuditError, Result};
pub use query::AuditQuery;
pub use store::{read_entries, verify_path, AuditTrail, VerificationReport};
