//! # ip-audit
//!
//! Finds hard-coded IPv4 literals in source trees. Loopback and the
//! unspecified address are allowed by default; VCS metadata, build output
//! and `node_modules` are never entered; binary files are skipped.

pub mod audit;
pub mod config;
pub mod error;
pub mod scanner;

pub use audit::{AuditReport, Auditor, Finding};
pub use config::{AuditConfig, AuditConfigBuilder};
pub use error::{AuditError, Result};
pub use scanner::{scan_line, Match};
