use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::scanner::scan_line;

/// A disallowed IPv4 literal at a known location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: PathBuf,
    /// 1-based.
    pub line: usize,
    /// 1-based.
    pub column: usize,
    pub addr: Ipv4Addr,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.addr
        )
    }
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub findings: Vec<Finding>,
    pub files_scanned: usize,
    /// Files that were not valid UTF-8 text.
    pub files_skipped: usize,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Scans files and directory trees for IPv4 literals outside the allow-list.
///
/// # Example
///
/// ```no_run
/// use ip_audit::{AuditConfig, Auditor};
///
/// let report = Auditor::new(AuditConfig::default()).run(&["."]).unwrap();
/// for finding in &report.findings {
///     println!("{}", finding);
/// }
/// ```
pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit every path. Directories are walked recursively; skipped
    /// directory names are honoured only below the given roots.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<AuditReport> {
        let mut report = AuditReport::default();
        for root in paths {
            let walker = WalkDir::new(root.as_ref())
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !self.is_skipped(e));
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() {
                    self.scan_file(entry.path(), &mut report)?;
                }
            }
        }
        tracing::info!(
            scanned = report.files_scanned,
            skipped = report.files_skipped,
            findings = report.findings.len(),
            "audit finished"
        );
        Ok(report)
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.config.is_skipped_dir(name))
    }

    fn scan_file(&self, path: &Path, report: &mut AuditReport) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) if !text.contains('\0') => text,
            _ => {
                tracing::debug!(path = %path.display(), "skipping non-text file");
                report.files_skipped += 1;
                return Ok(());
            }
        };

        report.files_scanned += 1;
        report.findings.extend(self.scan_text(path, &text));
        Ok(())
    }

    /// Findings in `text`, reported against `path`.
    pub fn scan_text(&self, path: &Path, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            for m in scan_line(line) {
                if self.config.is_allowed(&m.addr) {
                    continue;
                }
                findings.push(Finding {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    column: m.column,
                    addr: m.addr,
                });
            }
        }
        findings
    }
}
