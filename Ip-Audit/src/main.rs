//! ```bash
//! ip-audit                      # audit the current directory
//! ip-audit src deploy --allow 10.0.0.5
//! ```
//!
//! Exit status: 0 when clean, 1 when any literal is found, 2 on a usage or
//! I/O error.

use anyhow::{Context, Result};
use clap::Parser;
use ip_audit::{AuditConfig, Auditor};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ip-audit")]
#[command(about = "Report hard-coded IPv4 literals", long_about = None)]
struct Cli {
    /// Files or directories to scan.
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Additional address to allow (repeatable).
    #[arg(long, value_name = "ADDR")]
    allow: Vec<Ipv4Addr>,

    /// Additional directory name to skip (repeatable).
    #[arg(long, value_name = "NAME")]
    skip_dir: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("ip-audit: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the scanned paths are clean.
fn run(cli: Cli) -> Result<bool> {
    let mut builder = AuditConfig::builder();
    for addr in cli.allow {
        builder = builder.with_allow(addr);
    }
    for name in cli.skip_dir {
        builder = builder.with_skip_dir(name);
    }

    let report = Auditor::new(builder.build())
        .run(&cli.paths)
        .context("Audit aborted")?;

    for finding in &report.findings {
        println!("{}", finding);
    }
    if report.is_clean() {
        eprintln!("No hard-coded IP addresses found");
    } else {
        eprintln!("{} hard-coded IP address(es) found", report.findings.len());
    }
    Ok(report.is_clean())
}
