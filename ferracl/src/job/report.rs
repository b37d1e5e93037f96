//! Operator-facing report and the optional JSON export.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use serde::Serialize;

use super::device::{DeviceResult, Outcome};
use super::validate::ValidationSummary;
use crate::error::{JobError, Result};

/// Everything a finished job produced.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub results: Vec<DeviceResult>,
    pub summary: ValidationSummary,
}

impl JobReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.failure_kind().is_some())
            .count()
    }

    /// Per-device results followed by the per-platform summary.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "FULL RESULTS");
        for result in &self.results {
            match &result.outcome {
                Outcome::Success { output } => {
                    let _ = writeln!(out, "\n{} [ok]", result.device);
                    for line in output.lines() {
                        let _ = writeln!(out, "  {line}");
                    }
                }
                Outcome::Failure { kind, error } => {
                    let _ = writeln!(out, "\n{} [failed: {}]", result.device, kind);
                    let _ = writeln!(out, "  {error}");
                }
            }
        }

        let _ = writeln!(out, "\nSUMMARY RESULTS");
        for (platform, counts) in &self.summary.per_platform {
            let marker = if self.summary.is_inconsistent(*platform) {
                "  WARNING: line counts differ"
            } else {
                ""
            };
            let _ = writeln!(out, "\n{platform}{marker}");
            for count in counts {
                let _ = writeln!(out, "  {:<40} {}", count.hostname, count.result_line_count);
            }
        }
        let _ = writeln!(
            out,
            "\n{} devices: {} succeeded, {} failed",
            self.results.len(),
            self.succeeded(),
            self.failed()
        );

        out
    }

    /// Write the report as pretty JSON into `dir`, returning the file path.
    pub fn export(&self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
        let path = dir.join(export_file_name(now));
        let json = serde_json::to_string_pretty(self).map_err(|e| JobError::Export {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| JobError::Export {
            path: path.clone(),
            message: e.to_string(),
        })?;
        info!("results exported to {}", path.display());
        Ok(path)
    }
}

/// `acl-results-<local timestamp>.json`, safe on every filesystem.
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("acl-results-{}.json", now.format("%Y-%m-%dT%H-%M-%S"))
}
