use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::report::types::{Attachment, LogEntry};

/// Test case execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

/// State for a single test case
#[derive(Debug, Clone)]
pub struct CaseState {
    pub name: String,
    pub class_name: String,
    pub status: CaseStatus,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub logs: Vec<LogEntry>,
    pub attachments: Vec<Attachment>,
}

impl CaseState {
    pub fn new(name: &str, class_name: &str) -> Self {
        Self {
            name: name.to_string(),
            class_name: class_name.to_string(),
            status: CaseStatus::Pending,
            started_at: None,
            duration_ms: None,
            logs: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = CaseStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(CaseStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(CaseStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = CaseStatus::Skipped { reason };
    }

    fn finish(&mut self, status: CaseStatus) {
        self.status = status;
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            CaseStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> CaseReport {
        CaseReport {
            name: self.name.clone(),
            class_name: self.class_name.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
            logs: self.logs.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub name: String,
    pub class_name: String,
    pub status: CaseStatus,
    pub duration_ms: Option<u64>,
    pub logs: Vec<LogEntry>,
    pub attachments: Vec<Attachment>,
}

impl CaseReport {
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            CaseStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// State for one suite run
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub run_id: String,
    pub environment: String,
    pub cases: Vec<CaseState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SuiteState {
    pub fn new(run_id: &str, environment: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            environment: environment.to_string(),
            cases: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_case(&mut self, case: CaseState) {
        self.cases.push(case);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for case in &self.cases {
            match case.status {
                CaseStatus::Passed => passed += 1,
                CaseStatus::Failed { .. } => failed += 1,
                CaseStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            run_id: self.run_id.clone(),
            total: self.cases.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.cases
            .iter()
            .all(|c| !matches!(c.status, CaseStatus::Failed { .. }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub run_id: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}
