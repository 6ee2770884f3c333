use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status recorded when a dispatch never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

// ─── Request Types ────────────────────────────────────────────────────────────

/// Normalized snapshot of the example request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

impl RequestDescriptor {
    /// Header value by name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }
}

// ─── Test Case Types ──────────────────────────────────────────────────────────

/// Pass/fail predicate attached to a generated case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    AcceptAny,
    StatusIn(Vec<i32>),
    NotSuccess2xx,
    Is4xx,
    /// Same predicate as `Is4xx`; reported as "4xx/415".
    Is4xxOr415,
    NotServerError5xx,
    /// Decided by the runner from two consecutive dispatches.
    StableAcrossRepeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub description: String,
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub expectation: Expectation,
}

/// Outcome of judging one observed status against an expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    pub reason: String,
}

// ─── Result Types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    pub description: String,
    pub method: String,
    pub url: String,
    pub request_headers: BTreeMap<String, String>,
    pub request_body: Option<String>,
    pub status_code: i32,
    pub elapsed_ms: u64,
    pub ok: bool,
    pub reason: String,
    pub response_preview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Everything a report renderer needs from a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub summary: RunSummary,
    pub descriptor: RequestDescriptor,
    pub results: Vec<TestResult>,
}
