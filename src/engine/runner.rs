use crate::config::RunConfig;
use crate::domain::{
    Expectation, RequestDescriptor, RunOutput, RunSummary, TRANSPORT_FAILURE_STATUS, TestCase,
    TestResult,
};
use crate::engine::evaluate::evaluate_repeat;
use crate::engine::http::{OutboundRequest, Transport};
use crate::engine::mask::mask_headers;
use crate::engine::rules::generate_test_cases;
use log::{debug, info, warn};
use std::time::Instant;

pub const PREVIEW_LIMIT: usize = 800;
const ELLIPSIS: &str = "...";

/// Observation from one dispatch.
#[derive(Debug, Clone)]
struct Dispatch {
    status: i32,
    elapsed_ms: u64,
    preview: String,
}

/// Cut `text` to `limit` characters, marking the cut with `...`.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => format!("{}{ELLIPSIS}", &text[..byte_index]),
        None => text.to_string(),
    }
}

async fn dispatch(
    transport: &dyn Transport,
    case: &TestCase,
    verify_tls: bool,
    config: &RunConfig,
) -> Dispatch {
    let request = OutboundRequest {
        method: case.method.clone(),
        url: case.url.clone(),
        headers: case.headers.clone(),
        body: case.body.clone(),
        verify_tls,
        timeout_secs: config.timeout_secs,
    };

    let start = Instant::now();
    let result = transport.send(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            debug!(
                "{} {} -> {} ({} ms at transport)",
                case.method, case.url, response.status, response.elapsed_ms
            );
            Dispatch {
                status: i32::from(response.status),
                elapsed_ms,
                preview: truncate_preview(&response.body, PREVIEW_LIMIT),
            }
        }
        Err(err) => {
            warn!("case `{}`: {err}", case.name);
            Dispatch {
                status: TRANSPORT_FAILURE_STATUS,
                elapsed_ms,
                preview: truncate_preview(&format!("ERROR: {err}"), PREVIEW_LIMIT),
            }
        }
    }
}

/// Run one case; stability cases are dispatched twice in sequence.
pub async fn execute_case(
    transport: &dyn Transport,
    case: &TestCase,
    verify_tls: bool,
    config: &RunConfig,
) -> TestResult {
    let (status, elapsed_ms, preview, verdict) = match case.expectation {
        Expectation::StableAcrossRepeat => {
            let first = dispatch(transport, case, verify_tls, config).await;
            let second = dispatch(transport, case, verify_tls, config).await;
            let verdict = evaluate_repeat(first.status, second.status);
            let preview = if second.preview.is_empty() {
                first.preview
            } else {
                second.preview
            };
            (
                second.status,
                first.elapsed_ms + second.elapsed_ms,
                preview,
                verdict,
            )
        }
        _ => {
            let observed = dispatch(transport, case, verify_tls, config).await;
            let verdict = case.expectation.evaluate(observed.status);
            (observed.status, observed.elapsed_ms, observed.preview, verdict)
        }
    };

    info!(
        "{} {} (status={status}, {elapsed_ms} ms)",
        if verdict.ok { "PASS" } else { "FAIL" },
        case.name
    );

    TestResult {
        name: case.name.clone(),
        description: case.description.clone(),
        method: case.method.clone(),
        url: case.url.clone(),
        request_headers: mask_headers(&case.headers),
        request_body: case.body.clone(),
        status_code: status,
        elapsed_ms,
        ok: verdict.ok,
        reason: verdict.reason,
        response_preview: preview,
    }
}

/// Execute cases one at a time, in the order given.
pub async fn execute_cases(
    cases: &[TestCase],
    verify_tls: bool,
    config: &RunConfig,
    transport: &dyn Transport,
) -> Vec<TestResult> {
    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        results.push(execute_case(transport, case, verify_tls, config).await);
    }
    results
}

pub fn summarize(results: &[TestResult]) -> RunSummary {
    let passed = results.iter().filter(|result| result.ok).count();
    RunSummary {
        total: results.len(),
        passed,
        failed: results.len() - passed,
        duration_ms: results.iter().map(|result| result.elapsed_ms).sum(),
    }
}

/// Generate the battery for `descriptor`, run it and aggregate.
pub async fn run_descriptor(
    descriptor: RequestDescriptor,
    config: &RunConfig,
    transport: &dyn Transport,
) -> RunOutput {
    let cases = generate_test_cases(&descriptor);
    info!(
        "running {} cases against {} {} (timeout {}s)",
        cases.len(),
        descriptor.method,
        descriptor.url,
        config.timeout_secs
    );

    let results = execute_cases(&cases, descriptor.verify_tls, config, transport).await;
    let summary = summarize(&results);
    info!(
        "total={} passed={} failed={} duration={}ms",
        summary.total, summary.passed, summary.failed, summary.duration_ms
    );

    RunOutput {
        summary,
        descriptor,
        results,
    }
}
