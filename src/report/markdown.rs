use super::{body_excerpt, headers_json};
use crate::domain::RunOutput;
use std::fmt::Write;

pub fn render_markdown(output: &RunOutput) -> String {
    let summary = &output.summary;
    let mut out = String::new();

    let _ = writeln!(out, "# API Test Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Target: `{} {}`",
        output.descriptor.method, output.descriptor.url
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total: **{}** · PASS: **{}** · FAIL: **{}** · Duration: **{} ms**",
        summary.total, summary.passed, summary.failed, summary.duration_ms
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| Case | Result | Status | Time (ms) | Reason |");
    let _ = writeln!(out, "|---|---|---:|---:|---|");
    for result in &output.results {
        let badge = if result.ok { "✅ PASS" } else { "❌ FAIL" };
        let _ = writeln!(
            out,
            "| `{}` | {} | {} | {} | {} |",
            result.name,
            badge,
            result.status_code,
            result.elapsed_ms,
            result.reason.replace('|', "\\|")
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Details");
    for result in &output.results {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", result.name);
        let _ = writeln!(out, "{}", result.description);
        let _ = writeln!(out);
        let _ = writeln!(out, "**Request**:");
        let _ = writeln!(out);
        let _ = writeln!(out, "- Method: `{}`", result.method);
        let _ = writeln!(out, "- URL: `{}`", result.url);
        let _ = writeln!(out, "- Headers: `{}`", headers_json(&result.request_headers));
        if let Some(body) = &result.request_body {
            let _ = writeln!(out, "- Body: `{}`", body_excerpt(body));
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "**Response**:");
        let _ = writeln!(out);
        let _ = writeln!(out, "- Status: `{}`", result.status_code);
        let _ = writeln!(out, "- Time: `{} ms`", result.elapsed_ms);
        let _ = writeln!(out);
        let _ = writeln!(out, "```");
        let _ = writeln!(out, "{}", result.response_preview.replace('`', "\\`"));
        let _ = writeln!(out, "```");
    }

    out
}
