use super::{body_excerpt, headers_json};
use crate::domain::RunOutput;
use std::fmt::Write;

const STYLE: &str = "body { font-family: system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Helvetica,Arial,sans-serif; margin: 24px; }
    table { border-collapse: collapse; width: 100%; }
    th, td { border-bottom: 1px solid #eee; padding: 8px 10px; text-align: left; }
    th { background: #fafafa; }
    code { background: #f5f5f7; padding: 2px 6px; border-radius: 6px; }
    section { margin: 16px 0; padding: 12px; border: 1px solid #eee; border-radius: 10px; }
    pre { white-space: pre-wrap; background: #fafafa; border: 1px solid #eee; padding: 10px; border-radius: 8px; max-height: 400px; overflow: auto; }
    .pass { color: #0a0; }
    .fail { color: #c00; }";

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_html(output: &RunOutput) -> String {
    let summary = &output.summary;

    let mut rows = String::new();
    for result in &output.results {
        let badge = if result.ok {
            "<span class='pass'>PASS</span>"
        } else {
            "<span class='fail'>FAIL</span>"
        };
        let _ = write!(
            rows,
            "<tr><td><code>{}</code></td><td>{badge}</td><td style='text-align:right'>{}</td><td style='text-align:right'>{}</td><td>{}</td></tr>",
            escape(&result.name),
            result.status_code,
            result.elapsed_ms,
            escape(&result.reason)
        );
    }

    let mut details = String::new();
    for result in &output.results {
        let body = result
            .request_body
            .as_deref()
            .map(|body| format!("<div>Body: <code>{}</code></div>", escape(&body_excerpt(body))))
            .unwrap_or_default();
        let _ = write!(
            details,
            "<section><h3>{name}</h3><p>{description}</p>\
             <div><b>Request</b></div>\
             <div>Method: <code>{method}</code></div>\
             <div>URL: <code>{url}</code></div>\
             <div>Headers: <code>{headers}</code></div>{body}\
             <div><b>Response</b></div>\
             <div>Status: <code>{status}</code></div>\
             <div>Time: <code>{elapsed} ms</code></div>\
             <pre>{preview}</pre></section>",
            name = escape(&result.name),
            description = escape(&result.description),
            method = escape(&result.method),
            url = escape(&result.url),
            headers = escape(&headers_json(&result.request_headers)),
            status = result.status_code,
            elapsed = result.elapsed_ms,
            preview = escape(&result.response_preview),
        );
    }

    format!(
        "<!doctype html>
<html lang=\"en\">
<head>
  <meta charset=\"utf-8\" />
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />
  <title>API Test Report</title>
  <style>
    {STYLE}
  </style>
</head>
<body>
  <h1>API Test Report</h1>
  <p>Target: <code>{method} {url}</code></p>
  <p>Total: <b>{total}</b> · PASS: <b class='pass'>{passed}</b> · FAIL: <b class='fail'>{failed}</b> · Duration: <b>{duration} ms</b></p>
  <table>
    <thead>
      <tr><th>Case</th><th>Result</th><th style='text-align:right'>Status</th><th style='text-align:right'>Time (ms)</th><th>Reason</th></tr>
    </thead>
    <tbody>
      {rows}
    </tbody>
  </table>
  <h2>Details</h2>
  {details}
</body>
</html>
",
        method = escape(&output.descriptor.method),
        url = escape(&output.descriptor.url),
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        duration = summary.duration_ms,
    )
}
