mod html;
mod markdown;

pub use html::render_html;
pub use markdown::render_markdown;

use crate::domain::RunOutput;
use crate::engine::mask::mask_headers;
use crate::engine::runner::{PREVIEW_LIMIT, truncate_preview};
use crate::error::ProbeError;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Pretty JSON of the run, with secrets in the echoed descriptor masked.
pub fn to_json(output: &RunOutput) -> Result<String, ProbeError> {
    let mut redacted = output.clone();
    redacted.descriptor.headers = mask_headers(&output.descriptor.headers);
    Ok(serde_json::to_string_pretty(&redacted)?)
}

/// Write `<prefix>.json`, `<prefix>.md` and `<prefix>.html`; returns the paths written.
pub fn write_reports(output: &RunOutput, prefix: &str) -> Result<Vec<PathBuf>, ProbeError> {
    let reports = [
        ("json", to_json(output)?),
        ("md", render_markdown(output)),
        ("html", render_html(output)),
    ];

    let mut written = Vec::with_capacity(reports.len());
    for (extension, contents) in reports {
        let path = PathBuf::from(format!("{prefix}.{extension}"));
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}

fn body_excerpt(body: &str) -> String {
    truncate_preview(body, PREVIEW_LIMIT)
}

fn headers_json(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string(headers).unwrap_or_default()
}
