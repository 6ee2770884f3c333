use crate::domain::RequestDescriptor;
use crate::error::ProbeError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;

const DATA_FLAGS: [&str; 5] = ["-d", "--data", "--data-raw", "--data-binary", "--data-ascii"];

/// Split a curl invocation into shell words. The leading `curl` is optional.
pub fn tokenize(command: &str) -> Result<Vec<String>, ProbeError> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return Err(ProbeError::MalformedInput("command is empty".into()));
    }

    let tokens = shlex::split(trimmed)
        .ok_or_else(|| ProbeError::MalformedInput("unbalanced quoting in command".into()))?;

    match tokens.first() {
        Some(first) if first.eq_ignore_ascii_case("curl") => Ok(tokens),
        _ => {
            let mut with_program = Vec::with_capacity(tokens.len() + 1);
            with_program.push("curl".to_string());
            with_program.extend(tokens);
            Ok(with_program)
        }
    }
}

/// Parse a curl command line into a descriptor.
pub fn parse_command(command: &str) -> Result<RequestDescriptor, ProbeError> {
    let tokens = tokenize(command)?;
    descriptor_from_tokens(&tokens)
}

/// Walk tokenized curl arguments (program name first) and build the descriptor.
pub fn descriptor_from_tokens(tokens: &[String]) -> Result<RequestDescriptor, ProbeError> {
    let mut method: Option<String> = None;
    let mut head_only = false;
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    let mut body: Option<String> = None;
    let mut json_body = false;
    let mut basic_credentials: Option<String> = None;
    let mut verify_tls = true;
    let mut url: Option<String> = None;

    let mut args = tokens.iter().skip(1);
    while let Some(token) = args.next() {
        let token = token.as_str();
        // Flags that consume the next token; a trailing flag has nothing to take.
        let takes_value = matches!(
            token,
            "-X" | "--request"
                | "-H"
                | "--header"
                | "--json"
                | "-u"
                | "--user"
                | "-A"
                | "--user-agent"
                | "-b"
                | "--cookie"
                | "-e"
                | "--referer"
                | "--url"
        ) || DATA_FLAGS.contains(&token);

        if takes_value {
            let Some(value) = args.next() else {
                continue;
            };
            match token {
                "-X" | "--request" => method = Some(value.trim().to_uppercase()),
                "-H" | "--header" => {
                    if let Some((key, value)) = split_header(value) {
                        headers.insert(key, value);
                    }
                }
                "--json" => {
                    body = Some(value.clone());
                    json_body = true;
                }
                "-u" | "--user" => basic_credentials = Some(value.clone()),
                "-A" | "--user-agent" => {
                    headers.insert("User-Agent".into(), value.clone());
                }
                "-b" | "--cookie" => {
                    headers.insert("Cookie".into(), value.clone());
                }
                "-e" | "--referer" => {
                    headers.insert("Referer".into(), value.clone());
                }
                "--url" => {
                    if !has_http_scheme(value) {
                        return Err(ProbeError::MalformedInput(format!(
                            "URL `{value}` must start with http:// or https://"
                        )));
                    }
                    url = Some(value.clone());
                }
                _ => body = Some(value.clone()),
            }
            continue;
        }

        match token {
            "-k" | "--insecure" => verify_tls = false,
            "-I" | "--head" => head_only = true,
            other if has_http_scheme(other) => url = Some(other.to_string()),
            _ => {}
        }
    }

    let url = url.ok_or_else(|| ProbeError::MalformedInput("no URL found in command".into()))?;

    if json_body {
        insert_if_absent(&mut headers, "Content-Type", "application/json");
        insert_if_absent(&mut headers, "Accept", "application/json");
    }

    if let Some(credentials) = basic_credentials {
        let encoded = STANDARD.encode(credentials.as_bytes());
        insert_if_absent(&mut headers, "Authorization", &format!("Basic {encoded}"));
    }

    let method = match method {
        Some(method) if !method.is_empty() => method,
        _ if head_only => "HEAD".to_string(),
        _ if body.is_some() => "POST".to_string(),
        _ => "GET".to_string(),
    };

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
        verify_tls,
    })
}

fn split_header(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn insert_if_absent(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    if !headers.keys().any(|key| key.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_string(), value.to_string());
    }
}
