use crate::domain::{Expectation, RequestDescriptor, TestCase};
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

const CONTENT_TYPE_JSON: &str = "application/json";
const LONG_STRING_LEN: usize = 2000;
const SQLI_PAYLOAD: &str = "' OR '1'='1";
const NOT_A_NUMBER: &str = "not-a-number";
const NUMERIC_LITERAL: i64 = 12345;

static PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)(?:/|$)").expect("path id pattern is valid"));

/// A mutation rule: emits at most one case for a descriptor.
pub type Rule = fn(&RequestDescriptor) -> Option<TestCase>;

/// Every rule, in emission order.
pub const CATALOGUE: [Rule; 13] = [
    baseline,
    missing_auth,
    wrong_method,
    missing_field,
    invalid_type,
    too_long_string,
    sqli_probe,
    path_id_variant,
    wrong_content_type,
    replay_same_request,
    empty_body,
    malformed_json,
    wrong_accept_header,
];

/// Derive the full battery of cases for one example request.
pub fn generate_test_cases(descriptor: &RequestDescriptor) -> Vec<TestCase> {
    let cases: Vec<TestCase> = CATALOGUE.iter().filter_map(|rule| rule(descriptor)).collect();
    debug!(
        "generated {} cases for {} {}",
        cases.len(),
        descriptor.method,
        descriptor.url
    );
    cases
}

fn derive(
    descriptor: &RequestDescriptor,
    name: &str,
    description: impl Into<String>,
    expectation: Expectation,
) -> TestCase {
    TestCase {
        name: name.to_string(),
        description: description.into(),
        method: descriptor.method.clone(),
        url: descriptor.url.clone(),
        headers: descriptor.headers.clone(),
        body: descriptor.body.clone(),
        expectation,
    }
}

// ─── Rules ────────────────────────────────────────────────────────────────────

pub fn baseline(descriptor: &RequestDescriptor) -> Option<TestCase> {
    Some(derive(
        descriptor,
        "baseline",
        "Send the request exactly as given.",
        Expectation::AcceptAny,
    ))
}

pub fn missing_auth(descriptor: &RequestDescriptor) -> Option<TestCase> {
    if !descriptor.has_header("Authorization") {
        return None;
    }
    let mut case = derive(
        descriptor,
        "missing_auth",
        "Drop the Authorization header; expect 401/403.",
        Expectation::StatusIn(vec![401, 403]),
    );
    case.headers
        .retain(|key, _| !key.eq_ignore_ascii_case("Authorization"));
    Some(case)
}

pub fn wrong_method(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let alternative = if descriptor.method == "GET" { "POST" } else { "GET" };
    let mut case = derive(
        descriptor,
        "wrong_method",
        format!(
            "Use {alternative} instead of {}; expect a non-2xx status.",
            descriptor.method
        ),
        Expectation::NotSuccess2xx,
    );
    case.method = alternative.to_string();
    if !carries_body(alternative) {
        case.body = None;
    }
    Some(case)
}

pub fn missing_field(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let mut object = json_object(descriptor)?;
    let key = object.keys().next()?.clone();
    object.shift_remove(&key);

    let mut case = derive(
        descriptor,
        "missing_field",
        format!("Remove JSON field '{key}'; expect 4xx."),
        Expectation::Is4xx,
    );
    case.body = Some(Value::Object(object).to_string());
    Some(case)
}

pub fn invalid_type(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let mut object = json_object(descriptor)?;
    let (key, value) = object.iter_mut().next()?;
    let key = key.clone();
    *value = if value.is_number() {
        Value::from(NOT_A_NUMBER)
    } else {
        Value::from(NUMERIC_LITERAL)
    };

    let mut case = derive(
        descriptor,
        "invalid_type",
        format!("Change the type of JSON field '{key}'; expect 4xx."),
        Expectation::Is4xx,
    );
    case.body = Some(Value::Object(object).to_string());
    Some(case)
}

pub fn too_long_string(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let (key, body) = replace_first_string(descriptor, "A".repeat(LONG_STRING_LEN))?;
    let mut case = derive(
        descriptor,
        "too_long_string",
        format!("Stretch JSON field '{key}' to {LONG_STRING_LEN} characters; expect 4xx."),
        Expectation::Is4xx,
    );
    case.body = Some(body);
    Some(case)
}

pub fn sqli_probe(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let (key, body) = replace_first_string(descriptor, SQLI_PAYLOAD.to_string())?;
    let mut case = derive(
        descriptor,
        "sqli_probe",
        format!("Inject a basic SQL payload into JSON field '{key}'; expect no 5xx."),
        Expectation::NotServerError5xx,
    );
    case.body = Some(body);
    Some(case)
}

pub fn path_id_variant(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let (url, old, new) = substitute_path_id(&descriptor.url)?;
    let mut case = derive(
        descriptor,
        "path_id_variant",
        format!("Replace path id {old} with {new}; expect 400/401/403/404."),
        Expectation::StatusIn(vec![400, 401, 403, 404]),
    );
    case.url = url;
    Some(case)
}

pub fn wrong_content_type(descriptor: &RequestDescriptor) -> Option<TestCase> {
    if !is_json_like(descriptor) {
        return None;
    }
    let mut case = derive(
        descriptor,
        "wrong_content_type",
        "Send the JSON body as text/plain; expect 4xx/415.",
        Expectation::Is4xxOr415,
    );
    set_header(&mut case.headers, "Content-Type", "text/plain");
    Some(case)
}

pub fn replay_same_request(descriptor: &RequestDescriptor) -> Option<TestCase> {
    Some(derive(
        descriptor,
        "replay_same_request",
        "Send the same request twice; expect the same status both times.",
        Expectation::StableAcrossRepeat,
    ))
}

pub fn empty_body(descriptor: &RequestDescriptor) -> Option<TestCase> {
    if !carries_body(&descriptor.method) || descriptor.body.is_none() {
        return None;
    }
    let mut case = derive(
        descriptor,
        "empty_body",
        "Send an empty body where one is expected; expect 4xx.",
        Expectation::Is4xx,
    );
    case.body = Some(String::new());
    Some(case)
}

pub fn malformed_json(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let body = descriptor.body.as_deref().filter(|body| !body.is_empty())?;
    if !is_json_like(descriptor) {
        return None;
    }
    let mut case = derive(
        descriptor,
        "malformed_json",
        "Append a stray bracket to break the JSON syntax; expect 4xx.",
        Expectation::Is4xx,
    );
    set_header(&mut case.headers, "Content-Type", CONTENT_TYPE_JSON);
    case.body = Some(format!("{}]", body.trim_end()));
    Some(case)
}

pub fn wrong_accept_header(descriptor: &RequestDescriptor) -> Option<TestCase> {
    let mut case = derive(
        descriptor,
        "wrong_accept_header",
        "Ask for application/xml; expect no 5xx.",
        Expectation::NotServerError5xx,
    );
    set_header(&mut case.headers, "Accept", "application/xml");
    Some(case)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn carries_body(method: &str) -> bool {
    matches!(method, "POST" | "PUT" | "PATCH")
}

/// Declared JSON content type, or no declared type and a bracket-delimited body.
pub fn is_json_like(descriptor: &RequestDescriptor) -> bool {
    if let Some(content_type) = descriptor.header("Content-Type") {
        return content_type.to_ascii_lowercase().contains(CONTENT_TYPE_JSON);
    }
    match descriptor.body.as_deref().map(str::trim) {
        Some(body) => {
            (body.starts_with('{') && body.ends_with('}'))
                || (body.starts_with('[') && body.ends_with(']'))
        }
        None => false,
    }
}

/// Body parsed as a non-empty JSON object, keys in document order.
fn json_object(descriptor: &RequestDescriptor) -> Option<Map<String, Value>> {
    let body = descriptor.body.as_deref()?;
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) if !object.is_empty() => Some(object),
        _ => None,
    }
}

fn replace_first_string(
    descriptor: &RequestDescriptor,
    replacement: String,
) -> Option<(String, String)> {
    let mut object = json_object(descriptor)?;
    let (key, value) = object.iter_mut().find(|(_, value)| value.is_string())?;
    let key = key.clone();
    *value = Value::String(replacement);
    Some((key, Value::Object(object).to_string()))
}

fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

/// Byte range of the path component (query and fragment excluded).
fn path_span(url: &str) -> (usize, usize) {
    let authority_start = url.find("://").map(|index| index + 3).unwrap_or(0);
    let rest = &url[authority_start..];
    let Some(offset) = rest.find(['/', '?', '#']) else {
        return (url.len(), url.len());
    };
    let start = authority_start + offset;
    if !url[start..].starts_with('/') {
        return (start, start);
    }
    let end = url[start..]
        .find(['?', '#'])
        .map(|index| start + index)
        .unwrap_or(url.len());
    (start, end)
}

/// Swap the first numeric path segment for an out-of-range id.
fn substitute_path_id(url: &str) -> Option<(String, String, String)> {
    let (start, end) = path_span(url);
    let path = &url[start..end];
    let id = PATH_ID.captures(path)?.get(1)?;
    let old = id.as_str();
    let new = if old == "0" || old == "1" { "9999999" } else { "-1" };

    let mut rewritten = String::with_capacity(url.len() + new.len());
    rewritten.push_str(&url[..start + id.start()]);
    rewritten.push_str(new);
    rewritten.push_str(&url[start + id.end()..]);
    Some((rewritten, old.to_string(), new.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> RequestDescriptor {
        RequestDescriptor {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.map(str::to_string),
            verify_tls: true,
        }
    }

    fn names(cases: &[TestCase]) -> Vec<&str> {
        cases.iter().map(|case| case.name.as_str()).collect()
    }

    fn find<'a>(cases: &'a [TestCase], name: &str) -> &'a TestCase {
        cases
            .iter()
            .find(|case| case.name == name)
            .unwrap_or_else(|| panic!("missing case {name}"))
    }

    fn items_post() -> RequestDescriptor {
        descriptor(
            "POST",
            "https://api.example.com/v1/items/1",
            &[("Authorization", "Bearer abc"), ("Content-Type", "application/json")],
            Some(r#"{"name":"x"}"#),
        )
    }

    #[test]
    fn test_full_catalogue_for_json_post() {
        let cases = generate_test_cases(&items_post());
        assert_eq!(
            names(&cases),
            vec![
                "baseline",
                "missing_auth",
                "wrong_method",
                "missing_field",
                "invalid_type",
                "too_long_string",
                "sqli_probe",
                "path_id_variant",
                "wrong_content_type",
                "replay_same_request",
                "empty_body",
                "malformed_json",
                "wrong_accept_header",
            ]
        );

        let missing_auth = find(&cases, "missing_auth");
        assert!(!missing_auth.headers.contains_key("Authorization"));
        assert_eq!(missing_auth.headers.get("Content-Type").unwrap(), "application/json");

        assert!(find(&cases, "path_id_variant").url.ends_with("/9999999"));
        assert_eq!(find(&cases, "missing_field").body.as_deref(), Some("{}"));
        assert_eq!(
            find(&cases, "invalid_type").body.as_deref(),
            Some(r#"{"name":12345}"#)
        );
    }

    #[test]
    fn test_plain_get_yields_only_always_on_cases() {
        let cases = generate_test_cases(&descriptor("GET", "https://example.com/status", &[], None));
        assert_eq!(
            names(&cases),
            vec!["baseline", "wrong_method", "replay_same_request", "wrong_accept_header"]
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let source = descriptor(
            "PUT",
            "https://example.com/users/42/orders/7?expand=1",
            &[("authorization", "Token t"), ("X-Trace", "1")],
            Some(r#"{"zeta":"z","alpha":2,"mid":[1,2]}"#),
        );
        let first = generate_test_cases(&source);
        let second = generate_test_cases(&source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_auth_is_case_insensitive() {
        let source = descriptor("GET", "https://example.com", &[("authorization", "Bearer x")], None);
        let case = missing_auth(&source).unwrap();
        assert!(case.headers.is_empty());
        assert_eq!(case.expectation, Expectation::StatusIn(vec![401, 403]));

        assert!(missing_auth(&descriptor("GET", "https://example.com", &[], None)).is_none());
    }

    #[test]
    fn test_wrong_method_body_handling() {
        let post = wrong_method(&items_post()).unwrap();
        assert_eq!(post.method, "GET");
        assert_eq!(post.body, None);

        let get = wrong_method(&descriptor("GET", "https://example.com", &[], Some("q=1"))).unwrap();
        assert_eq!(get.method, "POST");
        assert_eq!(get.body.as_deref(), Some("q=1"));
    }

    #[test]
    fn test_missing_field_keeps_remaining_order() {
        let source = descriptor("POST", "https://example.com", &[], Some(r#"{"b":1,"a":2,"c":3}"#));
        let case = missing_field(&source).unwrap();
        assert_eq!(case.body.as_deref(), Some(r#"{"a":2,"c":3}"#));
    }

    #[test]
    fn test_json_rules_skip_non_objects() {
        for body in [r#"[1,2]"#, "{}", "not json", r#""text""#] {
            let source = descriptor("POST", "https://example.com", &[], Some(body));
            assert!(missing_field(&source).is_none(), "{body}");
            assert!(invalid_type(&source).is_none(), "{body}");
            assert!(too_long_string(&source).is_none(), "{body}");
            assert!(sqli_probe(&source).is_none(), "{body}");
        }
    }

    #[test]
    fn test_untouched_numbers_keep_their_exact_text() {
        let wide = descriptor(
            "POST",
            "https://example.com",
            &[],
            Some(r#"{"a":"x","id":123456789012345678901234567890}"#),
        );
        assert_eq!(
            missing_field(&wide).unwrap().body.as_deref(),
            Some(r#"{"id":123456789012345678901234567890}"#)
        );

        let huge = descriptor("POST", "https://example.com", &[], Some(r#"{"a":"x","v":1e400}"#));
        assert_eq!(missing_field(&huge).unwrap().body.as_deref(), Some(r#"{"v":1e400}"#));

        let precise = descriptor(
            "POST",
            "https://example.com",
            &[],
            Some(r#"{"price":0.1000000000000000055511151231257827,"name":"n"}"#),
        );
        let long = too_long_string(&precise).unwrap();
        assert!(
            long.body
                .as_deref()
                .unwrap()
                .starts_with(r#"{"price":0.1000000000000000055511151231257827,"name":"AAAA"#)
        );
    }

    #[test]
    fn test_invalid_type_swaps_number_and_non_number() {
        let numeric = descriptor("POST", "https://example.com", &[], Some(r#"{"qty":3.5,"n":"x"}"#));
        assert_eq!(
            invalid_type(&numeric).unwrap().body.as_deref(),
            Some(r#"{"qty":"not-a-number","n":"x"}"#)
        );

        let boolean = descriptor("POST", "https://example.com", &[], Some(r#"{"flag":true}"#));
        assert_eq!(invalid_type(&boolean).unwrap().body.as_deref(), Some(r#"{"flag":12345}"#));
    }

    #[test]
    fn test_string_rules_target_first_string_field() {
        let source = descriptor(
            "POST",
            "https://example.com",
            &[],
            Some(r#"{"id":7,"title":"t","note":"n"}"#),
        );

        let long = too_long_string(&source).unwrap();
        let parsed: Value = serde_json::from_str(long.body.as_deref().unwrap()).unwrap();
        assert_eq!(parsed["title"].as_str().unwrap().len(), 2000);
        assert_eq!(parsed["note"], "n");
        assert_eq!(parsed["id"], 7);

        let sqli = sqli_probe(&source).unwrap();
        let parsed: Value = serde_json::from_str(sqli.body.as_deref().unwrap()).unwrap();
        assert_eq!(parsed["title"], "' OR '1'='1");
        assert_eq!(sqli.expectation, Expectation::NotServerError5xx);

        let no_strings = descriptor("POST", "https://example.com", &[], Some(r#"{"id":7}"#));
        assert!(too_long_string(&no_strings).is_none());
        assert!(sqli_probe(&no_strings).is_none());
    }

    #[test]
    fn test_path_id_substitution() {
        let cases = [
            ("https://h/v1/items/1", "https://h/v1/items/9999999"),
            ("https://h/v1/items/0/tags", "https://h/v1/items/9999999/tags"),
            ("https://h/users/42/orders/7", "https://h/users/-1/orders/7"),
            ("https://h/a/1/b/1", "https://h/a/9999999/b/1"),
            ("https://h/items/15?page=2", "https://h/items/-1?page=2"),
            ("http://localhost:8080/v2/12#frag", "http://localhost:8080/v2/-1#frag"),
        ];
        for (url, expected) in cases {
            let source = descriptor("GET", url, &[], None);
            let case = path_id_variant(&source).unwrap();
            assert_eq!(case.url, expected);
            assert_ne!(case.url, url);
        }
    }

    #[test]
    fn test_path_id_ignores_non_path_digits() {
        for url in [
            "https://h/v1abc/items",
            "https://h/items/12abc",
            "https://h/search?id=/12",
            "http://localhost:8080",
            "https://h/v1.2/items",
        ] {
            assert!(path_id_variant(&descriptor("GET", url, &[], None)).is_none(), "{url}");
        }
    }

    #[test]
    fn test_json_likeness() {
        let declared = descriptor(
            "POST",
            "https://example.com",
            &[("content-type", "Application/JSON; charset=utf-8")],
            Some("a=1"),
        );
        assert!(is_json_like(&declared));

        let sniffed = descriptor("POST", "https://example.com", &[], Some("  [1, 2] "));
        assert!(is_json_like(&sniffed));

        let other_type = descriptor(
            "POST",
            "https://example.com",
            &[("Content-Type", "text/plain")],
            Some(r#"{"a":1}"#),
        );
        assert!(!is_json_like(&other_type));

        assert!(!is_json_like(&descriptor("GET", "https://example.com", &[], None)));
    }

    #[test]
    fn test_wrong_content_type_replaces_existing_header() {
        let source = descriptor(
            "POST",
            "https://example.com",
            &[("content-type", "application/json")],
            Some(r#"{"a":1}"#),
        );
        let case = wrong_content_type(&source).unwrap();
        assert_eq!(case.headers.len(), 1);
        assert_eq!(case.headers.get("Content-Type").unwrap(), "text/plain");
        assert_eq!(case.body, source.body);
        assert_eq!(case.expectation, Expectation::Is4xxOr415);
    }

    #[test]
    fn test_empty_body_requires_present_body() {
        let empty = descriptor("PATCH", "https://example.com", &[], Some(""));
        assert_eq!(empty_body(&empty).unwrap().body.as_deref(), Some(""));

        assert!(empty_body(&descriptor("POST", "https://example.com", &[], None)).is_none());
        assert!(empty_body(&descriptor("DELETE", "https://example.com", &[], Some("x"))).is_none());
    }

    #[test]
    fn test_malformed_json() {
        let source = descriptor("POST", "https://example.com", &[], Some("{\"a\":1}\n  "));
        let case = malformed_json(&source).unwrap();
        assert_eq!(case.body.as_deref(), Some(r#"{"a":1}]"#));
        assert_eq!(case.headers.get("Content-Type").unwrap(), CONTENT_TYPE_JSON);

        let empty = descriptor(
            "POST",
            "https://example.com",
            &[("Content-Type", "application/json")],
            Some(""),
        );
        assert!(malformed_json(&empty).is_none());
    }

    #[test]
    fn test_wrong_accept_header() {
        let source = descriptor("GET", "https://example.com", &[("accept", "application/json")], None);
        let case = wrong_accept_header(&source).unwrap();
        assert_eq!(case.headers.len(), 1);
        assert_eq!(case.headers.get("Accept").unwrap(), "application/xml");
    }
}
