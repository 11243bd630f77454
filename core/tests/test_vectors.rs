//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use notes_core::{
    ApiError, Credentials, ErrorKind, HttpMethod, HttpResponse, MemorySessionStore, Note, NotesClient,
    SessionStore,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> NotesClient<MemorySessionStore> {
    NotesClient::new(BASE_URL, MemorySessionStore::new())
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

/// Build the simulated `HttpResponse` of a vector case.
fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    let headers = match sim["content_type"].as_str() {
        Some(ct) => vec![("content-type".to_string(), ct.to_string())],
        None => Vec::new(),
    };
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Compare an error against `{"kind", "status", "message"}`.
fn assert_error(name: &str, err: &ApiError, expected: &Value) {
    let kind = match expected["kind"].as_str().unwrap() {
        "Auth" => ErrorKind::Auth,
        "Request" => ErrorKind::Request,
        other => panic!("{name}: unknown expected kind: {other}"),
    };
    assert_eq!(err.kind(), kind, "{name}: kind");
    assert_eq!(err.status(), expected["status"].as_u64().map(|s| s as u16), "{name}: status");
    assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let raw = include_str!("../../test-vectors/login.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = client();
        let input: Credentials = serde_json::from_value(case["input"].clone()).unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_login(&input).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(req_body, expected_req["body"], "{name}: body");

        // Verify parse
        let result = c.parse_login(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error);
            assert_eq!(c.session().get(), None, "{name}: no token after failure");
        } else {
            result.unwrap();
            let expected_token = case["expected_token"].as_str().map(str::to_string);
            assert_eq!(c.session().get(), expected_token, "{name}: stored token");
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_list_notes();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let result = c.parse_list_notes(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected_error);
        } else {
            let notes = result.unwrap();
            let expected: Vec<Note> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(notes, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    let raw = include_str!("../../test-vectors/errors.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let headers = match case["content_type"].as_str() {
            Some(ct) => vec![("content-type".to_string(), ct.to_string())],
            None => Vec::new(),
        };
        let response = HttpResponse {
            status,
            headers,
            body: case["body"].as_str().unwrap().to_string(),
        };

        let err = c.parse_delete_note(response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request, "{name}: kind");
        assert_eq!(err.status(), Some(status), "{name}: status");
        assert_eq!(err.to_string(), case["expected_message"].as_str().unwrap(), "{name}: message");
    }
}
