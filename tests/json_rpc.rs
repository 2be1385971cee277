mod support;

use daemon_mcp::Service;
use daemon_mcp::http::{HttpRequest, Status};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use support::{FailingSource, assert_cors, body, mock_service, post, rpc, text};

#[test]
fn options_is_a_preflight() {
    let response = mock_service().handle(&HttpRequest::new("OPTIONS", Vec::new()));
    assert_eq!(response.status, Status::NoContent);
    assert!(response.body().is_empty());
    assert_cors(&response);
}

#[test]
fn non_post_is_405() {
    let service = mock_service();
    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let response = service.handle(&HttpRequest::new(method, Vec::new()));
        assert_eq!(response.status, Status::MethodNotAllowed);
        assert_cors(&response);
        let reply = body(&response);
        assert_eq!(reply["jsonrpc"], "2.0");
        assert_eq!(reply["error"]["code"], -32600);
        assert!(reply["error"]["message"].as_str().unwrap().contains("Only POST"));
        assert_eq!(reply["id"], Value::Null);
    }
}

#[test]
fn invalid_json_is_400_parse_error() {
    let response = mock_service().handle(&HttpRequest::new("POST", "invalid json{"));
    assert_eq!(response.status, Status::BadRequest);
    assert_cors(&response);
    let reply = body(&response);
    assert_eq!(reply["error"]["code"], -32700);
    assert!(reply["error"]["message"].as_str().unwrap().contains("Invalid JSON"));
    assert_eq!(reply["id"], Value::Null);
}

#[test]
fn envelope_errors_name_the_field() {
    let service = mock_service();
    let cases = [
        (json!({"method": "tools/list", "id": 1}), "jsonrpc must be \"2.0\"", json!(1)),
        (json!({"jsonrpc": "2.0", "id": 1}), "method required", json!(1)),
        (json!({"jsonrpc": "2.0", "method": "tools/list"}), "id required", Value::Null),
    ];
    for (envelope, fragment, id) in cases {
        let response = post(&service, &envelope);
        assert_eq!(response.status, Status::BadRequest, "{envelope}");
        let reply = body(&response);
        assert_eq!(reply["error"]["code"], -32600);
        assert!(
            reply["error"]["message"].as_str().unwrap().contains(fragment),
            "{reply}"
        );
        assert_eq!(reply["id"], id);
    }
}

#[test]
fn ids_are_echoed_exactly() {
    let service = mock_service();
    for id in [json!(1), json!(0), json!("abc"), json!(""), json!(-7), json!(1.5), Value::Null] {
        let reply = body(&post(&service, &rpc("tools/list", None, id.clone())));
        assert_eq!(reply["id"], id);
        assert_eq!(reply["jsonrpc"], "2.0");
    }
}

#[test]
fn unknown_method_is_404() {
    let response = post(&mock_service(), &rpc("unknown/method", None, json!(9)));
    assert_eq!(response.status, Status::NotFound);
    assert_cors(&response);
    let reply = body(&response);
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["error"]["message"], "Method not found: unknown/method");
    assert_eq!(reply["id"], 9);
}

#[test]
fn tools_call_without_params_is_400() {
    let response = post(&mock_service(), &rpc("tools/call", None, json!(4)));
    assert_eq!(response.status, Status::BadRequest);
    let reply = body(&response);
    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"].as_str().unwrap().contains("tool name required"));
    assert_eq!(reply["id"], 4);
}

#[test]
fn tools_list_answers_with_the_catalog() {
    let response = post(&mock_service(), &rpc("tools/list", None, json!(1)));
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_cors(&response);
    let reply = body(&response);
    assert_eq!(reply["result"]["content"][0]["type"], "text");
    let tools: Value = serde_json::from_str(text(&reply)).expect("tools/list text is JSON");
    let tools = tools["tools"].as_array().expect("tools array");
    assert!(tools.len() >= 11);
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    for expected in ["get_about", "get_mission", "get_telos", "get_all", "get_section"] {
        assert!(names.contains(&expected), "{expected} missing from {names:?}");
    }
}

#[test]
fn upstream_status_failure_is_500_internal_error() {
    let service = Service::new(FailingSource {
        status: Some(503),
        ..Default::default()
    });
    let response = post(&service, &rpc("tools/list", None, json!("req-1")));
    assert_eq!(response.status, Status::InternalServerError);
    assert_cors(&response);
    let reply = body(&response);
    assert_eq!(reply["error"]["code"], -32603);
    assert_eq!(
        reply["error"]["message"],
        "Failed to load daemon data: Failed to fetch daemon.md: 503"
    );
    assert_eq!(reply["id"], "req-1");
}

#[test]
fn transport_failure_is_500_internal_error() {
    let service = Service::new(FailingSource::default());
    let response = post(&service, &rpc("tools/call", Some(json!({"name": "get_about"})), json!(2)));
    assert_eq!(response.status, Status::InternalServerError);
    let reply = body(&response);
    assert_eq!(reply["error"]["code"], -32603);
    assert!(
        reply["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to load daemon data: ")
    );
}

#[test]
fn document_is_fetched_once_per_call_and_not_for_rejections() {
    let source = FailingSource::default();
    let service = Service::new(source);
    service.handle(&HttpRequest::new("GET", Vec::new()));
    service.handle(&HttpRequest::new("POST", "{"));
    service.handle(&HttpRequest::new("OPTIONS", Vec::new()));
    post(&service, &rpc("tools/list", None, json!(1)));
    post(&service, &rpc("tools/list", None, json!(2)));
    assert_eq!(fetches(&service), 2);
}

fn fetches(service: &Service<FailingSource>) -> usize {
    service.source().fetches.load(Ordering::SeqCst)
}
