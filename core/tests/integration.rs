//! Full probe run against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ProbeRunner` over
//! real HTTP using a small ureq-backed `Transport`. Validates that request
//! building, response parsing and step sequencing work end-to-end.

use mock_server::{MockOptions, MockServer};
use serde_json::Value;
use todo_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, ProbeError, ProbeOutcome, ProbeRunner, Step, TodoClient,
    Transport, TransportError,
};

/// Executes requests with ureq, returning 4xx/5xx as data.
struct UreqExecutor {
    agent: ureq::Agent,
}

impl UreqExecutor {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqExecutor {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::Other(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn run_against(server: &MockServer) -> (ProbeOutcome, String) {
    let mut runner = ProbeRunner::new(TodoClient::new(&server.base_url()), UreqExecutor::new());
    let mut out = Vec::new();
    let outcome = runner.run(&mut out);
    (outcome, String::from_utf8(out).unwrap())
}

fn body(outcome: &ProbeOutcome, step: Step) -> Value {
    outcome
        .report()
        .record(step)
        .and_then(|r| r.body.clone())
        .unwrap_or_else(|| panic!("no body recorded for {step:?}"))
}

#[test]
fn happy_path_end_to_end() {
    let server = MockServer::start(MockOptions::default()).unwrap();
    let (outcome, out) = run_against(&server);

    assert!(outcome.is_completed(), "run failed: {out}");
    let report = outcome.report();
    assert_eq!(report.steps.len(), 7);

    // (a) every call succeeded
    for record in &report.steps {
        assert!((200..300).contains(&record.status), "{:?} returned {}", record.step, record.status);
    }

    // (b) read-back equals the created object
    let created = body(&outcome, Step::Create);
    assert_eq!(body(&outcome, Step::Get), created);
    assert_eq!(created["id"], 1);

    // (c) update is reflected
    let updated = body(&outcome, Step::Update);
    assert_eq!(updated["todo"], "Learn Rust with Axum");
    assert_eq!(updated["done"], true);
    assert_eq!(updated["id"], created["id"]);

    // (d) list after update contains the updated object
    let listed = body(&outcome, Step::ListAfterUpdate);
    assert!(listed.as_array().unwrap().contains(&updated));

    // (e) list after delete does not contain the deleted id
    let remaining = body(&outcome, Step::ListAfterDelete);
    assert!(remaining
        .as_array()
        .unwrap()
        .iter()
        .all(|todo| todo["id"] != created["id"]));

    assert!(out.contains("3. Getting todo 1:\n"));
    assert!(out.contains("6. Deleting todo 1:\nStatus: 204\n"));
}

#[test]
fn calls_reach_the_server_in_fixed_order() {
    let server = MockServer::start(MockOptions::default()).unwrap();
    let (outcome, _) = run_against(&server);
    assert!(outcome.is_completed());

    let seen: Vec<(String, String)> = server
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected: Vec<(String, String)> = [
        ("GET", "/todos"),
        ("POST", "/todos"),
        ("GET", "/todos/1"),
        ("PUT", "/todos/1"),
        ("GET", "/todos"),
        ("DELETE", "/todos/1"),
        ("GET", "/todos"),
    ]
    .iter()
    .map(|(m, p)| (m.to_string(), p.to_string()))
    .collect();
    assert_eq!(seen, expected);
}

#[test]
fn missing_id_never_reaches_step_three() {
    let server = MockServer::start(MockOptions {
        omit_create_id: true,
        ..MockOptions::default()
    })
    .unwrap();
    let (outcome, out) = run_against(&server);

    assert!(matches!(
        outcome,
        ProbeOutcome::Failed {
            step: Step::Create,
            error: ProbeError::Api(ApiError::MissingField("id")),
            ..
        }
    ));
    assert_eq!(server.requests().len(), 2);
    assert!(!out.contains("3. Getting todo"));
    assert!(out.ends_with("Error: response is missing field `id`\n"));
}

#[test]
fn non_json_list_is_a_generic_failure() {
    let server = MockServer::start(MockOptions {
        plain_text_list: true,
        ..MockOptions::default()
    })
    .unwrap();
    let (outcome, out) = run_against(&server);

    assert_eq!(outcome.failed_step(), Some(Step::ListInitial));
    assert!(!outcome.error().unwrap().is_connection());
    assert!(out.contains("Status: 200\nError: deserialization failed"));
}

#[test]
fn repeated_list_is_byte_identical() {
    let server = MockServer::start(MockOptions::default()).unwrap();
    let client = TodoClient::new(&server.base_url());
    let mut transport = UreqExecutor::new();

    // Seed a couple of todos so the body is not trivially empty.
    for title in ["one", "two"] {
        let req = client
            .build_create_todo(&todo_core::TodoRequest::new(title, false))
            .unwrap();
        transport.execute(req).unwrap();
    }

    let first = transport.execute(client.build_list_todos()).unwrap();
    let second = transport.execute(client.build_list_todos()).unwrap();
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);
}
