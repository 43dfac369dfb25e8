use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, error};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: u64,
    pub todo: String,
    pub done: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct NewTodo {
    pub todo: String,
    #[serde(default)]
    pub done: bool,
}

/// Replaces both fields; a missing `todo` becomes `""`, a missing `done` false.
#[derive(Deserialize)]
pub struct UpdateTodo {
    pub todo: Option<String>,
    pub done: Option<bool>,
}

/// Fault switches for exercising client error paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockOptions {
    /// Drop `id` from the create response.
    pub omit_create_id: bool,
    /// Answer `GET /todos` with a body that is not JSON.
    pub plain_text_list: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
}

#[derive(Clone, Default)]
pub struct MockState {
    todos: Arc<RwLock<BTreeMap<u64, Todo>>>,
    next_id: Arc<AtomicU64>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
    options: MockOptions,
}

impl MockState {
    pub fn new(options: MockOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, method: &str, path: &str) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method: method.to_string(),
                path: path.to_string(),
            });
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub fn app() -> Router {
    router(MockState::default())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// A mock bound to a random local port, served from a background thread.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
}

impl MockServer {
    pub fn start(options: MockOptions) -> std::io::Result<Self> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let state = MockState::new(options);
        let app = router(state.clone());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        std::thread::spawn(move || {
            let served = runtime.block_on(async {
                let listener = TcpListener::from_std(std_listener)?;
                axum::serve(listener, app).await
            });
            if let Err(e) = served {
                error!(error = %e, "mock server stopped");
            }
        });

        Ok(Self { addr, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }
}

async fn record_request(State(state): State<MockState>, request: Request, next: Next) -> Response {
    debug!(method = %request.method(), path = %request.uri().path(), "request");
    state.record(request.method().as_str(), request.uri().path());
    next.run(request).await
}

async fn list_todos(State(state): State<MockState>) -> Response {
    if state.options.plain_text_list {
        return (StatusCode::OK, "todos unavailable").into_response();
    }
    let todos = state.todos.read().await;
    Json(todos.values().cloned().collect::<Vec<_>>()).into_response()
}

async fn create_todo(State(state): State<MockState>, Json(input): Json<NewTodo>) -> Response {
    let todo = Todo {
        id: state.allocate_id(),
        todo: input.todo,
        done: input.done,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    state.todos.write().await.insert(todo.id, todo.clone());

    if !state.options.omit_create_id {
        return Json(todo).into_response();
    }
    match serde_json::to_value(&todo) {
        Ok(mut body) => {
            if let Some(fields) = body.as_object_mut() {
                fields.remove("id");
            }
            Json(body).into_response()
        }
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn get_todo(
    State(state): State<MockState>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, StatusCode> {
    let todos = state.todos.read().await;
    todos.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_todo(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut todos = state.todos.write().await;
    let todo = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    todo.todo = input.todo.unwrap_or_default();
    todo.done = input.done.unwrap_or(false);
    todo.updated_at = Some(Utc::now());
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(state): State<MockState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let mut todos = state.todos.write().await;
    todos.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo {
            id: 1,
            todo: "Test".to_string(),
            done: false,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["todo"], "Test");
        assert_eq!(json["done"], false);
        assert!(json["updated_at"].is_null());
    }

    #[test]
    fn new_todo_defaults_done_to_false() {
        let input: NewTodo = serde_json::from_str(r#"{"todo":"No done field"}"#).unwrap();
        assert_eq!(input.todo, "No done field");
        assert!(!input.done);
    }

    #[test]
    fn new_todo_rejects_missing_todo() {
        let result: Result<NewTodo, _> = serde_json::from_str(r#"{"done":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.todo.is_none());
        assert!(input.done.is_none());
    }

    #[test]
    fn ids_increment_from_one() {
        let state = MockState::default();
        assert_eq!(state.allocate_id(), 1);
        assert_eq!(state.allocate_id(), 2);
    }

    #[test]
    fn request_log_keeps_order() {
        let state = MockState::default();
        state.record("GET", "/todos");
        state.record("POST", "/todos");
        let methods: Vec<String> = state.requests().into_iter().map(|r| r.method).collect();
        assert_eq!(methods, vec!["GET", "POST"]);
    }
}
