//! The sequential smoke probe: seven fixed calls against the todo API.
//!
//! # Design
//! `ProbeRunner` drives a `TodoClient` over any `Transport`, printing each
//! step's status and body to a caller-supplied writer. The run never branches
//! on response content. The first error aborts the remaining steps and is
//! returned as a `ProbeOutcome` variant rather than propagated, so callers
//! can see which step failed and everything observed before it.

use std::io::{self, Write};

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};
use crate::types::{TodoId, TodoRequest};

/// One of the seven probes, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ListInitial,
    Create,
    Get,
    Update,
    ListAfterUpdate,
    Delete,
    ListAfterDelete,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::ListInitial,
        Step::Create,
        Step::Get,
        Step::Update,
        Step::ListAfterUpdate,
        Step::Delete,
        Step::ListAfterDelete,
    ];

    /// 1-based position in the sequence.
    pub fn number(self) -> usize {
        match self {
            Step::ListInitial => 1,
            Step::Create => 2,
            Step::Get => 3,
            Step::Update => 4,
            Step::ListAfterUpdate => 5,
            Step::Delete => 6,
            Step::ListAfterDelete => 7,
        }
    }

    /// Heading printed before the request goes out. Steps 3, 4 and 6 name
    /// the todo id; pass `None` for the others.
    pub fn heading(self, id: Option<&TodoId>) -> String {
        let n = self.number();
        let id = id.map(TodoId::as_str).unwrap_or_default();
        match self {
            Step::ListInitial => format!("{n}. Getting all todos:"),
            Step::Create => format!("{n}. Creating a new todo:"),
            Step::Get => format!("{n}. Getting todo {id}:"),
            Step::Update => format!("{n}. Updating todo {id}:"),
            Step::ListAfterUpdate => format!("{n}. Getting all todos after update:"),
            Step::Delete => format!("{n}. Deleting todo {id}:"),
            Step::ListAfterDelete => format!("{n}. Getting all todos after deletion:"),
        }
    }
}

/// What one finished step saw.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: Step,
    pub status: u16,
    pub raw_body: String,
    /// `None` for the delete step, whose body is never decoded.
    pub body: Option<Value>,
}

/// Everything a run observed, up to where it stopped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub steps: Vec<StepRecord>,
    pub todo_id: Option<TodoId>,
}

impl ProbeReport {
    pub fn record(&self, step: Step) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to write probe output: {0}")]
    Output(#[from] io::Error),
}

impl ProbeError {
    /// The only distinction the probe draws: unreachable host or anything else.
    pub fn is_connection(&self) -> bool {
        matches!(self, ProbeError::Transport(e) if e.is_connect())
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum ProbeOutcome {
    Completed(ProbeReport),
    ConnectionFailed {
        step: Step,
        report: ProbeReport,
        error: ProbeError,
    },
    Failed {
        step: Step,
        report: ProbeReport,
        error: ProbeError,
    },
}

impl ProbeOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ProbeOutcome::Completed(_))
    }

    pub fn report(&self) -> &ProbeReport {
        match self {
            ProbeOutcome::Completed(report)
            | ProbeOutcome::ConnectionFailed { report, .. }
            | ProbeOutcome::Failed { report, .. } => report,
        }
    }

    pub fn failed_step(&self) -> Option<Step> {
        match self {
            ProbeOutcome::Completed(_) => None,
            ProbeOutcome::ConnectionFailed { step, .. } | ProbeOutcome::Failed { step, .. } => Some(*step),
        }
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            ProbeOutcome::Completed(_) => None,
            ProbeOutcome::ConnectionFailed { error, .. } | ProbeOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// The single line printed when a run aborts.
    pub fn diagnostic(&self, base_url: &str) -> Option<String> {
        match self {
            ProbeOutcome::Completed(_) => None,
            ProbeOutcome::ConnectionFailed { .. } => Some(format!(
                "Error: Could not connect to the API. Make sure the server is running on {base_url}"
            )),
            ProbeOutcome::Failed { error, .. } => Some(format!("Error: {error}")),
        }
    }
}

/// Runs the fixed seven-step sequence against one base URL.
pub struct ProbeRunner<T> {
    client: TodoClient,
    transport: T,
    current: Step,
}

impl<T: Transport> ProbeRunner<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            current: Step::ListInitial,
        }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run every step, writing progress to `out`. On failure the matching
    /// diagnostic is written after whatever step output came before it.
    pub fn run<W: Write>(&mut self, out: &mut W) -> ProbeOutcome {
        let mut report = ProbeReport::default();
        self.current = Step::ListInitial;
        let error = match self.run_steps(out, &mut report) {
            Ok(()) => return ProbeOutcome::Completed(report),
            Err(error) => error,
        };

        let step = self.current;
        warn!(step = step.number(), error = %error, "probe aborted");
        let outcome = if error.is_connection() {
            ProbeOutcome::ConnectionFailed { step, report, error }
        } else {
            ProbeOutcome::Failed { step, report, error }
        };
        if let Some(line) = outcome.diagnostic(self.client.base_url()) {
            if let Err(e) = writeln!(out, "{line}") {
                warn!(error = %e, "could not write diagnostic");
            }
        }
        outcome
    }

    fn run_steps<W: Write>(&mut self, out: &mut W, report: &mut ProbeReport) -> Result<(), ProbeError> {
        writeln!(out, "Testing Todo API...")?;

        let request = self.client.build_list_todos();
        self.probe_json(Step::ListInitial, None, request, out, report)?;

        let request = self
            .client
            .build_create_todo(&TodoRequest::new("Learn Rust", false))?;
        let created = self.probe_json(Step::Create, None, request, out, report)?;
        let id = TodoId::from_body(&created)?;
        debug!(id = %id, "created todo");
        report.todo_id = Some(id.clone());

        let request = self.client.build_get_todo(&id);
        self.probe_json(Step::Get, Some(&id), request, out, report)?;

        let request = self
            .client
            .build_update_todo(&id, &TodoRequest::new("Learn Rust with Axum", true))?;
        self.probe_json(Step::Update, Some(&id), request, out, report)?;

        let request = self.client.build_list_todos();
        self.probe_json(Step::ListAfterUpdate, None, request, out, report)?;

        self.current = Step::Delete;
        writeln!(out, "\n{}", Step::Delete.heading(Some(&id)))?;
        let request = self.client.build_delete_todo(&id);
        let response = self.send(request)?;
        writeln!(out, "Status: {}", response.status)?;
        self.client.parse_delete_todo(&response)?;
        report.steps.push(StepRecord {
            step: Step::Delete,
            status: response.status,
            raw_body: response.body,
            body: None,
        });

        let request = self.client.build_list_todos();
        self.probe_json(Step::ListAfterDelete, None, request, out, report)?;

        Ok(())
    }

    /// Heading, request, status line, decoded body. Returns the body.
    fn probe_json<W: Write>(
        &mut self,
        step: Step,
        id: Option<&TodoId>,
        request: HttpRequest,
        out: &mut W,
        report: &mut ProbeReport,
    ) -> Result<Value, ProbeError> {
        self.current = step;
        writeln!(out, "\n{}", step.heading(id))?;
        let response = self.send(request)?;
        writeln!(out, "Status: {}", response.status)?;
        let body = self.client.parse_json(&response)?;
        writeln!(out, "Response: {body}")?;
        report.steps.push(StepRecord {
            step,
            status: response.status,
            raw_body: response.body,
            body: Some(body.clone()),
        });
        Ok(body)
    }

    fn send(&mut self, request: HttpRequest) -> Result<HttpResponse, ProbeError> {
        debug!(method = %request.method, url = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(
            status = response.status,
            bytes = response.body.len(),
            content_type = response.header("content-type").unwrap_or("-"),
            "received response"
        );
        Ok(response)
    }
}
