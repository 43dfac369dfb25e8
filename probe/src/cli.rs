use clap::Parser;
use todo_core::{StatusPolicy, DEFAULT_BASE_URL};

/// Run the fixed list/create/get/update/list/delete/list sequence against a
/// todo API and print every response.
#[derive(Debug, Parser)]
#[command(name = "todo-probe", version, about)]
pub struct Cli {
    /// Base URL of the todo service.
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Treat any non-2xx status as a failure instead of printing the body.
    #[arg(long)]
    pub strict: bool,

    /// Log level for stderr output; `RUST_LOG` takes precedence.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn status_policy(&self) -> StatusPolicy {
        if self.strict {
            StatusPolicy::Strict
        } else {
            StatusPolicy::Lenient
        }
    }
}
