//! Command dispatch: bridges CLI args -> core hooks -> output formatting.

pub mod config_cmd;
pub mod documents;
pub mod messages;
pub mod util;

use netdash_core::AppState;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &AppState, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Documents(args) => documents::handle(app.documents(), args, global).await,
        Command::Messages(args) => messages::handle(app.messages(), args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        // Generated in main without a backend
        Command::Completions(_) => Ok(()),
    }
}
