//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod populate;
pub mod purge;
pub mod services;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let (name, profile) = config::effective_profile(global, &cfg)?;

    match cmd {
        Command::Populate(args) => populate::handle(args, &name, &profile, global).await,
        Command::Purge(args) => purge::handle(args, &name, &profile, global).await,
        Command::Services(args) => services::handle(args, &name, &profile, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
