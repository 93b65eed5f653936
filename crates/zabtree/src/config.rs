//! CLI configuration: thin wrapper around `zabtree_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` and subcommand flag overrides (--server, -p, --root, ...).

use std::time::Duration;

use secrecy::SecretString;

use zabtree_core::{AuthCredentials, ConnectionConfig, Severity, StatusAlgorithm, SyncOptions};

use crate::cli::{AlgorithmArg, GlobalOpts, PopulateArgs};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use zabtree_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

// ── Profile selection ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with connection flags applied on top.
///
/// An explicitly requested profile must exist. Without one, flags alone
/// may describe the server.
pub fn effective_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);
    let mut profile = match cfg.profiles.get(&name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(cfg),
                name,
            });
        }
        None => Profile::default(),
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(ref user) = global.user {
        profile.user = Some(user.clone());
    }
    if global.http_auth {
        profile.http_auth = true;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(cfg.defaults.timeout));

    Ok((name, profile))
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

// ── Connection ──────────────────────────────────────────────────────

/// Build a `ConnectionConfig` from an effective profile and the password
/// flags.
///
/// The server URL and user are resolved before any password lookup, so
/// neither a bad URL nor a missing user ever triggers a password prompt.
pub fn resolve_connection(
    name: &str,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    if profile.server.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    let url = zabtree_config::validate_server(&profile.server)?;
    let user = zabtree_config::resolve_user(profile, name)?;
    let Some(password) = password_from_flags(global)? else {
        return Ok(zabtree_config::profile_to_connection_config(profile, name)?);
    };

    let auth = if profile.http_auth {
        AuthCredentials::HttpBasic { user, password }
    } else {
        AuthCredentials::Password { user, password }
    };

    Ok(ConnectionConfig {
        url,
        auth,
        tls: zabtree_config::tls_for_profile(profile),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
    })
}

/// `-p` prompts and `--passfile` reads a file; neither means the shared
/// password chain applies.
fn password_from_flags(global: &GlobalOpts) -> Result<Option<SecretString>, CliError> {
    if global.password_prompt {
        let password = rpassword::prompt_password("Password: ")?;
        return Ok(Some(SecretString::from(password)));
    }
    match global.passfile {
        Some(ref path) => Ok(Some(zabtree_config::read_password_file(path)?)),
        None => Ok(None),
    }
}

// ── Tree options ────────────────────────────────────────────────────

/// Profile tree settings with `populate` flags applied on top.
///
/// `--root` replaces the whole prefix chain from the profile.
pub fn populate_options(profile: &Profile, args: &PopulateArgs) -> Result<SyncOptions, CliError> {
    let mut merged = profile.clone();
    if let Some(ref hostgroup) = args.hostgroup {
        merged.hostgroup = Some(hostgroup.clone());
    }
    if let Some(ref filter) = args.filter {
        merged.filter = Some(filter.clone());
    }
    if args.sla.is_some() {
        merged.sla = args.sla;
    }
    if args.root.is_some() {
        merged.root.clone_from(&args.root);
        merged.branch.clone_from(&args.branch);
        merged.node.clone_from(&args.node);
    }

    let mut options = zabtree_config::profile_to_sync_options(&merged)?;

    if let Some(ref priority) = args.priority {
        options.min_severity = priority.parse::<Severity>().map_err(|e| CliError::Validation {
            field: "priority".into(),
            reason: e.to_string(),
        })?;
    }
    if let Some(algorithm) = args.algorithm {
        options.service.algorithm = match algorithm {
            AlgorithmArg::Any => StatusAlgorithm::AnyChildProblem,
            AlgorithmArg::All => StatusAlgorithm::AllChildrenProblem,
            AlgorithmArg::None => StatusAlgorithm::DoNotCalculate,
        };
    }
    options.monitored_only = !args.include_unmonitored;

    Ok(options)
}

/// Options for `purge`; only the stall bound matters there.
pub fn purge_options(max_stalled: Option<u32>) -> SyncOptions {
    let mut options = SyncOptions::default();
    if let Some(max) = max_stalled {
        options.max_stalled_cycles = max;
    }
    options
}
