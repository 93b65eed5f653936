//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// Format config as TOML-like text, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref u) = p.user {
            let _ = writeln!(out, "user = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{MASK}\"");
        }
        if let Some(ref file) = p.password_file {
            let _ = writeln!(out, "password_file = \"{}\"", file.display());
        }
        if p.http_auth {
            let _ = writeln!(out, "http_auth = true");
        }
        for (key, value) in [
            ("hostgroup", &p.hostgroup),
            ("filter", &p.filter),
            ("root", &p.root),
            ("branch", &p.branch),
            ("node", &p.node),
        ] {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{v}\"");
            }
        }
        if let Some(sla) = p.sla {
            let _ = writeln!(out, "sla = {sla}");
        }
        if let Some(priority) = p.priority {
            let _ = writeln!(out, "priority = {priority}");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_password() -> Result<SecretString, CliError> {
    let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(secret))
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        available: config::available_profiles(cfg),
        name,
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    let mut cfg = config::load_config_or_default();
    eprintln!("zabtree configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    if cfg.profiles.contains_key(&profile_name) && !global.yes {
        return Err(CliError::Conflict { name: profile_name });
    }

    // 2. Server URL, checked as it is typed
    let server: String = Input::new()
        .with_prompt("Zabbix frontend URL")
        .default("https://zabbix.example.com/zabbix".into())
        .validate_with(|s: &String| {
            zabtree_config::validate_server(s)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Credentials
    let user: String = Input::new()
        .with_prompt("User")
        .default("Admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let http_auth = Confirm::new()
        .with_prompt("Is the frontend behind HTTP basic auth?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let storage = Select::new()
        .with_prompt("Where to store the password?")
        .items(&[
            "System keyring (recommended)",
            "Config file (plaintext)",
            "Nowhere (use -p, --passfile, or ZABTREE_PASSWORD)",
        ])
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password = match storage {
        0 => {
            zabtree_config::store_password(&profile_name, &prompt_password()?)?;
            eprintln!("   ✓ Password stored in system keyring");
            None
        }
        1 => {
            use secrecy::ExposeSecret;
            Some(prompt_password()?.expose_secret().to_owned())
        }
        _ => None,
    };

    // 4. Tree scope
    let hostgroup: String = Input::new()
        .with_prompt("Restrict to host group (empty for all)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    // 5. Write config
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            server,
            user: Some(user),
            password,
            http_auth,
            hostgroup: (!hostgroup.trim().is_empty()).then_some(hostgroup),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Try it: zabtree services");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config_redacted)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: zabtree config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }
            zabtree_config::store_password(&profile_name, &prompt_password()?)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                server: "https://zabbix.example.com".into(),
                user: Some("Admin".into()),
                password: Some("hunter2".into()),
                hostgroup: Some("Linux servers".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_never_prints_plaintext_passwords() {
        let cfg = sample();
        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.prod]"));
        assert!(text.contains("hostgroup = \"Linux servers\""));
        assert!(!text.contains("hunter2"));

        let masked = redacted(&cfg);
        assert_eq!(masked.profiles["prod"].password.as_deref(), Some(MASK));
    }

    #[test]
    fn profile_not_found_lists_alternatives() {
        let err = profile_not_found("lab".into(), &sample());
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "prod"));
    }
}
