//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use botdesk_config::{Config, Defaults, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the admin key.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
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
    let _ = writeln!(out, "poll_interval_secs = {}", cfg.defaults.poll_interval_secs);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "backend = \"{}\"", p.backend);
        if p.admin_key.is_some() {
            let _ = writeln!(out, "admin_key = \"****\"");
        }
        if let Some(ref env) = p.admin_key_env {
            let _ = writeln!(out, "admin_key_env = \"{env}\"");
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
        if let Some(poll) = p.poll_interval_secs {
            let _ = writeln!(out, "poll_interval_secs = {poll}");
        }
    }

    out
}

/// Replace plaintext keys before structured output.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.admin_key.is_some() {
            profile.admin_key = Some("****".into());
        }
    }
    cfg
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = botdesk_config::config_path();
            eprintln!("botdesk configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Backend URL
            let backend: String = Input::new()
                .with_prompt("Admin backend URL")
                .default("http://localhost:8000".into())
                .validate_with(|raw: &String| {
                    botdesk_config::parse_backend_url(raw)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Admin key (optional)
            let key = rpassword::prompt_password("Admin key (blank if the backend has none): ")
                .map_err(prompt_err)?;

            let admin_key = if key.trim().is_empty() {
                None
            } else {
                let choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let selection = Select::new()
                    .with_prompt("Where to store the admin key?")
                    .items(choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                if selection == 0 {
                    botdesk_config::store_admin_key(&profile_name, key.trim())?;
                    eprintln!("   ✓ Admin key stored in system keyring");
                    None
                } else {
                    Some(key.trim().to_owned())
                }
            };

            // 4. Build profile and config, keeping any existing profiles
            let mut cfg = botdesk_config::load_config().unwrap_or_else(|_| Config {
                default_profile: None,
                defaults: Defaults::default(),
                profiles: HashMap::new(),
            });
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    backend,
                    admin_key,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            // 5. Write config
            botdesk_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: botdesk settings");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redact(botdesk_config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(
                &botdesk_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = botdesk_config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "backend" => {
                    botdesk_config::parse_backend_url(&value)?;
                    profile.backend = value;
                }
                "admin_key" | "admin-key" => profile.admin_key = Some(value),
                "admin_key_env" | "admin-key-env" => profile.admin_key_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "insecure" => {
                    profile.insecure = Some(parse_field("insecure", &value, "'true' or 'false'")?);
                }
                "timeout" => {
                    profile.timeout = Some(parse_field("timeout", &value, "a number (seconds)")?);
                }
                "poll_interval_secs" | "poll-interval-secs" => {
                    let secs: u64 =
                        parse_field("poll_interval_secs", &value, "a number (seconds)")?;
                    if secs == 0 {
                        return Err(CliError::Validation {
                            field: "poll_interval_secs".into(),
                            reason: "must be at least 1 second".into(),
                        });
                    }
                    profile.poll_interval_secs = Some(secs);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: backend, admin_key, \
                             admin_key_env, ca_cert, insecure, timeout, poll_interval_secs"
                        ),
                    });
                }
            }

            botdesk_config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = botdesk_config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: botdesk config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = botdesk_config::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            botdesk_config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { profile } => {
            let cfg = botdesk_config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            cfg.profile(&profile_name)?;

            let key = rpassword::prompt_password("Admin key: ").map_err(prompt_err)?;
            if key.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "admin_key".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            botdesk_config::store_admin_key(&profile_name, key.trim())?;
            eprintln!("✓ Admin key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
