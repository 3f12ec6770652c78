//! Applies global flags on top of the active profile.
//!
//! Profile storage and credential lookup live in `botdesk-config`; this
//! module only layers `--backend`, `--admin-key`, `--insecure` and
//! `--timeout` over what the profile resolved.

use std::time::Duration;

use secrecy::SecretString;

use botdesk_config::{Config, Profile};
use botdesk_core::{BackendConfig, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything needed to open a session.
pub struct Resolved {
    pub profile_name: String,
    pub backend: BackendConfig,
    pub session: SessionConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Build backend and session configs from the config file, profile and flags.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut backend =
            botdesk_config::profile_to_backend_config(profile, &profile_name, &cfg.defaults)?;
        apply_overrides(&mut backend, global)?;
        let session = botdesk_config::profile_to_session_config(profile, &cfg.defaults)?;
        return Ok(Resolved {
            profile_name,
            backend,
            session,
        });
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: cfg.available_profiles(),
        });
    }

    // No profile -- build from flags / env alone
    let raw = global.backend.as_deref().ok_or_else(|| CliError::NoConfig {
        path: botdesk_config::config_path().display().to_string(),
    })?;

    let mut backend = BackendConfig {
        url: botdesk_config::parse_backend_url(raw)?,
        admin_key: None,
        tls: if cfg.defaults.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(cfg.defaults.timeout),
    };
    apply_overrides(&mut backend, global)?;
    let session = botdesk_config::profile_to_session_config(&Profile::default(), &cfg.defaults)?;

    Ok(Resolved {
        profile_name,
        backend,
        session,
    })
}

fn apply_overrides(backend: &mut BackendConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref raw) = global.backend {
        backend.url = botdesk_config::parse_backend_url(raw)?;
    }
    if let Some(ref key) = global.admin_key {
        backend.admin_key = Some(SecretString::from(key.clone()));
    }
    if global.insecure {
        backend.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        backend.timeout = Duration::from_secs(secs);
    }
    Ok(())
}
