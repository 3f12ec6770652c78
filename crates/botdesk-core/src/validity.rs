// ── Form validity ──
//
// Pure predicates over form + snapshot, re-evaluated on every edit. The
// submit variants return field errors so a surface can mark the inputs.

use crate::config::ProviderPolicy;
use crate::credential::has_usable_credential;
use crate::error::FieldError;
use crate::form::{ConnectorForm, ProviderForm, connector_binding, provider_binding};
use crate::model::{ConnectorSettings, ProviderSettings};

pub const FIELD_PROVIDER: &str = "provider";
pub const FIELD_MODEL: &str = "model";
pub const FIELD_CREDENTIAL: &str = "credential";

/// The model the form currently names, read from the input the provider uses.
pub fn effective_model<'a>(form: &'a ProviderForm, policy: &ProviderPolicy) -> &'a str {
    if policy.uses_free_text_model(&form.provider_type) {
        form.free_text_model.trim()
    } else {
        form.selected_model.trim()
    }
}

pub fn connector_form_valid(form: &ConnectorForm, snapshot: Option<&ConnectorSettings>) -> bool {
    has_usable_credential(&form.credential, &connector_binding(snapshot))
}

pub fn provider_form_valid(
    form: &ProviderForm,
    snapshot: Option<&ProviderSettings>,
    policy: &ProviderPolicy,
) -> bool {
    validate_provider_submit(form, snapshot, policy).is_ok()
}

pub fn validate_connector_submit(
    form: &ConnectorForm,
    snapshot: Option<&ConnectorSettings>,
) -> Result<(), Vec<FieldError>> {
    if connector_form_valid(form, snapshot) {
        Ok(())
    } else {
        Err(vec![FieldError::new(FIELD_CREDENTIAL, "Enter the bot token")])
    }
}

/// Provider selected, model resolvable, credential usable unless exempt.
///
/// With no model but a usable credential the save is still allowed; the
/// placeholder model is substituted when the request is built.
pub fn validate_provider_submit(
    form: &ProviderForm,
    snapshot: Option<&ProviderSettings>,
    policy: &ProviderPolicy,
) -> Result<(), Vec<FieldError>> {
    let provider = form.provider_type.trim();
    if provider.is_empty() {
        return Err(vec![FieldError::new(FIELD_PROVIDER, "Select a provider")]);
    }

    let usable = has_usable_credential(&form.credential, &provider_binding(snapshot));
    let mut errors = Vec::new();

    if effective_model(form, policy).is_empty() && !usable {
        errors.push(FieldError::new(FIELD_MODEL, "Select or enter a model"));
    }
    if !usable && !policy.is_credential_exempt(provider) {
        errors.push(FieldError::new(FIELD_CREDENTIAL, "Enter the API key"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
