// ── Masked credentials ──
//
// A credential input holds a typed secret (never displayed, never logged)
// and a placeholder that shows the server's mask of the stored value.
// Presence of a usable credential is derived from these plus the
// snapshot's active-binding evidence.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use secrecy::{ExposeSecret, SecretString};

/// Credential input of a form.
#[derive(Clone)]
pub struct CredentialField {
    typed: SecretString,
    placeholder: String,
    default_placeholder: String,
}

impl fmt::Debug for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialField")
            .field(
                "typed",
                &if self.has_typed() { "[REDACTED]" } else { "<empty>" },
            )
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl CredentialField {
    /// Empty input showing the default placeholder.
    pub fn new(default_placeholder: impl Into<String>) -> Self {
        let default_placeholder = default_placeholder.into();
        Self {
            typed: SecretString::from(String::new()),
            placeholder: default_placeholder.clone(),
            default_placeholder,
        }
    }

    /// Empty input showing the stored mask, if any.
    pub fn with_mask(default_placeholder: impl Into<String>, mask: Option<&str>) -> Self {
        let mut field = Self::new(default_placeholder);
        field.apply_saved(mask);
        field
    }

    pub fn set_typed(&mut self, value: impl Into<String>) {
        self.typed = SecretString::from(value.into());
    }

    pub fn clear_typed(&mut self) {
        self.typed = SecretString::from(String::new());
    }

    /// Trimmed typed value is non-empty.
    pub fn has_typed(&self) -> bool {
        !self.typed.expose_secret().trim().is_empty()
    }

    /// The typed secret, for building an outgoing request only.
    pub fn typed_secret(&self) -> Option<&str> {
        let value = self.typed.expose_secret().trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn default_placeholder(&self) -> &str {
        &self.default_placeholder
    }

    /// The placeholder shows a server mask rather than the default text.
    pub fn shows_saved_mask(&self) -> bool {
        let placeholder = self.placeholder.trim();
        !placeholder.is_empty() && placeholder != self.default_placeholder.trim()
    }

    /// Reflect a successful save/load: drop the typed secret and show the new mask.
    pub fn apply_saved(&mut self, mask: Option<&str>) {
        self.clear_typed();
        self.placeholder = match mask.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mask) => mask.to_owned(),
            None => self.default_placeholder.clone(),
        };
    }
}

/// Evidence that the backend runs with a stored credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundCredential {
    pub is_active: bool,
    pub active_masked: Option<String>,
}

impl BoundCredential {
    pub fn new(is_active: bool, active_masked: Option<&str>) -> Self {
        Self {
            is_active,
            active_masked: active_masked.map(ToOwned::to_owned),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.is_active
            && self
                .active_masked
                .as_deref()
                .is_some_and(|m| !m.trim().is_empty())
    }
}

/// Why a credential counts as present, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CredentialPresence {
    /// The user typed a new secret.
    Typed = 1,
    /// The backend reports an active bound credential.
    Bound = 2,
    /// Only the placeholder shows a stored mask.
    LegacyPlaceholder = 3,
    Absent = 0,
}

impl CredentialPresence {
    pub fn of(field: &CredentialField, bound: &BoundCredential) -> Self {
        if field.has_typed() {
            Self::Typed
        } else if bound.is_bound() {
            Self::Bound
        } else if field.shows_saved_mask() {
            Self::LegacyPlaceholder
        } else {
            Self::Absent
        }
    }

    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Absent)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Typed,
            2 => Self::Bound,
            3 => Self::LegacyPlaceholder,
            _ => Self::Absent,
        }
    }
}

/// True iff the form may be saved without typing a secret, or one was typed.
pub fn has_usable_credential(field: &CredentialField, bound: &BoundCredential) -> bool {
    CredentialPresence::of(field, bound).is_usable()
}

/// Shared, lock-free presence flag read by background pollers.
#[derive(Debug)]
pub struct PresenceCell(AtomicU8);

impl Default for PresenceCell {
    fn default() -> Self {
        Self(AtomicU8::new(CredentialPresence::Absent as u8))
    }
}

impl PresenceCell {
    pub fn get(&self) -> CredentialPresence {
        CredentialPresence::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, presence: CredentialPresence) {
        self.0.store(presence as u8, Ordering::Release);
    }
}
