// ── Schema-driven tool forms ──
//
// Builds typed inputs from a tool's server-supplied schema and collects
// them back into a settings map. Secrets are never pre-filled: a stored
// password shows only its server mask as placeholder.

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Number, Value};

use crate::error::FieldError;
use crate::model::{FieldKind, FieldSpec, ToolSettings, option_text};

pub const REQUIRED_EMPTY: &str = "Required field is empty";
pub const NOT_A_NUMBER: &str = "Must be a number";
pub const NOT_AN_OPTION: &str = "Not one of the allowed options";

/// Current value of one input.
#[derive(Debug, Clone)]
pub enum InputValue {
    Text(String),
    Secret(SecretString),
    Toggle(bool),
    /// Index into the select's options.
    Choice(Option<usize>),
}

#[derive(Debug, Clone)]
pub struct FieldInput {
    pub value: InputValue,
    /// Server mask for stored passwords, empty otherwise.
    pub placeholder: String,
    revealed: bool,
}

impl FieldInput {
    fn new(value: InputValue, placeholder: String) -> Self {
        Self {
            value,
            placeholder,
            revealed: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// A password the backend already holds a value for.
    pub fn has_stored_secret(&self) -> bool {
        matches!(self.value, InputValue::Secret(_)) && !self.placeholder.trim().is_empty()
    }
}

/// Rendered inputs in schema order.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: IndexMap<String, FieldInput>,
}

fn number_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        _ => None,
    }
}

fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn option_index(options: &[Value], value: &Value) -> Option<usize> {
    options
        .iter()
        .position(|o| o == value)
        .or_else(|| {
            let text = option_text(value);
            options.iter().position(|o| option_text(o) == text)
        })
}

impl FormState {
    /// Build inputs for `schema` from the masked `current` settings.
    pub fn render(schema: &[FieldSpec], current: &ToolSettings) -> Self {
        let fields = schema
            .iter()
            .map(|spec| {
                let stored = current.get(&spec.key).filter(|v| !v.is_null());
                let initial = stored.or(spec.default.as_ref());
                let input = match &spec.kind {
                    FieldKind::Boolean => FieldInput::new(
                        InputValue::Toggle(initial.and_then(truthy).unwrap_or(false)),
                        String::new(),
                    ),
                    FieldKind::Select { options } => FieldInput::new(
                        InputValue::Choice(initial.and_then(|v| option_index(options, v))),
                        String::new(),
                    ),
                    FieldKind::Password => FieldInput::new(
                        InputValue::Secret(SecretString::from(String::new())),
                        stored.and_then(plain_text).unwrap_or_default(),
                    ),
                    FieldKind::Number => FieldInput::new(
                        InputValue::Text(initial.and_then(number_text).unwrap_or_default()),
                        String::new(),
                    ),
                    FieldKind::String => FieldInput::new(
                        InputValue::Text(initial.and_then(plain_text).unwrap_or_default()),
                        String::new(),
                    ),
                };
                (spec.key.clone(), input)
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldInput> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldInput)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Set a text or password input. Returns `false` for other kinds.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(key).map(|f| &mut f.value) {
            Some(InputValue::Text(text)) => {
                *text = value.into();
                true
            }
            Some(InputValue::Secret(secret)) => {
                *secret = SecretString::from(value.into());
                true
            }
            _ => false,
        }
    }

    pub fn set_toggle(&mut self, key: &str, on: bool) -> bool {
        match self.fields.get_mut(key).map(|f| &mut f.value) {
            Some(InputValue::Toggle(value)) => {
                *value = on;
                true
            }
            _ => false,
        }
    }

    pub fn choose(&mut self, key: &str, index: Option<usize>) -> bool {
        match self.fields.get_mut(key).map(|f| &mut f.value) {
            Some(InputValue::Choice(choice)) => {
                *choice = index;
                true
            }
            _ => false,
        }
    }

    /// Apply a raw textual value (`--set key=value`) according to the field kind.
    pub fn set_from_text(
        &mut self,
        schema: &[FieldSpec],
        key: &str,
        raw: &str,
    ) -> Result<(), FieldError> {
        let spec = schema
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| FieldError::new(key, "Unknown setting"))?;

        match &spec.kind {
            FieldKind::Boolean => {
                let on = parse_bool(raw)
                    .ok_or_else(|| FieldError::new(key, "Must be true or false"))?;
                self.set_toggle(key, on);
            }
            FieldKind::Select { options } => {
                let raw = raw.trim();
                let index = if raw.is_empty() {
                    None
                } else {
                    Some(
                        options
                            .iter()
                            .position(|o| option_text(o) == raw)
                            .ok_or_else(|| FieldError::new(key, NOT_AN_OPTION))?,
                    )
                };
                self.choose(key, index);
            }
            FieldKind::String | FieldKind::Password | FieldKind::Number => {
                self.set_text(key, raw);
            }
        }
        Ok(())
    }

    /// Flip the show/hide flag of a password input.
    pub fn toggle_reveal(&mut self, key: &str) -> Option<bool> {
        let field = self.fields.get_mut(key)?;
        if !matches!(field.value, InputValue::Secret(_)) {
            return None;
        }
        field.revealed = !field.revealed;
        Some(field.revealed)
    }

    pub fn is_revealed(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(FieldInput::is_revealed)
    }

    /// What an input shows right now. Concealed secrets are dotted out.
    pub fn display_value(&self, schema: &[FieldSpec], key: &str) -> Option<String> {
        let field = self.fields.get(key)?;
        Some(match &field.value {
            InputValue::Text(text) => text.clone(),
            InputValue::Secret(secret) => {
                let secret = secret.expose_secret();
                if field.revealed {
                    secret.to_owned()
                } else if secret.is_empty() {
                    field.placeholder.clone()
                } else {
                    "•".repeat(secret.chars().count())
                }
            }
            InputValue::Toggle(on) => String::from(if *on { "on" } else { "off" }),
            InputValue::Choice(index) => {
                let options = schema.iter().find(|s| s.key == key).and_then(|s| match &s.kind {
                    FieldKind::Select { options } => Some(options),
                    _ => None,
                });
                index
                    .zip(options)
                    .and_then(|(i, options)| options.get(i))
                    .map(option_text)
                    .unwrap_or_default()
            }
        })
    }

    // ── Collection ───────────────────────────────────────────────────

    /// Turn the inputs into a settings map, or every field error found.
    ///
    /// Blank passwords are always omitted. A stored password still counts
    /// as filled for `required`.
    pub fn collect(&self, schema: &[FieldSpec]) -> Result<ToolSettings, Vec<FieldError>> {
        let mut settings = ToolSettings::new();
        let mut errors = Vec::new();

        for spec in schema {
            let Some(field) = self.fields.get(&spec.key) else {
                if spec.required && !matches!(spec.kind, FieldKind::Boolean) {
                    errors.push(FieldError::new(&spec.key, REQUIRED_EMPTY));
                }
                continue;
            };

            let value = match (&spec.kind, &field.value) {
                (FieldKind::Boolean, InputValue::Toggle(on)) => Some(Value::Bool(*on)),
                (FieldKind::Select { options }, InputValue::Choice(index)) => {
                    match index.map(|i| options.get(i)) {
                        Some(Some(option)) => Some(option.clone()),
                        Some(None) => {
                            errors.push(FieldError::new(&spec.key, NOT_AN_OPTION));
                            continue;
                        }
                        None => None,
                    }
                }
                (FieldKind::Password, InputValue::Secret(secret)) => {
                    let typed = secret.expose_secret().trim();
                    if !typed.is_empty() {
                        Some(Value::String(typed.to_owned()))
                    } else if field.has_stored_secret() {
                        // Absent key keeps the stored value
                        continue;
                    } else {
                        None
                    }
                }
                (FieldKind::Number, InputValue::Text(text)) => {
                    let text = text.trim();
                    if text.is_empty() {
                        None
                    } else if let Some(number) = parse_number(text) {
                        Some(Value::Number(number))
                    } else {
                        errors.push(FieldError::new(&spec.key, NOT_A_NUMBER));
                        continue;
                    }
                }
                (FieldKind::String, InputValue::Text(text)) => {
                    let text = text.trim();
                    (!text.is_empty()).then(|| Value::String(text.to_owned()))
                }
                _ => None,
            };

            match value {
                Some(value) => {
                    settings.insert(spec.key.clone(), value);
                }
                None if spec.required => errors.push(FieldError::new(&spec.key, REQUIRED_EMPTY)),
                None => {}
            }
        }

        if errors.is_empty() { Ok(settings) } else { Err(errors) }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}
