//! Field descriptors.
//!
//! A [`FieldDescriptor`] is the declarative description of one form input:
//! name, control kind, label, validation hints, and an optional change
//! callback. Descriptors are pure data plus callbacks; mutation and
//! interactive behavior live with the renderer, validation with `schema`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueKind};

/// Callback invoked whenever the renderer commits a new value for the field.
pub type ChangeHandler = Box<dyn Fn(&Value) + Send + Sync>;

/// One entry of a select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Supported input control kinds.
///
/// Notes:
/// - Text / Email / Password / Number / Date render as single-line editors
/// - Password is only obfuscated visually; the value is kept plain in state
/// - Checkbox toggles with Left/Right/Space and stores a boolean value
/// - Select cycles through its options; options must be non-empty
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Checkbox,
    Date,
    Select { options: Vec<SelectOption> },
}

impl FieldKind {
    /// True if this kind uses a textual line editor when focused.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Email
                | FieldKind::Password
                | FieldKind::Number
                | FieldKind::Date
        )
    }

    /// The value kind a control of this kind commits.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldKind::Number => ValueKind::Number,
            FieldKind::Checkbox => ValueKind::Bool,
            FieldKind::Date => ValueKind::Date,
            _ => ValueKind::Text,
        }
    }
}

/// Which side of the control a decoration glyph is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IconSide {
    #[default]
    Left,
    Right,
}

/// Short decoration glyph rendered beside a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIcon {
    pub glyph: String,
    pub side: IconSide,
}

/// Declarative description of a form field.
pub struct FieldDescriptor {
    // (Debug implemented manually below; `on_change` holds a closure that
    // cannot be derived.)
    pub name: String,
    pub kind: FieldKind,
    pub label: Option<String>,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub pattern: Option<Regex>,
    pub icon: Option<FieldIcon>,
    pub on_change: Option<ChangeHandler>,
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("required", &self.required)
            .field("placeholder", &self.placeholder)
            .field("help", &self.help)
            .field("pattern", &self.pattern)
            .field("icon", &self.icon)
            .field("on_change", &self.on_change.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

impl FieldDescriptor {
    /// Create a new field definition.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            required: false,
            placeholder: None,
            help: None,
            pattern: None,
            icon: None,
            on_change: None,
        }
    }

    /// The built-in email field (half of the default field set).
    pub fn email() -> Self {
        Self::new("email", FieldKind::Email)
            .label("Email")
            .required(true)
            .placeholder("Email")
    }

    /// The built-in password field (other half of the default field set).
    pub fn password() -> Self {
        Self::new("password", FieldKind::Password)
            .label("Password")
            .required(true)
            .placeholder("Password")
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Attach optional help / hint text shown beneath the field.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach a compiled pattern the field value must match.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn icon(mut self, glyph: impl Into<String>, side: IconSide) -> Self {
        self.icon = Some(FieldIcon {
            glyph: glyph.into(),
            side,
        });
        self
    }

    /// Attach a change callback invoked on every committed edit.
    pub fn on_change(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Display label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.name.as_str())
    }

    pub fn is_textual(&self) -> bool {
        self.kind.is_textual()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains_accumulate() {
        let field = FieldDescriptor::new("gender", FieldKind::Select {
            options: vec![
                SelectOption::new("Male", "male"),
                SelectOption::new("Female", "female"),
            ],
        })
        .label("Gender")
        .required(true)
        .help("Pick one");

        assert_eq!(field.name, "gender");
        assert_eq!(field.display_label(), "Gender");
        assert!(field.required);
        assert!(field.help.is_some());
        assert!(!field.is_textual());
    }

    #[test]
    fn default_fields_are_email_and_password() {
        let email = FieldDescriptor::email();
        let password = FieldDescriptor::password();
        assert_eq!(email.name, "email");
        assert_eq!(email.kind, FieldKind::Email);
        assert!(email.required);
        assert_eq!(password.name, "password");
        assert_eq!(password.kind, FieldKind::Password);
        assert!(password.is_textual());
    }

    #[test]
    fn value_kind_per_control() {
        assert_eq!(FieldKind::Checkbox.value_kind(), ValueKind::Bool);
        assert_eq!(FieldKind::Number.value_kind(), ValueKind::Number);
        assert_eq!(FieldKind::Date.value_kind(), ValueKind::Date);
        assert_eq!(FieldKind::Password.value_kind(), ValueKind::Text);
    }
}
