//! Public configuration surface of a form instance.
//!
//! One [`AuthFormOptions`] value is supplied per instantiation and stays
//! immutable for the form's lifetime. Builder setters mirror the descriptor
//! builders in `field`.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::ErrorMap;
use crate::field::{FieldDescriptor, IconSide};
use crate::password::DEFAULT_SALT_ROUNDS;
use crate::schema::SchemaFactory;
use crate::value::FormValues;

/// Semantic action of the form. Controls the submit caption and whether the
/// sign-up password hashing step applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AuthAction {
    #[strum(serialize = "Sign In")]
    #[serde(rename = "signIn")]
    SignIn,
    #[strum(serialize = "Sign Up")]
    #[serde(rename = "signUp")]
    SignUp,
}

/// Placement of the social login panel relative to the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SocialPosition {
    Top,
    #[default]
    Bottom,
}

/// A social login provider: a bare name, or a name with a decoration glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialProvider {
    Named(String),
    Custom { name: String, icon: String },
}

impl SocialProvider {
    /// The provider name handed to the selection callback.
    pub fn name(&self) -> &str {
        match self {
            SocialProvider::Named(name) => name,
            SocialProvider::Custom { name, .. } => name,
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            SocialProvider::Named(_) => None,
            SocialProvider::Custom { icon, .. } => Some(icon.as_str()),
        }
    }
}

impl From<&str> for SocialProvider {
    fn from(name: &str) -> Self {
        SocialProvider::Named(name.to_string())
    }
}

/// Callback invoked with the resolved provider name on button activation.
pub type SocialSelectHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Social login panel configuration.
#[derive(Default)]
pub struct SocialLoginOptions {
    pub enabled: bool,
    pub position: SocialPosition,
    pub providers: Vec<SocialProvider>,
    pub on_select: Option<SocialSelectHandler>,
}

impl SocialLoginOptions {
    pub fn new(providers: Vec<SocialProvider>) -> Self {
        Self {
            enabled: true,
            position: SocialPosition::default(),
            providers,
            on_select: None,
        }
    }

    pub fn position(mut self, position: SocialPosition) -> Self {
        self.position = position;
        self
    }

    pub fn on_select(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }
}

/// Callback invoked with the submitted payload. An `Err` fails the attempt
/// with a preserved cause message.
pub type SubmitHandler =
    Box<dyn Fn(&FormValues, AuthAction) -> Result<(), String> + Send + Sync>;

/// Full per-instance configuration.
pub struct AuthFormOptions {
    pub heading_text: String,
    pub action: AuthAction,
    /// Caller field set; `None` means the built-in email+password defaults.
    pub fields: Option<Vec<FieldDescriptor>>,
    /// Externally rendered fields, appended after `fields` in canonical order.
    pub integrated_fields: Vec<FieldDescriptor>,
    pub on_submit: Option<SubmitHandler>,
    pub validation: bool,
    /// Caller-seeded errors (e.g. server-side results from a previous round
    /// trip). Lifecycle across attempts is governed by
    /// `clear_injected_errors`.
    pub validation_errors: ErrorMap,
    pub submit_icon: Option<String>,
    pub submit_icon_side: IconSide,
    /// Security caveat: when enabled the hash is attached *alongside* the
    /// plaintext `password` value, which stays in the payload.
    pub encrypt_password: bool,
    pub salt_rounds: u32,
    pub custom_schema: Option<SchemaFactory>,
    /// When set, injected errors are dropped at the start of every attempt
    /// instead of accumulating across resubmissions.
    pub clear_injected_errors: bool,
    pub social_login: SocialLoginOptions,
}

impl AuthFormOptions {
    pub fn new(heading_text: impl Into<String>, action: AuthAction) -> Self {
        Self {
            heading_text: heading_text.into(),
            action,
            fields: None,
            integrated_fields: Vec::new(),
            on_submit: None,
            validation: true,
            validation_errors: ErrorMap::new(),
            submit_icon: None,
            submit_icon_side: IconSide::Left,
            encrypt_password: false,
            salt_rounds: DEFAULT_SALT_ROUNDS,
            custom_schema: None,
            clear_injected_errors: false,
            social_login: SocialLoginOptions::default(),
        }
    }

    pub fn fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn integrated_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.integrated_fields = fields;
        self
    }

    pub fn on_submit(
        mut self,
        f: impl Fn(&FormValues, AuthAction) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    pub fn validation_errors(mut self, errors: ErrorMap) -> Self {
        self.validation_errors = errors;
        self
    }

    pub fn submit_icon(mut self, glyph: impl Into<String>, side: IconSide) -> Self {
        self.submit_icon = Some(glyph.into());
        self.submit_icon_side = side;
        self
    }

    pub fn encrypt_password(mut self, enabled: bool) -> Self {
        self.encrypt_password = enabled;
        self
    }

    pub fn salt_rounds(mut self, rounds: u32) -> Self {
        self.salt_rounds = rounds;
        self
    }

    pub fn custom_schema(
        mut self,
        f: impl Fn(&FormValues) -> crate::schema::ValidationSchema + Send + Sync + 'static,
    ) -> Self {
        self.custom_schema = Some(Box::new(f));
        self
    }

    pub fn clear_injected_errors(mut self, clear: bool) -> Self {
        self.clear_injected_errors = clear;
        self
    }

    pub fn social_login(mut self, social: SocialLoginOptions) -> Self {
        self.social_login = social;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn);
        assert!(options.validation);
        assert!(!options.encrypt_password);
        assert_eq!(options.salt_rounds, DEFAULT_SALT_ROUNDS);
        assert!(!options.clear_injected_errors);
        assert!(!options.social_login.enabled);
        assert_eq!(options.social_login.position, SocialPosition::Bottom);
        assert!(options.fields.is_none());
    }

    #[test]
    fn action_captions_for_submit_button() {
        assert_eq!(AuthAction::SignIn.to_string(), "Sign In");
        assert_eq!(AuthAction::SignUp.to_string(), "Sign Up");
    }

    #[test]
    fn provider_names_resolve_for_both_shapes() {
        let named = SocialProvider::from("Google");
        let custom = SocialProvider::Custom {
            name: "Facebook".to_string(),
            icon: "f".to_string(),
        };
        assert_eq!(named.name(), "Google");
        assert_eq!(custom.name(), "Facebook");
        assert_eq!(named.icon(), None);
        assert_eq!(custom.icon(), Some("f"));
    }
}
