//! Form core: value store, error state, and the submission pipeline.
//!
//! [`AuthForm`] owns the mutable state of one form instance (values, error
//! maps, schema cache, submission phase) and runs the per-attempt state
//! machine `Idle → Submitting → Succeeded | Failed`. Rendering and event
//! handling live with the widget crate; everything here is UI-agnostic.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{merge_errors, ErrorMap, FormError, PasswordHashError, SubmitError};
use crate::field::FieldDescriptor;
use crate::options::{AuthAction, AuthFormOptions};
use crate::password::hash_password;
use crate::registry::FieldRegistry;
use crate::schema::{select_schema, SchemaCache};
use crate::value::{FormValues, Value};

/// Payload key the hashed password is attached under, alongside the
/// plaintext `password` value.
pub const HASH_PASSWORD_KEY: &str = "hashPassword";

/// Per-attempt submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// One form instance: canonical fields, current values, error state, memoized
/// schema, and the submission pipeline.
pub struct AuthForm {
    registry: FieldRegistry,
    options: AuthFormOptions,
    values: FormValues,
    /// Latest schema-derived failures (per field, dotted keys for nested).
    field_errors: ErrorMap,
    /// Caller-injected errors; lifecycle governed by
    /// `options.clear_injected_errors`.
    injected: ErrorMap,
    cache: SchemaCache,
    phase: SubmitPhase,
}

impl AuthForm {
    /// Build a form from its options. Fails on invalid descriptor sets
    /// (duplicate or empty names, optionless selects).
    pub fn new(mut options: AuthFormOptions) -> Result<Self, FormError> {
        let fields = options.fields.take().unwrap_or_else(|| {
            vec![FieldDescriptor::email(), FieldDescriptor::password()]
        });
        let integrated = std::mem::take(&mut options.integrated_fields);
        let registry = FieldRegistry::new(fields, integrated)?;
        let values = registry.initial_values();
        let injected = std::mem::take(&mut options.validation_errors);

        Ok(Self {
            registry,
            options,
            values,
            field_errors: ErrorMap::new(),
            injected,
            cache: SchemaCache::new(),
            phase: SubmitPhase::Idle,
        })
    }

    // --- Accessors used by the renderer -------------------------------------------------------

    pub fn heading(&self) -> &str {
        &self.options.heading_text
    }

    pub fn action(&self) -> AuthAction {
        self.options.action
    }

    pub fn options(&self) -> &AuthFormOptions {
        &self.options
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.registry.fields()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Inline error for one field: fresh schema failures win over injected
    /// entries.
    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.field_errors
            .get(name)
            .or_else(|| self.injected.get(name))
            .map(String::as_str)
    }

    pub fn field_errors(&self) -> &ErrorMap {
        &self.field_errors
    }

    /// Caller-injected errors (rendered as the banner block).
    pub fn injected_errors(&self) -> &ErrorMap {
        &self.injected
    }

    /// Merge more caller errors into the injected map.
    pub fn inject_errors(&mut self, errors: ErrorMap) {
        self.injected.extend(errors);
    }

    pub fn has_blocking_errors(&self) -> bool {
        !self.field_errors.is_empty() || !self.injected.is_empty()
    }

    // --- Edits & live validation ---------------------------------------------------------------

    /// Commit a new value for a field, dispatch its change callback, and run
    /// field-level validation when enabled. Values for unknown fields are
    /// ignored with a warning.
    pub fn set_value(&mut self, name: &str, value: Value) {
        let Some(field) = self.registry.field_by_name(name) else {
            tracing::warn!(field = name, "ignoring value for unknown field");
            return;
        };
        if let Some(on_change) = &field.on_change {
            on_change(&value);
        }
        self.values.set(name, value);
        if self.options.validation {
            self.validate_value_of(name);
        }
    }

    /// Run the full schema against the current values and replace the
    /// schema-derived error state (mount-time validation pass).
    pub fn validate_all(&mut self) -> &ErrorMap {
        let AuthForm {
            registry,
            options,
            values,
            cache,
            field_errors,
            ..
        } = self;
        let registry: &FieldRegistry = registry;
        let options: &AuthFormOptions = options;
        let values: &FormValues = values;
        if options.validation {
            let key = schema_key(registry, values);
            let schema = cache.resolve(key, || {
                select_schema(registry, values, options.custom_schema.as_ref())
            });
            *field_errors = schema.validate(values);
        }
        field_errors
    }

    /// Re-run one field's rules against the current values (blur
    /// validation). No-op when validation is disabled.
    pub fn validate_field(&mut self, name: &str) {
        if self.options.validation {
            self.validate_value_of(name);
        }
    }

    fn validate_value_of(&mut self, name: &str) {
        let AuthForm {
            registry,
            options,
            values,
            cache,
            field_errors,
            ..
        } = self;
        let registry: &FieldRegistry = registry;
        let options: &AuthFormOptions = options;
        let values: &FormValues = values;
        let key = schema_key(registry, values);
        let schema = cache.resolve(key, || {
            select_schema(registry, values, options.custom_schema.as_ref())
        });
        let fresh = schema.validate_field(name, values);
        let nested_prefix = format!("{name}.");
        field_errors.retain(|k, _| k != name && !k.starts_with(&nested_prefix));
        field_errors.extend(fresh);
    }

    // --- Submission pipeline -------------------------------------------------------------------

    /// Run one submission attempt. Re-entrant calls while an attempt is in
    /// flight are rejected. On success the submitted payload is returned and
    /// the value store resets to empty.
    pub async fn submit(&mut self) -> Result<FormValues, SubmitError> {
        if self.phase == SubmitPhase::Submitting {
            return Err(SubmitError::AlreadySubmitting);
        }
        self.phase = SubmitPhase::Submitting;
        tracing::debug!(action = %self.options.action, "submission started");

        let result = self.run_submission().await;
        self.phase = match &result {
            Ok(_) => SubmitPhase::Succeeded,
            Err(_) => SubmitPhase::Failed,
        };
        if let Err(err) = &result {
            tracing::warn!(error = %err, "submission failed");
        }
        result
    }

    async fn run_submission(&mut self) -> Result<FormValues, SubmitError> {
        if self.options.clear_injected_errors {
            self.injected.clear();
        }

        let mut payload = self.values.clone();

        // Sign-up hashing happens before validation, off the event thread.
        // The hash is attached alongside the plaintext password, which stays
        // in the payload.
        if self.options.encrypt_password && self.options.action == AuthAction::SignUp {
            if let Some(plain) = payload.get("password").and_then(Value::as_text) {
                if !plain.is_empty() {
                    let plain = plain.to_string();
                    let rounds = self.options.salt_rounds;
                    let hash = tokio::task::spawn_blocking(move || hash_password(&plain, rounds))
                        .await
                        .map_err(|e| {
                            SubmitError::Hashing(PasswordHashError::Hash(e.to_string()))
                        })?
                        .map_err(SubmitError::Hashing)?;
                    payload.set(HASH_PASSWORD_KEY, Value::Text(hash));
                }
            }
        }

        if self.options.validation {
            let fresh = {
                let AuthForm {
                    registry,
                    options,
                    cache,
                    ..
                } = self;
                let registry: &FieldRegistry = registry;
                let options: &AuthFormOptions = options;
                let key = schema_key(registry, &payload);
                let schema = cache.resolve(key, || {
                    select_schema(registry, &payload, options.custom_schema.as_ref())
                });
                schema.validate(&payload)
            };
            self.field_errors = fresh.clone();
            let merged = merge_errors(fresh, &self.injected);
            if !merged.is_empty() {
                return Err(SubmitError::ValidationFailed(merged));
            }
        }

        if let Some(handler) = &self.options.on_submit {
            handler(&payload, self.options.action).map_err(SubmitError::Handler)?;
        }

        self.values.clear_to_empty();
        self.field_errors.clear();
        Ok(payload)
    }
}

fn schema_key(registry: &FieldRegistry, values: &FormValues) -> u64 {
    let mut hasher = DefaultHasher::new();
    registry.identity_key().hash(&mut hasher);
    values.content_key().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::field::FieldKind;
    use crate::password::verify_password;

    fn default_form() -> AuthForm {
        AuthForm::new(AuthFormOptions::new("Sign In", AuthAction::SignIn)).unwrap()
    }

    fn error_map(entries: &[(&str, &str)]) -> ErrorMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_form_exposes_default_fields_with_empty_values() {
        let form = default_form();
        let names: Vec<&str> = form.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["email", "password"]);
        for (name, value) in form.values().iter() {
            assert_eq!(value, &Value::empty_text(), "{name} not empty");
        }
        assert_eq!(form.phase(), SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn bad_email_blocks_with_format_error_only() {
        let mut form = default_form();
        form.set_value("email", Value::from("bad"));
        form.set_value("password", Value::from("x"));

        let err = form.submit().await.unwrap_err();
        let map = err.field_errors().expect("validation failure");
        assert_eq!(map, &error_map(&[("email", "Invalid email format")]));
        assert_eq!(form.phase(), SubmitPhase::Failed);
    }

    #[tokio::test]
    async fn empty_fields_block_with_both_required_errors() {
        let mut form = default_form();
        let err = form.submit().await.unwrap_err();
        let map = err.field_errors().expect("validation failure");
        assert_eq!(
            map,
            &error_map(&[
                ("email", "Email is required"),
                ("password", "Password is required"),
            ])
        );
    }

    #[tokio::test]
    async fn successful_submit_calls_handler_once_and_resets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn).on_submit({
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            move |values, action| {
                calls.fetch_add(1, Ordering::SeqCst);
                *seen.lock().unwrap() = Some((values.clone(), action));
                Ok(())
            }
        });
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));

        let payload = form.submit().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(form.phase(), SubmitPhase::Succeeded);

        let (handler_values, action) = seen.lock().unwrap().take().unwrap();
        assert_eq!(handler_values, payload);
        assert_eq!(action, AuthAction::SignIn);

        // value store resets, payload snapshot keeps the submitted data
        assert_eq!(form.value("email"), Some(&Value::empty_text()));
        assert_eq!(payload.get("email"), Some(&Value::from("user@example.com")));
    }

    #[tokio::test]
    async fn sign_up_hashing_attaches_verifiable_hash_alongside_plaintext() {
        let options = AuthFormOptions::new("Sign Up", AuthAction::SignUp)
            .encrypt_password(true)
            .salt_rounds(2);
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        let first = form.submit().await.unwrap();

        let hash_a = first
            .get(HASH_PASSWORD_KEY)
            .and_then(Value::as_text)
            .expect("hashPassword attached")
            .to_string();
        assert_eq!(first.get("password"), Some(&Value::from("secret")));
        assert!(verify_password("secret", &hash_a).unwrap());

        // a second attempt salts freshly: different hash, same verification
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        let second = form.submit().await.unwrap();
        let hash_b = second
            .get(HASH_PASSWORD_KEY)
            .and_then(Value::as_text)
            .unwrap()
            .to_string();
        assert_ne!(hash_a, hash_b);
        assert!(verify_password("secret", &hash_b).unwrap());
    }

    #[tokio::test]
    async fn sign_in_never_attaches_a_hash() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn)
            .encrypt_password(true)
            .salt_rounds(2);
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        let payload = form.submit().await.unwrap();
        assert!(payload.get(HASH_PASSWORD_KEY).is_none());
    }

    #[tokio::test]
    async fn injected_errors_accumulate_across_attempts_by_default() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn)
            .validation_errors(error_map(&[("account", "Account is locked")]));
        let mut form = AuthForm::new(options).unwrap();

        let err = form.submit().await.unwrap_err();
        let map = err.field_errors().unwrap();
        assert_eq!(
            map.get("account").map(String::as_str),
            Some("Account is locked")
        );
        assert!(map.contains_key("email"));

        // resubmitting without clearing still reports the injected entry
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        let err = form.submit().await.unwrap_err();
        let map = err.field_errors().unwrap();
        assert_eq!(map, &error_map(&[("account", "Account is locked")]));
    }

    #[tokio::test]
    async fn clear_injected_errors_drops_stale_entries_per_attempt() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn)
            .validation_errors(error_map(&[("account", "Account is locked")]))
            .clear_injected_errors(true);
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        assert!(form.submit().await.is_ok());
        assert!(form.injected_errors().is_empty());
    }

    #[tokio::test]
    async fn disabled_validation_submits_anything() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn).validation(false);
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("not an email"));
        assert!(form.submit().await.is_ok());
    }

    #[tokio::test]
    async fn handler_failure_keeps_its_cause() {
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn)
            .on_submit(|_, _| Err("backend unreachable".to_string()));
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("email", Value::from("user@example.com"));
        form.set_value("password", Value::from("secret"));
        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Handler(msg) if msg == "backend unreachable"));
        assert_eq!(form.phase(), SubmitPhase::Failed);
        // failed attempts do not reset the values
        assert_eq!(form.value("email"), Some(&Value::from("user@example.com")));
    }

    #[test]
    fn set_value_dispatches_change_callback_and_live_validation() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let field = FieldDescriptor::email().on_change({
            let changes = Arc::clone(&changes);
            move |value| {
                changes.lock().unwrap().push(value.clone());
            }
        });
        let options = AuthFormOptions::new("Sign In", AuthAction::SignIn)
            .fields(vec![field, FieldDescriptor::password()]);
        let mut form = AuthForm::new(options).unwrap();

        form.set_value("email", Value::from("bad"));
        assert_eq!(changes.lock().unwrap().len(), 1);
        assert_eq!(form.field_error("email"), Some("Invalid email format"));

        form.set_value("email", Value::from("user@example.com"));
        assert_eq!(form.field_error("email"), None);
    }

    #[test]
    fn unknown_field_edits_are_ignored() {
        let mut form = default_form();
        form.set_value("no_such_field", Value::from("x"));
        assert!(form.value("no_such_field").is_none());
    }

    #[test]
    fn dynamic_path_validates_checkbox_as_boolean() {
        let options = AuthFormOptions::new("Preferences", AuthAction::SignIn).fields(vec![
            FieldDescriptor::new("nickname", FieldKind::Text),
            FieldDescriptor::new("subscribed", FieldKind::Checkbox),
        ]);
        let mut form = AuthForm::new(options).unwrap();
        form.set_value("subscribed", Value::Bool(false));
        form.validate_all();
        assert_eq!(form.field_error("subscribed"), None, "present bool passes");
        assert_eq!(
            form.field_error("nickname"),
            Some("nickname is required"),
            "empty string fails string-required"
        );
    }
}
