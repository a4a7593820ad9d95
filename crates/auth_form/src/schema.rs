//! Validation schema builder and executor.
//!
//! A [`ValidationSchema`] maps field names to ordered rule lists. Rules are
//! typed variants (required-of-kind, pattern, membership, nested shape);
//! free-form inference from runtime value kinds ([`infer_schema`]) is the
//! lowest-priority fallback for fully custom field sets, not the load-bearing
//! mechanism.
//!
//! Schema selection precedence ([`select_schema`]):
//! 1. caller-supplied factory, with the fixed email rule merged in whenever
//!    the field set contains `email`
//! 2. built-in email+password default
//! 3. email-only rule
//! 4. runtime inference over the current values
//!
//! Execution is non-aborting: every field is checked and contributes its
//! first failing rule's message, so one pass yields the complete error map.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ErrorMap;
use crate::registry::FieldRegistry;
use crate::value::{FormValues, Value, ValueKind};

/// The fixed email format pattern merged into every schema that covers an
/// `email` field.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// A single validation rule. Rules run in order; the first failure per field
/// wins.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present (non-null) and of the given kind; text must be
    /// non-empty. `ValueKind::Null` means "any non-null value".
    Required { kind: ValueKind, message: String },
    /// Non-empty text must match the pattern. Empty text passes; pair with a
    /// `Required` rule to also reject emptiness.
    Pattern { regex: Regex, message: String },
    /// Text value must be one of the allowed entries (select membership).
    OneOf { allowed: Vec<String>, message: String },
    /// Value must be an object validating against the inner schema; inner
    /// failures surface under dotted `parent.child` keys.
    Nested(ValidationSchema),
}

impl Rule {
    pub fn required(kind: ValueKind, message: impl Into<String>) -> Self {
        Rule::Required {
            kind,
            message: message.into(),
        }
    }

    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn one_of(allowed: Vec<String>, message: impl Into<String>) -> Self {
        Rule::OneOf {
            allowed,
            message: message.into(),
        }
    }

    pub fn nested(schema: ValidationSchema) -> Self {
        Rule::Nested(schema)
    }

    /// Check a scalar rule against a field's current value. `Nested` is
    /// handled by the schema executor, which needs map access.
    fn check(&self, value: Option<&Value>) -> Result<(), String> {
        match self {
            Rule::Required { kind, message } => {
                let value = match value {
                    None | Some(Value::Null) => return Err(message.clone()),
                    Some(v) => v,
                };
                match kind {
                    ValueKind::Null => Ok(()),
                    ValueKind::Text => match value.as_text() {
                        Some(text) if !text.is_empty() => Ok(()),
                        _ => Err(message.clone()),
                    },
                    expected => {
                        if value.kind() == *expected {
                            Ok(())
                        } else {
                            Err(message.clone())
                        }
                    }
                }
            }
            Rule::Pattern { regex, message } => match value {
                Some(Value::Text(text)) => {
                    if text.is_empty() || regex.is_match(text) {
                        Ok(())
                    } else {
                        Err(message.clone())
                    }
                }
                None | Some(Value::Null) => Ok(()),
                Some(_) => Err(message.clone()),
            },
            Rule::OneOf { allowed, message } => match value.and_then(Value::as_text) {
                Some(text) if allowed.iter().any(|a| a == text) => Ok(()),
                _ => Err(message.clone()),
            },
            Rule::Nested(_) => Ok(()),
        }
    }
}

/// Composable per-field rule lists.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: BTreeMap<String, Vec<Rule>>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one rule to a field (builder style).
    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.entry(field.into()).or_default().push(rule);
        self
    }

    /// Merge another schema on top: its rules are appended after any already
    /// present for the same field, so both sets run.
    pub fn concat(mut self, other: ValidationSchema) -> Self {
        for (field, rules) in other.rules {
            self.rules.entry(field).or_default().extend(rules);
        }
        self
    }

    pub fn rules_for(&self, field: &str) -> Option<&[Rule]> {
        self.rules.get(field).map(|r| r.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Run the whole schema, non-aborting: every field contributes its first
    /// failing rule.
    pub fn validate(&self, values: &FormValues) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for (field, rules) in &self.rules {
            check_field(field, rules, values.get(field), &mut errors);
        }
        errors
    }

    /// Run only the rules of one field (live validation on change/blur).
    /// Nested failures surface under dotted keys as in [`Self::validate`].
    pub fn validate_field(&self, field: &str, values: &FormValues) -> ErrorMap {
        let mut errors = ErrorMap::new();
        if let Some(rules) = self.rules.get(field) {
            check_field(field, rules, values.get(field), &mut errors);
        }
        errors
    }
}

fn check_field(field: &str, rules: &[Rule], value: Option<&Value>, errors: &mut ErrorMap) {
    for rule in rules {
        match rule {
            Rule::Nested(schema) => match value {
                Some(Value::Object(map)) => {
                    let mut inner = ErrorMap::new();
                    for (name, inner_rules) in &schema.rules {
                        check_field(name, inner_rules, map.get(name), &mut inner);
                    }
                    if !inner.is_empty() {
                        for (key, message) in inner {
                            errors.insert(format!("{field}.{key}"), message);
                        }
                        return;
                    }
                }
                _ => {
                    errors.insert(field.to_string(), format!("{field} is required"));
                    return;
                }
            },
            scalar => {
                if let Err(message) = scalar.check(value) {
                    errors.insert(field.to_string(), message);
                    return;
                }
            }
        }
    }
}

/// The email rules shared by the default schema, the email-only path, and the
/// forced merge into custom schemas.
pub fn email_schema() -> ValidationSchema {
    ValidationSchema::new()
        .rule("email", Rule::required(ValueKind::Text, "Email is required"))
        .rule(
            "email",
            Rule::pattern(email_regex().clone(), "Invalid email format"),
        )
}

/// Built-in default: email (required + format) and password (required).
pub fn default_schema() -> ValidationSchema {
    email_schema().rule(
        "password",
        Rule::required(ValueKind::Text, "Password is required"),
    )
}

/// Best-effort schema inference from the runtime kinds of the current
/// values: one required-of-kind rule per field, recursing into objects.
/// Cannot express per-field custom rules (length, membership, patterns) —
/// a known limitation of the fallback path.
pub fn infer_schema(values: &FormValues) -> ValidationSchema {
    let mut schema = ValidationSchema::new();
    for (name, value) in values.iter() {
        schema = schema.rule(name, infer_rule(name, value));
    }
    schema
}

fn infer_rule(name: &str, value: &Value) -> Rule {
    match value {
        Value::Object(map) => {
            let mut nested = ValidationSchema::new();
            for (key, inner) in map {
                nested = nested.rule(key, infer_rule(key, inner));
            }
            Rule::nested(nested)
        }
        scalar => Rule::required(scalar.kind(), format!("{name} is required")),
    }
}

/// Factory supplied by the caller to produce a base schema from the current
/// values.
pub type SchemaFactory = Box<dyn Fn(&FormValues) -> ValidationSchema + Send + Sync>;

/// Resolve the one schema used for both live and submit-time validation.
pub fn select_schema(
    registry: &FieldRegistry,
    values: &FormValues,
    custom: Option<&SchemaFactory>,
) -> ValidationSchema {
    let has_email = registry.contains("email");
    let has_password = registry.contains("password");

    if let Some(factory) = custom {
        let mut schema = factory(values);
        if has_email {
            // merged unconditionally, regardless of what the factory encodes
            schema = schema.concat(email_schema());
        }
        tracing::debug!(has_email, "using caller-supplied validation schema");
        return schema;
    }
    if has_email && has_password {
        tracing::debug!("using built-in email+password schema");
        return default_schema();
    }
    if has_email {
        tracing::debug!("using email-only schema");
        return email_schema();
    }
    tracing::debug!(fields = values.len(), "inferring schema from value kinds");
    infer_schema(values)
}

/// Single-slot schema memo keyed by the registry/values identity. Replaces
/// render-lifecycle memoization with an explicit content key.
#[derive(Debug, Default)]
pub struct SchemaCache {
    key: Option<u64>,
    schema: ValidationSchema,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema for `key`, rebuilding only when the key
    /// changed since the last resolve.
    pub fn resolve(
        &mut self,
        key: u64,
        build: impl FnOnce() -> ValidationSchema,
    ) -> &ValidationSchema {
        if self.key != Some(key) {
            tracing::debug!(key, "rebuilding validation schema");
            self.schema = build();
            self.key = Some(key);
        }
        &self.schema
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
