//! Field descriptor registry.
//!
//! Normalizes the caller-supplied descriptor list (plus any integrated,
//! externally rendered fields) into the canonical ordered set used by the
//! schema builder, the value store, and the renderer. Construction is strict:
//! duplicate or empty names and optionless selects are caller errors, nothing
//! is silently dropped.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::FormError;
use crate::field::{FieldDescriptor, FieldKind};
use crate::value::{FormValues, Value};

/// Canonical ordered field set of one form instance.
#[derive(Debug)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    /// Build a registry from caller fields followed by integrated fields,
    /// order preserved.
    pub fn new(
        fields: Vec<FieldDescriptor>,
        integrated: Vec<FieldDescriptor>,
    ) -> Result<Self, FormError> {
        let mut all = fields;
        all.extend(integrated);

        let mut seen = BTreeSet::new();
        for field in &all {
            if field.name.is_empty() {
                return Err(FormError::EmptyFieldName);
            }
            if !seen.insert(field.name.clone()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
            if let FieldKind::Select { options } = &field.kind {
                if options.is_empty() {
                    return Err(FormError::MissingOptions(field.name.clone()));
                }
            }
        }

        Ok(Self { fields: all })
    }

    /// The built-in default field set: email + password.
    pub fn with_defaults() -> Self {
        Self {
            fields: vec![FieldDescriptor::email(), FieldDescriptor::password()],
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Initial value store: every field name mapped to empty text.
    pub fn initial_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), Value::empty_text()))
            .collect()
    }

    /// Stable content hash of the field set (names, kinds, required flags,
    /// pattern sources). Half of the schema memo key; changing the descriptor
    /// list invalidates any cached schema.
    pub fn identity_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for field in &self.fields {
            field.name.hash(&mut hasher);
            kind_tag(&field.kind).hash(&mut hasher);
            if let FieldKind::Select { options } = &field.kind {
                for option in options {
                    option.value.hash(&mut hasher);
                }
            }
            field.required.hash(&mut hasher);
            if let Some(pattern) = &field.pattern {
                pattern.as_str().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

fn kind_tag(kind: &FieldKind) -> u8 {
    match kind {
        FieldKind::Text => 0,
        FieldKind::Email => 1,
        FieldKind::Password => 2,
        FieldKind::Number => 3,
        FieldKind::Checkbox => 4,
        FieldKind::Date => 5,
        FieldKind::Select { .. } => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SelectOption;

    fn custom_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("username", FieldKind::Text).required(true),
            FieldDescriptor::new("terms", FieldKind::Checkbox).label("Accept terms"),
        ]
    }

    #[test]
    fn initial_values_cover_every_field_with_empty_text() {
        let registry = FieldRegistry::new(custom_fields(), Vec::new()).unwrap();
        let values = registry.initial_values();
        let names: Vec<&str> = values.names().collect();
        assert_eq!(names, vec!["terms", "username"]);
        for (name, value) in values.iter() {
            assert_eq!(value, &Value::empty_text(), "{name} not initialized empty");
        }
    }

    #[test]
    fn defaults_are_email_then_password() {
        let registry = FieldRegistry::with_defaults();
        let names: Vec<&str> = registry.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["email", "password"]);
    }

    #[test]
    fn integrated_fields_append_after_caller_fields() {
        let integrated = vec![FieldDescriptor::new("captcha", FieldKind::Text)];
        let registry = FieldRegistry::new(custom_fields(), integrated).unwrap();
        let names: Vec<&str> = registry.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["username", "terms", "captcha"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let fields = vec![
            FieldDescriptor::new("email", FieldKind::Email),
            FieldDescriptor::new("email", FieldKind::Text),
        ];
        let err = FieldRegistry::new(fields, Vec::new()).unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(name) if name == "email"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let fields = vec![FieldDescriptor::new("", FieldKind::Text)];
        assert!(matches!(
            FieldRegistry::new(fields, Vec::new()),
            Err(FormError::EmptyFieldName)
        ));
    }

    #[test]
    fn select_without_options_is_rejected() {
        let fields = vec![FieldDescriptor::new("gender", FieldKind::Select {
            options: Vec::new(),
        })];
        let err = FieldRegistry::new(fields, Vec::new()).unwrap_err();
        assert!(matches!(err, FormError::MissingOptions(name) if name == "gender"));
    }

    #[test]
    fn identity_key_tracks_descriptor_changes() {
        let a = FieldRegistry::new(custom_fields(), Vec::new())
            .unwrap()
            .identity_key();
        let same = FieldRegistry::new(custom_fields(), Vec::new())
            .unwrap()
            .identity_key();
        assert_eq!(a, same);

        let mut changed = custom_fields();
        changed.push(FieldDescriptor::new(
            "gender",
            FieldKind::Select {
                options: vec![SelectOption::new("Male", "male")],
            },
        ));
        let b = FieldRegistry::new(changed, Vec::new()).unwrap().identity_key();
        assert_ne!(a, b);
    }
}
