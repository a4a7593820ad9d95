//! Core engine of the auth-form widget.
//!
//! Given a declarative field list, the engine normalizes it into a canonical
//! registry, derives a validation schema (statically for known fields,
//! dynamically from runtime value kinds for fully custom sets), and runs the
//! submission pipeline: optional password hashing, non-aborting validation,
//! error merging, and dispatch to the caller's submit handler.
//!
//! Rendering is out of scope; see the `turnstile` crate for the terminal
//! widget built on top of this engine.

pub mod error;
pub mod field;
pub mod form;
pub mod options;
pub mod password;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{merge_errors, ErrorMap, FormError, PasswordHashError, SubmitError};
pub use field::{FieldDescriptor, FieldIcon, FieldKind, IconSide, SelectOption};
pub use form::{AuthForm, SubmitPhase, HASH_PASSWORD_KEY};
pub use options::{
    AuthAction, AuthFormOptions, SocialLoginOptions, SocialPosition, SocialProvider,
};
pub use password::{hash_password, verify_password, DEFAULT_SALT_ROUNDS};
pub use registry::FieldRegistry;
pub use schema::{
    default_schema, email_schema, infer_schema, select_schema, Rule, SchemaCache, SchemaFactory,
    ValidationSchema, EMAIL_PATTERN,
};
pub use value::{FormValues, Value, ValueKind};
