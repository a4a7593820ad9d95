//! Terminal widget for the auth-form engine.
//!
//! Maps each field descriptor to a terminal control, binds per-field error
//! display to the engine's error state, and forwards key events into the
//! engine (edits, toggles, submit dispatch, social provider selection). The
//! engine itself lives in the `auth_form` crate and stays UI-agnostic.

pub mod component;
pub mod render;
pub mod social;
pub mod theme;
pub mod widget;

pub use component::FormControl;
pub use render::{compute_scrollbar_thumb, render_auth_form, RenderMetrics};
pub use social::SocialLoginPanel;
pub use theme::{default_dark_theme, RoleColors, Theme};
pub use widget::{AuthFormWidget, FocusTarget, WidgetEvent};
