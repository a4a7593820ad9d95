//! Integration seam for externally rendered form controls.

use auth_form::AuthForm;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::theme::Theme;

/// An externally implemented control that participates in the form's field
/// flow: it owns one registered field, receives key events while focused,
/// and draws into the area the widget allocates for it.
///
/// Controls commit values through the passed [`AuthForm`], which keeps the
/// value store, change callbacks, and live validation on the engine's path.
pub trait FormControl {
    /// Name of the field this control owns; must match a descriptor in the
    /// form's `integrated_fields`.
    fn name(&self) -> &str;

    /// Rows the control occupies when drawn.
    fn height(&self) -> u16 {
        3
    }

    /// Handle a key while focused. Return `true` when the key was consumed.
    fn handle_key_event(&mut self, key: KeyEvent, form: &mut AuthForm) -> Result<bool>;

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, focused: bool, theme: &Theme) -> Result<()>;
}
