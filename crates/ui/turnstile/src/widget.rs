//! Interactive auth-form widget.
//!
//! [`AuthFormWidget`] wraps an [`AuthForm`] engine instance with terminal
//! interaction state: focus and scroll bookkeeping, the editing lifecycle of
//! the line editor, key mapping, and submit dispatch. Rendering lives in
//! `render`; integrated controls hook in through [`FormControl`].

use auth_form::{
    AuthForm, AuthFormOptions, FieldDescriptor, FieldKind, FormError, FormValues, IconSide,
    SocialPosition, SubmitError, Value,
};
use chrono::NaiveDate;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::component::FormControl;
use crate::render;
use crate::social::SocialLoginPanel;
use crate::theme::Theme;

/// What the widget wants the host to know after handling an event.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Visible state changed; redraw.
    Changed,
    /// The user activated the submit button; the host should await
    /// [`AuthFormWidget::submit`].
    SubmitRequested,
    /// A submission attempt succeeded with this payload.
    Submitted(FormValues),
    /// A social provider button was activated.
    SocialSelected(String),
    /// The user dismissed the form.
    Cancelled,
}

/// One focusable stop in the widget's tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Social(usize),
    Field(usize),
    Submit,
}

pub struct AuthFormWidget {
    form: AuthForm,
    theme: Theme,
    controls: Vec<Box<dyn FormControl>>,

    // UI / navigation state
    focused: usize,
    scroll: usize,
    editing: bool,
    input: Input,
    last_inner_height: u16,
    banner: Option<String>,
}

impl AuthFormWidget {
    /// Build a widget (and its engine) from the public options surface.
    pub fn new(options: AuthFormOptions) -> Result<Self, FormError> {
        Ok(Self {
            form: AuthForm::new(options)?,
            theme: Theme::default(),
            controls: Vec::new(),
            focused: 0,
            scroll: 0,
            editing: false,
            input: Input::default(),
            last_inner_height: 0,
            banner: None,
        })
    }

    /// Override the default dark theme (the custom-styles hook).
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Attach externally rendered controls for integrated fields.
    pub fn with_controls(mut self, controls: Vec<Box<dyn FormControl>>) -> Self {
        self.controls = controls;
        self
    }

    /// Mount-time pass: validate the initial values when validation is on.
    pub fn init(&mut self) {
        self.form.validate_all();
        self.focused = 0;
        self.scroll = 0;
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AuthForm {
        &mut self.form
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_submitting(&self) -> bool {
        self.form.is_submitting()
    }

    /// Generic failure message of the latest attempt, if any.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    // --- Focus model ---------------------------------------------------------------------------

    /// Ordered tab stops: social buttons (when positioned on top), fields,
    /// submit button, social buttons (when positioned at the bottom).
    pub fn focus_stops(&self) -> Vec<FocusTarget> {
        let social = &self.form.options().social_login;
        let social_stops: Vec<FocusTarget> = (0..SocialLoginPanel::button_count(social))
            .map(FocusTarget::Social)
            .collect();
        let on_top = social.position == SocialPosition::Top;

        let mut stops = Vec::new();
        if on_top {
            stops.extend(social_stops.iter().copied());
        }
        stops.extend((0..self.form.fields().len()).map(FocusTarget::Field));
        stops.push(FocusTarget::Submit);
        if !on_top {
            stops.extend(social_stops);
        }
        stops
    }

    pub fn focus_target(&self) -> FocusTarget {
        self.focus_stops()
            .get(self.focused)
            .copied()
            .unwrap_or(FocusTarget::Submit)
    }

    pub(crate) fn focused_field_index(&self) -> Option<usize> {
        match self.focus_target() {
            FocusTarget::Field(index) => Some(index),
            _ => None,
        }
    }

    pub(crate) fn focused_social_index(&self) -> Option<usize> {
        match self.focus_target() {
            FocusTarget::Social(index) => Some(index),
            _ => None,
        }
    }

    fn focus_next(&mut self) {
        self.blur_current();
        let len = self.focus_stops().len();
        if len == 0 {
            return;
        }
        self.focused = (self.focused + 1) % len;
    }

    fn focus_prev(&mut self) {
        self.blur_current();
        let len = self.focus_stops().len();
        if len == 0 {
            return;
        }
        if self.focused == 0 {
            self.focused = len - 1;
        } else {
            self.focused -= 1;
        }
    }

    /// Blur validation for the field losing focus.
    fn blur_current(&mut self) {
        if let Some(index) = self.focused_field_index() {
            if let Some(name) = self.form.fields().get(index).map(|f| f.name.clone()) {
                self.form.validate_field(&name);
            }
        }
    }

    // --- Scroll window (fields only) -----------------------------------------------------------

    fn max_visible_fields(&self, inner_height: u16) -> usize {
        let reserve = if inner_height > 12 { 8 } else { 4 };
        let rows = inner_height.saturating_sub(reserve).max(3) as usize;
        (rows / 3).max(1)
    }

    pub(crate) fn visible_bounds(&self, inner_height: u16) -> (usize, usize) {
        let total = self.form.fields().len();
        if total == 0 {
            return (0, 0);
        }
        let max_visible = self.max_visible_fields(inner_height);
        let anchor = self.focused_field_index().unwrap_or(self.scroll);
        let start = self.scroll.min(anchor).min(total.saturating_sub(1));
        let end = (start + max_visible).min(total);
        (start, end)
    }

    pub(crate) fn ensure_visible(&mut self, inner_height: u16) {
        let max_visible = self.max_visible_fields(inner_height);
        if let Some(index) = self.focused_field_index() {
            if index < self.scroll {
                self.scroll = index;
            } else if index >= self.scroll + max_visible {
                self.scroll = index + 1 - max_visible;
            }
        }
    }

    pub(crate) fn scroll(&self) -> usize {
        self.scroll
    }

    pub(crate) fn set_last_inner_height(&mut self, height: u16) {
        self.last_inner_height = height;
    }

    /// Page-size jump derived from the last rendered window.
    fn page_jump(&self) -> usize {
        self.max_visible_fields(self.last_inner_height)
            .saturating_sub(1)
            .max(1)
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn input_value(&self) -> &str {
        self.input.value()
    }

    // --- Editing lifecycle ---------------------------------------------------------------------

    fn start_editing(&mut self, index: usize) {
        let Some(field) = self.form.fields().get(index) else {
            return;
        };
        if !field.is_textual() {
            return;
        }
        let existing = self.editable_text(field);
        self.editing = true;
        self.input = Input::default().with_value(existing);
    }

    fn cancel_editing(&mut self) {
        self.editing = false;
        self.input = Input::default();
    }

    fn commit_editing(&mut self) {
        let committed = self.input.value().to_string();
        self.editing = false;
        self.input = Input::default();

        let Some(index) = self.focused_field_index() else {
            return;
        };
        let Some(field) = self.form.fields().get(index) else {
            return;
        };
        let name = field.name.clone();
        let value = parse_committed(&field.kind, committed);
        self.form.set_value(&name, value);
    }

    /// Raw editable text of a field's current value.
    fn editable_text(&self, field: &FieldDescriptor) -> String {
        match self.form.value(&field.name) {
            Some(Value::Text(text)) => text.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Date(d)) => d.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }

    // --- Toggles & cycling ---------------------------------------------------------------------

    fn toggle_checkbox(&mut self, index: usize) {
        let Some(name) = self.form.fields().get(index).map(|f| f.name.clone()) else {
            return;
        };
        let current = matches!(self.form.value(&name), Some(Value::Bool(true)));
        self.form.set_value(&name, Value::Bool(!current));
    }

    fn cycle_select(&mut self, index: usize, dir: i32) {
        let (name, options) = match self.form.fields().get(index) {
            Some(field) => match &field.kind {
                FieldKind::Select { options } => (field.name.clone(), options.clone()),
                _ => return,
            },
            None => return,
        };
        if options.is_empty() {
            return;
        }
        let current = self
            .form
            .value(&name)
            .and_then(Value::as_text)
            .unwrap_or("");
        let len = options.len() as i32;
        // the unset (blank) state enters the list from whichever end matches
        // the cycling direction
        let idx = options
            .iter()
            .position(|o| o.value == current)
            .map(|p| p as i32)
            .unwrap_or(if dir > 0 { -1 } else { 0 });
        let next = (idx + dir).rem_euclid(len) as usize;
        self.form
            .set_value(&name, Value::from(options[next].value.as_str()));
    }

    // --- Display helpers used by the renderer --------------------------------------------------

    pub(crate) fn display_value(&self, field: &FieldDescriptor) -> String {
        match &field.kind {
            FieldKind::Password => {
                let len = self
                    .form
                    .value(&field.name)
                    .and_then(Value::as_text)
                    .map(str::len)
                    .unwrap_or(0);
                "•".repeat(len)
            }
            FieldKind::Checkbox => {
                if matches!(self.form.value(&field.name), Some(Value::Bool(true))) {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            FieldKind::Select { options } => {
                let current = self
                    .form
                    .value(&field.name)
                    .and_then(Value::as_text)
                    .unwrap_or("");
                if current.is_empty() {
                    format!("Select {}", field.name)
                } else {
                    options
                        .iter()
                        .find(|o| o.value == current)
                        .map(|o| o.label.clone())
                        .unwrap_or_else(|| current.to_string())
                }
            }
            _ => self.editable_text(field),
        }
    }

    pub(crate) fn submit_caption(&self) -> String {
        let action = self.form.action().to_string();
        let options = self.form.options();
        match (&options.submit_icon, options.submit_icon_side) {
            (Some(icon), IconSide::Left) => format!("{icon} {action}"),
            (Some(icon), IconSide::Right) => format!("{action} {icon}"),
            (None, _) => action,
        }
    }

    // --- Event handling ------------------------------------------------------------------------

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<WidgetEvent>> {
        // Editing mode captures everything except commit/cancel.
        if self.editing {
            return match key.code {
                KeyCode::Enter => {
                    self.commit_editing();
                    Ok(Some(WidgetEvent::Changed))
                }
                KeyCode::Esc => {
                    self.cancel_editing();
                    Ok(Some(WidgetEvent::Changed))
                }
                _ => {
                    self.input.handle_event(&crossterm::event::Event::Key(key));
                    Ok(Some(WidgetEvent::Changed))
                }
            };
        }

        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.focus_prev();
                Ok(Some(WidgetEvent::Changed))
            }
            KeyCode::Down | KeyCode::Tab => {
                self.focus_next();
                Ok(Some(WidgetEvent::Changed))
            }
            KeyCode::PageDown => {
                for _ in 0..self.page_jump() {
                    self.focus_next();
                }
                Ok(Some(WidgetEvent::Changed))
            }
            KeyCode::PageUp => {
                for _ in 0..self.page_jump() {
                    self.focus_prev();
                }
                Ok(Some(WidgetEvent::Changed))
            }
            _ => {
                // integrated controls get the key before built-in handling
                if self.route_to_control(key)? {
                    return Ok(Some(WidgetEvent::Changed));
                }
                self.handle_interaction_key(key)
            }
        }
    }

    fn handle_interaction_key(&mut self, key: KeyEvent) -> Result<Option<WidgetEvent>> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                if let FocusTarget::Field(index) = self.focus_target() {
                    let kind = self.form.fields().get(index).map(|f| f.kind.clone());
                    match kind {
                        Some(FieldKind::Checkbox) => {
                            self.toggle_checkbox(index);
                            return Ok(Some(WidgetEvent::Changed));
                        }
                        Some(FieldKind::Select { .. }) => {
                            let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                            self.cycle_select(index, dir);
                            return Ok(Some(WidgetEvent::Changed));
                        }
                        _ => {}
                    }
                }
                Ok(None)
            }
            KeyCode::Enter => match self.focus_target() {
                FocusTarget::Field(index) => {
                    let kind = self.form.fields().get(index).map(|f| f.kind.clone());
                    match kind {
                        Some(FieldKind::Checkbox) => {
                            self.toggle_checkbox(index);
                            Ok(Some(WidgetEvent::Changed))
                        }
                        Some(FieldKind::Select { .. }) => {
                            self.cycle_select(index, 1);
                            Ok(Some(WidgetEvent::Changed))
                        }
                        Some(_) => {
                            self.start_editing(index);
                            Ok(Some(WidgetEvent::Changed))
                        }
                        None => Ok(None),
                    }
                }
                FocusTarget::Submit => {
                    if self.form.is_submitting() {
                        Ok(None)
                    } else {
                        Ok(Some(WidgetEvent::SubmitRequested))
                    }
                }
                FocusTarget::Social(index) => {
                    let name =
                        SocialLoginPanel::activate(&self.form.options().social_login, index);
                    Ok(name.map(WidgetEvent::SocialSelected))
                }
            },
            KeyCode::Esc => Ok(Some(WidgetEvent::Cancelled)),
            _ => Ok(None),
        }
    }

    fn route_to_control(&mut self, key: KeyEvent) -> Result<bool> {
        let Some(index) = self.focused_field_index() else {
            return Ok(false);
        };
        let Some(name) = self.form.fields().get(index).map(|f| f.name.clone()) else {
            return Ok(false);
        };
        let Some(control) = self.controls.iter_mut().find(|c| c.name() == name) else {
            return Ok(false);
        };
        control.handle_key_event(key, &mut self.form)
    }

    pub(crate) fn control_names(&self) -> Vec<String> {
        self.controls.iter().map(|c| c.name().to_string()).collect()
    }

    pub(crate) fn controls_mut(&mut self) -> &mut [Box<dyn FormControl>] {
        &mut self.controls
    }

    // --- Submission ----------------------------------------------------------------------------

    /// Run one submission attempt through the engine. Failures are absorbed
    /// into the widget's banner state; successes surface the payload.
    pub async fn submit(&mut self) -> Option<WidgetEvent> {
        self.banner = None;
        match self.form.submit().await {
            Ok(payload) => Some(WidgetEvent::Submitted(payload)),
            Err(SubmitError::AlreadySubmitting) => None,
            Err(err) => {
                self.banner = Some(err.user_message().to_string());
                tracing::warn!(error = %err, "widget submission failed");
                Some(WidgetEvent::Changed)
            }
        }
    }

    /// Draw the whole form; delegates to the renderer.
    pub fn draw(
        &mut self,
        f: &mut ratatui::Frame<'_>,
        area: ratatui::layout::Rect,
    ) -> Result<render::RenderMetrics> {
        render::render_auth_form(self, f, area)
    }
}

fn parse_committed(kind: &FieldKind, raw: String) -> Value {
    match kind {
        FieldKind::Number => raw
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Text(raw)),
        FieldKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .unwrap_or(Value::Text(raw)),
        _ => Value::Text(raw),
    }
}
