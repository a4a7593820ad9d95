//! Social login panel.
//!
//! Purely presentational: renders one button per configured provider and, on
//! activation, invokes the selection callback with the resolved provider
//! name. Focus bookkeeping lives with the owning widget; the panel itself
//! holds no state.

use auth_form::SocialLoginOptions;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Theme;

pub struct SocialLoginPanel;

impl SocialLoginPanel {
    /// Number of focusable buttons the panel contributes.
    pub fn button_count(social: &SocialLoginOptions) -> usize {
        if social.enabled {
            social.providers.len()
        } else {
            0
        }
    }

    /// Activate the button at `index`: invoke the callback with the
    /// provider's resolved name and return that name.
    pub fn activate(social: &SocialLoginOptions, index: usize) -> Option<String> {
        let provider = social.providers.get(index)?;
        let name = provider.name().to_string();
        if let Some(on_select) = &social.on_select {
            on_select(&name);
        }
        tracing::debug!(provider = %name, "social login selected");
        Some(name)
    }

    /// Caption of the button at `index`.
    pub fn caption(social: &SocialLoginOptions, index: usize) -> Option<String> {
        let provider = social.providers.get(index)?;
        Some(match provider.icon() {
            Some(icon) => format!("{icon} Sign in with {}", provider.name()),
            None => format!("Sign in with {}", provider.name()),
        })
    }

    /// Rows the panel occupies (one per button plus a spacer).
    pub fn height(social: &SocialLoginOptions) -> u16 {
        let buttons = Self::button_count(social) as u16;
        if buttons == 0 { 0 } else { buttons + 1 }
    }

    /// Build the panel's display lines; `focused` highlights one button.
    pub fn lines(
        social: &SocialLoginOptions,
        focused: Option<usize>,
        theme: &Theme,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for index in 0..Self::button_count(social) {
            let Some(caption) = Self::caption(social, index) else {
                continue;
            };
            let style = if focused == Some(index) {
                Style::default()
                    .fg(theme.roles.background)
                    .bg(theme.roles.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.roles.accent)
            };
            lines.push(Line::from(Span::styled(format!("[ {caption} ]"), style)));
        }
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use auth_form::{SocialLoginOptions, SocialProvider};

    use super::*;

    fn panel_options(selected: Arc<Mutex<Vec<String>>>) -> SocialLoginOptions {
        SocialLoginOptions::new(vec![
            SocialProvider::from("Google"),
            SocialProvider::Custom {
                name: "Facebook".to_string(),
                icon: "f".to_string(),
            },
        ])
        .on_select(move |name| selected.lock().unwrap().push(name.to_string()))
    }

    #[test]
    fn string_provider_activates_with_its_name() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let social = panel_options(Arc::clone(&selected));
        assert_eq!(
            SocialLoginPanel::activate(&social, 0),
            Some("Google".to_string())
        );
        assert_eq!(selected.lock().unwrap().as_slice(), ["Google"]);
    }

    #[test]
    fn object_provider_activates_with_its_name_field() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let social = panel_options(Arc::clone(&selected));
        assert_eq!(
            SocialLoginPanel::activate(&social, 1),
            Some("Facebook".to_string())
        );
        assert_eq!(selected.lock().unwrap().as_slice(), ["Facebook"]);
    }

    #[test]
    fn activation_out_of_range_is_a_no_op() {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let social = panel_options(Arc::clone(&selected));
        assert_eq!(SocialLoginPanel::activate(&social, 9), None);
        assert!(selected.lock().unwrap().is_empty());
    }

    #[test]
    fn captions_include_icon_glyph_when_present() {
        let social = SocialLoginOptions::new(vec![
            SocialProvider::from("Google"),
            SocialProvider::Custom {
                name: "Facebook".to_string(),
                icon: "f".to_string(),
            },
        ]);
        assert_eq!(
            SocialLoginPanel::caption(&social, 0).unwrap(),
            "Sign in with Google"
        );
        assert_eq!(
            SocialLoginPanel::caption(&social, 1).unwrap(),
            "f Sign in with Facebook"
        );
    }

    #[test]
    fn disabled_panel_contributes_no_buttons() {
        let mut social = SocialLoginOptions::new(vec![SocialProvider::from("Google")]);
        social.enabled = false;
        assert_eq!(SocialLoginPanel::button_count(&social), 0);
        assert_eq!(SocialLoginPanel::height(&social), 0);
    }
}
