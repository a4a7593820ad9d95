//! Form rendering.
//!
//! All layout and drawing for [`AuthFormWidget`]: heading, error banner,
//! social panel placement, the scrolled field window, the submit button, and
//! footer hints. Mutates only the widget's scroll bookkeeping; everything
//! else is read-only. Returns [`RenderMetrics`] for tests and debugging.

use auth_form::{IconSide, SocialPosition};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use crate::social::SocialLoginPanel;
use crate::widget::{AuthFormWidget, FocusTarget};

/// Diagnostic data produced during rendering.
#[derive(Debug, Clone)]
pub struct RenderMetrics {
    pub total_fields: usize,
    pub visible_start: usize,
    pub visible_end: usize,
    pub focused_field: Option<usize>,
    pub scroll: usize,
    pub thumb_y: Option<usize>,
    pub track_height: Option<u16>,
}

impl RenderMetrics {
    fn degenerate(total_fields: usize, scroll: usize) -> Self {
        Self {
            total_fields,
            visible_start: 0,
            visible_end: 0,
            focused_field: None,
            scroll,
            thumb_y: None,
            track_height: None,
        }
    }
}

/// Pure helper computing the vertical thumb position for the field-window
/// scrollbar.
///
/// Returns `Some(y)` with `0 <= y < track_height`, or `None` when no
/// scrollbar is needed (everything visible, degenerate sizes).
pub fn compute_scrollbar_thumb(
    total: usize,
    visible: usize,
    scroll: usize,
    track_height: u16,
) -> Option<usize> {
    if track_height == 0 {
        return None;
    }
    if total == 0 || visible == 0 || total <= visible {
        return None;
    }

    let max_thumb_y = track_height.saturating_sub(1) as usize;
    let denom = total.saturating_sub(visible).max(1);
    let ratio = (scroll as f32) / (denom as f32);
    let thumb_y = (ratio * (max_thumb_y as f32)).round() as usize;
    Some(thumb_y.min(max_thumb_y))
}

/// Render the whole form into `area`.
pub fn render_auth_form(
    widget: &mut AuthFormWidget,
    f: &mut Frame<'_>,
    area: Rect,
) -> Result<RenderMetrics> {
    let total_fields = widget.form().fields().len();
    if area.width < 5 || area.height < 5 {
        return Ok(RenderMetrics::degenerate(total_fields, widget.scroll()));
    }

    let theme = widget.theme().clone();
    let block = Block::bordered()
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(theme.roles.muted));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Reserve the bottom rows of the inner area for integrated controls.
    let control_height: u16 = {
        let names_height: u16 = widget
            .controls_mut()
            .iter()
            .map(|c| c.height())
            .sum();
        names_height.min(inner.height.saturating_sub(6))
    };
    let body = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height.saturating_sub(control_height),
    };

    widget.set_last_inner_height(body.height);
    widget.ensure_visible(body.height);
    let (start, end) = widget.visible_bounds(body.height);

    let control_names = widget.control_names();
    let focused_field = widget.focused_field_index();
    let social_focus = widget.focused_social_index();

    let mut lines: Vec<Line> = Vec::new();

    // Heading
    lines.push(Line::from(Span::styled(
        widget.form().heading().to_string(),
        Style::default()
            .fg(theme.roles.text)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw(""));

    // Error banner: generic submission failure plus injected errors
    let injected = widget.form().injected_errors();
    let has_banner = widget.banner().is_some() || !injected.is_empty();
    if let Some(banner) = widget.banner() {
        lines.push(Line::from(Span::styled(
            banner.to_string(),
            Style::default()
                .fg(theme.roles.danger)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if !injected.is_empty() {
        let joined = injected.values().cloned().collect::<Vec<_>>().join(", ");
        lines.push(Line::from(Span::styled(
            format!("Error: {joined}"),
            Style::default().fg(theme.roles.danger),
        )));
    }
    if has_banner {
        lines.push(Line::raw(""));
    }

    let social = &widget.form().options().social_login;
    if social.enabled && social.position == SocialPosition::Top {
        lines.extend(SocialLoginPanel::lines(social, social_focus, &theme));
    }

    // Field window
    for (offset, field) in widget.form().fields()[start..end].iter().enumerate() {
        let index = start + offset;
        if control_names.iter().any(|n| n == &field.name) {
            // drawn by its integrated control below the body
            continue;
        }
        let focused = focused_field == Some(index);

        let mut spans: Vec<Span> = Vec::new();
        if let Some(icon) = &field.icon {
            if icon.side == IconSide::Left {
                spans.push(Span::styled(
                    format!("{} ", icon.glyph),
                    Style::default().fg(theme.roles.accent),
                ));
            }
        }
        spans.push(Span::styled(
            format!("{}:", field.display_label()),
            Style::default().fg(theme.roles.text).add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        ));
        spans.push(Span::raw(" "));

        let editing_here = focused && widget.is_editing() && field.is_textual();
        if editing_here {
            spans.push(Span::styled(
                widget.input_value().to_string(),
                Style::default()
                    .fg(theme.roles.background)
                    .bg(theme.roles.text),
            ));
        } else {
            let display = widget.display_value(field);
            if display.is_empty() {
                spans.push(Span::styled(
                    field.placeholder.clone().unwrap_or_default(),
                    Style::default().fg(theme.roles.subtle_text),
                ));
            } else {
                let style = if focused {
                    Style::default()
                        .fg(theme.roles.background)
                        .bg(theme.roles.text)
                } else {
                    Style::default().fg(theme.roles.accent)
                };
                spans.push(Span::styled(display, style));
            }
        }

        if let Some(icon) = &field.icon {
            if icon.side == IconSide::Right {
                spans.push(Span::styled(
                    format!(" {}", icon.glyph),
                    Style::default().fg(theme.roles.accent),
                ));
            }
        }
        lines.push(Line::from(spans));

        if let Some(help) = &field.help {
            lines.push(Line::from(Span::styled(
                help.clone(),
                Style::default().fg(theme.roles.muted),
            )));
        }
        if let Some(error) = widget.form().field_error(&field.name) {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(theme.roles.danger),
            )));
        }
        lines.push(Line::raw(""));
    }

    // Submit button
    let submit_focused = widget.focus_target() == FocusTarget::Submit;
    let caption = widget.submit_caption();
    let submit_text = if widget.is_submitting() {
        format!("[ {caption}... ]")
    } else {
        format!("[ {caption} ]")
    };
    let submit_style = if widget.is_submitting() {
        Style::default().fg(theme.roles.muted)
    } else if submit_focused {
        Style::default()
            .fg(theme.roles.background)
            .bg(theme.roles.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.roles.primary)
    };
    lines.push(Line::from(Span::styled(submit_text, submit_style)));
    lines.push(Line::raw(""));

    if social.enabled && social.position == SocialPosition::Bottom {
        lines.extend(SocialLoginPanel::lines(social, social_focus, &theme));
    }

    // Footer hints
    lines.push(
        Line::from(vec![
            Span::styled("Up/Down", Style::default().fg(theme.roles.text)),
            Span::raw(": Navigate   "),
            Span::styled("Enter", Style::default().fg(theme.roles.text)),
            Span::raw(if widget.is_editing() {
                ": Confirm edit   "
            } else {
                ": Edit/Submit   "
            }),
            Span::styled("Left/Right", Style::default().fg(theme.roles.text)),
            Span::raw(": Toggle/Select   "),
            Span::styled("Esc", Style::default().fg(theme.roles.text)),
            Span::raw(": Cancel"),
        ])
        .style(Style::default().fg(theme.roles.muted)),
    );

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    f.render_widget(paragraph, body);

    // Integrated controls below the body
    if control_height > 0 {
        let focused_control = focused_field
            .and_then(|index| widget.form().fields().get(index))
            .map(|field| field.name.clone());
        let mut y = body.y + body.height;
        let max_y = inner.y + inner.height;
        for control in widget.controls_mut() {
            if y >= max_y {
                break;
            }
            let height = control.height().min(max_y - y);
            let slice = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height,
            };
            let focused = focused_control.as_deref() == Some(control.name());
            control.draw(f, slice, focused, &theme)?;
            y += height;
        }
    }

    // Scrollbar on the right edge of the body
    let visible = end.saturating_sub(start);
    let (thumb_y, track_height) = if total_fields > visible && body.width >= 1 {
        let track = Rect {
            x: body.x + body.width.saturating_sub(1),
            y: body.y,
            width: 1,
            height: body.height,
        };
        match compute_scrollbar_thumb(total_fields, visible, widget.scroll(), track.height) {
            Some(thumb) => {
                let mut track_lines: Vec<Line> = Vec::new();
                for row in 0..track.height {
                    if row as usize == thumb {
                        track_lines.push(Line::from(Span::styled(
                            "█",
                            Style::default().fg(theme.roles.subtle_text),
                        )));
                    } else {
                        track_lines.push(Line::from(Span::styled(
                            "│",
                            Style::default().fg(theme.roles.muted),
                        )));
                    }
                }
                let track_para = Paragraph::new(Text::from(track_lines)).wrap(Wrap { trim: false });
                f.render_widget(track_para, track);
                (Some(thumb), Some(track.height))
            }
            None => (None, Some(track.height)),
        }
    } else {
        (None, None)
    };

    Ok(RenderMetrics {
        total_fields,
        visible_start: start,
        visible_end: end,
        focused_field,
        scroll: widget.scroll(),
        thumb_y,
        track_height,
    })
}

#[cfg(test)]
mod tests {
    use auth_form::{AuthAction, AuthFormOptions, ErrorMap, FieldDescriptor, FieldKind};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    #[test]
    fn no_thumb_when_everything_is_visible() {
        assert_eq!(compute_scrollbar_thumb(2, 4, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(0, 4, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(4, 4, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(8, 4, 0, 0), None);
    }

    #[test]
    fn thumb_tracks_scroll_extremes() {
        assert_eq!(compute_scrollbar_thumb(10, 4, 0, 8), Some(0));
        assert_eq!(compute_scrollbar_thumb(10, 4, 6, 8), Some(7));
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_heading_fields_and_submit_caption() {
        let mut widget =
            AuthFormWidget::new(AuthFormOptions::new("Test AuthForm", AuthAction::SignIn))
                .unwrap();
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_auth_form(&mut widget, f, area).unwrap();
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Test AuthForm"));
        assert!(text.contains("Email:"));
        assert!(text.contains("Password:"));
        assert!(text.contains("[ Sign In ]"));
    }

    #[test]
    fn renders_injected_errors_as_banner() {
        let mut errors = ErrorMap::new();
        errors.insert("account".to_string(), "Account is locked".to_string());
        let options =
            AuthFormOptions::new("Sign In", AuthAction::SignIn).validation_errors(errors);
        let mut widget = AuthFormWidget::new(options).unwrap();

        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_auth_form(&mut widget, f, area).unwrap();
            })
            .unwrap();
        assert!(buffer_text(&terminal).contains("Error: Account is locked"));
    }

    #[test]
    fn tiny_areas_return_degenerate_metrics() {
        let mut widget = AuthFormWidget::new(AuthFormOptions::new(
            "Sign In",
            AuthAction::SignIn,
        ))
        .unwrap();
        let backend = TestBackend::new(4, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                let metrics = render_auth_form(&mut widget, f, area).unwrap();
                assert_eq!(metrics.visible_end, 0);
                assert_eq!(metrics.total_fields, 2);
            })
            .unwrap();
    }

    #[test]
    fn long_field_lists_produce_a_scroll_window() {
        let fields: Vec<FieldDescriptor> = (0..12)
            .map(|i| FieldDescriptor::new(format!("field_{i}"), FieldKind::Text))
            .collect();
        let options = AuthFormOptions::new("Survey", AuthAction::SignIn).fields(fields);
        let mut widget = AuthFormWidget::new(options).unwrap();

        let backend = TestBackend::new(50, 18);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                let metrics = render_auth_form(&mut widget, f, area).unwrap();
                assert!(metrics.visible_end - metrics.visible_start < metrics.total_fields);
            })
            .unwrap();
    }
}
