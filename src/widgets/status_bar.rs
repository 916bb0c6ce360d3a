use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::formset::ident::management_name;
use crate::ui::{AppState, ToastLevel};

/// One-line footer: spinner, toast, management counters, then key help.
pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let theme = &state.theme;
    let mut spans: Vec<Span> = Vec::new();
    if let Some(msg) = &state.status_text {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][state.tick as usize % 6];
        spans.push(Span::raw(format!(" {spinner} {msg}")));
        spans.push(Span::raw("  |  "));
    }
    let record = state.formset.record();
    let ns = state.formset.namespace();
    spans.push(Span::styled(
        format!(
            " blocks: {}  {}={} {}={}",
            state.formset.bound_blocks().len() + state.formset.blocks().len(),
            management_name(ns, "TOTAL_FORMS"),
            record.total_count,
            management_name(ns, "MIN_NUM_FORMS"),
            record.min_required_count
        ),
        Style::default().fg(theme.secondary),
    ));
    spans.push(Span::raw("  |  "));
    if let Some(t) = &state.toast {
        let color = theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    spans.push(Span::styled(help_text.to_string(), theme.text_muted()));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}
