use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::ui::AppState;
use crate::widgets::chrome::panel_block_themed;

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let source = state
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(inline)".to_string());
    let line = Line::from(vec![
        Span::styled(
            state.page.title.clone(),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("namespace: {}", state.formset.namespace()),
            Style::default().fg(theme.secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                "next index: {}  template: {}",
                state.formset.next_index(),
                state.formset.template().placeholder()
            ),
            theme.text_muted(),
        ),
        Span::raw("  "),
        Span::styled(source, theme.text_muted()),
    ]);
    let p = Paragraph::new(line).block(panel_block_themed("formset-tui", false, theme));
    f.render_widget(p, area);
}
