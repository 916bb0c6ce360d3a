use crate::nav::flatten::{field_rows, flatten_rows, FlatRow};
use crate::ui::AppState;
use crate::widgets::chrome::panel_block_themed;
use crate::widgets::form::field_line;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Block list: a header per block followed by its fields, scrolled to keep the cursor visible.
pub fn draw_formset(f: &mut Frame, area: Rect, state: &AppState, focused: bool, cursor_on: bool) {
    let theme = &state.theme;
    let rows = flatten_rows(&state.formset);
    let fields = field_rows(&rows);
    let cursor_row = fields
        .get(state.selected.min(fields.len().saturating_sub(1)))
        .copied();

    let mut lines: Vec<Line> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match row {
            FlatRow::Header { handle, removable } => {
                let Some(b) = state.formset.block(*handle) else {
                    continue;
                };
                if i > 0 {
                    lines.push(Line::from(""));
                }
                let mut spans = vec![Span::styled(
                    if *removable {
                        format!("▸ Block {}", b.index)
                    } else {
                        format!("■ Saved {}", b.index)
                    },
                    theme.block_header(*removable),
                )];
                spans.push(Span::styled(format!("  {}", b.container_id), theme.text_muted()));
                if let Some(trigger) = &b.delete_trigger {
                    spans.push(Span::styled(
                        format!("  [✕ {trigger}]"),
                        Style::default().fg(theme.error),
                    ));
                }
                lines.push(Line::from(spans));
            }
            FlatRow::Field { handle, field } => {
                let Some(fld) = state.formset.block(*handle).and_then(|b| b.fields.get(*field))
                else {
                    continue;
                };
                let selected = focused && cursor_row == Some(i);
                let editing = state
                    .editor
                    .as_ref()
                    .filter(|ed| selected && ed.handle == *handle && ed.role == fld.role);
                lines.push(field_line(fld, selected, editing, cursor_on, theme));
            }
        }
    }

    // Keep the cursor line inside the viewport; header spacing shifts line numbers.
    let viewport = area.height.saturating_sub(2) as usize;
    let cursor_line = cursor_row
        .map(|r| {
            rows[..r]
                .iter()
                .enumerate()
                .filter(|(j, row)| *j > 0 && matches!(row, FlatRow::Header { .. }))
                .count()
                + r
        })
        .unwrap_or(0);
    let scroll = if viewport == 0 {
        0
    } else {
        cursor_line.saturating_sub(viewport.saturating_sub(2))
    };

    let title = format!(
        "{} ({} blocks)",
        state.page.title,
        state.formset.bound_blocks().len() + state.formset.blocks().len()
    );
    let p = Paragraph::new(lines)
        .block(panel_block_themed(&title, focused, theme))
        .scroll((scroll as u16, 0));
    f.render_widget(p, area);
}
