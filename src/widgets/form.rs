use crate::formset::{BlockField, BlockHandle, FieldKind};
use ratatui::crossterm::event as rt_event;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tui_textarea::TextArea;

pub const TEXTAREA_PREVIEW_LINES: usize = 3;

pub enum EditorKind {
    Line(String),
    Area(Box<TextArea<'static>>),
}

/// In-progress edit of one field. Bound to the block handle, so it survives renumbering.
pub struct FieldEditor {
    pub handle: BlockHandle,
    pub role: String,
    pub label: String,
    pub kind: EditorKind,
}

impl FieldEditor {
    /// Selects are cycled in place and have no editor.
    pub fn open(handle: BlockHandle, field: &BlockField) -> Option<Self> {
        let kind = match &field.kind {
            FieldKind::Select { .. } => return None,
            FieldKind::TextArea => {
                let mut ta = TextArea::default();
                if !field.value.is_empty() {
                    ta.insert_str(&field.value);
                }
                EditorKind::Area(Box::new(ta))
            }
            FieldKind::Input | FieldKind::File => EditorKind::Line(field.value.clone()),
        };
        Some(Self {
            handle,
            role: field.role.clone(),
            label: field.label.clone(),
            kind,
        })
    }

    pub fn is_area(&self) -> bool {
        matches!(self.kind, EditorKind::Area(_))
    }

    pub fn text(&self) -> String {
        match &self.kind {
            EditorKind::Line(s) => s.clone(),
            EditorKind::Area(ta) => ta.lines().join("\n"),
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let EditorKind::Line(s) = &mut self.kind {
            s.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let EditorKind::Line(s) = &mut self.kind {
            s.pop();
        }
    }

    pub fn area_input(&mut self, key: rt_event::KeyEvent) {
        if let EditorKind::Area(ta) = &mut self.kind {
            let _ = ta.input(key);
        }
    }
}

/// Next option of a select, wrapping; an unknown current value starts from the edge.
pub fn cycle_option(options: &[String], current: &str, delta: i32) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let n = options.len() as i64;
    let next = match options.iter().position(|o| o == current) {
        Some(i) => (i as i64 + delta as i64).rem_euclid(n),
        None if delta < 0 => n - 1,
        None => 0,
    };
    options.get(next as usize).cloned()
}

pub fn display_value(field: &BlockField) -> String {
    match &field.kind {
        FieldKind::Select { .. } => {
            if field.value.is_empty() {
                "‹ none ›".to_string()
            } else {
                format!("‹ {} ›", field.value)
            }
        }
        FieldKind::File => {
            if field.value.is_empty() {
                "(no file chosen)".to_string()
            } else {
                field.value.clone()
            }
        }
        FieldKind::TextArea => {
            let total = field.value.lines().count();
            let mut shown: Vec<&str> = field.value.lines().take(TEXTAREA_PREVIEW_LINES).collect();
            if total > TEXTAREA_PREVIEW_LINES {
                shown.push("…");
            }
            shown.join(" ⏎ ")
        }
        FieldKind::Input => field.value.clone(),
    }
}

/// Field line: `› Label [identifier]: value`.
pub fn field_line<'a>(
    field: &BlockField,
    selected: bool,
    editing: Option<&FieldEditor>,
    cursor_on: bool,
    theme: &crate::theme::Theme,
) -> Line<'a> {
    let sel = if selected { '›' } else { ' ' };
    let mut val = match editing {
        Some(ed) if !ed.is_area() => ed.text(),
        _ => display_value(field),
    };
    if editing.is_some() && cursor_on {
        val.push('▏');
    }
    let value_style = if selected {
        if editing.is_some() {
            theme.text_editing_bold()
        } else {
            theme.text_active_bold()
        }
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::raw(format!("  {sel} {} ", field.label)),
        Span::styled(format!("[{}]", field.identifier), theme.text_muted()),
        Span::raw(": "),
        Span::styled(val, value_style),
    ])
}

/// Modal for textarea fields; Ctrl+S saves, Esc cancels.
pub fn draw_textarea_modal(f: &mut Frame, area: Rect, editor: &mut FieldEditor) {
    let label = editor.label.clone();
    if let EditorKind::Area(ta) = &mut editor.kind {
        ta.set_block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Editing: {label} — Ctrl+S Save • Esc Cancel")),
        );
        let rect = centered_rect(80, 70, area);
        f.render_widget(Clear, rect);
        f.render_widget(&**ta, rect);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);
    let h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(v[1]);
    h[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, value: &str) -> BlockField {
        BlockField {
            role: "r".into(),
            label: "R".into(),
            kind,
            identifier: "id_ns-0-r".into(),
            name: "ns-0-r".into(),
            label_for: "id_ns-0-r".into(),
            value: value.into(),
        }
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let opts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(cycle_option(&opts, "c", 1).as_deref(), Some("a"));
        assert_eq!(cycle_option(&opts, "a", -1).as_deref(), Some("c"));
        assert_eq!(cycle_option(&opts, "", 1).as_deref(), Some("a"));
        assert_eq!(cycle_option(&opts, "", -1).as_deref(), Some("c"));
        assert_eq!(cycle_option(&[], "", 1), None);
    }

    #[test]
    fn editors_follow_field_kind() {
        let h = BlockHandle(0);
        assert!(FieldEditor::open(h, &field(FieldKind::Select { options: vec![] }, "")).is_none());

        let mut line = FieldEditor::open(h, &field(FieldKind::Input, "BS")).unwrap();
        line.push_char('c');
        line.backspace();
        line.push_char('c');
        assert_eq!(line.text(), "BSc");

        let area = FieldEditor::open(h, &field(FieldKind::TextArea, "one\ntwo")).unwrap();
        assert!(area.is_area());
        assert_eq!(area.text(), "one\ntwo");
    }

    #[test]
    fn textarea_preview_is_folded() {
        let f = field(FieldKind::TextArea, "1\n2\n3\n4\n5");
        assert_eq!(display_value(&f), "1 ⏎ 2 ⏎ 3 ⏎ …");
        let f = field(FieldKind::File, "");
        assert_eq!(display_value(&f), "(no file chosen)");
    }
}
