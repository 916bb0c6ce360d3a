use crate::widgets::chrome::panel_block;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Scrollable read-only view of pretty JSON (the payload, or a submit reply).
pub struct JsonViewerWidget {
    pub title: String,
    pub text: String,
    pub scroll_y: u16,
    pub wrap: bool,
    last_viewport_h: u16,
}

impl JsonViewerWidget {
    pub fn from_text(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            scroll_y: 0,
            wrap: false,
            last_viewport_h: 0,
        }
    }

    /// Replace the content. Scroll is kept while the title stays the same.
    pub fn set_text(&mut self, title: impl Into<String>, text: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.scroll_y = 0;
        }
        self.title = title;
        self.text = text.into();
    }
}

impl crate::widgets::Widget for JsonViewerWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        let lines: Vec<Line> = self
            .text
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        // viewport
        self.last_viewport_h = area.height.saturating_sub(2);
        let total_lines = lines.len() as u16;
        let max_scroll = total_lines.saturating_sub(self.last_viewport_h);
        if self.scroll_y > max_scroll {
            self.scroll_y = max_scroll;
        }
        let block = panel_block(&self.title, focused);
        let p = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: !self.wrap })
            .scroll((self.scroll_y, 0));
        f.render_widget(p, area);
    }
    fn on_key(&mut self, key: KeyCode) -> Vec<crate::app::Effect> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_y = self.scroll_y.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_y = self.scroll_y.saturating_add(1);
            }
            KeyCode::PageUp => {
                let step = self.last_viewport_h;
                self.scroll_y = self.scroll_y.saturating_sub(step);
            }
            KeyCode::PageDown => {
                let step = self.last_viewport_h;
                self.scroll_y = self.scroll_y.saturating_add(step);
            }
            KeyCode::Home => {
                self.scroll_y = 0;
            }
            KeyCode::End => {
                let total = self.text.lines().count() as u16;
                self.scroll_y = total.saturating_sub(self.last_viewport_h);
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.wrap = !self.wrap;
            }
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Widget; // bring trait in scope for render/on_key
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn end_jumps_to_bottom_and_w_toggles_wrap() {
        let text = (0..30)
            .map(|i| format!("line-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut w = JsonViewerWidget::from_text("Payload", text);
        let backend = TestBackend::new(40, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let _ = terminal.draw(|f| {
            let area = ratatui::layout::Rect {
                x: 0,
                y: 0,
                width: 40,
                height: 12,
            };
            w.render(f, area, true, 0);
        });
        let _ = w.on_key(KeyCode::End);
        assert_eq!(w.scroll_y, 30 - 10);
        assert!(!w.wrap);
        let _ = w.on_key(KeyCode::Char('w'));
        assert!(w.wrap);
    }

    #[test]
    fn retitling_resets_scroll() {
        let mut w = JsonViewerWidget::from_text("Payload", "a\nb");
        w.scroll_y = 1;
        w.set_text("Payload", "a\nb\nc");
        assert_eq!(w.scroll_y, 1);
        w.set_text("Submit reply", "{}");
        assert_eq!(w.scroll_y, 0);
    }
}
