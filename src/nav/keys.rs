use crate::app::AppMsg;
use crate::ui::{AppState, Focus};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::crossterm::event as rt_event;

/// Translate a terminal key into a message for the current mode.
pub(crate) fn key_to_msg(state: &AppState, code: KeyCode, mods: KeyModifiers) -> Option<AppMsg> {
    use AppMsg::*;
    let ctrl = mods.contains(KeyModifiers::CONTROL);
    if let Some(ed) = &state.editor {
        if ed.is_area() {
            return match code {
                KeyCode::Esc => Some(CancelEdit),
                KeyCode::Char('s') if ctrl => Some(CommitEdit),
                _ => to_textarea_key(code, mods).map(EditAreaKey),
            };
        }
        return match code {
            KeyCode::Enter => Some(CommitEdit),
            KeyCode::Esc => Some(CancelEdit),
            KeyCode::Backspace => Some(EditBackspace),
            KeyCode::Char(c) if !ctrl => Some(EditChar(c)),
            _ => None,
        };
    }
    match code {
        KeyCode::Char('c') if ctrl => return Some(Quit),
        KeyCode::Char('s') if ctrl => return Some(Submit),
        KeyCode::Char('q') => return Some(Quit),
        KeyCode::Tab => return Some(ToggleFocus),
        KeyCode::Char('p') => return Some(TogglePayload),
        KeyCode::Char('y') => return Some(CopyPayload),
        _ => {}
    }
    if state.focus == Focus::Payload {
        return match code {
            KeyCode::Esc => Some(ToggleFocus),
            other => Some(PayloadKey(other)),
        };
    }
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(MoveCursor(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(MoveCursor(1)),
        KeyCode::PageUp => Some(MoveCursor(-10)),
        KeyCode::PageDown => Some(MoveCursor(10)),
        KeyCode::Home => Some(MoveCursor(i32::MIN / 2)),
        KeyCode::End => Some(MoveCursor(i32::MAX / 2)),
        KeyCode::Left => Some(CycleOption(-1)),
        KeyCode::Right => Some(CycleOption(1)),
        KeyCode::Enter => Some(BeginEdit),
        KeyCode::Char('a') | KeyCode::Char('+') => Some(AddBlock),
        KeyCode::Char('d') | KeyCode::Delete => Some(RemoveFocused),
        KeyCode::Esc if state.show_payload => Some(TogglePayload),
        _ => None,
    }
}

// tui-textarea takes ratatui's re-exported crossterm events
fn to_textarea_key(code: KeyCode, mods: KeyModifiers) -> Option<rt_event::KeyEvent> {
    use rt_event::KeyCode as K;
    let code = match code {
        KeyCode::Char(c) => K::Char(c),
        KeyCode::Enter => K::Enter,
        KeyCode::Backspace => K::Backspace,
        KeyCode::Delete => K::Delete,
        KeyCode::Left => K::Left,
        KeyCode::Right => K::Right,
        KeyCode::Up => K::Up,
        KeyCode::Down => K::Down,
        KeyCode::Home => K::Home,
        KeyCode::End => K::End,
        KeyCode::PageUp => K::PageUp,
        KeyCode::PageDown => K::PageDown,
        KeyCode::Tab => K::Tab,
        _ => return None,
    };
    let mods = rt_event::KeyModifiers::from_bits_truncate(mods.bits());
    Some(rt_event::KeyEvent::new(code, mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formset::{FieldKind, FieldSpec, FormsetManager, FormsetSetup, ManagementRecord, ReindexSet};
    use crate::model::PageConfig;
    use crate::widgets::form::FieldEditor;

    fn state() -> AppState {
        let setup = FormsetSetup {
            namespace: "ns".into(),
            id_prefix: String::new(),
            fields: vec![FieldSpec {
                role: "notes".into(),
                label: "Notes".into(),
                kind: FieldKind::TextArea,
                default: String::new(),
            }],
            bound: vec![],
            initial_empty: 1,
            record: ManagementRecord::new(1, 0),
            reindex: ReindexSet::all(),
        };
        let formset = FormsetManager::new(setup).unwrap();
        AppState::new(PageConfig::default(), formset)
    }

    #[test]
    fn list_mode_maps_block_commands() {
        let st = state();
        let none = KeyModifiers::NONE;
        assert!(matches!(key_to_msg(&st, KeyCode::Char('a'), none), Some(AppMsg::AddBlock)));
        assert!(matches!(key_to_msg(&st, KeyCode::Delete, none), Some(AppMsg::RemoveFocused)));
        assert!(matches!(key_to_msg(&st, KeyCode::Right, none), Some(AppMsg::CycleOption(1))));
        assert!(matches!(
            key_to_msg(&st, KeyCode::Char('s'), KeyModifiers::CONTROL),
            Some(AppMsg::Submit)
        ));
        assert!(key_to_msg(&st, KeyCode::Esc, none).is_none());
    }

    #[test]
    fn payload_focus_routes_keys_to_viewer() {
        let mut st = state();
        st.show_payload = true;
        st.focus = Focus::Payload;
        assert!(matches!(
            key_to_msg(&st, KeyCode::Down, KeyModifiers::NONE),
            Some(AppMsg::PayloadKey(KeyCode::Down))
        ));
        assert!(matches!(
            key_to_msg(&st, KeyCode::Char('a'), KeyModifiers::NONE),
            Some(AppMsg::PayloadKey(KeyCode::Char('a')))
        ));
        assert!(matches!(key_to_msg(&st, KeyCode::Esc, KeyModifiers::NONE), Some(AppMsg::ToggleFocus)));
    }

    #[test]
    fn textarea_editor_captures_keys_until_ctrl_s() {
        let mut st = state();
        let b = &st.formset.blocks()[0];
        st.editor = FieldEditor::open(b.handle, &b.fields[0]);
        assert!(matches!(
            key_to_msg(&st, KeyCode::Char('a'), KeyModifiers::NONE),
            Some(AppMsg::EditAreaKey(_))
        ));
        assert!(matches!(
            key_to_msg(&st, KeyCode::Enter, KeyModifiers::NONE),
            Some(AppMsg::EditAreaKey(_))
        ));
        assert!(matches!(
            key_to_msg(&st, KeyCode::Char('s'), KeyModifiers::CONTROL),
            Some(AppMsg::CommitEdit)
        ));
        assert!(matches!(key_to_msg(&st, KeyCode::Esc, KeyModifiers::NONE), Some(AppMsg::CancelEdit)));
    }
}
