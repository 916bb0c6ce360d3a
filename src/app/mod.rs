use crate::formset::{FieldKind, FormsetError, RemoveStatus};
use crate::nav::flatten::{field_rows, first_field_of, flatten_rows, FlatRow};
use crate::ui::{AppState, Focus, ToastLevel};
use crate::widgets::form::{cycle_option, FieldEditor};
use crate::widgets::Widget;
use crossterm::event::KeyCode;
use ratatui::crossterm::event as rt_event;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

pub enum AppMsg {
    AddBlock,
    RemoveFocused,
    // Click on a block's delete control, addressed by its trigger id
    RemoveTrigger(String),
    MoveCursor(i32),
    CycleOption(i32),
    BeginEdit,
    EditChar(char),
    EditBackspace,
    EditAreaKey(rt_event::KeyEvent),
    CommitEdit,
    CancelEdit,
    SetValue {
        name: String,
        value: String,
    },
    TogglePayload,
    ToggleFocus,
    PayloadKey(KeyCode),
    CopyPayload,
    Submit,
    SubmitDone {
        outcome: Result<JsonValue, String>,
    },
    Quit,
}

#[derive(Debug)]
pub enum Effect {
    RunSubmit {
        cmdline: String,
        payload: String,
    },
    CopyToClipboard {
        text: String,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

fn toast(text: impl Into<String>, level: ToastLevel) -> Effect {
    Effect::ShowToast {
        text: text.into(),
        level,
        seconds: 3,
    }
}

/// Field row under the cursor, if any.
pub(crate) fn focused(state: &AppState) -> Option<FlatRow> {
    let rows = flatten_rows(&state.formset);
    let fields = field_rows(&rows);
    let sel = state.selected.min(fields.len().saturating_sub(1));
    fields.get(sel).map(|&i| rows[i].clone())
}

fn clamp_cursor(state: &mut AppState) {
    let n = field_rows(&flatten_rows(&state.formset)).len();
    state.selected = state.selected.min(n.saturating_sub(1));
}

fn after_remove(
    state: &mut AppState,
    id: &str,
    outcome: Result<RemoveStatus, FormsetError>,
    effects: &mut Vec<Effect>,
) {
    match outcome {
        Ok(RemoveStatus::Removed) => {
            state.dbg(format!("remove {id}"));
            clamp_cursor(state);
            state.touch_payload();
            effects.push(toast(format!("Removed {id}"), ToastLevel::Info));
        }
        Ok(RemoveStatus::AtFloor) => {
            debug!(trigger = %id, "remove ignored at floor");
            effects.push(toast("At least one entry must remain", ToastLevel::Info));
        }
        Err(e) => {
            state.dbg(format!("remove {id} failed: {e}"));
            effects.push(toast(e.to_string(), ToastLevel::Error));
        }
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        AddBlock => {
            let handle = state.formset.add_block();
            let rows = flatten_rows(&state.formset);
            if let Some(pos) = first_field_of(&rows, handle) {
                state.selected = pos;
            }
            let index = state.formset.block(handle).map(|b| b.index).unwrap_or_default();
            state.dbg(format!("add block {handle} -> index {index}"));
            state.touch_payload();
            effects.push(toast(format!("Added block {index}"), ToastLevel::Info));
        }
        RemoveFocused => {
            let Some(FlatRow::Field { handle, .. }) = focused(state) else {
                return effects;
            };
            let trigger = state.formset.block(handle).and_then(|b| b.delete_trigger.clone());
            match trigger {
                Some(id) => {
                    let outcome = state.formset.remove_block(handle);
                    after_remove(state, &id, outcome, &mut effects);
                }
                None => effects.push(toast(
                    "Saved entries cannot be removed here",
                    ToastLevel::Info,
                )),
            }
        }
        RemoveTrigger(id) => {
            let outcome = state.formset.remove_by_trigger(&id);
            after_remove(state, &id, outcome, &mut effects);
        }
        MoveCursor(delta) => {
            let n = field_rows(&flatten_rows(&state.formset)).len();
            if n > 0 {
                let cur = state.selected.min(n - 1) as i64;
                state.selected = (cur + delta as i64).clamp(0, n as i64 - 1) as usize;
            }
        }
        CycleOption(delta) => {
            let Some(FlatRow::Field { handle, field }) = focused(state) else {
                return effects;
            };
            let next = state.formset.block(handle).and_then(|b| {
                let fld = b.fields.get(field)?;
                match &fld.kind {
                    FieldKind::Select { options } => {
                        cycle_option(options, &fld.value, delta).map(|v| (fld.role.clone(), v))
                    }
                    _ => None,
                }
            });
            if let Some((role, value)) = next {
                if let Err(e) = state.formset.set_value(handle, &role, value) {
                    effects.push(toast(e.to_string(), ToastLevel::Error));
                }
                state.touch_payload();
            }
        }
        BeginEdit => {
            let Some(FlatRow::Field { handle, field }) = focused(state) else {
                return effects;
            };
            let Some(fld) = state.formset.block(handle).and_then(|b| b.fields.get(field)) else {
                return effects;
            };
            match FieldEditor::open(handle, fld) {
                Some(ed) => state.editor = Some(ed),
                // selects cycle instead of opening an editor
                None => return update(state, CycleOption(1)),
            }
        }
        EditChar(c) => {
            if let Some(ed) = &mut state.editor {
                ed.push_char(c);
            }
        }
        EditBackspace => {
            if let Some(ed) = &mut state.editor {
                ed.backspace();
            }
        }
        EditAreaKey(key) => {
            if let Some(ed) = &mut state.editor {
                ed.area_input(key);
            }
        }
        CommitEdit => {
            if let Some(ed) = state.editor.take() {
                let text = ed.text();
                if let Err(e) = state.formset.set_value(ed.handle, &ed.role, text) {
                    // the block vanished while editing
                    warn!(error = %e, "dropping edit");
                    effects.push(toast(e.to_string(), ToastLevel::Error));
                }
                state.touch_payload();
            }
        }
        CancelEdit => {
            state.editor = None;
        }
        SetValue { name, value } => {
            if state.formset.set_value_by_name(&name, value) {
                state.touch_payload();
            } else {
                effects.push(toast(format!("No field named {name}"), ToastLevel::Error));
            }
        }
        TogglePayload => {
            state.show_payload = !state.show_payload;
            state.focus = Focus::Blocks;
            if state.show_payload {
                state.refresh_payload();
            }
        }
        ToggleFocus => {
            state.focus = match state.focus {
                Focus::Blocks if state.show_payload => Focus::Payload,
                _ => Focus::Blocks,
            };
        }
        PayloadKey(code) => {
            effects.extend(state.payload_viewer.on_key(code));
        }
        CopyPayload => {
            effects.push(Effect::CopyToClipboard {
                text: state.payload_text(),
            });
        }
        Submit => {
            if state.submitting {
                return effects;
            }
            match state.page.submit_cmd.clone() {
                Some(cmdline) => {
                    state.submitting = true;
                    state.status_text = Some(format!("Submitting {}", state.page.title));
                    effects.push(Effect::RunSubmit {
                        cmdline,
                        payload: state.payload_text(),
                    });
                }
                None => {
                    state.print_on_exit = true;
                    effects.push(toast(
                        "No submit_cmd configured; payload will be printed on exit",
                        ToastLevel::Info,
                    ));
                }
            }
        }
        SubmitDone { outcome } => {
            state.submitting = false;
            state.status_text = None;
            match outcome {
                Ok(v) => {
                    let text = serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string());
                    state.show_reply(text);
                    effects.push(toast("Submitted", ToastLevel::Success));
                }
                Err(e) => {
                    state.dbg(format!("submit failed: {e}"));
                    effects.push(toast(format!("Submit failed: {e}"), ToastLevel::Error));
                }
            }
        }
        Quit => {
            state.should_quit = true;
        }
    }
    effects
}

#[cfg(test)]
mod tests;
