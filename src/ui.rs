use crate::app::{update, AppMsg, Effect};
use crate::formset::FormsetManager;
use crate::model::PageConfig;
use crate::nav::keys::key_to_msg;
use crate::services::payload::payload_pretty;
use crate::services::submit::{spawn_submit, SubmitMsg};
use crate::widgets::form::draw_textarea_modal;
use crate::widgets::formset_widget::draw_formset;
use crate::widgets::header::draw_header;
use crate::widgets::json_viewer::JsonViewerWidget;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    Blocks,
    Payload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub(crate) struct AppState {
    pub(crate) page: PageConfig,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) formset: FormsetManager,
    // Ordinal among field rows, see nav::flatten
    pub(crate) selected: usize,
    pub(crate) editor: Option<crate::widgets::form::FieldEditor>,
    pub(crate) focus: Focus,
    pub(crate) show_payload: bool,
    pub(crate) payload_viewer: JsonViewerWidget,
    // Submit reply currently shown instead of the payload
    pub(crate) reply: Option<String>,
    pub(crate) submitting: bool,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) should_quit: bool,
    pub(crate) print_on_exit: bool,
    tx: Option<Sender<SubmitMsg>>,
    rx: Option<Receiver<SubmitMsg>>,
}

impl AppState {
    pub fn new(page: PageConfig, formset: FormsetManager) -> Self {
        let mut st = Self {
            page,
            config_path: None,
            formset,
            selected: 0,
            editor: None,
            focus: Focus::Blocks,
            show_payload: false,
            payload_viewer: JsonViewerWidget::from_text("Payload", ""),
            reply: None,
            submitting: false,
            status_text: None,
            toast: None,
            tick: 0,
            theme: crate::theme::Theme::synthwave_dark(),
            should_quit: false,
            print_on_exit: false,
            tx: None,
            rx: None,
        };
        st.refresh_payload();
        st
    }

    pub fn dbg(&self, msg: impl AsRef<str>) {
        info!(target: "formset_tui::events", "{}", msg.as_ref());
    }

    pub fn payload_text(&self) -> String {
        payload_pretty(&self.formset, &self.page.management)
    }

    pub fn refresh_payload(&mut self) {
        match &self.reply {
            Some(r) => self.payload_viewer.set_text("Submit reply", r.clone()),
            None => {
                let text = self.payload_text();
                self.payload_viewer.set_text("Payload", text);
            }
        }
    }

    /// The collection changed: drop any stale reply and show the live payload.
    pub fn touch_payload(&mut self) {
        self.reply = None;
        self.refresh_payload();
    }

    pub fn show_reply(&mut self, text: String) {
        self.reply = Some(text);
        self.show_payload = true;
        self.refresh_payload();
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::RunSubmit { cmdline, payload } => {
                state.dbg(format!("submit -> {cmdline}"));
                if let Some(tx) = &state.tx {
                    spawn_submit(cmdline, payload, tx.clone());
                }
            }
            Effect::CopyToClipboard { text } => {
                let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(text));
                let (text, level) = match copied {
                    Ok(()) => ("Copied to clipboard!".to_string(), ToastLevel::Success),
                    Err(e) => (format!("Clipboard unavailable: {e}"), ToastLevel::Error),
                };
                run_effects(
                    state,
                    vec![Effect::ShowToast {
                        text,
                        level,
                        seconds: 3,
                    }],
                );
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

fn drain_submit_replies(state: &mut AppState) {
    let mut drained: Vec<SubmitMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        let effects = update(state, AppMsg::SubmitDone {
            outcome: msg.outcome,
        });
        run_effects(state, effects);
    }
}

/// Scripted operation for headless runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScriptOp {
    Add,
    Remove(String),
    RemoveLast,
    Set { name: String, value: String },
    Submit,
}

pub(crate) fn parse_script(src: &str) -> Result<Vec<ScriptOp>, String> {
    let mut out = Vec::new();
    for raw in src.split(',') {
        let op = raw.trim();
        if op.is_empty() {
            continue;
        }
        let parsed = match op {
            "add" => ScriptOp::Add,
            "remove-last" => ScriptOp::RemoveLast,
            "submit" => ScriptOp::Submit,
            _ => {
                if let Some(id) = op.strip_prefix("remove:") {
                    ScriptOp::Remove(id.to_string())
                } else if let Some(rest) = op.strip_prefix("set:") {
                    let (name, value) = rest
                        .split_once('=')
                        .ok_or_else(|| format!("set needs name=value: '{op}'"))?;
                    ScriptOp::Set {
                        name: name.to_string(),
                        value: value.to_string(),
                    }
                } else {
                    return Err(format!("unknown script op '{op}'"));
                }
            }
        };
        out.push(parsed);
    }
    Ok(out)
}

pub(crate) fn script_msg(state: &AppState, op: ScriptOp) -> Option<AppMsg> {
    match op {
        ScriptOp::Add => Some(AppMsg::AddBlock),
        ScriptOp::Remove(id) => Some(AppMsg::RemoveTrigger(id)),
        ScriptOp::RemoveLast => state
            .formset
            .blocks()
            .last()
            .and_then(|b| b.delete_trigger.clone())
            .map(AppMsg::RemoveTrigger),
        ScriptOp::Set { name, value } => Some(AppMsg::SetValue { name, value }),
        ScriptOp::Submit => Some(AppMsg::Submit),
    }
}

pub(crate) fn headless_summary(state: &AppState) -> serde_json::Value {
    let record = state.formset.record();
    let payload: serde_json::Value =
        serde_json::from_str(&state.payload_text()).unwrap_or(serde_json::Value::Null);
    let ok = !matches!(
        state.toast.as_ref().map(|t| t.level),
        Some(ToastLevel::Error)
    );
    serde_json::json!({
        "ok": ok,
        "namespace": state.formset.namespace(),
        "non_dynamic": state.formset.non_dynamic(),
        "indices": state.formset.live_indices(),
        "total_forms": record.total_count,
        "min_num_forms": record.min_required_count,
        "payload": payload,
        "reply": state.reply,
    })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run(config_arg: Option<String>) -> Result<()> {
    let (path, page) = crate::services::loader::load_page_config(config_arg)?;
    let formset = FormsetManager::new(page.to_setup())
        .with_context(|| format!("building formset from {path:?}"))?;
    let mut state = AppState::new(page, formset);
    state.config_path = Some(path);
    let (tx, rx) = mpsc::channel::<SubmitMsg>();
    state.tx = Some(tx);
    state.rx = Some(rx);

    if env_flag("FORMSET_TUI_HEADLESS") {
        return run_headless(state);
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if let Some(msg) = key_to_msg(&state, key.code, key.modifiers) {
                        let effects = update(&mut state, msg);
                        run_effects(&mut state, effects);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        drain_submit_replies(&mut state);
        if state.should_quit {
            break Ok(());
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    res?;
    if state.print_on_exit {
        println!("{}", state.payload_text());
    }
    Ok(())
}

fn run_headless(mut state: AppState) -> Result<()> {
    let ticks: u64 = std::env::var("FORMSET_TUI_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let script = std::env::var("FORMSET_TUI_SCRIPT").unwrap_or_default();
    let mut ops: VecDeque<ScriptOp> = parse_script(&script)
        .map_err(|e| anyhow!("FORMSET_TUI_SCRIPT: {e}"))?
        .into();
    let backend = ratatui::backend::TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    // one op per tick; keep ticking until the script is exhausted
    let mut tick = 0;
    while tick < ticks || !ops.is_empty() {
        if let Some(op) = ops.pop_front() {
            if let Some(msg) = script_msg(&state, op) {
                let effects = update(&mut state, msg);
                run_effects(&mut state, effects);
            }
        }
        terminal.draw(|f| ui(f, &mut state))?;
        drain_submit_replies(&mut state);
        state.tick = state.tick.wrapping_add(1);
        tick += 1;
    }
    if state.submitting {
        let reply = state
            .rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(10)).ok());
        if let Some(msg) = reply {
            let effects = update(&mut state, AppMsg::SubmitDone {
                outcome: msg.outcome,
            });
            run_effects(&mut state, effects);
        }
    }
    println!("{}", headless_summary(&state));
    Ok(())
}

pub(crate) fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(screen);
    draw_header(f, rows[0], state);

    let cursor_on = state.tick % 2 == 0;
    let blocks_focused = state.focus == Focus::Blocks;
    if state.show_payload {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        draw_formset(f, cols[0], state, blocks_focused, cursor_on);
        let payload_focused = state.focus == Focus::Payload;
        state.payload_viewer.render(f, cols[1], payload_focused, state.tick);
    } else {
        draw_formset(f, rows[1], state, true, cursor_on);
    }

    let help = if state.editor.as_ref().map(|e| e.is_area()).unwrap_or(false) {
        "Ctrl+S Save • Esc Cancel"
    } else if state.editor.is_some() {
        "Enter Save • Esc Cancel"
    } else if state.focus == Focus::Payload {
        "↑/↓ PgUp/PgDn Scroll • w Wrap • Tab Blocks • p Hide • y Copy • q Quit"
    } else {
        "↑/↓ Move • Enter Edit • ←/→ Option • a Add • d Delete • p Payload • Ctrl+S Submit • q Quit"
    };
    draw_footer(f, rows[2], state, help);

    if let Some(ed) = &mut state.editor {
        if ed.is_area() {
            draw_textarea_modal(f, screen, ed);
        }
    }
}
