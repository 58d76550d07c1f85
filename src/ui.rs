use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::{next_theme, theme_color, Settings, DEV_EARN_AMOUNTS, HEADER_LINES, THEMES};
use crate::core::clock::Clock;
use crate::core::notify::Notifier;
use crate::core::session::SessionManager;
use crate::core::storage::KeyValueStore;
use crate::desktop::{
    Desktop, BODY_PLUS_ACTIVE, PLUS_REQUIREMENT_TEXT, PLUS_STATUS, POINTS_DISPLAY,
    UNLOCK_PLUS_BTN, WINDOWS,
};
use crate::status::render_status_bar;

pub type Term = Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;

// ── Padding ───────────────────────────────────────────────────────────────────
// Horizontal padding applied to every screen so text never touches the edges.
const H_PAD: u16 = 3;

/// Shrink a rect by H_PAD columns on each side.
pub fn pad_horizontal(area: Rect) -> Rect {
    let pad = H_PAD.min(area.width / 2);
    Rect {
        x: area.x + pad,
        y: area.y,
        width: area.width.saturating_sub(pad * 2),
        height: area.height,
    }
}

// ── Color helpers ─────────────────────────────────────────────────────────────

pub fn normal_style(c: Color) -> Style { Style::default().fg(c) }
pub fn sel_style(c: Color)    -> Style { Style::default().fg(Color::Black).bg(c).add_modifier(Modifier::BOLD) }
pub fn title_style(c: Color)  -> Style { Style::default().fg(c).add_modifier(Modifier::BOLD) }
pub fn dim_style(c: Color)    -> Style { Style::default().fg(c).add_modifier(Modifier::DIM) }

// ── Header ────────────────────────────────────────────────────────────────────

pub fn render_header(f: &mut Frame, area: Rect, color: Color, plus: bool) {
    let inner = pad_horizontal(area);
    let lines: Vec<Line> = HEADER_LINES
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 && plus {
                Line::from(Span::styled(format!("{l}  ✦ DIRECTIONAL+"), title_style(color)))
            } else {
                Line::from(Span::styled(*l, title_style(color)))
            }
        })
        .collect();
    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, inner);
}

pub fn render_separator(f: &mut Frame, area: Rect, color: Color) {
    let inner = pad_horizontal(area);
    let sep = "=".repeat(inner.width as usize);
    let p = Paragraph::new(sep).alignment(Alignment::Center).style(dim_style(color));
    f.render_widget(p, inner);
}

// ── Modal notifications ───────────────────────────────────────────────────────

/// Notifications waiting to be acknowledged. The front one is drawn as a
/// modal box and swallows all input until dismissed.
#[derive(Debug, Default)]
pub struct ModalQueue {
    pending: VecDeque<String>,
}

impl ModalQueue {
    pub fn current(&self) -> Option<&str> {
        self.pending.front().map(String::as_str)
    }

    pub fn dismiss(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for ModalQueue {
    fn notify(&mut self, message: &str) {
        tracing::debug!(message, "modal queued");
        self.pending.push_back(message.to_string());
    }
}

fn render_modal(f: &mut Frame, message: &str, color: Color) {
    let size = f.area();
    let w = (message.chars().count() + 6).clamp(24, size.width.max(24) as usize) as u16;
    let w = w.min(size.width);
    let h = 6u16.min(size.height);
    let x = size.width.saturating_sub(w) / 2;
    let y = size.height.saturating_sub(h) / 2;
    let area = Rect::new(x, y, w, h);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(sel_style(color))
        .style(sel_style(color));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let p = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from("[ OK ]"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .style(sel_style(color));
    f.render_widget(p, inner);
}

// ── Key mapping ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudCommand {
    Earn(u64),
    Unlock,
    CycleTheme,
    /// Index into `WINDOWS`.
    ToggleWindow(usize),
    Quit,
}

#[derive(Debug, Clone)]
pub struct HudState {
    /// `w` was pressed; the next digit picks a window.
    awaiting_window: bool,
    /// Last theme the cycle key asked for, applied or not.
    theme_cursor: &'static str,
    dev_tools: bool,
}

impl HudState {
    pub fn new(settings: &Settings) -> Self {
        let theme_cursor = THEMES
            .iter()
            .map(|(n, _)| *n)
            .find(|n| *n == settings.theme)
            .unwrap_or(THEMES[0].0);
        Self {
            awaiting_window: false,
            theme_cursor,
            dev_tools: settings.dev_tools,
        }
    }

    pub fn command_for_key(&mut self, code: KeyCode) -> Option<HudCommand> {
        if std::mem::take(&mut self.awaiting_window) {
            return match code {
                KeyCode::Char(c @ '1'..='9') => Some(HudCommand::ToggleWindow(digit_index(c))),
                _ => None,
            };
        }
        match code {
            KeyCode::Char(c @ '1'..='9') if self.dev_tools => DEV_EARN_AMOUNTS
                .get(digit_index(c))
                .map(|amount| HudCommand::Earn(*amount)),
            KeyCode::Char('u') | KeyCode::Char('U') => Some(HudCommand::Unlock),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(HudCommand::CycleTheme),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.awaiting_window = true;
                None
            }
            KeyCode::Char('q') | KeyCode::Esc => Some(HudCommand::Quit),
            _ => None,
        }
    }

    /// Run `cmd` against the session. Returns false when the HUD should close.
    pub fn apply<S, N, C>(
        &mut self,
        manager: &mut SessionManager<S, N, C>,
        cmd: HudCommand,
    ) -> Result<bool>
    where
        S: KeyValueStore,
        N: Notifier,
        C: Clock,
    {
        match cmd {
            HudCommand::Earn(amount) => manager.dev_earn_points(amount)?,
            HudCommand::Unlock => {
                manager.attempt_unlock_plus()?;
            }
            HudCommand::CycleTheme => {
                self.theme_cursor = next_theme(self.theme_cursor);
                manager.set_theme(self.theme_cursor);
            }
            HudCommand::ToggleWindow(idx) => {
                if let Some((id, _)) = WINDOWS.get(idx) {
                    manager.toggle_window(id);
                }
            }
            HudCommand::Quit => return Ok(false),
        }
        Ok(true)
    }
}

fn digit_index(c: char) -> usize {
    c.to_digit(10).map(|d| d as usize).unwrap_or(1).saturating_sub(1)
}

// ── Desktop screen ────────────────────────────────────────────────────────────

pub fn run_desktop<S, C>(
    terminal: &mut Term,
    manager: &mut SessionManager<S, ModalQueue, C>,
    settings: &Settings,
) -> Result<()>
where
    S: KeyValueStore,
    C: Clock,
{
    let mut hud = HudState::new(settings);

    loop {
        let color = theme_color(manager.theme().unwrap_or(THEMES[0].0));
        terminal.draw(|f| {
            draw_desktop(f, manager.desktop(), color, hud.dev_tools);
            if let Some(message) = manager.notifier().current() {
                render_modal(f, message, color);
            }
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if !manager.notifier().is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc) {
                manager.notifier_mut().dismiss();
            }
            continue;
        }

        if let Some(cmd) = hud.command_for_key(key.code) {
            if !hud.apply(manager, cmd)? {
                return Ok(());
            }
        }
    }
}

fn draw_desktop(f: &mut Frame, desktop: &Desktop, color: Color, dev_tools: bool) {
    let size = f.area();
    let open: Vec<(&str, &str)> = desktop
        .windows()
        .filter(|(_, _, is_open)| *is_open)
        .map(|(id, title, _)| (id, title))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    let plus = desktop.root.has_class(BODY_PLUS_ACTIVE);
    render_header(f, chunks[0], color, plus);
    render_separator(f, chunks[1], color);

    let text = |id: &str| desktop.text(id).unwrap_or_default().to_string();
    let unlock_disabled = desktop.element(UNLOCK_PLUS_BTN).is_some_and(|e| e.disabled);
    let unlock_style = if unlock_disabled { dim_style(color) } else { sel_style(color) };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("DIRECTIONAL POINTS: {}", text(POINTS_DISPLAY)),
            title_style(color),
        )),
        Line::from(Span::styled(format!("STATUS: {}", text(PLUS_STATUS)), normal_style(color))),
        Line::from(Span::styled(text(PLUS_REQUIREMENT_TEXT), normal_style(color))),
        Line::from(Span::styled(" [U] UNLOCK DIRECTIONAL+ ", unlock_style)),
        Line::from(""),
    ];
    for (n, (_, title, is_open)) in desktop.windows().enumerate() {
        let mark = if is_open { "x" } else { " " };
        lines.push(Line::from(Span::styled(
            format!("  [w{}] [{mark}] {title}", n + 1),
            normal_style(color),
        )));
    }
    f.render_widget(Paragraph::new(lines), pad_horizontal(chunks[2]));

    if !open.is_empty() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, open.len() as u32); open.len()])
            .split(pad_horizontal(chunks[3]));
        let border = if plus { BorderType::Double } else { BorderType::Plain };
        for ((id, title), area) in open.iter().zip(cols.iter()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border)
                .border_style(normal_style(color))
                .title(Span::styled(format!(" {title} "), title_style(color)));
            let body: Vec<Line> = window_body(id, desktop)
                .into_iter()
                .map(|l| Line::from(Span::styled(l, normal_style(color))))
                .collect();
            f.render_widget(Paragraph::new(body).block(block).wrap(Wrap { trim: true }), *area);
        }
    }

    let mut hint = String::from("u = unlock   t = theme   w+n = window   q = quit");
    if dev_tools {
        let earn: Vec<String> = DEV_EARN_AMOUNTS
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{} = +{a}", i + 1))
            .collect();
        hint = format!("{}   {hint}", earn.join("  "));
    }
    f.render_widget(Paragraph::new(hint).style(dim_style(color)), pad_horizontal(chunks[4]));

    render_status_bar(f, chunks[5], color, desktop);
}

fn window_body(id: &str, desktop: &Desktop) -> Vec<String> {
    match id {
        "terminalWindow" => vec![
            "> NORTHER OS TERMLINK".into(),
            "> READY".into(),
        ],
        "filesWindow" => vec![
            "/home/guest".into(),
            "  documents/".into(),
            "  wallpapers/".into(),
        ],
        "pointsWindow" => vec![
            format!("Balance: {}", desktop.text(POINTS_DISPLAY).unwrap_or_default()),
            desktop.text(PLUS_STATUS).unwrap_or_default().to_string(),
            desktop.text(PLUS_REQUIREMENT_TEXT).unwrap_or_default().to_string(),
        ],
        "settingsWindow" => vec![
            format!(
                "Theme: {}",
                desktop.root.theme.as_deref().unwrap_or(THEMES[0].0)
            ),
            "Press t to cycle themes.".into(),
        ],
        _ => Vec::new(),
    }
}
