use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Directional Points ────────────────────────────────────────────────────────

/// Balance required to unlock Directional+. Unlocking does not spend it.
pub const PLUS_COST: u64 = 500;

/// Points granted by the once-per-calendar-day login bonus.
pub const DAILY_BONUS: u64 = 50;

/// Themes that only Directional+ users may select.
pub const PLUS_ONLY_THEMES: &[&str] = &["neon"];

/// Amounts offered by the developer earn keys (`1`, `2`, `3`).
pub const DEV_EARN_AMOUNTS: &[u64] = &[10, 50, 100];

// ── Storage keys ──────────────────────────────────────────────────────────────

pub const POINTS_KEY: &str = "norther_points";
pub const PLUS_KEY: &str = "norther_plus";
pub const LAST_DAILY_KEY: &str = "norther_last_daily";

// ── Paths ─────────────────────────────────────────────────────────────────────

pub fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<platform data dir>/norther`, or the executable's directory when the
/// platform has no data dir.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("norther"))
        .unwrap_or_else(base_dir)
}

pub fn storage_file(data_dir: &Path) -> PathBuf {
    data_dir.join("storage.json")
}

pub fn settings_file(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

pub fn log_file(data_dir: &Path) -> PathBuf {
    data_dir.join("norther.log")
}

// ── JSON helpers ──────────────────────────────────────────────────────────────

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Theme applied at startup. Still goes through the Directional+ gate.
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Show the developer earn keys on the HUD.
    #[serde(default = "default_dev_tools")]
    pub dev_tools: bool,
}

const fn default_dev_tools() -> bool {
    true
}

fn default_theme() -> String {
    "green".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            dev_tools: default_dev_tools(),
        }
    }
}

pub fn load_settings(data_dir: &Path) -> Settings {
    load_json(&settings_file(data_dir))
}

// ── Themes ────────────────────────────────────────────────────────────────────

pub const THEMES: &[(&str, Color)] = &[
    ("green", Color::Green),
    ("amber", Color::Yellow),
    ("blue", Color::Cyan),
    ("white", Color::White),
    ("neon", Color::Magenta),
];

pub fn theme_color(name: &str) -> Color {
    THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(Color::Green)
}

/// The theme after `current` in `THEMES`, wrapping around. Unknown themes
/// continue from the first entry.
pub fn next_theme(current: &str) -> &'static str {
    let idx = THEMES
        .iter()
        .position(|(n, _)| *n == current)
        .map(|i| (i + 1) % THEMES.len())
        .unwrap_or(0);
    THEMES[idx].0
}

pub fn is_plus_only_theme(name: &str) -> bool {
    PLUS_ONLY_THEMES.contains(&name)
}

// ── Header ────────────────────────────────────────────────────────────────────

pub const HEADER_LINES: &[&str] = &[
    "NORTHER OS",
    "DIRECTIONAL POINTS TERMINAL",
    "-SESSION 1-",
];
