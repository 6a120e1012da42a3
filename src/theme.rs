use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use color_eyre::eyre::{Result, WrapErr};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use tracing::warn;

static ACTIVE: RwLock<Option<Theme>> = RwLock::new(None);

/// Get the active theme. Falls back to the light preset until one is set.
pub fn current() -> Theme {
    ACTIVE
        .read()
        .ok()
        .and_then(|guard| *guard)
        .unwrap_or_else(|| Theme::for_mode(ThemeMode::Light))
}

pub fn set_active(theme: Theme) {
    if let Ok(mut guard) = ACTIVE.write() {
        *guard = Some(theme);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Anything but the two accepted literals counts as unset.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

const THEME_FILE: &str = "user_theme";

/// Persists the light/dark choice under its own file, separate from the
/// notes blob. Resolution on read: stored value, else the host terminal's
/// preference, else light.
pub struct ThemePreference {
    dir: PathBuf,
}

impl ThemePreference {
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn get(&self) -> ThemeMode {
        self.get_with(detect_terminal_mode)
    }

    /// `system` is the host-preference probe, injectable for tests.
    pub fn get_with(&self, system: impl Fn() -> Option<ThemeMode>) -> ThemeMode {
        let stored = fs::read_to_string(self.dir.join(THEME_FILE))
            .ok()
            .and_then(|s| ThemeMode::parse(&s));
        match stored {
            Some(mode) => mode,
            None => system().unwrap_or(ThemeMode::Light),
        }
    }

    pub fn set(&self, mode: ThemeMode) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("creating data directory {}", self.dir.display()))?;
        fs::write(self.dir.join(THEME_FILE), mode.as_str())
            .wrap_err("writing theme preference")
    }
}

/// Guess the terminal's background from COLORFGBG ("fg;bg"). Low palette
/// indices are dark backgrounds.
fn detect_terminal_mode() -> Option<ThemeMode> {
    let var = std::env::var("COLORFGBG").ok()?;
    let bg: u8 = var.rsplit(';').next()?.trim().parse().ok()?;
    if bg <= 6 || bg == 8 {
        Some(ThemeMode::Dark)
    } else {
        Some(ThemeMode::Light)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub mode: ThemeMode,
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub highlight: Style,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Preset for `mode` with any overrides from the user's theme.toml
    /// applied on top.
    pub fn load(mode: ThemeMode) -> Self {
        let base = Self::for_mode(mode);
        match read_config() {
            Some(config) => config.apply(base),
            None => base,
        }
    }

    fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            today: Style::default().fg(Color::White).bg(Color::Blue),
            selected: Style::default().fg(Color::White).bg(Color::Cyan),
            header: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Gray),
            border: Style::default().fg(Color::DarkGray),
            status: Style::default().fg(Color::Black).bg(Color::Gray),
            highlight: Style::default().bg(Color::Gray).add_modifier(Modifier::BOLD),
        }
    }

    fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            today: Style::default().fg(Color::Black).bg(Color::Yellow),
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
        }
    }
}

fn read_config() -> Option<ThemeConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed theme.toml");
            None
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agenda-tui").join("theme.toml"))
}

// ── TOML override types ──

#[derive(Debug, Deserialize, Default)]
struct ThemeConfig {
    today_fg: Option<String>,
    today_bg: Option<String>,
    selected_fg: Option<String>,
    selected_bg: Option<String>,
    header_fg: Option<String>,
    dim_fg: Option<String>,
    border_fg: Option<String>,
    status_fg: Option<String>,
    status_bg: Option<String>,
    highlight_bg: Option<String>,
}

impl ThemeConfig {
    fn apply(self, mut theme: Theme) -> Theme {
        if let Some(c) = self.today_fg.as_deref().and_then(parse_color) {
            theme.today = theme.today.fg(c);
        }
        if let Some(c) = self.today_bg.as_deref().and_then(parse_color) {
            theme.today = theme.today.bg(c);
        }
        if let Some(c) = self.selected_fg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.fg(c);
        }
        if let Some(c) = self.selected_bg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = self.header_fg.as_deref().and_then(parse_color) {
            theme.header = theme.header.fg(c);
        }
        if let Some(c) = self.dim_fg.as_deref().and_then(parse_color) {
            theme.dim = theme.dim.fg(c);
        }
        if let Some(c) = self.border_fg.as_deref().and_then(parse_color) {
            theme.border = theme.border.fg(c);
        }
        if let Some(c) = self.status_fg.as_deref().and_then(parse_color) {
            theme.status = theme.status.fg(c);
        }
        if let Some(c) = self.status_bg.as_deref().and_then(parse_color) {
            theme.status = theme.status.bg(c);
        }
        if let Some(c) = self.highlight_bg.as_deref().and_then(parse_color) {
            theme.highlight = theme.highlight.bg(c);
        }
        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') && s.len() == 7 {
        let r = u8::from_str_radix(&s[1..3], 16).ok()?;
        let g = u8::from_str_radix(&s[3..5], 16).ok()?;
        let b = u8::from_str_radix(&s[5..7], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "lightred" => Some(Color::LightRed),
        "lightgreen" => Some(Color::LightGreen),
        "lightyellow" => Some(Color::LightYellow),
        "lightblue" => Some(Color::LightBlue),
        "lightmagenta" => Some(Color::LightMagenta),
        "lightcyan" => Some(Color::LightCyan),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_prefs() -> ThemePreference {
        let dir = env::temp_dir().join(format!("agenda_tui_test_{}", uuid::Uuid::new_v4()));
        ThemePreference::at(dir)
    }

    #[test]
    fn unset_preference_follows_system() {
        let prefs = temp_prefs();
        assert_eq!(prefs.get_with(|| Some(ThemeMode::Dark)), ThemeMode::Dark);
        assert_eq!(prefs.get_with(|| Some(ThemeMode::Light)), ThemeMode::Light);
    }

    #[test]
    fn unset_preference_without_system_defaults_to_light() {
        let prefs = temp_prefs();
        assert_eq!(prefs.get_with(|| None), ThemeMode::Light);
    }

    #[test]
    fn stored_preference_beats_system() {
        let prefs = temp_prefs();
        prefs.set(ThemeMode::Light).unwrap();
        assert_eq!(prefs.get_with(|| Some(ThemeMode::Dark)), ThemeMode::Light);

        prefs.set(ThemeMode::Dark).unwrap();
        assert_eq!(prefs.get_with(|| Some(ThemeMode::Light)), ThemeMode::Dark);
    }

    #[test]
    fn invalid_stored_value_is_treated_as_unset() {
        let prefs = temp_prefs();
        fs::create_dir_all(&prefs.dir).unwrap();
        fs::write(prefs.dir.join(THEME_FILE), "zebra").unwrap();

        assert_eq!(prefs.get_with(|| Some(ThemeMode::Dark)), ThemeMode::Dark);
    }

    #[test]
    fn parse_accepts_only_the_two_literals() {
        assert_eq!(ThemeMode::parse("light"), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse(" dark "), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse("Dark"), None);
        assert_eq!(ThemeMode::parse(""), None);
    }

    #[test]
    fn presets_carry_their_mode() {
        assert_eq!(Theme::for_mode(ThemeMode::Light).mode, ThemeMode::Light);
        assert_eq!(Theme::for_mode(ThemeMode::Dark).mode, ThemeMode::Dark);
    }

    #[test]
    fn parse_color_handles_hex_and_names() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("not-a-color"), None);
    }
}
