use std::path::PathBuf;

use clap::Parser;
use ratatui::style::Color;

pub const DEFAULT_API_BASE: &str = "https://scrapergo.vercel.app/api";
pub const DEFAULT_RELAY: &str = "https://api.allorigins.win/raw?url=";
pub const DEFAULT_THEME: Color = Color::Yellow;

/// rmanhwa - read manhwa in the terminal
///
/// Configuration priority: CLI args > environment variables > config file > defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "rmanhwa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal manhwa reader", long_about = None)]
pub struct CliArgs {
    /// Base URL of the content API
    #[arg(long, env = "RMANHWA_API_BASE")]
    pub api_base: Option<String>,

    /// Relay prefix the encoded API URL is appended to
    #[arg(long, env = "RMANHWA_RELAY")]
    pub relay: Option<String>,

    /// Call the API directly instead of through the relay
    #[arg(long)]
    pub no_relay: bool,

    /// Include mature titles in listings (0|1, true|false)
    #[arg(
        long,
        env = "RMANHWA_MATURE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub mature: Option<bool>,

    /// Where to write the log (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Values read from `~/.config/rmanhwa/rmanhwa.conf`.
#[derive(Debug, Default, PartialEq)]
pub struct FileConfig {
    pub theme: Option<Color>,
    pub api_base: Option<String>,
    pub relay: Option<String>,
    pub mature: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    /// `None` means requests go straight to the API.
    pub relay: Option<String>,
    pub mature: bool,
    pub theme: Color,
    pub log_file: Option<PathBuf>,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/rmanhwa/rmanhwa.conf"))
}

pub fn parse_color(val: &str) -> Option<Color> {
    if !(val.starts_with('#') && val.len() == 7) {
        return None;
    }
    let r = u8::from_str_radix(val.get(1..3)?, 16).ok()?;
    let g = u8::from_str_radix(val.get(3..5)?, 16).ok()?;
    let b = u8::from_str_radix(val.get(5..7)?, 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_config(content: &str) -> FileConfig {
    let mut cfg = FileConfig::default();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, val)) = line.split_once('=') else {
            continue;
        };
        let val = val.trim().trim_matches('"').trim_matches('\'');
        match key.trim() {
            "theme_color" => cfg.theme = parse_color(val),
            "api_base" => cfg.api_base = Some(val.to_string()),
            "relay" => cfg.relay = Some(val.to_string()),
            "mature" => cfg.mature = parse_flag(val),
            _ => {}
        }
    }
    cfg
}

pub fn load_file_config() -> FileConfig {
    config_path()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .map(|content| parse_config(&content))
        .unwrap_or_default()
}

pub fn load_config_theme() -> Color {
    load_file_config().theme.unwrap_or(DEFAULT_THEME)
}

impl Settings {
    pub fn resolve(cli: CliArgs, file: FileConfig) -> Self {
        let api_base = cli
            .api_base
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let relay = if cli.no_relay {
            None
        } else {
            cli.relay
                .or(file.relay)
                .or_else(|| Some(DEFAULT_RELAY.to_string()))
                .filter(|r| !r.is_empty())
        };
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            relay,
            mature: cli.mature.or(file.mature).unwrap_or(false),
            theme: file.theme.unwrap_or(DEFAULT_THEME),
            log_file: cli.log_file,
        }
    }

    pub fn load() -> Self {
        Self::resolve(CliArgs::parse(), load_file_config())
    }
}
