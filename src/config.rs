use ini::Ini;
use log::{LevelFilter, info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "better_looting.ini";
const SECTION: &str = "Overlay";

/// When the overlay is allowed to pop up over the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    #[default]
    Always,
    LookDown,
    StandStill,
    KeyHold,
    KeyToggle,
}

impl ActivationMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::LookDown => "LookDown",
            Self::StandStill => "StandStill",
            Self::KeyHold => "KeyHold",
            Self::KeyToggle => "KeyToggle",
        }
    }
}

impl FromStr for ActivationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "lookdown" | "look_down" => Ok(Self::LookDown),
            "standstill" | "stand_still" => Ok(Self::StandStill),
            "keyhold" | "key_hold" => Ok(Self::KeyHold),
            "keytoggle" | "key_toggle" => Ok(Self::KeyToggle),
            _ => Err(()),
        }
    }
}

/// When wheel and scroll-key gestures move the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    #[default]
    Always,
    KeyBind,
    StandStill,
}

impl ScrollMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::KeyBind => "KeyBind",
            Self::StandStill => "StandStill",
        }
    }
}

impl FromStr for ScrollMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "keybind" | "key_bind" => Ok(Self::KeyBind),
            "standstill" | "stand_still" => Ok(Self::StandStill),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(&self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    // Rows shown at once; fractional values leave a half-visible row as a hint.
    pub visible_rows: f32,
    pub activation_mode: ActivationMode,
    pub look_down_angle: f32,
    pub scroll_mode: ScrollMode,
    // Steps a scroll key must be held before it starts repeating.
    pub scroll_repeat_delay: u32,
    pub scroll_repeat_interval: u32,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            visible_rows: 4.5,
            activation_mode: ActivationMode::Always,
            look_down_angle: 45.0,
            scroll_mode: ScrollMode::Always,
            scroll_repeat_delay: 10,
            scroll_repeat_interval: 3,
            log_level: LogLevel::Warn,
        }
    }
}

const KEYS: [&str; 7] = [
    "VisibleRows",
    "ActivationMode",
    "LookDownAngle",
    "ScrollMode",
    "ScrollRepeatDelay",
    "ScrollRepeatInterval",
    "LogLevel",
];

impl Config {
    /// Parses INI text. Unknown or malformed values fall back to defaults.
    pub fn from_ini_str(text: &str) -> Self {
        match Ini::load_from_str(text) {
            Ok(conf) => Self::from_ini(&conf),
            Err(e) => {
                warn!("Failed to parse overlay config: {e}. Using default values.");
                Self::default()
            }
        }
    }

    fn from_ini(conf: &Ini) -> Self {
        let default = Self::default();
        let get = |key: &str| conf.get_from(Some(SECTION), key).map(str::trim);

        let visible_rows = get("VisibleRows")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map_or(default.visible_rows, |v| v.max(1.0));
        let activation_mode = get("ActivationMode")
            .and_then(|v| ActivationMode::from_str(v).ok())
            .unwrap_or(default.activation_mode);
        let look_down_angle = get("LookDownAngle")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map_or(default.look_down_angle, |v| v.clamp(-90.0, 90.0));
        let scroll_mode = get("ScrollMode")
            .and_then(|v| ScrollMode::from_str(v).ok())
            .unwrap_or(default.scroll_mode);
        let scroll_repeat_delay = get("ScrollRepeatDelay")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default.scroll_repeat_delay);
        let scroll_repeat_interval = get("ScrollRepeatInterval")
            .and_then(|v| v.parse::<u32>().ok())
            .map_or(default.scroll_repeat_interval, |v| v.max(1));
        let log_level = get("LogLevel")
            .and_then(|v| LogLevel::from_str(v).ok())
            .unwrap_or(default.log_level);

        for key in KEYS {
            if let Some(raw) = get(key)
                && !value_is_valid(key, raw)
            {
                warn!("Ignoring invalid {SECTION}.{key}='{raw}'; using default.");
            }
        }

        Self {
            visible_rows,
            activation_mode,
            look_down_angle,
            scroll_mode,
            scroll_repeat_delay,
            scroll_repeat_interval,
            log_level,
        }
    }

    fn to_ini(&self) -> Ini {
        let mut conf = Ini::new();
        conf.with_section(Some(SECTION))
            .set("VisibleRows", self.visible_rows.to_string())
            .set("ActivationMode", self.activation_mode.as_str())
            .set("LookDownAngle", self.look_down_angle.to_string())
            .set("ScrollMode", self.scroll_mode.as_str())
            .set("ScrollRepeatDelay", self.scroll_repeat_delay.to_string())
            .set("ScrollRepeatInterval", self.scroll_repeat_interval.to_string())
            .set("LogLevel", self.log_level.as_str());
        conf
    }
}

fn value_is_valid(key: &str, raw: &str) -> bool {
    match key {
        "VisibleRows" | "LookDownAngle" => raw.parse::<f32>().is_ok_and(f32::is_finite),
        "ActivationMode" => ActivationMode::from_str(raw).is_ok(),
        "ScrollMode" => ScrollMode::from_str(raw).is_ok(),
        "ScrollRepeatDelay" | "ScrollRepeatInterval" => raw.parse::<u32>().is_ok(),
        "LogLevel" => LogLevel::from_str(raw).is_ok(),
        _ => true,
    }
}

/// `<platform config dir>/better_looting.ini`, or the working directory when
/// the platform has no home directory.
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("com", "mohuia", "better_looting").map_or_else(
        || PathBuf::from(CONFIG_FILE_NAME),
        |dirs| dirs.config_dir().join(CONFIG_FILE_NAME),
    )
}

fn create_default_config_file(path: &Path) -> Result<(), std::io::Error> {
    info!("'{}' not found, creating with default values.", path.display());
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Config::default().to_ini().write_to_file(path)
}

/// Reads the overlay config, writing a default file first if none exists.
/// Never fails: any I/O or parse problem is logged and defaults are used.
pub fn load(path: &Path) -> Config {
    if !path.exists()
        && let Err(e) = create_default_config_file(path)
    {
        warn!("Failed to create default config file: {e}");
        return Config::default();
    }

    match Ini::load_from_file(path) {
        Ok(conf) => {
            let cfg = Config::from_ini(&conf);
            let missing = KEYS
                .iter()
                .any(|k| conf.get_from(Some(SECTION), k).is_none());
            if missing {
                if let Err(e) = cfg.to_ini().write_to_file(path) {
                    warn!("Failed to save config file: {e}");
                } else {
                    info!(
                        "'{}' updated with default values for any missing fields.",
                        path.display()
                    );
                }
            }
            info!("Configuration loaded from '{}'.", path.display());
            cfg
        }
        Err(e) => {
            warn!("Failed to load '{}': {e}. Using default values.", path.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        assert_eq!(Config::from_ini_str(""), Config::default());
    }

    #[test]
    fn reads_every_key() {
        let cfg = Config::from_ini_str(
            "[Overlay]\n\
             VisibleRows=6\n\
             ActivationMode=KeyToggle\n\
             LookDownAngle=30\n\
             ScrollMode=keybind\n\
             ScrollRepeatDelay=8\n\
             ScrollRepeatInterval=2\n\
             LogLevel=debug\n",
        );
        assert_eq!(cfg.visible_rows, 6.0);
        assert_eq!(cfg.activation_mode, ActivationMode::KeyToggle);
        assert_eq!(cfg.look_down_angle, 30.0);
        assert_eq!(cfg.scroll_mode, ScrollMode::KeyBind);
        assert_eq!(cfg.scroll_repeat_delay, 8);
        assert_eq!(cfg.scroll_repeat_interval, 2);
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn bad_values_fall_back_and_ranges_clamp() {
        let cfg = Config::from_ini_str(
            "[Overlay]\n\
             VisibleRows=0.25\n\
             ActivationMode=Sometimes\n\
             ScrollRepeatInterval=0\n\
             ScrollRepeatDelay=-4\n",
        );
        assert_eq!(cfg.visible_rows, 1.0, "fewer than one row is clamped up");
        assert_eq!(cfg.activation_mode, ActivationMode::Always);
        assert_eq!(cfg.scroll_repeat_interval, 1, "zero interval would never repeat");
        assert_eq!(cfg.scroll_repeat_delay, 10);
    }

    #[test]
    fn keys_outside_the_overlay_section_are_ignored() {
        let cfg = Config::from_ini_str("[Other]\nVisibleRows=9\n");
        assert_eq!(cfg.visible_rows, Config::default().visible_rows);
    }

    #[test]
    fn enum_names_round_trip_through_as_str() {
        for mode in [
            ActivationMode::Always,
            ActivationMode::LookDown,
            ActivationMode::StandStill,
            ActivationMode::KeyHold,
            ActivationMode::KeyToggle,
        ] {
            assert_eq!(ActivationMode::from_str(mode.as_str()), Ok(mode));
        }
        for mode in [ScrollMode::Always, ScrollMode::KeyBind, ScrollMode::StandStill] {
            assert_eq!(ScrollMode::from_str(mode.as_str()), Ok(mode));
        }
        assert_eq!(LogLevel::from_str("WARNING"), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::Trace.as_level_filter(), LevelFilter::Trace);
    }

    #[test]
    fn load_creates_then_rereads_the_file() {
        let dir = std::env::temp_dir().join(format!("better_looting_cfg_{}", std::process::id()));
        let path = dir.join(CONFIG_FILE_NAME);
        let _ = std::fs::remove_file(&path);

        let created = load(&path);
        assert_eq!(created, Config::default());
        assert!(path.exists(), "default file should have been written");

        std::fs::write(&path, "[Overlay]\nVisibleRows=3\n").unwrap();
        let cfg = load(&path);
        assert_eq!(cfg.visible_rows, 3.0);
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(
            rewritten.contains("ScrollMode="),
            "missing keys are filled in on load:\n{rewritten}"
        );
        assert!(rewritten.contains("VisibleRows=3"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
