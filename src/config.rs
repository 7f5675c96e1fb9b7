use crate::sim::Timings;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use log::warn;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const FPS_MIN: u32 = 10;
const FPS_MAX: u32 = 240;
const ACTIVITY_MS_MAX: u64 = 60_000;
const NAME_MAX: usize = 18;

#[derive(Parser, Debug, Default)]
#[command(name = "moonlight", about = "A tiny virtual pet for your terminal")]
pub(crate) struct Cli {
    /// Frame cap (10..=240)
    #[arg(long)]
    pub(crate) fps: Option<u32>,
    /// Disable 24-bit colour
    #[arg(long)]
    pub(crate) no_color: bool,
    /// Activity duration multiplier, 0.5 = twice as fast
    #[arg(long)]
    pub(crate) speed: Option<f32>,
    /// Settings file (JSON)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Where log lines go
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) feed_ms: u64,
    pub(crate) sleep_ms: u64,
    pub(crate) play_ms: u64,
    pub(crate) pet_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            feed_ms: 2000,
            sleep_ms: 3000,
            play_ms: 1500,
            pet_name: "Moonlight".to_string(),
        }
    }
}

impl Settings {
    pub(crate) fn timings(&self) -> Timings {
        Timings {
            feed: Duration::from_millis(self.feed_ms),
            sleep: Duration::from_millis(self.sleep_ms),
            play: Duration::from_millis(self.play_ms),
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(fps) = cli.fps {
            self.fps_cap = fps;
        }
        if cli.no_color {
            self.enable_color = false;
        }
        if let Some(k) = cli.speed {
            if k.is_finite() && k > 0.0 {
                let scale = |v: u64| ((v as f64) * k as f64).round() as u64;
                self.feed_ms = scale(self.feed_ms);
                self.sleep_ms = scale(self.sleep_ms);
                self.play_ms = scale(self.play_ms);
            } else {
                warn!("ignoring --speed {k}, must be > 0");
            }
        }
    }

    /// Pull out-of-range values back into range.
    fn sanitize(&mut self) {
        let fps = self.fps_cap.clamp(FPS_MIN, FPS_MAX);
        if fps != self.fps_cap {
            warn!("fps_cap {} clamped to {fps}", self.fps_cap);
            self.fps_cap = fps;
        }
        for (key, v) in [
            ("feed_ms", &mut self.feed_ms),
            ("sleep_ms", &mut self.sleep_ms),
            ("play_ms", &mut self.play_ms),
        ] {
            let c = (*v).clamp(1, ACTIVITY_MS_MAX);
            if c != *v {
                warn!("{key} {} clamped to {c}", *v);
                *v = c;
            }
        }
        let name = self.pet_name.trim();
        if name.is_empty() {
            self.pet_name = Settings::default().pet_name;
        } else if name.chars().count() > NAME_MAX {
            warn!("pet_name truncated to {NAME_MAX} chars");
            self.pet_name = name.chars().take(NAME_MAX).collect();
        } else {
            self.pet_name = name.to_string();
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "moonlight", "Moonlight")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("moonlight.log"),
    })
}

/// Platform dirs are only consulted for what the CLI leaves unset.
pub(crate) fn paths_for(cli: &Cli) -> Result<Option<Paths>> {
    if cli.config.is_some() && cli.log_file.is_some() {
        return Ok(None);
    }
    project_paths().map(Some)
}

/// Settings file first, CLI on top. Never fails on a bad file.
pub(crate) fn resolve(cli: &Cli, paths: Option<&Paths>) -> Settings {
    let path = cli
        .config
        .as_deref()
        .or_else(|| paths.map(|p| p.settings_path.as_path()));
    let mut s = path.map(load_settings).unwrap_or_default();
    s.apply_cli(cli);
    s.sanitize();
    s
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    let Ok(text) = fs::read_to_string(path) else {
        return Settings::default();
    };
    parse_settings(&text).unwrap_or_else(|e| {
        warn!("{}: {e}, using defaults", path.display());
        Settings::default()
    })
}

fn parse_settings(text: &str) -> Result<Settings> {
    serde_json::from_str(text).context("invalid settings")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let s = parse_settings(r#"{ "fps_cap": 60, "pet_name": "Luna" }"#).unwrap();
        assert_eq!(s.fps_cap, 60);
        assert_eq!(s.pet_name, "Luna");
        assert_eq!(s.feed_ms, 2000);
        assert!(s.enable_color);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_settings("not json").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let s = load_settings(Path::new("/definitely/not/here/settings.json"));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn cli_overrides_file() {
        let mut s = Settings::default();
        let cli = Cli {
            fps: Some(90),
            no_color: true,
            speed: Some(0.5),
            ..Cli::default()
        };
        s.apply_cli(&cli);
        assert_eq!(s.fps_cap, 90);
        assert!(!s.enable_color);
        assert_eq!((s.feed_ms, s.sleep_ms, s.play_ms), (1000, 1500, 750));
    }

    #[test]
    fn bad_speed_is_ignored() {
        let mut s = Settings::default();
        s.apply_cli(&Cli {
            speed: Some(-2.0),
            ..Cli::default()
        });
        assert_eq!(s.feed_ms, 2000);
    }

    #[test]
    fn sanitize_clamps() {
        let mut s = Settings {
            fps_cap: 1000,
            feed_ms: 0,
            sleep_ms: 999_999,
            pet_name: "   ".to_string(),
            ..Settings::default()
        };
        s.sanitize();
        assert_eq!(s.fps_cap, FPS_MAX);
        assert_eq!(s.feed_ms, 1);
        assert_eq!(s.sleep_ms, ACTIVITY_MS_MAX);
        assert_eq!(s.pet_name, "Moonlight");
    }

    #[test]
    fn long_names_are_cut() {
        let mut s = Settings {
            pet_name: "a".repeat(40),
            ..Settings::default()
        };
        s.sanitize();
        assert_eq!(s.pet_name.len(), NAME_MAX);
    }

    #[test]
    fn timings_from_settings() {
        let t = Settings::default().timings();
        assert_eq!(t, Timings::default());
    }

    #[test]
    fn explicit_paths_skip_project_dirs() {
        let cli = Cli {
            config: Some(PathBuf::from("/tmp/moonlight-settings.json")),
            log_file: Some(PathBuf::from("/tmp/moonlight.log")),
            ..Cli::default()
        };
        assert!(paths_for(&cli).unwrap().is_none());
    }

    #[test]
    fn resolve_reads_explicit_config_without_project_dirs() {
        let path = std::env::temp_dir().join(format!("moonlight-{}.json", std::process::id()));
        fs::write(&path, r#"{ "fps_cap": 5, "pet_name": "Luna" }"#).unwrap();
        let cli = Cli {
            config: Some(path.clone()),
            ..Cli::default()
        };
        let s = resolve(&cli, None);
        fs::remove_file(&path).ok();
        assert_eq!(s.pet_name, "Luna");
        assert_eq!(s.fps_cap, FPS_MIN);
    }

    #[test]
    fn resolve_without_any_path_gives_defaults() {
        assert_eq!(resolve(&Cli::default(), None), Settings::default());
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from(["moonlight", "--fps", "60", "--no-color", "--speed", "2"])
            .unwrap();
        assert_eq!(cli.fps, Some(60));
        assert!(cli.no_color);
        assert_eq!(cli.speed, Some(2.0));
    }
}
