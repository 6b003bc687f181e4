use crate::captions::DEFAULT_CAPTIONS;
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A little love letter for your terminal.
#[derive(Debug, Parser)]
#[command(name = "romance", version)]
pub(crate) struct Args {
    /// frame cap (10..240)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// RNG seed, 0 = random
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// settings file (JSON); defaults to the platform config dir
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// skip the 3-D star backdrop
    #[arg(long)]
    pub(crate) no_backdrop: bool,

    /// start with sparkles off
    #[arg(long)]
    pub(crate) no_sparkles: bool,

    /// monochrome output
    #[arg(long)]
    pub(crate) no_color: bool,

    /// command that plays background music, e.g. "mpv --loop song.ogg"
    #[arg(long)]
    pub(crate) audio_cmd: Option<String>,

    /// page pixels per braille dot
    #[arg(long)]
    pub(crate) scale: Option<f32>,

    /// write logs here instead of stderr
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) seed: u64,
    pub(crate) backdrop: bool,
    pub(crate) sparkles: bool,
    pub(crate) enable_color: bool,
    pub(crate) px_per_dot: f32,
    pub(crate) audio_command: Option<String>,
    pub(crate) caption_interval: f32,
    pub(crate) captions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            seed: 0,
            backdrop: true,
            sparkles: true,
            enable_color: true,
            px_per_dot: 3.0,
            audio_command: None,
            caption_interval: 4.2,
            captions: DEFAULT_CAPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Command-line flags win over the file.
    pub(crate) fn apply_args(mut self, args: &Args) -> Self {
        if let Some(fps) = args.fps {
            self.fps_cap = fps;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if args.no_backdrop {
            self.backdrop = false;
        }
        if args.no_sparkles {
            self.sparkles = false;
        }
        if args.no_color {
            self.enable_color = false;
        }
        if let Some(cmd) = &args.audio_cmd {
            self.audio_command = Some(cmd.clone());
        }
        if let Some(scale) = args.scale {
            self.px_per_dot = scale;
        }
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self.px_per_dot = self.px_per_dot.clamp(0.5, 12.0);
        self
    }
}

pub(crate) fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "romance", "Romance")
        .map(|proj| proj.config_dir().join("settings.json"))
}

/// Missing or malformed files fall back to defaults.
pub(crate) fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<Settings>(&s) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("ignoring {}: {e}", path.display());
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

pub(crate) fn resolve(args: &Args) -> Settings {
    let path = args.config.clone().or_else(default_settings_path);
    let base = match &path {
        Some(p) => load_settings(p),
        None => Settings::default(),
    };
    base.apply_args(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_file(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("romance-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let p = temp_file("partial.json", r#"{ "fps_cap": 30, "captions": ["hi"] }"#);
        let s = load_settings(&p);
        assert_eq!(s.fps_cap, 30);
        assert_eq!(s.captions, vec!["hi".to_string()]);
        assert!(s.backdrop);
        assert_eq!(s.px_per_dot, 3.0);
    }

    #[test]
    fn broken_file_falls_back() {
        let p = temp_file("broken.json", "{ not json");
        assert_eq!(load_settings(&p), Settings::default());
        assert_eq!(
            load_settings(Path::new("/definitely/not/here.json")),
            Settings::default()
        );
    }

    #[test]
    fn flags_override_file() {
        let args = Args::parse_from([
            "romance",
            "--fps",
            "500",
            "--no-backdrop",
            "--audio-cmd",
            "mpv --loop a.ogg",
            "--seed",
            "9",
        ]);
        let s = Settings::default().apply_args(&args);
        assert_eq!(s.fps_cap, 240);
        assert!(!s.backdrop);
        assert!(s.sparkles);
        assert_eq!(s.seed, 9);
        assert_eq!(s.audio_command.as_deref(), Some("mpv --loop a.ogg"));
    }
}
