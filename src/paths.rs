use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;

/// Platform directory layout for ambitus (resolved by the `dirs` crate):
///   Config:  $XDG_CONFIG_HOME/ambitus  (~/.config/ambitus on Linux)
///   Data:    $XDG_DATA_HOME/ambitus    (~/.local/share/ambitus on Linux)
///
/// Takes live under <data>/recordings/YYYY-MM-DD/{step}_NNN.wav so repeated
/// attempts on the same day never overwrite each other.
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ambitus")
    })
}

pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ambitus")
    })
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn recordings_dir() -> PathBuf {
    data_dir().join("recordings")
}

/// Directory holding one day's takes.
pub fn day_dir(date: &NaiveDate) -> PathBuf {
    recordings_dir().join(date.to_string())
}

/// Path for the next attempt of a step on a date.
pub fn next_attempt_path(date: &NaiveDate, step: &str) -> PathBuf {
    next_attempt_in(&day_dir(date), step)
}

/// The highest-numbered attempt of a step on a date, if any.
pub fn latest_attempt_path(date: &NaiveDate, step: &str) -> Option<PathBuf> {
    attempts_in(&day_dir(date), step).pop()
}

/// Attempt number encoded in a file name like `song_003.wav`.
fn attempt_number(path: &Path, step: &str) -> Option<u32> {
    if path.extension()? != "wav" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(step)?
        .strip_prefix('_')?
        .parse()
        .ok()
}

/// All attempts of a step in a directory, in ascending attempt order.
fn attempts_in(dir: &Path, step: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut numbered: Vec<(u32, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter_map(|p| attempt_number(&p, step).map(|n| (n, p)))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);

    numbered.into_iter().map(|(_, p)| p).collect()
}

fn next_attempt_in(dir: &Path, step: &str) -> PathBuf {
    let next = attempts_in(dir, step)
        .iter()
        .filter_map(|p| attempt_number(p, step))
        .max()
        .unwrap_or(0)
        + 1;

    dir.join(format!("{step}_{next:03}.wav"))
}
