//! Persist the best score to disk (XDG config or ~/.config/stacktower).

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILENAME: &str = "highscore";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("cannot write high score to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the default high score path (config dir / stacktower / highscore).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config"),
            Err(_) => return PathBuf::from(FILENAME),
        },
    };
    base.join("stacktower").join(FILENAME)
}

/// Plain-text file holding a single non-negative integer.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored score; 0 on missing file or parse error.
    pub fn load(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim().parse().unwrap_or_else(|_| {
                log::warn!("ignoring malformed high score file {}", self.path.display());
                0
            }),
            Err(_) => 0,
        }
    }

    /// Overwrite the stored score. Creates the parent directory if needed.
    pub fn save(&self, value: u32) -> Result<(), HighScoreError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, format!("{value}\n"))
        };
        write().map_err(|source| HighScoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Session best score backed by a store. A failed write is retried by [`HighScore::flush`].
#[derive(Debug)]
pub struct HighScore {
    best: u32,
    dirty: bool,
    store: HighScoreStore,
}

impl HighScore {
    /// Read the stored best once.
    pub fn load(store: HighScoreStore) -> Self {
        let best = store.load();
        log::info!("high score {} loaded from {}", best, store.path().display());
        Self {
            best,
            dirty: false,
            store,
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Offer a finished game's score. Returns true (and persists) when it beats the best.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        log::info!("new high score {} (was {})", score, self.best);
        self.best = score;
        self.dirty = true;
        self.flush();
        true
    }

    /// Write the best score if an earlier write has not landed yet.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        match self.store.save(self.best) {
            Ok(()) => self.dirty = false,
            Err(e) => log::warn!("{e}"),
        }
    }
}
