//! Persisted client state: the `jwt_token` cookie and the remembered login email

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{FileError, Result};

pub const TOKEN_COOKIE: &str = "jwt_token";

/// Where the session token lives between runs
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str, expires_at: Option<DateTime<Utc>>) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Single-cookie jar on disk: `jwt_token=<token>; Path=/; Expires=<date>`
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileCookieStore {
    fn load(&self) -> Result<Option<String>> {
        let content = match read_optional(&self.path)? {
            Some(c) => c,
            None => return Ok(None),
        };
        Ok(content.lines().find_map(parse_cookie_line))
    }

    fn save(&self, token: &str, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        let mut line = format!("{TOKEN_COOKIE}={token}; Path=/");
        if let Some(at) = expires_at {
            line.push_str(&format!("; Expires={}", at.to_rfc2822()));
        }
        line.push('\n');
        write_creating_dirs(&self.path, &line)?;
        debug!("session cookie written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }
}

fn parse_cookie_line(line: &str) -> Option<String> {
    let first = line.split(';').next()?.trim();
    let (name, value) = first.split_once('=')?;
    (name.trim() == TOKEN_COOKIE && !value.trim().is_empty()).then(|| value.trim().to_string())
}

/// In-process token holder
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn peek(&self) -> Option<String> {
        self.token.lock().map(|t| t.clone()).unwrap_or(None)
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.peek())
    }

    fn save(&self, token: &str, _expires_at: Option<DateTime<Utc>>) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// The `rememberedEmail` entry
pub struct RememberedEmailStore {
    path: PathBuf,
}

impl RememberedEmailStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<String>> {
        Ok(read_optional(&self.path)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    pub fn save(&self, email: &str) -> Result<()> {
        write_creating_dirs(&self.path, email.trim())
    }

    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
        .into()),
    }
}

fn write_creating_dirs(path: &Path, content: &str) -> Result<()> {
    let write_failed = |source| FileError::WriteFailed {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(path, content).map_err(write_failed)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FileError::DeleteFailed {
            path: path.display().to_string(),
            source,
        }
        .into()),
    }
}
