use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::UploadProfile;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const CONFIG_FILE_NAME: &str = "helpdesk.toml";
const APP_DIR_NAME: &str = "erasmus_helpdesk";

/// Variables identifying the terminal tab or window the process runs in.
const TERMINAL_SESSION_VARS: [&str; 5] =
    ["TERM_SESSION_ID", "WT_SESSION", "TMUX_PANE", "STY", "WINDOWID"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub mock: bool,
    pub upload_profile: UploadProfile,
    pub request_timeout_secs: Option<u64>,
    pub session_dir: Option<PathBuf>,
    pub session_scope: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            mock: false,
            upload_profile: UploadProfile::PdfRequired,
            request_timeout_secs: None,
            session_dir: None,
            session_scope: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    mock: Option<bool>,
    upload_profile: Option<String>,
    request_timeout_secs: Option<u64>,
    session_dir: Option<PathBuf>,
    session_scope: Option<String>,
}

impl Settings {
    /// Layers the saved preference file and then the environment on top of
    /// the defaults. Explicit command line overrides are applied afterwards
    /// by the caller with [`Settings::apply_api_override`].
    pub fn from_sources(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Settings::default();

        if let Some(raw) = file {
            match toml::from_str::<FileSettings>(raw) {
                Ok(file_cfg) => settings.apply_file(file_cfg),
                Err(err) => warn!(%err, "ignoring malformed settings file"),
            }
        }

        let env = |key: &str| non_blank(env(key));
        if let Some(v) = env("NEXT_PUBLIC_API_BASE") {
            settings.api_base = v;
        }
        if let Some(v) = env("HELPDESK_API_BASE") {
            settings.api_base = v;
        }
        if let Some(v) = env("HELPDESK_MOCK") {
            settings.mock = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = env("HELPDESK_UPLOAD_PROFILE") {
            match UploadProfile::parse(&v) {
                Some(profile) => settings.upload_profile = profile,
                None => warn!(value = %v, "unknown upload profile in environment"),
            }
        }
        if let Some(v) = env("HELPDESK_REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                settings.request_timeout_secs = Some(parsed);
            }
        }
        if let Some(v) = env("HELPDESK_SESSION_SCOPE") {
            settings.session_scope = Some(v);
        }

        settings
    }

    pub fn apply_api_override(&mut self, api_base: Option<&str>) {
        if let Some(v) = non_blank(api_base.map(str::to_string)) {
            self.api_base = v;
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolved_session_dir(&self) -> Option<PathBuf> {
        self.session_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR_NAME).join("sessions")))
    }

    /// Scope of the session store. A configured scope wins; otherwise the
    /// scope follows the terminal session, then the parent shell, so a value
    /// never outlives the session that wrote it. `None` means no session
    /// could be identified and values should stay in memory.
    pub fn session_scope_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
        parent_pid: Option<u32>,
    ) -> Option<String> {
        if let Some(scope) = &self.session_scope {
            return Some(scope.clone());
        }
        TERMINAL_SESSION_VARS
            .iter()
            .find_map(|key| non_blank(env(key)))
            .map(|id| format!("term-{id}"))
            .or_else(|| parent_pid.map(|pid| format!("shell-{pid}")))
    }

    pub fn resolved_session_scope(&self) -> Option<String> {
        self.session_scope_with(|key| std::env::var(key).ok(), parent_process_id())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = non_blank(file_cfg.api_base) {
            self.api_base = v;
        }
        if let Some(v) = file_cfg.mock {
            self.mock = v;
        }
        if let Some(v) = file_cfg.upload_profile {
            match UploadProfile::parse(&v) {
                Some(profile) => self.upload_profile = profile,
                None => warn!(value = %v, "unknown upload profile in settings file"),
            }
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
        if let Some(v) = file_cfg.session_dir {
            self.session_dir = Some(v);
        }
        if let Some(v) = non_blank(file_cfg.session_scope) {
            self.session_scope = Some(v);
        }
    }
}

#[cfg(unix)]
fn parent_process_id() -> Option<u32> {
    Some(std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_process_id() -> Option<u32> {
    None
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Reads the settings file at `path` (when present) and the process
/// environment.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let raw = path.and_then(|path| fs::read_to_string(path).ok());
    Settings::from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Persists a user-chosen API base, keeping any other keys already present
/// in the file.
pub fn save_api_base(path: &Path, api_base: &str) -> anyhow::Result<()> {
    let mut table = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<toml::Table>(&raw)
            .with_context(|| format!("settings file '{}' is not valid TOML", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };
    table.insert(
        "api_base".to_string(),
        toml::Value::String(api_base.trim().to_string()),
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create settings directory '{}'", parent.display())
        })?;
    }
    let rendered = toml::to_string(&table).context("failed to encode settings")?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write settings file '{}'", path.display()))?;
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
