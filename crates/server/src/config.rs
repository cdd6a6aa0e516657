use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    /// Hosting project the canvas page is published under.
    pub project_id: Option<String>,
    pub canvas_url: Option<String>,
    pub public_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            project_id: None,
            canvas_url: None,
            public_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FirebaseConfig {
    #[serde(rename = "projectId")]
    project_id: Option<String>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml` keys, then environment variables.
pub(crate) fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
                if let Some(v) = file_cfg.get("project_id") {
                    settings.project_id = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("canvas_url") {
                    settings.canvas_url = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("public_dir") {
                    settings.public_dir = Some(PathBuf::from(v));
                }
            }
            Err(error) => tracing::warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(raw) = env("FIREBASE_CONFIG") {
        match serde_json::from_str::<FirebaseConfig>(&raw) {
            Ok(FirebaseConfig {
                project_id: Some(project_id),
            }) => settings.project_id = Some(project_id),
            Ok(_) => tracing::warn!("FIREBASE_CONFIG has no projectId"),
            Err(error) => tracing::warn!(%error, "ignoring malformed FIREBASE_CONFIG"),
        }
    }
    if let Some(v) = env("PROJECT_ID") {
        settings.project_id = Some(v);
    }
    if let Some(v) = env("APP__PROJECT_ID") {
        settings.project_id = Some(v);
    }

    if let Some(v) = env("CANVAS_URL") {
        settings.canvas_url = Some(v);
    }
    if let Some(v) = env("APP__CANVAS_URL") {
        settings.canvas_url = Some(v);
    }

    if let Some(v) = env("PUBLIC_DIR") {
        settings.public_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = env("APP__PUBLIC_DIR") {
        settings.public_dir = Some(PathBuf::from(v));
    }

    settings
}

/// The page embedded on welcome: explicit override, else the project's hosting domain.
pub fn resolve_canvas_url(settings: &Settings) -> anyhow::Result<String> {
    let raw = match (&settings.canvas_url, &settings.project_id) {
        (Some(url), _) => url.trim().to_string(),
        (None, Some(project_id)) => {
            let project_id = project_id.trim();
            if project_id.is_empty() {
                bail!("project id is empty; set PROJECT_ID or CANVAS_URL");
            }
            format!("https://{project_id}.firebaseapp.com")
        }
        (None, None) => bail!("no canvas page configured; set PROJECT_ID, FIREBASE_CONFIG or CANVAS_URL"),
    };

    let url = Url::parse(&raw).with_context(|| format!("invalid canvas url '{raw}'"))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        bail!("canvas url '{raw}' must use http or https");
    }
    Ok(raw)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
