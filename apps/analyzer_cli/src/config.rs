use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::ControllerOptions;
use serde::Deserialize;
use shared::domain::SliderState;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub preview_debounce_ms: u64,
    pub default_k: u32,
    pub default_b_weight: u32,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let sliders = SliderState::default();
        Self {
            api_base_url: "http://localhost:3000".into(),
            preview_debounce_ms: 300,
            default_k: sliders.k,
            default_b_weight: sliders.b_weight,
            output_dir: PathBuf::from("./analyzer-output"),
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            preview_debounce: Duration::from_millis(self.preview_debounce_ms),
            initial_sliders: SliderState {
                k: self.default_k,
                b_weight: self.default_b_weight,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    preview_debounce_ms: Option<u64>,
    default_k: Option<u32>,
    default_b_weight: Option<u32>,
    output_dir: Option<PathBuf>,
}

/// Defaults, then the TOML file, then environment variables.
///
/// An explicitly requested config file must exist; the default one is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(error) if required => {
            return Err(error).with_context(|| {
                format!("failed to read config file '{}'", path.display())
            });
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.preview_debounce_ms {
        settings.preview_debounce_ms = v;
    }
    if let Some(v) = file_cfg.default_k {
        settings.default_k = v;
    }
    if let Some(v) = file_cfg.default_b_weight {
        settings.default_b_weight = v;
    }
    if let Some(v) = file_cfg.output_dir {
        settings.output_dir = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ANALYZER_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__PREVIEW_DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.preview_debounce_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__DEFAULT_K") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.default_k = parsed;
        }
    }
    if let Some(v) = lookup("APP__DEFAULT_B_WEIGHT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.default_b_weight = parsed;
        }
    }

    if let Some(v) = lookup("APP__OUTPUT_DIR") {
        settings.output_dir = PathBuf::from(v);
    }
}

/// Validates an http(s) origin and strips trailing slashes.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url '{raw}' must use http or https");
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("api url '{raw}' must not carry a query or fragment");
    }
    Ok(raw.trim_end_matches('/').to_string())
}
