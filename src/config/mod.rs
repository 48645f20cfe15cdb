//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    num::{NonZeroU32, NonZeroUsize},
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::render::{DEFAULT_CONCURRENCY, RenderOptions};
use crate::infra::notion::{DEFAULT_API_BASE_URL, DEFAULT_NOTION_VERSION, MAX_PAGE_SIZE};

pub use cli::{CliArgs, Command, DatabaseArgs, FileArgs, OutputArgs, Overrides, PageArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blockdown";
const ENV_PREFIX: &str = "BLOCKDOWN";
const DEFAULT_RETRY_ATTEMPTS: u64 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub source: SourceSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub api_base_url: Url,
    pub token: Option<String>,
    pub notion_version: String,
    pub page_size: NonZeroU32,
    pub retry_attempts: NonZeroU32,
    pub retry_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub concurrency: NonZeroUsize,
    pub front_matter: bool,
}

impl RenderSettings {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            concurrency: self.concurrency.get(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    source: RawSourceSettings,
    render: RawRenderSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    api_base_url: Option<String>,
    token: Option<String>,
    notion_version: Option<String>,
    page_size: Option<u64>,
    retry_attempts: Option<u64>,
    retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    concurrency: Option<u64>,
    front_matter: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(token) = overrides.token.as_ref() {
            self.source.token = Some(token.clone());
        }
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.source.api_base_url = Some(url.clone());
        }
        if let Some(concurrency) = overrides.concurrency {
            self.render.concurrency = Some(concurrency);
        }
        if let Some(front_matter) = overrides.front_matter {
            self.render.front_matter = Some(front_matter);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            logging: build_logging_settings(raw.logging)?,
            source: build_source_settings(raw.source)?,
            render: build_render_settings(raw.render)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let raw_url = source
        .api_base_url
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let api_base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("source.api_base_url", format!("`{raw_url}`: {err}")))?;
    if !matches!(api_base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "source.api_base_url",
            "scheme must be http or https",
        ));
    }

    let page_size = non_zero_u32(
        source.page_size.unwrap_or(u64::from(MAX_PAGE_SIZE)),
        "source.page_size",
    )?;
    if page_size.get() > MAX_PAGE_SIZE {
        return Err(LoadError::invalid(
            "source.page_size",
            format!("must not exceed {MAX_PAGE_SIZE}"),
        ));
    }

    Ok(SourceSettings {
        api_base_url,
        token: source.token.filter(|token| !token.trim().is_empty()),
        notion_version: source
            .notion_version
            .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
        page_size,
        retry_attempts: non_zero_u32(
            source.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            "source.retry_attempts",
        )?,
        retry_delay: Duration::from_millis(source.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
    })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let concurrency = render.concurrency.unwrap_or(DEFAULT_CONCURRENCY as u64);
    let concurrency = usize::try_from(concurrency)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| LoadError::invalid("render.concurrency", "must be greater than zero"))?;

    Ok(RenderSettings {
        concurrency,
        front_matter: render.front_matter.unwrap_or(true),
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
