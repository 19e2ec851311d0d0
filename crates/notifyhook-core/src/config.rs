//! Configuration management for notifyhook.
//!
//! The relay is configured by one TOML file: the shared API key, listener and
//! transport settings, and an ordered table of channels. A channel's provider
//! is taken from its `kind` key, or from its name when `kind` is absent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::channel::ChannelKind;
use crate::error::{RelayError, Result};
use crate::transport::DEFAULT_TIMEOUT;

/// Environment variable that overrides `api_key` from the file.
pub const API_KEY_ENV: &str = "NOTIFYHOOK_API_KEY";

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Shared secret every request must present.
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub transport: TransportSettings,

    #[serde(default)]
    pub channels: ChannelRegistry,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Outbound delivery settings shared by every channel.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Binary used for local mail submission.
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

impl TransportSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            sendmail_path: default_sendmail_path(),
        }
    }
}

// ─── Channels ──────────────────────────────────────────────

/// One configured channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub enabled: bool,
    pub settings: ChannelSettings,
}

/// Provider-specific settings, one shape per provider kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSettings {
    Teams(TeamsSettings),
    Telegram(TelegramSettings),
    Slack(WebhookSettings),
    Discord(WebhookSettings),
    Ntfy(NtfySettings),
    Email(EmailSettings),
    /// A kind the relay has no adapter for. Dispatching to it always fails.
    Unknown { kind: String },
}

impl ChannelSettings {
    pub fn kind(&self) -> Option<ChannelKind> {
        match self {
            Self::Teams(_) => Some(ChannelKind::Teams),
            Self::Telegram(_) => Some(ChannelKind::Telegram),
            Self::Slack(_) => Some(ChannelKind::Slack),
            Self::Discord(_) => Some(ChannelKind::Discord),
            Self::Ntfy(_) => Some(ChannelKind::Ntfy),
            Self::Email(_) => Some(ChannelKind::Email),
            Self::Unknown { .. } => None,
        }
    }

    /// Required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let mut require = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                missing.push(field);
            }
        };
        match self {
            Self::Teams(s) => require(&s.webhook_url, "webhook_url"),
            Self::Telegram(s) => {
                require(&s.bot_token, "bot_token");
                require(&s.chat_id, "chat_id");
            }
            Self::Slack(s) | Self::Discord(s) => require(&s.webhook_url, "webhook_url"),
            Self::Ntfy(s) => {
                require(&s.url, "url");
                require(&s.topic, "topic");
            }
            Self::Email(s) => {
                require(&s.to, "to");
                require(&s.from, "from");
            }
            Self::Unknown { .. } => {}
        }
        missing
    }

    fn from_value(kind: &str, value: toml::Value) -> Result<Self> {
        let Some(known) = ChannelKind::parse(kind) else {
            return Ok(Self::Unknown {
                kind: kind.to_string(),
            });
        };
        Ok(match known {
            ChannelKind::Teams => Self::Teams(value.try_into()?),
            ChannelKind::Telegram => Self::Telegram(value.try_into()?),
            ChannelKind::Slack => Self::Slack(value.try_into()?),
            ChannelKind::Discord => Self::Discord(value.try_into()?),
            ChannelKind::Ntfy => Self::Ntfy(value.try_into()?),
            ChannelKind::Email => Self::Email(value.try_into()?),
        })
    }
}

/// Teams card flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamsMode {
    /// Incoming Webhook connector, MessageCard payload.
    #[default]
    Legacy,
    /// Power Automate workflow, Adaptive Card payload.
    Workflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamsSettings {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(rename = "type", default)]
    pub mode: TeamsMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramSettings {
    #[serde(default)]
    pub bot_token: String,
    /// Numeric ids and `@channel` names are both accepted.
    #[serde(default, deserialize_with = "string_or_int")]
    pub chat_id: String,
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

/// Slack and Discord incoming webhooks only need a URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookSettings {
    #[serde(default)]
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NtfySettings {
    #[serde(default = "default_ntfy_url")]
    pub url: String,
    #[serde(default)]
    pub topic: String,
    /// Access token for protected topics.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_ntfy_url() -> String {
    "https://ntfy.sh".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub to: String,
    #[serde(default = "default_email_from")]
    pub from: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_email_from() -> String {
    "noreply@example.com".to_string()
}

fn default_subject_prefix() -> String {
    "[Notify]".to_string()
}

fn string_or_int<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Str(String),
        Int(i64),
    }

    Ok(match StringOrInt::deserialize(deserializer)? {
        StringOrInt::Str(s) => s,
        StringOrInt::Int(i) => i.to_string(),
    })
}

/// Fields every channel table shares.
#[derive(Deserialize)]
struct ChannelHeader {
    #[serde(default)]
    enabled: bool,
    kind: Option<String>,
}

/// Ordered mapping from channel name to its configuration.
///
/// Order follows the configuration file; names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "toml::Table")]
pub struct ChannelRegistry {
    entries: Vec<(String, ChannelConfig)>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Fails if the name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, config: ChannelConfig) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(RelayError::Config(format!("duplicate channel: {}", name)));
        }
        self.entries.push((name, config));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ChannelConfig> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, config)| config)
    }

    /// The config for `name` if it exists and is enabled.
    pub fn enabled(&self, name: &str) -> Option<&ChannelConfig> {
        self.get(name).filter(|config| config.enabled)
    }

    /// Names of all enabled channels, in configuration order.
    pub fn enabled_names(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, config)| config.enabled)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelConfig)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<toml::Table> for ChannelRegistry {
    type Error = RelayError;

    fn try_from(table: toml::Table) -> Result<Self> {
        let mut registry = Self::new();
        for (name, value) in table {
            let header: ChannelHeader = value.clone().try_into().map_err(|e| {
                RelayError::Config(format!("channel '{}': {}", name, e))
            })?;
            let kind = header.kind.unwrap_or_else(|| name.clone());
            let settings = ChannelSettings::from_value(&kind, value)
                .map_err(|e| RelayError::Config(format!("channel '{}': {}", name, e)))?;
            registry.insert(
                name,
                ChannelConfig {
                    enabled: header.enabled,
                    settings,
                },
            )?;
        }
        Ok(registry)
    }
}

// ─── Loading ───────────────────────────────────────────────

impl RelayConfig {
    /// Load config from a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RelayError::Config(format!(
                "config file not found: {} (run `notifyhook config init`)",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RelayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Replace the API key when an override is present and non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            tracing::debug!("API key taken from {}", API_KEY_ENV);
            self.api_key = key;
        }
        self
    }

    /// Reject configs the relay cannot serve safely.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RelayError::Config("api_key must not be empty".to_string()));
        }
        if self.transport.timeout_secs == 0 {
            return Err(RelayError::Config(
                "transport.timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (name, config) in self.channels.iter().filter(|(_, c)| c.enabled) {
            let missing = config.settings.missing_fields();
            if !missing.is_empty() {
                return Err(RelayError::Config(format!(
                    "channel '{}' is enabled but missing: {}",
                    name,
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notifyhook")
            .join("config.toml")
    }

    /// Write the commented starter config to `path`.
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(RelayError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, CONFIG_TEMPLATE)?;
        Ok(())
    }
}

/// Starter config written by `notifyhook config init`.
pub const CONFIG_TEMPLATE: &str = r#"# notifyhook relay configuration.
# Set `enabled = true` for every channel you want active.

# Shared secret; clients send it as `X-API-Key`. Overridden by NOTIFYHOOK_API_KEY.
api_key = "change-me-to-a-strong-random-string"

[server]
host = "127.0.0.1"
port = 8080

[transport]
timeout_secs = 15
sendmail_path = "/usr/sbin/sendmail"

# Microsoft Teams: Incoming Webhook connector ("legacy") or Power Automate ("workflow").
[channels.teams]
enabled = false
webhook_url = ""
type = "legacy"

# Telegram: create a bot via @BotFather and start a chat with it first.
[channels.telegram]
enabled = false
bot_token = ""
chat_id = ""

# Slack: Incoming Webhook app.
[channels.slack]
enabled = false
webhook_url = ""

# Discord: Channel Settings -> Integrations -> Webhooks.
[channels.discord]
enabled = false
webhook_url = ""

# ntfy.sh or a self-hosted ntfy server.
[channels.ntfy]
enabled = false
url = "https://ntfy.sh"
topic = ""
# token = ""

# Email through the local sendmail binary.
[channels.email]
enabled = false
to = ""
from = "notifyhook@example.com"
subject_prefix = "[Notify]"
"#;
