use chrono::NaiveDate;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions};
use std::path::PathBuf;
use std::time;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::week::WeekRotation;
use crate::email_client::{EmailClient, MailCredentials};

/// Plain variables honoured for deployments that predate the `APP_` prefix,
/// with the setting each one overrides.
const PLAIN_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("PORT", "application.port"),
    ("DB_PATH", "database.path"),
    ("MAIL_USER", "email_client.sender_email"),
    ("MAIL_API_KEY", "email_client.api_key"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub menu: MenuSettings,
    pub scheduler: SchedulerSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Directory holding `index.html` and `script.js`.
    pub static_dir: PathBuf,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub create_if_missing: bool,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    // Both halves of the credential pair are optional: without them the
    // server still runs and every send fails with a logged error.
    pub sender_email: Option<String>,
    pub api_key: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct MenuSettings {
    pub directory: PathBuf,
    pub reference_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub rotation_offset: u32,
}

#[derive(serde::Deserialize, Clone)]
pub struct SchedulerSettings {
    pub enabled: bool,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    pub fn get_week_rotation(&self) -> WeekRotation {
        WeekRotation::new(self.menu.reference_date, self.menu.rotation_offset)
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }

    pub fn set_db_path(&mut self, path: PathBuf) {
        self.database.path = path;
    }

    pub fn set_email_client_base_url(&mut self, base_url: String) {
        self.email_client.base_url = base_url;
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> SqliteConnectOptions {
        let mut options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing);

        // Statements are only interesting when debugging queries
        options.log_statements(tracing::log::LevelFilter::Trace);

        options
    }
}

impl EmailClientSettings {
    /// `Ok(None)` when the credential pair is incomplete, an error when the
    /// configured sender is not an email address.
    pub fn get_credentials(&self) -> Result<Option<MailCredentials>, String> {
        let (Some(sender), Some(api_key)) = (&self.sender_email, &self.api_key) else {
            return Ok(None);
        };

        Ok(Some(MailCredentials {
            sender: SubscriberEmail::parse(sender.clone())?,
            api_key: api_key.clone(),
        }))
    }

    pub fn timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(&self) -> Result<EmailClient, anyhow::Error> {
        let credentials = self
            .get_credentials()
            .map_err(|err| anyhow::anyhow!("Sender email is not valid: {}", err))?;

        if credentials.is_none() {
            tracing::warn!("Mail credentials are not configured, notifications will fail to send");
        }

        Ok(EmailClient::new(
            self.base_url.clone(),
            credentials,
            Some(self.timeout()),
        )?)
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Reads `APP_ENVIRONMENT`, falling back to development.
    pub fn from_env() -> Result<Self, String> {
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| Environment::Development.as_str().into())
            .try_into()
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "Unknown environment '{}'. Expected 'development' or 'production'.",
                other
            )),
        }
    }
}

/// Builds the settings from, in increasing priority:
/// `config/base.yaml`, `config/<environment>.yaml`, `APP_*` variables
/// (`APP_MENU__ROTATION_OFFSET=1` sets `menu.rotation_offset`) and the plain
/// deployment variables such as `PORT`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let config_directory = std::env::current_dir()
        .map_err(|err| ConfigError::Message(format!("Failed to determine the current directory: {}", err)))?
        .join("config");
    let environment = Environment::from_env().map_err(ConfigError::Message)?;

    let builder = Config::builder()
        .add_source(File::from(config_directory.join("base")).required(true))
        .add_source(File::from(config_directory.join(environment.as_str())).required(true))
        .add_source(config::Environment::with_prefix("app").separator("__"));
    let settings = with_plain_env_overrides(builder)?.build()?;

    tracing::info!("Loading {} configuration", environment.as_str());

    settings.try_deserialize()
}

fn with_plain_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (variable, key) in PLAIN_ENV_OVERRIDES {
        builder = builder.set_override_option(key, std::env::var(variable).ok())?;
    }

    Ok(builder)
}
