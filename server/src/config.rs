//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::time::Duration;

use anyhow::{bail, Context};
use lizenzserver_auth::HashParameter;
use lizenzserver_db::DatabaseConfig;
use lizenzserver_observability::logging::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Umgebungsvariable, die `[datenbank] url` ueberschreibt
pub const DATENBANK_URL_ENV: &str = "LS_DATABASE_URL";

/// Obergrenze fuer `[auth] token_gueltigkeit_stunden` (zehn Jahre)
pub const MAX_TOKEN_GUELTIGKEIT_STUNDEN: u64 = 24 * 365 * 10;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Tokens, Cookies und Passwort-Hashing
    pub auth: AuthEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename in Logs
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Lizenzserver".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer API, Health und Metriken
    pub api_port: u16,
    /// CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            api_port: 8080,
            cors_origins: vec![],
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
    /// Zeitlimit pro Datenbankaufruf in Millisekunden
    pub zeitlimit_ms: u64,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://lizenzserver.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
            zeitlimit_ms: 5_000,
        }
    }
}

/// Auth-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// Lebensdauer eines Tokens in Stunden
    pub token_gueltigkeit_stunden: u64,
    /// `Secure`-Attribut am Session-Cookie (nur fuer lokale Entwicklung abschalten)
    pub cookie_secure: bool,
    /// Argon2id-Parameter fuer neue Hashes
    pub argon2: HashParameter,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            token_gueltigkeit_stunden: 7 * 24,
            cookie_secure: true,
            argon2: HashParameter::default(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        if let Ok(url) = std::env::var(DATENBANK_URL_ENV) {
            config.datenbank.url = url;
        }

        config.validieren()?;
        Ok(config)
    }

    pub fn aus_toml(inhalt: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(inhalt)?)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            bail!("Unbekanntes Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            bail!("Unbekanntes Log-Format '{}'", self.logging.format);
        }
        if self.auth.token_gueltigkeit_stunden == 0 {
            bail!("[auth] token_gueltigkeit_stunden muss groesser als 0 sein");
        }
        if self.auth.token_gueltigkeit_stunden > MAX_TOKEN_GUELTIGKEIT_STUNDEN {
            bail!(
                "[auth] token_gueltigkeit_stunden darf hoechstens {MAX_TOKEN_GUELTIGKEIT_STUNDEN} sein"
            );
        }
        if self.datenbank.zeitlimit_ms == 0 {
            bail!("[datenbank] zeitlimit_ms muss groesser als 0 sein");
        }
        if self.datenbank.max_verbindungen == 0 {
            bail!("[datenbank] max_verbindungen muss groesser als 0 sein");
        }
        Ok(())
    }

    /// Gibt die Bind-Adresse fuer den REST-Server zurueck
    pub fn api_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.api_port)
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
            zeitlimit: self.datenbank_zeitlimit(),
        }
    }

    /// Saettigt statt zu ueberlaufen, falls `validieren` nicht lief
    pub fn token_gueltigkeit(&self) -> Duration {
        Duration::from_secs(self.auth.token_gueltigkeit_stunden.saturating_mul(60 * 60))
    }

    pub fn datenbank_zeitlimit(&self) -> Duration {
        Duration::from_millis(self.datenbank.zeitlimit_ms)
    }
}
