//! lizenzserver – Bibliotheks-Root
//!
//! Verdrahtet Persistenz, Auth- und Lizenzkern mit der REST-Schnittstelle.

pub mod config;

use std::{future::Future, net::SocketAddr, pin::Pin, sync::Arc};

use anyhow::{Context, Result};
use config::ServerConfig;
use lizenzserver_api::{ApiState, AuthGate, RestServer, RestServerKonfig};
use lizenzserver_auth::{AuthService, PasswortHasher};
use lizenzserver_db::SqliteDb;
use lizenzserver_license::LizenzService;
use lizenzserver_observability::{DbPruefung, HealthState, LizenzMetriken};

/// Haelt den Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren (Fehler beendet den Start)
    /// 2. Services und Auth-Gate bauen
    /// 3. REST-API mit Health und Metriken starten
    pub async fn starten(self) -> Result<()> {
        let bind_addr: SocketAddr = self
            .config
            .api_bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.config.api_bind_adresse()))?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_addr,
            "Server startet"
        );

        let db = Arc::new(
            SqliteDb::oeffnen(&self.config.datenbank_config())
                .await
                .context("Datenbank nicht verfuegbar")?,
        );

        let zeitlimit = self.config.datenbank_zeitlimit();
        let hasher = PasswortHasher::neu(&self.config.auth.argon2)?;
        let auth = Arc::new(AuthService::neu(
            Arc::clone(&db),
            hasher,
            self.config.token_gueltigkeit(),
            zeitlimit,
        )?);
        let lizenz = Arc::new(LizenzService::neu(Arc::clone(&db), zeitlimit));

        let state = ApiState::neu(
            Arc::clone(&auth),
            lizenz,
            LizenzMetriken::neu()?,
            self.config.auth.cookie_secure,
        );
        let gate = AuthGate::neu(auth);

        let ping_db = Arc::clone(&db);
        let pruefung: DbPruefung = Arc::new(move || {
            let db = Arc::clone(&ping_db);
            Box::pin(async move { db.ping().await }) as Pin<Box<dyn Future<Output = bool> + Send>>
        });

        let rest = RestServer::neu(RestServerKonfig {
            bind_addr,
            cors_origins: self.config.netzwerk.cors_origins.clone(),
        });
        let app = rest.router(state, gate, HealthState::mit_db_pruefung(pruefung));

        rest.starten(app).await
    }
}
