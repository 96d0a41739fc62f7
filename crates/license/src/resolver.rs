//! Lizenzaufloesung
//!
//! Beantwortet Lizenzanfragen eines DRM-Clients (ClearKey-Format):
//!
//! ```json
//! {"kids": ["C8fDCUXrmdnOWDGVfu6O0Q=="], "type": "temporary"}
//! ```
//!
//! Die Anfrage gelingt nur als Ganzes. Ist eine einzige Key-ID nicht
//! dekodierbar oder nicht berechtigt, wird kein Schluessel ausgeliefert.

use std::{collections::HashSet, sync::Arc, time::Duration};

use lizenzserver_core::{ProductId, UserId};
use lizenzserver_db::{
    models::{LizenzSchluesselRecord, NeuerLizenzSchluessel},
    zeitlimit::mit_zeitlimit,
    LicenseRepository, Persistenz,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{LizenzError, LizenzResult},
    key::{client_key_id_dekodieren, Verschluesselungsschluessel},
};

/// Einziger unterstuetzter Lizenztyp
pub const LIZENZTYP_TEMPORAER: &str = "temporary";

/// Schluesseltyp im JWK-Sinn (symmetrisch)
const SCHLUESSELTYP_OCT: &str = "oct";

/// Lizenzanfrage des Clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LizenzAnfrage {
    /// Key-IDs in Base64
    #[serde(default)]
    pub kids: Vec<String>,
    #[serde(rename = "type", default)]
    pub typ: String,
}

/// Ein ausgelieferter Schluessel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LizenzSchluessel {
    pub kty: String,
    /// Schluesselmaterial in Standard-Base64
    pub k: String,
    /// Key-ID wie vom Client gesendet
    pub kid: String,
}

/// Lizenzantwort an den Client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LizenzAntwort {
    pub keys: Vec<LizenzSchluessel>,
    #[serde(rename = "type")]
    pub typ: String,
}

/// Entscheidet, welche Inhaltsschluessel ein Benutzer erhaelt
pub struct LizenzService<P: Persistenz> {
    db: Arc<P>,
    zeitlimit: Duration,
}

impl<P: Persistenz> LizenzService<P> {
    pub fn neu(db: Arc<P>, zeitlimit: Duration) -> Self {
        Self { db, zeitlimit }
    }

    /// Loest eine Lizenzanfrage fuer `user_id` auf
    ///
    /// Reihenfolge und Duplikate der Anfrage bleiben erhalten: jede
    /// angefragte Key-ID ergibt genau einen Eintrag in der Antwort.
    pub async fn lizenz_aufloesen(
        &self,
        user_id: UserId,
        anfrage: &LizenzAnfrage,
    ) -> LizenzResult<LizenzAntwort> {
        if anfrage.typ != LIZENZTYP_TEMPORAER {
            return Err(LizenzError::NichtUnterstuetzterTyp);
        }

        let berechtigt: HashSet<String> =
            mit_zeitlimit(self.zeitlimit, self.db.entitled_key_ids(user_id))
                .await?
                .into_iter()
                .collect();

        let mut keys = Vec::with_capacity(anfrage.kids.len());
        for kid in &anfrage.kids {
            let key_id = client_key_id_dekodieren(kid).map_err(LizenzError::UngueltigeAnfrage)?;

            if !berechtigt.contains(&key_id) {
                tracing::info!(user_id = %user_id, "Lizenzanfrage ohne Berechtigung abgelehnt");
                return Err(LizenzError::NichtBerechtigt);
            }

            let material = mit_zeitlimit(self.zeitlimit, self.db.key_material(&key_id))
                .await?
                .ok_or(LizenzError::SchluesselNichtGefunden)?;

            let schluessel = Verschluesselungsschluessel::aus_hex(&material).map_err(|e| {
                tracing::error!(user_id = %user_id, "Gespeichertes Schluesselmaterial ist kein Hex");
                LizenzError::UngueltigesSchluesselmaterial(e)
            })?;

            keys.push(LizenzSchluessel {
                kty: SCHLUESSELTYP_OCT.to_string(),
                k: schluessel.als_base64(),
                kid: kid.clone(),
            });
        }

        tracing::debug!(user_id = %user_id, anzahl = keys.len(), "Lizenz ausgestellt");

        Ok(LizenzAntwort {
            keys,
            typ: LIZENZTYP_TEMPORAER.to_string(),
        })
    }

    /// Legt einen Inhaltsschluessel fuer ein Produkt an
    ///
    /// Beide Werte werden als Hex erwartet und normalisiert gespeichert.
    pub async fn schluessel_hinzufuegen(
        &self,
        key_id_hex: &str,
        material_hex: &str,
        product_id: ProductId,
    ) -> LizenzResult<LizenzSchluesselRecord> {
        let key_id = Verschluesselungsschluessel::aus_hex(key_id_hex)?.als_hex();
        let material = Verschluesselungsschluessel::aus_hex(material_hex)?.als_hex();

        let ergebnis = mit_zeitlimit(
            self.zeitlimit,
            self.db.add_license_key(NeuerLizenzSchluessel {
                key_id: &key_id,
                encryption_key: &material,
                product_id,
            }),
        )
        .await;

        match ergebnis {
            Ok(record) => {
                tracing::info!(product_id = %product_id, "Inhaltsschluessel angelegt");
                Ok(record)
            }
            Err(e) if e.ist_eindeutigkeit() => Err(LizenzError::SchluesselExistiert),
            Err(e) => Err(e.into()),
        }
    }

    /// Traegt den Besitz eines Produkts ein
    pub async fn produkt_freischalten(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> LizenzResult<()> {
        mit_zeitlimit(self.zeitlimit, self.db.grant_product(user_id, product_id)).await?;
        tracing::info!(user_id = %user_id, product_id = %product_id, "Produkt freigeschaltet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lizenzserver_db::{models::NeuerBenutzer, MemoryDb, UserRepository};

    const KID_A: &str = "C8fDCUXrmdnOWDGVfu6O0Q==";
    const HEX_A: &str = "0bc7c30945eb99d9ce5831957eee8ed1";
    const HEX_B: &str = "11111111111111111111111111111111";
    const MATERIAL_A: &str = "00112233445566778899aabbccddeeff";

    async fn aufbau() -> (Arc<MemoryDb>, LizenzService<MemoryDb>, UserId) {
        let db = Arc::new(MemoryDb::neu());
        let alice = db
            .create(NeuerBenutzer {
                username: "alice",
                password_hash: "h",
            })
            .await
            .unwrap();
        let service = LizenzService::neu(Arc::clone(&db), Duration::from_secs(1));

        service
            .schluessel_hinzufuegen(HEX_A, MATERIAL_A, ProductId(1))
            .await
            .unwrap();
        service
            .schluessel_hinzufuegen(HEX_B, "ffeeddccbbaa99887766554433221100", ProductId(2))
            .await
            .unwrap();
        service
            .produkt_freischalten(alice.id, ProductId(1))
            .await
            .unwrap();

        (db, service, alice.id)
    }

    fn anfrage(kids: &[&str]) -> LizenzAnfrage {
        LizenzAnfrage {
            kids: kids.iter().map(|s| s.to_string()).collect(),
            typ: LIZENZTYP_TEMPORAER.into(),
        }
    }

    #[tokio::test]
    async fn berechtigter_schluessel() {
        let (_db, service, alice) = aufbau().await;

        let antwort = service.lizenz_aufloesen(alice, &anfrage(&[KID_A])).await.unwrap();
        assert_eq!(antwort.typ, "temporary");
        assert_eq!(
            antwort.keys,
            vec![LizenzSchluessel {
                kty: "oct".into(),
                k: "ABEiM0RVZneImaq7zN3u/w==".into(),
                kid: KID_A.into(),
            }]
        );
    }

    #[tokio::test]
    async fn leere_anfrage() {
        let (_db, service, alice) = aufbau().await;
        let antwort = service.lizenz_aufloesen(alice, &anfrage(&[])).await.unwrap();
        assert!(antwort.keys.is_empty());
        assert_eq!(antwort.typ, "temporary");
    }

    #[tokio::test]
    async fn ein_fremder_schluessel_verwirft_alles() {
        let (_db, service, alice) = aufbau().await;
        // HEX_B = 16 x 0x11
        let kid_b = "EREREREREREREREREREREQ==";

        assert!(matches!(
            service.lizenz_aufloesen(alice, &anfrage(&[KID_A, kid_b])).await,
            Err(LizenzError::NichtBerechtigt)
        ));
    }

    #[tokio::test]
    async fn duplikate_bleiben_erhalten() {
        let (_db, service, alice) = aufbau().await;
        let antwort = service
            .lizenz_aufloesen(alice, &anfrage(&[KID_A, "C8fDCUXrmdnOWDGVfu6O0Q", KID_A]))
            .await
            .unwrap();

        assert_eq!(antwort.keys.len(), 3);
        assert_eq!(antwort.keys[1].kid, "C8fDCUXrmdnOWDGVfu6O0Q");
        assert!(antwort.keys.iter().all(|k| k.k == "ABEiM0RVZneImaq7zN3u/w=="));
    }

    #[tokio::test]
    async fn falscher_typ() {
        let (_db, service, alice) = aufbau().await;
        let mut a = anfrage(&[KID_A]);
        a.typ = "persistent".into();

        assert!(matches!(
            service.lizenz_aufloesen(alice, &a).await,
            Err(LizenzError::NichtUnterstuetzterTyp)
        ));
    }

    #[tokio::test]
    async fn undekodierbare_key_id() {
        let (_db, service, alice) = aufbau().await;
        assert!(matches!(
            service.lizenz_aufloesen(alice, &anfrage(&[KID_A, "%%%"])).await,
            Err(LizenzError::UngueltigeAnfrage(_))
        ));
    }

    #[tokio::test]
    async fn kaputtes_schluesselmaterial() {
        let (db, service, alice) = aufbau().await;
        // Direkt ueber das Repository, der Service wuerde das Material ablehnen
        db.add_license_key(NeuerLizenzSchluessel {
            key_id: "22222222222222222222222222222222",
            encryption_key: "kein-hex",
            product_id: ProductId(1),
        })
        .await
        .unwrap();

        // 16 x 0x22
        let kid = "IiIiIiIiIiIiIiIiIiIiIg==";
        assert!(matches!(
            service.lizenz_aufloesen(alice, &anfrage(&[kid])).await,
            Err(LizenzError::UngueltigesSchluesselmaterial(_))
        ));
    }

    #[tokio::test]
    async fn doppelter_schluessel() {
        let (_db, service, _) = aufbau().await;
        assert!(matches!(
            service
                .schluessel_hinzufuegen(&HEX_A.to_uppercase(), MATERIAL_A, ProductId(3))
                .await,
            Err(LizenzError::SchluesselExistiert)
        ));
    }

    #[tokio::test]
    async fn ungueltiges_hex_beim_anlegen() {
        let (_db, service, _) = aufbau().await;
        assert!(matches!(
            service.schluessel_hinzufuegen("xyz", MATERIAL_A, ProductId(3)).await,
            Err(LizenzError::Codec(_))
        ));
    }

    #[tokio::test]
    async fn persistenzausfall() {
        let (db, service, alice) = aufbau().await;
        db.ausfall_simulieren(true);
        assert!(matches!(
            service.lizenz_aufloesen(alice, &anfrage(&[KID_A])).await,
            Err(LizenzError::PersistenzNichtVerfuegbar(_))
        ));
    }

    #[test]
    fn wire_format() {
        let a: LizenzAnfrage =
            serde_json::from_str(r#"{"kids":["C8fDCUXrmdnOWDGVfu6O0Q=="],"type":"temporary"}"#)
                .unwrap();
        assert_eq!(a.kids, vec![KID_A.to_string()]);

        let antwort = LizenzAntwort {
            keys: vec![],
            typ: "temporary".into(),
        };
        assert_eq!(
            serde_json::to_string(&antwort).unwrap(),
            r#"{"keys":[],"type":"temporary"}"#
        );
    }
}
