//! Integration-Tests fuer TokenRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use lizenzserver_db::{
    models::{NeuerBenutzer, NeuesToken},
    SqliteDb, TokenRepository, UserRepository,
};

async fn db_mit_benutzer() -> (SqliteDb, lizenzserver_core::UserId) {
    let db = SqliteDb::in_memory().await.unwrap();
    let user = UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "alice",
            password_hash: "hash",
        },
    )
    .await
    .unwrap();
    (db, user.id)
}

#[tokio::test]
async fn token_speichern_und_laden() {
    let (db, user_id) = db_mit_benutzer().await;
    let jetzt = Utc::now();
    let secret = "ab".repeat(32);

    let token = TokenRepository::store(
        &db,
        NeuesToken {
            user_id,
            secret: &secret,
            password_fingerprint: "fp",
            issued_at: jetzt,
            expires_at: jetzt + Duration::days(7),
        },
    )
    .await
    .unwrap();

    let geladen = TokenRepository::get_by_secret(&db, &secret)
        .await
        .unwrap()
        .expect("Token sollte gefunden werden");

    assert_eq!(geladen.id, token.id);
    assert_eq!(geladen.user_id, user_id);
    assert_eq!(geladen.password_fingerprint, "fp");
    // RFC3339 behaelt die Sekunden, Vergleich auf Sekundenbasis
    assert_eq!(geladen.expires_at.timestamp(), token.expires_at.timestamp());
}

#[tokio::test]
async fn abgelaufenes_token_wird_trotzdem_geliefert() {
    let (db, user_id) = db_mit_benutzer().await;
    let jetzt = Utc::now();

    TokenRepository::store(
        &db,
        NeuesToken {
            user_id,
            secret: "alt",
            password_fingerprint: "fp",
            issued_at: jetzt - Duration::days(8),
            expires_at: jetzt - Duration::days(1),
        },
    )
    .await
    .unwrap();

    let geladen = TokenRepository::get_by_secret(&db, "alt").await.unwrap().unwrap();
    assert!(geladen.ist_abgelaufen(jetzt));
}

#[tokio::test]
async fn token_loeschen() {
    let (db, user_id) = db_mit_benutzer().await;
    let jetzt = Utc::now();

    for secret in ["s1", "s2"] {
        TokenRepository::store(
            &db,
            NeuesToken {
                user_id,
                secret,
                password_fingerprint: "fp",
                issued_at: jetzt,
                expires_at: jetzt + Duration::days(7),
            },
        )
        .await
        .unwrap();
    }

    assert!(TokenRepository::delete_by_secret(&db, "s1").await.unwrap());
    assert!(!TokenRepository::delete_by_secret(&db, "s1").await.unwrap());
    assert!(TokenRepository::get_by_secret(&db, "s1").await.unwrap().is_none());

    assert_eq!(TokenRepository::delete_for_user(&db, user_id).await.unwrap(), 1);
    assert!(TokenRepository::get_by_secret(&db, "s2").await.unwrap().is_none());
}

#[tokio::test]
async fn token_fuer_unbekannten_benutzer_scheitert() {
    let (db, _) = db_mit_benutzer().await;
    let jetzt = Utc::now();

    let ergebnis = TokenRepository::store(
        &db,
        NeuesToken {
            user_id: lizenzserver_core::UserId::new(),
            secret: "x",
            password_fingerprint: "fp",
            issued_at: jetzt,
            expires_at: jetzt + Duration::days(7),
        },
    )
    .await;
    assert!(ergebnis.is_err());
}
