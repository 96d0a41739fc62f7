//! Integration-Tests fuer UserRepository (In-Memory SQLite)

use lizenzserver_db::{models::NeuerBenutzer, DbError, SqliteDb, UserRepository};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn benutzer_erstellen_und_laden() {
    let db = db().await;

    let user = UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "alice",
            password_hash: "hash_alice",
        },
    )
    .await
    .expect("Benutzer erstellen fehlgeschlagen");

    assert_eq!(user.username, "alice");

    let geladen = UserRepository::get_by_id(&db, user.id)
        .await
        .expect("get_by_id fehlgeschlagen")
        .expect("Benutzer sollte gefunden werden");

    assert_eq!(geladen.id, user.id);
    assert_eq!(geladen.username, "alice");
    assert_eq!(geladen.password_hash, "hash_alice");
}

#[tokio::test]
async fn benutzer_nach_name_laden() {
    let db = db().await;

    UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "bob",
            password_hash: "hash_bob",
        },
    )
    .await
    .unwrap();

    let gefunden = UserRepository::get_by_name(&db, "bob")
        .await
        .unwrap()
        .expect("Benutzer 'bob' sollte gefunden werden");
    assert_eq!(gefunden.username, "bob");

    assert!(UserRepository::get_by_name(&db, "unbekannt")
        .await
        .unwrap()
        .is_none());
    // Exakter Vergleich, keine Normalisierung
    assert!(UserRepository::get_by_name(&db, "Bob").await.unwrap().is_none());
}

#[tokio::test]
async fn benutzername_ist_eindeutig() {
    let db = db().await;

    UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "charlie",
            password_hash: "hash1",
        },
    )
    .await
    .unwrap();

    let err = UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "charlie",
            password_hash: "hash2",
        },
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, DbError::Eindeutigkeit(_)),
        "Erwartet Eindeutigkeitsfehler: {err}"
    );
}

#[tokio::test]
async fn passwort_hash_aktualisieren() {
    let db = db().await;

    let user = UserRepository::create(
        &db,
        NeuerBenutzer {
            username: "dora",
            password_hash: "alt",
        },
    )
    .await
    .unwrap();

    UserRepository::update_password_hash(&db, user.id, "neu")
        .await
        .unwrap();

    let geladen = UserRepository::get_by_id(&db, user.id).await.unwrap().unwrap();
    assert_eq!(geladen.password_hash, "neu");
}

#[tokio::test]
async fn passwort_hash_unbekannter_benutzer() {
    let db = db().await;

    let err = UserRepository::update_password_hash(&db, lizenzserver_core::UserId::new(), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NichtGefunden(_)));
}
