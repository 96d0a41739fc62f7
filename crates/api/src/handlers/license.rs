//! REST-Handler fuer die Schluesselausgabe

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use lizenzserver_db::Persistenz;
use lizenzserver_license::{LizenzAnfrage, LizenzAntwort, LizenzError};

use crate::{
    error::{ApiError, ApiResult},
    gate::AngemeldeterBenutzer,
    state::ApiState,
};

/// POST /api/licensing/keyserver/keyrequest
pub async fn lizenz_anfrage<P: Persistenz>(
    State(state): State<ApiState<P>>,
    Extension(angemeldet): Extension<AngemeldeterBenutzer>,
    body: Result<Json<LizenzAnfrage>, JsonRejection>,
) -> ApiResult<Json<LizenzAntwort>> {
    let Json(anfrage) = body.map_err(|_| {
        state.metriken.lizenz_anfrage_zaehlen("abgelehnt");
        ApiError::UngueltigeAnfrage("Invalid request".into())
    })?;

    match state
        .lizenz
        .lizenz_aufloesen(angemeldet.benutzer.id, &anfrage)
        .await
    {
        Ok(antwort) => {
            state.metriken.lizenz_anfrage_zaehlen("erfolg");
            Ok(Json(antwort))
        }
        Err(e) => {
            let ergebnis = match e {
                LizenzError::PersistenzNichtVerfuegbar(_)
                | LizenzError::UngueltigesSchluesselmaterial(_) => "fehler",
                _ => "abgelehnt",
            };
            state.metriken.lizenz_anfrage_zaehlen(ergebnis);
            Err(e.into())
        }
    }
}
