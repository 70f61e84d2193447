use crate::models::{
    AutoMatchRequest, DateQuery, ErrorResponse, HealthResponse, MatchPairing, PairingCreateRequest, PairingEntry,
    RoundQuery,
};
use crate::services::{CacheKey, CacheManager, CachedDirectory, PairingError, PairingService, PostgresClient, PostgresError};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Option<Arc<CacheManager>>,
    pub directory: Arc<CachedDirectory<PostgresClient>>,
    pub pairing: PairingService,
}

impl AppState {
    async fn cached_pairings(&self, key: &str) -> Option<Vec<MatchPairing>> {
        let cache = self.cache.as_ref()?;
        cache.get::<Vec<MatchPairing>>(key).await.ok()
    }

    async fn store_cached_pairings(&self, key: &str, pairings: &[MatchPairing]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(key, &pairings).await {
                tracing::warn!("Failed to cache pairings under {}: {}", key, e);
            }
        }
    }

    /// Drop cached listings touched by a write to one round
    async fn invalidate_round(&self, session_date: NaiveDate, match_number: i32) {
        let Some(cache) = &self.cache else {
            return;
        };
        for key in [
            CacheKey::round_pairings(session_date, match_number),
            CacheKey::day_pairings(session_date),
        ] {
            if let Err(e) = cache.delete(&key).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }
        }
    }
}

/// Configure all pairing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match-pairings/auto-match", web::post().to(auto_match))
        .route("/match-pairings/date", web::get().to(get_by_date))
        .route("/match-pairings/date-and-match", web::get().to(get_by_round))
        .route("/match-pairings/date-and-match", web::delete().to(delete_by_round))
        .route("/match-pairings/exists", web::get().to(exists))
        .route("/match-pairings/batch", web::post().to(create_batch))
        .route("/match-pairings", web::post().to(create))
        .route("/match-pairings/{id}", web::delete().to(delete));
}

fn error_response(status_code: u16, error: &str, message: String) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code,
    };
    match status_code {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn storage_error(context: &str, err: PostgresError) -> HttpResponse {
    match err {
        PostgresError::InvalidInput(message) => error_response(400, "Invalid input", message),
        PostgresError::NotFound(message) => error_response(404, "Not found", message),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(500, context, other.to_string())
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Auto-match endpoint
///
/// POST /api/v1/match-pairings/auto-match
///
/// Request body:
/// ```json
/// {
///   "sessionDate": "2024-06-20",
///   "matchNumber": 2,
///   "participantIds": [1, 2, 3, 4, 5],
///   "seed": 42
/// }
/// ```
async fn auto_match(state: web::Data<AppState>, req: web::Json<AutoMatchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for auto-match request: {:?}", errors);
        return error_response(400, "Validation failed", errors.to_string());
    }

    let postgres = state.postgres.as_ref();
    match state
        .pairing
        .auto_match(postgres, postgres, state.directory.as_ref(), &req)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(
            e @ (PairingError::TooManyParticipants { .. }
            | PairingError::InvalidRound(_)
            | PairingError::InvalidDate { .. }),
        ) => {
            error_response(400, "Validation failed", e.to_string())
        }
        Err(PairingError::Storage(e)) => storage_error("Failed to load match history", e),
    }
}

/// Stored pairings for a date
///
/// GET /api/v1/match-pairings/date?date=2024-06-20
async fn get_by_date(state: web::Data<AppState>, query: web::Query<DateQuery>) -> impl Responder {
    let key = CacheKey::day_pairings(query.date);
    if let Some(pairings) = state.cached_pairings(&key).await {
        return HttpResponse::Ok().json(pairings);
    }

    match state.postgres.pairings_by_date(query.date).await {
        Ok(pairings) => {
            state.store_cached_pairings(&key, &pairings).await;
            HttpResponse::Ok().json(pairings)
        }
        Err(e) => storage_error("Failed to fetch pairings", e),
    }
}

/// Stored pairings for one round
///
/// GET /api/v1/match-pairings/date-and-match?date=2024-06-20&matchNumber=2
async fn get_by_round(state: web::Data<AppState>, query: web::Query<RoundQuery>) -> impl Responder {
    let key = CacheKey::round_pairings(query.date, query.match_number);
    if let Some(pairings) = state.cached_pairings(&key).await {
        return HttpResponse::Ok().json(pairings);
    }

    match state.postgres.pairings_by_round(query.date, query.match_number).await {
        Ok(pairings) => {
            state.store_cached_pairings(&key, &pairings).await;
            HttpResponse::Ok().json(pairings)
        }
        Err(e) => storage_error("Failed to fetch pairings", e),
    }
}

/// GET /api/v1/match-pairings/exists?date=2024-06-20&matchNumber=2
async fn exists(state: web::Data<AppState>, query: web::Query<RoundQuery>) -> impl Responder {
    match state.postgres.pairings_exist(query.date, query.match_number).await {
        Ok(found) => HttpResponse::Ok().json(found),
        Err(e) => storage_error("Failed to check pairings", e),
    }
}

/// Store one pairing
///
/// POST /api/v1/match-pairings
async fn create(state: web::Data<AppState>, req: web::Json<PairingCreateRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "Validation failed", errors.to_string());
    }

    tracing::info!(
        "Creating pairing for {} round {}: {} vs {}",
        req.session_date,
        req.match_number,
        req.player1_id,
        req.player2_id
    );

    match state
        .postgres
        .create_pairing(req.session_date, req.match_number, req.player1_id, req.player2_id, req.created_by)
        .await
    {
        Ok(pairing) => {
            state.invalidate_round(req.session_date, req.match_number).await;
            HttpResponse::Ok().json(pairing)
        }
        Err(e) => storage_error("Failed to create pairing", e),
    }
}

/// Replace all pairings of a round
///
/// POST /api/v1/match-pairings/batch?date=2024-06-20&matchNumber=2
async fn create_batch(
    state: web::Data<AppState>,
    query: web::Query<RoundQuery>,
    req: web::Json<Vec<PairingEntry>>,
) -> impl Responder {
    if query.match_number < 1 {
        return error_response(400, "Validation failed", "matchNumber must be at least 1".to_string());
    }
    for entry in req.iter() {
        if let Err(errors) = entry.validate() {
            return error_response(400, "Validation failed", errors.to_string());
        }
    }

    tracing::info!(
        "Replacing pairings for {} round {} with {} entries",
        query.date,
        query.match_number,
        req.len()
    );

    let pairs: Vec<_> = req
        .iter()
        .map(|e| (e.player1_id, e.player2_id, e.created_by))
        .collect();

    match state
        .postgres
        .replace_round_pairings(query.date, query.match_number, &pairs)
        .await
    {
        Ok(stored) => {
            state.invalidate_round(query.date, query.match_number).await;
            HttpResponse::Ok().json(stored)
        }
        Err(e) => storage_error("Failed to store pairings", e),
    }
}

/// DELETE /api/v1/match-pairings/{id}
async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    tracing::info!("Deleting pairing {}", id);

    match state.postgres.delete_pairing(id).await {
        Ok((session_date, match_number)) => {
            state.invalidate_round(session_date, match_number).await;
            HttpResponse::Ok().finish()
        }
        Err(e) => storage_error("Failed to delete pairing", e),
    }
}

/// DELETE /api/v1/match-pairings/date-and-match?date=2024-06-20&matchNumber=2
async fn delete_by_round(state: web::Data<AppState>, query: web::Query<RoundQuery>) -> impl Responder {
    match state.postgres.delete_round_pairings(query.date, query.match_number).await {
        Ok(_) => {
            state.invalidate_round(query.date, query.match_number).await;
            HttpResponse::Ok().finish()
        }
        Err(e) => storage_error("Failed to delete pairings", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PairingSettings;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    fn offline_state(max_participants: usize) -> AppState {
        let postgres = Arc::new(PostgresClient::lazy("postgres://karuta@localhost:5432/karuta").unwrap());
        AppState {
            directory: Arc::new(CachedDirectory::new(postgres.clone(), None)),
            postgres,
            cache: None,
            pairing: PairingService::new(&PairingSettings {
                max_participants,
                ..PairingSettings::default()
            }),
        }
    }

    async fn post_json(state: AppState, uri: &str, body: serde_json::Value) -> (StatusCode, ErrorResponse) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;
        let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let parsed: ErrorResponse = test::read_body_json(resp).await;
        (status, parsed)
    }

    #[actix_web::test]
    async fn test_auto_match_rejects_round_zero() {
        let (status, body) = post_json(
            offline_state(64),
            "/api/v1/match-pairings/auto-match",
            json!({"sessionDate": "2024-06-20", "matchNumber": 0, "participantIds": [1, 2]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Validation failed");
        assert_eq!(body.status_code, 400);
    }

    #[actix_web::test]
    async fn test_auto_match_rejects_too_many_participants() {
        let (status, body) = post_json(
            offline_state(2),
            "/api/v1/match-pairings/auto-match",
            json!({"sessionDate": "2024-06-20", "matchNumber": 1, "participantIds": [1, 2, 3]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("Too many participants"));
    }

    #[actix_web::test]
    async fn test_auto_match_rejects_unrepresentable_lookback() {
        let (status, body) = post_json(
            offline_state(64),
            "/api/v1/match-pairings/auto-match",
            json!({"sessionDate": "-262143-01-05", "matchNumber": 1, "participantIds": [1, 2]}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("lookback"));
    }

    #[actix_web::test]
    async fn test_batch_rejects_self_pair() {
        let (status, body) = post_json(
            offline_state(64),
            "/api/v1/match-pairings/batch?date=2024-06-20&matchNumber=2",
            json!([
                {"player1Id": 1, "player2Id": 2},
                {"player1Id": 3, "player2Id": 3}
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Validation failed");
    }

    #[actix_web::test]
    async fn test_storage_error_mapping() {
        let not_found = storage_error("ctx", PostgresError::NotFound("match pairing 3".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = storage_error("ctx", PostgresError::InvalidInput("self pair".to_string()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(invalid.into_body()).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.status_code, 400);
        assert_eq!(parsed.message, "self pair");
    }
}
