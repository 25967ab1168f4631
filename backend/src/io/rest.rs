use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::commands::elder::RegisterElderCommand;
use crate::domain::commands::medication::AddMedicationCommand;
use crate::domain::errors::StoreError;
use crate::domain::models::elder::Elder;
use crate::domain::models::intake_log::IntakeLogEntry;
use crate::domain::models::medication::Medication;
use crate::domain::{ElderService, IntakeService, MedicationService};
use crate::speech::SpeechSynthesizer;
use base64::Engine;
use shared::{
    AddMedicationRequest, LoginRequest, RecordIntakeRequest, RegisterElderRequest, SpeakRequest,
    SpeakResponse, TakenTodayResponse,
};

/// Application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub elder_service: ElderService,
    pub medication_service: MedicationService,
    pub intake_service: IntakeService,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/elders", post(register_elder).get(list_elders))
        .route("/elders/login", post(login))
        .route("/elders/:id", get(get_elder).delete(delete_elder))
        .route(
            "/elders/:id/medications",
            post(add_medication).get(list_medications),
        )
        .route(
            "/elders/:id/medications/:med_id",
            get(get_medication).delete(delete_medication),
        )
        .route(
            "/elders/:id/medications/:med_id/intake",
            post(record_intake),
        )
        .route(
            "/elders/:id/medications/:med_id/taken-today",
            get(taken_today),
        )
        .route("/elders/:id/log", get(list_log))
        .route("/elders/:id/help", post(request_help).delete(clear_help))
        .route("/speech", post(speak))
        .with_state(state)
}

/// Map the domain error taxonomy onto HTTP status codes.
fn store_error_response(e: StoreError) -> Response {
    match e {
        StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
        StoreError::Backend(err) => {
            error!("Storage backend error: {:?}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage backend error").into_response()
        }
    }
}

fn elder_to_wire(elder: &Elder) -> shared::Elder {
    shared::Elder {
        id: elder.id.clone(),
        name: elder.name.clone(),
        age: elder.age,
        gender: elder.gender,
        icon: elder.icon().to_string(),
        access_code: elder.access_code.clone(),
        help_requested: elder.help_requested,
        created_at: elder.created_at.to_rfc3339(),
        updated_at: elder.updated_at.to_rfc3339(),
    }
}

fn medication_to_wire(medication: &Medication) -> shared::Medication {
    shared::Medication {
        id: medication.id.clone(),
        elder_id: medication.elder_id.clone(),
        name: medication.name.clone(),
        dosage: medication.dosage.clone(),
        frequency: medication.frequency.clone(),
        created_at: medication.created_at.to_rfc3339(),
    }
}

fn entry_to_wire(entry: &IntakeLogEntry) -> shared::IntakeLogEntry {
    shared::IntakeLogEntry {
        id: entry.id.clone(),
        elder_id: entry.elder_id.clone(),
        medication_id: entry.medication_id.clone(),
        medication_name_snapshot: entry.medication_name.clone(),
        date: entry.date.format("%Y-%m-%d").to_string(),
        time: entry.time.format("%H:%M").to_string(),
        status: match entry.status {
            crate::domain::models::intake_log::IntakeStatus::Taken => shared::IntakeStatus::Taken,
        },
    }
}

/// POST /api/elders
pub async fn register_elder(
    State(state): State<AppState>,
    Json(request): Json<RegisterElderRequest>,
) -> impl IntoResponse {
    info!("POST /api/elders - name: {}", request.name);

    let command = RegisterElderCommand {
        name: request.name,
        age: request.age,
        gender: request.gender,
    };

    match state.elder_service.register_elder(command, Utc::now()) {
        Ok(elder) => (StatusCode::CREATED, Json(elder_to_wire(&elder))).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/elders
pub async fn list_elders(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/elders");

    match state.elder_service.list_elders() {
        Ok(elders) => {
            let wire: Vec<shared::Elder> = elders.iter().map(elder_to_wire).collect();
            (StatusCode::OK, Json(wire)).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// GET /api/elders/:id
pub async fn get_elder(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/elders/{}", elder_id);

    match state.elder_service.get_elder(&elder_id) {
        Ok(Some(elder)) => (StatusCode::OK, Json(elder_to_wire(&elder))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Elder not found").into_response(),
        Err(e) => store_error_response(e),
    }
}

/// DELETE /api/elders/:id
pub async fn delete_elder(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/elders/{}", elder_id);

    match state.elder_service.delete_elder(&elder_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/elders/login
///
/// A failed login is an expected path: it maps to 404, not to an error in
/// the logs.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/elders/login");

    match state.elder_service.find_elder_by_code(&request.access_code) {
        Ok(Some(elder)) => (StatusCode::OK, Json(elder_to_wire(&elder))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Invalid access code").into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/elders/:id/medications
pub async fn add_medication(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
    Json(request): Json<AddMedicationRequest>,
) -> impl IntoResponse {
    info!("POST /api/elders/{}/medications - name: {}", elder_id, request.name);

    let command = AddMedicationCommand {
        elder_id,
        name: request.name,
        dosage: request.dosage,
        frequency: request.frequency,
    };

    match state.medication_service.add_medication(command, Utc::now()) {
        Ok(medication) => {
            (StatusCode::CREATED, Json(medication_to_wire(&medication))).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// GET /api/elders/:id/medications
pub async fn list_medications(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/elders/{}/medications", elder_id);

    match state.medication_service.list_medications(&elder_id) {
        Ok(medications) => {
            let wire: Vec<shared::Medication> =
                medications.iter().map(medication_to_wire).collect();
            (StatusCode::OK, Json(wire)).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// GET /api/elders/:id/medications/:med_id
pub async fn get_medication(
    State(state): State<AppState>,
    Path((elder_id, medication_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/elders/{}/medications/{}", elder_id, medication_id);

    match state
        .medication_service
        .get_medication(&elder_id, &medication_id)
    {
        Ok(Some(medication)) => {
            (StatusCode::OK, Json(medication_to_wire(&medication))).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Medication not found").into_response(),
        Err(e) => store_error_response(e),
    }
}

/// DELETE /api/elders/:id/medications/:med_id
pub async fn delete_medication(
    State(state): State<AppState>,
    Path((elder_id, medication_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/elders/{}/medications/{}", elder_id, medication_id);

    match state
        .medication_service
        .delete_medication(&elder_id, &medication_id)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/elders/:id/medications/:med_id/intake
pub async fn record_intake(
    State(state): State<AppState>,
    Path((elder_id, medication_id)): Path<(String, String)>,
    request: Option<Json<RecordIntakeRequest>>,
) -> impl IntoResponse {
    info!("POST /api/elders/{}/medications/{}/intake", elder_id, medication_id);

    let now = match request.and_then(|Json(r)| r.timestamp) {
        Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                return (StatusCode::BAD_REQUEST, "Invalid RFC 3339 timestamp").into_response()
            }
        },
        None => Utc::now(),
    };

    match state
        .intake_service
        .record_intake(&elder_id, &medication_id, now)
    {
        Ok(entry) => (StatusCode::CREATED, Json(entry_to_wire(&entry))).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// Query parameters for the taken-today endpoint.
#[derive(Deserialize, Debug)]
pub struct TakenTodayQuery {
    /// ISO date; defaults to the server's current UTC date.
    pub date: Option<String>,
}

/// GET /api/elders/:id/medications/:med_id/taken-today
pub async fn taken_today(
    State(state): State<AppState>,
    Path((elder_id, medication_id)): Path<(String, String)>,
    Query(query): Query<TakenTodayQuery>,
) -> impl IntoResponse {
    info!(
        "GET /api/elders/{}/medications/{}/taken-today - query: {:?}",
        elder_id, medication_id, query
    );

    let today = match query.date {
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, "Invalid date, expected YYYY-MM-DD")
                    .into_response()
            }
        },
        None => Utc::now().date_naive(),
    };

    match state
        .intake_service
        .is_taken_today(&elder_id, &medication_id, today)
    {
        Ok(taken) => (StatusCode::OK, Json(TakenTodayResponse { taken })).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/elders/:id/log
pub async fn list_log(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/elders/{}/log", elder_id);

    match state.intake_service.list_log(&elder_id) {
        Ok(entries) => {
            let wire: Vec<shared::IntakeLogEntry> = entries.iter().map(entry_to_wire).collect();
            (StatusCode::OK, Json(wire)).into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// POST /api/elders/:id/help
pub async fn request_help(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/elders/{}/help", elder_id);

    match state.elder_service.request_help(&elder_id, Utc::now()) {
        Ok(elder) => (StatusCode::OK, Json(elder_to_wire(&elder))).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// DELETE /api/elders/:id/help
pub async fn clear_help(
    State(state): State<AppState>,
    Path(elder_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/elders/{}/help", elder_id);

    match state.elder_service.clear_help(&elder_id, Utc::now()) {
        Ok(elder) => (StatusCode::OK, Json(elder_to_wire(&elder))).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/speech
///
/// 204 when the speech service is unavailable: audio is best-effort and the
/// caller simply skips playback.
pub async fn speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> impl IntoResponse {
    info!("POST /api/speech - {} chars", request.text.len());

    match state.speech.synthesize(&request.text).await {
        Some(audio) => {
            let audio_base64 = base64::engine::general_purpose::STANDARD.encode(&audio.data);
            (StatusCode::OK, Json(SpeakResponse { audio_base64 })).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
