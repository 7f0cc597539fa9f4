//! REST handlers for service channels.
//!
//! Handlers are thin: parse input, call the domain service, an ingestion
//! pipeline or the orchestrator, and let the response wrapper build the
//! envelope.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;

use channels_http::{ApiError, CanonicalJson};

use super::dto::{DataResponse, HealthResponse, MessageResponse, NotFoundResponse, PushResponse};
use super::error::{json_body, parse_atm_id};
use crate::domain::models::{Atm, AutomatedTellerMachine, PresentialChannel};
use crate::domain::service::Service;
use crate::ingestion::{
    CustomerDataPipeline, ElectronicChannelsPipeline, IngestionPipeline, PhoneChannelsPipeline,
    RecordTransform, decode_push_message,
};
use crate::orchestration::{Orchestrator, UpstreamResource, forwarded_headers};

type ApiResult<T> = Result<T, ApiError>;

pub const PUSH_PROCESSED: &str = "Electronic channel data processed and published successfully";
pub const PHONE_PUSH_PROCESSED: &str = "Phone channel data processed and published successfully";
pub const CUSTOMER_PUSH_PROCESSED: &str = "Customer data processed and published successfully";
pub const PUSH_IGNORED: &str = "Event type not handled, message acknowledged";

// === Health ===

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse { error: "Not Found" }),
    )
}

// === ATM CRUD ===

#[tracing::instrument(skip_all)]
pub async fn create_atm(
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<Atm>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let atm = svc.create_atm(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, CanonicalJson(atm)))
}

#[tracing::instrument(skip_all)]
pub async fn list_atms(
    Extension(svc): Extension<Arc<Service>>,
) -> ApiResult<CanonicalJson<Vec<Atm>>> {
    Ok(CanonicalJson(svc.list_atms().await?))
}

#[tracing::instrument(skip(svc))]
pub async fn get_atm(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<CanonicalJson<Atm>> {
    let id = parse_atm_id(&id)?;
    Ok(CanonicalJson(svc.get_atm(id).await?))
}

#[tracing::instrument(skip(svc, payload))]
pub async fn update_atm(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    payload: Result<Json<Atm>, JsonRejection>,
) -> ApiResult<CanonicalJson<Atm>> {
    let id = parse_atm_id(&id)?;
    let atm = json_body(payload)?;
    Ok(CanonicalJson(svc.update_atm(id, atm).await?))
}

#[tracing::instrument(skip(svc))]
pub async fn delete_atm(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_atm_id(&id)?;
    svc.delete_atm(id).await?;
    Ok(Json(MessageResponse {
        message: "ATM deleted successfully",
    }))
}

// === Read models ===

#[tracing::instrument(skip_all)]
pub async fn list_automated_teller_machines(
    Extension(svc): Extension<Arc<Service>>,
) -> ApiResult<Json<DataResponse<Vec<AutomatedTellerMachine>>>> {
    let data = svc.list_automated_teller_machines().await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip(svc))]
pub async fn get_automated_teller_machine(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<AutomatedTellerMachine>>> {
    let data = svc.get_automated_teller_machine(&id).await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip_all)]
pub async fn list_presential_channels(
    Extension(svc): Extension<Arc<Service>>,
) -> ApiResult<Json<DataResponse<Vec<PresentialChannel>>>> {
    let data = svc.list_presential_channels().await?;
    Ok(Json(DataResponse { data }))
}

#[tracing::instrument(skip(svc))]
pub async fn get_presential_channel(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<PresentialChannel>>> {
    let data = svc.get_presential_channel(&id).await?;
    Ok(Json(DataResponse { data }))
}

// === Ingestion ===

/// POST /electronic-channels/push - storage notification delivered by Pub/Sub.
#[tracing::instrument(skip_all, fields(bytes = body.len()))]
pub async fn push_electronic_channels(
    Extension(pipeline): Extension<Arc<ElectronicChannelsPipeline>>,
    body: Bytes,
) -> ApiResult<Json<PushResponse>> {
    ingest(&pipeline, &body, PUSH_PROCESSED).await
}

/// POST /phone-channels/push
#[tracing::instrument(skip_all, fields(bytes = body.len()))]
pub async fn push_phone_channels(
    Extension(pipeline): Extension<Arc<PhoneChannelsPipeline>>,
    body: Bytes,
) -> ApiResult<Json<PushResponse>> {
    ingest(&pipeline, &body, PHONE_PUSH_PROCESSED).await
}

/// POST /customer-data/push - `data_count` counts skipped records too.
#[tracing::instrument(skip_all, fields(bytes = body.len()))]
pub async fn push_customer_data(
    Extension(pipeline): Extension<Arc<CustomerDataPipeline>>,
    body: Bytes,
) -> ApiResult<Json<PushResponse>> {
    ingest(&pipeline, &body, CUSTOMER_PUSH_PROCESSED).await
}

async fn ingest<T: RecordTransform>(
    pipeline: &IngestionPipeline<T>,
    body: &[u8],
    processed: &'static str,
) -> ApiResult<Json<PushResponse>> {
    let Some(event) = decode_push_message(body)? else {
        return Ok(Json(PushResponse {
            status: PUSH_IGNORED,
            data_count: 0,
        }));
    };
    tracing::info!(bucket = %event.bucket, object = %event.name, "storage event received");

    let report = pipeline.run(&event).await?;
    Ok(Json(PushResponse {
        status: processed,
        data_count: report.records,
    }))
}

// === Orchestration ===

#[tracing::instrument(skip(orchestrator, headers))]
pub async fn fetch_automated_teller_machine(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let data = orchestrator
        .fetch(
            UpstreamResource::AutomatedTellerMachine,
            &id,
            &forwarded_headers(&headers),
        )
        .await?;
    Ok(Json(data))
}

#[tracing::instrument(skip(orchestrator, headers))]
pub async fn fetch_presential_channel(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let data = orchestrator
        .fetch(
            UpstreamResource::PresentialChannel,
            &id,
            &forwarded_headers(&headers),
        )
        .await?;
    Ok(Json(data))
}
