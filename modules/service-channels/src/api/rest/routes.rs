//! REST route registration for service channels.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use channels_http::{TraceabilityRules, with_traceability};

use super::handlers;
use crate::domain::service::Service;
use crate::ingestion::{CustomerDataPipeline, ElectronicChannelsPipeline, PhoneChannelsPipeline};
use crate::orchestration::Orchestrator;

/// Everything the handlers reach through request extensions.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<Service>,
    pub electronic_channels: Arc<ElectronicChannelsPipeline>,
    pub phone_channels: Arc<PhoneChannelsPipeline>,
    pub customer_data: Arc<CustomerDataPipeline>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the module router.
///
/// Catalogue and orchestration routes require the traceability headers;
/// `/health` and the push endpoints do not. Every route is mounted under
/// `prefix` (empty for the root), and unmatched paths reach a 404 fallback.
pub fn router(prefix: &str, state: ApiState, rules: Arc<TraceabilityRules>) -> Router {
    let traced = Router::new()
        .route("/atms", post(handlers::create_atm).get(handlers::list_atms))
        .route(
            "/atms/{id}",
            get(handlers::get_atm)
                .put(handlers::update_atm)
                .delete(handlers::delete_atm),
        )
        .route(
            "/automated-teller-machines",
            get(handlers::list_automated_teller_machines),
        )
        .route(
            "/automated-teller-machines/{id}",
            get(handlers::get_automated_teller_machine),
        )
        .route(
            "/presential-channels",
            get(handlers::list_presential_channels),
        )
        .route(
            "/presential-channels/{id}",
            get(handlers::get_presential_channel),
        )
        .route(
            "/orchestration/automated-teller-machines/{id}",
            get(handlers::fetch_automated_teller_machine),
        )
        .route(
            "/orchestration/presential-channels/{id}",
            get(handlers::fetch_presential_channel),
        );

    let open = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/electronic-channels/push",
            post(handlers::push_electronic_channels),
        )
        .route("/phone-channels/push", post(handlers::push_phone_channels))
        .route("/customer-data/push", post(handlers::push_customer_data));

    let api = open
        .merge(with_traceability(traced, rules))
        .layer(Extension(state.service))
        .layer(Extension(state.electronic_channels))
        .layer(Extension(state.phone_channels))
        .layer(Extension(state.customer_data))
        .layer(Extension(state.orchestrator));

    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };
    router.fallback(handlers::not_found)
}
