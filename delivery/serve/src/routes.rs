use std::sync::Arc;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use slog::warn;

use adserver_primitives::{
    ContentFormat, ContentId, ContentPayload, Money, RequestSource, TargetContext,
};
use delivery_engine::{Delivery, Error, SelectionKind};

use crate::app::State;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub source: RequestSource,
    pub format: ContentFormat,
    #[serde(default)]
    pub target_context: Option<TargetContext>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntargetedQuery {
    pub source: RequestSource,
    pub format: ContentFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub content_id: ContentId,
    pub payload: ContentPayload,
    pub price_per_request: Money,
    pub selection: SelectionKind,
}

impl From<Delivery> for DeliveryResponse {
    fn from(delivery: Delivery) -> Self {
        Self {
            content_id: delivery.content.id,
            payload: delivery.content.payload,
            price_per_request: delivery.content.price_per_request,
            selection: delivery.kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub retryable: bool,
}

/// `POST /request`
pub async fn post_request(
    Extension(state): Extension<Arc<State>>,
    Json(request): Json<ContentRequest>,
) -> Response {
    let delivered = state
        .engine
        .request_content(
            &request.source,
            request.format,
            request.target_context.as_ref(),
        )
        .await;

    respond(&state, delivered)
}

/// `GET /request/untargeted`
pub async fn get_untargeted(
    Extension(state): Extension<Arc<State>>,
    Query(query): Query<UntargetedQuery>,
) -> Response {
    let delivered = state
        .engine
        .request_untargeted_content(&query.source, query.format)
        .await;

    respond(&state, delivered)
}

fn respond(state: &State, delivered: Result<Delivery, Error>) -> Response {
    match delivered {
        Ok(delivery) => Json(DeliveryResponse::from(delivery)).into_response(),
        Err(error) => {
            let status = match &error {
                Error::NoActiveContent(_) => StatusCode::NOT_FOUND,
                error if error.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            if status != StatusCode::NOT_FOUND {
                warn!(state.logger, "delivery failed"; "error" => %error);
            }

            let body = Json(ErrorResponse {
                error: error.to_string(),
                retryable: error.is_retryable(),
            });

            (status, body).into_response()
        }
    }
}
