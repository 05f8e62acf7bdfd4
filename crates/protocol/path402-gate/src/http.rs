//! axum adapter.
//!
//! Routes:
//! - `GET /.well-known/402.json`: discovery document (free)
//! - `GET /_402/stats`: ledger totals (free)
//! - anything else: gated through [`PaymentGate::handle`]
//!
//! Serve the router with `into_make_service_with_connect_info::<SocketAddr>()`
//! so unpaid clients without an `X-402-Payer` header are recorded by socket
//! address.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use path402_types::PROTOCOL_VERSION;
use serde_json::json;
use tracing::error;

use crate::error::GateError;
use crate::gate::PaymentGate;
use crate::types::{
    GateRequest, GateResponse, PaymentHeaders, DISCOVERY_PATH, HEADER_NONCE, HEADER_PAYER,
    HEADER_PAYMENT, HEADER_PRICE_PAID, HEADER_SERVED_BY, HEADER_SIGNATURE, HEADER_TOKEN,
    HEADER_VERSION,
};

/// Path of the ledger stats endpoint.
pub const STATS_PATH: &str = "/_402/stats";

/// Build the router for `gate`.
pub fn router(gate: Arc<PaymentGate>) -> Router {
    Router::new()
        .route(DISCOVERY_PATH, get(discovery))
        .route(STATS_PATH, get(stats))
        .fallback(gated)
        .with_state(gate)
}

async fn discovery(State(gate): State<Arc<PaymentGate>>) -> Response {
    match gate.discovery().await {
        Ok(document) => with_version(Json(document).into_response()),
        Err(e) => e.into_response(),
    }
}

async fn stats(State(gate): State<Arc<PaymentGate>>) -> Response {
    match gate.stats().await {
        Ok(stats) => with_version(Json(stats).into_response()),
        Err(e) => e.into_response(),
    }
}

async fn gated(State(gate): State<Arc<PaymentGate>>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return with_version(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    // HEAD never carries a body, so it must not redeem an invoice.
    let headers = request.headers();
    let payment = if request.method() == Method::GET {
        PaymentHeaders::from_parts(
            header_str(headers, HEADER_PAYMENT),
            header_str(headers, HEADER_NONCE),
            header_str(headers, HEADER_SIGNATURE),
        )
    } else {
        None
    };

    let client = header_str(headers, HEADER_PAYER)
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string());

    let mut gate_request = GateRequest::new(request.uri().path(), client);
    gate_request.payment = payment;

    match gate.handle(gate_request).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

fn with_version(mut response: Response) -> Response {
    response.headers_mut().insert(
        HeaderName::from_static("x-402-version"),
        HeaderValue::from_static(PROTOCOL_VERSION),
    );
    response
}

fn insert_header(response: &mut Response, name: &str, value: &str) {
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        response.headers_mut().insert(name, value);
    }
}

impl IntoResponse for GateResponse {
    fn into_response(self) -> Response {
        match self {
            GateResponse::Challenge(challenge) => {
                with_version((StatusCode::PAYMENT_REQUIRED, Json(challenge)).into_response())
            }
            GateResponse::Served(served) => {
                let mut response = (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    served.content,
                )
                    .into_response();
                insert_header(&mut response, HEADER_SERVED_BY, &served.served_by);
                insert_header(
                    &mut response,
                    HEADER_PRICE_PAID,
                    &served.price_paid.to_string(),
                );
                insert_header(&mut response, HEADER_TOKEN, &served.token);
                with_version(response)
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "Gated request failed");
        }
        let body = json!({
            "error": self.public_message(),
            "suggestion": self.suggestion(),
        });
        with_version((status, Json(body)).into_response())
    }
}
