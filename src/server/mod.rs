// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP API over a [`ProtocolStore`].
//!
//! Routes:
//! - `POST /api/protocols` create
//! - `GET /api/protocols` list
//! - `GET|PUT|DELETE /api/protocols/{id}`
//! - `POST /api/protocols/validate` structural checks without saving

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::model::{Block, Connection, DiagramDocument};
use crate::store::{ProtocolPatch, ProtocolRecord, ProtocolStore, StoreError};
use crate::validate::{validate, ValidationReport};


pub type SharedStore = Arc<Mutex<ProtocolStore>>;

const REQUIRED_FIELDS: [&str; 3] = ["name", "blocks", "connections"];

pub fn shared(store: ProtocolStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/protocols", get(list_protocols).post(create_protocol))
        .route("/api/protocols/validate", post(validate_protocol))
        .route(
            "/api/protocols/{id}",
            get(get_protocol).put(update_protocol).delete(delete_protocol),
        )
        .with_state(store)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    store: SharedStore,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "protocol API listening");
    }
    axum::serve(listener, router(store)).with_graceful_shutdown(shutdown).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid protocol ID")]
    InvalidId,
    #[error("Protocol not found")]
    NotFound,
    #[error("Validation error")]
    Validation(Vec<String>),
    #[error("Invalid protocol data format")]
    InvalidFormat,
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::NotFound { .. } => Self::NotFound,
            source => Self::Store { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::Validation(_) | Self::InvalidFormat => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store { source, .. } = &self {
            tracing::warn!(error = %source, "protocol store failure");
        }
        let status = self.status();
        let body = MessageBody {
            message: self.to_string(),
            errors: match self {
                Self::Validation(errors) => Some(errors),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::InvalidId)
}

fn parse_new_protocol(body: Value) -> Result<DiagramDocument, ApiError> {
    let Some(object) = body.as_object() else {
        return Err(ApiError::Validation(vec!["expected a JSON object".to_owned()]));
    };
    let missing = REQUIRED_FIELDS
        .iter()
        .filter(|field| object.get(**field).map_or(true, Value::is_null))
        .map(|field| format!("{field}: Required"))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }
    serde_json::from_value(body).map_err(|err| ApiError::Validation(vec![err.to_string()]))
}

async fn create_protocol(
    State(store): State<SharedStore>,
    Json(body): Json<Value>,
) -> Result<Json<ProtocolRecord>, ApiError> {
    let document = parse_new_protocol(body)?;
    let record = store
        .lock()
        .await
        .create(document)
        .map_err(ApiError::store("Failed to create protocol"))?;
    Ok(Json(record))
}

async fn list_protocols(State(store): State<SharedStore>) -> Json<Vec<ProtocolRecord>> {
    Json(store.lock().await.list())
}

async fn get_protocol(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<Json<ProtocolRecord>, ApiError> {
    let id = parse_id(&raw_id)?;
    let store = store.lock().await;
    store.get(id).cloned().map(Json).ok_or(ApiError::NotFound)
}

async fn update_protocol(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ProtocolRecord>, ApiError> {
    let id = parse_id(&raw_id)?;
    let patch: ProtocolPatch =
        serde_json::from_value(body).map_err(|err| ApiError::Validation(vec![err.to_string()]))?;
    let record = store
        .lock()
        .await
        .update(id, patch)
        .map_err(ApiError::store("Failed to update protocol"))?;
    Ok(Json(record))
}

async fn delete_protocol(
    State(store): State<SharedStore>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_id(&raw_id)?;
    let deleted = store
        .lock()
        .await
        .delete(id)
        .map_err(ApiError::store("Failed to delete protocol"))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageBody { message: "Protocol deleted successfully".to_owned(), errors: None }))
}

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    blocks: Vec<Block>,
    connections: Vec<Connection>,
}

async fn validate_protocol(Json(body): Json<Value>) -> Result<Json<ValidationReport>, ApiError> {
    let arrays = ["blocks", "connections"]
        .iter()
        .all(|field| body.get(*field).is_some_and(Value::is_array));
    if !arrays {
        return Err(ApiError::InvalidFormat);
    }
    let request: ValidateRequest = serde_json::from_value(body).map_err(|err| {
        tracing::debug!(error = %err, "rejected validation request");
        ApiError::InvalidFormat
    })?;
    Ok(Json(validate(&request.blocks, &request.connections)))
}
