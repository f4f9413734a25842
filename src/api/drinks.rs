// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drink handlers.
//!
//! Every handler here is mounted behind [`AuthGuard::require`], so the
//! [`ClaimSet`] argument is always the verified caller.
//!
//! [`AuthGuard::require`]: crate::auth::AuthGuard::require

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::{
    auth::ClaimSet,
    error::ApiError,
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, DrinksResponse, DrinksShortResponse,
        UpdateDrinkRequest,
    },
    state::AppState,
};

/// Malformed bodies are 422 whatever axum's own rejection status would be.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))
}

/// Non-numeric ids can never name a drink.
fn drink_id(id: Result<Path<u32>, PathRejection>) -> Result<u32, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("Drink not found"))
}

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DrinksShortResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing get:drinks permission"),
        (status = 404, description = "No drinks on the menu")
    )
)]
pub async fn get_drinks(
    _claims: ClaimSet,
    State(state): State<AppState>,
) -> Result<Json<DrinksShortResponse>, ApiError> {
    let store = state.store.read().await;
    let drinks: Vec<_> = store.list_drinks().iter().map(|drink| drink.short()).collect();
    if drinks.is_empty() {
        return Err(ApiError::not_found("No drinks found"));
    }
    Ok(Json(DrinksShortResponse {
        success: true,
        drinks,
    }))
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing get:drinks-detail permission"),
        (status = 404, description = "No drinks on the menu")
    )
)]
pub async fn get_drinks_detail(
    _claims: ClaimSet,
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let drinks = state.store.read().await.list_drinks();
    if drinks.is_empty() {
        return Err(ApiError::not_found("No drinks found"));
    }
    Ok(Json(DrinksResponse {
        success: true,
        drinks,
    }))
}

#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing post:drinks permission"),
        (status = 422, description = "Malformed body, empty or duplicate title, or empty recipe")
    )
)]
pub async fn create_drink(
    claims: ClaimSet,
    State(state): State<AppState>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let request = json_body(body)?;
    let drink = state.store.write().await.create_drink(request)?;

    tracing::info!(drink_id = drink.id, subject = claims.subject(), "Drink created");
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = u32, Path, description = "Drink identifier")),
    request_body = UpdateDrinkRequest,
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing patch:drinks permission"),
        (status = 404, description = "Drink not found"),
        (status = 422, description = "Malformed or empty body, or invalid title or recipe")
    )
)]
pub async fn update_drink(
    claims: ClaimSet,
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let id = drink_id(id)?;
    let request = json_body(body)?;
    let drink = state.store.write().await.update_drink(id, request)?;

    tracing::info!(drink_id = drink.id, subject = claims.subject(), "Drink updated");
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = u32, Path, description = "Drink identifier")),
    tag = "Drinks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DeleteDrinkResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing delete:drinks permission"),
        (status = 404, description = "Drink not found")
    )
)]
pub async fn delete_drink(
    claims: ClaimSet,
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    let id = drink_id(id)?;
    state.store.write().await.delete_drink(id)?;

    tracing::info!(drink_id = id, subject = claims.subject(), "Drink deleted");
    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: id,
    }))
}
