// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    handler::Handler,
    http::Request,
    routing::{get, patch},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::permissions::{DELETE_DRINKS, GET_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
    error::ApiError,
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, Drink, DrinkShort, DrinksResponse,
        DrinksShortResponse, RecipeInput, RecipePart, RecipePartShort, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod health;

pub fn router(state: AppState) -> Router {
    let guard = state.auth.clone();

    let api_routes = Router::new()
        .route(
            "/drinks",
            get(drinks::get_drinks.layer(guard.require(GET_DRINKS)))
                .post(drinks::create_drink.layer(guard.require(POST_DRINKS))),
        )
        .route(
            "/drinks-detail",
            get(drinks::get_drinks_detail.layer(guard.require(GET_DRINKS_DETAIL))),
        )
        .route(
            "/drinks/{id}",
            patch(drinks::update_drink.layer(guard.require(PATCH_DRINKS)))
                .delete(drinks::delete_drink.layer(guard.require(DELETE_DRINKS))),
        )
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Declares the `bearer` scheme referenced by the guarded paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        drinks::get_drinks,
        drinks::get_drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Drink,
            DrinkShort,
            RecipePart,
            RecipePartShort,
            RecipeInput,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinksResponse,
            DrinksShortResponse,
            DeleteDrinkResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Drinks", description = "Drink menu management"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;
