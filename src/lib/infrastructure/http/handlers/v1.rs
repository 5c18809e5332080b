//! Version 1 API

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::{
    domain::communication::mailer::Mailer,
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod uptime;

pub fn router<M: Mailer>() -> Router<AppState<M>> {
    Router::new()
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
}
