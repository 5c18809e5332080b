//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::{errors::ErrorResponse, handlers::v1::*};

/// OpenAPI document for the versioned API
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Booking API"),
    paths(uptime::handler),
    components(schemas(uptime::UptimeResponse, ErrorResponse))
)]
pub struct ApiDocs;

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use clap::Parser;
    use testresult::TestResult;

    use crate::infrastructure::http::{router, state::tests::test_state, HttpServerConfig};

    #[tokio::test]
    async fn test_openapi_document_lists_uptime() -> TestResult {
        let config = HttpServerConfig::parse_from(["server"]);

        let response = TestServer::new(router(test_state(None), &config)?)?
            .get("/api/v1/openapi.json")
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();

        assert_eq!(json["info"]["title"], "Booking API");
        assert!(json["paths"]["/api/v1/uptime"].is_object());

        Ok(())
    }
}
