use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use tracing::Instrument;

use crate::domain::customer::{CustomerLookupHandler, ErrorCode, LookupResponse};
use crate::metrics::LookupMetrics;

// ============================================================================
// HTTP Adapter
// ============================================================================
//
// GET     /customer?cpf=...   lookup envelope as JSON
// OPTIONS /customer           CORS preflight
// GET     /health             liveness
// GET     /metrics            Prometheus text format
//
// The adapter hands the raw `cpf` parameter to the lookup handler untouched,
// so error messages echo exactly what the caller sent.
//
// ============================================================================

pub const ALLOWED_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
pub const ALLOWED_METHODS: &str = "GET,OPTIONS";

/// Transport-level code; the lookup handler never produces it
pub const MISSING_CPF: &str = "MISSING_CPF";

#[derive(Clone)]
pub struct AppState {
    pub handler: CustomerLookupHandler,
    pub metrics: Arc<LookupMetrics>,
}

#[derive(Debug, Deserialize)]
struct LookupQuery {
    cpf: Option<String>,
}

/// CORS headers added to every response
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", ALLOWED_HEADERS))
        .add(("Access-Control-Allow-Methods", ALLOWED_METHODS))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/customer")
            .route(web::get().to(get_customer))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
    )
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics));
}

pub async fn serve(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    tracing::info!("Starting HTTP server on http://{}:{}", host, port);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_headers())
            .configure(routes)
    })
    .bind((host, port))?
    .run()
    .await
}

/// HTTP status for a lookup outcome
pub fn status_for(response: &LookupResponse) -> StatusCode {
    match response.error_code() {
        None => StatusCode::OK,
        Some(ErrorCode::CustomerNotFound) => StatusCode::NOT_FOUND,
        Some(ErrorCode::InvalidCpf) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::DatabaseConnectionError) | Some(ErrorCode::InternalError) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn get_customer(state: web::Data<AppState>, query: web::Query<LookupQuery>) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("get_customer", request_id = %request_id);

    async move {
        let raw = match query.into_inner().cpf {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                tracing::info!("Rejected request without cpf parameter");
                return missing_cpf();
            }
        };

        let response = state.handler.execute(&raw).await;
        let status = status_for(&response);

        tracing::info!(
            status = status.as_u16(),
            outcome = response.outcome_label(),
            "Customer lookup served"
        );

        HttpResponse::build(status).json(response)
    }
    .instrument(span)
    .await
}

fn missing_cpf() -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": {
            "code": MISSING_CPF,
            "message": "CPF query parameter is required"
        }
    }))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "customer-lookup"
    }))
}

async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    match state.metrics.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryCustomerRepository;
    use crate::domain::customer::{Customer, RepositoryError};
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn create_state(repo: Arc<InMemoryCustomerRepository>) -> AppState {
        let metrics = Arc::new(LookupMetrics::new().unwrap());
        AppState {
            handler: CustomerLookupHandler::new(repo).with_metrics(metrics.clone()),
            metrics,
        }
    }

    fn seeded_repo() -> Arc<InMemoryCustomerRepository> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Arc::new(InMemoryCustomerRepository::with_customers(vec![Customer::new(
            "123",
            "11144477735",
            "João Silva",
            "joao@email.com",
            ts,
            ts,
        )]))
    }

    macro_rules! init_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .wrap(cors_headers())
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_found_customer_returns_200_with_cors() {
        let app = init_app!(create_state(seeded_repo()));

        let req = actix_test::TestRequest::get()
            .uri("/customer?cpf=111.444.777-35")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            headers.get("Access-Control-Allow-Methods").unwrap(),
            ALLOWED_METHODS
        );
        assert_eq!(headers.get("content-type").unwrap(), "application/json");

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": {
                    "id": "123",
                    "cpf": "11144477735",
                    "name": "João Silva",
                    "email": "joao@email.com",
                    "createdAt": "2024-01-01T00:00:00.000Z",
                    "updatedAt": "2024-01-01T00:00:00.000Z"
                }
            })
        );
    }

    #[actix_web::test]
    async fn test_missing_cpf_returns_400() {
        let repo = seeded_repo();
        let app = init_app!(create_state(repo.clone()));

        for uri in ["/customer", "/customer?cpf="] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = actix_test::read_body_json(resp).await;
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"]["code"], json!(MISSING_CPF));
            assert_eq!(body["error"]["message"], json!("CPF query parameter is required"));
        }
        assert_eq!(repo.calls(), 0);
    }

    #[actix_web::test]
    async fn test_invalid_cpf_returns_400_and_echoes_input() {
        let repo = seeded_repo();
        let app = init_app!(create_state(repo.clone()));

        let req = actix_test::TestRequest::get()
            .uri("/customer?cpf=123.456.789-01")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], json!("INVALID_CPF"));
        assert_eq!(
            body["error"]["message"],
            json!("Invalid CPF format: 123.456.789-01")
        );
        assert_eq!(repo.calls(), 0);
    }

    #[actix_web::test]
    async fn test_unknown_customer_returns_404() {
        let app = init_app!(create_state(seeded_repo()));

        let req = actix_test::TestRequest::get()
            .uri("/customer?cpf=12345678909")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], json!("CUSTOMER_NOT_FOUND"));
    }

    #[actix_web::test]
    async fn test_database_failure_returns_500() {
        let repo = seeded_repo();
        repo.fail_with(RepositoryError::connection("timeout"));
        let app = init_app!(create_state(repo));

        let req = actix_test::TestRequest::get()
            .uri("/customer?cpf=11144477735")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], json!("DATABASE_CONNECTION_ERROR"));
    }

    #[actix_web::test]
    async fn test_preflight_returns_204_with_cors() {
        let app = init_app!(create_state(seeded_repo()));

        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/customer")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Headers").unwrap(),
            ALLOWED_HEADERS
        );
    }

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let app = init_app!(create_state(seeded_repo()));

        let lookup = actix_test::TestRequest::get()
            .uri("/customer?cpf=11144477735")
            .to_request();
        actix_test::call_service(&app, lookup).await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["status"], json!("healthy"));

        let req = actix_test::TestRequest::get().uri("/metrics").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let text = String::from_utf8(actix_test::read_body(resp).await.to_vec()).unwrap();
        assert!(text.contains("customer_lookups_total{code=\"SUCCESS\"} 1"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&LookupResponse::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&LookupResponse::invalid_cpf("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&LookupResponse::internal_error()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&LookupResponse::failure(
                ErrorCode::DatabaseConnectionError,
                "Database connection error: timeout"
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(missing_cpf().status(), StatusCode::BAD_REQUEST);
    }
}
