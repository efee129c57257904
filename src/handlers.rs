// src/handlers.rs
use actix_web::{error, web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{create_error, route_not_found, ApiResult, AppError};
use crate::schemas::{
    Appointment, Branch, Client, EntitySchema, Mechanic, Opportunity, Service, User, WorkStatus,
};

// ==================== COMMON STRUCTURES ====================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

// ==================== ENTITY HANDLERS ====================

pub async fn create_entity<S: EntitySchema>(payload: web::Json<Value>) -> ApiResult<HttpResponse> {
    let input = S::validate_create(&payload)?;
    log::debug!("✅ Validated create for {}", S::NAME);
    Ok(HttpResponse::Created().json(ApiResponse::success(input)))
}

pub async fn update_entity<S: EntitySchema>(
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut raw = payload.into_inner();

    // Path identity wins over any id in the body.
    let object = raw
        .as_object_mut()
        .ok_or_else(|| AppError::bad_request("El cuerpo debe ser un objeto JSON"))?;
    object.insert("id".to_string(), Value::String(id));

    let input = S::validate_update(&raw)?;
    log::debug!("✅ Validated update for {}", S::NAME);
    Ok(HttpResponse::Ok().json(ApiResponse::success(input)))
}

pub async fn filter_entity<S: EntitySchema>(
    query: web::Query<HashMap<String, String>>,
) -> ApiResult<HttpResponse> {
    let raw = query_to_value(query.into_inner());
    let filter = S::validate_filter(&raw)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(filter)))
}

/// Query parameters stay strings; the schemas do the coercion.
fn query_to_value(query: HashMap<String, String>) -> Value {
    let map: Map<String, Value> = query
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Value::Object(map)
}

pub fn entity_routes<S: EntitySchema + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(format!("/{}", S::NAME))
            .route(web::post().to(create_entity::<S>))
            .route(web::get().to(filter_entity::<S>))
            .default_service(web::route().to(route_not_found)),
    )
    .service(
        web::resource(format!("/{}/{{id}}", S::NAME))
            .route(web::put().to(update_entity::<S>))
            .route(web::patch().to(update_entity::<S>))
            .default_service(web::route().to(route_not_found)),
    );
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    entity_routes::<Appointment>(cfg);
    entity_routes::<Client>(cfg);
    entity_routes::<Mechanic>(cfg);
    entity_routes::<Opportunity>(cfg);
    entity_routes::<Service>(cfg);
    entity_routes::<User>(cfg);
    entity_routes::<WorkStatus>(cfg);
    entity_routes::<Branch>(cfg);
}

// ==================== EXTRACTOR ERRORS ====================

pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            log::debug!("Rejected JSON payload: {}", err);
            let status = match err {
                error::JsonPayloadError::OverflowKnownLength { .. }
                | error::JsonPayloadError::Overflow { .. } => 413,
                error::JsonPayloadError::ContentType => 415,
                _ => 400,
            };
            create_error("Cuerpo JSON inválido o mal formado", Some(status)).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        log::debug!("Rejected query string: {}", err);
        create_error("Parámetros de consulta inválidos", Some(400)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::error::{ErrorNormalizer, NormalizeErrors, MSG_INVALID_INPUT};
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use serde_json::json;

    macro_rules! api_app {
        ($env:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(NormalizeErrors::new(ErrorNormalizer::new($env)))
                    .app_data(json_config(4096))
                    .app_data(query_config())
                    .service(web::scope("/api").configure(configure_api))
                    .default_service(web::route().to(route_not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_create_branch_ok() {
        let app = api_app!(AppEnv::Test);
        let req = actix_test::TestRequest::post()
            .uri("/api/branches")
            .set_json(json!({
                "name": "Sucursal Centro",
                "code": "CTR01",
                "address": "Calle Juárez 10",
                "phone": "3312345678",
                "city": "Guadalajara",
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["isActive"], true);
        assert_eq!(body["data"]["code"], "CTR01");
    }

    #[actix_web::test]
    async fn test_create_reports_field_errors() {
        let app = api_app!(AppEnv::Production);
        let req = actix_test::TestRequest::post()
            .uri("/api/clients")
            .set_json(json!({ "name": "X", "whatsapp": "123", "email": "nope" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], MSG_INVALID_INPUT);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "whatsapp", "email"]);
    }

    #[actix_web::test]
    async fn test_update_takes_id_from_path() {
        let app = api_app!(AppEnv::Test);
        let req = actix_test::TestRequest::put()
            .uri("/api/mechanics/15")
            .set_json(json!({ "isActive": false }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["data"]["id"], 15);
        assert_eq!(body["data"]["isActive"], false);
    }

    #[actix_web::test]
    async fn test_update_rejects_bad_path_id() {
        let app = api_app!(AppEnv::Test);
        let req = actix_test::TestRequest::patch()
            .uri("/api/users/abc")
            .set_json(json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "id");
    }

    #[actix_web::test]
    async fn test_filter_coerces_query() {
        let app = api_app!(AppEnv::Test);
        let req = actix_test::TestRequest::get()
            .uri("/api/appointments?page=abc&limit=-1&sortOrder=sideways&status=confirmed")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["data"]["page"], 1);
        assert_eq!(body["data"]["limit"], 10);
        assert_eq!(body["data"]["sortOrder"], "desc");
        assert_eq!(body["data"]["status"], "confirmed");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_normalized() {
        let app = api_app!(AppEnv::Production);
        let req = actix_test::TestRequest::post()
            .uri("/api/work-statuses")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "Cuerpo JSON inválido o mal formado");
    }

    #[actix_web::test]
    async fn test_unknown_route() {
        let app = api_app!(AppEnv::Test);
        let req = actix_test::TestRequest::get().uri("/api/vehicles").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "route not found: /api/vehicles");
    }

    #[actix_web::test]
    async fn test_unsupported_method_falls_back_to_not_found() {
        let app = api_app!(AppEnv::Test);
        for uri in ["/api/branches", "/api/branches/3"] {
            let req = actix_test::TestRequest::delete().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let body: Value = actix_test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], format!("route not found: {}", uri));
        }
    }

    #[actix_web::test]
    async fn test_health_route_passes_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(NormalizeErrors::new(ErrorNormalizer::new(AppEnv::Production)))
                .app_data(web::Data::new(crate::monitoring::Metrics::new()))
                .service(
                    web::scope("/api")
                        .route("/health", web::get().to(crate::monitoring::health_check))
                        .configure(configure_api),
                ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_query_to_value_keeps_strings() {
        let mut query = HashMap::new();
        query.insert("page".to_string(), "2".to_string());
        assert_eq!(query_to_value(query), json!({ "page": "2" }));
    }
}
