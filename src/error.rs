// src/error.rs
//! Error normalization at the outermost request boundary.
//!
//! Handlers propagate [`AppError`] with `?`. The [`NormalizeErrors`]
//! middleware turns every failed response, whatever produced it, into the
//! single `{ success: false, message, errors?, stack? }` envelope.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

use crate::config::AppEnv;
use crate::validator::{FieldError, ValidationFailure};

pub const MSG_DATABASE: &str = "Error en la base de datos";
pub const MSG_INVALID_INPUT: &str = "Datos de entrada inválidos";
pub const MSG_INTERNAL: &str = "Error interno del servidor";

pub type ApiResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Database,
    Validation,
    Application,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Database => "DatabaseError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Application => "Error",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: Option<StatusCode>,
    pub is_operational: bool,
    pub kind: ErrorKind,
    pub message: String,
    pub stack: String,
    pub details: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let stack = capture_stack(kind, &message);
        Self {
            status: None,
            is_operational: false,
            kind,
            message,
            stack,
            details: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn operational(mut self) -> Self {
        self.is_operational = true;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        create_error(message, Some(400))
    }
}

/// Builds an expected failure; a missing or invalid status becomes 500.
pub fn create_error(message: impl Into<String>, status: Option<u16>) -> AppError {
    let status = status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    AppError::new(ErrorKind::Application, message)
        .with_status(status)
        .operational()
}

fn capture_stack(kind: ErrorKind, message: &str) -> String {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => format!("{}: {}\n{}", kind.as_str(), message, backtrace),
        _ => format!("{}: {}", kind.as_str(), message),
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::new(ErrorKind::Database, err.to_string())
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        let mut err = AppError::new(ErrorKind::Validation, failure.to_string());
        err.details = Some(failure.errors);
        err
    }
}

impl From<&actix_web::Error> for AppError {
    fn from(err: &actix_web::Error) -> Self {
        AppError::new(ErrorKind::Application, err.to_string())
            .with_status(err.as_response_error().status_code())
    }
}

/// Used only when a response is rendered without the middleware; it assumes
/// production so nothing internal leaks.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        ErrorNormalizer::new(AppEnv::Production).resolve_status(self)
    }

    fn error_response(&self) -> HttpResponse {
        let normalizer = ErrorNormalizer::new(AppEnv::Production);
        normalizer.respond(normalizer.normalize(self))
    }
}

// ==================== NORMALIZER ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorNormalizer {
    env: AppEnv,
}

impl ErrorNormalizer {
    pub fn new(env: AppEnv) -> Self {
        Self { env }
    }

    fn resolve_status(&self, err: &AppError) -> StatusCode {
        match err.kind {
            ErrorKind::Database | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Application => err.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn normalize(&self, err: &AppError) -> NormalizedError {
        let status = self.resolve_status(err);

        let mut message = match err.kind {
            ErrorKind::Database => MSG_DATABASE.to_string(),
            ErrorKind::Validation => MSG_INVALID_INPUT.to_string(),
            ErrorKind::Application => err.message.clone(),
        };

        if self.env == AppEnv::Production && status == StatusCode::INTERNAL_SERVER_ERROR {
            message = MSG_INTERNAL.to_string();
        }

        let stack = match self.env {
            AppEnv::Development => Some(err.stack.clone()),
            _ => None,
        };

        NormalizedError {
            status,
            body: ErrorBody {
                success: false,
                message,
                errors: err.details.clone(),
                stack,
            },
        }
    }

    pub fn render(&self, err: &AppError) -> HttpResponse {
        let normalized = self.normalize(err);

        if normalized.status.is_server_error() {
            log::error!(
                "{} {} (operational: {})",
                normalized.status.as_u16(),
                err,
                err.is_operational
            );
        } else {
            log::warn!("{} {}", normalized.status.as_u16(), err);
        }

        self.respond(normalized)
    }

    fn respond(&self, normalized: NormalizedError) -> HttpResponse {
        HttpResponse::build(normalized.status).json(normalized.body)
    }

    pub fn render_actix(&self, err: &actix_web::Error) -> HttpResponse {
        match err.as_error::<AppError>() {
            Some(app_err) => self.render(app_err),
            None => self.render(&AppError::from(err)),
        }
    }
}

// ==================== MIDDLEWARE ====================

pub struct NormalizeErrors {
    normalizer: ErrorNormalizer,
}

impl NormalizeErrors {
    pub fn new(normalizer: ErrorNormalizer) -> Self {
        Self { normalizer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for NormalizeErrors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = NormalizeErrorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(NormalizeErrorsMiddleware {
            service: Rc::new(service),
            normalizer: self.normalizer,
        }))
    }
}

pub struct NormalizeErrorsMiddleware<S> {
    service: Rc<S>,
    normalizer: ErrorNormalizer,
}

impl<S, B> Service<ServiceRequest> for NormalizeErrorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let normalizer = self.normalizer;
        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let normalized = res.response().error().map(|err| normalizer.render_actix(err));
                    match normalized {
                        Some(response) => Ok(res.into_response(response).map_into_right_body()),
                        None => Ok(res.map_into_left_body()),
                    }
                }
                // The request is gone by now, so the envelope rides inside the error.
                Err(err) => {
                    let response = normalizer.render_actix(&err);
                    Err(InternalError::from_response(err.to_string(), response).into())
                }
            }
        })
    }
}

// ==================== NOT FOUND ====================

pub async fn route_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        success: false,
        message: format!("route not found: {}", req.path()),
        errors: None,
        stack: None,
    })
}

// ==================== ТЕСТЫ ====================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App};

    fn database_error() -> AppError {
        AppError::from(sqlx::Error::RowNotFound)
    }

    #[test]
    fn test_database_error_in_development() {
        let normalized = ErrorNormalizer::new(AppEnv::Development).normalize(&database_error());
        assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
        assert_eq!(normalized.body.message, MSG_DATABASE);
        assert!(!normalized.body.success);
        assert!(normalized.body.stack.is_some());
    }

    #[test]
    fn test_database_error_in_production_not_redacted_further() {
        let normalized = ErrorNormalizer::new(AppEnv::Production).normalize(&database_error());
        assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
        assert_eq!(normalized.body.message, MSG_DATABASE);
        assert_eq!(normalized.body.stack, None);
    }

    #[test]
    fn test_database_message_never_leaks() {
        let err = database_error();
        assert!(err.message.contains("no rows"));
        let normalized = ErrorNormalizer::new(AppEnv::Test).normalize(&err);
        assert!(!normalized.body.message.contains("no rows"));
    }

    #[test]
    fn test_validation_error_carries_fields() {
        let mut failure = ValidationFailure::new();
        failure.add_error("code", "Código inválido");
        let normalized = ErrorNormalizer::new(AppEnv::Production).normalize(&failure.into());

        assert_eq!(normalized.status, StatusCode::BAD_REQUEST);
        assert_eq!(normalized.body.message, MSG_INVALID_INPUT);
        let errors = normalized.body.errors.unwrap();
        assert_eq!(errors[0].field, "code");
    }

    #[test]
    fn test_production_redacts_500() {
        let err = AppError::new(ErrorKind::Application, "connection pool exhausted at db.rs:42");
        let normalized = ErrorNormalizer::new(AppEnv::Production).normalize(&err);
        assert_eq!(normalized.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(normalized.body.message, MSG_INTERNAL);
        assert_eq!(normalized.body.stack, None);
    }

    #[test]
    fn test_development_keeps_500_message() {
        let err = AppError::new(ErrorKind::Application, "boom");
        let normalized = ErrorNormalizer::new(AppEnv::Development).normalize(&err);
        assert_eq!(normalized.body.message, "boom");
        assert!(normalized.body.stack.unwrap().starts_with("Error: boom"));
    }

    #[test]
    fn test_stack_only_in_development() {
        let err = create_error("x", Some(409));
        assert!(ErrorNormalizer::new(AppEnv::Development).normalize(&err).body.stack.is_some());
        assert!(ErrorNormalizer::new(AppEnv::Test).normalize(&err).body.stack.is_none());
        assert!(ErrorNormalizer::new(AppEnv::Production).normalize(&err).body.stack.is_none());
    }

    #[test]
    fn test_create_error_round_trip() {
        let err = create_error("x", Some(418));
        assert!(err.is_operational);
        for env in [AppEnv::Development, AppEnv::Production, AppEnv::Test] {
            let normalized = ErrorNormalizer::new(env).normalize(&err);
            assert_eq!(normalized.status.as_u16(), 418);
            assert_eq!(normalized.body.message, "x");
        }
    }

    #[test]
    fn test_create_error_defaults_to_500() {
        let err = create_error("fallo", None);
        assert_eq!(err.status, Some(StatusCode::INTERNAL_SERVER_ERROR));
        let invalid = create_error("fallo", Some(42));
        assert_eq!(invalid.status, Some(StatusCode::INTERNAL_SERVER_ERROR));

        let normalized = ErrorNormalizer::new(AppEnv::Production).normalize(&err);
        assert_eq!(normalized.body.message, MSG_INTERNAL);
    }

    #[test]
    fn test_body_shape() {
        let err = create_error("x", Some(400));
        let normalized = ErrorNormalizer::new(AppEnv::Test).normalize(&err);
        let json = serde_json::to_value(&normalized.body).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "x" }));
    }

    async fn failing() -> ApiResult<HttpResponse> {
        Err(AppError::new(ErrorKind::Application, "secreto interno"))
    }

    async fn teapot() -> ApiResult<HttpResponse> {
        Err(create_error("x", Some(418)))
    }

    #[actix_web::test]
    async fn test_middleware_rewrites_handler_errors() {
        let app = actix_test::init_service(
            App::new()
                .wrap(NormalizeErrors::new(ErrorNormalizer::new(AppEnv::Production)))
                .route("/fail", web::get().to(failing))
                .route("/teapot", web::get().to(teapot)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/fail").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], MSG_INTERNAL);
        assert_eq!(body["success"], false);
        assert!(body.get("stack").is_none());

        let req = actix_test::TestRequest::get().uri("/teapot").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 418);
    }

    #[actix_web::test]
    async fn test_middleware_normalizes_inner_service_errors() {
        let app = actix_test::init_service(
            App::new()
                .wrap_fn(|_req, _srv| async {
                    Err::<ServiceResponse, actix_web::Error>(create_error("x", Some(418)).into())
                })
                .wrap(NormalizeErrors::new(ErrorNormalizer::new(AppEnv::Test)))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let err = match app.call(req).await {
            Err(err) => err,
            Ok(res) => panic!("expected an error, got {}", res.status()),
        };
        let resp = err.error_response();
        assert_eq!(resp.status().as_u16(), 418);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "success": false, "message": "x" }));
    }

    #[actix_web::test]
    async fn test_error_response_uses_production_envelope() {
        let err = AppError::new(ErrorKind::Application, "detalle interno");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], MSG_INTERNAL);
        assert!(body.get("stack").is_none());
    }

    #[actix_web::test]
    async fn test_not_found_responder() {
        let app = actix_test::init_service(
            App::new()
                .wrap(NormalizeErrors::new(ErrorNormalizer::new(AppEnv::Development)))
                .default_service(web::route().to(route_not_found)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/nada").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "route not found: /api/nada" })
        );
    }
}
