use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DrawStatus, PaymentStatus, PaymentType, PrizeType};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payment::initiate_payment,
        handlers::payment::verify_payment,
        handlers::draw::get_current_draw,
        handlers::draw::get_draw,
        handlers::draw::get_eligibility,
        handlers::draw::get_entrant_winners,
    ),
    components(
        schemas(
            InitiatePaymentRequest,
            InitiatePaymentResponse,
            VerifyPaymentQuery,
            PaymentConfirmationResponse,
            PaymentStatus,
            PaymentType,
            DrawResponse,
            DrawStatus,
            MonthQuery,
            EligibilityResponse,
            WinnerResponse,
            PrizeType,
            ApiError,
        )
    ),
    tags(
        (name = "payment", description = "Monthly entry payment API"),
        (name = "draw", description = "Monthly draw and eligibility API"),
    ),
    info(
        title = "Jobmarkt Backend API",
        version = "1.0.0",
        description = "Jobmarkt monthly draw REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
