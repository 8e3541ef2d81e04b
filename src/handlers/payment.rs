use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/payments/initiate",
    tag = "payment",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "已创建支付，返回托管支付页地址", body = InitiatePaymentResponse),
        (status = 400, description = "参赛者未激活或本月已付费"),
        (status = 404, description = "参赛者不存在"),
        (status = 502, description = "支付网关不可用")
    )
)]
/// 发起当月付费，客户端随后跳转到 authorization_url
pub async fn initiate_payment(
    service: web::Data<PaymentService>,
    payload: web::Json<InitiatePaymentRequest>,
) -> Result<HttpResponse> {
    match service.initiate_payment(&payload.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/verify",
    tag = "payment",
    params(
        ("reference" = String, Query, description = "支付 reference")
    ),
    responses(
        (status = 200, description = "支付状态", body = PaymentConfirmationResponse),
        (status = 404, description = "未知的支付 reference"),
        (status = 502, description = "支付网关不可用，支付保持 pending")
    )
)]
/// 支付完成后的浏览器回调，向网关核实交易
pub async fn verify_payment(
    service: web::Data<PaymentService>,
    query: web::Query<VerifyPaymentQuery>,
) -> Result<HttpResponse> {
    match service.verify_callback(&query.reference).await {
        Ok(data) => {
            let message = if data.credited {
                "Payment successful! You are now eligible for this month's draw."
            } else {
                "Payment status retrieved"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                data,
                message.to_string(),
            )))
        }
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/initiate", web::post().to(initiate_payment))
            .route("/verify", web::get().to(verify_payment)),
    );
}
