use crate::error::AppError;
use crate::external::{PaystackService, SIGNATURE_HEADER, WebhookEvent};
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use log::{error, info, warn};

/// Paystack webhook 处理器
///
/// 1. 先用原始请求体校验 `x-paystack-signature`，失败直接 400，不解析请求体
/// 2. 解析事件，`charge.success` 走支付确认，其余事件忽略
/// 3. 重复推送与忽略的事件都返回 200，避免网关重试
pub async fn paystack_webhook(
    req: HttpRequest,
    body: web::Bytes,
    paystack_service: web::Data<PaystackService>,
    payment_service: web::Data<PaymentService>,
) -> Result<HttpResponse> {
    let signature = match req.headers().get(SIGNATURE_HEADER) {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            warn!("Missing {SIGNATURE_HEADER} header");
            return Ok(AppError::InvalidSignature.error_response());
        }
    };

    if let Err(e) = paystack_service.verify_webhook_signature(&body, signature) {
        return Ok(e.error_response());
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Malformed Paystack webhook body: {e}");
            return Ok(AppError::ValidationError("Malformed webhook body".to_string())
                .error_response());
        }
    };

    info!(
        "Received Paystack webhook event: {} ({})",
        event.event,
        event.data.reference.as_deref().unwrap_or("-")
    );

    match payment_service.handle_webhook_event(&event).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "received": true,
            "outcome": outcome
        }))),
        Err(e) => {
            error!("Failed to process Paystack webhook event: {e}");
            Ok(e.error_response())
        }
    }
}

/// Webhook 路由（不在 /api/v1 下）
pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhook").route("/paystack", web::post().to(paystack_webhook)));
}
