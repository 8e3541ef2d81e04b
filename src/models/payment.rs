use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{PaymentStatus, PaymentType};

use super::DrawResponse;

fn default_payment_type() -> PaymentType {
    PaymentType::Monthly
}

/// 发起支付请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    pub registration_id: i64,
    /// 默认 monthly
    #[serde(default = "default_payment_type")]
    pub payment_type: PaymentType,
}

/// 发起支付响应，客户端跳转到 authorization_url 完成付款
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitiatePaymentResponse {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    /// pesewas
    pub amount: i64,
    /// `YYYY-MM`
    pub month: String,
}

/// 支付回调查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VerifyPaymentQuery {
    pub reference: String,
}

/// 支付确认结果
/// - credited: 本次调用是否真正把参赛者计入当月抽奖（重复确认为 false）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentConfirmationResponse {
    pub reference: String,
    pub status: PaymentStatus,
    pub credited: bool,
    pub month: String,
    pub draw: Option<DrawResponse>,
}

/// Webhook 处理结果，全部以 200 应答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Credited,
    Duplicate,
    Ignored,
}
