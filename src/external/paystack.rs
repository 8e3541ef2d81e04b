use crate::config::PaystackConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::time::Duration;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Serialize)]
pub struct InitializeTransactionRequest<'a> {
    pub email: &'a str,
    /// pesewas
    pub amount: i64,
    pub reference: &'a str,
    pub callback_url: &'a str,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    /// 网关返回的 reference
    pub reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifiedTransactionData {
    status: String,
    reference: String,
    #[serde(default)]
    channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransaction {
    pub success: bool,
    pub channel: Option<String>,
    pub gateway_reference: String,
}

/// Webhook 推送体，只取核心需要的字段
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookEventData,
}

/// 只有 charge.success 要求 reference，其他事件（如 transfer.*）可能不带
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEventData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// 托管支付页网关
///
/// 只负责出站 HTTP 调用，不做任何持久化。
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(
        &self,
        email: &str,
        amount: i64,
        reference: &str,
        callback_url: &str,
        metadata: serde_json::Value,
    ) -> AppResult<InitializedTransaction>;

    async fn verify(&self, reference: &str) -> AppResult<VerifiedTransaction>;
}

#[derive(Clone)]
pub struct PaystackService {
    client: Client,
    config: PaystackConfig,
}

impl PaystackService {
    pub fn new(config: PaystackConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn callback_url(&self) -> &str {
        &self.config.callback_url
    }

    pub fn monthly_amount(&self) -> i64 {
        self.config.monthly_amount
    }

    /// 校验 webhook 签名：HMAC-SHA512(secret_key, raw body) 的十六进制与请求头比较。
    /// 必须在解析请求体之前调用。
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AppResult<()> {
        verify_signature(&self.config.secret_key, payload, signature)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::GatewayError(format!(
                "{action} failed ({status}): {error_text}"
            )));
        }

        let envelope: PaystackEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::GatewayError(format!("{action}: invalid response: {e}")))?;

        if !envelope.status {
            return Err(AppError::GatewayError(format!(
                "{action} rejected: {}",
                envelope.message
            )));
        }

        envelope
            .data
            .ok_or_else(|| AppError::GatewayError(format!("{action}: response has no data")))
    }
}

#[async_trait]
impl PaymentGateway for PaystackService {
    async fn initialize(
        &self,
        email: &str,
        amount: i64,
        reference: &str,
        callback_url: &str,
        metadata: serde_json::Value,
    ) -> AppResult<InitializedTransaction> {
        let body = InitializeTransactionRequest {
            email,
            amount,
            reference,
            callback_url,
            metadata,
        };

        let response = self
            .client
            .post(self.endpoint("/transaction/initialize"))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GatewayError(format!("Initialize transaction: {e}")))?;

        Self::read_envelope(response, "Initialize transaction").await
    }

    async fn verify(&self, reference: &str) -> AppResult<VerifiedTransaction> {
        let response = self
            .client
            .get(self.endpoint(&format!("/transaction/verify/{reference}")))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| AppError::GatewayError(format!("Verify transaction: {e}")))?;

        let data: VerifiedTransactionData =
            Self::read_envelope(response, "Verify transaction").await?;

        Ok(VerifiedTransaction {
            success: data.status == "success",
            channel: data.channel,
            gateway_reference: data.reference,
        })
    }
}

/// 计算签名（十六进制小写）
pub fn compute_signature(secret: &str, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// 常量时间比较签名
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> AppResult<()> {
    let signature = signature.trim();
    if secret.is_empty() || signature.is_empty() {
        return Err(AppError::InvalidSignature);
    }
    let expected = hex::decode(signature).map_err(|_| AppError::InvalidSignature)?;

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InvalidSignature)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| AppError::InvalidSignature)
}
