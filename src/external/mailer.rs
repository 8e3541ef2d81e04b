use crate::config::MailConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: Vec<&'a str>,
    pub subject: &'a str,
    pub text: &'a str,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// 通过 HTTP 邮件 API 发送纯文本邮件
#[derive(Clone)]
pub struct MailService {
    client: Client,
    config: MailConfig,
}

impl MailService {
    pub fn new(config: MailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn dashboard_url(&self) -> &str {
        &self.config.dashboard_url
    }
}

#[async_trait]
impl EmailSender for MailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if self.config.api_url.is_empty() || self.config.api_key.is_empty() {
            return Err(AppError::NotificationError(
                "Mail API is not configured".to_string(),
            ));
        }

        let request = SendEmailRequest {
            from: &self.config.from_email,
            to: vec![to],
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("Email sent successfully: {to}");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::NotificationError(format!(
                "Email sending failed: {error_text}"
            )))
        }
    }
}
