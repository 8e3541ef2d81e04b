use crate::entities::{PaymentStatus, registration_entity as registrations};
use crate::error::{AppError, AppResult};
use crate::external::{PaymentGateway, WebhookEvent};
use crate::models::{
    InitiatePaymentRequest, InitiatePaymentResponse, PaymentConfirmationResponse, WebhookOutcome,
};
use crate::services::{EligibilityService, LedgerService, LedgerTransition};
use crate::utils::{current_month, format_month};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use serde_json::json;
use std::sync::Arc;

const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// 支付流程
///
/// 网关调用 + 流水推进 + 资格计数。
/// 支付成功与计数 +1 在同一事务里，且只有真正完成 pending -> success 的那次调用会计数，
/// 所以 webhook 与回调同时到达也只会计一次。
#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    ledger: LedgerService,
    eligibility: EligibilityService,
    callback_url: String,
    monthly_amount: i64,
}

impl PaymentService {
    pub fn new(
        pool: DatabaseConnection,
        gateway: Arc<dyn PaymentGateway>,
        ledger: LedgerService,
        eligibility: EligibilityService,
        callback_url: impl Into<String>,
        monthly_amount: i64,
    ) -> Self {
        Self {
            pool,
            gateway,
            ledger,
            eligibility,
            callback_url: callback_url.into(),
            monthly_amount,
        }
    }

    /// 发起当月付费
    ///
    /// 先写 pending 记录再调网关；网关拒绝或不可达时把记录标为 failed。
    pub async fn initiate_payment(
        &self,
        request: &InitiatePaymentRequest,
    ) -> AppResult<InitiatePaymentResponse> {
        let registration = registrations::Entity::find_by_id(request.registration_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Registration {}", request.registration_id))
            })?;

        if !registration.is_active {
            return Err(AppError::ValidationError(
                "Registration is not active".to_string(),
            ));
        }

        let month = current_month();
        if self
            .ledger
            .has_successful_payment(registration.id, month)
            .await?
        {
            return Err(AppError::ValidationError(
                "You have already paid for this month!".to_string(),
            ));
        }

        let payment = self
            .ledger
            .create_pending(
                &registration,
                self.monthly_amount,
                request.payment_type,
                month,
            )
            .await?;

        let metadata = json!({
            "payment_id": payment.id,
            "user_id": registration.user_id,
            "registration_id": registration.id,
            "month": format_month(month),
        });

        let session = match self
            .gateway
            .initialize(
                &registration.email,
                payment.amount,
                &payment.reference,
                &self.callback_url,
                metadata,
            )
            .await
        {
            Ok(session) => session,
            Err(e) => {
                log::error!(
                    "Payment initialization failed for {}: {e}",
                    payment.reference
                );
                if let Err(mark_err) = self.ledger.mark_failed(&self.pool, &payment.reference).await
                {
                    log::error!(
                        "Failed to mark payment {} as failed: {mark_err}",
                        payment.reference
                    );
                }
                return Err(e);
            }
        };

        self.ledger
            .attach_gateway_session(&self.pool, &payment.reference, &session)
            .await?;

        Ok(InitiatePaymentResponse {
            reference: payment.reference,
            authorization_url: session.authorization_url,
            access_code: session.access_code,
            amount: payment.amount,
            month: format_month(month),
        })
    }

    /// 确认支付成功并计入当月抽奖，幂等
    pub async fn confirm_success(
        &self,
        reference: &str,
        channel: Option<&str>,
        gateway_reference: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> AppResult<PaymentConfirmationResponse> {
        let txn = self.pool.begin().await?;

        let transition = self
            .ledger
            .mark_success(&txn, reference, channel, gateway_reference, paid_at)
            .await?;

        let draw = match &transition {
            LedgerTransition::Applied(payment) => Some(
                self.eligibility
                    .record_paid_entry(&txn, payment.month_paid_for)
                    .await?,
            ),
            LedgerTransition::Unchanged(_) => None,
        };

        txn.commit().await?;

        let credited = transition.is_applied();
        let payment = transition.into_payment();
        if credited {
            log::info!(
                "Payment {} credited registration {} for {}",
                payment.reference,
                payment.registration_id,
                format_month(payment.month_paid_for)
            );
        }

        Ok(PaymentConfirmationResponse {
            reference: payment.reference,
            status: payment.status,
            credited,
            month: format_month(payment.month_paid_for),
            draw: draw.map(Into::into),
        })
    }

    /// 浏览器回调：向网关查询交易结果
    ///
    /// 网关查询失败时记录标为 failed 并返回网关错误。
    pub async fn verify_callback(&self, reference: &str) -> AppResult<PaymentConfirmationResponse> {
        let payment = self
            .ledger
            .find_by_reference(&self.pool, reference)
            .await?
            .ok_or_else(|| AppError::UnknownReference(reference.to_string()))?;

        if payment.status != PaymentStatus::Pending {
            return Ok(PaymentConfirmationResponse {
                reference: payment.reference,
                status: payment.status,
                credited: false,
                month: format_month(payment.month_paid_for),
                draw: None,
            });
        }

        let verified = match self.gateway.verify(reference).await {
            Ok(verified) => verified,
            Err(e) => {
                log::error!("Payment verification failed for {reference}: {e}");
                if let Err(mark_err) = self.ledger.mark_failed(&self.pool, reference).await {
                    log::error!("Failed to mark payment {reference} as failed: {mark_err}");
                }
                return Err(e);
            }
        };

        if verified.success {
            return self
                .confirm_success(
                    reference,
                    verified.channel.as_deref(),
                    Some(&verified.gateway_reference),
                    Utc::now(),
                )
                .await;
        }

        log::warn!("Payment {reference} was not successful at the gateway");
        let payment = self
            .ledger
            .mark_failed(&self.pool, reference)
            .await?
            .into_payment();

        Ok(PaymentConfirmationResponse {
            reference: payment.reference,
            status: payment.status,
            credited: false,
            month: format_month(payment.month_paid_for),
            draw: None,
        })
    }

    /// 已验签的 webhook 事件
    pub async fn handle_webhook_event(&self, event: &WebhookEvent) -> AppResult<WebhookOutcome> {
        if event.event != CHARGE_SUCCESS_EVENT {
            log::info!("Ignoring Paystack event: {}", event.event);
            return Ok(WebhookOutcome::Ignored);
        }
        if let Some(status) = event.data.status.as_deref()
            && status != "success"
        {
            log::info!(
                "Ignoring {} for {} with status {status}",
                event.event,
                event.data.reference.as_deref().unwrap_or("-")
            );
            return Ok(WebhookOutcome::Ignored);
        }

        let reference = event.data.reference.as_deref().ok_or_else(|| {
            AppError::ValidationError(format!("{} event without data.reference", event.event))
        })?;

        let confirmation = self
            .confirm_success(
                reference,
                event.data.channel.as_deref(),
                None,
                Utc::now(),
            )
            .await?;

        Ok(if confirmation.credited {
            WebhookOutcome::Credited
        } else {
            WebhookOutcome::Duplicate
        })
    }
}
