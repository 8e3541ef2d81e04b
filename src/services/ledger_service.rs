use crate::entities::{
    PaymentStatus, PaymentType, payment_entity as payments, registration_entity as registrations,
};
use crate::error::{AppError, AppResult};
use crate::external::InitializedTransaction;
use crate::utils::{first_of_month, generate_payment_reference};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};

/// reference 撞库时最多重试次数
const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// 状态推进结果
#[derive(Debug, Clone)]
pub enum LedgerTransition {
    /// 本次调用完成了 pending -> 目标状态
    Applied(payments::Model),
    /// 行已不在 pending，未做任何修改
    Unchanged(payments::Model),
}

impl LedgerTransition {
    pub fn is_applied(&self) -> bool {
        matches!(self, LedgerTransition::Applied(_))
    }

    pub fn payment(&self) -> &payments::Model {
        match self {
            LedgerTransition::Applied(p) | LedgerTransition::Unchanged(p) => p,
        }
    }

    pub fn into_payment(self) -> payments::Model {
        match self {
            LedgerTransition::Applied(p) | LedgerTransition::Unchanged(p) => p,
        }
    }
}

/// 支付流水
///
/// 状态只允许 pending -> success / failed / cancelled，且只推进一次。
/// 推进通过 `UPDATE ... WHERE reference = ? AND status = 'pending'` 完成。
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 以指定 reference 写入 pending 记录；reference 已存在时返回 DuplicateReference
    pub async fn insert_pending<C: ConnectionTrait>(
        &self,
        db: &C,
        registration: &registrations::Model,
        amount: i64,
        payment_type: PaymentType,
        month: NaiveDate,
        reference: &str,
    ) -> AppResult<payments::Model> {
        let now = Utc::now();
        let result = payments::ActiveModel {
            registration_id: Set(registration.id),
            user_id: Set(registration.user_id),
            amount: Set(amount),
            payment_type: Set(payment_type),
            status: Set(PaymentStatus::Pending),
            reference: Set(reference.to_string()),
            email: Set(registration.email.clone()),
            phone_number: Set(Some(registration.phone_number.clone())),
            month_paid_for: Set(first_of_month(month)),
            created_date: Set(Some(now)),
            updated_date: Set(Some(now)),
            ..Default::default()
        }
        .insert(db)
        .await;

        match result {
            Ok(payment) => Ok(payment),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::DuplicateReference(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 生成新 reference 写入 pending 记录，撞库时换 reference 重试
    pub async fn create_pending(
        &self,
        registration: &registrations::Model,
        amount: i64,
        payment_type: PaymentType,
        month: NaiveDate,
    ) -> AppResult<payments::Model> {
        let mut last_err = None;
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let reference = generate_payment_reference();
            match self
                .insert_pending(&self.pool, registration, amount, payment_type, month, &reference)
                .await
            {
                Ok(payment) => {
                    log::info!(
                        "Created pending payment {} for registration {} ({} pesewas)",
                        payment.reference,
                        registration.id,
                        amount
                    );
                    return Ok(payment);
                }
                Err(AppError::DuplicateReference(r)) => {
                    log::warn!("Payment reference collision on attempt {attempt}: {r}");
                    last_err = Some(AppError::DuplicateReference(r));
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            AppError::InternalError("Could not allocate a payment reference".to_string())
        }))
    }

    pub async fn find_by_reference<C: ConnectionTrait>(
        &self,
        db: &C,
        reference: &str,
    ) -> AppResult<Option<payments::Model>> {
        Ok(payments::Entity::find()
            .filter(payments::Column::Reference.eq(reference))
            .one(db)
            .await?)
    }

    /// 该参赛者该月是否已有成功支付
    pub async fn has_successful_payment(
        &self,
        registration_id: i64,
        month: NaiveDate,
    ) -> AppResult<bool> {
        let count = payments::Entity::find()
            .filter(payments::Column::RegistrationId.eq(registration_id))
            .filter(payments::Column::MonthPaidFor.eq(first_of_month(month)))
            .filter(payments::Column::Status.eq(PaymentStatus::Success))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// 记录网关返回的托管页信息
    pub async fn attach_gateway_session<C: ConnectionTrait>(
        &self,
        db: &C,
        reference: &str,
        session: &InitializedTransaction,
    ) -> AppResult<()> {
        payments::Entity::update_many()
            .col_expr(
                payments::Column::AuthorizationUrl,
                Expr::value(session.authorization_url.clone()),
            )
            .col_expr(
                payments::Column::AccessCode,
                Expr::value(session.access_code.clone()),
            )
            .col_expr(
                payments::Column::PaystackReference,
                Expr::value(session.reference.clone()),
            )
            .col_expr(payments::Column::UpdatedDate, Expr::value(Utc::now()))
            .filter(payments::Column::Reference.eq(reference))
            .exec(db)
            .await?;
        Ok(())
    }

    /// pending -> success
    pub async fn mark_success<C: ConnectionTrait>(
        &self,
        db: &C,
        reference: &str,
        channel: Option<&str>,
        gateway_reference: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> AppResult<LedgerTransition> {
        let mut update = payments::Entity::update_many()
            .col_expr(payments::Column::Status, Expr::value(PaymentStatus::Success))
            .col_expr(payments::Column::PaidAt, Expr::value(paid_at))
            .col_expr(payments::Column::UpdatedDate, Expr::value(Utc::now()));
        if let Some(channel) = channel {
            update = update.col_expr(
                payments::Column::PaymentMethod,
                Expr::value(channel.to_string()),
            );
        }
        if let Some(gateway_reference) = gateway_reference {
            update = update.col_expr(
                payments::Column::PaystackReference,
                Expr::value(gateway_reference.to_string()),
            );
        }

        let res = update
            .filter(payments::Column::Reference.eq(reference))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending))
            .exec(db)
            .await?;

        self.resolve_transition(db, reference, res.rows_affected, PaymentStatus::Success)
            .await
    }

    /// pending -> failed
    pub async fn mark_failed<C: ConnectionTrait>(
        &self,
        db: &C,
        reference: &str,
    ) -> AppResult<LedgerTransition> {
        let res = payments::Entity::update_many()
            .col_expr(payments::Column::Status, Expr::value(PaymentStatus::Failed))
            .col_expr(payments::Column::UpdatedDate, Expr::value(Utc::now()))
            .filter(payments::Column::Reference.eq(reference))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending))
            .exec(db)
            .await?;

        self.resolve_transition(db, reference, res.rows_affected, PaymentStatus::Failed)
            .await
    }

    async fn resolve_transition<C: ConnectionTrait>(
        &self,
        db: &C,
        reference: &str,
        rows_affected: u64,
        target: PaymentStatus,
    ) -> AppResult<LedgerTransition> {
        let payment = self
            .find_by_reference(db, reference)
            .await?
            .ok_or_else(|| AppError::UnknownReference(reference.to_string()))?;

        if rows_affected == 1 {
            log::info!("Payment {reference} marked {target}");
            return Ok(LedgerTransition::Applied(payment));
        }

        if payment.status == target {
            log::info!("Payment {reference} already {target}, skipping");
        } else {
            log::warn!(
                "Ignoring {target} for payment {reference}: already {}",
                payment.status
            );
        }
        Ok(LedgerTransition::Unchanged(payment))
    }
}
