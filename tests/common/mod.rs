#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use jobmarkt_backend::entities::{
    DrawStatus, JobType, Language, MobileMoneyProvider, PaymentStatus, PaymentType, Region,
    job_listing_entity as jobs, monthly_draw_entity as draws, payment_entity as payments,
    registration_entity as registrations,
};
use jobmarkt_backend::error::{AppError, AppResult};
use jobmarkt_backend::external::{
    EmailSender, InitializedTransaction, PaymentGateway, VerifiedTransaction,
};
use jobmarkt_backend::services::{
    DrawService, EligibilityService, LedgerService, NotificationService, PaymentService,
    WinnerSelectionService,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};

pub const TEST_MINIMUM: i32 = 3;

/// 单连接内存库，所有查询共享同一个 SQLite 实例
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

pub async fn create_registration(db: &DatabaseConnection, n: usize) -> registrations::Model {
    registrations::ActiveModel {
        user_id: Set(Some(n as i64 + 1000)),
        first_name: Set(format!("Kofi{n}")),
        last_name: Set("Boateng".to_string()),
        email: Set(format!("entrant{n}@example.com")),
        phone_number: Set(format!("+23324000{n:04}")),
        date_of_birth: Set(NaiveDate::from_ymd_opt(1995, 5, 17).unwrap()),
        region: Set(Region::Accra),
        mobile_money_provider: Set(MobileMoneyProvider::Mtn),
        cv_file: Set(format!("cvs/entrant{n}.pdf")),
        language: Set(Language::En),
        registration_date: Set(Some(Utc::now())),
        is_active: Set(true),
        terms_accepted: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_job(db: &DatabaseConnection, title: &str) -> jobs::Model {
    jobs::ActiveModel {
        title: Set(title.to_string()),
        description: Set(format!("{title} role in Accra")),
        job_type: Set(JobType::FullTime),
        salary_range: Set("GHS 2,000 - 3,000".to_string()),
        requirements: Set("SHS certificate".to_string()),
        is_active: Set(true),
        created_date: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// 直接写入一条已成功的支付（不经过计数）
pub async fn insert_payment(
    db: &DatabaseConnection,
    registration: &registrations::Model,
    for_month: NaiveDate,
    status: PaymentStatus,
) -> payments::Model {
    payments::ActiveModel {
        registration_id: Set(registration.id),
        user_id: Set(registration.user_id),
        amount: Set(5000),
        payment_type: Set(PaymentType::Monthly),
        status: Set(status),
        reference: Set(format!("JM-SEED{}{}", registration.id, for_month.format("%Y%m"))),
        email: Set(registration.email.clone()),
        month_paid_for: Set(for_month),
        created_date: Set(Some(Utc::now())),
        updated_date: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_draw(
    db: &DatabaseConnection,
    draw_month: NaiveDate,
    status: DrawStatus,
    current: i32,
    minimum: i32,
) -> draws::Model {
    draws::ActiveModel {
        draw_month: Set(draw_month),
        minimum_participants: Set(minimum),
        current_participants: Set(current),
        status: Set(status),
        winners_selected: Set(false),
        created_date: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayBehaviour {
    Succeed,
    Decline,
    Unavailable,
}

pub struct FakeGateway {
    pub behaviour: GatewayBehaviour,
    pub initialized: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new(behaviour: GatewayBehaviour) -> Self {
        Self {
            behaviour,
            initialized: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initialize(
        &self,
        _email: &str,
        _amount: i64,
        reference: &str,
        _callback_url: &str,
        _metadata: serde_json::Value,
    ) -> AppResult<InitializedTransaction> {
        if self.behaviour == GatewayBehaviour::Unavailable {
            return Err(AppError::GatewayError("connection timed out".into()));
        }
        self.initialized.lock().unwrap().push(reference.to_string());
        Ok(InitializedTransaction {
            authorization_url: format!("https://checkout.paystack.test/{reference}"),
            access_code: format!("ac_{reference}"),
            reference: reference.to_string(),
        })
    }

    async fn verify(&self, reference: &str) -> AppResult<VerifiedTransaction> {
        match self.behaviour {
            GatewayBehaviour::Succeed => Ok(VerifiedTransaction {
                success: true,
                channel: Some("mobile_money".to_string()),
                gateway_reference: format!("PSK-{reference}"),
            }),
            GatewayBehaviour::Decline => Ok(VerifiedTransaction {
                success: false,
                channel: None,
                gateway_reference: format!("PSK-{reference}"),
            }),
            GatewayBehaviour::Unavailable => {
                Err(AppError::GatewayError("connection timed out".into()))
            }
        }
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl EmailSender for FakeMailer {
    async fn send_email(&self, to: &str, _subject: &str, _body: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::NotificationError("mail API unreachable".into()));
        }
        self.sent.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

pub struct Services {
    pub draws: DrawService,
    pub eligibility: EligibilityService,
    pub ledger: LedgerService,
    pub payments: PaymentService,
    pub selection: WinnerSelectionService,
    pub gateway: Arc<FakeGateway>,
    pub mailer: Arc<FakeMailer>,
}

pub fn build_services(
    db: &DatabaseConnection,
    behaviour: GatewayBehaviour,
    mailer: FakeMailer,
) -> Services {
    let gateway = Arc::new(FakeGateway::new(behaviour));
    let mailer = Arc::new(mailer);

    let draws = DrawService::new(db.clone(), TEST_MINIMUM);
    let eligibility = EligibilityService::new(db.clone(), draws.clone());
    let ledger = LedgerService::new(db.clone());
    let payments = PaymentService::new(
        db.clone(),
        gateway.clone(),
        ledger.clone(),
        eligibility.clone(),
        "https://jobmarkt.example/api/v1/payments/verify",
        5000,
    );
    let notifications =
        NotificationService::new(mailer.clone(), "https://jobmarkt.example/user/dashboard/");
    let selection = WinnerSelectionService::new(
        db.clone(),
        draws.clone(),
        eligibility.clone(),
        notifications,
    );

    Services {
        draws,
        eligibility,
        ledger,
        payments,
        selection,
        gateway,
        mailer,
    }
}
