mod common;

use common::*;
use jobmarkt_backend::entities::{
    PaymentStatus, PaymentType, payment_entity as payments, registration_entity as registrations,
};
use jobmarkt_backend::error::AppError;
use jobmarkt_backend::models::InitiatePaymentRequest;
use jobmarkt_backend::utils::current_month;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

fn initiate(registration_id: i64) -> InitiatePaymentRequest {
    InitiatePaymentRequest {
        registration_id,
        payment_type: PaymentType::Monthly,
    }
}

#[tokio::test]
async fn test_initiate_creates_pending_payment_with_session() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;

    let response = services
        .payments
        .initiate_payment(&initiate(entrant.id))
        .await
        .unwrap();

    assert!(response.authorization_url.ends_with(&response.reference));
    assert_eq!(response.amount, 5000);
    assert_eq!(
        *services.gateway.initialized.lock().unwrap(),
        vec![response.reference.clone()]
    );

    let payment = services
        .ledger
        .find_by_reference(&db, &response.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.month_paid_for, current_month());
    assert_eq!(payment.access_code.as_deref(), Some(response.access_code.as_str()));
}

#[tokio::test]
async fn test_initiate_rejects_inactive_and_already_paid() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());

    let paid = create_registration(&db, 1).await;
    insert_payment(&db, &paid, current_month(), PaymentStatus::Success).await;
    assert!(matches!(
        services.payments.initiate_payment(&initiate(paid.id)).await,
        Err(AppError::ValidationError(_))
    ));

    let inactive = create_registration(&db, 2).await;
    let mut am = inactive.clone().into_active_model();
    am.is_active = Set(false);
    am.update(&db).await.unwrap();
    assert!(matches!(
        services.payments.initiate_payment(&initiate(inactive.id)).await,
        Err(AppError::ValidationError(_))
    ));

    assert!(matches!(
        services.payments.initiate_payment(&initiate(424242)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_initiate_gateway_failure_marks_payment_failed() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Unavailable, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;

    let result = services.payments.initiate_payment(&initiate(entrant.id)).await;
    assert!(matches!(result, Err(AppError::GatewayError(_))));

    let rows = payments::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_verify_callback_success_credits_entrant() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let started = services
        .payments
        .initiate_payment(&initiate(entrant.id))
        .await
        .unwrap();

    let verified = services
        .payments
        .verify_callback(&started.reference)
        .await
        .unwrap();
    assert!(verified.credited);
    assert_eq!(verified.status, PaymentStatus::Success);
    assert_eq!(verified.draw.as_ref().map(|d| d.current_participants), Some(1));

    // 浏览器重复刷新回调页
    let again = services
        .payments
        .verify_callback(&started.reference)
        .await
        .unwrap();
    assert!(!again.credited);
    assert_eq!(again.status, PaymentStatus::Success);

    let payment = services
        .ledger
        .find_by_reference(&db, &started.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.payment_method.as_deref(), Some("mobile_money"));
    assert_eq!(
        payment.paystack_reference,
        Some(format!("PSK-{}", started.reference))
    );
    let draw = services
        .draws
        .find_by_month(&db, current_month())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draw.current_participants, 1);
}

#[tokio::test]
async fn test_verify_callback_decline_marks_failed() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Decline, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let started = services
        .payments
        .initiate_payment(&initiate(entrant.id))
        .await
        .unwrap();

    let verified = services
        .payments
        .verify_callback(&started.reference)
        .await
        .unwrap();

    assert!(!verified.credited);
    assert_eq!(verified.status, PaymentStatus::Failed);
    assert!(
        !services
            .eligibility
            .is_eligible(entrant.id, current_month())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_verify_callback_gateway_outage_marks_failed() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Unavailable, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let registration = registrations::Entity::find_by_id(entrant.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let payment = services
        .ledger
        .create_pending(&registration, 5000, PaymentType::Monthly, current_month())
        .await
        .unwrap();

    let result = services.payments.verify_callback(&payment.reference).await;
    assert!(matches!(result, Err(AppError::GatewayError(_))));

    let payment = services
        .ledger
        .find_by_reference(&db, &payment.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(
        services
            .draws
            .find_by_month(&db, current_month())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_verify_callback_unknown_reference() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());

    assert!(matches!(
        services.payments.verify_callback("JM-000000000000").await,
        Err(AppError::UnknownReference(_))
    ));
}
