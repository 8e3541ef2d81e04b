mod common;

use chrono::Utc;
use common::*;
use jobmarkt_backend::entities::{
    DrawStatus, PaymentStatus, PaymentType, monthly_draw_entity as draws,
};
use jobmarkt_backend::error::AppError;
use jobmarkt_backend::services::LedgerTransition;
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn test_duplicate_reference_is_rejected() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let m = month(2025, 10);

    services
        .ledger
        .insert_pending(&db, &entrant, 5000, PaymentType::Monthly, m, "JM-FIXED000001")
        .await
        .unwrap();
    let second = services
        .ledger
        .insert_pending(&db, &entrant, 5000, PaymentType::Monthly, m, "JM-FIXED000001")
        .await;

    assert!(matches!(second, Err(AppError::DuplicateReference(r)) if r == "JM-FIXED000001"));
}

#[tokio::test]
async fn test_create_pending_generates_unique_references() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;

    let a = services
        .ledger
        .create_pending(&entrant, 5000, PaymentType::Registration, month(2025, 10))
        .await
        .unwrap();
    let b = services
        .ledger
        .create_pending(&entrant, 5000, PaymentType::Monthly, month(2025, 10))
        .await
        .unwrap();

    assert_ne!(a.reference, b.reference);
    assert!(a.reference.starts_with("JM-"));
    assert_eq!(a.status, PaymentStatus::Pending);
    assert_eq!(a.email, entrant.email);
}

#[tokio::test]
async fn test_mark_success_applies_once() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let payment = services
        .ledger
        .create_pending(&entrant, 5000, PaymentType::Monthly, month(2025, 10))
        .await
        .unwrap();

    let first = services
        .ledger
        .mark_success(&db, &payment.reference, Some("card"), Some("PSK-1"), Utc::now())
        .await
        .unwrap();
    let second = services
        .ledger
        .mark_success(&db, &payment.reference, Some("card"), Some("PSK-1"), Utc::now())
        .await
        .unwrap();

    assert!(first.is_applied());
    assert!(!second.is_applied());
    let stored = first.into_payment();
    assert_eq!(stored.status, PaymentStatus::Success);
    assert_eq!(stored.payment_method.as_deref(), Some("card"));
    assert_eq!(stored.paystack_reference.as_deref(), Some("PSK-1"));
    assert!(stored.paid_at.is_some());
}

#[tokio::test]
async fn test_failed_payment_never_becomes_success() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let payment = services
        .ledger
        .create_pending(&entrant, 5000, PaymentType::Monthly, month(2025, 10))
        .await
        .unwrap();

    let failed = services
        .ledger
        .mark_failed(&db, &payment.reference)
        .await
        .unwrap();
    assert!(failed.is_applied());

    let late_success = services
        .ledger
        .mark_success(&db, &payment.reference, None, None, Utc::now())
        .await
        .unwrap();
    match late_success {
        LedgerTransition::Unchanged(p) => assert_eq!(p.status, PaymentStatus::Failed),
        LedgerTransition::Applied(_) => panic!("failed payment was promoted to success"),
    }
}

#[tokio::test]
async fn test_unknown_reference_errors() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());

    let result = services
        .ledger
        .mark_success(&db, "JM-DOESNOTEXIST", None, None, Utc::now())
        .await;
    assert!(matches!(result, Err(AppError::UnknownReference(_))));

    let result = services.payments.confirm_success("JM-NOPE", None, None, Utc::now()).await;
    assert!(matches!(result, Err(AppError::UnknownReference(_))));
}

#[tokio::test]
async fn test_double_confirmation_increments_once() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let entrant = create_registration(&db, 1).await;
    let m = month(2025, 10);
    let payment = services
        .ledger
        .create_pending(&entrant, 5000, PaymentType::Monthly, m)
        .await
        .unwrap();

    let first = services
        .payments
        .confirm_success(&payment.reference, Some("mobile_money"), None, Utc::now())
        .await
        .unwrap();
    let second = services
        .payments
        .confirm_success(&payment.reference, Some("mobile_money"), None, Utc::now())
        .await
        .unwrap();

    assert!(first.credited);
    assert!(!second.credited);
    assert_eq!(first.draw.as_ref().map(|d| d.current_participants), Some(1));

    let draw = services.draws.find_by_month(&db, m).await.unwrap().unwrap();
    assert_eq!(draw.current_participants, 1);
    assert!(services.eligibility.is_eligible(entrant.id, m).await.unwrap());
}

#[tokio::test]
async fn test_threshold_activates_draw() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let m = month(2025, 11);

    let mut statuses = Vec::new();
    for n in 0..TEST_MINIMUM as usize {
        let entrant = create_registration(&db, n).await;
        let payment = services
            .ledger
            .create_pending(&entrant, 5000, PaymentType::Monthly, m)
            .await
            .unwrap();
        let confirmation = services
            .payments
            .confirm_success(&payment.reference, None, None, Utc::now())
            .await
            .unwrap();
        statuses.push(confirmation.draw.unwrap().status);
    }

    assert_eq!(
        statuses,
        vec![DrawStatus::Pending, DrawStatus::Pending, DrawStatus::Active]
    );
    let draw = services.draws.find_by_month(&db, m).await.unwrap().unwrap();
    assert!(draw.is_ready_for_draw());
}

#[tokio::test]
async fn test_get_or_create_is_idempotent() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());

    let a = services.draws.get_or_create(&db, month(2026, 1)).await.unwrap();
    let b = services
        .draws
        .get_or_create(&db, chrono::NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
        .await
        .unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(a.status, DrawStatus::Pending);
    assert_eq!(a.minimum_participants, TEST_MINIMUM);
    assert_eq!(draws::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_eligibility_requires_active_registration_and_matching_month() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let m = month(2025, 10);

    let paid = create_registration(&db, 1).await;
    insert_payment(&db, &paid, m, PaymentStatus::Success).await;
    let other_month = create_registration(&db, 2).await;
    insert_payment(&db, &other_month, month(2025, 9), PaymentStatus::Success).await;
    let pending = create_registration(&db, 3).await;
    insert_payment(&db, &pending, m, PaymentStatus::Pending).await;

    let entrants = services.eligibility.eligible_entrants(&db, m).await.unwrap();
    assert_eq!(entrants.iter().map(|e| e.id).collect::<Vec<_>>(), vec![paid.id]);

    assert!(services.eligibility.is_eligible(paid.id, m).await.unwrap());
    assert!(!services.eligibility.is_eligible(other_month.id, m).await.unwrap());
    assert!(!services.eligibility.is_eligible(pending.id, m).await.unwrap());
    assert!(matches!(
        services.eligibility.is_eligible(9999, m).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_cancel_draw_is_terminal() {
    let db = setup_db().await;
    let services = build_services(&db, GatewayBehaviour::Succeed, FakeMailer::default());
    let m = month(2025, 12);
    services.draws.get_or_create(&db, m).await.unwrap();

    let cancelled = services.draws.cancel_draw(m).await.unwrap();
    assert_eq!(cancelled.status, DrawStatus::Cancelled);

    assert!(matches!(
        services.draws.cancel_draw(m).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(matches!(
        services.draws.cancel_draw(month(2030, 1)).await,
        Err(AppError::NotFound(_))
    ));
}
