use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::anyhow;
use folio_core_contact_contracts::ContactSubmitOutcome;
use folio_delivery_contracts::{DeliveryError, MockDeliveryService};
use folio_demo::{now_plus, FORM, MINIMAL_FORM, NOW, PAYLOAD};
use folio_models::contact::{
    ContactField, ContactForm, ContactView, FieldError, RetryAfter, SubmissionStatus,
};
use folio_shared_contracts::time::MockTimeService;
use folio_utils::assert_matches;
use pretty_assertions::assert_eq;
use tokio::sync::watch;

use super::{fill, make_sut};
use crate::ContactFeatureService;

#[tokio::test]
async fn ok() {
    // Arrange
    let time = MockTimeService::new().with_now_sequence([*NOW, now_plus(300)]);
    let delivery = MockDeliveryService::new()
        .with_is_configured(true)
        .with_send(PAYLOAD.clone(), Ok(()));
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_eq!(result, ContactSubmitOutcome::Delivered);
    let view = sut.view();
    assert_eq!(view.status, SubmissionStatus::Success);
    assert_eq!(view.form, ContactForm::default());
    assert!(view.errors.is_empty());
    assert_eq!(sut.rate_limit().last_accepted(), Some(*NOW));
    assert_eq!(sut.dismiss_deadline(), Some(now_plus(5300)));
}

#[tokio::test]
async fn minimal_form() {
    // Arrange
    let time = MockTimeService::new().with_now_sequence([*NOW, *NOW]);
    let delivery = MockDeliveryService::new().with_is_configured(true).with_send(
        folio_delivery_contracts::DeliveryPayload {
            name: "Al".into(),
            email: "a@b.co".into(),
            message: "1234567890".into(),
        },
        Ok(()),
    );
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &MINIMAL_FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_eq!(result, ContactSubmitOutcome::Delivered);
}

#[tokio::test]
async fn invalid() {
    // Arrange
    let delivery = MockDeliveryService::new().with_is_configured(true);
    let mut sut = make_sut(MockTimeService::new(), delivery);
    fill(
        &mut sut,
        &ContactForm {
            name: "A".into(),
            email: "max@".into(),
            message: "  ".into(),
        },
    );

    // Act
    let result = sut.submit().await;

    // Assert
    let expected = [
        (ContactField::Name, FieldError::TooShort { min: 2 }),
        (ContactField::Email, FieldError::InvalidFormat),
        (ContactField::Message, FieldError::Required),
    ]
    .into_iter()
    .collect();
    assert_eq!(result, ContactSubmitOutcome::Invalid(expected));
    let view = sut.view();
    assert_eq!(view.status, SubmissionStatus::Idle);
    assert_eq!(
        view.errors.message(ContactField::Name).as_deref(),
        Some("Name must be at least 2 characters")
    );
    assert_eq!(view.form.message, "  ");
    assert_eq!(sut.rate_limit().last_accepted(), None);
}

#[tokio::test]
async fn not_configured() {
    // Arrange
    let delivery = MockDeliveryService::new().with_is_configured(false);
    let mut sut = make_sut(MockTimeService::new(), delivery);
    fill(&mut sut, &FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_eq!(result, ContactSubmitOutcome::NotConfigured);
    let view = sut.view();
    assert!(!view.configured);
    assert_eq!(view.status, SubmissionStatus::Idle);
    assert_eq!(view.form, *FORM);
    assert_eq!(sut.rate_limit().last_accepted(), None);
}

#[tokio::test]
async fn delivery_failure_preserves_form() {
    // Arrange
    let time = MockTimeService::new().with_now(*NOW);
    let delivery = MockDeliveryService::new().with_is_configured(true).with_send(
        PAYLOAD.clone(),
        Err(DeliveryError::Rejected {
            status: 500,
            body: "internal provider details".into(),
        }),
    );
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_eq!(result, ContactSubmitOutcome::Failed);
    let view = sut.view();
    assert_eq!(view.status, SubmissionStatus::Error);
    assert_eq!(view.form, *FORM);
    assert!(!view
        .status_notice()
        .unwrap()
        .contains("internal provider details"));
    assert_eq!(sut.rate_limit().last_accepted(), Some(*NOW));
    assert_eq!(sut.dismiss_deadline(), None);
}

#[tokio::test]
async fn second_submit_inside_cooldown() {
    // Arrange
    let time = MockTimeService::new().with_now_sequence([*NOW, now_plus(100), now_plus(2000)]);
    let delivery = MockDeliveryService::new()
        .with_is_configured(true)
        .with_send(PAYLOAD.clone(), Ok(()));
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);
    assert_eq!(sut.submit().await, ContactSubmitOutcome::Delivered);
    fill(&mut sut, &FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    let retry_after = RetryAfter(Duration::from_millis(3000));
    assert_eq!(result, ContactSubmitOutcome::RateLimited(retry_after));
    let view = sut.view();
    assert_eq!(view.status, SubmissionStatus::Idle);
    assert_eq!(view.rate_limited, Some(retry_after));
    assert!(view.errors.is_empty());
    assert_eq!(view.form, *FORM);
    assert_eq!(
        retry_after.to_string(),
        "Please wait 3 seconds before submitting again"
    );
    assert_eq!(sut.rate_limit().last_accepted(), Some(*NOW));
}

#[tokio::test]
async fn failed_send_consumes_cooldown() {
    // Arrange
    let time = MockTimeService::new().with_now_sequence([*NOW, now_plus(1000)]);
    let delivery = MockDeliveryService::new().with_is_configured(true).with_send(
        PAYLOAD.clone(),
        Err(DeliveryError::Other(anyhow!("connection reset"))),
    );
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);
    assert_eq!(sut.submit().await, ContactSubmitOutcome::Failed);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(result, ContactSubmitOutcome::RateLimited(RetryAfter(d)) if d.as_millis() == 4000);
    assert_eq!(sut.view().status, SubmissionStatus::Idle);
}

#[tokio::test]
async fn submit_after_cooldown() {
    // Arrange
    let time = MockTimeService::new().with_now_sequence([
        *NOW,
        now_plus(100),
        now_plus(5000),
        now_plus(5100),
    ]);
    let mut delivery = MockDeliveryService::new().with_is_configured(true);
    delivery
        .expect_send()
        .times(2)
        .with(mockall::predicate::eq(PAYLOAD.clone()))
        .returning(|_| Box::pin(std::future::ready(Ok(()))));
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);
    assert_eq!(sut.submit().await, ContactSubmitOutcome::Delivered);
    fill(&mut sut, &FORM);

    // Act
    let result = sut.submit().await;

    // Assert
    assert_eq!(result, ContactSubmitOutcome::Delivered);
    assert_eq!(sut.rate_limit().last_accepted(), Some(now_plus(5000)));
}

#[tokio::test]
async fn submitting_is_observable() {
    // Arrange
    let receiver = Arc::new(Mutex::new(None::<watch::Receiver<ContactView>>));
    let observed = Arc::new(Mutex::new(None));

    let time = MockTimeService::new().with_now_sequence([*NOW, *NOW]);
    let mut delivery = MockDeliveryService::new().with_is_configured(true);
    delivery.expect_send().once().returning({
        let receiver = Arc::clone(&receiver);
        let observed = Arc::clone(&observed);
        move |_| {
            let receiver = receiver.lock().unwrap();
            let view = receiver.as_ref().unwrap().borrow().clone();
            *observed.lock().unwrap() = Some(view);
            Box::pin(std::future::ready(Ok(())))
        }
    });
    let mut sut = make_sut(time, delivery);
    *receiver.lock().unwrap() = Some(sut.subscribe());
    fill(&mut sut, &FORM);

    // Act
    sut.submit().await;

    // Assert
    let view = observed.lock().unwrap().take().unwrap();
    assert_eq!(view.status, SubmissionStatus::Submitting);
    assert!(!view.can_submit());
    assert_eq!(view.form, *FORM);
    assert_eq!(sut.view().status, SubmissionStatus::Success);
}

#[tokio::test]
async fn error_state_reenters_on_submit() {
    // Arrange
    let time = MockTimeService::new().with_now(*NOW);
    let delivery = MockDeliveryService::new().with_is_configured(true).with_send(
        PAYLOAD.clone(),
        Err(DeliveryError::Other(anyhow!("timeout"))),
    );
    let mut sut = make_sut(time, delivery);
    fill(&mut sut, &FORM);
    sut.submit().await;
    assert_eq!(sut.view().status, SubmissionStatus::Error);
    sut.update_field(ContactField::Email, "broken".into());

    // Act
    let result = sut.submit().await;

    // Assert
    assert_matches!(result, ContactSubmitOutcome::Invalid(_));
    assert_eq!(sut.view().status, SubmissionStatus::Idle);
}
