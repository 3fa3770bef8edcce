use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use portfolio_core_contact_contracts::{ContactSendMessageError, MockContactService};
use portfolio_utils::assert_matches;
use pretty_assertions::assert_eq;
use tokio::{
    sync::Notify,
    time::{sleep, Duration},
};

use super::*;

const DISPLAY: Duration = Duration::from_secs(5);

fn fields() -> ContactFormFields {
    ContactFormFields {
        name: "Al".into(),
        email: "a@b.com".into(),
        subject: "Hello there".into(),
        message: "This is a test message.".into(),
    }
}

fn invalid_fields() -> ContactFormFields {
    ContactFormFields {
        name: "A".into(),
        email: "not-an-email".into(),
        subject: "Hi".into(),
        message: "short".into(),
    }
}

fn spawn(contact: MockContactService) -> ContactFormController {
    ContactFormController::spawn(
        contact,
        ContactFormConfig {
            result_display: DISPLAY,
        },
    )
}

/// A transport that blocks until `gate` is notified and counts dispatches.
fn gated_contact(
    gate: Arc<Notify>,
    calls: Arc<AtomicUsize>,
    result: fn() -> Result<(), ContactSendMessageError>,
) -> MockContactService {
    let mut contact = MockContactService::new();
    contact.expect_send_message().returning(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        let gate = Arc::clone(&gate);
        Box::pin(async move {
            gate.notified().await;
            result()
        })
    });
    contact
}

#[test]
fn default_config() {
    assert_eq!(ContactFormConfig::default().result_display, DISPLAY);
}

#[test]
fn validate_reports_all_fields() {
    let errors = validate(&invalid_fields()).unwrap_err();
    assert_eq!(errors.len(), 4);
    for field in ContactField::ALL {
        assert!(errors.get(field).is_some(), "{field} not reported");
    }

    validate(&fields()).unwrap();
}

#[tokio::test(start_paused = true)]
async fn success() {
    // Arrange
    let contact =
        MockContactService::new().with_send_message(fields().validate().unwrap(), Ok(()));
    let sut = spawn(contact);
    assert_eq!(sut.snapshot(), ContactFormSnapshot::default());

    // Act
    let outcome = sut.submit(fields()).await;

    // Assert
    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(
        sut.snapshot(),
        ContactFormSnapshot {
            fields: ContactFormFields::default(),
            errors: ContactFieldErrors::default(),
            state: SubmissionState::Succeeded,
        }
    );

    sleep(DISPLAY - Duration::from_millis(1)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Succeeded);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);
    assert_eq!(sut.snapshot().fields, ContactFormFields::default());
}

#[tokio::test(start_paused = true)]
async fn rejected() {
    // Arrange
    let contact = MockContactService::new().with_send_message(
        fields().validate().unwrap(),
        Err(ContactSendMessageError::Send),
    );
    let sut = spawn(contact);

    // Act
    let outcome = sut.submit(fields()).await;

    // Assert
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(
        sut.snapshot(),
        ContactFormSnapshot {
            fields: fields(),
            errors: ContactFieldErrors::default(),
            state: SubmissionState::Failed {
                message: "Failed to send message. Please try again.",
            },
        }
    );

    sleep(DISPLAY + Duration::from_millis(1)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);
    assert_eq!(sut.snapshot().fields, fields());
}

#[tokio::test(start_paused = true)]
async fn invalid_never_dispatches() {
    // Arrange
    let contact = MockContactService::new();
    let sut = spawn(contact);

    // Act
    let outcome = sut.submit(invalid_fields()).await;

    // Assert
    let errors = assert_matches_invalid(outcome);
    assert_eq!(
        errors.iter().collect::<Vec<_>>(),
        [
            (ContactField::Name, "Name must be at least 2 characters"),
            (ContactField::Email, "Please enter a valid email address"),
            (ContactField::Subject, "Subject must be at least 5 characters"),
            (ContactField::Message, "Message must be at least 10 characters"),
        ]
    );
    assert_eq!(
        sut.snapshot(),
        ContactFormSnapshot {
            fields: invalid_fields(),
            errors,
            state: SubmissionState::Idle,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn partially_invalid_never_dispatches() {
    // Arrange
    let contact = MockContactService::new();
    let sut = spawn(contact);

    // Act
    let outcome = sut
        .submit(ContactFormFields {
            subject: "Hi".into(),
            ..fields()
        })
        .await;

    // Assert
    let errors = assert_matches_invalid(outcome);
    assert_eq!(
        errors.iter().collect::<Vec<_>>(),
        [(ContactField::Subject, "Subject must be at least 5 characters")]
    );
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn repeated_submit_while_submitting_dispatches_once() {
    // Arrange
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let contact = gated_contact(Arc::clone(&gate), Arc::clone(&calls), || Ok(()));
    let sut = spawn(contact);

    // Act
    let first = tokio::spawn({
        let sut = sut.clone();
        async move { sut.submit(fields()).await }
    });
    sut.subscribe()
        .wait_for(|snapshot| snapshot.state == SubmissionState::Submitting)
        .await
        .unwrap();

    let second = sut.submit(fields()).await;
    let third = sut.submit(invalid_fields()).await;
    gate.notify_one();
    let first = first.await.unwrap();

    // Assert
    assert_eq!(second, SubmitOutcome::Busy);
    assert_eq!(third, SubmitOutcome::Busy);
    assert_eq!(first, SubmitOutcome::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sut.snapshot().state, SubmissionState::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn edits_allowed_while_submitting() {
    // Arrange
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let contact = gated_contact(Arc::clone(&gate), Arc::clone(&calls), || {
        Err(ContactSendMessageError::Send)
    });
    let sut = spawn(contact);

    let first = tokio::spawn({
        let sut = sut.clone();
        async move { sut.submit(fields()).await }
    });
    sut.subscribe()
        .wait_for(|snapshot| snapshot.state == SubmissionState::Submitting)
        .await
        .unwrap();

    // Act
    sut.set_field(ContactField::Name, "Alice");
    let mut snapshots = sut.subscribe();
    snapshots
        .wait_for(|snapshot| snapshot.fields.name == "Alice")
        .await
        .unwrap();
    gate.notify_one();
    let first = first.await.unwrap();

    // Assert
    assert_eq!(first, SubmitOutcome::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        sut.snapshot().fields,
        ContactFormFields {
            name: "Alice".into(),
            ..fields()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_then_retry() {
    // Arrange
    let calls = Arc::new(AtomicUsize::new(0));
    let mut contact = MockContactService::new();
    contact
        .expect_send_message()
        .withf(|submission| *submission == fields().validate().unwrap())
        .times(2)
        .returning({
            let calls = Arc::clone(&calls);
            move |_| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if call == 0 {
                        sleep(Duration::from_secs(15)).await;
                        Err(ContactSendMessageError::Other(anyhow!(
                            "operation timed out"
                        )))
                    } else {
                        Ok(())
                    }
                })
            }
        });
    let sut = spawn(contact);

    // Act
    let first = sut.submit(fields()).await;

    // Assert
    assert_eq!(first, SubmitOutcome::Failed);
    assert_eq!(
        sut.snapshot().state,
        SubmissionState::Failed {
            message: FAILURE_MESSAGE
        }
    );
    assert_eq!(sut.snapshot().fields, fields());

    sleep(DISPLAY + Duration::from_millis(1)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);

    // Act
    let second = sut.submit(sut.snapshot().fields).await;

    // Assert
    assert_eq!(second, SubmitOutcome::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(sut.snapshot().fields, ContactFormFields::default());
}

#[tokio::test(start_paused = true)]
async fn panicking_transport_does_not_stick_in_submitting() {
    // Arrange
    let mut contact = MockContactService::new();
    contact
        .expect_send_message()
        .once()
        .returning(|_| Box::pin(explode()));
    let sut = spawn(contact);

    // Act
    let outcome = sut.submit(fields()).await;

    // Assert
    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_matches!(sut.snapshot().state, SubmissionState::Failed { .. });

    sleep(DISPLAY + Duration::from_millis(1)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn resubmit_while_showing_result_restarts_display_window() {
    // Arrange
    let mut contact = MockContactService::new();
    contact
        .expect_send_message()
        .times(2)
        .returning(|_| Box::pin(std::future::ready(Err(ContactSendMessageError::Send))));
    let sut = spawn(contact);

    // Act
    assert_eq!(sut.submit(fields()).await, SubmitOutcome::Failed);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(sut.submit(fields()).await, SubmitOutcome::Failed);

    // Assert
    sleep(Duration::from_secs(3)).await;
    assert_matches!(sut.snapshot().state, SubmissionState::Failed { .. });

    sleep(Duration::from_secs(2) + Duration::from_millis(1)).await;
    assert_eq!(sut.snapshot().state, SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn errors_follow_edits_after_invalid_submit() {
    // Arrange
    let sut = spawn(MockContactService::new());
    let mut snapshots = sut.subscribe();

    sut.submit(ContactFormFields {
        name: "A".into(),
        ..fields()
    })
    .await;
    assert!(sut.snapshot().errors.get(ContactField::Name).is_some());

    // Act
    sut.set_field(ContactField::Name, "Al");

    // Assert
    let snapshot = snapshots
        .wait_for(|snapshot| snapshot.fields.name == "Al")
        .await
        .unwrap()
        .clone();
    assert!(snapshot.errors.is_empty());
    assert_eq!(snapshot.state, SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn late_result_after_teardown_is_discarded() {
    // Arrange
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let contact = gated_contact(Arc::clone(&gate), Arc::clone(&calls), || Ok(()));
    let sut = spawn(contact);
    let mut snapshots = sut.subscribe();

    let first = tokio::spawn({
        let sut = sut.clone();
        async move { sut.submit(fields()).await }
    });
    snapshots
        .wait_for(|snapshot| snapshot.state == SubmissionState::Submitting)
        .await
        .unwrap();

    // Act
    first.abort();
    let _ = first.await;
    drop(sut);
    tokio::task::yield_now().await;
    gate.notify_one();
    tokio::task::yield_now().await;

    // Assert
    assert!(snapshots.changed().await.is_err());
    assert_eq!(snapshots.borrow().state, SubmissionState::Submitting);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

async fn explode() -> Result<(), ContactSendMessageError> {
    panic!("transport exploded")
}

fn assert_matches_invalid(outcome: SubmitOutcome) -> ContactFieldErrors {
    match outcome {
        SubmitOutcome::Invalid(errors) => errors,
        outcome => panic!("expected invalid outcome, got {outcome:?}"),
    }
}
