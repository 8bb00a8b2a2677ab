use hevault_session::pacing::{DECRYPTION_STEPS, ENCRYPTION_STEPS};
use hevault_session::{SessionError, StepPacer};
use std::time::Duration;
use tokio::time::Instant;

#[test]
fn step_tables_end_at_full_progress() {
    assert_eq!(ENCRYPTION_STEPS.map(|s| s.percent), [33, 66, 100]);
    assert_eq!(DECRYPTION_STEPS.map(|s| s.percent), [25, 50, 75, 100]);
    for (i, step) in DECRYPTION_STEPS.iter().enumerate() {
        assert_eq!(step.index, i);
    }
}

#[tokio::test(start_paused = true)]
async fn step_publishes_progress_then_waits() {
    let (handle, mut pacer) = StepPacer::new();
    let start = Instant::now();

    pacer
        .step(ENCRYPTION_STEPS[1], Duration::from_millis(1500))
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(1500));
    let progress = handle.progress();
    assert_eq!(progress.step, Some(ENCRYPTION_STEPS[1]));
    assert!(!progress.completed);
}

#[tokio::test(start_paused = true)]
async fn cancel_before_step() {
    let (handle, mut pacer) = StepPacer::new();
    handle.cancel();
    assert!(handle.is_cancelled());

    let err = pacer
        .step(ENCRYPTION_STEPS[0], Duration::from_millis(1000))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Cancelled));
    assert_eq!(handle.progress().step, None);
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_delay() {
    let (handle, mut pacer) = StepPacer::new();
    let start = Instant::now();

    let (result, _) = tokio::join!(
        pacer.step(DECRYPTION_STEPS[2], Duration::from_millis(2000)),
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            handle.cancel();
        }
    );

    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert!(start.elapsed() < Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn dropped_handle_does_not_cancel() {
    let (handle, mut pacer) = StepPacer::new();
    drop(handle);

    pacer
        .step(DECRYPTION_STEPS[0], Duration::from_millis(1500))
        .await
        .unwrap();
}

#[tokio::test]
async fn subscribers_see_completion() {
    let (handle, mut pacer) = StepPacer::new();
    let mut rx = handle.subscribe();

    pacer.step(ENCRYPTION_STEPS[2], Duration::ZERO).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().step, Some(ENCRYPTION_STEPS[2]));

    pacer.finish();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().completed);
}

#[tokio::test(start_paused = true)]
async fn conclude_ignores_cancellation() {
    let (handle, mut pacer) = StepPacer::new();
    handle.cancel();
    let start = Instant::now();

    pacer
        .conclude(DECRYPTION_STEPS[3], Duration::from_millis(1000))
        .await;

    assert!(start.elapsed() >= Duration::from_millis(1000));
    let progress = handle.progress();
    assert_eq!(progress.step, Some(DECRYPTION_STEPS[3]));
    assert!(progress.completed);
}
