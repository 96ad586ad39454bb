//! Countdown timer tests on paused tokio time

use std::time::Duration;

use tokio::time::Instant;

use crate::services::verification::{format_countdown, CountdownTimer, TimerEvent};

#[tokio::test(start_paused = true)]
async fn test_counts_down_and_expires_once() {
    let started = Instant::now();
    let (_timer, mut rx) = CountdownTimer::start(3);

    assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 2 }));
    assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 1 }));
    assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
    assert_eq!(rx.recv().await, None);

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_full_ttl_emits_exactly_one_expiry() {
    let (_timer, mut rx) = CountdownTimer::start(300);

    let mut last = 300;
    let mut expired = 0;
    while let Some(event) = rx.recv().await {
        match event {
            TimerEvent::Tick { remaining } => {
                assert_eq!(remaining, last - 1);
                assert!(remaining > 0);
                last = remaining;
            }
            TimerEvent::Expired => expired += 1,
        }
    }

    assert_eq!(last, 1);
    assert_eq!(expired, 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_duration_expires_immediately() {
    let (_timer, mut rx) = CountdownTimer::start(0);
    assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
    assert_eq!(rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_further_events() {
    let (timer, mut rx) = CountdownTimer::start(10);
    assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 9 }));

    timer.cancel();
    assert_eq!(rx.recv().await, None);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(timer.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_task() {
    let (timer, mut rx) = CountdownTimer::start(10);
    drop(timer);
    assert_eq!(rx.recv().await, None);
}

#[test]
fn test_format_countdown() {
    assert_eq!(format_countdown(300), "5:00");
    assert_eq!(format_countdown(65), "1:05");
    assert_eq!(format_countdown(9), "0:09");
    assert_eq!(format_countdown(0), "0:00");
}
