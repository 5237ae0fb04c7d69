//! Tests for the live-poll scheduler, on paused tokio time.
//!
//! Run with: cargo test --test poller_test

mod common;

use chrono::{DateTime, Utc};
use common::utc;
use mussel_dash::polling::LivePoller;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

type Ticks = Arc<Mutex<Vec<Option<DateTime<Utc>>>>>;

fn recorder(ticks: &Ticks) -> impl Fn(Option<DateTime<Utc>>) -> std::future::Ready<()> + Send + 'static {
    let ticks = Arc::clone(ticks);
    move |from| {
        ticks.lock().unwrap().push(from);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn first_tick_waits_one_period() {
    let ticks = Ticks::default();
    let mut poller = LivePoller::new(Duration::from_secs(3));
    poller.start(None, recorder(&ticks));

    sleep(Duration::from_millis(2900)).await;
    assert!(ticks.lock().unwrap().is_empty());

    sleep(Duration::from_millis(200)).await;
    assert_eq!(ticks.lock().unwrap().len(), 1);

    sleep(Duration::from_secs(6)).await;
    assert_eq!(ticks.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn restart_cancels_previous_loop() {
    let first = Ticks::default();
    let second = Ticks::default();
    let a = Some(utc(2025, 6, 18, 10, 0, 0));
    let b = Some(utc(2025, 6, 18, 11, 0, 0));

    let mut poller = LivePoller::new(Duration::from_secs(3));
    poller.start(a, recorder(&first));
    poller.start(b, recorder(&second));

    sleep(Duration::from_millis(9100)).await;

    assert!(first.lock().unwrap().is_empty());
    assert_eq!(*second.lock().unwrap(), vec![b, b, b]);
    assert_eq!(poller.from_bound(), b);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_silences_ticks() {
    let ticks = Ticks::default();
    let mut poller = LivePoller::new(Duration::from_secs(3));
    assert!(!poller.stop());

    poller.start(None, recorder(&ticks));
    assert!(poller.is_running());

    sleep(Duration::from_millis(3100)).await;
    assert!(poller.stop());
    assert!(!poller.stop());
    assert!(!poller.is_running());
    assert_eq!(poller.from_bound(), None);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(ticks.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_poller_aborts_the_loop() {
    let ticks = Ticks::default();
    {
        let mut poller = LivePoller::new(Duration::from_secs(3));
        poller.start(None, recorder(&ticks));
    }

    sleep(Duration::from_secs(30)).await;
    assert!(ticks.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_ticks_never_overlap() {
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut poller = LivePoller::new(Duration::from_secs(3));
    {
        let active = Arc::clone(&active);
        let max_active = Arc::clone(&max_active);
        let completed = Arc::clone(&completed);
        poller.start(None, move |_| {
            let active = Arc::clone(&active);
            let max_active = Arc::clone(&max_active);
            let completed = Arc::clone(&completed);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_secs(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                completed.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    sleep(Duration::from_secs(30)).await;
    assert_eq!(max_active.load(Ordering::SeqCst), 1);
    assert!(completed.load(Ordering::SeqCst) >= 4);
}
