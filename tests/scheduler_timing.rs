//! Macro playback timing, observed through the scheduler's own due times.

mod common;

use std::time::{Duration, Instant};

use common::RecordingBackend;
use keyecho::binding::{MacroBinding, SequenceStep};
use keyecho::gesture::GestureKind;
use keyecho::input::ModifierContext;
use keyecho::scheduler::{MacroExecutionEvent, MacroScheduler};

fn binding(trigger: &str, steps: Vec<SequenceStep>) -> MacroBinding {
    MacroBinding {
        trigger_key: trigger.to_string(),
        trigger_context: ModifierContext::Normal,
        trigger_gesture: GestureKind::Double,
        sequence: steps,
        enabled: true,
    }
}

/// Tick at every due instant until idle, recording (key, at) per send.
fn run_collecting(
    scheduler: &mut MacroScheduler,
    start: Instant,
) -> Vec<(String, Instant)> {
    let mut sends = Vec::new();
    let mut now = start;
    let mut guard = 0;
    while !scheduler.is_idle() {
        if let Some(due) = scheduler.next_due() {
            now = now.max(due);
        }
        for event in scheduler.tick(now) {
            if let MacroExecutionEvent::Step { key, at, .. } = event {
                sends.push((key, at));
            }
        }
        guard += 1;
        assert!(guard < 10_000, "scheduler failed to drain");
    }
    sends
}

#[test]
fn test_six_echoes_with_jittered_gaps_and_no_trailing_delay() {
    let (backend, sent) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    let b = binding("1", vec![SequenceStep::new("a", 25, 29, 6)]);
    assert!(scheduler.dispatch(&b, t0));

    let sends = run_collecting(&mut scheduler, t0);
    assert_eq!(sends.len(), 6);
    assert_eq!(sent.lock().unwrap().len(), 6);

    // First echo goes out at dispatch time; every gap lies in [25, 29]ms.
    assert_eq!(sends[0].1, t0);
    for pair in sends.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(gap >= Duration::from_millis(25), "gap {:?} below min", gap);
        assert!(gap <= Duration::from_millis(29), "gap {:?} above max", gap);
    }

    // Nothing is scheduled after the last echo.
    assert!(scheduler.next_due().is_none());
    assert!(scheduler.is_idle());
}

#[test]
fn test_inter_step_gap_uses_upcoming_steps_range() {
    let (backend, _) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    // Step 1 is fast, step 2 slow: the gap between them must come from
    // step 2's range.
    let b = binding(
        "1",
        vec![
            SequenceStep::new("a", 25, 29, 1),
            SequenceStep::new("b", 100, 120, 1),
        ],
    );
    scheduler.dispatch(&b, t0);
    scheduler.tick(t0);

    let due = scheduler.next_due().unwrap();
    let gap = due.duration_since(t0);
    assert!(gap >= Duration::from_millis(100));
    assert!(gap <= Duration::from_millis(120));
}

#[test]
fn test_jitter_varies_across_runs() {
    let (backend, _) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    // A wide range over many echoes: identical draws every time would
    // mean the jitter source is broken.
    let b = binding("1", vec![SequenceStep::new("a", 25, 75, 20)]);
    scheduler.dispatch(&b, t0);
    let sends = run_collecting(&mut scheduler, t0);

    let gaps: Vec<Duration> = sends
        .windows(2)
        .map(|p| p[1].1.duration_since(p[0].1))
        .collect();
    let first = gaps[0];
    assert!(
        gaps.iter().any(|g| *g != first),
        "19 gaps over a 50ms range all identical"
    );
}

#[test]
fn test_two_queues_play_out_concurrently() {
    let (backend, sent) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    scheduler.dispatch(&binding("1", vec![SequenceStep::new("a", 25, 29, 3)]), t0);
    scheduler.dispatch(&binding("2", vec![SequenceStep::new("b", 25, 29, 3)]), t0);

    let sends = run_collecting(&mut scheduler, t0);
    assert_eq!(sends.len(), 6);

    // Neither queue waited for the other to finish: both sent their first
    // echo at dispatch time.
    let first_a = sends.iter().find(|(k, _)| k == "a").unwrap().1;
    let first_b = sends.iter().find(|(k, _)| k == "b").unwrap().1;
    assert_eq!(first_a, t0);
    assert_eq!(first_b, t0);

    let keys = sent.lock().unwrap().clone();
    assert_eq!(keys.iter().filter(|k| *k == "a").count(), 3);
    assert_eq!(keys.iter().filter(|k| *k == "b").count(), 3);
}

#[test]
fn test_second_dispatch_waits_for_first_on_same_key() {
    let (backend, _) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    let b = binding("1", vec![SequenceStep::new("a", 25, 29, 2)]);
    scheduler.dispatch(&b, t0);
    scheduler.dispatch(&b, t0);

    let mut completed_at = None;
    let mut second_started_at = None;
    let mut now = t0;
    let mut completions = 0;
    let mut guard = 0;
    while !scheduler.is_idle() {
        if let Some(due) = scheduler.next_due() {
            now = now.max(due);
        }
        for event in scheduler.tick(now) {
            match event {
                MacroExecutionEvent::Completed { at, .. } => {
                    completions += 1;
                    if completions == 1 {
                        completed_at = Some(at);
                    }
                }
                MacroExecutionEvent::Started { at, .. } if completions == 1 => {
                    second_started_at = Some(at);
                }
                _ => {}
            }
        }
        guard += 1;
        assert!(guard < 10_000, "scheduler failed to drain");
    }

    assert_eq!(completions, 2);
    assert!(second_started_at.unwrap() >= completed_at.unwrap());
}

#[test]
fn test_multi_step_sequence_preserves_order() {
    let (backend, sent) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    let b = binding(
        "1",
        vec![
            SequenceStep::new("q", 25, 30, 2),
            SequenceStep::new("w", 25, 30, 1),
            SequenceStep::new("q", 25, 30, 1),
        ],
    );
    scheduler.dispatch(&b, t0);
    run_collecting(&mut scheduler, t0);

    assert_eq!(*sent.lock().unwrap(), vec!["q", "q", "w", "q"]);
}

#[test]
fn test_cancel_mid_playback_stops_remaining_echoes() {
    let (backend, sent) = RecordingBackend::new();
    let mut scheduler = MacroScheduler::new(backend);
    let t0 = Instant::now();

    let b = binding("1", vec![SequenceStep::new("a", 25, 29, 5)]);
    scheduler.dispatch(&b, t0);
    scheduler.tick(t0);
    assert_eq!(sent.lock().unwrap().len(), 1);

    let events = scheduler.cancel(&keyecho::input::PhysicalInput::plain("1"), t0);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], MacroExecutionEvent::Cancelled { .. }));
    assert!(scheduler.is_idle());
    assert_eq!(sent.lock().unwrap().len(), 1);
}
