use std::io::Cursor;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use drumsheet::audio::RecordingAudio;
use drumsheet::engine::{EventOutcome, MatchEngine};
use drumsheet::headless::{run_headless, HeadlessEnd};
use drumsheet::history::HitJudgement;
use drumsheet::input::InputAdapter;
use drumsheet::pad::PadId;
use drumsheet::runtime::{DrumEvent, EventBus, FixedTicker, Runner, TestEventSource};
use drumsheet::session::EngineState;

// Headless integration using the internal runtime + engine without a TTY
// Verifies that hits flow from a producer thread through the bus into the engine.
#[test]
fn headless_sheet_flow_completes() {
    // Arrange: engine with a three-step sheet
    let audio = Arc::new(RecordingAudio::new());
    let mut engine = MatchEngine::new(Box::new(Arc::clone(&audio)), 20);
    engine.load_sheet_text("RH LH RF");
    engine.toggle_running();

    // Channel for the test event source
    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    // Producer: hits arrive from another thread
    let producer = std::thread::spawn(move || {
        for raw in ["1", "2", "9"] {
            tx.send(DrumEvent::Hit(raw.to_string())).unwrap();
        }
    });

    // Act: drive a tiny event loop until finished (or bounded steps)
    let mut last = None;
    for _ in 0..100u32 {
        if let DrumEvent::Hit(raw) = runner.step() {
            let outcome = engine.process_event(&raw);
            let done = outcome.completed().is_some();
            last = Some(outcome);
            if done {
                break;
            }
        }
    }
    producer.join().unwrap();

    // Assert
    assert_eq!(engine.state(), EngineState::Complete);
    assert_eq!(last.and_then(|o| o.completed()), Some(67));
    assert_eq!(engine.stats().attempts, 3);
    assert_eq!(audio.played(), vec![PadId::RightHand, PadId::LeftHand]);

    let judgements: Vec<HitJudgement> = engine
        .history_snapshot()
        .into_iter()
        .map(|e| e.judgement)
        .collect();
    assert_eq!(
        judgements,
        vec![HitJudgement::Correct, HitJudgement::Correct, HitJudgement::Wrong]
    );
}

#[test]
fn adapter_feeds_engine_through_bus() {
    let bus = EventBus::new();
    let data = Cursor::new(b"rh\nLH\nr-foot\n".to_vec());
    let _adapter = InputAdapter::spawn(data, bus.sender(), Duration::from_millis(5));
    let runner = Runner::new(bus.into_source(), FixedTicker::new(Duration::from_millis(5)));

    let mut engine = MatchEngine::silent();
    engine.load_sheet_text("RH LH RF");

    let mut out = Vec::new();
    let end = run_headless(&runner, &mut engine, &mut out).unwrap();

    assert_eq!(end, HeadlessEnd::Completed { accuracy: 100 });
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("complete: 3/3 correct, accuracy 100%"));
}

#[test]
fn hits_before_start_are_neutral_then_matching_begins() {
    let mut engine = MatchEngine::silent();
    engine.load_sheet_text("RF RF");

    assert_eq!(
        engine.process_event("3"),
        EventOutcome::Unmatched(Some(PadId::RightFoot))
    );
    engine.toggle_running();
    engine.process_event("3");
    engine.process_event("3");

    assert_eq!(engine.state(), EngineState::Complete);
    assert_eq!(engine.stats().accuracy, 100);
    assert_eq!(engine.history().len(), 3);
}

#[test]
fn history_is_bounded_during_long_run() {
    let mut engine = MatchEngine::new(Box::new(drumsheet::audio::SilentAudio), 20);
    let sheet: Vec<&str> = std::iter::repeat("RH").take(25).collect();
    engine.load_sheet(&sheet);
    engine.toggle_running();
    for i in 0..25 {
        engine.process_event(if i % 2 == 0 { "1" } else { "2" });
    }

    let history = engine.history_snapshot();
    assert_eq!(history.len(), 20);
    // first five evicted; oldest kept is index 5 (odd => LH)
    assert_eq!(history[0].display_token, "LH");
    assert_eq!(history[19].display_token, "RH");
    assert_eq!(engine.state(), EngineState::Complete);
    assert_eq!(engine.stats().accuracy, 52);
}
