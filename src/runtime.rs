use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Everything the engine loop reacts to, funnelled through one channel so the
/// loop is the only place engine state changes.
#[derive(Clone, Debug, PartialEq)]
pub enum DrumEvent {
    /// Raw token from the trigger hardware.
    Hit(String),
    Key(KeyEvent),
    Resize,
    Tick,
    /// The input source closed or was stopped.
    Disconnected,
}

/// Source of events for the engine loop
pub trait DrumEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<DrumEvent, RecvTimeoutError>;
}

/// The shared event bus. Producers get a cloned sender; the loop keeps the
/// receiving end.
pub struct EventBus {
    tx: Sender<DrumEvent>,
    rx: Receiver<DrumEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<DrumEvent> {
        self.tx.clone()
    }

    /// Hand out the receiving side. The bus's own sender is dropped so the
    /// source reports `Disconnected` once every producer is gone.
    pub fn into_source(self) -> ChannelEventSource {
        ChannelEventSource { rx: self.rx }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Production event source backed by the bus channel.
pub struct ChannelEventSource {
    rx: Receiver<DrumEvent>,
}

impl DrumEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrumEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward terminal keys and resizes onto the bus until the receiver goes away.
pub fn spawn_terminal_events(tx: Sender<DrumEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => DrumEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => DrumEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("terminal event read failed: {e}");
                break;
            }
        };
        if tx.send(evt).is_err() {
            break;
        }
    })
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<DrumEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<DrumEvent>) -> Self {
        Self { rx }
    }
}

impl DrumEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<DrumEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: DrumEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: DrumEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> DrumEvent {
        self.poll().unwrap_or(DrumEvent::Tick)
    }

    /// Like `step`, but `None` once every producer has hung up.
    pub fn poll(&self) -> Option<DrumEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => Some(DrumEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            DrumEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(DrumEvent::Hit("1".into())).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_eq!(runner.step(), DrumEvent::Hit("1".into()));
    }

    #[test]
    fn events_keep_arrival_order() {
        let bus = EventBus::new();
        let tx = bus.sender();
        for raw in ["1", "2", "3"] {
            tx.send(DrumEvent::Hit(raw.into())).unwrap();
        }
        let runner = Runner::new(bus.into_source(), FixedTicker::new(Duration::from_millis(5)));

        let got: Vec<DrumEvent> = (0..3).map(|_| runner.step()).collect();
        assert_eq!(
            got,
            vec![
                DrumEvent::Hit("1".into()),
                DrumEvent::Hit("2".into()),
                DrumEvent::Hit("3".into()),
            ]
        );
    }

    #[test]
    fn poll_reports_closed_bus() {
        let bus = EventBus::new();
        let tx = bus.sender();
        tx.send(DrumEvent::Resize).unwrap();
        drop(tx);
        let runner = Runner::new(bus.into_source(), FixedTicker::new(Duration::from_millis(5)));

        assert_eq!(runner.poll(), Some(DrumEvent::Resize));
        assert_eq!(runner.poll(), None);
        assert_eq!(runner.step(), DrumEvent::Tick);
    }
}
