use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::runtime::DrumEvent;

/// What the blocking reader hands to the poll loop.
enum LineRead {
    Line(String),
    Failed(io::Error),
    Eof,
}

/// Reads newline-delimited hit tokens from a device or stream and forwards
/// them onto the event bus in arrival order.
///
/// A blocking reader thread feeds a poll loop that wakes every
/// `poll_interval` to check the stop flag, so `stop` returns promptly even
/// while the device is silent.
pub struct InputAdapter {
    stop: Arc<AtomicBool>,
    poll_handle: Option<JoinHandle<()>>,
}

impl InputAdapter {
    pub fn spawn<R: Read + Send + 'static>(
        reader: R,
        tx: Sender<DrumEvent>,
        poll_interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (line_tx, line_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                let msg = match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => LineRead::Eof,
                    Ok(_) => LineRead::Line(String::from_utf8_lossy(&buf).into_owned()),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => LineRead::Failed(e),
                };
                let done = matches!(msg, LineRead::Eof);
                let failed = matches!(msg, LineRead::Failed(_));
                if line_tx.send(msg).is_err() || done {
                    break;
                }
                if failed {
                    thread::sleep(poll_interval);
                }
            }
        });

        let stop_flag = Arc::clone(&stop);
        let poll_handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match line_rx.recv_timeout(poll_interval) {
                    Ok(LineRead::Line(line)) => {
                        let token = line.trim();
                        if token.is_empty() {
                            continue;
                        }
                        debug!("received '{token}'");
                        if tx.send(DrumEvent::Hit(token.to_string())).is_err() {
                            return;
                        }
                    }
                    Ok(LineRead::Failed(e)) => warn!("input read error: {e}"),
                    Ok(LineRead::Eof) | Err(RecvTimeoutError::Disconnected) => {
                        info!("input closed");
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            let _ = tx.send(DrumEvent::Disconnected);
        });

        Self {
            stop,
            poll_handle: Some(poll_handle),
        }
    }

    /// Open a character device, FIFO or plain file and stream hits from it.
    pub fn open<P: AsRef<Path>>(
        path: P,
        tx: Sender<DrumEvent>,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        info!("listening on {}", path.as_ref().display());
        Ok(Self::spawn(file, tx, poll_interval))
    }

    pub fn stdin(tx: Sender<DrumEvent>, poll_interval: Duration) -> Self {
        info!("listening on stdin");
        Self::spawn(io::stdin(), tx, poll_interval)
    }

    /// Ask the poll loop to exit and wait for it. Lines already forwarded are
    /// unaffected.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.poll_handle.take() {
            let _ = handle.join();
        }
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.poll_handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for InputAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}
