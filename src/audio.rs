use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use log::{debug, info, warn};

use crate::config::PadSounds;
use crate::pad::PadId;

/// Something that can sound a pad. Calls are fire-and-forget and may overlap;
/// implementations must not queue one pad behind another.
pub trait AudioSink: Send + Sync {
    fn play(&self, pad: PadId);
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, _pad: PadId) {}
}

/// One decoded sample per pad, loaded once at startup. Pads whose file is
/// missing or undecodable stay silent.
pub struct PadSamples {
    samples: [Option<StaticSoundData>; 3],
}

impl PadSamples {
    pub fn load(sounds: &PadSounds) -> Self {
        let mut samples: [Option<StaticSoundData>; 3] = Default::default();
        for pad in PadId::ALL {
            samples[pad.index()] = sounds.path_for(pad).and_then(|path| load_sample(pad, path));
        }
        Self { samples }
    }

    pub fn get(&self, pad: PadId) -> Option<&StaticSoundData> {
        self.samples[pad.index()].as_ref()
    }

    pub fn loaded_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }
}

fn load_sample(pad: PadId, path: &Path) -> Option<StaticSoundData> {
    if !path.exists() {
        warn!("sample for {pad} not found: {}", path.display());
        return None;
    }
    match StaticSoundData::from_file(path) {
        Ok(data) => {
            debug!("loaded sample for {pad}: {}", path.display());
            Some(data)
        }
        Err(e) => {
            warn!("failed to decode sample for {pad} ({}): {e}", path.display());
            None
        }
    }
}

/// Plays pad samples on a kira mixer owned by a dedicated audio thread.
///
/// `play` only hands the pad to that thread, so overlapping hits each get
/// their own voice and the caller never waits on the device.
#[derive(Debug)]
pub struct KiraAudio {
    tx: Sender<PadId>,
    loaded: [bool; 3],
}

impl KiraAudio {
    /// Open the default output device and start the mixer thread.
    pub fn start(samples: PadSamples) -> io::Result<Self> {
        let loaded = PadId::ALL.map(|pad| samples.get(pad).is_some());
        let (tx, rx) = mpsc::channel::<PadId>();
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name("audio".into())
            .spawn(move || {
                let mut manager =
                    match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
                        Ok(manager) => {
                            let _ = ready_tx.send(Ok(()));
                            manager
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                for pad in rx {
                    if let Some(data) = samples.get(pad) {
                        if let Err(e) = manager.play(data.clone()) {
                            warn!("failed to play {pad}: {e:?}");
                        }
                    }
                }
                debug!("audio thread exiting");
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx, loaded }),
            Ok(Err(e)) => Err(io::Error::other(format!("failed to create audio manager: {e}"))),
            Err(_) => Err(io::Error::other("audio thread exited during startup")),
        }
    }
}

impl AudioSink for KiraAudio {
    fn play(&self, pad: PadId) {
        if !self.loaded[pad.index()] {
            debug!("no sample for {pad}");
            return;
        }
        if self.tx.send(pad).is_err() {
            warn!("audio thread is gone, dropping {pad}");
        }
    }
}

/// Decode the configured samples and open the output device. Falls back to
/// silence when no sample loads or the device can't be opened.
pub fn open(sounds: &PadSounds) -> Box<dyn AudioSink> {
    let samples = PadSamples::load(sounds);
    let loaded = samples.loaded_count();
    if loaded == 0 {
        info!("no pad samples loaded, audio off");
        return Box::new(SilentAudio);
    }
    match KiraAudio::start(samples) {
        Ok(audio) => {
            info!("{loaded} of 3 pad samples loaded");
            Box::new(audio)
        }
        Err(e) => {
            warn!("audio output unavailable: {e}");
            Box::new(SilentAudio)
        }
    }
}

/// Records every trigger in order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    played: Mutex<Vec<PadId>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<PadId> {
        self.played
            .lock()
            .map(|played| played.clone())
            .unwrap_or_default()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, pad: PadId) {
        if let Ok(mut played) = self.played.lock() {
            played.push(pad);
        }
    }
}

impl<T: AudioSink + ?Sized> AudioSink for std::sync::Arc<T> {
    fn play(&self, pad: PadId) {
        (**self).play(pad)
    }
}
