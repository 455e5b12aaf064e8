// Library surface for the binary, headless runs and integration tests.
// The terminal UI lives in the binary and only talks to `MatchEngine`.
pub mod app_dirs;
pub mod audio;
pub mod config;
pub mod engine;
pub mod headless;
pub mod history;
pub mod input;
pub mod pad;
pub mod runtime;
pub mod session;
pub mod sheet;
pub mod stats;

pub use engine::{EventOutcome, MatchEngine, ToggleOutcome};
pub use pad::PadId;
