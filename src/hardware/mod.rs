//! Hardware peripheral interfaces.
//!
//! The assistant drives two external peripherals: a small text display and
//! an audio output. Both are modeled as narrow capability traits so the
//! engine can run against the real devices, a console stand-in, or no-op
//! stubs in tests.

pub mod audio;
pub mod display;

pub use audio::{AudioError, AudioPlayer, NullPlayer, RodioPlayer};
pub use display::{ConsoleDisplay, DisplayPort, NullDisplay};
