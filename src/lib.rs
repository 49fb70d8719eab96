//! Deskmate - Always-on Personal Desk Assistant
//!
//! World clock with multi-timezone resolution, an in-memory alarm engine
//! with snooze and gradual-volume profiles, and natural-language alarm
//! commands, driving an attached display/audio peripheral. The engine is
//! tick-driven: the host calls the evaluator once per second and all
//! long-running work happens on cooperatively cancelled worker threads.

pub mod alarms;
pub mod clock;
pub mod hardware;
pub mod storage;
pub mod voice;

// Re-export commonly used types
pub use alarms::evaluator::AlarmEvaluator;
pub use alarms::ring::RingController;
pub use alarms::store::AlarmStore;
pub use clock::display_loop::ClockDisplayLoop;
pub use clock::resolver::TimeResolver;
pub use storage::config::AssistantConfig;
pub use voice::parser::VoiceCommandParser;
