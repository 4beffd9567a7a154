//! Session analytics: the conversation log, the usage accumulator, and the
//! diagnostic event log.

pub mod accumulator;
pub mod conversation;
pub mod events;

pub use accumulator::{Accumulator, AnalyticsSnapshot, Tally};
pub use conversation::{ConversationLog, Turn};
pub use events::EventLog;
