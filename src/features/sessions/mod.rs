//! Study session tracking.
//!
//! A member is tracked from the moment they join voice until they leave.
//! Pausing flushes the open interval to the duration log and remembers how
//! much of the session has been flushed so far; resuming opens a fresh
//! interval. The final leave reports the whole session.

pub mod event;
pub mod state;
pub mod tracker;

pub use event::SessionEvent;
pub use state::{ActiveSession, SessionState, SessionTable};
pub use tracker::SessionTracker;
