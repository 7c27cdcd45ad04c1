//! Real-time playback: the scheduler thread and its observer events.

pub mod events;
pub mod scheduler;
