//! Background Tasks Module
//!
//! Optional maintenance tasks running alongside the cache.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
