//! Classified task spawning.
//!
//! # Role
//!
//! Gives the typing core a place to hand deferred work without owning an
//! async runtime itself. Every spawn is tagged with a [`TaskClass`] so that
//! scheduling decisions show up in traces.
//!
//! # Invariants
//!
//! - Blocking work spawned outside a tokio context runs on one lazily built,
//!   process-wide runtime.
//! - Spawning never panics; runtime construction failures surface as
//!   [`std::io::Error`].

mod class;
mod spawn;

pub use class::TaskClass;
pub use spawn::{spawn_blocking, spawn_named_thread, spawn_thread};
