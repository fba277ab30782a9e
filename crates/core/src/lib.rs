//! Domain model for video-generation jobs.
//!
//! Holds the job lifecycle state machine, the client-facing job projection,
//! and the in-memory simulator that emulates an upstream provider's job
//! lifecycle with scheduled transitions.

pub mod clock;
pub mod error;
pub mod job;
pub mod simulator;
pub mod types;
