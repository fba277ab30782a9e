//! Client for the upstream video-generation provider.
//!
//! Forwards job submission, lookup and cancellation over HTTP, injecting the
//! bearer credential and relaying the provider's status and body untouched.

pub mod api;
