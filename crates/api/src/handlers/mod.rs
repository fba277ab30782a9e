//! Request handlers for the job endpoints.
//!
//! Handlers dispatch to whichever [`JobBackend`](crate::state::JobBackend) is
//! active and map errors via [`AppError`](crate::error::AppError).

pub mod videos;
