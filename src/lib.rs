//! docverify: review, filter, approve and reject declaration documents
//!
//! The verification core lives in [`verification`]; [`tui`] is the
//! interactive console on top of it and [`api`] the backend it talks to.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod tui;
pub mod verification;
