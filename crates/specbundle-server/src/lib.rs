//! # specbundle-server
//!
//! HTTP server library for specbundle.
//!
//! This library provides the API handlers, logging setup and state
//! management; `main.rs` wires them to the settings and a listener.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod state;
