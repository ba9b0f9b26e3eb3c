//! Brezza: a small self-hosted web application scaffold.
//!
//! One binary, one composed request pipeline: request logging, body and
//! cookie parsing, static assets, three mounted route groups, and a single
//! terminal error page. The route groups stay deliberately thin; the point
//! of the crate is the composition.

pub mod application;
pub mod config;
pub mod infra;
pub mod presentation;
