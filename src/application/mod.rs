//! Application services layer scaffolding.

pub mod error;
pub mod users;
pub mod videos;
