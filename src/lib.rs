// ABOUTME: Public library API for BazQux Reader backups
// ABOUTME: Re-exports core modules for the CLI and integration tests

pub mod api;
pub mod auth;
pub mod cli;
pub mod convert;
pub mod error;
pub mod logging;
pub mod model;
pub mod pacing;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
pub use model::{Item, StreamContents, TagList};
