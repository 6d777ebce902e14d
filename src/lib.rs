#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod facts;
pub mod feed;
pub mod gallery;
pub mod logging;
pub mod record;
pub mod state;
pub mod ui;
pub mod video;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::{run, RunOptions};
