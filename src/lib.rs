//! Tunescout - client-side session orchestration for audio genre
//! classification and track discovery.
//!
//! The crate sequences file validation, upload, remote classification,
//! catalog token acquisition, recommendation retrieval, and coordinated
//! preview playback on a single cooperative runtime. Visual concerns live
//! entirely in whatever frontend drives this library; everything here is
//! control flow and state.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod playback;
pub mod progress;
pub mod recommendations;
pub mod search;
pub mod session;

pub use config::Config;
pub use error::{AppError, AppResult, UploadError};
