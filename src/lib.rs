//! AI Photo Retouch Proxy
//!
//! A secure proxy between a browser photo editor and a generative image
//! model: natural-language edit requests come in, the model credential never
//! leaves the server, and every model reply is translated into one stable
//! response contract.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod prompt;
pub mod response;

pub use error::{AppError, Result};

use std::sync::Arc;

use model::traits::ImageModel;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: config::Settings,
    pub model: Arc<dyn ImageModel>,
}
