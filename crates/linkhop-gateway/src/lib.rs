//! HTTP front door for Linkhop.
//!
//! `POST /shorten` mints a new short code and `GET /{code}` redirects to the
//! original URL, recording a visit on the way out.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
