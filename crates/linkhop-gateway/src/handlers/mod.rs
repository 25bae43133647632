mod url;

pub use url::{method_not_allowed, not_found, redirect_handler, shorten_handler};
