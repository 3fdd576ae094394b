//! Rendering of aggregated statistics and exit-code selection.
mod exit;
mod json;
mod text;


pub use exit::exit_code;
pub use json::render_json;
pub use text::render_text;
