//! Generated artifacts: the embeddable header and the HTML preview

pub mod header;
pub mod preview;

pub use header::{header_path, serialize, write_header};
pub use preview::{generate, open_preview, preview_path, write_preview};
