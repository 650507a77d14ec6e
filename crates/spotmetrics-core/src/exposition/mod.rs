//! Prometheus text exposition format (version 0.0.4).
//!
//! - `text`  : encoder (family snapshots -> bytes)
//! - `parse` : sample-line parser, mainly for verifying encoder output

pub mod parse;
pub mod text;

pub use parse::{parse_text, ParsedSample};
pub use text::{
    encode_text, escape_help, escape_label_value, format_value, write_family, TEXT_CONTENT_TYPE,
};
