//! Parallel Batch Extraction
//!
//! Uses Rayon to evaluate one path expression across many messages.
//! Independent messages share nothing, so each worker parses and queries its
//! own input; message handles never cross threads.

use rayon::prelude::*;

use crate::dom::Message;
use crate::path::{self, parser};

/// Parse every input and evaluate `path` against it, in parallel.
///
/// The expression is parsed once up front (and cached); a per-input result is
/// `None` when the input is not a valid message or the path addresses nothing
/// in it.
pub fn query_parallel(inputs: &[&str], path: &str) -> Result<Vec<Option<String>>, String> {
    let spec = parser::parse_cached(path)?;
    Ok(inputs
        .par_iter()
        .map(|input| {
            let message = Message::parse(input).ok()?;
            path::eval(&message, &spec)?.value()
        })
        .collect())
}
