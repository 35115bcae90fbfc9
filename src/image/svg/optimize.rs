//! SVG optimization using usvg.
//!
//! usvg resolves styles, drops editor metadata and comments, and writes
//! the tree back without indentation.

use anyhow::{Context, Result};

/// Optimize SVG using usvg
pub fn optimize_svg(content: &[u8]) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };

    Ok(tree.to_string(&write_options).into_bytes())
}
