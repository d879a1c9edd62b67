//! Download cache for remote sources.

/// Content-addressed download cache and the [`content::Fetch`] seam.
pub mod content;
