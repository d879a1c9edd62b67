//! Where GIF bytes come from.

/// Packaged asset stores.
pub mod assets;
/// Source descriptor strings and the prefix registry.
pub mod descriptor;
