//! Host-facing view facade.

/// Declarative configuration (markup attributes, JSON).
pub mod config;
/// [`view::GifView`] and its host collaborators.
pub mod view;
