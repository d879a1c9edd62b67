/// Frame buffer, tick delay and playback state types.
pub mod core;
/// Error taxonomy shared by every layer.
pub mod error;
