//! Timer-driven playback.
//!
//! A [`animator::FrameAnimator`] redraws one shared frame buffer on its own tick thread and
//! hands it to a listener, optionally through a [`dispatch::Dispatcher`].

pub mod animator;
pub mod dispatch;
