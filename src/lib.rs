//! gifview is an embeddable animated GIF player.
//!
//! Bytes come from a URL (through an on-disk [`ContentCache`]), a packaged asset, a raw
//! stream, or a host-registered source prefix. Decoding runs in the background via an
//! [`AsyncLoader`]; playback is driven by a [`FrameAnimator`] tick thread that redraws a
//! single shared [`Frame`]. [`GifView`] ties these together:
//!
//! - `set_source` / `set_source_str` start at most one load at a time
//! - `poll` attaches finished loads on the owning thread
//! - `start_when_possible`, `stop_when_possible` and `clear` defer until a load finishes
#![forbid(unsafe_code)]

pub mod cache;
pub mod decode;
pub mod foundation;
pub mod load;
pub mod player;
pub mod source;
pub mod widget;

pub use crate::cache::content::{ByteStream, ContentCache, Fetch, content_key};
#[cfg(feature = "http")]
pub use crate::cache::content::HttpFetcher;
pub use crate::decode::movie::{GifMovie, GifMovieDecoder, Movie, MovieDecoder, decode_movie};
pub use crate::foundation::core::{DEFAULT_DELAY_MS, Frame, FrameDelay, PlaybackState};
pub use crate::foundation::error::{GifViewError, GifViewResult, LoadError};
pub use crate::load::loader::{AsyncLoader, LoadContext, LoadResult, load_blocking};
pub use crate::load::runner::{Completion, TaskRunner, TaskStatus, ThreadRunner};
pub use crate::player::animator::FrameAnimator;
pub use crate::player::dispatch::{Dispatcher, UiQueue};
pub use crate::source::assets::{AssetSource, DirAssets, MemoryAssets};
pub use crate::source::descriptor::{SourceDescriptor, SourceRegistry};
pub use crate::widget::config::WidgetConfig;
pub use crate::widget::view::{GifView, Intent, LoadListener, Surface};
