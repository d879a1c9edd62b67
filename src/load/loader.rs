use std::{io::Read, panic::AssertUnwindSafe, sync::Arc};

use crate::{
    cache::content::{ByteStream, ContentCache, Fetch},
    decode::movie::{GifMovieDecoder, MovieDecoder},
    foundation::error::{GifViewError, GifViewResult, LoadError},
    load::runner::{Completion, TaskRunner, ThreadRunner, completion},
    player::animator::FrameAnimator,
    source::{assets::AssetSource, descriptor::SourceDescriptor},
};

/// Outcome of one background load.
pub type LoadResult = Result<FrameAnimator, LoadError>;

/// Collaborators used to turn a [`SourceDescriptor`] into bytes and bytes into a movie.
#[derive(Clone)]
pub struct LoadContext {
    /// Packaged assets for `asset:` sources.
    pub assets: Option<Arc<dyn AssetSource>>,
    /// Cache for `url:` sources. When absent, URLs are fetched directly.
    pub cache: Option<Arc<ContentCache>>,
    /// Fetcher for uncached `url:` sources. Defaults to HTTP when the `http` feature is on.
    pub fetcher: Option<Arc<dyn Fetch>>,
    pub decoder: Arc<dyn MovieDecoder>,
}

impl Default for LoadContext {
    fn default() -> Self {
        Self {
            assets: None,
            cache: None,
            fetcher: None,
            decoder: Arc::new(GifMovieDecoder),
        }
    }
}

impl std::fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadContext")
            .field("assets", &self.assets.is_some())
            .field("cache", &self.cache)
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}

/// Runs byte acquisition and decoding on a [`TaskRunner`].
///
/// Every failure inside the job is classified into a [`LoadError`] and delivered through the
/// returned [`Completion`]; nothing escapes as a panic or raw error.
#[derive(Clone)]
pub struct AsyncLoader {
    runner: Arc<dyn TaskRunner>,
    ctx: LoadContext,
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRunner), LoadContext::default())
    }
}

impl AsyncLoader {
    pub fn new(runner: Arc<dyn TaskRunner>, ctx: LoadContext) -> Self {
        Self { runner, ctx }
    }

    pub fn context(&self) -> &LoadContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut LoadContext {
        &mut self.ctx
    }

    /// Submit one load. Only a failure to schedule the job is reported synchronously.
    pub fn submit(&self, source: SourceDescriptor) -> GifViewResult<Completion<LoadResult>> {
        let (done, result) = completion::<LoadResult>();
        let ctx = self.ctx.clone();
        self.runner.spawn(
            "gifview-load",
            Box::new(move || {
                let res = std::panic::catch_unwind(AssertUnwindSafe(|| load_blocking(source, &ctx)))
                    .unwrap_or_else(|_| {
                        Err(LoadError::new(GifViewError::Other(anyhow::anyhow!(
                            "load task panicked"
                        ))))
                    });
                done.complete(res);
            }),
        )?;
        Ok(result)
    }
}

/// Acquire, read and decode `source` on the current thread.
#[tracing::instrument(skip_all, fields(source = %source.label()))]
pub fn load_blocking(source: SourceDescriptor, ctx: &LoadContext) -> LoadResult {
    let label = source.label();
    let mut stream = open_source(source, ctx)?;

    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .map_err(|e| GifViewError::from_io(&format!("read '{label}'"), &e))?;
    drop(stream);

    let movie = ctx.decoder.decode(&bytes)?;
    let animator = FrameAnimator::new(movie)?;
    tracing::info!(
        width = animator.width(),
        height = animator.height(),
        duration_ms = animator.duration_ms(),
        "gif loaded"
    );
    Ok(animator)
}

fn open_source(source: SourceDescriptor, ctx: &LoadContext) -> Result<ByteStream, LoadError> {
    match source {
        SourceDescriptor::Url(url) => {
            if let Some(cache) = &ctx.cache {
                return cache.resolve(&url);
            }
            let fetcher = default_fetcher(ctx)?;
            Ok(fetcher.open(&url)?)
        }
        SourceDescriptor::Asset(path) => {
            let assets = ctx.assets.as_ref().ok_or_else(|| {
                GifViewError::configuration("no asset source configured for asset: sources")
            })?;
            Ok(assets
                .open(&path)
                .map_err(|e| GifViewError::from_io(&format!("open asset '{path}'"), &e))?)
        }
        SourceDescriptor::Bytes(stream) => Ok(stream),
        SourceDescriptor::Registered { body, open, .. } => Ok(open(&body)?),
    }
}

fn default_fetcher(ctx: &LoadContext) -> GifViewResult<Arc<dyn Fetch>> {
    if let Some(fetcher) = &ctx.fetcher {
        return Ok(fetcher.clone());
    }
    #[cfg(feature = "http")]
    {
        Ok(Arc::new(crate::cache::content::HttpFetcher::new()?))
    }
    #[cfg(not(feature = "http"))]
    {
        Err(GifViewError::configuration(
            "no fetcher configured for url: sources",
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/loader.rs"]
mod tests;
