use std::{io::Read, sync::Arc};

use crate::{
    cache::content::ByteStream,
    foundation::error::{GifViewError, GifViewResult},
};

/// Prefix of URL descriptor strings.
pub const URL_PREFIX: &str = "url:";
/// Prefix of packaged-asset descriptor strings.
pub const ASSET_PREFIX: &str = "asset:";
/// Extension appended to asset paths that lack it.
pub const GIF_EXTENSION: &str = ".gif";

/// Opens the byte stream for the body of a registered descriptor string.
pub type OpenFn = Arc<dyn Fn(&str) -> GifViewResult<ByteStream> + Send + Sync>;

/// Where to obtain GIF bytes for one load request.
pub enum SourceDescriptor {
    /// Remote resource, fetched (and cached, when a cache is configured).
    Url(String),
    /// Normalized path inside the host's asset store.
    Asset(String),
    /// Caller-supplied stream, consumed by the load.
    Bytes(ByteStream),
    /// Descriptor string claimed by a prefix added with [`SourceRegistry::register`].
    Registered {
        /// Prefix that matched.
        prefix: String,
        /// Remainder of the descriptor string after the prefix.
        body: String,
        /// Opener registered for `prefix`.
        open: OpenFn,
    },
}

impl std::fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Asset(path) => f.debug_tuple("Asset").field(path).finish(),
            Self::Bytes(_) => f.debug_tuple("Bytes").field(&"..").finish(),
            Self::Registered { prefix, body, .. } => f
                .debug_struct("Registered")
                .field("prefix", prefix)
                .field("body", body)
                .finish(),
        }
    }
}

impl SourceDescriptor {
    pub fn url(url: impl Into<String>) -> GifViewResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(GifViewError::invalid_source("url must be non-empty"));
        }
        Ok(Self::Url(url))
    }

    pub fn asset(path: &str) -> GifViewResult<Self> {
        Ok(Self::Asset(normalize_asset_path(path)?))
    }

    pub fn bytes(reader: impl Read + Send + 'static) -> Self {
        Self::Bytes(Box::new(reader))
    }

    /// Parse `url:<url>` or `asset:<path>` with the built-in prefixes only.
    pub fn parse(s: &str) -> GifViewResult<Self> {
        SourceRegistry::new().parse(s)
    }

    /// Short human-readable description used in logs.
    pub fn label(&self) -> String {
        match self {
            Self::Url(url) => format!("{URL_PREFIX}{url}"),
            Self::Asset(path) => format!("{ASSET_PREFIX}{path}"),
            Self::Bytes(_) => "stream".to_string(),
            Self::Registered { prefix, body, .. } => format!("{prefix}{body}"),
        }
    }
}

/// Normalize an asset path: `\` becomes `/`, empty and `.` segments are dropped, and
/// `.gif` is appended when missing.
///
/// Absolute paths and `..` segments are rejected.
pub fn normalize_asset_path(source: &str) -> GifViewResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(GifViewError::invalid_source("asset paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(GifViewError::invalid_source(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(GifViewError::invalid_source(
            "asset path must contain a file name",
        ));
    }

    let mut path = out.join("/");
    if !path.ends_with(GIF_EXTENSION) {
        path.push_str(GIF_EXTENSION);
    }
    Ok(path)
}

struct RegisteredPrefix {
    prefix: String,
    open: OpenFn,
}

/// Maps descriptor strings to [`SourceDescriptor`]s.
///
/// The built-in `url:` and `asset:` prefixes are always checked first, then registered
/// prefixes in registration order.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    entries: Vec<Arc<RegisteredPrefix>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.prefix.as_str()))
            .finish()
    }
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new descriptor prefix served by `open`.
    pub fn register<F>(&mut self, prefix: impl Into<String>, open: F) -> GifViewResult<()>
    where
        F: Fn(&str) -> GifViewResult<ByteStream> + Send + Sync + 'static,
    {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(GifViewError::configuration(
                "source prefix must be non-empty",
            ));
        }
        if prefix.starts_with(URL_PREFIX) || prefix.starts_with(ASSET_PREFIX) {
            return Err(GifViewError::configuration(format!(
                "source prefix '{prefix}' is shadowed by a built-in prefix"
            )));
        }
        self.entries.push(Arc::new(RegisteredPrefix {
            prefix,
            open: Arc::new(open),
        }));
        Ok(())
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        [URL_PREFIX, ASSET_PREFIX]
            .into_iter()
            .chain(self.entries.iter().map(|e| e.prefix.as_str()))
    }

    pub fn parse(&self, s: &str) -> GifViewResult<SourceDescriptor> {
        if let Some(url) = s.strip_prefix(URL_PREFIX) {
            return SourceDescriptor::url(url);
        }
        if let Some(path) = s.strip_prefix(ASSET_PREFIX) {
            return SourceDescriptor::asset(path);
        }
        for entry in &self.entries {
            if let Some(body) = s.strip_prefix(entry.prefix.as_str()) {
                return Ok(SourceDescriptor::Registered {
                    prefix: entry.prefix.clone(),
                    body: body.to_string(),
                    open: entry.open.clone(),
                });
            }
        }
        Err(GifViewError::invalid_source(format!(
            "string format is invalid: {s}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/descriptor.rs"]
mod tests;
