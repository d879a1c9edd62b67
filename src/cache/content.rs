use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use sha2::Digest as _;

use crate::foundation::error::{GifViewError, GifViewResult, LoadError};

/// Chunk size used when streaming a download to disk.
pub const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Owned byte stream handed from a source to the decoder.
pub type ByteStream = Box<dyn Read + Send>;

/// Opens a byte stream for a remote resource identifier.
pub trait Fetch: Send + Sync {
    /// Open `url` for reading.
    ///
    /// A missing remote resource must be reported as [`GifViewError::ResourceNotFound`].
    fn open(&self, url: &str) -> GifViewResult<ByteStream>;
}

/// [`Fetch`] implementation over blocking HTTP(S).
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new() -> GifViewResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| GifViewError::Io(format!("build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
    fn open(&self, url: &str) -> GifViewResult<ByteStream> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| GifViewError::Io(format!("GET '{url}': {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(GifViewError::not_found(format!("'{url}' returned {status}")));
        }
        if !status.is_success() {
            return Err(GifViewError::Io(format!("'{url}' returned {status}")));
        }
        Ok(Box::new(resp))
    }
}

/// Deterministic content address for a resource identifier: lowercase hex SHA-256 of its
/// UTF-8 bytes.
pub fn content_key(url: &str) -> String {
    let digest = sha2::Sha256::digest(url.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Flat on-disk cache of downloaded resources keyed by [`content_key`].
///
/// Entries are created on first access and reused afterwards; nothing is ever evicted.
/// Downloads land in a temporary file next to the entry and are renamed into place only
/// once complete, so a failed download is never observed as a cache hit.
pub struct ContentCache {
    dir: PathBuf,
    fetcher: Arc<dyn Fetch>,
    downloads: AtomicU64,
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("dir", &self.dir)
            .field("downloads", &self.download_count())
            .finish()
    }
}

impl ContentCache {
    pub fn new(dir: impl Into<PathBuf>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            dir: dir.into(),
            fetcher,
            downloads: AtomicU64::new(0),
        }
    }

    /// Cache backed by [`HttpFetcher`].
    #[cfg(feature = "http")]
    pub fn http(dir: impl Into<PathBuf>) -> GifViewResult<Self> {
        Ok(Self::new(dir, Arc::new(HttpFetcher::new()?)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(content_key(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.path_for(url).is_file()
    }

    /// Number of completed downloads performed by this cache instance.
    pub fn download_count(&self) -> u64 {
        self.downloads.load(Ordering::Relaxed)
    }

    /// Return a fresh read handle on the cached copy of `url`, downloading it first on a miss.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, url: &str) -> Result<ByteStream, LoadError> {
        let path = self.path_for(url);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "content cache hit");
        } else {
            self.download(url, &path)?;
        }

        let file = File::open(&path).map_err(|e| {
            GifViewError::from_io(&format!("open cached '{}'", path.display()), &e)
        })?;
        Ok(Box::new(BufReader::with_capacity(DOWNLOAD_CHUNK_BYTES, file)))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), LoadError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            GifViewError::from_io(&format!("create cache dir '{}'", self.dir.display()), &e)
        })?;

        let tmp = self.temp_path(dest);
        let res = self.download_to(url, &tmp).and_then(|bytes| {
            std::fs::rename(&tmp, dest)
                .map(|_| bytes)
                .map_err(|e| GifViewError::Io(format!("move download into cache: {e}")))
        });

        match res {
            Ok(bytes) => {
                self.downloads.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(bytes, path = %dest.display(), "content cache filled");
                Ok(())
            }
            Err(primary) => {
                tracing::warn!(error = %primary, "content cache download failed");
                let mut err = LoadError::new(primary);
                if let Err(e) = std::fs::remove_file(&tmp)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    err.suppress(GifViewError::from_io(
                        &format!("remove partial download '{}'", tmp.display()),
                        &e,
                    ));
                }
                Err(err)
            }
        }
    }

    fn download_to(&self, url: &str, tmp: &Path) -> GifViewResult<u64> {
        let mut src = self.fetcher.open(url)?;
        let file = File::create(tmp)
            .map_err(|e| GifViewError::Io(format!("create '{}': {e}", tmp.display())))?;
        let mut out = BufWriter::with_capacity(DOWNLOAD_CHUNK_BYTES, file);

        let mut buf = vec![0u8; DOWNLOAD_CHUNK_BYTES];
        let mut total = 0u64;
        loop {
            let n = match src.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(GifViewError::Io(format!("read '{url}': {e}"))),
            };
            out.write_all(&buf[..n])
                .map_err(|e| GifViewError::Io(format!("write '{}': {e}", tmp.display())))?;
            total += n as u64;
        }
        out.flush()
            .map_err(|e| GifViewError::Io(format!("flush '{}': {e}", tmp.display())))?;
        Ok(total)
    }

    fn temp_path(&self, dest: &Path) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let name = dest
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir
            .join(format!("{name}.part-{}-{n}", std::process::id()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/content.rs"]
mod tests;
