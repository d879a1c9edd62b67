use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Cursor},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::cache::content::ByteStream;

/// Host-provided store of packaged assets, addressed by normalized `/`-separated paths.
pub trait AssetSource: Send + Sync {
    fn open(&self, path: &str) -> std::io::Result<ByteStream>;
}

/// Assets read from a directory on disk.
#[derive(Clone, Debug)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssets {
    fn open(&self, path: &str) -> std::io::Result<ByteStream> {
        let file = File::open(self.root.join(Path::new(path)))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// In-memory assets, e.g. bytes embedded with `include_bytes!`.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    entries: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(path.into(), bytes.into());
    }
}

impl AssetSource for MemoryAssets {
    fn open(&self, path: &str) -> std::io::Result<ByteStream> {
        let bytes = self.entries.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no asset '{path}'"))
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
