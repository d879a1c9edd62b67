use std::{io::Cursor, time::Duration};

use image::{Delay, Rgba, RgbaImage, codecs::gif::GifEncoder};

use super::*;
use crate::{load::runner::TaskStatus, source::assets::MemoryAssets};

fn tiny_gif() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut enc = GifEncoder::new(&mut buf);
        let frames = [[255u8, 0, 0, 255], [0, 255, 0, 255]].into_iter().map(|c| {
            image::Frame::from_parts(
                RgbaImage::from_pixel(3, 2, Rgba(c)),
                0,
                0,
                Delay::from_numer_denom_ms(50, 1),
            )
        });
        enc.encode_frames(frames).unwrap();
    }
    buf
}

fn ctx_with_assets() -> LoadContext {
    let mut assets = MemoryAssets::new();
    assets.insert("anim/spin.gif", tiny_gif());
    LoadContext {
        assets: Some(Arc::new(assets)),
        ..LoadContext::default()
    }
}

struct StaticFetch(Vec<u8>);

impl Fetch for StaticFetch {
    fn open(&self, _url: &str) -> GifViewResult<ByteStream> {
        Ok(Box::new(Cursor::new(self.0.clone())))
    }
}

#[test]
fn loads_asset_source() {
    let ctx = ctx_with_assets();
    let anim = load_blocking(SourceDescriptor::parse("asset:anim\\spin").unwrap(), &ctx).unwrap();
    assert_eq!(anim.width(), 3);
    assert_eq!(anim.height(), 2);
    assert_eq!(anim.duration_ms(), 100);
    assert!(!anim.is_showing());
}

#[test]
fn missing_asset_is_not_found() {
    let ctx = ctx_with_assets();
    let err = load_blocking(SourceDescriptor::asset("anim/missing").unwrap(), &ctx).unwrap_err();
    let GifViewError::ResourceNotFound(msg) = &err.error else {
        panic!("expected ResourceNotFound, got {err}");
    };
    assert!(msg.starts_with("file not found:"), "{msg}");
    assert!(msg.contains("anim/missing.gif"), "{msg}");
}

#[test]
fn asset_without_asset_source_is_configuration_error() {
    let err = load_blocking(
        SourceDescriptor::asset("a").unwrap(),
        &LoadContext::default(),
    )
    .unwrap_err();
    assert!(matches!(err.error, GifViewError::Configuration(_)));
}

#[test]
fn garbage_stream_is_decode_failure() {
    let err = load_blocking(
        SourceDescriptor::bytes(Cursor::new(b"not a gif".to_vec())),
        &LoadContext::default(),
    )
    .unwrap_err();
    assert!(matches!(err.error, GifViewError::DecodeFailure(_)));
}

#[test]
fn url_goes_through_cache() {
    let tmp = std::env::temp_dir().join(format!(
        "gifview_loader_cache_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let cache = Arc::new(ContentCache::new(&tmp, Arc::new(StaticFetch(tiny_gif()))));
    let ctx = LoadContext {
        cache: Some(cache.clone()),
        ..LoadContext::default()
    };

    let url = "https://example.com/spin.gif";
    load_blocking(SourceDescriptor::url(url).unwrap(), &ctx).unwrap();
    load_blocking(SourceDescriptor::url(url).unwrap(), &ctx).unwrap();
    assert_eq!(cache.download_count(), 1);
    assert!(cache.contains(url));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn uncached_url_uses_fetcher() {
    let ctx = LoadContext {
        fetcher: Some(Arc::new(StaticFetch(tiny_gif()))),
        ..LoadContext::default()
    };
    let anim = load_blocking(SourceDescriptor::url("https://x/y.gif").unwrap(), &ctx).unwrap();
    assert_eq!(anim.width(), 3);
}

#[test]
fn submit_runs_off_thread_and_reports_panics() {
    let loader = AsyncLoader::new(Arc::new(ThreadRunner), ctx_with_assets());

    let ok = loader
        .submit(SourceDescriptor::asset("anim/spin").unwrap())
        .unwrap();
    assert!(matches!(
        ok.wait(Duration::from_secs(10)),
        TaskStatus::Ready(Ok(_))
    ));

    let open: crate::source::descriptor::OpenFn =
        Arc::new(|_: &str| -> GifViewResult<ByteStream> { panic!("opener exploded") });
    let boom = loader
        .submit(SourceDescriptor::Registered {
            prefix: "boom:".to_string(),
            body: String::new(),
            open,
        })
        .unwrap();
    let TaskStatus::Ready(Err(err)) = boom.wait(Duration::from_secs(10)) else {
        panic!("expected a classified failure");
    };
    assert!(err.to_string().contains("panicked"));
}

/// Yields a few bytes, then fails with the given error kind.
struct FailingRead(std::io::ErrorKind, bool);

impl std::io::Read for FailingRead {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.1 {
            self.1 = true;
            buf[..3].copy_from_slice(b"GIF");
            return Ok(3);
        }
        Err(std::io::Error::new(self.0, "gone mid-stream"))
    }
}

#[test]
fn mid_stream_read_errors_are_classified() {
    let missing = load_blocking(
        SourceDescriptor::bytes(FailingRead(std::io::ErrorKind::NotFound, false)),
        &LoadContext::default(),
    )
    .unwrap_err();
    let GifViewError::ResourceNotFound(msg) = &missing.error else {
        panic!("expected ResourceNotFound, got {missing}");
    };
    assert!(msg.starts_with("file not found:"), "{msg}");

    let broken = load_blocking(
        SourceDescriptor::bytes(FailingRead(std::io::ErrorKind::ConnectionReset, false)),
        &LoadContext::default(),
    )
    .unwrap_err();
    assert!(matches!(broken.error, GifViewError::Io(_)), "{broken}");
}
