use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gifview::{
    AsyncLoader, ByteStream, ContentCache, DirAssets, Frame, GifView, GifViewError, LoadContext,
    LoadError, LoadListener, SourceRegistry, Surface, ThreadRunner, UiQueue, content_key,
    load_blocking,
};

#[derive(Parser, Debug)]
#[command(name = "gifview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a GIF and print its size and duration.
    Info(InfoArgs),
    /// Play a GIF for a while and write every delivered frame as a PNG.
    Play(PlayArgs),
    /// Print the cache file name used for a URL.
    CacheKey {
        /// Resource URL.
        url: String,
    },
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Source descriptor: `url:<url>`, `asset:<path>` or `file:<path>`.
    #[arg(long)]
    src: String,

    /// Root directory for `asset:` sources.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Download cache directory for `url:` sources.
    #[arg(long)]
    cache: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Playback time in milliseconds.
    #[arg(long, default_value_t = 1000)]
    for_ms: u64,

    /// Output directory for `frame_NNNN.png` files.
    #[arg(long)]
    out: PathBuf,

    /// Delay between ticks in milliseconds.
    #[arg(long, default_value_t = 33)]
    delay: i64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Play(args) => cmd_play(args),
        Command::CacheKey { url } => {
            println!("{}", content_key(&url));
            Ok(())
        }
    }
}

fn load_context(args: &SourceArgs) -> anyhow::Result<LoadContext> {
    let mut ctx = LoadContext::default();
    if let Some(root) = &args.assets {
        ctx.assets = Some(Arc::new(DirAssets::new(root)));
    }
    if let Some(dir) = &args.cache {
        ctx.cache = Some(Arc::new(http_cache(dir)?));
    }
    Ok(ctx)
}

#[cfg(feature = "http")]
fn http_cache(dir: &Path) -> anyhow::Result<ContentCache> {
    Ok(ContentCache::http(dir)?)
}

#[cfg(not(feature = "http"))]
fn http_cache(_dir: &Path) -> anyhow::Result<ContentCache> {
    anyhow::bail!("--cache requires the `http` feature")
}

fn registry() -> anyhow::Result<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    registry.register("file:", |path: &str| -> gifview::GifViewResult<ByteStream> {
        let f =
            File::open(path).map_err(|e| GifViewError::from_io(&format!("open '{path}'"), &e))?;
        Ok(Box::new(BufReader::new(f)))
    })?;
    Ok(registry)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.source)?;
    let source = registry()?.parse(&args.source.src)?;
    let anim = load_blocking(source, &ctx)?;

    println!("size:     {}x{}", anim.width(), anim.height());
    println!("duration: {} ms", anim.duration_ms());
    Ok(())
}

/// Copies every delivered frame; runs on the CLI's own dispatch queue.
#[derive(Default)]
struct CollectSurface {
    frames: Mutex<Vec<Frame>>,
}

impl Surface for CollectSurface {
    fn show(&self, frame: &Frame) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame.clone());
        }
    }

    fn clear(&self) {}
}

#[derive(Clone, Default)]
struct FailureSlot(Rc<RefCell<Option<String>>>);

impl LoadListener for FailureSlot {
    fn on_success(&self, _view: &GifView) {}

    fn on_failure(&self, _view: &GifView, err: &LoadError) {
        *self.0.borrow_mut() = Some(err.to_string());
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let ctx = load_context(&args.source)?;
    let queue = UiQueue::new();
    let surface = Arc::new(CollectSurface::default());
    let failure = FailureSlot::default();

    let mut view =
        GifView::new(AsyncLoader::new(Arc::new(ThreadRunner), ctx)).with_registry(registry()?);
    view.set_dispatcher(queue.dispatcher());
    view.set_surface(surface.clone());
    view.set_load_listener(Some(Box::new(failure.clone())));
    view.set_delay(args.delay)?;
    view.set_source_str(&args.source.src)?;

    if !view.wait_for_load(Duration::from_secs(60)) {
        anyhow::bail!("timed out loading '{}'", args.source.src);
    }
    if let Some(err) = failure.0.borrow_mut().take() {
        anyhow::bail!(err);
    }

    queue.run_for(Duration::from_millis(args.for_ms));
    view.stop()?;
    queue.run_pending();

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let frames = surface
        .frames
        .lock()
        .map_err(|_| anyhow::anyhow!("frame collector poisoned"))?;
    for (i, frame) in frames.iter().enumerate() {
        let path = args.out.join(format!("frame_{i:04}.png"));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
    }

    eprintln!("wrote {} frames to {}", frames.len(), args.out.display());
    Ok(())
}
