use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU32, AtomicU64, Ordering},
        mpsc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::{
    decode::movie::Movie,
    foundation::{
        core::{Frame, FrameDelay, PlaybackState},
        error::{GifViewError, GifViewResult},
    },
    player::dispatch::Dispatcher,
};

/// Callback receiving the shared frame buffer after each tick.
///
/// The buffer is overwritten by the next tick; copy it to keep it.
pub type FrameListener = Arc<dyn Fn(&Frame) + Send + Sync>;

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Playback position bookkeeping.
///
/// Elapsed time is `offset` plus the time since `running_since`, so stopping folds the
/// running span into `offset` and resuming continues from it.
#[derive(Clone, Copy, Debug, Default)]
struct Clock {
    offset: Duration,
    running_since: Option<Instant>,
}

impl Clock {
    fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.offset + now.saturating_duration_since(since),
            None => self.offset,
        }
    }

    fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    fn pause(&mut self, now: Instant) {
        self.offset = self.elapsed(now);
        self.running_since = None;
    }

    fn seek(&mut self, now: Instant, pos: Duration) {
        self.offset = pos;
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }
}

#[derive(Clone)]
struct Listener {
    on_frame: FrameListener,
    dispatcher: Option<Arc<dyn Dispatcher>>,
}

struct Shared {
    movie: Mutex<Box<dyn Movie>>,
    frame: Arc<Mutex<Frame>>,
    clock: Mutex<Clock>,
    delay_ms: AtomicU32,
    listener: Mutex<Option<Listener>>,
    /// Bumped whenever queued deliveries must be discarded (stop, listener change).
    generation: Arc<AtomicU64>,
    ticks: AtomicU64,
    duration_ms: u64,
}

impl Shared {
    fn position_ms(&self, now: Instant) -> u64 {
        if self.duration_ms == 0 {
            return 0;
        }
        let elapsed = lock(&self.clock).elapsed(now).as_millis();
        (elapsed % u128::from(self.duration_ms)) as u64
    }

    fn render_at(&self, time_ms: u64) -> GifViewResult<()> {
        let mut movie = lock(&self.movie);
        let mut frame = lock(&self.frame);
        movie.draw(time_ms, &mut frame)
    }

    fn tick(&self) {
        let t = self.position_ms(Instant::now());
        if let Err(e) = self.render_at(t) {
            tracing::warn!(error = %e, time_ms = t, "failed to draw gif frame");
            return;
        }
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.deliver();
    }

    fn invalidate_queued(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn deliver(&self) {
        let (listener, posted) = {
            let slot = lock(&self.listener);
            (slot.clone(), self.generation.load(Ordering::Acquire))
        };
        let Some(listener) = listener else {
            return;
        };
        match listener.dispatcher {
            Some(dispatcher) => {
                let frame = self.frame.clone();
                let on_frame = listener.on_frame;
                let current = self.generation.clone();
                dispatcher.dispatch(Box::new(move || {
                    if current.load(Ordering::Acquire) != posted {
                        return;
                    }
                    let frame = lock(&frame);
                    on_frame(&frame);
                }));
            }
            None => {
                let frame = lock(&self.frame);
                (listener.on_frame)(&frame);
            }
        }
    }
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Plays a decoded [`Movie`] by redrawing one reusable [`Frame`] on a dedicated tick thread.
///
/// `start` spawns the tick worker, which draws immediately and then waits the configured
/// delay between ticks. `stop` joins it before returning, so no tick runs after `stop`
/// returns. `stop` must not be called from a frame listener running on the worker.
pub struct FrameAnimator {
    shared: Arc<Shared>,
    worker: Option<Worker>,
    thumbnail: Frame,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for FrameAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAnimator")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("duration_ms", &self.shared.duration_ms)
            .field("state", &self.state())
            .finish()
    }
}

impl FrameAnimator {
    /// Take ownership of `movie` and render its first frame.
    pub fn new(mut movie: Box<dyn Movie>) -> GifViewResult<Self> {
        let (width, height) = (movie.width(), movie.height());
        let mut frame = Frame::new(width, height);
        movie.draw(0, &mut frame)?;
        let thumbnail = frame.clone();
        let duration_ms = movie.duration_ms();

        Ok(Self {
            shared: Arc::new(Shared {
                movie: Mutex::new(movie),
                frame: Arc::new(Mutex::new(frame)),
                clock: Mutex::new(Clock::default()),
                delay_ms: AtomicU32::new(FrameDelay::default().as_millis()),
                listener: Mutex::new(None),
                generation: Arc::new(AtomicU64::new(0)),
                ticks: AtomicU64::new(0),
                duration_ms,
            }),
            worker: None,
            thumbnail,
            width,
            height,
        })
    }

    /// Register `on_frame`, called after every tick.
    ///
    /// With a `dispatcher` the call is posted to it, in tick order. Without one it runs on
    /// the tick worker, which must then not touch UI state. Posts still queued for a
    /// previous listener are dropped.
    pub fn set_frame_listener<F>(&self, on_frame: F, dispatcher: Option<Arc<dyn Dispatcher>>)
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        let mut slot = lock(&self.shared.listener);
        self.shared.invalidate_queued();
        *slot = Some(Listener {
            on_frame: Arc::new(on_frame),
            dispatcher,
        });
    }

    /// Remove the listener and drop any of its posts still waiting on a dispatcher.
    pub fn clear_frame_listener(&self) {
        let mut slot = lock(&self.shared.listener);
        self.shared.invalidate_queued();
        *slot = None;
    }

    /// Set the delay between ticks. Applies from the next scheduling cycle.
    pub fn set_delay(&self, ms: i64) -> GifViewResult<()> {
        self.set_frame_delay(FrameDelay::from_millis(ms)?);
        Ok(())
    }

    pub fn set_frame_delay(&self, delay: FrameDelay) {
        self.shared
            .delay_ms
            .store(delay.as_millis(), Ordering::Relaxed);
    }

    pub fn delay(&self) -> FrameDelay {
        FrameDelay::from_millis(i64::from(self.shared.delay_ms.load(Ordering::Relaxed)))
            .unwrap_or_default()
    }

    /// Start ticking. Does nothing when already running.
    pub fn start(&mut self) -> GifViewResult<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        lock(&self.shared.clock).resume(Instant::now());

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = self.shared.clone();
        let handle = std::thread::Builder::new()
            .name("gifview-tick".to_string())
            .spawn(move || {
                loop {
                    shared.tick();
                    let delay =
                        Duration::from_millis(u64::from(shared.delay_ms.load(Ordering::Relaxed)));
                    match stop_rx.recv_timeout(delay) {
                        Err(mpsc::RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| {
                lock(&self.shared.clock).pause(Instant::now());
                GifViewError::Io(format!("failed to spawn tick worker: {e}"))
            })?;

        tracing::debug!(delay_ms = self.delay().as_millis(), "gif started");
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    /// Stop ticking and wait for the worker to exit. Does nothing when already stopped.
    ///
    /// Frames the worker posted to a dispatcher but that have not run yet are discarded.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        lock(&self.shared.clock).pause(Instant::now());
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            tracing::warn!("gif tick worker panicked");
        }
        self.shared.invalidate_queued();
        tracing::debug!("gif stopped");
    }

    /// Rewind to position 0 and start if not running.
    pub fn restart(&mut self) -> GifViewResult<()> {
        lock(&self.shared.clock).seek(Instant::now(), Duration::ZERO);
        self.start()
    }

    /// Move playback to `seconds` into the animation.
    ///
    /// `seconds` must lie in `0..=duration`. While stopped, the frame at the new position
    /// is drawn and delivered right away.
    pub fn set_time(&mut self, seconds: f64) -> GifViewResult<()> {
        let duration = self.duration_secs();
        if !seconds.is_finite() || seconds < 0.0 || seconds > duration {
            return Err(GifViewError::invalid_argument(format!(
                "seconds must be in the range of the gif: 0-{duration}: {seconds}"
            )));
        }

        lock(&self.shared.clock).seek(Instant::now(), Duration::from_secs_f64(seconds));
        if self.worker.is_none() {
            let t = self.shared.position_ms(Instant::now());
            self.shared.render_at(t)?;
            self.shared.deliver();
        }
        Ok(())
    }

    pub fn state(&self) -> PlaybackState {
        if self.worker.is_some() {
            PlaybackState::Running
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_showing(&self) -> bool {
        self.worker.is_some()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn duration_ms(&self) -> u64 {
        self.shared.duration_ms
    }

    pub fn duration_secs(&self) -> f64 {
        self.shared.duration_ms as f64 / 1000.0
    }

    /// Position inside the current loop, in seconds.
    pub fn current_secs(&self) -> f64 {
        self.shared.position_ms(Instant::now()) as f64 / 1000.0
    }

    /// Position inside the current loop as a fraction of the duration, in `0.0..1.0`.
    pub fn current_position(&self) -> f64 {
        if self.shared.duration_ms == 0 {
            return 0.0;
        }
        self.shared.position_ms(Instant::now()) as f64 / self.shared.duration_ms as f64
    }

    /// Copy of the first frame.
    pub fn thumbnail(&self) -> &Frame {
        &self.thumbnail
    }

    /// The shared buffer the worker draws into.
    pub fn frame(&self) -> Arc<Mutex<Frame>> {
        self.shared.frame.clone()
    }

    /// Number of ticks drawn since creation.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for FrameAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/animator.rs"]
mod tests;
