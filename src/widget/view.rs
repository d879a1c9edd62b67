use std::{sync::Arc, time::Duration};

use crate::{
    foundation::{
        core::{Frame, FrameDelay},
        error::{GifViewError, GifViewResult, LoadError},
    },
    load::{
        loader::{AsyncLoader, LoadResult},
        runner::{Completion, TaskStatus},
    },
    player::{animator::FrameAnimator, dispatch::Dispatcher},
    source::descriptor::{SourceDescriptor, SourceRegistry},
    widget::config::WidgetConfig,
};

/// Host-side target that displays frames.
///
/// `show` runs on the view's dispatcher when one is set, otherwise on the tick worker.
pub trait Surface: Send + Sync {
    fn show(&self, frame: &Frame);
    fn clear(&self);
}

/// Completion callbacks for [`GifView::set_source`], invoked on the owning thread at most
/// once per accepted load.
pub trait LoadListener {
    fn on_success(&self, view: &GifView);
    fn on_failure(&self, view: &GifView, err: &LoadError);
}

/// Start/stop request recorded while a load is in flight, applied once when it finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Intent {
    #[default]
    Unset,
    Start,
    Stop,
}

struct LoadSession {
    label: String,
    completion: Completion<LoadResult>,
    start_on_finish: Intent,
    clear_pending: bool,
}

/// Animated GIF view: owns at most one [`FrameAnimator`] and at most one in-flight load.
///
/// A `set_source` call made while a load is in flight is ignored; it is not queued and does
/// not cancel the running load. Finished loads are attached by [`GifView::poll`] (or
/// [`GifView::wait_for_load`]) on the thread that owns the view.
pub struct GifView {
    loader: AsyncLoader,
    registry: SourceRegistry,
    surface: Option<Arc<dyn Surface>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    listener: Option<Box<dyn LoadListener>>,
    animator: Option<FrameAnimator>,
    session: Option<LoadSession>,
    delay: FrameDelay,
    starting_on_init: bool,
    toggle_on_click: bool,
}

impl Default for GifView {
    fn default() -> Self {
        Self::new(AsyncLoader::default())
    }
}

impl std::fmt::Debug for GifView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifView")
            .field("animator", &self.animator)
            .field("loading", &self.session.as_ref().map(|s| s.label.as_str()))
            .field("delay", &self.delay)
            .field("starting_on_init", &self.starting_on_init)
            .field("toggle_on_click", &self.toggle_on_click)
            .finish()
    }
}

impl GifView {
    pub fn new(loader: AsyncLoader) -> Self {
        Self {
            loader,
            registry: SourceRegistry::new(),
            surface: None,
            dispatcher: None,
            listener: None,
            animator: None,
            session: None,
            delay: FrameDelay::default(),
            starting_on_init: true,
            toggle_on_click: false,
        }
    }

    /// Build a view from declarative configuration and start loading `config.src`, if any.
    pub fn from_config(config: &WidgetConfig, loader: AsyncLoader) -> GifViewResult<Self> {
        let mut view = Self::new(loader);
        view.apply_config(config)?;
        Ok(view)
    }

    pub fn apply_config(&mut self, config: &WidgetConfig) -> GifViewResult<()> {
        config.validate()?;
        self.set_starting_on_init(config.starting_on_init);
        self.set_delay(config.delay_in_millis)?;
        self.set_toggle_on_click(config.on_click_start_or_pause);
        if let Some(src) = &config.src {
            self.set_source_str(src)?;
        }
        Ok(())
    }

    pub fn with_registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry_mut(&mut self) -> &mut SourceRegistry {
        &mut self.registry
    }

    /// Route frames to `surface`. Rewires an attached animation immediately.
    pub fn set_surface(&mut self, surface: Arc<dyn Surface>) {
        self.surface = Some(surface);
        self.wire_surface();
    }

    /// Thread frames are delivered on. Without one, `Surface::show` runs on the tick worker.
    pub fn set_dispatcher(&mut self, dispatcher: Arc<dyn Dispatcher>) {
        self.dispatcher = Some(dispatcher);
        self.wire_surface();
    }

    pub fn set_load_listener(&mut self, listener: Option<Box<dyn LoadListener>>) {
        self.listener = listener;
    }

    pub fn is_starting_on_init(&self) -> bool {
        self.starting_on_init
    }

    pub fn set_starting_on_init(&mut self, starting_on_init: bool) {
        self.starting_on_init = starting_on_init;
    }

    pub fn delay(&self) -> FrameDelay {
        self.delay
    }

    /// Set the tick delay; fails without side effects when `ms <= 0`.
    pub fn set_delay(&mut self, ms: i64) -> GifViewResult<()> {
        self.delay = FrameDelay::from_millis(ms)?;
        if let Some(animator) = &self.animator {
            animator.set_frame_delay(self.delay);
        }
        Ok(())
    }

    pub fn is_toggle_on_click(&self) -> bool {
        self.toggle_on_click
    }

    pub fn set_toggle_on_click(&mut self, flag: bool) {
        self.toggle_on_click = flag;
    }

    /// Handle a click: toggles playback when click-to-toggle is enabled.
    pub fn click(&mut self) -> bool {
        if !self.toggle_on_click {
            return false;
        }
        if self.is_showing() {
            self.stop_when_possible();
        } else {
            self.start_when_possible();
        }
        true
    }

    /// Parse a descriptor string and start loading it.
    ///
    /// Returns `Ok(false)` without parsing when a load is already in flight.
    pub fn set_source_str(&mut self, s: &str) -> GifViewResult<bool> {
        if self.is_loading() {
            tracing::debug!(source = s, "load already in flight, ignoring request");
            return Ok(false);
        }
        let source = self.registry.parse(s)?;
        self.set_source(source)
    }

    /// Start loading `source` in the background.
    ///
    /// Returns `Ok(false)` and drops `source` when a load is already in flight.
    pub fn set_source(&mut self, source: SourceDescriptor) -> GifViewResult<bool> {
        let label = source.label();
        if self.is_loading() {
            tracing::debug!(source = %label, "load already in flight, ignoring request");
            return Ok(false);
        }

        let completion = self.loader.submit(source)?;
        tracing::debug!(source = %label, "load started");
        self.session = Some(LoadSession {
            label,
            completion,
            start_on_finish: Intent::Unset,
            clear_pending: false,
        });
        Ok(true)
    }

    /// Attach a finished load, if any. Returns `true` when a load completed.
    pub fn poll(&mut self) -> bool {
        self.complete_with(|c| c.try_take())
    }

    /// Block up to `timeout` for the in-flight load, then attach it like [`GifView::poll`].
    pub fn wait_for_load(&mut self, timeout: Duration) -> bool {
        self.complete_with(|c| c.wait(timeout))
    }

    fn complete_with(
        &mut self,
        take: impl FnOnce(&Completion<LoadResult>) -> TaskStatus<LoadResult>,
    ) -> bool {
        let status = match &self.session {
            Some(session) => take(&session.completion),
            None => return false,
        };
        let outcome = match status {
            TaskStatus::Pending => return false,
            TaskStatus::Ready(outcome) => outcome,
            TaskStatus::Abandoned => Err(LoadError::new(GifViewError::Other(anyhow::anyhow!(
                "load task ended without a result"
            )))),
        };
        let Some(session) = self.session.take() else {
            return false;
        };
        self.finish_load(session, outcome);
        true
    }

    fn finish_load(&mut self, session: LoadSession, outcome: LoadResult) {
        self.detach();

        match outcome {
            Ok(animator) => {
                tracing::info!(source = %session.label, "gif attached");
                animator.set_frame_delay(self.delay);
                self.animator = Some(animator);
                self.wire_surface();
                if self.starting_on_init {
                    self.start_attached();
                }
                match session.start_on_finish {
                    Intent::Start if !self.starting_on_init => self.start_attached(),
                    Intent::Stop if self.starting_on_init => self.stop_attached(),
                    _ => {}
                }
                if let Some(listener) = &self.listener {
                    listener.on_success(self);
                }
            }
            Err(err) => {
                tracing::warn!(source = %session.label, error = %err, "gif load failed");
                if let Some(surface) = &self.surface {
                    surface.clear();
                }
                if let Some(listener) = &self.listener {
                    listener.on_failure(self, &err);
                }
            }
        }

        if session.clear_pending {
            self.clear_view();
        }
    }

    fn wire_surface(&self) {
        let (Some(animator), Some(surface)) = (&self.animator, &self.surface) else {
            return;
        };
        let target = surface.clone();
        animator.set_frame_listener(move |frame: &Frame| target.show(frame), self.dispatcher.clone());
        if !animator.is_showing() {
            surface.show(animator.thumbnail());
        }
    }

    fn start_attached(&mut self) {
        if let Some(animator) = &mut self.animator
            && let Err(e) = animator.start()
        {
            tracing::warn!(error = %e, "failed to start gif");
        }
    }

    fn stop_attached(&mut self) {
        if let Some(animator) = &mut self.animator {
            animator.stop();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_showing(&self) -> bool {
        self.animator.as_ref().is_some_and(FrameAnimator::is_showing)
    }

    /// An animation is attached and no load is in flight.
    pub fn is_ready(&self) -> bool {
        self.animator.is_some() && !self.is_loading()
    }

    pub fn animator(&self) -> Option<&FrameAnimator> {
        self.animator.as_ref()
    }

    fn ready(&self) -> GifViewResult<&FrameAnimator> {
        if self.is_loading() {
            return Err(GifViewError::invalid_state("the gif is still loading"));
        }
        self.animator
            .as_ref()
            .ok_or_else(|| GifViewError::invalid_state("the gif has not been initialized yet"))
    }

    fn ready_mut(&mut self) -> GifViewResult<&mut FrameAnimator> {
        if self.is_loading() {
            return Err(GifViewError::invalid_state("the gif is still loading"));
        }
        self.animator
            .as_mut()
            .ok_or_else(|| GifViewError::invalid_state("the gif has not been initialized yet"))
    }

    pub fn start(&mut self) -> GifViewResult<()> {
        self.ready_mut()?.start()
    }

    pub fn stop(&mut self) -> GifViewResult<()> {
        self.ready_mut()?.stop();
        Ok(())
    }

    pub fn restart(&mut self) -> GifViewResult<()> {
        self.ready_mut()?.restart()
    }

    pub fn set_time(&mut self, seconds: f64) -> GifViewResult<()> {
        self.ready_mut()?.set_time(seconds)
    }

    pub fn duration_secs(&self) -> GifViewResult<f64> {
        Ok(self.ready()?.duration_secs())
    }

    pub fn current_secs(&self) -> GifViewResult<f64> {
        Ok(self.ready()?.current_secs())
    }

    pub fn current_position(&self) -> GifViewResult<f64> {
        Ok(self.ready()?.current_position())
    }

    pub fn thumbnail(&self) -> GifViewResult<&Frame> {
        Ok(self.ready()?.thumbnail())
    }

    /// Start now if possible, otherwise once the in-flight load finishes.
    pub fn start_when_possible(&mut self) {
        if let Some(session) = &mut self.session {
            session.start_on_finish = Intent::Start;
        } else {
            self.start_attached();
        }
    }

    /// Stop now if possible, otherwise once the in-flight load finishes.
    pub fn stop_when_possible(&mut self) {
        if let Some(session) = &mut self.session {
            session.start_on_finish = Intent::Stop;
        } else {
            self.stop_attached();
        }
    }

    /// Detach the animation and reset configuration to defaults.
    ///
    /// While a load is in flight this is deferred until it finishes, whatever its outcome.
    pub fn clear(&mut self) {
        if let Some(session) = &mut self.session {
            session.clear_pending = true;
        } else {
            self.clear_view();
        }
    }

    /// Stop and drop the attached animation, discarding frames it already queued.
    fn detach(&mut self) {
        if let Some(mut animator) = self.animator.take() {
            animator.clear_frame_listener();
            animator.stop();
        }
    }

    fn clear_view(&mut self) {
        self.detach();
        if let Some(surface) = &self.surface {
            surface.clear();
        }
        self.starting_on_init = true;
        self.delay = FrameDelay::default();
        self.toggle_on_click = false;
        self.listener = None;
        tracing::debug!("gif view cleared");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widget/view.rs"]
mod tests;
