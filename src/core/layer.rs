use super::constants::TRANSITION_DELAY;
use super::error::{LayerError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Visual side of a layer: shows frames and plays the click cues.
pub trait Presenter {
    fn set_displayed_frame(&self, url: &str);
    fn play_feedback(&self, entering_on: bool);
}

/// Cancellation token for a deferred task.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Fire-once deferred callbacks.
pub trait Scheduler {
    /// Run `task` once after `delay`. Implementations must skip the task if the
    /// returned handle was cancelled before it came due.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle;
}

/// One image of a layer's sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub url: String,
    /// Shown only briefly before the sequence moves on by itself.
    pub is_transition: bool,
}

impl Frame {
    pub fn still(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_transition: false,
        }
    }

    pub fn transition(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_transition: true,
        }
    }
}

/// How a click moves through the image sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageAdvance {
    /// Step once, then keep stepping every `delay` while a transition frame is shown.
    FollowTransitions { delay: Duration },
    /// Step once, then exactly once more after `delay`, ignoring frame flags.
    FlashThrough { delay: Duration },
}

impl Default for ImageAdvance {
    fn default() -> Self {
        ImageAdvance::FollowTransitions {
            delay: TRANSITION_DELAY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub id: String,
    pub frames: Vec<Frame>,
    pub image_advance: ImageAdvance,
}

impl LayerConfig {
    pub fn new(id: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            id: id.into(),
            frames,
            image_advance: ImageAdvance::default(),
        }
    }

    pub fn with_image_advance(mut self, image_advance: ImageAdvance) -> Self {
        self.image_advance = image_advance;
        self
    }
}

struct PendingStep {
    handle: TaskHandle,
    follow: bool,
}

struct FrameCursor {
    frames: Vec<Frame>,
    index: usize,
    presenter: Rc<dyn Presenter>,
    pending: Option<PendingStep>,
}

impl FrameCursor {
    fn current(&self) -> &Frame {
        &self.frames[self.index]
    }

    fn step(&mut self) {
        self.index = (self.index + 1) % self.frames.len();
        self.presenter.set_displayed_frame(&self.frames[self.index].url);
    }

    /// Cancel the pending delayed step and apply it right away.
    fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.cancel();
            self.step();
            if pending.follow {
                // Terminates: construction guarantees a non-transition frame
                while self.current().is_transition {
                    self.step();
                }
            }
        }
    }
}

#[derive(Clone)]
struct ImageSequence {
    cursor: Rc<RefCell<FrameCursor>>,
    scheduler: Rc<dyn Scheduler>,
}

impl ImageSequence {
    fn advance(&self, mode: ImageAdvance) {
        let mut cursor = self.cursor.borrow_mut();
        cursor.settle();
        cursor.step();
        match mode {
            ImageAdvance::FollowTransitions { delay } => {
                if cursor.current().is_transition {
                    self.schedule_step(&mut cursor, delay, true);
                }
            }
            ImageAdvance::FlashThrough { delay } => {
                self.schedule_step(&mut cursor, delay, false);
            }
        }
    }

    fn schedule_step(&self, cursor: &mut FrameCursor, delay: Duration, follow: bool) {
        let weak = Rc::downgrade(&self.cursor);
        let scheduler = self.scheduler.clone();
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(cursor) = weak.upgrade() {
                    ImageSequence { cursor, scheduler }.run_pending(delay);
                }
            }),
        );
        cursor.pending = Some(PendingStep { handle, follow });
    }

    fn run_pending(&self, delay: Duration) {
        let mut cursor = self.cursor.borrow_mut();
        let Some(pending) = cursor.pending.take() else {
            return;
        };
        if pending.handle.is_cancelled() {
            return;
        }
        cursor.step();
        if pending.follow && cursor.current().is_transition {
            self.schedule_step(&mut cursor, delay, true);
        }
    }
}

/// Clickable on/off unit: image sequence, click cues and toggle observers.
///
/// A click flips the state, plays the cue for the new state, then runs every
/// observer in registration order. The image observer is always first.
pub struct Layer {
    id: String,
    toggled: Cell<bool>,
    images: ImageSequence,
    presenter: Rc<dyn Presenter>,
    hooks: RefCell<Vec<Box<dyn FnMut()>>>,
}

impl Layer {
    pub fn new(
        config: LayerConfig,
        presenter: Rc<dyn Presenter>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self> {
        let LayerConfig {
            id,
            frames,
            image_advance,
        } = config;
        if frames.is_empty() {
            return Err(LayerError::invalid(
                "frames",
                format!("layer `{id}` needs at least one frame"),
            ));
        }
        if frames.iter().all(|f| f.is_transition) {
            return Err(LayerError::invalid(
                "frames",
                format!("layer `{id}` has only transition frames"),
            ));
        }

        presenter.set_displayed_frame(&frames[0].url);
        let images = ImageSequence {
            cursor: Rc::new(RefCell::new(FrameCursor {
                frames,
                index: 0,
                presenter: presenter.clone(),
                pending: None,
            })),
            scheduler,
        };
        let layer = Self {
            id,
            toggled: Cell::new(false),
            images,
            presenter,
            hooks: RefCell::new(Vec::new()),
        };

        let sequence = layer.images.clone();
        layer.register_toggle_hook(move || sequence.advance(image_advance));
        Ok(layer)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn register_toggle_hook(&self, hook: impl FnMut() + 'static) {
        self.hooks.borrow_mut().push(Box::new(hook));
    }

    /// Handle one click. Returns the new state.
    pub fn toggle(&self) -> bool {
        let on = !self.toggled.get();
        self.toggled.set(on);
        self.presenter.play_feedback(on);
        for hook in self.hooks.borrow_mut().iter_mut() {
            hook();
        }
        log::info!("[layer] {} {}", self.id, if on { "on" } else { "off" });
        on
    }

    pub fn is_toggled_on(&self) -> bool {
        self.toggled.get()
    }

    pub fn current_frame_index(&self) -> usize {
        self.images.cursor.borrow().index
    }

    pub fn current_frame(&self) -> Frame {
        self.images.cursor.borrow().current().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.images.cursor.borrow().frames.len()
    }

    /// Whether a delayed image step is waiting on the scheduler.
    pub fn has_pending_advance(&self) -> bool {
        self.images.cursor.borrow().pending.is_some()
    }
}

/// Capabilities shared by every layer variant.
pub trait LayerControl {
    fn layer(&self) -> &Layer;

    fn toggle(&self) -> bool {
        self.layer().toggle()
    }

    /// Slider moved; `value` is in [0, 100].
    fn on_slide(&self, _value: f32) {}

    /// Initial slider position, or `None` for a layer without a slider.
    fn slider_default(&self) -> Option<u8> {
        None
    }
}

impl LayerControl for Layer {
    fn layer(&self) -> &Layer {
        self
    }
}
