use super::engine::{AssetSource, AudioEngine, GainControl};
use super::error::{LayerError, Result};
use super::impulse::ImpulseResponse;
use super::layer::{Presenter, Scheduler, TaskHandle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

// Headless collaborators driven by a manually advanced clock. They let the
// layer model run on the host with Web Audio ramp semantics.

struct Timer {
    due: f64,
    seq: u64,
    handle: TaskHandle,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ClockState {
    now: Cell<f64>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
}

/// Shared virtual time plus the timers waiting on it.
#[derive(Clone, Default)]
pub struct OfflineClock {
    state: Rc<ClockState>,
}

impl OfflineClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.state.now.get()
    }

    /// Move time forward, running due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by.as_secs_f64();
        while let Some(timer) = self.pop_due(target) {
            self.state.now.set(timer.due.max(self.now()));
            if !timer.handle.is_cancelled() {
                (timer.task)();
            }
        }
        self.state.now.set(target);
    }

    /// Timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.state
            .timers
            .borrow()
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .count()
    }

    fn pop_due(&self, until: f64) -> Option<Timer> {
        let mut timers = self.state.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }
}

impl Scheduler for OfflineClock {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskHandle {
        let handle = TaskHandle::new();
        let seq = self.state.next_seq.get();
        self.state.next_seq.set(seq + 1);
        self.state.timers.borrow_mut().push(Timer {
            due: self.now() + delay.as_secs_f64(),
            seq,
            handle: handle.clone(),
            task,
        });
        handle
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Automation {
    Set { value: f32, at: f64 },
    Ramp { value: f32, end: f64 },
}

impl Automation {
    fn time(&self) -> f64 {
        match *self {
            Automation::Set { at, .. } => at,
            Automation::Ramp { end, .. } => end,
        }
    }
}

/// Automation timeline of one gain parameter.
#[derive(Clone)]
pub struct ParamTimeline {
    clock: OfflineClock,
    default_value: f32,
    events: Rc<RefCell<Vec<Automation>>>,
}

impl ParamTimeline {
    pub fn new(clock: OfflineClock, default_value: f32) -> Self {
        Self {
            clock,
            default_value,
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Level at time `t`: set events hold, ramps interpolate from the
    /// previous event.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut value = self.default_value;
        let mut since = 0.0_f64;
        for event in self.events.borrow().iter() {
            match *event {
                Automation::Set { value: v, at } => {
                    if at > t {
                        break;
                    }
                    value = v;
                    since = at;
                }
                Automation::Ramp { value: v, end } => {
                    if end <= t {
                        value = v;
                        since = end;
                        continue;
                    }
                    let span = end - since;
                    if span > 0.0 && t >= since {
                        value += (v - value) * ((t - since) / span) as f32;
                    }
                    break;
                }
            }
        }
        value
    }

    /// Target of the last scheduled event, i.e. where the level settles.
    pub fn final_value(&self) -> f32 {
        match self.events.borrow().last() {
            Some(Automation::Set { value, .. }) | Some(Automation::Ramp { value, .. }) => *value,
            None => self.default_value,
        }
    }

    /// End time of the last scheduled event.
    pub fn settles_at(&self) -> f64 {
        self.events.borrow().last().map_or(0.0, Automation::time)
    }

    fn insert(&self, event: Automation) {
        let mut events = self.events.borrow_mut();
        let at = events.partition_point(|e| e.time() <= event.time());
        events.insert(at, event);
    }
}

impl GainControl for ParamTimeline {
    fn current_time(&self) -> f64 {
        self.clock.now()
    }

    fn value(&self) -> f32 {
        self.value_at(self.clock.now())
    }

    fn cancel_scheduled_values(&self, from: f64) {
        self.events.borrow_mut().retain(|e| e.time() < from);
    }

    fn set_value_at_time(&self, value: f32, at: f64) {
        self.insert(Automation::Set { value, at });
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, end: f64) {
        self.insert(Automation::Ramp { value, end });
    }
}

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Destination,
    Gain,
    LoopSource,
    Convolver { impulse_len: usize },
}

/// Gain created by [`OfflineEngine`]: a graph node plus its timeline.
#[derive(Clone)]
pub struct OfflineGain {
    pub id: NodeId,
    pub param: ParamTimeline,
}

impl GainControl for OfflineGain {
    fn current_time(&self) -> f64 {
        self.param.current_time()
    }

    fn value(&self) -> f32 {
        self.param.value()
    }

    fn cancel_scheduled_values(&self, from: f64) {
        self.param.cancel_scheduled_values(from);
    }

    fn set_value_at_time(&self, value: f32, at: f64) {
        self.param.set_value_at_time(value, at);
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, end: f64) {
        self.param.linear_ramp_to_value_at_time(value, end);
    }
}

/// Decoded sample; only its size is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct OfflineBuffer {
    pub bytes: usize,
}

/// Audio engine that records the graph instead of rendering it.
pub struct OfflineEngine {
    clock: OfflineClock,
    sample_rate: f32,
    nodes: RefCell<Vec<NodeKind>>,
    edges: RefCell<Vec<(NodeId, NodeId)>>,
    buffers: RefCell<HashMap<NodeId, OfflineBuffer>>,
    playing: RefCell<Vec<NodeId>>,
}

impl OfflineEngine {
    pub fn new(clock: OfflineClock, sample_rate: f32) -> Self {
        Self {
            clock,
            sample_rate,
            nodes: RefCell::new(vec![NodeKind::Destination]),
            edges: RefCell::new(Vec::new()),
            buffers: RefCell::new(HashMap::new()),
            playing: RefCell::new(Vec::new()),
        }
    }

    pub fn clock(&self) -> &OfflineClock {
        &self.clock
    }

    pub fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.borrow().get(id).cloned()
    }

    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.borrow().contains(&(from, to))
    }

    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges.borrow().clone()
    }

    pub fn is_playing(&self, source: NodeId) -> bool {
        self.playing.borrow().contains(&source)
    }

    pub fn loop_buffer(&self, source: NodeId) -> Option<OfflineBuffer> {
        self.buffers.borrow().get(&source).cloned()
    }

    fn add_node(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(kind);
        nodes.len() - 1
    }

    fn expect_kind(&self, id: NodeId, kind: &NodeKind) -> Result<()> {
        match self.node_kind(id) {
            Some(ref k) if k == kind => Ok(()),
            Some(k) => Err(LayerError::Engine(format!(
                "node {id} is {k:?}, expected {kind:?}"
            ))),
            None => Err(LayerError::Engine(format!("unknown node {id}"))),
        }
    }
}

impl AudioEngine for OfflineEngine {
    type Node = NodeId;
    type Gain = OfflineGain;
    type Buffer = OfflineBuffer;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn destination(&self) -> NodeId {
        0
    }

    fn create_gain(&self) -> Result<OfflineGain> {
        Ok(OfflineGain {
            id: self.add_node(NodeKind::Gain),
            param: ParamTimeline::new(self.clock.clone(), 1.0),
        })
    }

    fn gain_node(&self, gain: &OfflineGain) -> NodeId {
        gain.id
    }

    fn create_loop_source(&self) -> Result<NodeId> {
        Ok(self.add_node(NodeKind::LoopSource))
    }

    fn create_convolver(&self, impulse: &ImpulseResponse) -> Result<NodeId> {
        Ok(self.add_node(NodeKind::Convolver {
            impulse_len: impulse.len(),
        }))
    }

    fn connect(&self, from: &NodeId, to: &NodeId) -> Result<()> {
        if self.node_kind(*from).is_none() || self.node_kind(*to).is_none() {
            return Err(LayerError::Engine(format!(
                "cannot connect unknown nodes {from} -> {to}"
            )));
        }
        if *from == self.destination() {
            return Err(LayerError::Engine("destination has no output".into()));
        }
        self.edges.borrow_mut().push((*from, *to));
        Ok(())
    }

    async fn decode(&self, bytes: Vec<u8>) -> Result<OfflineBuffer> {
        if bytes.is_empty() {
            return Err(LayerError::Engine("empty audio data".into()));
        }
        Ok(OfflineBuffer { bytes: bytes.len() })
    }

    fn set_loop_buffer(&self, source: &NodeId, buffer: OfflineBuffer) -> Result<()> {
        self.expect_kind(*source, &NodeKind::LoopSource)?;
        let mut buffers = self.buffers.borrow_mut();
        if buffers.contains_key(source) {
            return Err(LayerError::Engine(format!("source {source} already has a buffer")));
        }
        buffers.insert(*source, buffer);
        Ok(())
    }

    fn start_loop(&self, source: &NodeId) -> Result<()> {
        self.expect_kind(*source, &NodeKind::LoopSource)?;
        if !self.buffers.borrow().contains_key(source) {
            return Err(LayerError::Engine(format!("source {source} has no buffer")));
        }
        let mut playing = self.playing.borrow_mut();
        if playing.contains(source) {
            return Err(LayerError::Engine(format!("source {source} already started")));
        }
        playing.push(*source);
        Ok(())
    }
}

/// In-memory asset table.
#[derive(Default)]
pub struct StaticAssets {
    files: HashMap<String, Vec<u8>>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.files.insert(url.into(), bytes);
        self
    }
}

impl AssetSource for StaticAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.files.get(url).cloned().ok_or_else(|| LayerError::Fetch {
            url: url.to_string(),
            reason: "not found".into(),
        })
    }
}

/// Presenter that remembers what it was asked to show and play.
#[derive(Default)]
pub struct RecordingPresenter {
    frames: RefCell<Vec<String>>,
    feedback: RefCell<Vec<bool>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Option<String> {
        self.frames.borrow().last().cloned()
    }

    pub fn frames_shown(&self) -> Vec<String> {
        self.frames.borrow().clone()
    }

    pub fn feedback(&self) -> Vec<bool> {
        self.feedback.borrow().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn set_displayed_frame(&self, url: &str) {
        self.frames.borrow_mut().push(url.to_string());
    }

    fn play_feedback(&self, entering_on: bool) {
        self.feedback.borrow_mut().push(entering_on);
    }
}
