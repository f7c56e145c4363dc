use crate::core::{AudioEngine, GainControl, ImpulseResponse, LayerError, Result};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn engine_error(label: &str, e: JsValue) -> LayerError {
    log::error!("{} error: {:?}", label, e);
    LayerError::Engine(format!("{label}: {e:?}"))
}

/// `GainNode` with the context it schedules against.
#[derive(Clone)]
pub struct WebGain {
    node: web::GainNode,
    ctx: web::AudioContext,
}

impl GainControl for WebGain {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn value(&self) -> f32 {
        self.node.gain().value()
    }

    fn cancel_scheduled_values(&self, from: f64) {
        if let Err(e) = self.node.gain().cancel_scheduled_values(from) {
            log::error!("[audio] cancelScheduledValues error: {:?}", e);
        }
    }

    fn set_value_at_time(&self, value: f32, at: f64) {
        if let Err(e) = self.node.gain().set_value_at_time(value, at) {
            log::error!("[audio] setValueAtTime error: {:?}", e);
        }
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, end: f64) {
        if let Err(e) = self.node.gain().linear_ramp_to_value_at_time(value, end) {
            log::error!("[audio] linearRampToValueAtTime error: {:?}", e);
        }
    }
}

/// Web Audio backed engine.
pub struct WebAudio {
    ctx: web::AudioContext,
}

impl WebAudio {
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        log::info!("[audio] context at {} Hz", ctx.sample_rate());
        Ok(Self { ctx })
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }
}

impl AudioEngine for WebAudio {
    type Node = web::AudioNode;
    type Gain = WebGain;
    type Buffer = web::AudioBuffer;

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    fn destination(&self) -> web::AudioNode {
        self.ctx.destination().into()
    }

    fn create_gain(&self) -> Result<WebGain> {
        let node = web::GainNode::new(&self.ctx).map_err(|e| engine_error("GainNode", e))?;
        Ok(WebGain {
            node,
            ctx: self.ctx.clone(),
        })
    }

    fn gain_node(&self, gain: &WebGain) -> web::AudioNode {
        gain.node.clone().into()
    }

    fn create_loop_source(&self) -> Result<web::AudioNode> {
        let source = web::AudioBufferSourceNode::new(&self.ctx)
            .map_err(|e| engine_error("AudioBufferSourceNode", e))?;
        source.set_loop(true);
        Ok(source.into())
    }

    fn create_convolver(&self, impulse: &ImpulseResponse) -> Result<web::AudioNode> {
        let reverb =
            web::ConvolverNode::new(&self.ctx).map_err(|e| engine_error("ConvolverNode", e))?;
        let len = u32::try_from(impulse.len())
            .map_err(|_| LayerError::Engine(format!("impulse of {} samples", impulse.len())))?;
        let ir = self
            .ctx
            .create_buffer(2, len, impulse.sample_rate())
            .map_err(|e| engine_error("impulse buffer", e))?;
        for (ch, samples) in impulse.channels().into_iter().enumerate() {
            let mut buf = samples.to_vec();
            ir.copy_to_channel(&mut buf, ch as i32)
                .map_err(|e| engine_error("impulse channel", e))?;
        }
        reverb.set_buffer(Some(&ir));
        Ok(reverb.into())
    }

    fn connect(&self, from: &web::AudioNode, to: &web::AudioNode) -> Result<()> {
        from.connect_with_audio_node(to)
            .map(|_| ())
            .map_err(|e| engine_error("connect", e))
    }

    async fn decode(&self, bytes: Vec<u8>) -> Result<web::AudioBuffer> {
        let data = js_sys::Uint8Array::from(bytes.as_slice()).buffer();
        let promise = self
            .ctx
            .decode_audio_data(&data)
            .map_err(|e| engine_error("decodeAudioData", e))?;
        let decoded = JsFuture::from(promise)
            .await
            .map_err(|e| engine_error("decodeAudioData", e))?;
        decoded
            .dyn_into::<web::AudioBuffer>()
            .map_err(|e| engine_error("decoded buffer", e))
    }

    fn set_loop_buffer(&self, source: &web::AudioNode, buffer: web::AudioBuffer) -> Result<()> {
        let source = source
            .dyn_ref::<web::AudioBufferSourceNode>()
            .ok_or_else(|| LayerError::Engine("not a buffer source".into()))?;
        source.set_buffer(Some(&buffer));
        Ok(())
    }

    fn start_loop(&self, source: &web::AudioNode) -> Result<()> {
        let source = source
            .dyn_ref::<web::AudioBufferSourceNode>()
            .ok_or_else(|| LayerError::Engine("not a buffer source".into()))?;
        source
            .start_with_when(0.0)
            .map_err(|e| engine_error("loop start", e))
    }
}
