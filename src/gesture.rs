use crate::constants::UNLOCK_EVENTS;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Wait until the audio context may play.
///
/// Browsers create contexts `suspended` until a user gesture. In that case
/// wait for the first gesture on `<body>`, then resume. Returns immediately
/// when the context is already running.
pub async fn unlock(ctx: &web::AudioContext, body: &web::HtmlElement) -> anyhow::Result<()> {
    if ctx.state() != web::AudioContextState::Suspended {
        log::info!("[gesture] audio already running");
        return Ok(());
    }

    let mut resolver: Option<js_sys::Function> = None;
    let gesture = js_sys::Promise::new(&mut |resolve, _reject| resolver = Some(resolve));
    let resolve = resolver.ok_or_else(|| anyhow::anyhow!("promise executor did not run"))?;
    for event in UNLOCK_EVENTS {
        body.add_event_listener_with_callback(event, &resolve)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    log::info!("[gesture] audio suspended; waiting for user input");

    JsFuture::from(gesture)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    for event in UNLOCK_EVENTS {
        _ = body.remove_event_listener_with_callback(event, &resolve);
    }

    let resumed = ctx.resume().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    JsFuture::from(resumed)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    log::info!("[gesture] audio resumed");
    Ok(())
}
