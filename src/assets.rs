use crate::core::{AssetSource, LayerError, Result};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn fetch_error(url: &str, reason: impl std::fmt::Debug) -> LayerError {
    LayerError::Fetch {
        url: url.to_string(),
        reason: format!("{:?}", reason),
    }
}

/// Fetches assets over HTTP with `window.fetch`.
pub struct WebAssets;

impl AssetSource for WebAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let window = web::window().ok_or_else(|| fetch_error(url, "no window"))?;
        let response: JsValue = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| fetch_error(url, e))?;
        let response: web::Response = response.dyn_into().map_err(|e| fetch_error(url, e))?;
        if !response.ok() {
            return Err(LayerError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let body = response.array_buffer().map_err(|e| fetch_error(url, e))?;
        let body = JsFuture::from(body).await.map_err(|e| fetch_error(url, e))?;
        Ok(js_sys::Uint8Array::new(&body).to_vec())
    }
}
