//! WASM content-script entry point for weaver-tags.
//!
//! ```js
//! import init, { run } from "weaver-tags-js";
//!
//! await init();
//! const tags = run({ delimiters: "lenient" });
//! // later
//! tags.disconnect();
//! ```

use wasm_bindgen::prelude::*;
use weaver_tags_browser::{BrowserHost, TagObserver, TagsConfig};

/// Install the panic hook and console tracing.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_family = "wasm", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}

/// Process the page and start watching it for streamed output.
///
/// `config` is an optional `TagsConfig` object (`targetSelectors`,
/// `delimiters`, `tags`); missing fields take their defaults.
#[wasm_bindgen]
pub fn run(config: JsValue) -> Result<TagsHandle, JsError> {
    let config: TagsConfig = if config.is_undefined() || config.is_null() {
        TagsConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let observer = weaver_tags_browser::start(&config)?;
    Ok(TagsHandle {
        observer: Some(observer),
        config,
    })
}

/// Handle to a running tag observer.
#[wasm_bindgen]
pub struct TagsHandle {
    observer: Option<TagObserver>,
    config: TagsConfig,
}

#[wasm_bindgen]
impl TagsHandle {
    /// Stop observing. Converted markup and its click handlers stay.
    pub fn disconnect(&mut self) {
        self.observer.take();
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Effective configuration, defaults filled in.
    #[wasm_bindgen(getter)]
    pub fn config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.config)?)
    }

    /// Rescan the whole body, e.g. after the page swapped conversations.
    ///
    /// Returns the number of converted spans, or `undefined` when the
    /// handle is disconnected or a batch is in flight.
    pub fn rescan(&self) -> Result<Option<u32>, JsError> {
        let Some(observer) = &self.observer else {
            return Ok(None);
        };
        let mut host = BrowserHost::from_window()?;
        let body = host.body()?;
        let report = observer.with_watcher(|watcher| watcher.process_existing(&mut host, &body));
        Ok(report.map(|report| report.conversions as u32))
    }
}
