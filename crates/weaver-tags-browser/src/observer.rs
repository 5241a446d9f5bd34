//! `MutationObserver` wiring for the tag watcher.
//!
//! # How it works
//!
//! 1. [`start`] runs the initialization pass over the existing body
//! 2. A `MutationObserver` on the body (child list, subtree, character data)
//!    delivers record batches to a Rust closure
//! 3. Each batch is translated with [`records_to_batch`] and handed to the
//!    shared [`MutationWatcher`]
//!
//! Observer callbacks run as microtasks, so the mutations caused by a rewrite
//! arrive as a separate batch after the current one returns.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};
use weaver_tags::{BatchReport, Mutation, MutationWatcher, TagsConfig};

use crate::error::BrowserError;
use crate::host::{BrowserHost, node_list};

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// Live observation of a subtree. Disconnects when dropped.
pub struct TagObserver {
    observer: MutationObserver,
    watcher: Rc<RefCell<MutationWatcher>>,
    _callback: ObserverCallback,
}

impl TagObserver {
    /// Observe `root` and feed every batch to `watcher`.
    pub fn observe(
        host: BrowserHost,
        root: &Node,
        watcher: MutationWatcher,
    ) -> Result<Self, BrowserError> {
        let watcher = Rc::new(RefCell::new(watcher));

        let shared = watcher.clone();
        let mut host = host;
        let callback: ObserverCallback = Closure::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                let Ok(mut watcher) = shared.try_borrow_mut() else {
                    tracing::trace!("watcher busy, dropping batch");
                    return;
                };
                let batch = records_to_batch(&records);
                let report = watcher.handle_batch(&mut host, &batch);
                log_report(&report);
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_character_data(true);
        init.set_attributes(false);
        observer.observe_with_options(root, &init)?;
        tracing::debug!("mutation observer started");

        Ok(Self {
            observer,
            watcher,
            _callback: callback,
        })
    }

    /// Run `f` against the watcher, unless a batch is in flight.
    pub fn with_watcher<R>(&self, f: impl FnOnce(&mut MutationWatcher) -> R) -> Option<R> {
        self.watcher.try_borrow_mut().ok().map(|mut watcher| f(&mut watcher))
    }

    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for TagObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
        tracing::debug!("mutation observer disconnected");
    }
}

/// Translate observer records into watcher mutations.
///
/// Attribute records are dropped; the observer is not configured for them.
pub fn records_to_batch(records: &js_sys::Array) -> Vec<Mutation<Node>> {
    records
        .iter()
        .filter_map(|value| value.dyn_into::<MutationRecord>().ok())
        .filter_map(|record| {
            let target = record.target()?;
            match record.type_().as_str() {
                "childList" => Some(Mutation::ChildList {
                    target,
                    added: node_list(record.added_nodes()),
                }),
                "characterData" => Some(Mutation::CharacterData { target }),
                _ => None,
            }
        })
        .collect()
}

fn log_report(report: &BatchReport) {
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, candidates = report.candidates, "batch had failures");
    } else if report.converted > 0 {
        tracing::debug!(
            converted = report.converted,
            conversions = report.conversions,
            "converted tags"
        );
    }
}

/// Process the current document and start observing its body.
pub fn start(config: &TagsConfig) -> Result<TagObserver, BrowserError> {
    let mut host = BrowserHost::from_window()?;
    let body = host.body()?;
    let mut watcher = config.watcher()?;

    let report = watcher.process_existing(&mut host, &body);
    tracing::info!(
        candidates = report.candidates,
        converted = report.converted,
        "processed existing content"
    );

    TagObserver::observe(host, &body, watcher)
}
