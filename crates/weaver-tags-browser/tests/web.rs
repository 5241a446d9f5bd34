//! WASM browser tests for weaver-tags-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

#![cfg(all(target_family = "wasm", target_os = "unknown"))]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use weaver_tags_browser::{
    BrowserHost, ContentHost, ContentProcessor, DelimiterMode, ScanOutcome, TagObserver,
    TagProcessor, TagRegistry, TagsConfig,
};
use web_sys::{Element, HtmlElement, HtmlInputElement, Node};

fn host() -> BrowserHost {
    BrowserHost::from_window().unwrap()
}

fn processor() -> ContentProcessor {
    ContentProcessor::new(TagRegistry::builtin(DelimiterMode::Strict).unwrap())
}

/// `<p data-is-last-node>` appended to body, holding one text node.
fn paragraph(host: &BrowserHost, text: &str) -> Element {
    let p = host.document().create_element("p").unwrap();
    p.set_attribute("data-is-last-node", "").unwrap();
    p.set_text_content(Some(text));
    host.document().body().unwrap().append_child(&p).unwrap();
    p
}

#[wasm_bindgen_test]
fn test_highlight_converted_in_dom() {
    let mut host = host();
    let p = paragraph(&host, "a <<highlight>>b<<highlight>> c");
    let node: Node = p.clone().into();

    let outcome = processor().process(&mut host, &node).unwrap();
    assert_eq!(outcome, ScanOutcome::Converted { conversions: 1 });
    assert_eq!(p.text_content().unwrap(), "a b c");
    assert!(p.query_selector("span.processed").unwrap().is_some());
    p.remove();
}

#[wasm_bindgen_test]
fn test_collapse_click_toggles_radio() {
    let mut host = host();
    let p = paragraph(&host, "<<collapse>>Title<<collapse>>");
    let node: Node = p.clone().into();
    processor().process(&mut host, &node).unwrap();

    // a second pass must not stack a second listener
    let collapse = p.query_selector(".collapse").unwrap().unwrap();
    let enhancement = weaver_tags_browser::builtin_processor("collapse")
        .and_then(|processor| processor.enhancement())
        .unwrap();
    let bound = weaver_tags_browser::enhance_elements(&mut host, &node, &enhancement).unwrap();
    assert_eq!(bound, 0);

    let input = collapse
        .query_selector("input")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap();
    let title = collapse
        .query_selector(".collapse-title")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();

    assert!(!input.checked());
    title.click();
    assert!(input.checked());
    title.click();
    assert!(!input.checked());
    p.remove();
}

#[wasm_bindgen_test]
fn test_hide_and_see_click_swaps_hidden() {
    let mut host = host();
    let p = paragraph(&host, "<<hide-and-see>>spoiler<<hide-and-see>>");
    let node: Node = p.clone().into();
    processor().process(&mut host, &node).unwrap();

    let button = p
        .query_selector(".hide-and-see")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    let content = p.query_selector(".hide-and-see-content").unwrap().unwrap();
    let toggle = p.query_selector(".hide-and-see-toggle").unwrap().unwrap();

    button.click();
    assert!(!content.class_list().contains("hidden"));
    assert!(toggle.class_list().contains("hidden"));
    p.remove();
}

#[wasm_bindgen_test]
fn test_text_node_resolves_to_paragraph() {
    let host = host();
    let p = paragraph(&host, "text");
    let text = p.first_child().unwrap();
    let targets = weaver_tags_browser::Selector::parse("p[data-is-last-node]").unwrap();

    let found = host.closest(&text, &targets).unwrap();
    assert_eq!(found, Node::from(p.clone()));
    p.remove();
}

#[wasm_bindgen_test]
fn test_open_collapse_survives_later_rewrite() {
    let mut host = host();
    let p = paragraph(&host, "<<collapse>>Title<<collapse>>");
    let node: Node = p.clone().into();
    let processor = processor();
    processor.process(&mut host, &node).unwrap();

    let title = p
        .query_selector(".collapse-title")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    title.click();
    let input = p.query_selector("input").unwrap().unwrap();
    assert!(input.has_attribute("checked"));

    // a later tag in the same paragraph re-parses the collapse from outerHTML
    let tail = host.document().create_text_node(" <<highlight>>x<<highlight>>");
    p.append_child(&tail).unwrap();
    let outcome = processor.process(&mut host, &node).unwrap();
    assert_eq!(outcome, ScanOutcome::Converted { conversions: 1 });

    let input = p
        .query_selector("input")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap();
    assert!(input.checked());

    let title = p
        .query_selector(".collapse-title")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    title.click();
    assert!(!input.checked());
    assert!(!input.has_attribute("checked"));
    p.remove();
}

/// Resolve after a timer tick, once every pending microtask (observer
/// callbacks included) has run.
async fn settle() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback(&resolve)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

/// Empty `<div>` appended to body, used as an observation root.
fn container(host: &BrowserHost) -> Element {
    let div = host.document().create_element("div").unwrap();
    host.document().body().unwrap().append_child(&div).unwrap();
    div
}

#[wasm_bindgen_test]
async fn test_observer_converts_streamed_collapse() {
    let host = host();
    let root = container(&host);
    let watcher = TagsConfig::default().watcher().unwrap();
    let observer = TagObserver::observe(host.clone(), &root.clone().into(), watcher).unwrap();

    let p = host.document().create_element("p").unwrap();
    p.set_attribute("data-is-last-node", "").unwrap();
    let text = host.document().create_text_node("<<coll");
    p.append_child(&text).unwrap();
    root.append_child(&p).unwrap();
    settle().await;
    assert!(root.query_selector(".collapse").unwrap().is_none());
    assert_eq!(p.text_content().unwrap(), "<<coll");

    text.append_data("apse>>Title<<collapse>>").unwrap();
    settle().await;
    assert_eq!(root.query_selector_all(".collapse.processed").unwrap().length(), 1);
    assert!(!p.text_content().unwrap().contains("<<"));

    // the rewrite's own records have settled without a second conversion
    settle().await;
    assert_eq!(root.query_selector_all(".collapse.processed").unwrap().length(), 1);
    assert_eq!(observer.with_watcher(|_| ()), Some(()));

    drop(observer);
    root.remove();
}

#[wasm_bindgen_test]
async fn test_disconnected_observer_ignores_mutations() {
    let host = host();
    let root = container(&host);
    let watcher = TagsConfig::default().watcher().unwrap();
    let observer = TagObserver::observe(host.clone(), &root.clone().into(), watcher).unwrap();
    observer.disconnect();

    let p = host.document().create_element("p").unwrap();
    p.set_attribute("data-is-last-node", "").unwrap();
    p.set_text_content(Some("<<highlight>>x<<highlight>>"));
    root.append_child(&p).unwrap();
    settle().await;

    assert!(root.query_selector(".processed").unwrap().is_none());
    assert_eq!(p.text_content().unwrap(), "<<highlight>>x<<highlight>>");
    root.remove();
}
