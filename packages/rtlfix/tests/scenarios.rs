//! End-to-end behaviour of `DirectionFixer` on parsed pages.

use std::time::{Duration, Instant};

use rtlfix::{
    DirectionFixer, DocumentConfig, FixerConfig, HtmlDocument, ReactorState, SettingsError, SettingsSnapshot,
    SiteId, scan,
};
use rtlfix_dom::{
    BaseDocument, Direction, HTML_NAMESPACE, LocalName, Namespace, ProcessingMark, QualName, TextAlign,
};
use rtlfix_traits::settings::{ProviderError, SettingsProvider};
use serde_json::{Value, json};

const MS: Duration = Duration::from_millis(1);

fn page(body: &str) -> HtmlDocument {
    let html = format!("<!DOCTYPE html><html><head></head><body>{body}</body></html>");
    HtmlDocument::from_html(&html, DocumentConfig::with_base_url("https://example.com/article/1"))
}

fn by_id(doc: &BaseDocument, id: &str) -> usize {
    doc.get_element_by_id(id).unwrap()
}

fn enabled() -> SettingsSnapshot {
    SettingsSnapshot::new(true, ["unrelated.org"])
}

fn is_styled(doc: &BaseDocument, id: usize) -> bool {
    doc.get_node(id)
        .unwrap()
        .mark
        .as_ref()
        .is_some_and(ProcessingMark::is_styled)
}

fn update(payload: Value) -> Value {
    json!({ "action": "updateState", "payload": payload })
}

#[test]
fn persian_paragraph_is_corrected_on_activation() {
    let mut doc = page(r#"<p id="p">سلام world</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    assert_eq!(fixer.site(), &SiteId::from_hostname("example.com"));

    fixer.initialize(&mut doc, Ok(enabled()), Instant::now());
    assert!(fixer.is_active());

    let p = by_id(&doc, "p");
    let style = doc.computed_style(p).unwrap();
    assert_eq!(style.direction, Direction::Rtl);
    assert_eq!(style.text_align, TextAlign::Right);
    assert!(is_styled(&doc, p));
}

#[test]
fn rtl_paragraph_is_left_alone() {
    let mut doc = page(r#"<div style="direction: rtl"><p id="p">سلام world</p></div>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    fixer.initialize(&mut doc, Ok(enabled()), Instant::now());

    let p = by_id(&doc, "p");
    let node = doc.get_node(p).unwrap();
    assert_eq!(node.mark, Some(ProcessingMark::AlreadyRtl));
    assert_eq!(node.attr("style"), None);
}

#[test]
fn excluded_site_is_never_touched() {
    let mut doc = page(r#"<p id="p">سلام world</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let now = Instant::now();
    fixer.initialize(&mut doc, Ok(SettingsSnapshot::new(true, ["EXAMPLE.com"])), now);

    assert!(!fixer.is_active());
    assert_eq!(scan(&mut doc, 0, fixer.activation()).visited, 0);
    assert_eq!(fixer.reactor().state(), ReactorState::Stopped);
    assert!(!doc.has_observers());
    assert_eq!(fixer.poll(&mut doc, now + 10_000 * MS), None);

    let p = by_id(&doc, "p");
    assert!(!doc.get_node(p).unwrap().is_processed());
}

#[test]
fn translated_text_is_corrected_within_one_window() {
    let mut doc = page(r#"<p id="p">Hello</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);

    let p = by_id(&doc, "p");
    assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::NoRtlDetected));

    let text = doc.get_node(p).unwrap().children[0];
    let t1 = t0 + 50 * MS;
    doc.mutate().set_node_text(text, "سلام").unwrap();
    let deadline = fixer.poll(&mut doc, t1);
    assert_eq!(deadline, Some(t1 + 300 * MS));
    assert!(!is_styled(&doc, p));

    fixer.poll(&mut doc, t1 + 300 * MS);
    assert!(is_styled(&doc, p));
    assert_eq!(doc.computed_style(p).unwrap().direction, Direction::Rtl);
}

#[test]
fn token_by_token_translation_is_batched() {
    let mut doc = page(r#"<p id="p">Hello</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);

    let p = by_id(&doc, "p");
    let text = doc.get_node(p).unwrap().children[0];
    doc.mutate().set_node_text(text, "").unwrap();

    let mut now = t0;
    let mut batches = 0;
    for token in ["این ", "یک ", "متن ", "ترجمه ", "شده ", "است"] {
        doc.mutate().append_text_to_node(text, token).unwrap();
        now += 100 * MS;
        let (report, _) = fixer.poll_with_report(&mut doc, now);
        batches += usize::from(report.batch.is_some());
    }
    assert_eq!(batches, 0);

    let (report, _) = fixer.poll_with_report(&mut doc, now + 300 * MS);
    assert_eq!(report.batch.map(|stats| stats.styled), Some(1));
    assert_eq!(doc.text_content(p), "این یک متن ترجمه شده است");
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

#[test]
fn injected_content_is_corrected() {
    let mut doc = page(r#"<main id="main"></main>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);

    let main = by_id(&doc, "main");
    let (ul, first, second) = {
        let mut mutr = doc.mutate();
        let ul = mutr.create_element(html_name("ul"), vec![]);
        let first = mutr.create_element(html_name("li"), vec![]);
        let second = mutr.create_element(html_name("li"), vec![]);
        let first_text = mutr.create_text_node("اول");
        let second_text = mutr.create_text_node("second");
        mutr.append_children(first, &[first_text]).unwrap();
        mutr.append_children(second, &[second_text]).unwrap();
        mutr.append_children(ul, &[first, second]).unwrap();
        mutr.append_children(main, &[ul]).unwrap();
        (ul, first, second)
    };

    fixer.poll(&mut doc, t0 + 300 * MS);
    // The list holds Persian text, so it is styled and the Persian item inherits rtl from it
    assert!(is_styled(&doc, ul));
    assert_eq!(doc.get_node(first).unwrap().mark, Some(ProcessingMark::AlreadyRtl));
    assert_eq!(doc.get_node(second).unwrap().mark, Some(ProcessingMark::NoRtlDetected));
}

#[test]
fn excluding_the_site_stops_and_reverts() {
    let mut doc = page(r#"<p id="p" style="text-align: center">سلام world</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let p = by_id(&doc, "p");
    assert!(is_styled(&doc, p));
    assert!(fixer.reactor().is_running());

    let ack = fixer.handle_message(&mut doc, &update(json!({ "excludedSites": ["example.com"] })), t0);
    assert!(ack.success);
    assert!(!fixer.is_active());
    assert_eq!(fixer.reactor().state(), ReactorState::Stopped);
    assert!(!doc.has_observers());

    assert!(!doc.get_node(p).unwrap().is_processed());
    let style = doc.computed_style(p).unwrap();
    assert_eq!(style.direction, Direction::Ltr);
    assert_eq!(style.text_align, TextAlign::Center);

    // Nothing is pending: neither the fallback scan nor a batch
    assert_eq!(fixer.poll(&mut doc, t0 + 10_000 * MS), None);
    assert!(!is_styled(&doc, p));
}

#[test]
fn disabling_can_keep_styling() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let config = FixerConfig {
        revert_on_disable: false,
        ..Default::default()
    };
    let mut fixer = DirectionFixer::for_document(config, &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);

    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": false })), t0);
    assert!(!fixer.is_active());
    assert!(!doc.has_observers());
    assert!(is_styled(&doc, by_id(&doc, "p")));
}

#[test]
fn reenabling_rechecks_text_changed_while_disabled() {
    let mut doc = page(r#"<p id="p">Hello</p>"#);
    let config = FixerConfig {
        revert_on_disable: false,
        ..Default::default()
    };
    let mut fixer = DirectionFixer::for_document(config, &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let p = by_id(&doc, "p");
    assert_eq!(doc.get_node(p).unwrap().mark, Some(ProcessingMark::NoRtlDetected));

    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": false })), t0);
    let text = doc.get_node(p).unwrap().children[0];
    doc.mutate().set_node_text(text, "سلام").unwrap();

    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": true })), t0 + 100 * MS);
    assert!(is_styled(&doc, p));
    assert_eq!(doc.computed_style(p).unwrap().direction, Direction::Rtl);
}

#[test]
fn reenabling_keeps_existing_corrections() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let config = FixerConfig {
        revert_on_disable: false,
        ..Default::default()
    };
    let mut fixer = DirectionFixer::for_document(config, &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let p = by_id(&doc, "p");
    let style = doc.get_node(p).unwrap().attr("style").map(str::to_string);

    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": false })), t0);
    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": true })), t0);
    assert!(is_styled(&doc, p));
    assert_eq!(doc.get_node(p).unwrap().attr("style").map(str::to_string), style);
}

#[test]
fn updates_before_the_first_snapshot_are_held_back() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    let p = by_id(&doc, "p");

    let ack = fixer.handle_message(&mut doc, &update(json!({ "isEnabled": true })), t0);
    assert!(ack.success);
    assert!(!fixer.is_active());
    assert!(fixer.settings().is_none());
    assert!(!doc.has_observers());
    assert!(!doc.get_node(p).unwrap().is_processed());

    // The real settings exclude this site; the early update only touched the enabled flag
    fixer.initialize(&mut doc, Ok(SettingsSnapshot::new(false, ["example.com"])), t0);
    assert_eq!(fixer.settings(), Some(&SettingsSnapshot::new(true, ["example.com"])));
    assert!(!fixer.is_active());
    assert!(!doc.get_node(p).unwrap().is_processed());
}

#[test]
fn the_latest_early_update_wins() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();

    fixer.handle_message(&mut doc, &update(json!({ "excludedSites": ["example.com"] })), t0);
    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": false })), t0);
    fixer.handle_message(&mut doc, &update(json!({ "excludedSites": [] })), t0);
    fixer.initialize(&mut doc, Ok(SettingsSnapshot::new(true, ["example.com"])), t0);

    assert_eq!(fixer.settings(), Some(&SettingsSnapshot::new(false, Vec::<&str>::new())));
    assert!(!fixer.is_active());

    fixer.handle_message(&mut doc, &update(json!({ "isEnabled": true })), t0);
    assert!(fixer.is_active());
    assert!(is_styled(&doc, by_id(&doc, "p")));
}

#[test]
fn unexcluding_the_site_rescans_immediately() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(SettingsSnapshot::new(true, ["example.com"])), t0);
    let p = by_id(&doc, "p");
    assert!(!is_styled(&doc, p));

    fixer.handle_message(&mut doc, &update(json!({ "excludedSites": [] })), t0);
    assert!(fixer.is_active());
    assert!(is_styled(&doc, p));
    assert!(fixer.reactor().is_running());
}

#[test]
fn unchanged_update_is_a_no_op() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let settings = fixer.settings().cloned();

    let ack = fixer.handle_message(
        &mut doc,
        &update(json!({ "isEnabled": true, "excludedSites": ["unrelated.org"] })),
        t0,
    );
    assert!(ack.success);
    assert_eq!(fixer.settings().cloned(), settings);
    assert!(fixer.reactor().is_running());
}

#[test]
fn unknown_messages_are_rejected() {
    let mut doc = page("<p>سلام</p>");
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let ack = fixer.handle_message(&mut doc, &json!({ "action": "toggle" }), Instant::now());
    assert!(!ack.success);
    assert!(!fixer.is_active());
}

#[test]
fn fallback_scan_catches_missed_content() {
    let mut doc = page(r#"<div id="host"></div>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let ReactorState::Running { observer, .. } = fixer.reactor().state() else {
        panic!("reactor is not running");
    };

    let host = by_id(&doc, "host");
    let p = {
        let mut mutr = doc.mutate();
        let p = mutr.create_element(html_name("p"), vec![]);
        let text = mutr.create_text_node("سلام");
        mutr.append_children(p, &[text]).unwrap();
        mutr.append_children(host, &[p]).unwrap();
        p
    };
    // Drop the records, as if the insertion happened before the observer existed
    assert!(!doc.take_records(observer).is_empty());

    assert_eq!(fixer.poll(&mut doc, t0 + 2999 * MS), Some(t0 + 3000 * MS));
    assert!(!is_styled(&doc, p));

    let (report, deadline) = fixer.poll_with_report(&mut doc, t0 + 3000 * MS);
    assert_eq!(report.fallback_scan.map(|stats| stats.styled), Some(1));
    assert!(is_styled(&doc, p));
    assert_eq!(deadline, None);
}

#[test]
fn fallback_scan_can_be_disabled() {
    let mut doc = page(r#"<p>سلام</p>"#);
    let config = FixerConfig {
        fallback_scan_delay_ms: None,
        ..Default::default()
    };
    let mut fixer = DirectionFixer::for_document(config, &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    assert_eq!(fixer.reactor().fallback_scan_at(), None);
    assert_eq!(fixer.poll(&mut doc, t0), None);
}

#[test]
fn shutdown_cancels_everything() {
    let mut doc = page(r#"<p id="p">Hello</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let t0 = Instant::now();
    fixer.initialize(&mut doc, Ok(enabled()), t0);
    let p = by_id(&doc, "p");
    let text = doc.get_node(p).unwrap().children[0];
    doc.mutate().set_node_text(text, "سلام").unwrap();
    fixer.poll(&mut doc, t0);

    fixer.shutdown(&mut doc);
    assert!(!fixer.is_active());
    assert!(!doc.has_observers());
    assert_eq!(fixer.poll(&mut doc, t0 + 10_000 * MS), None);
    assert!(!is_styled(&doc, p));
}

#[test]
fn failed_settings_leave_the_page_untouched() {
    let mut doc = page(r#"<p id="p">سلام world</p>"#);
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let now = Instant::now();
    let err = SettingsError::Exhausted {
        attempts: 5,
        last: Box::new(SettingsError::Transport(ProviderError::Timeout)),
    };
    fixer.initialize(&mut doc, Err(err), now);

    assert!(!fixer.is_active());
    assert!(fixer.settings().is_none());
    assert!(!doc.has_observers());
    assert_eq!(fixer.poll(&mut doc, now + 10_000 * MS), None);
    assert!(!doc.get_node(by_id(&doc, "p")).unwrap().is_processed());
}

struct FlakyProvider {
    failures_left: std::cell::Cell<u32>,
}

impl SettingsProvider for FlakyProvider {
    fn request_settings(&self) -> impl std::future::Future<Output = Result<Value, ProviderError>> {
        let result = match self.failures_left.get() {
            0 => Ok(json!({ "isEnabled": true, "excludedSites": [] })),
            n => {
                self.failures_left.set(n - 1);
                Err(ProviderError::Disconnected)
            }
        };
        std::future::ready(result)
    }
}

#[tokio::test(start_paused = true)]
async fn settings_are_retried_then_activate() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let provider = FlakyProvider {
        failures_left: std::cell::Cell::new(2),
    };
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let settings = fixer.request_settings(&provider).await;
    fixer.initialize(&mut doc, settings, Instant::now());
    assert!(fixer.is_active());
    assert!(is_styled(&doc, by_id(&doc, "p")));
}

#[tokio::test(start_paused = true)]
async fn page_can_change_while_settings_are_retried() {
    let mut doc = page(r#"<div id="host"></div>"#);
    let provider = FlakyProvider {
        failures_left: std::cell::Cell::new(3),
    };
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let host = by_id(&doc, "host");

    let inject = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let mut mutr = doc.mutate();
        let p = mutr.create_element(html_name("p"), vec![]);
        let text = mutr.create_text_node("سلام");
        mutr.append_children(p, &[text]).unwrap();
        mutr.append_children(host, &[p]).unwrap();
        p
    };
    let (settings, p) = tokio::join!(fixer.request_settings(&provider), inject);

    fixer.initialize(&mut doc, settings, Instant::now());
    assert!(is_styled(&doc, p));
}

#[tokio::test(start_paused = true)]
async fn exhausted_settings_leave_the_page_untouched() {
    let mut doc = page(r#"<p id="p">سلام</p>"#);
    let provider = FlakyProvider {
        failures_left: std::cell::Cell::new(u32::MAX),
    };
    let mut fixer = DirectionFixer::for_document(FixerConfig::default(), &doc);
    let start = tokio::time::Instant::now();
    let settings = fixer.request_settings(&provider).await;
    assert!(start.elapsed() >= Duration::from_millis(1500));
    fixer.initialize(&mut doc, settings, Instant::now());
    assert!(!fixer.is_active());
    assert!(!doc.has_observers());
    assert!(!doc.get_node(by_id(&doc, "p")).unwrap().is_processed());
}
