use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use formdom::{Display, Dom, Element, NodeId};
use verify::lookup::VERIFY_VAL;
use verify::prelude::*;

fn binder_with(dom: &Dom, registry: RuleRegistry) -> Binder {
    Binder::new(dom.clone(), registry, GlobalConfig::new(), SubmitBus::new())
}

/// A registry with a rule that records every value it sees.
fn recording() -> (RuleRegistry, Arc<Mutex<Vec<String>>>) {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let registry = RuleRegistry::with_builtins().rule("record", move |v, _| {
        sink.lock().unwrap().push(v.to_string());
        true
    });
    (registry, seen)
}

fn mount(dom: &Dom, element: Element) -> NodeId {
    dom.write(|doc| doc.append(doc.root(), element))
}

#[test]
fn test_change_event_validates_form_control() {
    let dom = Dom::new();
    let field = mount(
        &dom,
        Element::div().class("field").child(Element::input("").id("nick")),
    );
    let binder = Binder::new(
        dom.clone(),
        RuleRegistry::with_builtins(),
        GlobalConfig::new().error_class("is-error"),
        SubmitBus::new(),
    );
    binder
        .on_bind(field, FieldConfig::new("required|min:3").name("Nickname"), None)
        .unwrap();

    let input = dom.read(|doc| doc.get_element_by_id("nick").unwrap());
    assert_eq!(dom.input_value(input, "ab", "change"), 1);

    let state = binder.presenter().state(input).unwrap();
    assert!(state.failed);
    assert_eq!(state.message, "Nickname must be at least 3 characters");
    assert!(dom.read(|doc| doc.has_class(field, "is-error")));

    dom.input_value(input, "abc", "change");
    assert!(!dom.read(|doc| doc.has_class(field, "is-error")));
    assert_eq!(dom.read(|doc| doc.class_name(field).map(str::to_string)), Some("field".to_string()));

    // Not a trigger for this field.
    assert_eq!(dom.input_value(input, "", "input"), 0);
}

#[test]
fn test_custom_events_and_initial_trigger() {
    let dom = Dom::new();
    let (registry, seen) = recording();
    let input = mount(&dom, Element::input("start"));
    let binder = binder_with(&dom, registry);

    binder
        .on_bind(input, FieldConfig::new("record").events(["initial", "input", "blur"]), None)
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["start"]);

    dom.input_value(input, "typed", "input");
    dom.dispatch(input, "blur");
    dom.dispatch(input, "change");
    assert_eq!(*seen.lock().unwrap(), vec!["start", "typed", "typed"]);
}

#[test]
fn test_shared_submit_id_single_subscription() {
    let dom = Dom::new();
    let passes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&passes);
    let registry = RuleRegistry::new().rule("counted", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    let first = mount(&dom, Element::input("a"));
    let second = mount(&dom, Element::input("b"));
    let binder = binder_with(&dom, registry);

    let config = FieldConfig::new("counted").submit("submit-btn");
    binder.on_bind(first, config.clone(), None).unwrap();
    binder.on_bind(second, config.clone(), None).unwrap();
    assert_eq!(binder.bus().len(), 1);

    assert_eq!(binder.bus().emit("submit-btn"), Some(Ok(true)));
    assert_eq!(passes.load(Ordering::SeqCst), 1);

    binder.on_unbind(first, config.clone());
    assert!(!binder.bus().has_listener("submit-btn"));
    assert_eq!(binder.bus().emit("submit-btn"), None);
    assert_eq!(passes.load(Ordering::SeqCst), 1);

    // Releasing an id that is already gone is a no-op.
    binder.on_unbind(second, config);
    assert!(binder.bus().is_empty());
}

#[test]
fn test_submit_reports_failure() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input(""));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());
    binder
        .on_bind(input, FieldConfig::new("required").submit("go"), None)
        .unwrap();

    assert_eq!(binder.bus().emit("go"), Some(Ok(false)));
    dom.write(|doc| doc.set_value(input, "filled"));
    assert_eq!(binder.bus().emit("go"), Some(Ok(true)));
}

#[test]
fn test_composite_host_update_uses_verify_val() {
    let dom = Dom::new();
    let (registry, seen) = recording();
    let host = mount(&dom, Element::div().class("stars").value("native"));
    let binder = binder_with(&dom, registry);

    binder.on_bind(host, "record", Some("4")).unwrap();
    assert_eq!(dom.read(|doc| doc.attribute(host, VERIFY_VAL).map(str::to_string)), Some("4".to_string()));
    // Change events are not subscribed on composite hosts.
    assert_eq!(dom.listener_count(), 0);

    dom.write(|doc| doc.set_attribute(host, VERIFY_VAL, "5"));
    let passed = binder.on_update(host, "record", Some("5"), Some("4")).unwrap();
    assert_eq!(passed, Some(true));
    assert_eq!(*seen.lock().unwrap(), vec!["5"]);

    // Unchanged value: nothing runs.
    assert_eq!(binder.on_update(host, "record", Some("5"), Some("5")).unwrap(), None);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_update_is_noop_for_form_controls() {
    let dom = Dom::new();
    let (registry, seen) = recording();
    let input = mount(&dom, Element::input("x"));
    let binder = binder_with(&dom, registry);
    binder.on_bind(input, "record", None).unwrap();

    assert_eq!(binder.on_update(input, "record", Some("y"), Some("x")).unwrap(), None);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_update_replaces_options() {
    let dom = Dom::new();
    let host = mount(&dom, Element::div());
    let binder = binder_with(&dom, RuleRegistry::with_builtins());
    binder.on_bind(host, "required", Some("")).unwrap();

    let passed = binder
        .on_update(host, FieldConfig::new("required|min:3").name("Rating"), Some("12"), Some(""))
        .unwrap();
    assert_eq!(passed, Some(false));
    let options = binder.options(host).unwrap();
    assert_eq!(options.rule_string, "required|min:3");
    assert_eq!(options.name, "Rating");
}

#[test]
fn test_empty_rules_fail_bind() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input(""));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());

    let err = binder
        .on_bind(input, FieldConfig::new("").events(["initial"]), None)
        .unwrap_err();
    assert!(matches!(err, VerifyError::Config { .. }));
    assert!(!binder.is_bound(input));
    assert_eq!(dom.listener_count(), 0);
    assert!(binder.presenter().state(input).is_none());
    assert_eq!(dom.read(|doc| doc.children(doc.root()).len()), 1);
}

#[test]
fn test_unknown_rule_surfaces_from_initial_pass() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input("x"));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());

    let err = binder
        .on_bind(input, FieldConfig::new("required|emial").events(["initial", "change"]), None)
        .unwrap_err();
    assert_eq!(err, VerifyError::UnknownRule("emial".to_string()));
    assert!(binder.is_bound(input));

    // Inside a listener the error is logged and the pass abandoned.
    assert_eq!(dom.dispatch(input, "change"), 1);
    assert!(binder.presenter().state(input).is_none());
    assert_eq!(binder.validate_field(input), Err(VerifyError::UnknownRule("emial".to_string())));
}

#[test]
fn test_unbind_removes_listeners_and_message() {
    let dom = Dom::new();
    let field = mount(&dom, Element::div().child(Element::input("")));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());
    binder.on_bind(field, "required", None).unwrap();

    let input = dom.read(|doc| doc.query_selector(field, "input").unwrap());
    dom.input_value(input, "", "change");
    let message = binder.presenter().state(input).and_then(|s| s.instance).unwrap();
    assert!(dom.read(|doc| doc.contains(message)));

    binder.on_unbind(field, "required");
    assert_eq!(dom.listener_count(), 0);
    assert!(!dom.read(|doc| doc.contains(message)));
    assert_eq!(binder.validate_field(field), Ok(None));
}

#[test]
fn test_error_target_hidden_on_bind() {
    let dom = Dom::new();
    let form = mount(
        &dom,
        Element::form()
            .child(Element::div().child(Element::input("").id("email")))
            .child(Element::span().class("email-error")),
    );
    let field = dom.read(|doc| doc.children(form)[0]);
    let error = dom.read(|doc| doc.query_selector(form, ".email-error").unwrap());
    let binder = binder_with(&dom, RuleRegistry::with_builtins());

    binder
        .on_bind(field, FieldConfig::new("required|email").error(".email-error"), None)
        .unwrap();
    assert_eq!(dom.read(|doc| doc.display(error)), Display::None);

    let input = dom.read(|doc| doc.get_element_by_id("email").unwrap());
    dom.input_value(input, "nope", "change");
    assert_eq!(dom.read(|doc| doc.display(error)), Display::Block);
    assert_eq!(
        dom.read(|doc| doc.text_content(error)),
        "This field must be a valid email address"
    );
}

#[test]
fn test_global_messages_override_registry() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input(""));
    let binder = Binder::new(
        dom.clone(),
        RuleRegistry::with_builtins(),
        GlobalConfig::new().message("required", |cx| format!("{} please", cx.label())),
        SubmitBus::new(),
    );
    binder
        .on_bind(input, FieldConfig::new("required").name("Name").events(["initial"]), None)
        .unwrap();

    assert_eq!(binder.presenter().state(input).unwrap().message, "Name please");
}

#[test]
fn test_update_moves_message_to_new_error_target() {
    let dom = Dom::new();
    let form = mount(
        &dom,
        Element::form()
            .child(Element::div().class("stars"))
            .child(Element::span().class("a"))
            .child(Element::span().class("b")),
    );
    let (host, a, b) = dom.read(|doc| {
        let children = doc.children(form);
        (children[0], children[1], children[2])
    });
    let binder = binder_with(&dom, RuleRegistry::with_builtins());
    let first = FieldConfig::new("min:5").name("N").error(".a");
    binder.on_bind(host, first.clone(), Some("")).unwrap();

    binder.on_update(host, first, Some("xy"), Some("")).unwrap();
    assert_eq!(dom.read(|doc| doc.display(a)), Display::Block);

    let second = FieldConfig::new("min:5").name("N").error(".b");
    assert_eq!(binder.on_update(host, second, Some("abc"), Some("xy")), Ok(Some(false)));
    dom.read(|doc| {
        assert_eq!(doc.display(a), Display::None);
        assert_eq!(doc.text_content(a), "");
        assert_eq!(doc.display(b), Display::Block);
        assert_eq!(doc.text_content(b), "N must be at least 5 characters");
    });
}

#[test]
fn test_rebind_releases_previous_submit_id() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input(""));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());

    binder
        .on_bind(input, FieldConfig::new("required").submit("a"), None)
        .unwrap();
    binder
        .on_bind(input, FieldConfig::new("required").submit("b"), None)
        .unwrap();
    assert!(!binder.bus().has_listener("a"));
    assert_eq!(binder.bus().emit("b"), Some(Ok(false)));
    assert_eq!(dom.listener_count(), 1);

    binder.on_unbind(input, "required");
    assert!(binder.bus().is_empty());
}

#[test]
fn test_rebind_with_same_submit_id_keeps_it() {
    let dom = Dom::new();
    let input = mount(&dom, Element::input(""));
    let binder = binder_with(&dom, RuleRegistry::with_builtins());
    let config = FieldConfig::new("required").submit("go");

    binder.on_bind(input, config.clone(), None).unwrap();
    binder.on_bind(input, config, None).unwrap();
    assert!(binder.bus().has_listener("go"));
}

#[test]
fn test_update_moves_submit_subscription() {
    let dom = Dom::new();
    let host = mount(&dom, Element::div());
    let binder = binder_with(&dom, RuleRegistry::with_builtins());

    binder
        .on_bind(host, FieldConfig::new("required").submit("a"), Some("1"))
        .unwrap();
    binder
        .on_update(host, FieldConfig::new("required").submit("b"), Some(""), Some("1"))
        .unwrap();

    assert!(!binder.bus().has_listener("a"));
    assert_eq!(binder.bus().emit("b"), Some(Ok(false)));
}
