use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use formdom::{Display, Dom, Element, NodeId};
use verify::presenter::{InlineMessage, RenderRequest, Surface, Tooltip};
use verify::{DisplayMode, FieldOptions, GlobalConfig, Presenter, RuleCache, RuleConfig};

/// Counts render calls, then delegates to the default inline message.
#[derive(Clone, Default)]
struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Surface for Counting {
    fn render(&self, dom: &Dom, request: &RenderRequest<'_>) -> Option<NodeId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        InlineMessage::default().render(dom, request)
    }
}

fn options(dom: &Dom, el: NodeId, config: impl Into<RuleConfig>) -> FieldOptions {
    dom.read(|doc| {
        FieldOptions::build(doc, el, &config.into(), &GlobalConfig::new(), &RuleCache::new())
    })
    .unwrap()
}

fn field(dom: &Dom) -> NodeId {
    dom.write(|doc| doc.append(doc.root(), Element::div().child(Element::input(""))))
}

#[test]
fn test_present_twice_renders_once() {
    let dom = Dom::new();
    let el = field(&dom);
    let surface = Counting::default();
    let presenter = Presenter::with_surfaces(dom.clone(), surface.clone(), Tooltip::default());
    let options = options(&dom, el, verify::FieldConfig::new("required").style("bad"));

    presenter.present(&options, true, "Required");
    let mutations = dom.read(|doc| doc.mutations());
    presenter.present(&options, true, "Required");

    assert_eq!(surface.calls.load(Ordering::SeqCst), 1);
    assert_eq!(dom.read(|doc| doc.mutations()), mutations);
}

#[test]
fn test_flag_change_with_same_message_renders() {
    let dom = Dom::new();
    let el = field(&dom);
    let surface = Counting::default();
    let presenter = Presenter::with_surfaces(dom.clone(), surface.clone(), Tooltip::default());
    let options = options(&dom, el, "required");

    // A field whose template is empty: fail, then pass, both with "".
    presenter.present(&options, true, "");
    presenter.present(&options, false, "");
    assert_eq!(surface.calls.load(Ordering::SeqCst), 2);
    assert!(!presenter.state(options.input).unwrap().failed);
}

#[test]
fn test_insert_mode_lifecycle() {
    let dom = Dom::new();
    let el = field(&dom);
    let presenter = Presenter::new(dom.clone());
    let options = options(&dom, el, "required");

    presenter.present(&options, true, "First");
    let node = presenter.state(options.input).unwrap().instance.unwrap();
    dom.read(|doc| {
        assert_eq!(doc.parent(node), doc.parent(el));
        assert_eq!(doc.text_content(node), "First");
        assert!(doc.has_class(node, "verify-message"));
    });

    presenter.present(&options, true, "Second");
    assert_eq!(presenter.state(options.input).unwrap().instance, Some(node));
    assert_eq!(dom.read(|doc| doc.text_content(node)), "Second");

    presenter.present(&options, false, "");
    assert_eq!(presenter.state(options.input).unwrap().instance, None);
    assert!(!dom.read(|doc| doc.contains(node)));

    // Re-created lazily.
    presenter.present(&options, true, "Third");
    let again = presenter.state(options.input).unwrap().instance.unwrap();
    assert_ne!(again, node);
}

#[test]
fn test_tip_mode_carries_remove_flag() {
    let dom = Dom::new();
    let el = field(&dom);
    let presenter = Presenter::new(dom.clone());
    let options = options(&dom, el, verify::FieldConfig::new("required").mode("tip"));
    assert_eq!(options.mode, DisplayMode::Tip);

    presenter.present(&options, true, "Oops");
    let tip = presenter.state(options.input).unwrap().instance.unwrap();
    dom.read(|doc| {
        assert_eq!(doc.parent(tip), Some(el));
        assert_eq!(doc.attribute(tip, "data-verify-remove"), Some("false"));
        assert!(doc.has_class(tip, "verify-tip"));
    });

    // Passing keeps the tip and flags it for the host to animate out.
    presenter.present(&options, false, "");
    assert_eq!(presenter.state(options.input).unwrap().instance, Some(tip));
    dom.read(|doc| {
        assert!(doc.contains(tip));
        assert_eq!(doc.attribute(tip, "data-verify-remove"), Some("true"));
        assert_eq!(doc.text_content(tip), "Oops");
    });

    presenter.present(&options, true, "Again");
    dom.read(|doc| {
        assert_eq!(doc.attribute(tip, "data-verify-remove"), Some("false"));
        assert_eq!(doc.text_content(tip), "Again");
    });

    presenter.clear(&options);
    assert!(!dom.read(|doc| doc.contains(tip)));
}

#[test]
fn test_tip_pass_without_tip_shows_nothing() {
    let dom = Dom::new();
    let el = field(&dom);
    let presenter = Presenter::new(dom.clone());
    let options = options(&dom, el, verify::FieldConfig::new("required").mode("tip"));

    presenter.present(&options, false, "");
    assert_eq!(presenter.state(options.input).unwrap().instance, None);
    assert_eq!(dom.read(|doc| doc.children(el).len()), 1);
}

#[test]
fn test_mode_switch_retires_previous_node() {
    let dom = Dom::new();
    let el = field(&dom);
    let presenter = Presenter::new(dom.clone());

    let inline = options(&dom, el, "required");
    presenter.present(&inline, true, "Bad");
    let first = presenter.state(inline.input).unwrap().instance.unwrap();

    // Same flag and message, but another surface: must render again.
    let tip = options(&dom, el, verify::FieldConfig::new("required").mode("tip"));
    presenter.present(&tip, true, "Bad");
    let second = presenter.state(tip.input).unwrap().instance.unwrap();

    assert_ne!(first, second);
    dom.read(|doc| {
        assert!(!doc.contains(first));
        assert_eq!(doc.parent(second), Some(el));
        assert!(doc.has_class(second, "verify-tip"));
    });
    assert_eq!(presenter.state(tip.input).unwrap().mode, DisplayMode::Tip);
}

#[test]
fn test_fields_sharing_an_error_target_share_its_text() {
    let dom = Dom::new();
    let form = dom.write(|doc| {
        doc.append(
            doc.root(),
            Element::form()
                .child(Element::div().child(Element::input("")))
                .child(Element::div().child(Element::input("")))
                .child(Element::span().class("err")),
        )
    });
    let (first, second, err) = dom.read(|doc| {
        let children = doc.children(form);
        (children[0], children[1], children[2])
    });
    let presenter = Presenter::new(dom.clone());
    let a = options(&dom, first, verify::FieldConfig::new("required").error(".err"));
    let b = options(&dom, second, verify::FieldConfig::new("required").error(".err"));

    presenter.present(&a, true, "First is bad");
    presenter.present(&b, true, "Second is bad");
    dom.read(|doc| {
        assert_eq!(doc.children(err).len(), 1);
        assert_eq!(doc.text_content(err), "Second is bad");
    });
    assert_eq!(
        presenter.state(a.input).unwrap().instance,
        presenter.state(b.input).unwrap().instance
    );

    // Moving the first field elsewhere leaves the text the second one uses.
    let a_inline = options(&dom, first, "required");
    presenter.present(&a_inline, true, "First is bad");
    dom.read(|doc| {
        assert_eq!(doc.text_content(err), "Second is bad");
        assert_eq!(doc.display(err), Display::Block);
    });
}

#[test]
fn test_target_mode_reuses_text_node() {
    let dom = Dom::new();
    let form = dom.write(|doc| {
        doc.append(
            doc.root(),
            Element::form()
                .child(Element::div().child(Element::input("")))
                .child(Element::span().class("err").child(Element::text("static"))),
        )
    });
    let (el, err) = dom.read(|doc| (doc.children(form)[0], doc.children(form)[1]));
    let presenter = Presenter::new(dom.clone());
    let options = options(&dom, el, verify::FieldConfig::new("required").error(".err"));

    presenter.present(&options, true, "Bad");
    let text = presenter.state(options.input).unwrap().instance.unwrap();
    dom.read(|doc| {
        assert_eq!(doc.display(err), Display::Block);
        assert_eq!(doc.text(text), Some("Bad"));
        assert_eq!(doc.parent(text), Some(err));
        assert_eq!(doc.text_content(err), "staticBad");
    });

    presenter.present(&options, false, "");
    dom.read(|doc| {
        assert_eq!(doc.display(err), Display::None);
        assert_eq!(doc.text(text), Some(""));
    });
    assert_eq!(presenter.state(options.input).unwrap().instance, Some(text));
    assert_eq!(dom.read(|doc| doc.children(err).len()), 2);
}

#[test]
fn test_target_mode_without_element_only_toggles_class() {
    let dom = Dom::new();
    let el = field(&dom);
    let presenter = Presenter::new(dom.clone());
    let options = options(
        &dom,
        el,
        verify::FieldConfig::new("required").error("#nowhere").style("bad"),
    );
    assert_eq!(options.error, None);

    presenter.present(&options, true, "Bad");
    assert!(presenter.state(options.input).is_none());
    assert!(dom.read(|doc| doc.has_class(el, "bad")));
}
