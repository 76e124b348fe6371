use std::fs::File;

use formdom::{Dom, Element, NodeId};
use simplelog::{Config, LevelFilter, WriteLogger};
use verify::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up file logging
    let log_file = File::create("signup.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let dom = Dom::new();
    let (name, email, password, rating) = dom.write(|doc| {
        let form = doc.append(doc.root(), form());
        let fields = doc.children(form).to_vec();
        (fields[0], fields[1], fields[2], fields[3])
    });

    let binder = Binder::new(
        dom.clone(),
        RuleRegistry::with_builtins().rule("strong", |value, _| {
            value.chars().any(|c| c.is_ascii_digit()) && value.chars().any(char::is_alphabetic)
        }),
        GlobalConfig::new().error_class("has-error"),
        SubmitBus::new(),
    );

    // Shorthand: options come from data-verify-* attributes.
    binder.on_bind(name, "required|min:2", None)?;

    // Object form, as a template would pass it.
    let email_config: RuleConfig = serde_json::from_str(
        r##"{ "regs": "required|email", "name": "Email", "error": "#email-error", "submit": "signup" }"##,
    )?;
    binder.on_bind(email, email_config, None)?;

    binder.on_bind(
        password,
        FieldConfig::new("required|min:8|strong")
            .name("Password")
            .mode("tip")
            .submit("signup")
            .events(["input"]),
        None,
    )?;
    binder.on_bind(rating, FieldConfig::new("required|number|lt:6"), Some(""))?;

    type_into(&dom, name, "A", "change");
    type_into(&dom, email, "someone@", "change");
    type_into(&dom, password, "hunter22", "input");
    binder.on_update(rating, FieldConfig::new("required|number|lt:6"), Some("9"), Some(""))?;

    println!("submit: {:?}", binder.bus().emit("signup"));
    print_state(&binder, &dom);

    type_into(&dom, email, "someone@example.com", "change");
    println!("submit: {:?}", binder.bus().emit("signup"));
    print_state(&binder, &dom);

    Ok(())
}

fn form() -> Element {
    Element::form()
        .child(
            Element::div()
                .class("field")
                .data("verify-name", "Name")
                .data("verify-submit", "signup")
                .child(Element::input("").id("name")),
        )
        .child(Element::div().class("field").child(Element::input("").id("email")))
        .child(Element::div().class("field").child(Element::input("").id("password")))
        .child(Element::div().class("stars").id("rating"))
        .child(Element::span().id("email-error"))
        .child(Element::button().id("signup").child(Element::text("Sign up")))
}

/// Set the value of the input inside `field` and fire `event` on it.
fn type_into(dom: &Dom, field: NodeId, value: &str, event: &str) {
    let Some(input) = dom.read(|doc| doc.query_selector(field, "input")) else {
        return;
    };
    dom.input_value(input, value, event);
}

fn print_state(binder: &Binder, dom: &Dom) {
    dom.read(|doc| {
        for node in doc.query_selector_all(doc.root(), "input") {
            let Some(state) = binder.presenter().state(node) else {
                continue;
            };
            println!(
                "  #{}: failed={} message={:?}",
                doc.attribute(node, "id").unwrap_or("?"),
                state.failed,
                state.message
            );
        }
    });
}
