//! Lifecycle hooks that attach validation to document elements.
//!
//! A [`Binder`] is created once per document with the rule registry, the
//! global config and the submit bus. Hosts call [`Binder::on_bind`],
//! [`Binder::on_update`] and [`Binder::on_unbind`] from their own element
//! lifecycle.

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, RwLock, Weak};

use formdom::{Display, Dom, Event, Handler, ListenerId, NodeId};

use crate::bus::SubmitBus;
use crate::config::GlobalConfig;
use crate::engine::{self, Outcome};
use crate::error::Result;
use crate::lookup::{self, VERIFY_VAL};
use crate::options::{FieldOptions, RuleConfig, Trigger};
use crate::parser::RuleCache;
use crate::presenter::Presenter;
use crate::rules::RuleRegistry;

struct Binding {
    options: FieldOptions,
    listeners: Vec<ListenerId>,
}

struct BinderInner {
    dom: Dom,
    registry: RuleRegistry,
    config: GlobalConfig,
    bus: SubmitBus,
    cache: RuleCache,
    presenter: Presenter,
    bindings: RwLock<HashMap<NodeId, Binding>>,
}

/// Cheap-to-clone handle; listeners registered by the binder hold only a
/// weak reference to it.
#[derive(Clone)]
pub struct Binder {
    inner: Arc<BinderInner>,
}

impl Binder {
    /// Create a binder. Message templates from `config` override those of
    /// `registry`.
    pub fn new(dom: Dom, registry: RuleRegistry, config: GlobalConfig, bus: SubmitBus) -> Self {
        let presenter = Presenter::new(dom.clone());
        Self::with_presenter(dom, registry, config, bus, presenter)
    }

    /// Like [`new`](Self::new) with a custom presenter.
    pub fn with_presenter(
        dom: Dom,
        mut registry: RuleRegistry,
        config: GlobalConfig,
        bus: SubmitBus,
        presenter: Presenter,
    ) -> Self {
        for (rule, template) in &config.messages {
            registry.set_message_fn(rule.clone(), Arc::clone(template));
        }
        Self {
            inner: Arc::new(BinderInner {
                dom,
                registry,
                config,
                bus,
                cache: RuleCache::new(),
                presenter,
                bindings: RwLock::default(),
            }),
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.inner.dom
    }

    pub fn bus(&self) -> &SubmitBus {
        &self.inner.bus
    }

    pub fn presenter(&self) -> &Presenter {
        &self.inner.presenter
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.inner.registry
    }

    pub fn is_bound(&self, element: NodeId) -> bool {
        self.inner
            .bindings
            .read()
            .map(|b| b.contains_key(&element))
            .unwrap_or(false)
    }

    /// Current options of a bound element.
    pub fn options(&self, element: NodeId) -> Option<FieldOptions> {
        self.inner.options(element)
    }

    /// Attach validation to `element`.
    ///
    /// Fails without binding anything when the rule string is invalid. An
    /// `initial` trigger validates immediately and its error, if any, is
    /// returned; the binding stays in place. Binding an element again
    /// replaces its listeners and releases a submit id it no longer names.
    pub fn on_bind(
        &self,
        element: NodeId,
        config: impl Into<RuleConfig>,
        initial_value: Option<&str>,
    ) -> Result<()> {
        let config = config.into();
        let options = self.inner.build_options(element, &config)?;

        self.inner.dom.write(|doc| {
            if !options.is_form_control {
                set_verify_val(doc, element, initial_value);
            }
            if let Some(error) = options.error {
                doc.set_display(error, Display::None);
            }
        });

        if let Some(id) = &options.submit {
            self.subscribe_submit(element, id);
        }

        let mut listeners = Vec::new();
        let mut run_initial = false;
        for trigger in &options.triggers {
            match trigger {
                Trigger::Initial => run_initial = true,
                Trigger::Event(name) if options.is_form_control => {
                    let handler = change_handler(Arc::downgrade(&self.inner), element);
                    listeners.push(self.inner.dom.add_listener(options.input, name, handler));
                }
                Trigger::Event(name) => {
                    log::trace!("{element:?} is not a form control, '{name}' not subscribed");
                }
            }
        }

        log::debug!(
            "bound {element:?} with '{}' ({} listeners)",
            options.rule_string,
            listeners.len()
        );
        let submit = options.submit.clone();
        let stale = self
            .inner
            .bindings
            .write()
            .ok()
            .and_then(|mut bindings| bindings.insert(element, Binding { options, listeners }));
        if let Some(stale) = stale {
            log::warn!("{element:?} was already bound, previous listeners removed");
            for id in stale.listeners {
                self.inner.dom.remove_listener(id);
            }
            if let Some(old) = stale.options.submit.filter(|old| Some(old) != submit.as_ref()) {
                self.inner.bus.unsubscribe(&old);
            }
        }

        if run_initial {
            self.inner.run(element)?;
        }
        Ok(())
    }

    /// React to a change of the bound value.
    ///
    /// Only composite hosts (not form controls) are revalidated, and only
    /// when the value changed. Returns whether the pass succeeded, or `None`
    /// when nothing ran.
    pub fn on_update(
        &self,
        element: NodeId,
        config: impl Into<RuleConfig>,
        new_value: Option<&str>,
        old_value: Option<&str>,
    ) -> Result<Option<bool>> {
        let is_form = self
            .inner
            .dom
            .read(|doc| lookup::is_form_control(doc, element));
        if is_form || new_value == old_value {
            return Ok(None);
        }

        let options = self.inner.build_options(element, &config.into())?;
        self.inner
            .dom
            .write(|doc| set_verify_val(doc, element, new_value));

        let previous = self.inner.bindings.write().ok().and_then(|mut bindings| {
            match bindings.get_mut(&element) {
                Some(binding) => Some(mem::replace(&mut binding.options, options.clone())),
                None => {
                    bindings.insert(
                        element,
                        Binding {
                            options: options.clone(),
                            listeners: Vec::new(),
                        },
                    );
                    None
                }
            }
        });
        let old_submit = previous.and_then(|p| p.submit);
        if old_submit != options.submit {
            if let Some(old) = &old_submit {
                self.inner.bus.unsubscribe(old);
            }
            if let Some(id) = &options.submit {
                self.subscribe_submit(element, id);
            }
        }

        let value = self
            .inner
            .dom
            .read(|doc| lookup::effective_value(doc, options.input));
        self.inner.pass(&options, &value).map(Some)
    }

    /// Detach validation from `element`.
    ///
    /// Releases the submit trigger the field names (a no-op when it is
    /// already gone), removes the field's listeners and its message node.
    pub fn on_unbind(&self, element: NodeId, config: impl Into<RuleConfig>) {
        let binding = self
            .inner
            .bindings
            .write()
            .ok()
            .and_then(|mut bindings| bindings.remove(&element));

        let submit = match &binding {
            Some(binding) => binding.options.submit.clone(),
            None => {
                let config = config.into();
                self.inner.dom.read(|doc| config.submit(doc, element))
            }
        };
        if let Some(id) = submit {
            self.inner.bus.unsubscribe(&id);
        }

        if let Some(binding) = binding {
            for id in binding.listeners {
                self.inner.dom.remove_listener(id);
            }
            self.inner.presenter.clear(&binding.options);
        }
        log::debug!("unbound {element:?}");
    }

    /// Subscribe `id` on the bus to validate `element`, unless the id is
    /// already taken.
    fn subscribe_submit(&self, element: NodeId, id: &str) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.bus.subscribe_once(id, move || {
            let Some(inner) = weak.upgrade() else {
                return Ok(true);
            };
            inner.run(element).map(|passed| passed.unwrap_or(true))
        });
    }

    /// Validate a bound element now, using its current value.
    ///
    /// Returns `None` when `element` is not bound.
    pub fn validate_field(&self, element: NodeId) -> Result<Option<bool>> {
        self.inner.run(element)
    }
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.bindings.read().map(|b| b.len()).unwrap_or(0);
        f.debug_struct("Binder")
            .field("binding_count", &count)
            .field("bus", &self.inner.bus)
            .field("cache", &self.inner.cache)
            .finish()
    }
}

impl BinderInner {
    fn build_options(&self, element: NodeId, config: &RuleConfig) -> Result<FieldOptions> {
        self.dom.read(|doc| {
            FieldOptions::build(doc, element, config, &self.config, &self.cache)
        })
    }

    fn options(&self, element: NodeId) -> Option<FieldOptions> {
        self.bindings
            .read()
            .ok()?
            .get(&element)
            .map(|b| b.options.clone())
    }

    /// Validate `element` with its effective value.
    fn run(&self, element: NodeId) -> Result<Option<bool>> {
        let Some(options) = self.options(element) else {
            log::debug!("{element:?} is not bound, nothing to validate");
            return Ok(None);
        };
        let value = self
            .dom
            .read(|doc| lookup::effective_value(doc, options.input));
        self.pass(&options, &value).map(Some)
    }

    /// One full pass: evaluate, then present.
    fn pass(&self, options: &FieldOptions, value: &str) -> Result<bool> {
        let outcome: Outcome =
            engine::evaluate(value, &options.rules, &self.registry, &options.name)?;
        self.presenter.apply(options, &outcome);
        Ok(outcome.passed)
    }
}

/// Listener for a trigger event on a form control. It validates the value
/// carried by the event.
fn change_handler(weak: Weak<BinderInner>, element: NodeId) -> Handler {
    Arc::new(move |event: &Event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Some(options) = inner.options(element) else {
            return;
        };
        if let Err(e) = inner.pass(&options, &event.value) {
            log::error!("validation on '{}' for {element:?} failed: {e}", event.name);
        }
    })
}

fn set_verify_val(doc: &mut formdom::Document, element: NodeId, value: Option<&str>) {
    match value {
        Some(value) => doc.set_attribute(element, VERIFY_VAL, value),
        None => doc.remove_attribute(element, VERIFY_VAL),
    };
}
