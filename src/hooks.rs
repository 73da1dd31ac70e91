//! Build lifecycle hooks and template extensions.
//!
//! A [`HookRegistry`] is assembled by the caller and handed to
//! [`crate::pipeline::build`]. Handlers observe the run at fixed points:
//!
//! | Hook                 | Payload                     | Scope |
//! |----------------------|-----------------------------|-------|
//! | `config_loaded`      | site config                 | run   |
//! | `sources_discovered` | every discovered item       | run   |
//! | `item_parsed`        | one item                    | item  |
//! | `pre_render`         | item + template name        | item  |
//! | `post_render`        | item + rendered HTML        | item  |
//! | `post_build`         | build result                | run   |
//!
//! Handlers run synchronously in registration order. A failing handler does
//! not stop the handlers after it; every failure is returned from
//! [`HookRegistry::emit`] for the pipeline to record.
//!
//! The registry also carries template filters and globals, which the
//! renderer installs into its Tera engine.

use crate::config::SiteConfig;
use crate::pipeline::BuildResult;
use crate::types::ContentItem;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tera::Value;

/// Lifecycle points a handler can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hook {
    ConfigLoaded,
    SourcesDiscovered,
    ItemParsed,
    PreRender,
    PostRender,
    PostBuild,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::ConfigLoaded => "config_loaded",
            Hook::SourcesDiscovered => "sources_discovered",
            Hook::ItemParsed => "item_parsed",
            Hook::PreRender => "pre_render",
            Hook::PostRender => "post_render",
            Hook::PostBuild => "post_build",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload delivered to handlers.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    ConfigLoaded { config: &'a SiteConfig },
    SourcesDiscovered { items: &'a [ContentItem] },
    ItemParsed { item: &'a ContentItem },
    PreRender { item: &'a ContentItem, template: &'a str },
    PostRender { item: &'a ContentItem, html: &'a str },
    PostBuild { result: &'a BuildResult },
}

impl HookEvent<'_> {
    pub fn hook(&self) -> Hook {
        match self {
            HookEvent::ConfigLoaded { .. } => Hook::ConfigLoaded,
            HookEvent::SourcesDiscovered { .. } => Hook::SourcesDiscovered,
            HookEvent::ItemParsed { .. } => Hook::ItemParsed,
            HookEvent::PreRender { .. } => Hook::PreRender,
            HookEvent::PostRender { .. } => Hook::PostRender,
            HookEvent::PostBuild { .. } => Hook::PostBuild,
        }
    }
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type Handler = Box<dyn Fn(&HookEvent<'_>) -> Result<(), HandlerError>>;

/// Template filter with Tera's filter signature.
pub type Filter =
    Arc<dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// One handler that returned an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub hook: Hook,
    pub message: String,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook {}: {}", self.hook, self.message)
    }
}

#[derive(Default)]
pub struct HookRegistry {
    handlers: BTreeMap<Hook, Vec<Handler>>,
    filters: BTreeMap<String, Filter>,
    globals: BTreeMap<String, Value>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, hook: Hook, handler: F)
    where
        F: Fn(&HookEvent<'_>) -> Result<(), HandlerError> + 'static,
    {
        self.handlers.entry(hook).or_default().push(Box::new(handler));
    }

    pub fn add_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    /// Run every handler for the event's hook, collecting failures.
    pub fn emit(&self, event: &HookEvent<'_>) -> Vec<HookFailure> {
        let hook = event.hook();
        let Some(handlers) = self.handlers.get(&hook) else {
            return Vec::new();
        };
        handlers
            .iter()
            .filter_map(|handler| handler(event).err())
            .map(|e| HookFailure {
                hook,
                message: e.to_string(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn handler_count(&self, hook: Hook) -> usize {
        self.handlers.get(&hook).map_or(0, Vec::len)
    }

    pub fn filters(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(name, f)| (name.as_str(), f))
    }

    pub fn globals(&self) -> &BTreeMap<String, Value> {
        &self.globals
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: BTreeMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(hook, hs)| (hook.name(), hs.len()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("handlers", &handlers)
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("globals", &self.globals)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = HookRegistry::new();
        for n in 1..=3 {
            let calls = Rc::clone(&calls);
            hooks.register(Hook::ConfigLoaded, move |_| {
                calls.borrow_mut().push(n);
                Ok(())
            });
        }
        let config = SiteConfig::default();
        let failures = hooks.emit(&HookEvent::ConfigLoaded { config: &config });
        assert!(failures.is_empty());
        assert_eq!(*calls.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn failure_does_not_stop_later_handlers() {
        let ran = Rc::new(RefCell::new(false));
        let mut hooks = HookRegistry::new();
        hooks.register(Hook::SourcesDiscovered, |_| Err("boom".into()));
        let r = Rc::clone(&ran);
        hooks.register(Hook::SourcesDiscovered, move |_| {
            *r.borrow_mut() = true;
            Ok(())
        });
        let failures = hooks.emit(&HookEvent::SourcesDiscovered { items: &[] });
        assert_eq!(
            failures,
            vec![HookFailure {
                hook: Hook::SourcesDiscovered,
                message: "boom".into(),
            }]
        );
        assert!(*ran.borrow());
        assert_eq!(failures[0].to_string(), "hook sources_discovered: boom");
    }

    #[test]
    fn only_matching_hook_runs() {
        let count = Rc::new(RefCell::new(0));
        let mut hooks = HookRegistry::new();
        let c = Rc::clone(&count);
        hooks.register(Hook::PostBuild, move |_| {
            *c.borrow_mut() += 1;
            Ok(())
        });
        hooks.emit(&HookEvent::SourcesDiscovered { items: &[] });
        assert_eq!(*count.borrow(), 0);
        hooks.emit(&HookEvent::PostBuild {
            result: &BuildResult::default(),
        });
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn payload_is_visible_to_handler() {
        let seen = Rc::new(RefCell::new(String::new()));
        let mut hooks = HookRegistry::new();
        let s = Rc::clone(&seen);
        hooks.register(Hook::ConfigLoaded, move |event| {
            if let HookEvent::ConfigLoaded { config } = event {
                *s.borrow_mut() = config.site.title.clone();
            }
            Ok(())
        });
        let config = SiteConfig::default();
        hooks.emit(&HookEvent::ConfigLoaded { config: &config });
        assert_eq!(*seen.borrow(), "My Site");
    }

    #[test]
    fn handler_count_per_hook() {
        let mut hooks = HookRegistry::new();
        hooks.register(Hook::PreRender, |_| Ok(()));
        hooks.register(Hook::PreRender, |_| Ok(()));
        assert_eq!(hooks.handler_count(Hook::PreRender), 2);
        assert_eq!(hooks.handler_count(Hook::PostRender), 0);
    }

    #[test]
    fn filters_and_globals_are_stored() {
        let mut hooks = HookRegistry::new();
        hooks.add_filter("noop", |v: &Value, _: &HashMap<String, Value>| Ok(v.clone()));
        hooks.add_global("year", 2024);
        let names: Vec<&str> = hooks.filters().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["noop"]);
        assert_eq!(hooks.globals()["year"], Value::from(2024));
    }

    #[test]
    fn hook_names() {
        assert_eq!(Hook::ConfigLoaded.name(), "config_loaded");
        assert_eq!(Hook::SourcesDiscovered.name(), "sources_discovered");
        assert_eq!(Hook::ItemParsed.name(), "item_parsed");
        assert_eq!(Hook::PreRender.name(), "pre_render");
        assert_eq!(Hook::PostRender.name(), "post_render");
        assert_eq!(Hook::PostBuild.name(), "post_build");
    }
}
