//! Creation-time scope.

use crate::config::Context;
use crate::dom::Document;
use crate::signals::{Scheduler, Stream, Trigger};

/// Inherited state handed to every `create` call.
///
/// - `parent_namespace_uri`: namespace elements inherit when they name none
/// - `mounted`: fires once, replayable, after the content is attached
/// - `destroy`: fires once, terminal; every subscription made while
///   creating a node must end no later than this
#[derive(Debug, Clone)]
pub struct Scope {
    context: Context,
    parent_namespace_uri: String,
    mounted: Stream<()>,
    destroy: Stream<()>,
}

impl Scope {
    /// Root scope in the context's default namespace.
    pub fn new(context: &Context, mounted: Stream<()>, destroy: Stream<()>) -> Self {
        Self {
            parent_namespace_uri: context.default_namespace_uri().to_string(),
            context: context.clone(),
            mounted,
            destroy,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn document(&self) -> &Document {
        self.context.document()
    }

    pub fn scheduler(&self) -> &Scheduler {
        self.context.scheduler()
    }

    pub fn parent_namespace_uri(&self) -> &str {
        &self.parent_namespace_uri
    }

    pub fn mounted(&self) -> &Stream<()> {
        &self.mounted
    }

    pub fn destroy(&self) -> &Stream<()> {
        &self.destroy
    }

    /// Same scope, children inheriting `namespace_uri`.
    pub fn with_namespace_uri(&self, namespace_uri: &str) -> Self {
        Self {
            parent_namespace_uri: namespace_uri.to_string(),
            ..self.clone()
        }
    }

    /// Scope for a destroyable child region.
    ///
    /// Its destroy fires on whichever comes first: `trigger` or this
    /// scope's destroy. Its mounted signal is delivered through the
    /// scheduler, so content created after the first mount still sees it
    /// only once it has been inserted.
    pub fn child(&self, trigger: &Trigger) -> Self {
        Self {
            context: self.context.clone(),
            parent_namespace_uri: self.parent_namespace_uri.clone(),
            mounted: self.mounted.defer(self.context.scheduler()),
            destroy: self.destroy.merge(&trigger.signal()).take(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::cell::Cell;
    use std::rc::Rc;

    fn root() -> (Scope, Trigger, Trigger) {
        let ctx = Context::new(Config::default()).unwrap();
        let mounted = Trigger::new();
        let destroy = Trigger::new();
        (
            Scope::new(&ctx, mounted.signal(), destroy.signal()),
            mounted,
            destroy,
        )
    }

    fn counter(stream: &Stream<()>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        stream.observe(move |_| count_clone.set(count_clone.get() + 1));
        count
    }

    #[test]
    fn test_child_destroy_fires_on_own_trigger() {
        let (scope, _, parent) = root();
        let own = Trigger::new();
        let count = counter(scope.child(&own).destroy());

        own.fire();
        parent.fire();
        assert_eq!(count.get(), 1, "child destroy fires once");
    }

    #[test]
    fn test_child_destroy_fires_on_parent() {
        let (scope, _, parent) = root();
        let own = Trigger::new();
        let child = scope.child(&own);
        let count = counter(child.destroy());

        parent.fire();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_child_mounted_is_deferred() {
        let (scope, mounted, _) = root();
        mounted.fire();
        let count = counter(scope.child(&Trigger::new()).mounted());

        assert_eq!(count.get(), 0);
        scope.scheduler().run_pending();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_namespace_override() {
        let (scope, _, _) = root();
        let svg = scope.with_namespace_uri(crate::config::SVG_NAMESPACE_URI);

        assert_eq!(svg.parent_namespace_uri(), crate::config::SVG_NAMESPACE_URI);
        assert_eq!(scope.parent_namespace_uri(), crate::config::HTML_NAMESPACE_URI);
    }
}
