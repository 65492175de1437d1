//! stream() - Replacement region.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};

use super::Region;
use crate::error::Result;
use crate::node::{NodeDeclaration, NodeDescriptor, Scope, create_node_descriptors};
use crate::signals::{Event, Stream, Trigger};
use crate::types::NodeKind;

/// Content currently rendered, with the trigger that destroys it.
struct Rendering {
    destroy: Trigger,
    descriptors: Vec<NodeDescriptor>,
}

struct StreamState {
    region: Region,
    scope: Scope,
    current: RefCell<Option<Rendering>>,
}

impl StreamState {
    fn replace(&self, declarations: &[NodeDeclaration]) {
        // 1. FRESH SCOPE - destroyed by the next replacement or our destroy
        let destroy = Trigger::new();
        let child_scope = self.scope.child(&destroy);

        // 2. CREATE NEW CONTENT
        let descriptors = match create_node_descriptors(&child_scope, declarations) {
            Ok(descriptors) => descriptors,
            Err(err) => {
                destroy.fire();
                error!(error = %err, "stream region kept its previous content");
                return;
            }
        };
        let fragment = self.scope.document().create_document_fragment();
        for descriptor in &descriptors {
            descriptor.insert(&fragment, None);
        }

        // 3. TEAR DOWN PREVIOUS RENDERING
        let previous = self.current.replace(Some(Rendering {
            destroy,
            descriptors,
        }));
        if let Some(previous) = previous {
            previous.destroy.fire();
        }

        // 4. SWAP CONTENT
        self.region.clear();
        self.region.insert_content(&fragment);
        debug!(children = declarations.len(), "stream region replaced");
    }
}

// =============================================================================
// Stream Node
// =============================================================================

/// Descriptor for a replacement region.
pub struct StreamNode {
    name: Option<String>,
    state: Rc<StreamState>,
}

impl StreamNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn region(&self) -> &Region {
        &self.state.region
    }

    /// Descriptors of the current rendering.
    pub fn child_descriptors(&self) -> Vec<NodeDescriptor> {
        self.state
            .current
            .borrow()
            .as_ref()
            .map(|rendering| rendering.descriptors.clone())
            .unwrap_or_default()
    }
}

struct StreamArgs {
    name: Option<String>,
    children: Stream<Vec<NodeDeclaration>>,
}

/// Declare a region whose content is replaced by every emission.
///
/// Until the first emission the region holds only its markers.
///
/// # Example
///
/// ```ignore
/// use stream_dom::primitives::{stream, text};
///
/// let page = route.map(|route| match route {
///     Route::Home => vec![home()],
///     Route::NotFound => vec![text("Not found")],
/// });
/// let view = stream(page);
/// ```
pub fn stream(children: Stream<Vec<NodeDeclaration>>) -> NodeDeclaration {
    named_stream(None, children)
}

/// Like [`stream`], with a reference name.
pub fn named_stream(
    name: Option<String>,
    children: Stream<Vec<NodeDeclaration>>,
) -> NodeDeclaration {
    NodeDeclaration::new(
        NodeKind::Stream,
        create_stream_node,
        StreamArgs { name, children },
    )
}

fn create_stream_node(scope: &Scope, args: &StreamArgs) -> Result<NodeDescriptor> {
    let state = Rc::new(StreamState {
        region: Region::new(scope.document()),
        scope: scope.clone(),
        current: RefCell::new(None),
    });

    let observer = Rc::clone(&state);
    args.children
        .until(scope.destroy())
        .observe_events(move |event| match event {
            Event::Next(declarations) => observer.replace(&declarations),
            Event::Error(err) => warn!(error = %err, "stream region source error"),
            Event::End => {}
        });

    Ok(NodeDescriptor::Stream(Rc::new(StreamNode {
        name: args.name.clone(),
        state,
    })))
}

impl From<Stream<Vec<NodeDeclaration>>> for NodeDeclaration {
    fn from(children: Stream<Vec<NodeDeclaration>>) -> Self {
        stream(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Context};
    use crate::primitives::{ElementProps, element, text};
    use crate::signals::Subject;
    use crate::types::Bound;
    use serde_json::json;

    fn setup() -> (Scope, Trigger) {
        let ctx = Context::new(Config::default()).unwrap();
        let destroy = Trigger::new();
        (Scope::new(&ctx, Stream::never(), destroy.signal()), destroy)
    }

    fn markup(descriptor: &NodeDescriptor) -> String {
        descriptor.before_node().parent().unwrap().to_markup()
    }

    #[test]
    fn test_never_emitting_region_holds_only_markers() {
        let (scope, _destroy) = setup();
        let descriptor = stream(Stream::never()).create(&scope).unwrap();
        assert_eq!(markup(&descriptor), "<!----><!---->");
        assert!(descriptor.child_descriptors().is_empty());
    }

    #[test]
    fn test_each_emission_replaces_content() {
        let (scope, _destroy) = setup();
        let children = Subject::new();
        let descriptor = stream(children.stream()).create(&scope).unwrap();

        children.next(vec![text("a"), text("b")]);
        assert_eq!(markup(&descriptor), "<!---->ab<!---->");
        children.next(vec![text("c")]);
        assert_eq!(markup(&descriptor), "<!---->c<!---->");
        children.next(Vec::new());
        assert_eq!(markup(&descriptor), "<!----><!---->");
    }

    #[test]
    fn test_replacement_tears_down_previous_bindings() {
        let (scope, _destroy) = setup();
        let children = Subject::new();
        let class = Subject::new();
        let descriptor = stream(children.stream()).create(&scope).unwrap();

        let bound = Bound::Reactive(class.stream());
        children.next(vec![element("p", ElementProps::default().attr("class", bound))]);
        assert_eq!(class.observer_count(), 1);

        children.next(vec![text("plain")]);
        assert_eq!(class.observer_count(), 0, "old rendering unsubscribed");
        assert_eq!(markup(&descriptor), "<!---->plain<!---->");
        class.next(json!("ignored"));
    }

    #[test]
    fn test_failed_creation_keeps_previous_content() {
        let (scope, _destroy) = setup();
        let children = Subject::new();
        let descriptor = stream(children.stream()).create(&scope).unwrap();

        children.next(vec![text("good")]);
        children.next(vec![text("partial"), element("", ElementProps::default())]);

        assert_eq!(markup(&descriptor), "<!---->good<!---->");
    }

    #[test]
    fn test_destroy_stops_replacement() {
        let (scope, destroy) = setup();
        let children = Subject::new();
        let descriptor = stream(children.stream()).create(&scope).unwrap();

        children.next(vec![text("kept")]);
        destroy.fire();
        children.next(vec![text("late")]);

        assert_eq!(markup(&descriptor), "<!---->kept<!---->");
        assert_eq!(children.observer_count(), 0);
    }

    #[test]
    fn test_stream_converts_into_declaration() {
        let (scope, _destroy) = setup();
        let declaration: NodeDeclaration = Stream::of(vec![text("x")]).into();

        assert_eq!(declaration.kind(), NodeKind::Stream);
        let descriptor = declaration.create(&scope).unwrap();
        assert_eq!(markup(&descriptor), "<!---->x<!---->");
    }
}
