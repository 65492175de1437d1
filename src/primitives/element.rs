//! Element Primitive - A namespaced element with attributes, properties and
//! children.
//!
//! # Reactivity
//!
//! Attribute and property values are [`Bound`]: constants are applied once,
//! streams re-apply on every distinct emission until the element's scope is
//! destroyed.
//!
//! # Example
//!
//! ```ignore
//! use stream_dom::primitives::{element, text, ElementProps};
//! use stream_dom::types::Bound;
//!
//! let checked = Subject::replaying();
//!
//! let input = element("input", ElementProps::default()
//!     .attr("type", "checkbox")
//!     .attr("checked", Bound::Reactive(checked.stream()))
//!     .named("toggle"));
//!
//! let icon = element("svg", ElementProps::default()
//!     .namespace("svg")
//!     .child(element("use", ElementProps::default()
//!         .attr_ns("xlink", "href", "#check"))));
//!
//! // Later: flip the attribute on and off
//! checked.next(Value::Bool(true));
//! checked.next(Value::Bool(false));
//! ```

use std::rc::Rc;

use crate::dom::DomNode;
use crate::error::{Error, Result};
use crate::node::{NodeDeclaration, NodeDescriptor, Scope, create_node_descriptors};
use crate::types::{Bound, NodeKind, Value};

// =============================================================================
// Props
// =============================================================================

/// One attribute binding.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Namespace *name*, resolved through the context's namespace table.
    pub namespace: Option<String>,
    pub name: String,
    pub value: Bound<Value>,
}

/// One property binding.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: Bound<Value>,
}

/// Properties for an element declaration.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    /// Reference name collected by an enclosing component.
    pub name: Option<String>,

    /// Namespace *name* for the element; inherited from the scope when unset.
    pub namespace: Option<String>,

    pub attributes: Vec<Attribute>,

    pub properties: Vec<Property>,

    pub children: Vec<NodeDeclaration>,
}

impl ElementProps {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Bound<Value>>) -> Self {
        self.attributes.push(Attribute {
            namespace: None,
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn attr_ns(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Bound<Value>>,
    ) -> Self {
        self.attributes.push(Attribute {
            namespace: Some(namespace.into()),
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Bound<Value>>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn child(mut self, child: impl Into<NodeDeclaration>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeDeclaration>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

struct ElementArgs {
    tag: String,
    props: ElementProps,
}

// =============================================================================
// Element Node
// =============================================================================

/// Descriptor for an element.
#[derive(Debug)]
pub struct ElementNode {
    name: Option<String>,
    node: DomNode,
    children: Vec<NodeDescriptor>,
}

impl ElementNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn node(&self) -> &DomNode {
        &self.node
    }

    pub fn children(&self) -> &[NodeDescriptor] {
        &self.children
    }
}

/// Declare an element.
pub fn element(tag: impl Into<String>, props: ElementProps) -> NodeDeclaration {
    NodeDeclaration::new(
        NodeKind::Element,
        create_element_node,
        ElementArgs {
            tag: tag.into(),
            props,
        },
    )
}

fn create_element_node(scope: &Scope, args: &ElementArgs) -> Result<NodeDescriptor> {
    let props = &args.props;

    // 1. VALIDATE
    if args.tag.is_empty() {
        return Err(Error::EmptyTagName);
    }

    // 2. RESOLVE NAMESPACE - explicit name, else inherited
    let namespace_uri = match &props.namespace {
        Some(name) => scope.context().resolve_namespace_uri(name)?,
        None => scope.parent_namespace_uri().to_string(),
    };

    // 3. CREATE NODE
    let node = scope.document().create_element_ns(&namespace_uri, &args.tag);

    // 4. BIND ATTRIBUTES
    for attribute in &props.attributes {
        let attribute_namespace = attribute
            .namespace
            .as_deref()
            .map(|name| scope.context().resolve_namespace_uri(name))
            .transpose()?;
        let target = node.clone();
        let name = attribute.name.clone();
        attribute.value.bind(scope.destroy(), move |value| {
            apply_attribute(&target, attribute_namespace.as_deref(), &name, &value);
        });
    }

    // 5. BIND PROPERTIES
    for property in &props.properties {
        let target = node.clone();
        let name = property.name.clone();
        property
            .value
            .bind(scope.destroy(), move |value| target.set_property(&name, value));
    }

    // 6. CHILDREN - created in this element's namespace, appended once
    let child_scope = if namespace_uri == scope.parent_namespace_uri() {
        scope.clone()
    } else {
        scope.with_namespace_uri(&namespace_uri)
    };
    let children = create_node_descriptors(&child_scope, &props.children)?;
    if !children.is_empty() {
        let fragment = scope.document().create_document_fragment();
        for child in &children {
            child.insert(&fragment, None);
        }
        node.append_child(&fragment);
    }

    Ok(NodeDescriptor::Element(Rc::new(ElementNode {
        name: props.name.clone(),
        node,
        children,
    })))
}

/// Booleans toggle presence; null removes; anything else is written as text.
fn apply_attribute(node: &DomNode, namespace: Option<&str>, name: &str, value: &Value) {
    match value {
        Value::Bool(true) => node.set_attribute(namespace, name, ""),
        Value::Bool(false) | Value::Null => node.remove_attribute(namespace, name),
        Value::String(text) => node.set_attribute(namespace, name, text),
        other => node.set_attribute(namespace, name, &other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Context, SVG_NAMESPACE_URI, XLINK_NAMESPACE_URI};
    use crate::primitives::text;
    use crate::signals::{Stream, Subject, Trigger};
    use serde_json::json;

    fn setup() -> (Scope, Trigger) {
        let ctx = Context::new(Config::default()).unwrap();
        let destroy = Trigger::new();
        let scope = Scope::new(&ctx, Stream::never(), destroy.signal());
        (scope, destroy)
    }

    fn node_of(descriptor: &NodeDescriptor) -> DomNode {
        descriptor.before_node()
    }

    #[test]
    fn test_element_with_constant_attributes_and_children() {
        let (scope, _destroy) = setup();
        let declaration = element(
            "ul",
            ElementProps::default()
                .attr("class", "items")
                .attr("hidden", false)
                .attr("data-n", 3_i64)
                .children(["a", "b"]),
        );

        let descriptor = declaration.create(&scope).unwrap();
        assert_eq!(
            node_of(&descriptor).to_markup(),
            "<ul class=\"items\" data-n=\"3\">ab</ul>"
        );
        assert_eq!(descriptor.child_descriptors().len(), 2);
    }

    #[test]
    fn test_empty_tag_rejected() {
        let (scope, _destroy) = setup();
        let result = element("", ElementProps::default()).create(&scope);
        assert_eq!(result.unwrap_err(), Error::EmptyTagName);
    }

    #[test]
    fn test_unknown_namespace_rejected() {
        let (scope, _destroy) = setup();
        let result = element("circle", ElementProps::default().namespace("svgg")).create(&scope);
        assert!(matches!(result, Err(Error::UnknownNamespace { name }) if name == "svgg"));
    }

    #[test]
    fn test_children_inherit_namespace() {
        let (scope, _destroy) = setup();
        let declaration = element(
            "svg",
            ElementProps::default()
                .namespace("svg")
                .child(element("use", ElementProps::default().attr_ns("xlink", "href", "#x"))),
        );

        let descriptor = declaration.create(&scope).unwrap();
        let child = node_of(&descriptor).first_child().unwrap();

        assert_eq!(child.namespace_uri().as_deref(), Some(SVG_NAMESPACE_URI));
        assert_eq!(
            child.attribute(Some(XLINK_NAMESPACE_URI), "href").as_deref(),
            Some("#x")
        );
    }

    #[test]
    fn test_reactive_boolean_attribute_toggles_presence() {
        let (scope, _destroy) = setup();
        let checked = Subject::new();
        let descriptor = element(
            "input",
            ElementProps::default().attr("checked", Bound::Reactive(checked.stream())),
        )
        .create(&scope)
        .unwrap();
        let node = node_of(&descriptor);

        checked.next(json!(true));
        assert_eq!(node.attribute(None, "checked").as_deref(), Some(""));
        checked.next(json!(false));
        assert!(!node.has_attribute(None, "checked"));
        checked.next(json!(null));
        assert!(!node.has_attribute(None, "checked"));
        checked.next(json!("yes"));
        assert_eq!(node.attribute(None, "checked").as_deref(), Some("yes"));
    }

    #[test]
    fn test_reactive_property_stops_after_destroy() {
        let (scope, destroy) = setup();
        let value = Subject::new();
        let descriptor = element(
            "input",
            ElementProps::default().prop("value", Bound::Reactive(value.stream())),
        )
        .create(&scope)
        .unwrap();
        let node = node_of(&descriptor);

        value.next(json!("a"));
        destroy.fire();
        value.next(json!("b"));

        assert_eq!(node.property("value"), Some(json!("a")));
        assert_eq!(value.observer_count(), 0, "binding released on destroy");
    }

    #[test]
    fn test_failing_child_fails_element() {
        let (scope, _destroy) = setup();
        let declaration = element(
            "div",
            ElementProps::default()
                .child(text("ok"))
                .child(element("", ElementProps::default())),
        );
        assert_eq!(declaration.create(&scope).unwrap_err(), Error::EmptyTagName);
    }

    #[test]
    fn test_named_element_exposes_node() {
        let (scope, _destroy) = setup();
        let descriptor = element("button", ElementProps::default().named("go"))
            .create(&scope)
            .unwrap();

        assert_eq!(descriptor.name(), Some("go"));
        let exposed = descriptor.expose().unwrap();
        assert_eq!(exposed.as_element().unwrap().node(), &node_of(&descriptor));
    }
}
