//! Component Primitive - Reusable structure with typed input and outputs.
//!
//! A [`ComponentFactory`] declares:
//! - an input *shape*: field name → [`FieldKind`]
//! - a *structure* function: bound input → declaration
//! - an optional *output* function: named nodes + bound input → output
//!   streams
//!
//! # Feedback
//!
//! A `FEEDBACK` field is not supplied by the caller. The component gets a
//! fresh proxy stream for it as input, and the output with the same name
//! becomes that proxy's source. This closes a loop inside the component:
//!
//! ```text
//!   input.count (proxy) ──▶ structure ──▶ named nodes ──▶ output.count
//!          ▲                                                  │
//!          └──────────────────── attach ◀─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let counter = Rc::new(
//!     ComponentFactory::new("Counter", |input| {
//!         let count = input["count"].as_stream().cloned().unwrap_or_else(Stream::never);
//!         element("div", ElementProps::default()
//!             .child(element("button", ElementProps::default().named("inc").child("+")))
//!             .child(stream(count.map(|n| vec![text(n.to_string())]))))
//!     })
//!     .input("count", FieldKind::FEEDBACK)
//!     .output(|named, _| {
//!         let clicks = named["inc"].as_element().map(|inc| inc.on("click"));
//!         ...
//!     }),
//! );
//!
//! let view = component(&counter, ComponentProps::default());
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::node::{Exposed, NodeDeclaration, NodeDescriptor, Scope};
use crate::signals::{Proxy, Stream};
use crate::types::{NodeKind, Value};

// =============================================================================
// Input Shape
// =============================================================================

bitflags::bitflags! {
    /// Kind of a component input field.
    ///
    /// Type bits combine with `|` and a value passes if it matches any of
    /// them: `FieldKind::STRING | FieldKind::REACTIVE`. A field without type
    /// bits accepts anything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldKind: u16 {
        const ANY = 0;
        const REQUIRED = 1 << 0;
        const BOOLEAN = 1 << 1;
        const STRING = 1 << 2;
        const NUMBER = 1 << 3;
        const OBJECT = 1 << 4;
        const ARRAY = 1 << 5;
        const CHILDREN = 1 << 6;
        const REACTIVE = 1 << 7;
        const FEEDBACK = 1 << 8;
    }
}

impl FieldKind {
    const TYPES: FieldKind = FieldKind::BOOLEAN
        .union(FieldKind::STRING)
        .union(FieldKind::NUMBER)
        .union(FieldKind::OBJECT)
        .union(FieldKind::ARRAY)
        .union(FieldKind::CHILDREN)
        .union(FieldKind::REACTIVE);

    /// Whether `value` satisfies this field's type bits.
    pub fn accepts(&self, value: &InputValue) -> bool {
        let types = self.intersection(Self::TYPES);
        if types.is_empty() {
            return true;
        }
        let kind = match value {
            InputValue::Value(Value::Bool(_)) => FieldKind::BOOLEAN,
            InputValue::Value(Value::String(_)) => FieldKind::STRING,
            InputValue::Value(Value::Number(_)) => FieldKind::NUMBER,
            InputValue::Value(Value::Object(_)) => FieldKind::OBJECT,
            InputValue::Value(Value::Array(_)) => FieldKind::ARRAY,
            InputValue::Value(Value::Null) => return false,
            InputValue::Reactive(_) => FieldKind::REACTIVE,
            InputValue::Children(_) => FieldKind::CHILDREN,
        };
        types.intersects(kind)
    }
}

// =============================================================================
// Input and Output values
// =============================================================================

/// One input field value.
#[derive(Debug, Clone)]
pub enum InputValue {
    Value(Value),
    Reactive(Stream<Value>),
    Children(Vec<NodeDeclaration>),
}

impl InputValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            InputValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream<Value>> {
        match self {
            InputValue::Reactive(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn as_children(&self) -> Option<&[NodeDeclaration]> {
        match self {
            InputValue::Children(children) => Some(children),
            _ => None,
        }
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        InputValue::Value(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Value(Value::from(value))
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Value(Value::from(value))
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Value(Value::from(value))
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Value(Value::from(value))
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Value(Value::from(value))
    }
}

impl From<Stream<Value>> for InputValue {
    fn from(stream: Stream<Value>) -> Self {
        InputValue::Reactive(stream)
    }
}

impl From<Vec<NodeDeclaration>> for InputValue {
    fn from(children: Vec<NodeDeclaration>) -> Self {
        InputValue::Children(children)
    }
}

/// Bound input handed to the structure and output functions.
pub type Input = IndexMap<String, InputValue>;

/// Exposed interfaces of the named nodes in a component's structure.
pub type NamedNodes = IndexMap<String, Exposed>;

/// Output streams of a component.
pub type Outputs = IndexMap<String, Stream<Value>>;

type StructureFn = dyn Fn(&Input) -> NodeDeclaration;
type OutputFn = dyn Fn(&NamedNodes, &Input) -> Outputs;

// =============================================================================
// Factory
// =============================================================================

/// A reusable component definition.
pub struct ComponentFactory {
    name: String,
    shape: IndexMap<String, FieldKind>,
    structure: Rc<StructureFn>,
    output: Option<Rc<OutputFn>>,
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

impl ComponentFactory {
    pub fn new(
        name: impl Into<String>,
        structure: impl Fn(&Input) -> NodeDeclaration + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            shape: IndexMap::new(),
            structure: Rc::new(structure),
            output: None,
        }
    }

    /// Declare an input field.
    pub fn input(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.shape.insert(field.into(), kind);
        self
    }

    /// Set the output function.
    pub fn output(
        mut self,
        output: impl Fn(&NamedNodes, &Input) -> Outputs + 'static,
    ) -> Self {
        self.output = Some(Rc::new(output));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &IndexMap<String, FieldKind> {
        &self.shape
    }

    /// Validate caller input against the shape.
    ///
    /// Returns the bound input and one proxy per `FEEDBACK` field.
    pub fn bind_input(&self, actual: &Input) -> Result<(Input, IndexMap<String, Proxy<Value>>)> {
        let mut input = Input::new();
        let mut feedback = IndexMap::new();

        for (field, kind) in &self.shape {
            if kind.contains(FieldKind::FEEDBACK) {
                if actual.contains_key(field) {
                    warn!(component = %self.name, field = %field, "ignoring caller input with the same name as a feedback field");
                }
                let proxy = Proxy::new();
                input.insert(field.clone(), InputValue::Reactive(proxy.stream()));
                feedback.insert(field.clone(), proxy);
                continue;
            }

            let Some(value) = actual.get(field) else {
                if kind.contains(FieldKind::REQUIRED) {
                    return Err(Error::MissingInput {
                        component: self.name.clone(),
                        field: field.clone(),
                    });
                }
                continue;
            };
            if !kind.accepts(value) {
                warn!(component = %self.name, field = %field, expected = ?kind, "invalid component input");
            }
            let bound = match value {
                InputValue::Reactive(stream) => InputValue::Reactive(stream.hold()),
                other => other.clone(),
            };
            input.insert(field.clone(), bound);
        }

        for field in actual.keys().filter(|field| !self.shape.contains_key(*field)) {
            debug!(component = %self.name, field = %field, "input field not in shape; dropped");
        }

        Ok((input, feedback))
    }
}

// =============================================================================
// Component Node
// =============================================================================

/// Descriptor for a component instance.
pub struct ComponentNode {
    name: Option<String>,
    root: NodeDescriptor,
    named: NamedNodes,
    outputs: Outputs,
}

impl ComponentNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn root(&self) -> &NodeDescriptor {
        &self.root
    }

    pub fn named_nodes(&self) -> &NamedNodes {
        &self.named
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&Stream<Value>> {
        self.outputs.get(name)
    }
}

/// Properties for a component instance.
#[derive(Debug, Clone, Default)]
pub struct ComponentProps {
    /// Reference name collected by an enclosing component.
    pub name: Option<String>,
    pub input: Input,
}

impl ComponentProps {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.input.insert(field.into(), value.into());
        self
    }
}

struct ComponentArgs {
    factory: Rc<ComponentFactory>,
    props: ComponentProps,
}

/// Declare an instance of `factory`.
pub fn component(factory: &Rc<ComponentFactory>, props: ComponentProps) -> NodeDeclaration {
    NodeDeclaration::new(
        NodeKind::Component,
        create_component_node,
        ComponentArgs {
            factory: Rc::clone(factory),
            props,
        },
    )
}

fn create_component_node(scope: &Scope, args: &ComponentArgs) -> Result<NodeDescriptor> {
    let factory = &args.factory;

    // 1. BIND INPUT
    let (input, feedback) = factory.bind_input(&args.props.input)?;

    // 2. CREATE STRUCTURE - always in the default namespace
    let declaration = (factory.structure)(&input);
    let default_namespace_uri = scope.context().default_namespace_uri();
    let structure_scope = if scope.parent_namespace_uri() == default_namespace_uri {
        scope.clone()
    } else {
        scope.with_namespace_uri(default_namespace_uri)
    };
    let root = declaration.create(&structure_scope)?;

    // 3. COLLECT NAMED NODES
    let mut named = NamedNodes::new();
    collect_named_nodes(&factory.name, &root, &mut named);

    // 4. OUTPUT
    let outputs = factory
        .output
        .as_ref()
        .map(|output| output(&named, &input))
        .unwrap_or_default();

    // 5. ATTACH FEEDBACK
    for (field, proxy) in &feedback {
        match outputs.get(field) {
            Some(source) => {
                proxy.attach(source, scope.destroy());
            }
            None => warn!(component = %factory.name, field = %field, "no output to attach feedback field to"),
        }
    }

    Ok(NodeDescriptor::Component(Rc::new(ComponentNode {
        name: args.props.name.clone(),
        root,
        named,
        outputs,
    })))
}

/// Post-order walk through element children collecting named nodes.
///
/// The walk stops at regions and nested components. The first node with a
/// name wins.
fn collect_named_nodes(component: &str, descriptor: &NodeDescriptor, named: &mut NamedNodes) {
    if let NodeDescriptor::Element(element) = descriptor {
        for child in element.children() {
            collect_named_nodes(component, child, named);
        }
    }

    let Some(name) = descriptor.name() else {
        return;
    };
    if named.contains_key(name) {
        warn!(component, name, "duplicate node name; keeping the first");
        return;
    }
    match descriptor.expose() {
        Some(exposed) => {
            named.insert(name.to_string(), exposed);
        }
        None => warn!(component, name, kind = %descriptor.kind(), "named node exposes nothing"),
    }
}
