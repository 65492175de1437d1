//! Node declarations.

use std::fmt;
use std::rc::Rc;

use super::descriptor::NodeDescriptor;
use super::scope::Scope;
use crate::error::Result;
use crate::types::NodeKind;

type CreateNode = dyn Fn(&Scope) -> Result<NodeDescriptor>;

/// An inert description of a node: a creation function plus its arguments.
///
/// Declarations can be cloned and created any number of times; each
/// [`create`](Self::create) yields an independent descriptor.
#[derive(Clone)]
pub struct NodeDeclaration {
    kind: NodeKind,
    create_node: Rc<CreateNode>,
}

impl NodeDeclaration {
    /// Pair `create_node` with the `creation_args` it will receive.
    pub fn new<A: 'static>(
        kind: NodeKind,
        create_node: fn(&Scope, &A) -> Result<NodeDescriptor>,
        creation_args: A,
    ) -> Self {
        Self {
            kind,
            create_node: Rc::new(move |scope| create_node(scope, &creation_args)),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn create(&self, scope: &Scope) -> Result<NodeDescriptor> {
        (self.create_node)(scope)
    }
}

impl fmt::Debug for NodeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDeclaration")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Create every declaration in order, stopping at the first failure.
pub fn create_node_descriptors(
    scope: &Scope,
    declarations: &[NodeDeclaration],
) -> Result<Vec<NodeDescriptor>> {
    declarations
        .iter()
        .map(|declaration| declaration.create(scope))
        .collect()
}
