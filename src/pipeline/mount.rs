//! Mount API - Root lifecycle.
//!
//! This module provides the entry point for rendering declarations into a
//! document. Mounting sets up the two root signals every created node is
//! scoped to:
//! - `mounted` fires once, on the context scheduler, after insertion
//! - `destroy` fires once, on disposal or when the source stream ends
//!
//! # Example
//!
//! ```ignore
//! use stream_dom::{mount, Config, Context};
//!
//! let ctx = Context::new(Config::default())?;
//! let body = ctx.document().create_element_ns(HTML_NAMESPACE_URI, "body");
//!
//! // Mount the application
//! let handle = mount(&ctx, &body, None, app())?;
//!
//! // Deliver `mounted`
//! ctx.scheduler().run_pending();
//!
//! // Clean up
//! handle.unmount();
//! ```

use tracing::{debug, trace};

use crate::config::Context;
use crate::dom::DomNode;
use crate::error::{Error, Result};
use crate::node::{NodeDeclaration, NodeDescriptor, Scope};
use crate::primitives::stream;
use crate::signals::{Stream, Trigger};

// =============================================================================
// Mount Source
// =============================================================================

/// What to mount: one declaration, or a stream of declaration lists.
#[derive(Debug, Clone)]
pub enum MountSource {
    Declaration(NodeDeclaration),
    Stream(Stream<Vec<NodeDeclaration>>),
}

impl From<NodeDeclaration> for MountSource {
    fn from(declaration: NodeDeclaration) -> Self {
        MountSource::Declaration(declaration)
    }
}

impl From<Stream<Vec<NodeDeclaration>>> for MountSource {
    fn from(children: Stream<Vec<NodeDeclaration>>) -> Self {
        MountSource::Stream(children)
    }
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds:
/// - The root descriptor (a stream region)
/// - The `mounted` trigger
/// - The `destroy` trigger
///
/// Dropping the handle disposes the mount.
#[must_use = "dropping a MountHandle disposes the mount"]
pub struct MountHandle {
    root: NodeDescriptor,
    mounted: Trigger,
    destroy: Trigger,
}

impl std::fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountHandle")
            .field("mounted", &self.mounted.is_fired())
            .field("disposed", &self.destroy.is_fired())
            .finish()
    }
}

impl MountHandle {
    pub fn root(&self) -> &NodeDescriptor {
        &self.root
    }

    /// Fire `destroy` and take the mounted content out of the container.
    ///
    /// Synchronous and idempotent: once this returns no subscription made
    /// while creating the content is live and the container holds none of
    /// its nodes, markers included.
    pub fn dispose(&self) {
        if self.destroy.is_fired() {
            return;
        }
        debug!("disposing mount");
        self.destroy.fire();
    }

    /// Dispose and consume the handle.
    pub fn unmount(self) {
        self.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.destroy.is_fired()
    }

    /// Fires once after insertion; replays to late subscribers.
    pub fn mounted(&self) -> Stream<()> {
        self.mounted.signal()
    }

    /// Fires once on disposal or source completion.
    pub fn destroyed(&self) -> Stream<()> {
        self.destroy.signal()
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Render `source` into `container`, before `before` or at the end.
///
/// This sets up:
/// 1. The root `mounted` and `destroy` triggers and the root scope
/// 2. A stream region holding the content
/// 3. Removal of the region when `destroy` fires
/// 4. A scheduled `mounted`, skipped if destroyed first
///
/// A single declaration is rendered once and stays until disposal. A stream
/// source replaces the content on every emission, and its completion fires
/// `destroy`.
///
/// Returns [`Error::InvalidChild`] if `before` is not a child of
/// `container`.
pub fn mount(
    context: &Context,
    container: &DomNode,
    before: Option<&DomNode>,
    source: impl Into<MountSource>,
) -> Result<MountHandle> {
    // 1. VALIDATE
    if let Some(before) = before {
        if before.parent().as_ref() != Some(container) {
            return Err(Error::InvalidChild(
                "mount anchor is not a child of the container".to_string(),
            ));
        }
    }

    // 2. ROOT SCOPE
    let mounted = Trigger::new();
    let destroy = Trigger::new();
    let scope = Scope::new(context, mounted.signal(), destroy.signal());

    // 3. SOURCE - completion destroys the mount
    let children = match source.into() {
        MountSource::Declaration(declaration) => Stream::constant(vec![declaration]),
        MountSource::Stream(children) => {
            let destroy = destroy.clone();
            children.on_end(move || {
                trace!("mount source ended");
                destroy.fire();
            })
        }
    };

    // 4. CREATE ROOT
    let root = match stream(children).create(&scope) {
        Ok(root) => root,
        Err(err) => {
            destroy.fire();
            return Err(err);
        }
    };

    // 5. INSERT, then remove on destroy (immediately if the source already ended)
    root.insert(container, before);
    let teardown = root.clone();
    destroy.signal().observe(move |_| teardown.remove());

    // 6. MOUNTED - after insertion, on the scheduler
    let (mounted_trigger, destroy_trigger) = (mounted.clone(), destroy.clone());
    context.scheduler().schedule(move || {
        if !destroy_trigger.is_fired() {
            mounted_trigger.fire();
        }
    });

    debug!("mounted");
    Ok(MountHandle {
        root,
        mounted,
        destroy,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HTML_NAMESPACE_URI};
    use crate::primitives::{ElementProps, element, text};
    use crate::signals::Subject;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (Context, DomNode) {
        let ctx = Context::new(Config::default()).unwrap();
        let body = ctx.document().create_element_ns(HTML_NAMESPACE_URI, "body");
        (ctx, body)
    }

    #[test]
    fn test_mount_declaration() {
        let (ctx, body) = setup();
        let handle = mount(&ctx, &body, None, text("hello")).unwrap();

        assert_eq!(body.to_markup(), "<body><!---->hello<!----></body>");
        assert!(!handle.is_disposed());
    }

    #[test]
    fn test_mount_before_anchor() {
        let (ctx, body) = setup();
        let tail = ctx.document().create_text_node("tail");
        body.append_child(&tail);

        let _handle = mount(&ctx, &body, Some(&tail), text("x")).unwrap();
        assert_eq!(body.to_markup(), "<body><!---->x<!---->tail</body>");
    }

    #[test]
    fn test_anchor_outside_container_rejected() {
        let (ctx, body) = setup();
        let stray = ctx.document().create_text_node("stray");

        let result = mount(&ctx, &body, Some(&stray), text("x"));
        assert!(matches!(result, Err(Error::InvalidChild(_))));
        assert_eq!(body.child_count(), 0);
    }

    #[test]
    fn test_mounted_fires_after_run_pending() {
        let (ctx, body) = setup();
        let handle = mount(&ctx, &body, None, text("x")).unwrap();
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        handle.mounted().observe(move |_| fired_clone.set(true));

        assert!(!fired.get());
        ctx.scheduler().run_pending();
        assert!(fired.get());
    }

    #[test]
    fn test_dispose_before_mounted_skips_it() {
        let (ctx, body) = setup();
        let handle = mount(&ctx, &body, None, text("x")).unwrap();
        handle.dispose();
        ctx.scheduler().run_pending();

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        handle.mounted().observe(move |_| fired_clone.set(true));
        assert!(!fired.get());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let (ctx, body) = setup();
        let handle = mount(&ctx, &body, None, text("x")).unwrap();

        handle.dispose();
        handle.dispose();
        assert!(handle.is_disposed());
        assert_eq!(body.to_markup(), "<body></body>");
    }

    #[test]
    fn test_drop_disposes() {
        let (ctx, body) = setup();
        let children = Subject::new();
        {
            let _handle = mount(&ctx, &body, None, children.stream()).unwrap();
            children.next(vec![text("a")]);
            assert_eq!(children.observer_count(), 1);
        }
        assert_eq!(children.observer_count(), 0);
        assert_eq!(body.child_count(), 0);
    }

    #[test]
    fn test_replacements_do_not_accumulate_nodes() {
        let (ctx, body) = setup();
        let pages = Subject::new();
        let handle = mount(&ctx, &body, None, pages.stream()).unwrap();
        let page = |i: usize| element("p", ElementProps::default().child(text(i.to_string())));

        pages.next(vec![page(0)]);
        let settled = ctx.document().node_count();
        for i in 1..1000 {
            pages.next(vec![page(i)]);
        }

        assert_eq!(ctx.document().node_count(), settled, "previous renderings are freed");
        assert_eq!(body.to_markup(), "<body><!----><p>999</p><!----></body>");

        drop(handle);
        assert_eq!(ctx.document().node_count(), 1, "only the container is left");
    }
}
