//! Mount Pipeline
//!
//! This module connects declarations to a live document.
//!
//! # Pipeline Architecture
//!
//! ```text
//! MountSource → root stream region → container → scheduler (mounted)
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - Builds the root scope and creates the root region
//! 2. **insert** - The region lands in the container before the anchor
//! 3. **mounted** - Delivered by the context scheduler after insertion
//! 4. **dispose** - Fires destroy; every binding ends and the region leaves
//!    the container

pub mod mount;

pub use mount::{MountHandle, MountSource, mount};
