//! Record-keeping engine for list reconciliation.
//!
//! - [`LinkedList`]: arena-backed doubly linked list with O(1) insert,
//!   move and remove through stable [`LinkId`] handles
//! - [`KeyedRecords`]: a linked list plus key index, mutated only through
//!   one API so that the two never disagree
//!
//! # Architecture
//!
//! ```text
//!   index: { k2 → #1, k1 → #0, k3 → #2 }
//!
//!   list:  #0(k1) ⇄ #1(k2) ⇄ #2(k3)
//! ```
//!
//! The list order is the rendered order. The index answers "is this key
//! already rendered, and where" without walking the list.

mod keyed;
mod linked_list;

pub use keyed::{DuplicateKey, KeyedRecords};
pub use linked_list::{Iter, LinkId, LinkedList};
