//! Live document model.
//!
//! - [`Document`] - arena of nodes with live form state and focus
//! - [`VNode`] - parsed render trees
//! - [`MarkupParser`] / [`TlParser`] - markup to render trees
//! - [`Reconciler`] / [`DomReconciler`] - render trees into the document

mod document;
pub mod html;
mod node;
mod parse;
mod reconcile;
mod tree;

pub use document::Document;
pub use node::{Attrs, ElementData, NodeData, NodeId};
pub use parse::{MarkupParser, ParseError, TlParser};
pub use reconcile::{DomReconciler, ReconcileError, RenderStats, Reconciler};
pub use tree::{VElement, VNode};
