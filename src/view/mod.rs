//! Live views.
//!
//! - [`ViewRegistry`] - which anchors belong to which view
//! - [`Hydrator`] - binds server-rendered anchors and subscribes them
//! - [`PatchApplier`] - renders inbound fragments into every anchor of a view

mod hydrate;
mod patch;
mod registry;

pub use hydrate::{HydrationReport, Hydrator};
pub use patch::{PatchApplier, PatchOutcome};
pub use registry::{ViewRegistry, discover_anchors};

use thiserror::Error;

use crate::dom::{ParseError, ReconcileError};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view `{view}`: unparsable markup: {source}")]
    Parse { view: String, source: ParseError },

    #[error("view `{view}`: mount failed: {source}")]
    Mount {
        view: String,
        source: ReconcileError,
    },
}

impl ViewError {
    pub fn view(&self) -> &str {
        match self {
            Self::Parse { view, .. } | Self::Mount { view, .. } => view,
        }
    }
}
