//! Lifecycle actions.
//!
//! Inputs to [`crate::reducer::RmaReducer`]. Creation and staff edits are
//! the only two ways a request changes.

use crate::state::{RmaRequest, RmaUpdate};
use serde::{Deserialize, Serialize};

/// Lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RmaAction {
    /// A numbered request was just persisted.
    RequestCreated {
        /// The persisted request.
        request: Box<RmaRequest>,
    },

    /// Staff saved the admin form.
    ApplyAdminChanges {
        /// Submitted edits.
        update: RmaUpdate,
    },
}
