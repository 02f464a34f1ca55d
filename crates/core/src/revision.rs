//! Format revision
//!
//! Resource layouts grew optional trailing fields over the format's history.
//! A codec compares the session revision's head version against a fixed
//! threshold to decide whether a field is present.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format version of an encoded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Revision {
    /// Head version number, the value layouts are gated on
    pub head: u32,
    /// Branch identifier (0 for the main line)
    pub branch_id: u16,
    /// Revision within the branch
    pub branch_revision: u16,
}

impl Revision {
    /// Create a main-line revision
    pub fn new(head: u32) -> Self {
        Revision {
            head,
            branch_id: 0,
            branch_revision: 0,
        }
    }

    /// Attach branch information (builder pattern)
    pub fn with_branch(mut self, branch_id: u16, branch_revision: u16) -> Self {
        self.branch_id = branch_id;
        self.branch_revision = branch_revision;
        self
    }

    /// Head version number
    pub fn head(&self) -> u32 {
        self.head
    }

    /// Returns true if this revision is on a side branch
    pub fn is_branched(&self) -> bool {
        self.branch_id != 0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_branched() {
            write!(
                f,
                "{:#x} (branch {:#x}:{:#x})",
                self.head, self.branch_id, self.branch_revision
            )
        } else {
            write!(f, "{:#x}", self.head)
        }
    }
}
