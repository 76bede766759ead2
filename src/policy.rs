//! Advisory access policy for record types
//!
//! Nothing in this crate enforces these flags. An authorization layer in the
//! embedding application is expected to consult them before exposing create,
//! edit or delete operations to interactive users.

use crate::models::progress_log_entry;

/// Operations an authorization layer may gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Create,
    Edit,
    Delete,
}

impl Capability {
    /// The permission string (e.g., "progress_log.create")
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Create => "progress_log.create",
            Capability::Edit => "progress_log.edit",
            Capability::Delete => "progress_log.delete",
        }
    }
}

/// Capability flags a record type advertises to end-user facing layers.
///
/// `actor` is the interactive user asking, or `None` for anonymous access.
pub trait AccessPolicy {
    fn can_create(actor: Option<&str>) -> bool;
    fn can_edit(actor: Option<&str>) -> bool;
    fn can_delete(actor: Option<&str>) -> bool;

    fn can(capability: Capability, actor: Option<&str>) -> bool {
        match capability {
            Capability::Create => Self::can_create(actor),
            Capability::Edit => Self::can_edit(actor),
            Capability::Delete => Self::can_delete(actor),
        }
    }
}

/// Progress records are written only by the processes they track.
/// Archival, if any, happens outside the application.
impl AccessPolicy for progress_log_entry::Entity {
    fn can_create(_actor: Option<&str>) -> bool {
        false
    }

    fn can_edit(_actor: Option<&str>) -> bool {
        false
    }

    fn can_delete(_actor: Option<&str>) -> bool {
        false
    }
}
