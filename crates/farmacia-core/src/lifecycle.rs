// ── Document lifecycle ──
//
// Draft → Effective, one-way. Every mutating operation on a document
// asks the lifecycle first.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Status of an inventory document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentStatus {
    /// Editable: header, items and deletion are allowed.
    #[default]
    Draft,
    /// Finalized. Terminal; the document is read-only.
    Effective,
}

/// Operations gated on document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Action {
    #[strum(to_string = "edit header")]
    EditHeader,
    #[strum(to_string = "add item")]
    AddItem,
    #[strum(to_string = "remove item")]
    RemoveItem,
    #[strum(to_string = "delete")]
    Delete,
    #[strum(to_string = "finalize")]
    Finalize,
}

impl DocumentStatus {
    pub fn is_draft(self) -> bool {
        self == Self::Draft
    }

    /// Whether `action` is allowed in this status.
    ///
    /// Only drafts accept anything; an effective document rejects even a
    /// second finalize.
    pub fn permits(self, _action: Action) -> bool {
        self.is_draft()
    }

    /// The status after `action`, or `None` if it is not allowed.
    pub fn after(self, action: Action) -> Option<Self> {
        if !self.permits(action) {
            return None;
        }
        Some(match action {
            Action::Finalize => Self::Effective,
            _ => self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Action; 5] = [
        Action::EditHeader,
        Action::AddItem,
        Action::RemoveItem,
        Action::Delete,
        Action::Finalize,
    ];

    #[test]
    fn draft_permits_everything() {
        for action in ALL {
            assert!(DocumentStatus::Draft.permits(action), "{action}");
        }
        assert_eq!(
            DocumentStatus::Draft.after(Action::Finalize),
            Some(DocumentStatus::Effective)
        );
        assert_eq!(
            DocumentStatus::Draft.after(Action::AddItem),
            Some(DocumentStatus::Draft)
        );
    }

    #[test]
    fn effective_is_terminal() {
        for action in ALL {
            assert_eq!(DocumentStatus::Effective.after(action), None, "{action}");
        }
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Effective).ok().as_deref(),
            Some("\"effective\"")
        );
        assert_eq!("draft".parse::<DocumentStatus>().ok(), Some(DocumentStatus::Draft));
    }
}
