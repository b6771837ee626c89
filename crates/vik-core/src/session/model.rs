//! Editing session variants stored per UI message.

use serde::{Deserialize, Serialize};

/// Waiting for an admin to pick the roles of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSession {
    pub group_name: String,
}

/// Paging through a group's entries, editing one entry at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooksEditorSession {
    pub group_name: String,
    pub current_page: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

impl LooksEditorSession {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            current_page: 0,
        }
    }

    /// Moves one page, clamped to `[0, len - 1]`. Never wraps.
    pub fn turn(&self, direction: PageDirection, len: usize) -> Self {
        let last = len.saturating_sub(1);
        let current_page = match direction {
            PageDirection::Previous => self.current_page.saturating_sub(1),
            PageDirection::Next => (self.current_page + 1).min(last),
        }
        .min(last);
        Self {
            group_name: self.group_name.clone(),
            current_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current_page + 1 < len
    }
}

/// Any in-progress editing flow, keyed by the message driving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Session {
    Editor(EditorSession),
    LooksEditor(LooksEditorSession),
}

impl Session {
    pub fn editor(group_name: impl Into<String>) -> Self {
        Session::Editor(EditorSession {
            group_name: group_name.into(),
        })
    }

    pub fn looks_editor(group_name: impl Into<String>) -> Self {
        Session::LooksEditor(LooksEditorSession::new(group_name))
    }

    pub fn group_name(&self) -> &str {
        match self {
            Session::Editor(session) => &session.group_name,
            Session::LooksEditor(session) => &session.group_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Session::Editor(_) => "editor",
            Session::LooksEditor(_) => "looks_editor",
        }
    }

    /// `None` for any other variant.
    pub fn as_editor(&self) -> Option<&EditorSession> {
        match self {
            Session::Editor(session) => Some(session),
            _ => None,
        }
    }

    pub fn as_looks_editor(&self) -> Option<&LooksEditorSession> {
        match self {
            Session::LooksEditor(session) => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_accessors() {
        let editor = Session::editor("colors");
        assert!(editor.as_editor().is_some());
        assert!(editor.as_looks_editor().is_none());

        let looks = Session::looks_editor("colors");
        assert!(looks.as_editor().is_none());
        assert_eq!(looks.as_looks_editor().unwrap().current_page, 0);
        assert_eq!(looks.group_name(), "colors");
    }

    #[test]
    fn test_paging_is_bounded() {
        let session = LooksEditorSession::new("g");
        let previous = session.turn(PageDirection::Previous, 3);
        assert_eq!(previous.current_page, 0);

        let mut page = session;
        for _ in 0..5 {
            page = page.turn(PageDirection::Next, 3);
        }
        assert_eq!(page.current_page, 2);
        assert!(page.has_previous());
        assert!(!page.has_next(3));
    }

    #[test]
    fn test_single_entry_has_no_neighbours() {
        let session = LooksEditorSession::new("g");
        assert!(!session.has_previous());
        assert!(!session.has_next(1));
        assert_eq!(session.turn(PageDirection::Next, 1).current_page, 0);
    }
}
