//! Session variant model.

pub mod model;

pub use model::{EditorSession, LooksEditorSession, PageDirection, Session};
