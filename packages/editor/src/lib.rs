//! # Paperclip Editor
//!
//! Document editing on top of the slim DOM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ producer: document load → slim DOM tree     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Validate and apply edit requests         │
//! │  - Version counter                          │
//! │  - Undo/redo over immutable roots           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: checksum pre-check → render       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are values**: an edit yields a new root, old roots stay valid
//! 2. **Identity addressing**: mutations target identifiers, paths bridge to the real DOM
//! 3. **Fail fast**: invalid requests are rejected before anything changes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paperclip_editor::{Document, Mutation};
//!
//! let mut doc = Document::new("file:///button.pc", root);
//!
//! doc.apply(&Mutation::SetTextValue {
//!     node_id: "label".to_string(),
//!     value: "Click me!".to_string(),
//! })?;
//!
//! doc.undo();
//! ```

mod config;
mod document;
mod errors;
mod mutations;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::Document;
pub use errors::{EditorError, EditorResult};
pub use mutations::{Mutation, MutationError, MutationResult, Replacement};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export common types for convenience
pub use slim_dom::{NodeRef, PathStep, RuleRef};
