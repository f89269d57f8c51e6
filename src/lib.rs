//! colabel - Collaborative image annotation editing engine
//!
//! Draws, selects and transforms shape annotations on a zoomable image
//! canvas, keeps an undo history of every edit, and mirrors the collection
//! to a shared store so several annotators see each other's work.
//!
//! The [`Editor`] is synchronous and owns all local state. Each mutating
//! call returns [`EditorEvent`]s; the [`SyncAdapter`] turns them into
//! backend calls and applies the answers back to the editor.

pub mod config;
pub mod constants;
pub mod controller;
pub mod editor;
pub mod history;
pub mod keybindings;
pub mod model;
pub mod sync;
pub mod tools;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::{Editor, EditorEvent};
pub use sync::{SyncAdapter, SyncIntent};
