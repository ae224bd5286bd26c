//! OBS Scene - thread-safe scene graph compositor
//!
//! A scene is an ordered list of items, each binding a source to a 2D
//! transform. A render thread walks the list every frame while other threads
//! add, remove, reorder, look up, enumerate and persist items.
//!
//! Key properties:
//! - Arena-backed doubly linked list (slotmap keys, no dangling links)
//! - One re-entrant lock per scene serializes every structural change
//! - Reference-counted items that may outlive their removal from the scene
//! - List order is paint order: later items draw on top

pub mod data;
pub mod error;
pub mod item;
pub mod list;
pub mod render;
pub mod scene;
pub mod signal;
pub mod source;
pub mod transform;
pub mod types;

pub use data::*;
pub use error::*;
pub use item::*;
pub use render::*;
pub use scene::*;
pub use signal::*;
pub use source::*;
pub use transform::*;
pub use types::*;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
