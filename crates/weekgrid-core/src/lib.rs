//! Weekly planning grid engine: selection, local assignment mirror, and
//! batched mutation sync against the planning backend. Transport-agnostic;
//! the surrounding application supplies a [`sync::BulkTransport`].

pub mod clipboard;
pub mod colors;
pub mod config;
pub mod editor;
pub mod grid;
pub mod model;
pub mod preset;
pub mod selection;
pub mod session;
pub mod store;
pub mod sync;
