//! Pipeline stages for packet assembly.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the HTTP-facing stages can be pointed at fakes.
//!
//! ## Data Flow
//!
//! ```text
//! select ──▶ fetch ──▶ encode ─┐
//!        └─▶ directory ────────┴─▶ payload ──▶ render
//! ```
//!
//! 1. [`select`]    — keep selected entries, stable-sort by `order`
//! 2. [`fetch`]     — GET every selected document concurrently; fail fast
//! 3. [`encode`]    — bytes → bare base64 for `fileData`
//! 4. [`directory`] — best-effort category listing for `allAvailableDocuments`
//! 5. [`payload`]   — canonicalise project metadata and assemble the request
//! 6. [`render`]    — POST to the rendering service, validate the PDF body

pub mod directory;
pub mod encode;
pub mod fetch;
pub mod payload;
pub mod render;
pub mod select;
