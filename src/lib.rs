//! Decoding and export toolkit for the legacy `.3GM` 3D-model container.
//!
//! The [`gm`] module holds the decode pipeline: header discrimination, chunk
//! scanning, vertex codecs, primitive and line stream interpretation, surface
//! deduplication, and animation ingest. The [`obj`] module serializes decoded
//! shapes to Wavefront OBJ/MTL.

#![warn(missing_docs)]

pub mod gm;
pub mod obj;
