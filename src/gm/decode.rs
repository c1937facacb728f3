use crate::gm::chunk::{ChunkIter, ChunkKind};
use crate::gm::header::FileHeader;
use crate::gm::shape::Shape;
use crate::gm::surface::SurfaceTable;
use crate::gm::{line, prim, vertex, Result};

/// Runtime limits for one decode session.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
	/// Surface-table texture bound.
	pub max_textures: i32,
	/// Surface-table surface bound.
	pub max_surfaces: u16,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_textures: 1000,
			max_surfaces: 2000,
		}
	}
}

/// One decode session.
///
/// The session owns the state the original engine kept process-wide: the
/// surface table and the primitive-flag register. Both are created with the
/// session and dropped with it, so concurrent decodes never alias.
pub struct Decoder {
	surfaces: SurfaceTable,
	flag_register: u32,
}

impl Decoder {
	/// Create a session with the given limits.
	pub fn new(options: DecodeOptions) -> Result<Self> {
		Ok(Self {
			surfaces: SurfaceTable::new(options.max_textures, options.max_surfaces)?,
			flag_register: 0,
		})
	}

	/// Decode a complete `.3GM` byte buffer into a shape.
	///
	/// Runs header classification, streams chunks up to the `End` marker and
	/// dispatches each known kind to its decoder. Unknown chunk kinds are
	/// skipped. The first decoder error aborts the decode; partial state is
	/// discarded with the session.
	pub fn decode(mut self, bytes: &[u8]) -> Result<Shape> {
		let header = FileHeader::classify(bytes)?;
		let mut shape = Shape::new();

		for chunk in ChunkIter::new(bytes, header.chunk_offset) {
			let chunk = chunk?;
			match chunk.head.kind {
				ChunkKind::Dot2 => {
					shape.append_vertices(vertex::packed_to_float(chunk.payload)?);
				}
				ChunkKind::FDot => {
					shape.append_vertices(vertex::decrunch_dots(chunk.payload)?);
				}
				ChunkKind::Prim => {
					prim::decode(chunk.payload, &mut shape, &mut self.surfaces, &mut self.flag_register)?;
				}
				ChunkKind::Line => {
					line::decode(chunk.payload, &mut shape, &mut self.surfaces, &mut self.flag_register)?;
				}
				ChunkKind::SoPF => {
					shape.animation_mut().ingest_property_frame(chunk.payload)?;
				}
				ChunkKind::FPos => {
					shape.animation_mut().ingest_position_frame(chunk.payload)?;
				}
				// Texture names are opaque to the decoder; unknown kinds are
				// scanned over without being dispatched.
				ChunkKind::TxNm | ChunkKind::Unknown | ChunkKind::End => {}
			}
		}

		shape.surfaces = self.surfaces.drain_active();
		shape.compute_bounding_box();
		shape.validate()?;
		Ok(shape)
	}
}

/// Decode a `.3GM` buffer with default limits.
pub fn decode_shape(bytes: &[u8]) -> Result<Shape> {
	Decoder::new(DecodeOptions::default())?.decode(bytes)
}
