use crate::gm::bytes::Cursor;
use crate::gm::shape::{ExportKind, Primitive, Shape, FLAG_PRIM_PATH};
use crate::gm::surface::SurfaceTable;
use crate::gm::{GmError, Result};

/// Token ending primitive processing.
pub const END_MARKER: u16 = 0x6000;
/// Token ending a primitive list.
pub const LIST_TERMINATOR: u16 = 0xFFFE;
/// Token ending a line-data run inside `Line` payloads.
pub const LINE_DATA_TERMINATOR: u16 = 0x7000;
/// Data elements carried by every complex primitive.
pub const COMPLEX_ELEMENTS: usize = 10;

/// The seven primitive kinds carried by `Prim` and `Line` streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
	/// Triangle strip.
	TriangleStrip,
	/// Quad strip as it appears in the stream; rewritten on read.
	QuadStripInput,
	/// Quad strip, canonical form.
	QuadStrip,
	/// Verbatim triangle list.
	TriangleList,
	/// Point sprite.
	PointSprite,
	/// Line strip.
	LineStrip,
	/// Line strip variant; rewritten to a point sprite on read.
	LineStripAlt,
	/// Complex primitive with a fixed 10-element body.
	ComplexPrimitive,
}

impl PrimitiveKind {
	/// Map a raw 16-bit type token to a kind.
	pub fn from_raw(raw: u16) -> Option<Self> {
		match raw {
			16646 => Some(PrimitiveKind::TriangleStrip),
			18189 => Some(PrimitiveKind::QuadStripInput),
			18190 => Some(PrimitiveKind::QuadStrip),
			20486 => Some(PrimitiveKind::TriangleList),
			21251 => Some(PrimitiveKind::PointSprite),
			28422 => Some(PrimitiveKind::LineStrip),
			28423 => Some(PrimitiveKind::LineStripAlt),
			30733 => Some(PrimitiveKind::ComplexPrimitive),
			_ => None,
		}
	}

	/// Raw 16-bit value of this kind.
	pub fn raw(self) -> u16 {
		match self {
			PrimitiveKind::TriangleStrip => 16646,
			PrimitiveKind::QuadStripInput => 18189,
			PrimitiveKind::QuadStrip => 18190,
			PrimitiveKind::TriangleList => 20486,
			PrimitiveKind::PointSprite => 21251,
			PrimitiveKind::LineStrip => 28422,
			PrimitiveKind::LineStripAlt => 28423,
			PrimitiveKind::ComplexPrimitive => 30733,
		}
	}

	/// Apply the in-stream type rewrites.
	pub fn canonical(self) -> Self {
		match self {
			PrimitiveKind::QuadStripInput => PrimitiveKind::QuadStrip,
			PrimitiveKind::LineStripAlt => PrimitiveKind::PointSprite,
			other => other,
		}
	}

	/// Primitive-flag register value for this kind.
	pub fn flags(self) -> u32 {
		match self {
			PrimitiveKind::TriangleStrip | PrimitiveKind::TriangleList => 0x0001_0001,
			PrimitiveKind::QuadStrip => 0x0000_0201,
			PrimitiveKind::PointSprite => 0x0000_0001,
			PrimitiveKind::LineStrip | PrimitiveKind::ComplexPrimitive => 0x0000_0101,
			PrimitiveKind::QuadStripInput | PrimitiveKind::LineStripAlt => self.canonical().flags(),
		}
	}

	/// Exporter-facing kind for this stream kind.
	pub fn export_kind(self) -> ExportKind {
		match self.canonical() {
			PrimitiveKind::TriangleStrip => ExportKind::TriangleStrip,
			PrimitiveKind::QuadStrip => ExportKind::QuadStrip,
			PrimitiveKind::TriangleList => ExportKind::TriangleList,
			PrimitiveKind::PointSprite => ExportKind::PointSprite,
			PrimitiveKind::LineStrip => ExportKind::LineStrip,
			PrimitiveKind::ComplexPrimitive => ExportKind::Complex,
			PrimitiveKind::QuadStripInput | PrimitiveKind::LineStripAlt => unreachable!("rewritten by canonical()"),
		}
	}
}

/// Decode one `Prim` chunk payload into the shape.
///
/// The payload is a sequence of little-endian 16-bit tokens: a type token,
/// an element count (except for complex primitives, which always carry
/// [`COMPLEX_ELEMENTS`] elements), then the elements. [`END_MARKER`] or
/// [`LIST_TERMINATOR`] stops processing. Each primitive overwrites the flag
/// register and registers itself with the surface table.
pub fn decode(payload: &[u8], shape: &mut Shape, surfaces: &mut SurfaceTable, flag_register: &mut u32) -> Result<()> {
	shape.shape_flags |= FLAG_PRIM_PATH;

	let mut cursor = Cursor::new(payload);
	while cursor.remaining() > 0 {
		let at = cursor.pos();
		let raw = read_token(&mut cursor)?;
		if raw == END_MARKER || raw == LIST_TERMINATOR {
			break;
		}

		let kind = PrimitiveKind::from_raw(raw)
			.ok_or(GmError::UnsupportedPrimitive { raw, at })?
			.canonical();
		*flag_register = kind.flags();

		if kind == PrimitiveKind::ComplexPrimitive {
			let mut elements = Vec::with_capacity(COMPLEX_ELEMENTS);
			for _ in 0..COMPLEX_ELEMENTS {
				elements.push(u32::from(read_token(&mut cursor)?));
			}
			register_primitive(shape, surfaces, kind, *flag_register, Vec::new(), elements)?;
			continue;
		}

		let count = usize::from(read_token(&mut cursor)?);
		let mut indices = Vec::with_capacity(count);
		for _ in 0..count {
			indices.push(read_token(&mut cursor)?);
		}
		expand_topology(shape, kind, &indices, at)?;
		register_primitive(shape, surfaces, kind, *flag_register, indices, Vec::new())?;
	}

	Ok(())
}

fn read_token(cursor: &mut Cursor<'_>) -> Result<u16> {
	let at = cursor.pos();
	cursor.read_u16_le().map_err(|_| GmError::TruncatedPrimitive { at })
}

/// Expand one primitive into triangle-list indices on the shape.
fn expand_topology(shape: &mut Shape, kind: PrimitiveKind, indices: &[u16], at: usize) -> Result<()> {
	match kind {
		PrimitiveKind::TriangleStrip => {
			for i in 0..indices.len().saturating_sub(2) {
				if i % 2 == 0 {
					shape.push_triangle(indices[i], indices[i + 1], indices[i + 2])?;
				} else {
					shape.push_triangle(indices[i], indices[i - 1], indices[i + 2])?;
				}
			}
		}
		PrimitiveKind::TriangleList => {
			if indices.len() % 3 != 0 {
				return Err(GmError::TruncatedPrimitive { at });
			}
			for triangle in indices.chunks_exact(3) {
				shape.push_triangle(triangle[0], triangle[1], triangle[2])?;
			}
		}
		PrimitiveKind::QuadStrip => {
			if indices.len() % 4 != 0 {
				return Err(GmError::TruncatedPrimitive { at });
			}
			for quad in indices.chunks_exact(4) {
				shape.push_triangle(quad[0], quad[1], quad[2])?;
				shape.push_triangle(quad[0], quad[2], quad[3])?;
			}
		}
		// Degenerate kinds pass through without triangle expansion.
		PrimitiveKind::PointSprite | PrimitiveKind::LineStrip => {}
		PrimitiveKind::ComplexPrimitive | PrimitiveKind::QuadStripInput | PrimitiveKind::LineStripAlt => {
			unreachable!("handled before expansion")
		}
	}
	Ok(())
}

fn register_primitive(
	shape: &mut Shape,
	surfaces: &mut SurfaceTable,
	kind: PrimitiveKind,
	flag_register: u32,
	indices: Vec<u16>,
	elements: Vec<u32>,
) -> Result<()> {
	let flags = (flag_register & 0xFFFF) as u16;
	let surface_id = surfaces.get_or_create_surface(kind.raw(), shape.texture_id, flags)?;
	let surface = surfaces.surface_mut(surface_id)?;
	surface.primitive_count += 1;
	surface.index_buffer.extend_from_slice(&indices);
	surface.primitive_data.extend_from_slice(&elements);

	shape.primitives.push(Primitive {
		kind: kind.export_kind(),
		indices: indices.iter().map(|&idx| u32::from(idx)).collect(),
		texture_id: shape.texture_id,
		flags,
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::{decode, PrimitiveKind, END_MARKER};
	use crate::gm::shape::{ExportKind, Shape, FLAG_PRIM_PATH};
	use crate::gm::surface::SurfaceTable;
	use crate::gm::GmError;

	fn tokens(values: &[u16]) -> Vec<u8> {
		let mut out = Vec::new();
		for value in values {
			out.extend_from_slice(&value.to_le_bytes());
		}
		out
	}

	fn decode_tokens(values: &[u16]) -> (Shape, SurfaceTable, u32, super::Result<()>) {
		let mut shape = Shape::new();
		let mut surfaces = SurfaceTable::new(1000, 2000).expect("table builds");
		let mut flags = 0_u32;
		let outcome = decode(&tokens(values), &mut shape, &mut surfaces, &mut flags);
		(shape, surfaces, flags, outcome)
	}

	#[test]
	fn strip_expansion_flips_odd_triangles() {
		let (shape, _, flags, outcome) = decode_tokens(&[16646, 4, 0, 1, 2, 3, END_MARKER]);
		outcome.expect("strip decodes");
		assert_eq!(shape.primitive_buffer, vec![0, 1, 2, 1, 0, 3]);
		assert_eq!(flags, 0x0001_0001);
		assert_eq!(shape.primitives.len(), 1);
		assert_eq!(shape.primitives[0].kind, ExportKind::TriangleStrip);
		assert_ne!(shape.shape_flags & FLAG_PRIM_PATH, 0);
	}

	#[test]
	fn list_copies_verbatim() {
		let (shape, _, flags, outcome) = decode_tokens(&[20486, 6, 5, 4, 3, 2, 1, 0, END_MARKER]);
		outcome.expect("list decodes");
		assert_eq!(shape.primitive_buffer, vec![5, 4, 3, 2, 1, 0]);
		assert_eq!(flags, 0x0001_0001);
	}

	#[test]
	fn quad_strip_input_is_rewritten_and_split() {
		let (shape, surfaces, flags, outcome) = decode_tokens(&[18189, 4, 0, 1, 2, 3, END_MARKER]);
		outcome.expect("quad decodes");
		assert_eq!(shape.primitive_buffer, vec![0, 1, 2, 0, 2, 3]);
		assert_eq!(flags, 0x0000_0201);
		// The registered surface carries the canonical type.
		let surface = surfaces.surface(1).expect("surface exists");
		assert_eq!(surface.primitive_type, PrimitiveKind::QuadStrip.raw());
	}

	#[test]
	fn alt_line_strip_becomes_point_sprite() {
		let (shape, surfaces, flags, outcome) = decode_tokens(&[28423, 2, 8, 9, END_MARKER]);
		outcome.expect("sprite decodes");
		assert!(shape.primitive_buffer.is_empty());
		assert_eq!(flags, 0x0000_0001);
		assert_eq!(shape.primitives[0].kind, ExportKind::PointSprite);
		assert_eq!(surfaces.surface(1).expect("surface exists").primitive_type, 21251);
	}

	#[test]
	fn complex_primitive_reads_exactly_ten_elements() {
		let (shape, surfaces, flags, outcome) =
			decode_tokens(&[30733, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, END_MARKER]);
		outcome.expect("complex decodes");
		assert_eq!(flags, 0x0000_0101);
		assert!(shape.primitive_buffer.is_empty());
		let surface = surfaces.surface(1).expect("surface exists");
		assert_eq!(surface.primitive_data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
	}

	#[test]
	fn end_marker_alone_is_an_empty_success() {
		let (shape, surfaces, flags, outcome) = decode_tokens(&[END_MARKER]);
		outcome.expect("empty stream decodes");
		assert!(shape.primitive_buffer.is_empty());
		assert!(shape.primitives.is_empty());
		assert_eq!(surfaces.allocated(), 0);
		assert_eq!(flags, 0);
	}

	#[test]
	fn unknown_kind_is_unsupported() {
		let (_, _, _, outcome) = decode_tokens(&[12345, END_MARKER]);
		assert!(matches!(outcome, Err(GmError::UnsupportedPrimitive { raw: 12345, at: 0 })));
	}

	#[test]
	fn mid_primitive_exhaustion_is_truncated() {
		let (_, _, _, outcome) = decode_tokens(&[16646, 4, 0, 1]);
		assert!(matches!(outcome, Err(GmError::TruncatedPrimitive { .. })));
	}

	#[test]
	fn repeated_kinds_share_one_surface() {
		let (_, surfaces, _, outcome) = decode_tokens(&[16646, 3, 0, 1, 2, 16646, 3, 2, 1, 0, END_MARKER]);
		outcome.expect("both strips decode");
		assert_eq!(surfaces.allocated(), 1);
		let surface = surfaces.surface(1).expect("surface exists");
		assert_eq!(surface.primitive_count, 2);
		assert_eq!(surface.index_buffer, vec![0, 1, 2, 2, 1, 0]);
	}
}
