use crate::gm::bytes::{complex_swap32, Cursor};
use crate::gm::{GmError, Result};

/// Floats stored per vertex; lanes 0..3 hold x, y, z.
pub const STRIDE: usize = 8;

/// Bit pattern of the vertex terminator sentinel (a quiet NaN).
pub const TERMINATOR_BITS: u32 = 0x7FC0_0000;

/// The sentinel float closing every decoded vertex buffer.
pub fn terminator() -> f32 {
	f32::from_bits(TERMINATOR_BITS)
}

/// Bytes consumed per vertex by the packed codecs.
const PACKED_VERTEX_SIZE: usize = 12;
/// Compression-parameter block skipped by [`packed_to_float`].
const PACKED_PARAM_SIZE: usize = 8;
/// Parameter block preceding crunched vertex data.
const CRUNCH_PARAM_SIZE: usize = 24;
/// Bytes consumed per crunched vertex.
const CRUNCH_VERTEX_SIZE: usize = 6;

/// Decode a `Dot2` payload: an 8-byte parameter block followed by one packed
/// big-endian integer triple per vertex.
pub fn packed_to_float(payload: &[u8]) -> Result<Vec<f32>> {
	let body = payload
		.len()
		.checked_sub(PACKED_PARAM_SIZE)
		.filter(|rest| rest % PACKED_VERTEX_SIZE == 0)
		.ok_or(GmError::VertexPayload {
			algorithm: "PackedToFloat",
			size: payload.len(),
		})?;

	let mut cursor = Cursor::new(payload);
	cursor.read_exact(PACKED_PARAM_SIZE)?;
	decode_packed(cursor, body / PACKED_VERTEX_SIZE)
}

/// Decode a packed triple stream with no leading parameter block.
pub fn packed_to_float_3component(payload: &[u8]) -> Result<Vec<f32>> {
	if payload.len() % PACKED_VERTEX_SIZE != 0 {
		return Err(GmError::VertexPayload {
			algorithm: "PackedToFloat3Component",
			size: payload.len(),
		});
	}

	decode_packed(Cursor::new(payload), payload.len() / PACKED_VERTEX_SIZE)
}

fn decode_packed(mut cursor: Cursor<'_>, vertex_count: usize) -> Result<Vec<f32>> {
	let mut out = vec![0.0_f32; vertex_count * STRIDE + 1];
	for vertex in 0..vertex_count {
		let base = vertex * STRIDE;
		for lane in 0..3 {
			let packed = complex_swap32(cursor.read_u32_le()?);
			out[base + lane] = packed as i32 as f32;
		}
	}
	out[vertex_count * STRIDE] = terminator();
	Ok(out)
}

/// Decode an `FDot` payload: a 24-byte parameter block followed by three
/// 16-bit components per vertex.
///
/// Each vertex passes through an 8-wide scratch that zero-pads everything
/// past the coordinates; the parameter block's exact influence on scaling is
/// not modeled and its words are skipped.
pub fn decrunch_dots(payload: &[u8]) -> Result<Vec<f32>> {
	let body = payload
		.len()
		.checked_sub(CRUNCH_PARAM_SIZE)
		.filter(|rest| rest % CRUNCH_VERTEX_SIZE == 0)
		.ok_or(GmError::VertexPayload {
			algorithm: "DecrunchDots",
			size: payload.len(),
		})?;

	let vertex_count = body / CRUNCH_VERTEX_SIZE;
	let mut cursor = Cursor::new(payload);
	cursor.read_exact(CRUNCH_PARAM_SIZE)?;

	let mut out = vec![0.0_f32; vertex_count * STRIDE + 1];
	let mut scratch = [0.0_f32; STRIDE];
	for vertex in 0..vertex_count {
		for lane in &mut scratch {
			*lane = 0.0;
		}
		for lane in 0..3 {
			scratch[lane] = f32::from(cursor.read_i16_le()?);
		}
		out[vertex * STRIDE..(vertex + 1) * STRIDE].copy_from_slice(&scratch);
	}
	out[vertex_count * STRIDE] = terminator();
	Ok(out)
}

/// Number of vertices held by a decoded buffer.
pub fn vertex_count(buffer: &[f32]) -> usize {
	if buffer.is_empty() { 0 } else { (buffer.len() - 1) / STRIDE }
}
