use crate::gm::bytes::Cursor;
use crate::gm::prim::{PrimitiveKind, END_MARKER, LINE_DATA_TERMINATOR};
use crate::gm::shape::{Primitive, Shape, FLAG_LINE_PATH};
use crate::gm::surface::SurfaceTable;
use crate::gm::{GmError, Result};

/// Stream token introducing a complex-primitive materialization.
pub const COMPLEX_LINE_TYPE: u16 = 17165;

/// 32-bit sentinel closing a line-data run in the work buffer.
const RUN_SENTINEL: u32 = 0xFFFF_FFFF;
/// 32-bit sentinel closing the work buffer.
const WORK_SENTINEL: u32 = 0xFFFF_FFFE;
/// Words per scratch primitive record.
const SCRATCH_WORDS: usize = 18;

/// Outcome of a `Line` chunk decode.
pub struct LineDecode {
	/// The rewritten 32-bit token stream, closed by the work sentinel.
	pub work: Vec<u32>,
	/// Surface ids emitted for this chunk, in materialization order.
	pub surface_ids: Vec<u16>,
}

/// Decode one `Line` chunk payload.
///
/// Line payloads store their 16-bit tokens byte-swapped relative to the
/// container. The pipeline runs in phases: segment reading with special
/// handling for line/quad types, type-rewrite fixup, the line-data run, and
/// complex-primitive materialization. Surfaces are registered from the
/// fixed-up scratch records so their metadata carries canonical types.
pub fn decode(payload: &[u8], shape: &mut Shape, surfaces: &mut SurfaceTable, flag_register: &mut u32) -> Result<LineDecode> {
	let mut cursor = Cursor::new(payload);
	let mut work: Vec<u32> = Vec::new();
	let mut records: Vec<[u32; SCRATCH_WORDS]> = Vec::new();
	let mut pending: Vec<(usize, u16)> = Vec::new();

	// Phase 1: segment reading.
	loop {
		let ty = read_token(&mut cursor)?;
		if ty == END_MARKER {
			break;
		}

		let count = read_token(&mut cursor)?;
		let start = work.len();
		for _ in 0..count {
			work.push(u32::from(read_token(&mut cursor)?));
		}

		if let Some(converted) = line_conversion(ty) {
			*flag_register = converted.flags();
			let mut record = [0_u32; SCRATCH_WORDS];
			record[0] = u32::from(ty);
			record[5] = *flag_register & 0xFFFF;
			for (slot, value) in record[6..].iter_mut().zip(&work[start..]) {
				*slot = *value;
			}
			pending.push((records.len(), converted.raw()));
			records.push(record);
		}
	}

	// Phase 2: type-rewrite fixup.
	for (index, converted) in &pending {
		records[*index][0] = u32::from(*converted);
		records[*index][5] = 0;
	}

	// Phase 3: line-data run.
	loop {
		let tok = read_token(&mut cursor)?;
		if tok == LINE_DATA_TERMINATOR {
			work.push(RUN_SENTINEL);
			break;
		}
		work.push(u32::from(tok));
	}

	// Phase 4: complex-primitive materialization.
	if cursor.remaining() >= 2 {
		let at = cursor.pos();
		if read_token(&mut cursor)? == COMPLEX_LINE_TYPE {
			if work.len() < 13 {
				return Err(GmError::TruncatedLine { at });
			}
			records.push(complex_record(&work));
			*flag_register = PrimitiveKind::ComplexPrimitive.flags();
		}
	}

	work.push(WORK_SENTINEL);

	shape.shape_flags |= FLAG_LINE_PATH;
	let mut surface_ids = Vec::with_capacity(records.len());
	for record in &records {
		let primitive_type = record[0] as u16;
		let flags = record[5] as u16;
		let surface_id = surfaces.get_or_create_surface(primitive_type, shape.texture_id, flags)?;
		let surface = surfaces.surface_mut(surface_id)?;
		surface.primitive_count += 1;
		surface.primitive_data.extend_from_slice(record);
		surface_ids.push(surface_id);

		if let Some(kind) = PrimitiveKind::from_raw(primitive_type) {
			shape.primitives.push(Primitive {
				kind: kind.export_kind(),
				indices: Vec::new(),
				texture_id: shape.texture_id,
				flags,
			});
		}
	}

	Ok(LineDecode { work, surface_ids })
}

fn read_token(cursor: &mut Cursor<'_>) -> Result<u16> {
	let at = cursor.pos();
	cursor.read_u16_be().map_err(|_| GmError::TruncatedLine { at })
}

/// Pending rewrite for the specially-handled line types. Only the line-strip
/// and quad-strip-input tokens trigger special handling; the 28423 variant
/// appears in the rewrite table but never starts a record of its own.
fn line_conversion(raw: u16) -> Option<PrimitiveKind> {
	match PrimitiveKind::from_raw(raw) {
		Some(PrimitiveKind::LineStrip) => Some(PrimitiveKind::PointSprite),
		Some(PrimitiveKind::QuadStripInput) => Some(PrimitiveKind::QuadStrip),
		_ => None,
	}
}

/// Build the 18-word complex record from the first 13 output words.
fn complex_record(work: &[u32]) -> [u32; SCRATCH_WORDS] {
	let mut record = [0_u32; SCRATCH_WORDS];
	record[0] = u32::from(PrimitiveKind::ComplexPrimitive.raw());
	record[3] = work[2];
	record[4] = work[3];
	record[9] = work[4];
	record[6] = work[10];
	record[12] = work[5];
	record[7] = work[11];
	record[8] = work[12];
	record[10] = work[6];
	record[13] = work[7];
	record[11] = work[8];
	record[14] = work[9];
	record
}
