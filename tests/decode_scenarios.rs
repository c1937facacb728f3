#![allow(missing_docs)]

//! End-to-end decodes of small synthetic 3GM files.

use gm3doc::gm::{decode_shape, vertex, DecodeOptions, Decoder, GmError};

fn push_chunk(out: &mut Vec<u8>, name: &[u8; 4], payload: &[u8]) {
	out.extend_from_slice(name);
	out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
	out.extend_from_slice(payload);
}

fn push_end(out: &mut Vec<u8>) {
	push_chunk(out, b"End ", &[]);
}

fn full_header(version: u32, info: u32) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(b"3DGM");
	out.extend_from_slice(&version.to_le_bytes());
	out.extend_from_slice(&info.to_le_bytes());
	out
}

fn le_tokens(values: &[u16]) -> Vec<u8> {
	let mut out = Vec::new();
	for value in values {
		out.extend_from_slice(&value.to_le_bytes());
	}
	out
}

fn be_tokens(values: &[u16]) -> Vec<u8> {
	let mut out = Vec::new();
	for value in values {
		out.extend_from_slice(&value.to_be_bytes());
	}
	out
}

#[test]
fn version_header_with_one_packed_vertex() {
	let bytes: Vec<u8> = vec![
		0x04, 0x00, 0x01, 0x00, // version header
		0x44, 0x6F, 0x74, 0x32, 0x14, 0x00, 0x00, 0x00, // Dot2, size 20
		0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // compression params, skipped
		0x00, 0x00, 0x00, 0x01, // x
		0x00, 0x00, 0x00, 0x02, // y
		0x00, 0x00, 0x00, 0x03, // z
		0x45, 0x6E, 0x64, 0x20, 0x00, 0x00, 0x00, 0x00, // End
	];

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.vertex_count, 1);
	assert_eq!(shape.position(0), [1.0, 2.0, 3.0]);
	assert_eq!(shape.vertex_buffer.len(), 9);
	assert_eq!(
		shape.vertex_buffer.last().expect("terminator").to_bits(),
		vertex::TERMINATOR_BITS
	);
}

#[test]
fn full_header_with_one_triangle_strip() {
	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"Prim", &le_tokens(&[16646, 4, 0, 1, 2, 3, 0x6000]));
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.primitive_buffer, vec![0, 1, 2, 1, 0, 3]);
	assert_ne!(shape.shape_flags & (1 << 2), 0);
}

#[test]
fn surfaces_deduplicate_across_prim_chunks() {
	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"Prim", &le_tokens(&[16646, 3, 0, 1, 2, 0x6000]));
	push_chunk(&mut bytes, b"Prim", &le_tokens(&[16646, 3, 3, 4, 5, 0x6000]));
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.surfaces.len(), 1);
	let surface = &shape.surfaces[0];
	assert_eq!(surface.surface_id, 1);
	assert_eq!(surface.primitive_type, 16646);
	assert_eq!(surface.primitive_count, 2);
	assert!(surface.is_active());
}

#[test]
fn line_chunk_rewrites_quad_strip_input() {
	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"Line", &be_tokens(&[18189, 3, 40, 41, 42, 0x6000, 0x7000]));
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.surfaces.len(), 1);
	let surface = &shape.surfaces[0];
	assert_eq!(surface.primitive_type, 18190);
	assert_eq!(surface.flags, 0);
	assert_eq!(surface.primitive_data[5], 0);
	assert_ne!(shape.shape_flags & (1 << 3), 0);
}

#[test]
fn fpos_chunk_attaches_animation() {
	let mut payload = Vec::new();
	payload.extend_from_slice(&2_u32.to_le_bytes());
	payload.extend_from_slice(&0.0_f32.to_le_bytes());
	payload.extend_from_slice(&1.0_f32.to_le_bytes());
	payload.extend_from_slice(&8_u32.to_le_bytes());
	payload.extend_from_slice(&0.5_f32.to_le_bytes());
	payload.extend_from_slice(&0.75_f32.to_le_bytes());

	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"FPos", &payload);
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert!(shape.has_animation());
	assert_eq!(shape.animation_frame_count(), 2);
	let animation = shape.animation.as_ref().expect("animation present");
	assert_eq!(animation.position_frames[0].positions, vec![0.5, 0.75]);
	assert_ne!(shape.shape_flags & (1 << 7), 0);
}

#[test]
fn unknown_chunks_are_skipped_without_error() {
	let mut bytes = full_header(2, 7);
	push_chunk(&mut bytes, &0xDEAD_BEEF_u32.to_le_bytes(), &[0; 4]);
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.vertex_count, 0);
	assert!(shape.primitive_buffer.is_empty());
	assert!(shape.primitives.is_empty());
	assert!(shape.surfaces.is_empty());
}

#[test]
fn mixed_vertex_and_primitive_file_stays_consistent() {
	// Four packed vertices, then a strip over them.
	let mut dot2 = vec![0_u8; 8];
	for value in [0_i32, 0, 0, 10, 0, 0, 10, 10, 0, 0, 10, 0] {
		dot2.extend_from_slice(&(value as u32).to_be_bytes());
	}

	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"Dot2", &dot2);
	push_chunk(&mut bytes, b"Prim", &le_tokens(&[16646, 4, 0, 1, 2, 3, 0x6000]));
	push_end(&mut bytes);

	let shape = decode_shape(&bytes).expect("file decodes");
	assert_eq!(shape.vertex_count, 4);
	assert_eq!(shape.vertex_buffer.len(), 4 * 8 + 1);
	for &index in &shape.primitive_buffer {
		assert!(usize::from(index) < shape.vertex_count);
	}
	assert_eq!(shape.bounding_box, Some([0.0, 0.0, 0.0, 10.0, 10.0, 0.0]));
}

#[test]
fn animation_and_geometry_combine() {
	let mut sopf = Vec::new();
	sopf.extend_from_slice(&1_u32.to_le_bytes());
	sopf.extend_from_slice(&0_u32.to_le_bytes());
	sopf.extend_from_slice(&0.0_f32.to_le_bytes());
	sopf.extend_from_slice(&2_u32.to_le_bytes());
	sopf.extend_from_slice(&[0x11, 0x22]);

	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"soPF", &sopf);
	push_chunk(&mut bytes, b"Prim", &le_tokens(&[20486, 3, 0, 1, 2, 0x6000]));
	push_end(&mut bytes);

	let shape = Decoder::new(DecodeOptions::default())
		.expect("session builds")
		.decode(&bytes)
		.expect("file decodes");
	assert!(shape.has_animation());
	assert_eq!(
		shape.animation.as_ref().expect("animation present").property_frames[0].data,
		vec![0x11, 0x22]
	);
	assert_eq!(shape.primitive_buffer, vec![0, 1, 2]);
}

#[test]
fn malformed_animation_payload_aborts_the_decode() {
	let mut sopf = vec![0_u8; 12];
	sopf.extend_from_slice(&64_u32.to_le_bytes());

	let mut bytes = full_header(1, 0);
	push_chunk(&mut bytes, b"soPF", &sopf);
	push_end(&mut bytes);

	let err = decode_shape(&bytes).expect_err("overrun fails");
	assert!(matches!(err, GmError::InvalidDynamicData { .. }));
}
