use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use gm3doc::gm::{decode_shape, ChunkIter, FileHeader, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print high-level file, chunk, and shape statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let bytes = fs::read(&path)?;
	let header = FileHeader::classify(&bytes)?;

	let mut chunk_count = 0_u32;
	let mut has_end = false;
	let mut kinds: HashMap<&'static str, u32> = HashMap::new();
	for chunk in ChunkIter::new(&bytes, header.chunk_offset) {
		let chunk = chunk?;
		chunk_count += 1;
		has_end |= chunk.head.is_end();
		*kinds.entry(chunk.head.kind.name()).or_insert(0) += 1;
	}

	let shape = decode_shape(&bytes)?;

	let mut tally: Vec<_> = kinds.into_iter().collect();
	tally.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));

	if json {
		let chunks: serde_json::Map<String, serde_json::Value> = tally
			.iter()
			.map(|(name, count)| (name.trim_end().to_owned(), serde_json::json!(count)))
			.collect();
		let doc = serde_json::json!({
			"path": path.display().to_string(),
			"header": header.kind_label(),
			"version": header.version,
			"chunk_count": chunk_count,
			"has_end": has_end,
			"chunks": chunks,
			"vertex_count": shape.vertex_count,
			"triangle_count": shape.primitive_buffer.len() / 3,
			"surface_count": shape.surfaces.len(),
			"shape_flags": shape.shape_flags,
			"has_animation": shape.has_animation(),
			"animation_frames": shape.animation_frame_count(),
		});
		println!("{doc:#}");
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("header: {}", header.kind_label());
	println!("version: 0x{:08x}", header.version);
	println!("chunk_count: {chunk_count}");
	println!("has_end: {has_end}");
	println!("vertex_count: {}", shape.vertex_count);
	println!("triangle_count: {}", shape.primitive_buffer.len() / 3);
	println!("surface_count: {}", shape.surfaces.len());
	println!("shape_flags: 0x{:02x}", shape.shape_flags);
	println!("has_animation: {}", shape.has_animation());
	println!("animation_frames: {}", shape.animation_frame_count());
	if let Some(bounds) = shape.bounding_box {
		println!(
			"bounding_box: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
			bounds[0], bounds[1], bounds[2], bounds[3], bounds[4], bounds[5]
		);
	}

	println!("chunks:");
	for (name, count) in tally {
		println!("  {name}: {count}");
	}

	Ok(())
}
