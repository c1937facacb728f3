use std::fs;
use std::path::PathBuf;

use gm3doc::gm::{ChunkIter, ChunkKind, FileHeader, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Only list chunks of this kind (e.g. `Dot2`, `Prim`, `soPF`).
	#[arg(long)]
	pub kind: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List the chunk stream with offsets and sizes.
pub fn run(args: Args) -> Result<()> {
	let Args { path, kind, json } = args;

	let filter = kind.as_deref().map(ChunkKind::from_name).transpose()?;
	let bytes = fs::read(&path)?;
	let header = FileHeader::classify(&bytes)?;

	let mut rows = Vec::new();
	for chunk in ChunkIter::new(&bytes, header.chunk_offset) {
		let chunk = chunk?;
		if filter.is_some_and(|wanted| chunk.head.kind != wanted) {
			continue;
		}
		rows.push((chunk.head.label(), chunk.head.kind, chunk.file_offset, chunk.head.size));
	}

	if json {
		let doc: Vec<_> = rows
			.iter()
			.map(|(label, kind, offset, size)| {
				serde_json::json!({
					"label": label,
					"kind": kind.name().trim_end(),
					"known": *kind != ChunkKind::Unknown,
					"offset": offset,
					"size": size,
				})
			})
			.collect();
		println!("{:#}", serde_json::Value::from(doc));
		return Ok(());
	}

	for (label, kind, offset, size) in rows {
		let marker = if kind == ChunkKind::Unknown { " (unknown)" } else { "" };
		println!("{offset:8}  {label}  {size:8} bytes{marker}");
	}

	Ok(())
}
