use std::fs;
use std::path::PathBuf;

use gm3doc::gm::{decode_shape, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// List the surfaces registered while decoding a file.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let bytes = fs::read(&path)?;
	let shape = decode_shape(&bytes)?;

	if json {
		let doc: Vec<_> = shape
			.surfaces
			.iter()
			.map(|surface| {
				serde_json::json!({
					"surface_id": surface.surface_id,
					"texture_id": surface.texture_id,
					"primitive_type": surface.primitive_type,
					"flags": surface.flags,
					"alpha": surface.has_alpha(),
					"primitive_count": surface.primitive_count,
					"index_count": surface.index_buffer.len(),
				})
			})
			.collect();
		println!("{:#}", serde_json::Value::from(doc));
		return Ok(());
	}

	if shape.surfaces.is_empty() {
		println!("no surfaces");
		return Ok(());
	}

	for surface in &shape.surfaces {
		println!(
			"surface {:4}  type {:5}  texture {:4}  flags 0x{:04x}  primitives {:4}  indices {:5}{}",
			surface.surface_id,
			surface.primitive_type,
			surface.texture_id,
			surface.flags,
			surface.primitive_count,
			surface.index_buffer.len(),
			if surface.has_alpha() { "  alpha" } else { "" }
		);
	}

	Ok(())
}
