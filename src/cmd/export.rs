use std::fs;
use std::path::PathBuf;

use gm3doc::gm::{decode_shape, Result};
use gm3doc::obj::{ExportOptions, ObjExporter};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Output path without extension (default: input basename).
	#[arg(short, long)]
	pub output: Option<PathBuf>,
	#[arg(long = "no-normals")]
	pub no_normals: bool,
	#[arg(long = "no-texcoords")]
	pub no_texcoords: bool,
	#[arg(long = "no-mtl")]
	pub no_mtl: bool,
	#[arg(long = "no-flip-y")]
	pub no_flip_y: bool,
	/// Uniform scale applied to every vertex.
	#[arg(long, default_value_t = 1.0)]
	pub scale: f32,
}

/// Decode a 3GM file and write OBJ/MTL output.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		output,
		no_normals,
		no_texcoords,
		no_mtl,
		no_flip_y,
		scale,
	} = args;

	let bytes = fs::read(&path)?;
	let shape = decode_shape(&bytes)?;

	let output = output.unwrap_or_else(|| path.with_extension(""));
	let exporter = ObjExporter::new(ExportOptions {
		include_normals: !no_normals,
		include_texcoords: !no_texcoords,
		generate_mtl: !no_mtl,
		flip_texture_y: !no_flip_y,
		scale,
	});
	let files = exporter.export(&shape, &output)?;

	println!("vertices: {}", shape.vertex_count);
	println!("triangles: {}", shape.primitive_buffer.len() / 3);
	println!("surfaces: {}", shape.surfaces.len());
	println!("wrote: {}", files.obj.display());
	if let Some(mtl) = files.mtl {
		println!("wrote: {}", mtl.display());
	}

	Ok(())
}
