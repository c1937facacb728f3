//! Wavefront OBJ/MTL serialization for decoded shapes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::gm::{Result, Shape};

/// Output switches for the OBJ writer.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
	/// Emit `vn` records when the shape carries normals.
	pub include_normals: bool,
	/// Emit `vt` records when the shape carries texture coordinates.
	pub include_texcoords: bool,
	/// Write a companion `.mtl` file and reference it.
	pub generate_mtl: bool,
	/// Flip the texture V coordinate.
	pub flip_texture_y: bool,
	/// Uniform scale applied to every position.
	pub scale: f32,
}

impl Default for ExportOptions {
	fn default() -> Self {
		Self {
			include_normals: true,
			include_texcoords: true,
			generate_mtl: true,
			flip_texture_y: true,
			scale: 1.0,
		}
	}
}

/// Files produced by one export.
#[derive(Debug, Clone)]
pub struct ExportedFiles {
	/// Path of the written OBJ file.
	pub obj: PathBuf,
	/// Path of the written MTL file, when one was generated.
	pub mtl: Option<PathBuf>,
}

/// Shape-to-OBJ serializer.
pub struct ObjExporter {
	options: ExportOptions,
}

impl ObjExporter {
	/// Create an exporter with the given options.
	pub fn new(options: ExportOptions) -> Self {
		Self { options }
	}

	/// Write `shape` to `<output>.obj` (and `<output>.mtl` when enabled).
	///
	/// A trailing `.obj` extension on `output` is stripped before deriving
	/// the basename.
	pub fn export(&self, shape: &Shape, output: &Path) -> Result<ExportedFiles> {
		let base = strip_obj_extension(output);
		let material = material_name(&base);
		let obj_path = base.with_extension("obj");
		let mtl_path = base.with_extension("mtl");

		let mtl_name = self
			.options
			.generate_mtl
			.then(|| mtl_path.file_name().map(|name| name.to_string_lossy().into_owned()))
			.flatten();

		let object_name = base
			.file_stem()
			.map(|stem| sanitize_name(&stem.to_string_lossy()))
			.unwrap_or_else(|| "shape".to_owned());

		let mut obj = BufWriter::new(File::create(&obj_path)?);
		self.write_obj(shape, &object_name, &material, mtl_name.as_deref(), &mut obj)?;
		obj.flush()?;

		let mtl = if self.options.generate_mtl {
			let mut mtl = BufWriter::new(File::create(&mtl_path)?);
			write_mtl(&material, &mut mtl)?;
			mtl.flush()?;
			Some(mtl_path)
		} else {
			None
		};

		Ok(ExportedFiles { obj: obj_path, mtl })
	}

	/// Serialize the OBJ document to `out`.
	pub fn write_obj<W: Write>(&self, shape: &Shape, object_name: &str, material: &str, mtl_name: Option<&str>, out: &mut W) -> Result<()> {
		writeln!(out, "# 3GM shape export")?;
		if let Some(name) = mtl_name {
			writeln!(out, "mtllib {name}")?;
		}
		writeln!(out, "# vertices: {}", shape.vertex_count)?;
		writeln!(out, "# triangles: {}", shape.primitive_buffer.len() / 3)?;
		writeln!(out)?;
		writeln!(out, "o {object_name}")?;
		writeln!(out, "usemtl {material}")?;
		writeln!(out)?;

		for index in 0..shape.vertex_count {
			let [x, y, z] = shape.position(index);
			let s = self.options.scale;
			writeln!(out, "v {:.6} {:.6} {:.6}", x * s, y * s, z * s)?;
		}

		let texcoords = self.options.include_texcoords.then(|| shape.texcoords()).flatten();
		if let Some(uv) = texcoords {
			writeln!(out)?;
			for pair in uv.chunks_exact(2) {
				let v = if self.options.flip_texture_y { 1.0 - pair[1] } else { pair[1] };
				writeln!(out, "vt {:.6} {:.6}", pair[0], v)?;
			}
		}

		let normals = self.options.include_normals.then(|| shape.normals()).flatten();
		if let Some(n) = normals {
			writeln!(out)?;
			for normal in n.chunks_exact(3) {
				writeln!(out, "vn {:.6} {:.6} {:.6}", normal[0], normal[1], normal[2])?;
			}
		}

		writeln!(out)?;
		let with_uv = texcoords.is_some();
		let with_normals = normals.is_some();
		for triangle in shape.primitive_buffer.chunks_exact(3) {
			write!(out, "f")?;
			for &index in triangle {
				let i = u32::from(index) + 1;
				match (with_uv, with_normals) {
					(false, false) => write!(out, " {i}")?,
					(true, false) => write!(out, " {i}/{i}")?,
					(false, true) => write!(out, " {i}//{i}")?,
					(true, true) => write!(out, " {i}/{i}/{i}")?,
				}
			}
			writeln!(out)?;
		}

		Ok(())
	}
}

/// Serialize the fixed default material.
pub fn write_mtl<W: Write>(material: &str, out: &mut W) -> Result<()> {
	writeln!(out, "# 3GM shape material")?;
	writeln!(out, "newmtl {material}")?;
	writeln!(out, "Ka 0.3 0.3 0.4")?;
	writeln!(out, "Kd 0.7 0.8 0.9")?;
	writeln!(out, "Ks 0.2 0.2 0.3")?;
	writeln!(out, "Ns 50.0")?;
	writeln!(out, "d 1.0")?;
	Ok(())
}

fn strip_obj_extension(path: &Path) -> PathBuf {
	match path.extension() {
		Some(ext) if ext.eq_ignore_ascii_case("obj") => path.with_extension(""),
		_ => path.to_path_buf(),
	}
}

fn material_name(base: &Path) -> String {
	base.file_name()
		.map(|name| sanitize_name(&name.to_string_lossy()))
		.unwrap_or_else(|| "material".to_owned())
}

fn sanitize_name(name: &str) -> String {
	name.chars()
		.map(|c| if matches!(c, '.' | '-' | ' ') { '_' } else { c })
		.collect()
}
