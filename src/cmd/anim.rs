use std::fs;
use std::path::PathBuf;

use gm3doc::gm::{decode_shape, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the animation data carried by a file.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let bytes = fs::read(&path)?;
	let shape = decode_shape(&bytes)?;

	let Some(animation) = shape.animation.as_ref() else {
		if json {
			println!("{}", serde_json::json!({ "has_animation": false }));
		} else {
			println!("no animation data");
		}
		return Ok(());
	};

	if json {
		let position_frames: Vec<_> = animation
			.position_frames
			.iter()
			.map(|frame| {
				serde_json::json!({
					"frame_count": frame.frame_count,
					"start_time": frame.start_time,
					"end_time": frame.end_time,
					"positions": frame.positions,
				})
			})
			.collect();
		let property_frames: Vec<_> = animation
			.property_frames
			.iter()
			.map(|frame| {
				serde_json::json!({
					"shape_id": frame.shape_id,
					"property_count": frame.property_count,
					"time_stamp": frame.time_stamp,
					"data_size": frame.data.len(),
				})
			})
			.collect();
		let doc = serde_json::json!({
			"has_animation": true,
			"frame_count": animation.frame_count(),
			"batches": animation.batches.len(),
			"keyframes": animation.keyframes.len(),
			"property_frames": property_frames,
			"position_frames": position_frames,
		});
		println!("{doc:#}");
		return Ok(());
	}

	println!("frame_count: {}", animation.frame_count());
	println!("batches: {}", animation.batches.len());
	println!("keyframes: {}", animation.keyframes.len());
	println!("property_frames: {}", animation.property_frames.len());
	for frame in &animation.property_frames {
		println!(
			"  shape {} properties {} at t={:.3} ({} bytes)",
			frame.shape_id,
			frame.property_count,
			frame.time_stamp,
			frame.data.len()
		);
	}
	println!("position_frames: {}", animation.position_frames.len());
	for frame in &animation.position_frames {
		println!(
			"  {} frames over t={:.3}..{:.3}",
			frame.frame_count, frame.start_time, frame.end_time
		);
	}

	Ok(())
}
