//! TGR (Sprite Container) CLI Utility
//!
//! A command-line tool for inspecting, extracting and repacking TGR sprite
//! containers.
//!
//! # Features
//!
//! - **info**: Display header, frame table and animation information
//! - **unpack**: Extract all frames to full-canvas PNG images plus a
//!   `sprite.ini` with the metadata a later repack needs
//! - **pack**: Combine `fram_NNNN.png` images and `sprite.ini` back into a
//!   TGR file
//! - **verify**: Re-encode every decoded line and check the pixels survive
//!   the round trip
//!
//! # Player colors
//!
//! Faction-tinted sprites need a COLORS.INI table. Pass one with
//! `--colors` and pick the active player with `--player` (default 2, the
//! table the original tooling resolves against).
//!
//! # Usage
//!
//! ```bash
//! # Show file information
//! cargo run --example tgr_utils -- info KEEP.TGR
//!
//! # Unpack to KEEP/fram_0000.png ... plus KEEP/sprite.ini
//! cargo run --example tgr_utils -- unpack KEEP.TGR -c COLORS.INI
//!
//! # Pack the directory back into a TGR
//! cargo run --example tgr_utils -- pack KEEP out.TGR -c COLORS.INI
//!
//! # Verify encoder/decoder round-trip on a real file
//! cargo run --example tgr_utils -- verify KEEP.TGR -c COLORS.INI
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use image::RgbaImage;
use log::{info, warn};
use serde::Serialize;
use tgr_rs::prelude::*;

#[derive(Parser)]
#[command(name = "tgr_utils")]
#[command(author = "tgr-rs project")]
#[command(version = "1.0")]
#[command(about = "TGR sprite utility - inspect, unpack, pack and verify TGR files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Display information about a TGR file
	Info {
		/// Input TGR file path
		#[arg(value_name = "INPUT_TGR")]
		input: PathBuf,

		/// Emit the summary as JSON
		#[arg(long)]
		json: bool,
	},

	/// Unpack a TGR file to PNG frames and a sprite.ini
	Unpack {
		/// Input TGR file path
		#[arg(value_name = "INPUT_TGR")]
		input: PathBuf,

		/// Output directory (defaults to the file stem)
		#[arg(short, long, value_name = "OUTPUT_DIR")]
		output: Option<PathBuf>,

		/// Path to a COLORS.INI player-color table
		#[arg(short, long, value_name = "COLORS_INI")]
		colors: Option<PathBuf>,

		/// Active player id for player-color opcodes
		#[arg(short, long, default_value_t = 2)]
		player: u8,
	},

	/// Pack PNG frames and a sprite.ini into a TGR file
	Pack {
		/// Input directory holding fram_NNNN.png files and sprite.ini
		#[arg(value_name = "INPUT_DIR")]
		input: PathBuf,

		/// Output TGR file path
		#[arg(value_name = "OUTPUT_TGR")]
		output: PathBuf,

		/// Path to a COLORS.INI player-color table
		#[arg(short, long, value_name = "COLORS_INI")]
		colors: Option<PathBuf>,

		/// Active player id for player-color opcodes
		#[arg(short, long, default_value_t = 2)]
		player: u8,
	},

	/// Check that every decoded line survives a re-encode round trip
	Verify {
		/// Input TGR file path
		#[arg(value_name = "INPUT_TGR")]
		input: PathBuf,

		/// Path to a COLORS.INI player-color table
		#[arg(short, long, value_name = "COLORS_INI")]
		colors: Option<PathBuf>,

		/// Active player id for player-color opcodes
		#[arg(short, long, default_value_t = 2)]
		player: u8,
	},
}

#[derive(Serialize)]
struct FrameSummary {
	index: usize,
	width: u32,
	height: u32,
	x: u16,
	y: u16,
	offset: u32,
	padding: bool,
}

#[derive(Serialize)]
struct FileSummary {
	version: u32,
	bits_per_pixel: u8,
	width: u16,
	height: u16,
	hotspot: (u16, u16),
	frame_count: usize,
	animation_count: usize,
	frames: Vec<FrameSummary>,
}

fn main() -> anyhow::Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Commands::Info {
			input,
			json,
		} => cmd_info(&input, json),
		Commands::Unpack {
			input,
			output,
			colors,
			player,
		} => cmd_unpack(&input, output, colors, player),
		Commands::Pack {
			input,
			output,
			colors,
			player,
		} => cmd_pack(&input, &output, colors, player),
		Commands::Verify {
			input,
			colors,
			player,
		} => cmd_verify(&input, colors, player),
	}
}

fn load_colors(path: Option<PathBuf>) -> anyhow::Result<PlayerColors> {
	match path {
		Some(path) => {
			let colors = PlayerColors::open(&path)?;
			info!("loaded player colors from {}", path.display());
			Ok(colors)
		}
		None => Ok(PlayerColors::new()),
	}
}

fn cmd_info(input: &Path, json: bool) -> anyhow::Result<()> {
	let tgr = TgrFile::open(input)?;
	let header = tgr.header();

	let summary = FileSummary {
		version: header.version(),
		bits_per_pixel: header.bits_per_pixel(),
		width: header.size().0,
		height: header.size().1,
		hotspot: header.hotspot(),
		frame_count: tgr.frame_count(),
		animation_count: header.animations().len(),
		frames: header
			.entries()
			.iter()
			.enumerate()
			.map(|(index, entry)| FrameSummary {
				index,
				width: entry.width(),
				height: entry.height(),
				x: entry.ulx,
				y: entry.uly,
				offset: entry.offset,
				padding: entry.is_padding(),
			})
			.collect(),
	};

	if json {
		println!("{}", serde_json::to_string_pretty(&summary)?);
		return Ok(());
	}

	println!("{header}");
	for frame in &summary.frames {
		if frame.padding {
			println!("  frame {:3}: padding", frame.index);
		} else {
			println!(
				"  frame {:3}: {}x{} at ({}, {}), offset 0x{:08X}",
				frame.index, frame.width, frame.height, frame.x, frame.y, frame.offset
			);
		}
	}
	for (index, animation) in header.animations().iter().enumerate() {
		println!(
			"  animation {index}: start {}, {} frames, {} variants",
			animation.start_frame, animation.frame_count, animation.animation_count
		);
	}
	Ok(())
}

fn cmd_unpack(
	input: &Path,
	output: Option<PathBuf>,
	colors: Option<PathBuf>,
	player: u8,
) -> anyhow::Result<()> {
	let tgr = TgrFile::open(input)?;
	let colors = load_colors(colors)?;
	let out_dir = output.unwrap_or_else(|| input.with_extension(""));
	fs::create_dir_all(&out_dir)?;

	let (canvas_width, canvas_height) = tgr.header().size();
	let mut padding_frames = Vec::new();

	for index in 0..tgr.frame_count() {
		let entry = tgr.header().entries()[index];
		if entry.is_padding() {
			info!("frame {index} is a padding frame");
			padding_frames.push(index);
			continue;
		}

		let image = tgr.decode_frame(index, &colors, player)?;
		let mut canvas = RgbaImage::new(u32::from(canvas_width), u32::from(canvas_height));
		for (y, row) in image.rows().enumerate() {
			for (x, pixel) in row.iter().enumerate() {
				let cx = u32::from(entry.ulx) + x as u32;
				let cy = u32::from(entry.uly) + y as u32;
				if cx < canvas.width() && cy < canvas.height() {
					canvas.put_pixel(cx, cy, image::Rgba([pixel.r, pixel.g, pixel.b, pixel.a]));
				}
			}
		}

		let path = out_dir.join(format!("fram_{index:04}.png"));
		canvas.save(&path)?;
		info!("wrote {}", path.display());
	}

	let ini = SpriteIni {
		// Repacking always writes direct color
		bit_depth: 16,
		hotspot: tgr.header().hotspot(),
		bounding_box: tgr.header().bounding_box(),
		padding_frames,
		animations: tgr.header().animations().to_vec(),
	};
	ini.save(out_dir.join("sprite.ini"))?;
	info!("wrote {}", out_dir.join("sprite.ini").display());

	Ok(())
}

fn frame_number(path: &Path) -> Option<usize> {
	let stem = path.file_stem()?.to_str()?;
	stem.strip_prefix("fram_")?.parse().ok()
}

fn cmd_pack(
	input: &Path,
	output: &Path,
	colors: Option<PathBuf>,
	player: u8,
) -> anyhow::Result<()> {
	let ini = SpriteIni::open(input.join("sprite.ini"))?;
	let colors = load_colors(colors)?;

	let mut frame_paths: Vec<(usize, PathBuf)> = Vec::new();
	for dir_entry in fs::read_dir(input)? {
		let path = dir_entry?.path();
		if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")) {
			match frame_number(&path) {
				Some(index) => frame_paths.push((index, path)),
				None => warn!("skipping {} (not a fram_NNNN.png)", path.display()),
			}
		}
	}
	frame_paths.sort();
	anyhow::ensure!(!frame_paths.is_empty(), "no fram_NNNN.png files in {}", input.display());

	let frame_count = frame_paths
		.iter()
		.map(|(index, _)| index + 1)
		.chain(ini.padding_frames.iter().map(|index| index + 1))
		.max()
		.unwrap_or(0);

	let first = image::open(&frame_paths[0].1)?.into_rgba8();
	let (width, height) = (first.width() as u16, first.height() as u16);

	let mut builder = TgrFileBuilder::new(width, height);
	builder.apply_sprite_ini(&ini)?;
	if let Some(shades) = colors.player(player) {
		builder.set_player_colors(shades);
	}

	let mut by_index = frame_paths.into_iter();
	for index in 0..frame_count {
		if ini.padding_frames.contains(&index) {
			builder.add_padding_frame();
			continue;
		}
		let Some((next_index, path)) = by_index.next() else {
			anyhow::bail!("missing frame {index}");
		};
		anyhow::ensure!(next_index == index, "missing frame {index}");

		let png = image::open(&path)?.into_rgba8();
		anyhow::ensure!(
			(png.width() as u16, png.height() as u16) == (width, height),
			"frame {index} size {}x{} does not match frame 0 size {width}x{height}",
			png.width(),
			png.height()
		);
		let pixels: Vec<Pixel> =
			png.pixels().map(|p| Pixel::new(p.0[0], p.0[1], p.0[2], p.0[3])).collect();
		builder.add_frame(pixels)?;
	}

	fs::write(output, builder.build()?)?;
	info!("wrote {}", output.display());
	Ok(())
}

fn cmd_verify(input: &Path, colors: Option<PathBuf>, player: u8) -> anyhow::Result<()> {
	let tgr = TgrFile::open(input)?;
	let colors = load_colors(colors)?;
	let shades = colors.player(player);
	let encoder = LineEncoder::new(shades);
	let decoder = LineDecoder::new(ColorMode::Rgb565, None, shades, player)?;

	let mut checked = 0usize;
	let mut failed = 0usize;

	for index in 0..tgr.frame_count() {
		let image = tgr.decode_frame(index, &colors, player)?;
		for (line_index, row) in image.rows().enumerate() {
			checked += 1;
			let packed = match encoder.encode_line(row) {
				Ok(packed) => packed,
				Err(e) => {
					warn!("frame {index}, line {line_index}: {e}");
					failed += 1;
					continue;
				}
			};

			let mut cursor = std::io::Cursor::new(packed.as_slice());
			let line = Line::from_reader(&mut cursor)?;
			let mut decoded = decoder.decode_line(&mut cursor, &line)?;
			decoded.resize(row.len(), Pixel::TRANSPARENT);

			if decoded.as_slice() != row {
				warn!("frame {index}, line {line_index}: pixel mismatch after re-encode");
				failed += 1;
			}
		}
	}

	if failed == 0 {
		info!("verified {checked} lines, all round-trip");
	} else {
		warn!("{failed} of {checked} lines failed to round-trip");
	}
	Ok(())
}
