//! This crate provides core data types and file format support for the `tgr-rs` project.
//!
//! # File Formats
//!
//! - **TGR**: IFF-based sprite containers holding run-length-encoded frames
//!   for buildings, units and UI portraits
//! - **COLORS.INI**: faction tint tables resolved against player-color
//!   opcodes at draw time
//! - **sprite.ini**: per-sprite repack metadata written next to extracted
//!   frames so they can be packed back into a TGR
//!
//! # Examples
//!
//! ```no_run
//! use tgr_types::file::TgrFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tgr = TgrFile::open("ELFARCHER.TGR")?;
//! println!("{} frames, {}bpp", tgr.frame_count(), tgr.header().bits_per_pixel());
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	Animation, ColorMode, Frame, FrameEntry, FrameImage, Line, Palette, Pixel, PlayerColors,
	PlayerColorsError, ShadeTable, SpriteIni, SpriteIniError, TgrError, TgrFile, TgrFileBuilder,
};
