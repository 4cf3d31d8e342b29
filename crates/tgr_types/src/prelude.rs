//! Prelude module for `tgr_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use tgr_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let colors = PlayerColors::open("COLORS.INI")?;
//! let tgr = TgrFile::open("KEEP.TGR")?;
//! let image = tgr.decode_frame(0, &colors, 2)?;
//! # Ok(())
//! # }
//! ```

#[doc(inline)]
pub use crate::file::{
	// Player color types
	Animation,
	ColorMode,
	Frame,
	FrameEntry,
	FrameImage,
	// Line codec types
	Line,
	LineDecoder,
	LineEncoder,
	Palette,

	// Pixel types
	Pixel,
	PlayerColors,
	PlayerColorsError,
	ShadeTable,

	// Sprite metadata types
	SpriteIni,
	SpriteIniError,
	TgrError,

	// TGR container types
	TgrFile,
	TgrFileBuilder,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
