//! File type support for the `tgr-rs` project.

mod error;

pub mod colors_ini;
pub mod iff;
pub mod sprite_ini;
pub mod tgr;

// Re-export error types
pub use error::{PlayerColorsError, SpriteIniError, TgrError};

// Re-export main file types
pub use colors_ini::{PlayerColors, ShadeTable};
pub use sprite_ini::SpriteIni;
pub use tgr::{
	Animation, ColorMode, File as TgrFile, FileBuilder as TgrFileBuilder, Frame, FrameEntry,
	FrameImage, Header as TgrHeader, Line, LineDecoder, LineEncoder, Palette, Pixel,
};
