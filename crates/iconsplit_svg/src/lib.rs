//! Master drawing model and symbolic icon post-processing
//!
//! This crate turns an Inkscape master drawing into a typed catalog of
//! layers and icon groups, and strips background paths from the files the
//! editor writes back. It uses `roxmltree` for parsing; edits are applied as
//! byte-range removals so untouched markup survives verbatim.
//!
//! # Example
//!
//! ```ignore
//! use iconsplit_svg::MasterDrawing;
//!
//! let drawing = MasterDrawing::from_file("src/icons/icons.svg")?;
//! for (layer, icon) in drawing.renderable() {
//!     println!("{}/{}", layer.label, icon.id);
//! }
//! ```

mod background;
mod document;
mod error;
mod style;

pub use background::strip_background_paths;
pub use document::{GroupLocation, IconGroup, Layer, MasterDrawing};
pub use error::{LookupError, SvgError};
