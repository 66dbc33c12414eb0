//! ICC profile model and transform engine
//!
//! This module consumes *validated, in-memory* ICC profiles: the binary
//! reader/writer (tag parsing, signature tables, byte layout) lives
//! outside the conversion core. Profiles are built programmatically
//! through [`IccProfileBuilder`], which enforces the structural invariants
//! the engine relies on.
//!
//! # Structure
//!
//! - [`profile`]: profile classes, PCS/data color spaces, tag set
//! - [`lut`]: shaper curves, multi-dimensional CLUTs, LUT chains
//! - [`transform`]: direction-bound transform chains (device↔PCS)

pub mod lut;
pub mod profile;
pub mod transform;

pub use lut::{Clut, ClutInterpolation, Curve, LutData};
pub use profile::{
    DataColorSpace, IccProfile, IccProfileBuilder, MatrixShaper, PcsType, ProfileClass,
    ProfileVersion, RenderingIntent,
};
pub use transform::{IccDirection, IccTransform};
