//! # chromaflow - Color Conversion Core
//!
//! A color management conversion core in safe Rust: it converts color
//! values between color spaces (device RGB presets, CIE XYZ, Lab, LCH,
//! Luv, xyY, HSV, HSL, YCbCr, CMY, CMYK, Gray) and executes ICC
//! profile transforms, planning each conversion once and running it
//! allocation-free per call.
//!
//! ## Architecture
//!
//! 1. A pluggable registry of conversion primitives and chromatic
//!    adaptation methods, seeded on first use
//! 2. A planner choosing among direct, PCS-mediated, and device-link
//!    paths using ICC profile class semantics
//! 3. An assembler fusing the chosen stages into one flat op list per
//!    `(input, output)` pair, with adjacent matrices multiplied together
//! 4. A numerics layer agreeing with ICC arithmetic: matrix/TRC chains,
//!    CLUT interpolation (tetrahedral/trilinear/N-linear), PCS encoding
//!
//! ## Quick Start
//!
//! ```
//! use chromaflow::{Color, Converter, RgbColorspace, white_point};
//!
//! // An Adobe RGB color, converted to XYZ under D50
//! let mut input = Color::rgb(0.35, 0.17, 0.63, RgbColorspace::ADOBE_RGB);
//! let mut output = Color::xyz(0.0, 0.0, 0.0, white_point::D50);
//!
//! let mut converter = Converter::new(&mut input, &mut output).unwrap();
//! converter.convert().unwrap();
//!
//! // Feed new inputs without replanning
//! converter.input_values_mut().copy_from_slice(&[0.1, 0.5, 0.9]);
//! converter.convert().unwrap();
//! ```
//!
//! Converters are independent: different instances may run concurrently
//! on different threads as long as they do not share colors. A single
//! converter is not internally synchronized.

pub mod color;
pub mod config;
pub mod error;
pub mod icc;
pub mod math;
pub mod pipeline;
pub mod planner;
pub mod primitives;
pub mod registry;

mod converter;

pub use color::{
    white_point, Chromaticity, Color, ColorKind, Colorspace, RgbColorspace, WhitePoint, Xyz,
};
pub use config::{
    set_clut_interpolation, set_default_chromatic_adaptation, set_default_rendering_intent,
    settings, Settings,
};
pub use converter::Converter;
pub use error::{Error, Result};
pub use icc::{
    Clut, ClutInterpolation, Curve, DataColorSpace, IccProfile, IccProfileBuilder, LutData,
    MatrixShaper, PcsType, ProfileClass, RenderingIntent,
};
pub use math::adaptation::CatSpec;
pub use primitives::ConversionPath;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
