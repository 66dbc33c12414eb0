//! The conversion facade
//!
//! A [`Converter`] is constructed once against an input/output color pair
//! (expensive: registry snapshot, planning, assembly) and then executes
//! its assembled pipeline per [`Converter::convert`] call (cheap: no
//! planning, no validation beyond the disposed flag, no allocation).
//!
//! The converter exclusively borrows both colors for its lifetime, the
//! safe rendition of the pinned-buffer contract: buffer addresses cannot
//! change while the converter lives, and new input values are fed through
//! [`Converter::input_values_mut`] between calls.

use tracing::debug;

use crate::color::{Color, ColorKind};
use crate::config;
use crate::error::{Error, Result};
use crate::math::adaptation::CatSpec;
use crate::pipeline::{self, CompiledPipeline, ConversionData};
use crate::planner;
use crate::primitives::ConversionPath;
use crate::registry;

/// A planned, assembled color conversion bound to two colors
#[derive(Debug)]
pub struct Converter<'a> {
    input: &'a mut Color,
    output: &'a mut Color,
    pipeline: CompiledPipeline,
    data: ConversionData,
    disposed: bool,
}

impl<'a> Converter<'a> {
    /// Plan and assemble a conversion between two bound colors
    ///
    /// Initializes the process-wide registries on first use. Fails with
    /// [`Error::ConversionSetup`] when no plan bridges the two spaces and
    /// [`Error::IccProfileInvariant`] when a profile's tag set cannot
    /// produce the required stage.
    pub fn new(input: &'a mut Color, output: &'a mut Color) -> Result<Self> {
        registry::init();
        let settings = config::settings();
        let snapshot = registry::snapshot();

        let plan = planner::plan(input, output, &snapshot, &settings)?;
        let (compiled, data) =
            pipeline::assemble(&plan, &settings, input.channels(), output.channels())?;

        debug!(
            from = %input.kind(),
            to = %output.kind(),
            ops = compiled.len(),
            "constructed converter"
        );

        Ok(Self {
            input,
            output,
            pipeline: compiled,
            data,
            disposed: false,
        })
    }

    /// Execute the assembled pipeline in place
    ///
    /// Reads the input color's current values and overwrites the output
    /// color's values. The only failure mode is a disposed converter.
    pub fn convert(&mut self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        let Self {
            input,
            output,
            pipeline,
            data,
            ..
        } = self;
        pipeline::execute(pipeline, data, input.values(), output.values_mut());
        Ok(())
    }

    /// The bound input color
    pub fn input(&self) -> &Color {
        self.input
    }

    /// Mutable input values, for feeding the next `convert()` call
    pub fn input_values_mut(&mut self) -> &mut [f64] {
        self.input.values_mut()
    }

    /// The bound output color
    pub fn output(&self) -> &Color {
        self.output
    }

    /// Compiled op kind names in execution order, for inspection
    pub fn stage_kinds(&self) -> Vec<&'static str> {
        self.pipeline.op_names()
    }

    /// Release the pipeline, temp buffers, and borrowed-buffer bindings
    ///
    /// Idempotent; `convert()` afterwards fails with [`Error::Disposed`].
    /// Release order: temps, then per-stage assets, then the borrows end
    /// when the converter is dropped.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.data.release();
        self.pipeline.release();
        self.disposed = true;
    }

    /// Whether this converter has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ------------------------------------------------------------------
    // Process-wide registry surface
    // ------------------------------------------------------------------

    /// Initialize the conversion registries (idempotent, thread-safe)
    pub fn init() {
        registry::init();
    }

    /// Registered (input kind, output kind) pairs
    pub fn conversion_paths() -> Vec<(ColorKind, ColorKind)> {
        registry::conversion_paths()
    }

    /// Registered chromatic adaptation method names
    pub fn chromatic_adaptations() -> Vec<&'static str> {
        registry::chromatic_adaptations()
    }

    /// Register a conversion path for converters constructed afterward
    pub fn add_conversion_path(path: ConversionPath) {
        registry::add_conversion_path(path);
    }

    /// Remove all paths for a (from, to) pair; returns true if any existed
    pub fn remove_conversion_path(from: ColorKind, to: ColorKind) -> bool {
        registry::remove_conversion_path(from, to)
    }

    /// Register a chromatic adaptation method, replacing any same-named one
    pub fn add_chromatic_adaptation(spec: CatSpec) {
        registry::add_chromatic_adaptation(spec);
    }

    /// Remove a chromatic adaptation method by name
    pub fn remove_chromatic_adaptation(name: &str) -> bool {
        registry::remove_chromatic_adaptation(name)
    }
}

impl Drop for Converter<'_> {
    fn drop(&mut self) {
        // Finalizer path: release resources if the user forgot to dispose
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{D50, D65};
    use crate::color::RgbColorspace;

    #[test]
    fn test_identity_conversion() {
        let mut input = Color::lab(50.0, 20.0, -30.0, D50);
        let mut output = Color::lab(0.0, 0.0, 0.0, D50);
        let mut converter = Converter::new(&mut input, &mut output).unwrap();
        converter.convert().unwrap();
        assert_eq!(converter.output().values(), &[50.0, 20.0, -30.0]);
    }

    #[test]
    fn test_reuse_with_new_inputs() {
        let mut input = Color::lab(50.0, 20.0, -30.0, D50);
        let mut output = Color::lch_ab(0.0, 0.0, 0.0, D50);
        let mut converter = Converter::new(&mut input, &mut output).unwrap();

        converter.convert().unwrap();
        let first_c = converter.output().values()[1];
        assert!((first_c - 36.0555).abs() < 1e-3);

        converter.input_values_mut().copy_from_slice(&[70.0, 0.0, 0.0]);
        converter.convert().unwrap();
        assert!((converter.output().values()[0] - 70.0).abs() < 1e-12);
        assert!(converter.output().values()[1].abs() < 1e-12);
    }

    #[test]
    fn test_dispose_is_idempotent_and_blocks_convert() {
        let mut input = Color::xyz(0.3, 0.4, 0.5, D65);
        let mut output = Color::lab(0.0, 0.0, 0.0, D65);
        let mut converter = Converter::new(&mut input, &mut output).unwrap();

        converter.convert().unwrap();
        converter.dispose();
        converter.dispose();
        assert!(converter.is_disposed());
        assert!(matches!(converter.convert(), Err(Error::Disposed)));
    }

    #[test]
    fn test_gray_routes_to_hsv() {
        // Gray reaches HSV through XYZ and the output's RGB space
        let mut input = Color::gray(0.5, D65);
        let mut output = Color::hsv(0.0, 0.0, 0.0, RgbColorspace::SRGB);
        let mut converter = Converter::new(&mut input, &mut output).unwrap();
        converter.convert().unwrap();
        // A neutral gray has zero saturation
        assert!(converter.output().values()[1].abs() < 1e-9);
    }

    #[test]
    fn test_registry_surface() {
        Converter::init();
        assert!(!Converter::conversion_paths().is_empty());
        assert!(Converter::chromatic_adaptations().contains(&"Bradford"));
    }
}
