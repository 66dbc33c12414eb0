//! Pipeline assembly and execution
//!
//! The assembler lowers a [`Plan`](crate::planner::Plan) into a flat list
//! of compiled ops with every numeric asset bound: companding closures,
//! fused 3x3 matrices, direction-bound ICC transforms. Assembly happens
//! once per converter; execution does no planning and no allocation.
//!
//! Ops read and write through pinned buffer bindings: the converter's
//! input values, its output values, or one of two preallocated ping-pong
//! temp buffers held in [`ConversionData`]. A fixed stack scratch array
//! carries each op's input so reads never alias writes.

use std::sync::Arc;

use tracing::debug;

use crate::color::{RgbColorspace, WhitePoint};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::icc::IccTransform;
use crate::math::interpolation::MAX_CHANNELS;
use crate::math::Matrix3x3;
use crate::planner::{Plan, PlannedStage};
use crate::registry;

/// Parameters a primitive stage is bound to at plan time
#[derive(Debug, Clone)]
pub struct StageParams {
    /// Governing white point for this hop
    pub white: WhitePoint,
    /// RGB working space, for hops touching the RGB family
    pub rgb: Option<RgbColorspace>,
}

/// A bound stage body: reads the input slice, writes the output slice
pub type StageFn = Arc<dyn Fn(&[f64], &mut [f64]) + Send + Sync>;

/// One compiled operation
#[derive(Clone)]
pub enum OpKind {
    /// A bound primitive body
    Func(StageFn),
    /// A 3x3 matrix multiply (linear RGB↔XYZ, chromatic adaptation)
    Matrix(Matrix3x3),
    /// A direction-bound ICC transform
    Icc(Box<IccTransform>),
    /// Channel copy
    Assign,
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Func(_) => f.write_str("Func"),
            OpKind::Matrix(_) => f.write_str("Matrix"),
            OpKind::Icc(t) => write!(f, "Icc({:?})", t.direction()),
            OpKind::Assign => f.write_str("Assign"),
        }
    }
}

/// An op with its channel arity
#[derive(Debug, Clone)]
pub struct Op {
    pub kind: OpKind,
    pub in_ch: usize,
    pub out_ch: usize,
}

/// Read binding of a compiled op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadRef {
    In,
    Temp(usize),
}

/// Write binding of a compiled op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteRef {
    Out,
    Temp(usize),
}

/// An op bound to its buffers
#[derive(Debug)]
pub(crate) struct CompiledOp {
    op: Op,
    read: ReadRef,
    write: WriteRef,
}

/// The assembled transform: ops in execution order
#[derive(Debug)]
pub(crate) struct CompiledPipeline {
    ops: Vec<CompiledOp>,
}

impl CompiledPipeline {
    /// Number of compiled ops
    pub(crate) fn len(&self) -> usize {
        self.ops.len()
    }

    /// Drop the compiled ops and their bound assets
    pub(crate) fn release(&mut self) {
        self.ops.clear();
    }

    /// Op kind names in execution order, for plan inspection
    pub(crate) fn op_names(&self) -> Vec<&'static str> {
        self.ops
            .iter()
            .map(|c| match c.op.kind {
                OpKind::Func(_) => "primitive",
                OpKind::Matrix(_) => "matrix",
                OpKind::Icc(_) => "icc",
                OpKind::Assign => "assign",
            })
            .collect()
    }
}

/// Converter-owned side table: the preallocated temp buffers
///
/// Dropped before the borrowed color buffers are released, matching the
/// dispose order temps → tables → pins.
#[derive(Debug, Default)]
pub struct ConversionData {
    temps: Vec<Box<[f64]>>,
}

impl ConversionData {
    /// Release the temp buffers
    pub(crate) fn release(&mut self) {
        self.temps.clear();
    }
}

/// Lower a plan into compiled ops and allocate its temp buffers
pub(crate) fn assemble(
    plan: &Plan,
    settings: &Settings,
    input_channels: usize,
    output_channels: usize,
) -> Result<(CompiledPipeline, ConversionData)> {
    // 1. Lower stages to ops
    let mut ops: Vec<Op> = Vec::new();
    for stage in &plan.stages {
        match stage {
            PlannedStage::Primitive { path, params } => {
                let built = (path.build.as_ref())(params)?;
                ops.extend(built);
            }
            PlannedStage::Cat { method, from, to } => {
                let matrix = registry::cat_matrix(method, from, to);
                ops.push(Op {
                    kind: OpKind::Matrix(matrix),
                    in_ch: 3,
                    out_ch: 3,
                });
            }
            PlannedStage::IccForward { profile } => {
                let transform = IccTransform::device_to_pcs(
                    profile,
                    settings.rendering_intent,
                    settings.clut_interpolation,
                )?;
                ops.push(Op {
                    in_ch: transform.input_channels(),
                    out_ch: transform.output_channels(),
                    kind: OpKind::Icc(Box::new(transform)),
                });
            }
            PlannedStage::IccBackward { profile } => {
                let transform = IccTransform::pcs_to_device(
                    profile,
                    settings.rendering_intent,
                    settings.clut_interpolation,
                )?;
                ops.push(Op {
                    in_ch: transform.input_channels(),
                    out_ch: transform.output_channels(),
                    kind: OpKind::Icc(Box::new(transform)),
                });
            }
            PlannedStage::Assign { channels } => {
                ops.push(Op {
                    kind: OpKind::Assign,
                    in_ch: *channels,
                    out_ch: *channels,
                });
            }
        }
    }

    if ops.is_empty() {
        return Err(Error::setup("plan produced no operations"));
    }

    // 2. Fuse adjacent matrices: later · earlier
    let mut fused: Vec<Op> = Vec::with_capacity(ops.len());
    for op in ops {
        if let OpKind::Matrix(m) = &op.kind {
            if let Some(prev) = fused.last_mut() {
                if let OpKind::Matrix(pm) = &prev.kind {
                    let combined = m.multiply(pm);
                    prev.kind = OpKind::Matrix(combined);
                    continue;
                }
            }
        }
        fused.push(op);
    }

    // 3. Channel continuity
    if fused[0].in_ch != input_channels {
        return Err(Error::setup(format!(
            "pipeline expects {} input channels, color has {}",
            fused[0].in_ch, input_channels
        )));
    }
    if fused[fused.len() - 1].out_ch != output_channels {
        return Err(Error::setup(format!(
            "pipeline produces {} channels, output color has {}",
            fused[fused.len() - 1].out_ch,
            output_channels
        )));
    }
    for pair in fused.windows(2) {
        if pair[0].out_ch != pair[1].in_ch {
            return Err(Error::setup(format!(
                "stage channel mismatch: {} produced, {} consumed",
                pair[0].out_ch, pair[1].in_ch
            )));
        }
    }

    // 4. Bind buffers: single op goes straight through, otherwise
    //    intermediate values ping-pong between two temps
    let last = fused.len() - 1;
    let max_ch = fused
        .iter()
        .flat_map(|op| [op.in_ch, op.out_ch])
        .max()
        .unwrap_or(0)
        .min(MAX_CHANNELS);

    let mut compiled = Vec::with_capacity(fused.len());
    for (i, op) in fused.into_iter().enumerate() {
        let read = if i == 0 { ReadRef::In } else { ReadRef::Temp((i - 1) % 2) };
        let write = if i == last {
            WriteRef::Out
        } else {
            WriteRef::Temp(i % 2)
        };
        compiled.push(CompiledOp { op, read, write });
    }

    let temps = if compiled.len() > 1 {
        vec![
            vec![0.0; max_ch].into_boxed_slice(),
            vec![0.0; max_ch].into_boxed_slice(),
        ]
    } else {
        Vec::new()
    };

    let pipeline = CompiledPipeline { ops: compiled };
    debug!(
        ops = pipeline.len(),
        temps = temps.len(),
        "assembled conversion pipeline"
    );

    Ok((pipeline, ConversionData { temps }))
}

/// Execute the assembled ops
///
/// Reentrant for a single converter; allocation-free.
pub(crate) fn execute(
    pipeline: &CompiledPipeline,
    data: &mut ConversionData,
    input: &[f64],
    output: &mut [f64],
) {
    let mut scratch = [0.0f64; MAX_CHANNELS];

    for c in &pipeline.ops {
        let n_in = c.op.in_ch;
        {
            let src: &[f64] = match c.read {
                ReadRef::In => input,
                ReadRef::Temp(i) => &data.temps[i],
            };
            scratch[..n_in].copy_from_slice(&src[..n_in]);
        }

        let dst: &mut [f64] = match c.write {
            WriteRef::Out => output,
            WriteRef::Temp(i) => &mut data.temps[i],
        };

        match &c.op.kind {
            OpKind::Func(f) => (f.as_ref())(&scratch[..n_in], &mut dst[..c.op.out_ch]),
            OpKind::Matrix(m) => {
                let v = m.multiply_vec([scratch[0], scratch[1], scratch[2]]);
                dst[..3].copy_from_slice(&v);
            }
            OpKind::Icc(t) => t.apply(&scratch[..n_in], &mut dst[..c.op.out_ch]),
            OpKind::Assign => dst[..c.op.out_ch].copy_from_slice(&scratch[..c.op.out_ch]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::D65;
    use crate::color::ColorKind;
    use crate::primitives;

    fn params() -> StageParams {
        StageParams {
            white: D65,
            rgb: Some(RgbColorspace::SRGB),
        }
    }

    fn find_path(from: ColorKind, to: ColorKind) -> primitives::ConversionPath {
        primitives::builtin_paths()
            .into_iter()
            .find(|p| p.from == from && p.to == to)
            .unwrap()
    }

    #[test]
    fn test_assemble_assign_only() {
        let plan = Plan {
            stages: vec![PlannedStage::Assign { channels: 3 }],
        };
        let (pipeline, mut data) = assemble(&plan, &Settings::default(), 3, 3).unwrap();
        assert_eq!(pipeline.len(), 1);

        let input = [0.1, 0.2, 0.3];
        let mut output = [0.0; 3];
        execute(&pipeline, &mut data, &input, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn test_matrix_fusion() {
        // RGB→XYZ then XYZ→RGB in the same space: the two matrices fuse
        // into one (identity), leaving decode / fused matrix / encode
        let plan = Plan {
            stages: vec![
                PlannedStage::Primitive {
                    path: find_path(ColorKind::Rgb, ColorKind::Xyz),
                    params: params(),
                },
                PlannedStage::Primitive {
                    path: find_path(ColorKind::Xyz, ColorKind::Rgb),
                    params: params(),
                },
            ],
        };
        let (pipeline, mut data) = assemble(&plan, &Settings::default(), 3, 3).unwrap();
        assert_eq!(pipeline.op_names(), vec!["primitive", "matrix", "primitive"]);

        let input = [0.25, 0.5, 0.75];
        let mut output = [0.0; 3];
        execute(&pipeline, &mut data, &input, &mut output);
        for c in 0..3 {
            assert!(
                (output[c] - input[c]).abs() < 1e-12,
                "fused identity failed: {:?}",
                output
            );
        }
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        // Gray→XYZ stage against a 3-channel input color
        let plan = Plan {
            stages: vec![PlannedStage::Primitive {
                path: find_path(ColorKind::Gray, ColorKind::Xyz),
                params: params(),
            }],
        };
        assert!(assemble(&plan, &Settings::default(), 3, 3).is_err());
    }

    #[test]
    fn test_execute_multi_stage_chain() {
        // CMYK → CMY → RGB, exercising the temp ping-pong and a 4→3 hop
        let plan = Plan {
            stages: vec![
                PlannedStage::Primitive {
                    path: find_path(ColorKind::Cmyk, ColorKind::Cmy),
                    params: params(),
                },
                PlannedStage::Primitive {
                    path: find_path(ColorKind::Cmy, ColorKind::Rgb),
                    params: params(),
                },
            ],
        };
        let (pipeline, mut data) = assemble(&plan, &Settings::default(), 4, 3).unwrap();

        let input = [0.0, 0.0, 0.0, 0.0]; // no ink
        let mut output = [0.0; 3];
        execute(&pipeline, &mut data, &input, &mut output);
        assert_eq!(output, [1.0, 1.0, 1.0]); // paper white
    }
}
