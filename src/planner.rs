//! Conversion planning
//!
//! Given the input and output colors, the planner decides the ordered
//! stage sequence bridging their spaces: primitive hops discovered in the
//! path registry, chromatic adaptation between differing whites, and ICC
//! stages driven by profile class semantics.
//!
//! Non-ICC routes meet in XYZ (the hub); polar forms reach their
//! cartesian base directly when no re-parameterization is needed. Ties
//! break toward fewer stages, then toward chains without adaptation;
//! adaptation uses the process-default method unless overridden.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::color::white_point::D50;
use crate::color::{Color, ColorKind, Colorspace, RgbColorspace, WhitePoint};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::icc::{IccProfile, ProfileClass};
use crate::math::adaptation::CatSpec;
use crate::pipeline::StageParams;
use crate::primitives::ConversionPath;
use crate::registry::RegistrySnapshot;

/// An ordered, non-empty stage list
#[derive(Debug)]
pub struct Plan {
    pub stages: Vec<PlannedStage>,
}

/// One planned stage
#[derive(Debug)]
pub enum PlannedStage {
    /// A registered primitive hop with bound parameters
    Primitive {
        path: ConversionPath,
        params: StageParams,
    },
    /// Chromatic adaptation between two whites
    Cat {
        method: CatSpec,
        from: WhitePoint,
        to: WhitePoint,
    },
    /// One profile's device → PCS chain (PCS → PCS for Abstract)
    IccForward { profile: Arc<IccProfile> },
    /// One profile's PCS → device chain
    IccBackward { profile: Arc<IccProfile> },
    /// Plain channel copy
    Assign { channels: usize },
}

impl PlannedStage {
    /// Stage kind name, for plan inspection and tests
    pub fn name(&self) -> &'static str {
        match self {
            PlannedStage::Primitive { .. } => "primitive",
            PlannedStage::Cat { .. } => "cat",
            PlannedStage::IccForward { .. } => "icc-forward",
            PlannedStage::IccBackward { .. } => "icc-backward",
            PlannedStage::Assign { .. } => "assign",
        }
    }
}

impl Plan {
    /// Stage kind names in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(PlannedStage::name).collect()
    }
}

/// Plan a conversion between two bound colors
pub fn plan(
    input: &Color,
    output: &Color,
    snap: &RegistrySnapshot,
    settings: &Settings,
) -> Result<Plan> {
    let in_profile = input.space().icc_profile().cloned();
    let out_profile = output.space().icc_profile().cloned();

    let stages = match (in_profile, out_profile) {
        (None, None) => plan_primitive_route(
            input.kind(),
            input.space(),
            output.kind(),
            output.space(),
            snap,
            settings,
        )?,
        (Some(profile), None) => plan_one_icc(&profile, true, input, output, snap, settings)?,
        (None, Some(profile)) => plan_one_icc(&profile, false, input, output, snap, settings)?,
        (Some(p1), Some(p2)) => plan_two_icc(&p1, &p2, input, output, snap)?,
    };

    debug!(
        from = %input.kind(),
        to = %output.kind(),
        stages = ?stages.iter().map(PlannedStage::name).collect::<Vec<_>>(),
        "planned conversion"
    );
    Ok(Plan { stages })
}

/// One side's effective parameterization
struct Side {
    kind: ColorKind,
    white: WhitePoint,
    rgb: Option<RgbColorspace>,
}

/// Resolve a side's governing white and RGB binding
///
/// RGB-family kinds use their own working space. Naive CMY/CMYK borrow
/// the opposite side's RGB space when it has one, defaulting to sRGB.
fn resolve_side(kind: ColorKind, space: &Colorspace, other: &Colorspace) -> Side {
    if kind.is_rgb_family() {
        let rgb = space.rgb().cloned().unwrap_or(RgbColorspace::SRGB);
        Side {
            kind,
            white: rgb.white,
            rgb: Some(rgb),
        }
    } else if matches!(kind, ColorKind::Cmy | ColorKind::Cmyk) {
        let rgb = other.rgb().cloned().unwrap_or(RgbColorspace::SRGB);
        Side {
            kind,
            white: rgb.white,
            rgb: Some(rgb),
        }
    } else {
        Side {
            kind,
            white: space.white_point(),
            rgb: None,
        }
    }
}

impl Side {
    fn params(&self) -> StageParams {
        StageParams {
            white: self.white,
            rgb: self.rgb.clone(),
        }
    }
}

/// Plan a route involving no ICC profile
fn plan_primitive_route(
    in_kind: ColorKind,
    in_space: &Colorspace,
    out_kind: ColorKind,
    out_space: &Colorspace,
    snap: &RegistrySnapshot,
    settings: &Settings,
) -> Result<Vec<PlannedStage>> {
    if in_kind == out_kind && in_space.same_parameters(out_space) {
        return Ok(vec![PlannedStage::Assign {
            channels: in_kind.channels(),
        }]);
    }

    let src = resolve_side(in_kind, in_space, out_space);
    let dst = resolve_side(out_kind, out_space, in_space);

    let whites_equal = src.white.approx_eq(&dst.white, 1e-6);
    let bindings_equal = whites_equal && src.rgb == dst.rgb;

    // One binding governs both ends: take the shortest direct chain
    if bindings_equal {
        if let Some(hops) = shortest_chain(snap, src.kind, dst.kind) {
            if hops.is_empty() {
                // Same kind under equivalent effective bindings
                return Ok(vec![PlannedStage::Assign {
                    channels: in_kind.channels(),
                }]);
            }
            let params = dst.params();
            return Ok(hops
                .into_iter()
                .map(|path| PlannedStage::Primitive {
                    path,
                    params: params.clone(),
                })
                .collect());
        }
        return Err(no_route(src.kind, dst.kind));
    }

    // Differing bindings meet in XYZ, adapting iff the whites differ
    let leg_in = shortest_chain(snap, src.kind, ColorKind::Xyz)
        .ok_or_else(|| no_route(src.kind, ColorKind::Xyz))?;
    let leg_out = shortest_chain(snap, ColorKind::Xyz, dst.kind)
        .ok_or_else(|| no_route(ColorKind::Xyz, dst.kind))?;

    let mut stages = Vec::with_capacity(leg_in.len() + leg_out.len() + 1);
    let src_params = src.params();
    for path in leg_in {
        stages.push(PlannedStage::Primitive {
            path,
            params: src_params.clone(),
        });
    }

    if !whites_equal {
        stages.push(PlannedStage::Cat {
            method: resolve_cat(snap, settings)?,
            from: src.white,
            to: dst.white,
        });
    }

    let dst_params = dst.params();
    for path in leg_out {
        stages.push(PlannedStage::Primitive {
            path,
            params: dst_params.clone(),
        });
    }

    if stages.is_empty() {
        // Both ends are XYZ under the same white with distinct but
        // equivalent bindings
        stages.push(PlannedStage::Assign {
            channels: in_kind.channels(),
        });
    }
    Ok(stages)
}

/// Plan with exactly one ICC-bound side
fn plan_one_icc(
    profile: &Arc<IccProfile>,
    icc_is_input: bool,
    input: &Color,
    output: &Color,
    snap: &RegistrySnapshot,
    settings: &Settings,
) -> Result<Vec<PlannedStage>> {
    let icc_color = if icc_is_input { input } else { output };
    let other = if icc_is_input { output } else { input };
    let icc_kind = icc_color.kind();
    let pcs_kind = profile.pcs_kind();
    let pcs_space = Colorspace::Standard(D50);

    match profile.class() {
        ProfileClass::NamedColor => Err(Error::setup(
            "named color profiles carry no conversion transform",
        )),
        ProfileClass::Abstract => {
            // PCS → PCS effect: both sides must inhabit the profile's PCS
            if icc_kind == pcs_kind && other.kind() == pcs_kind {
                Ok(vec![PlannedStage::IccForward {
                    profile: Arc::clone(profile),
                }])
            } else {
                Err(Error::setup(format!(
                    "abstract profile converts {pcs_kind} → {pcs_kind}, got {} → {}",
                    input.kind(),
                    output.kind()
                )))
            }
        }
        ProfileClass::DeviceLink => {
            // A link encodes one end-to-end mapping: device in, link output out
            if input.kind() == profile.data_kind() && output.kind() == pcs_kind {
                Ok(vec![PlannedStage::IccForward {
                    profile: Arc::clone(profile),
                }])
            } else {
                Err(Error::setup(format!(
                    "device link converts {} → {} only, got {} → {}",
                    profile.data_kind(),
                    pcs_kind,
                    input.kind(),
                    output.kind()
                )))
            }
        }
        _ => {
            if icc_is_input {
                if icc_kind == profile.data_kind() {
                    // Device side in: profile forward, then bridge PCS → out
                    let mut stages = vec![PlannedStage::IccForward {
                        profile: Arc::clone(profile),
                    }];
                    stages.extend(bridge(plan_primitive_route(
                        pcs_kind,
                        &pcs_space,
                        other.kind(),
                        other.space(),
                        snap,
                        settings,
                    )?));
                    Ok(stages)
                } else if other.kind() == profile.data_kind() {
                    // PCS-side color back through the profile
                    Ok(vec![PlannedStage::IccBackward {
                        profile: Arc::clone(profile),
                    }])
                } else {
                    // PCS-side color to an unrelated space: pure primitives
                    plan_primitive_route(
                        pcs_kind,
                        &pcs_space,
                        other.kind(),
                        other.space(),
                        snap,
                        settings,
                    )
                }
            } else if icc_kind == profile.data_kind() {
                // Device side out: bridge in → PCS, then profile backward
                let mut stages = bridge(plan_primitive_route(
                    other.kind(),
                    other.space(),
                    pcs_kind,
                    &pcs_space,
                    snap,
                    settings,
                )?);
                stages.push(PlannedStage::IccBackward {
                    profile: Arc::clone(profile),
                });
                Ok(stages)
            } else if other.kind() == profile.data_kind() {
                Ok(vec![PlannedStage::IccForward {
                    profile: Arc::clone(profile),
                }])
            } else {
                plan_primitive_route(
                    other.kind(),
                    other.space(),
                    pcs_kind,
                    &pcs_space,
                    snap,
                    settings,
                )
            }
        }
    }
}

/// Plan with both sides ICC-bound
fn plan_two_icc(
    p1: &Arc<IccProfile>,
    p2: &Arc<IccProfile>,
    input: &Color,
    output: &Color,
    snap: &RegistrySnapshot,
) -> Result<Vec<PlannedStage>> {
    let abstract1 = p1.class() == ProfileClass::Abstract;
    let abstract2 = p2.class() == ProfileClass::Abstract;
    if abstract1 || abstract2 {
        // Each stage creator runs once, in order; the profiles must agree
        if abstract1
            && abstract2
            && p1.pcs() == p2.pcs()
            && input.kind() == p1.pcs_kind()
            && output.kind() == p1.pcs_kind()
        {
            return Ok(vec![PlannedStage::IccForward {
                profile: Arc::clone(p1),
            }]);
        }
        return Err(Error::setup(
            "abstract profiles pair only with a matching abstract profile",
        ));
    }

    let link1 = p1.class() == ProfileClass::DeviceLink;
    let link2 = p2.class() == ProfileClass::DeviceLink;
    if link1 || link2 {
        if link1
            && link2
            && p1.pcs() == p2.pcs()
            && p1.data_space() == p2.data_space()
            && input.kind() == p1.data_kind()
            && output.kind() == p1.pcs_kind()
        {
            return Ok(vec![PlannedStage::IccForward {
                profile: Arc::clone(p1),
            }]);
        }
        return Err(Error::setup(
            "device link profiles pair only with a matching device link",
        ));
    }

    let in_on_device = side_is_device(input.kind(), p1)?;
    let out_on_device = side_is_device(output.kind(), p2)?;
    let same_pcs = p1.pcs() == p2.pcs();

    let pcs_bridge = |stages: &mut Vec<PlannedStage>| -> Result<()> {
        if same_pcs {
            return Ok(());
        }
        let path = snap
            .path(p1.pcs_kind(), p2.pcs_kind())
            .ok_or_else(|| no_route(p1.pcs_kind(), p2.pcs_kind()))?;
        stages.push(PlannedStage::Primitive {
            path: path.clone(),
            params: StageParams {
                white: D50,
                rgb: None,
            },
        });
        Ok(())
    };

    let mut stages = Vec::new();
    match (in_on_device, out_on_device) {
        (true, true) => {
            stages.push(PlannedStage::IccForward {
                profile: Arc::clone(p1),
            });
            pcs_bridge(&mut stages)?;
            stages.push(PlannedStage::IccBackward {
                profile: Arc::clone(p2),
            });
        }
        (true, false) => {
            stages.push(PlannedStage::IccForward {
                profile: Arc::clone(p1),
            });
            pcs_bridge(&mut stages)?;
        }
        (false, true) => {
            pcs_bridge(&mut stages)?;
            stages.push(PlannedStage::IccBackward {
                profile: Arc::clone(p2),
            });
        }
        (false, false) => {
            if same_pcs {
                stages.push(PlannedStage::Assign { channels: 3 });
            } else {
                pcs_bridge(&mut stages)?;
            }
        }
    }
    Ok(stages)
}

/// Whether a color kind sits on its profile's device side
fn side_is_device(kind: ColorKind, profile: &IccProfile) -> Result<bool> {
    if kind == profile.data_kind() {
        Ok(true)
    } else if kind == profile.pcs_kind() {
        Ok(false)
    } else {
        Err(Error::setup(format!(
            "{kind} matches neither side of profile (device {}, PCS {})",
            profile.data_kind(),
            profile.pcs_kind()
        )))
    }
}

/// Drop a bridge consisting only of a plain assignment
fn bridge(stages: Vec<PlannedStage>) -> Vec<PlannedStage> {
    if stages.len() == 1 && matches!(stages[0], PlannedStage::Assign { .. }) {
        Vec::new()
    } else {
        stages
    }
}

/// Resolve the default adaptation method from the snapshot
fn resolve_cat(snap: &RegistrySnapshot, settings: &Settings) -> Result<CatSpec> {
    snap.cat_by_name(settings.chromatic_adaptation)
        .cloned()
        .ok_or_else(|| {
            Error::setup(format!(
                "chromatic adaptation method '{}' is not registered",
                settings.chromatic_adaptation
            ))
        })
}

fn no_route(from: ColorKind, to: ColorKind) -> Error {
    Error::setup(format!("no conversion path from {from} to {to}"))
}

/// Breadth-first shortest chain over the registered paths
///
/// Registration order is the deterministic tie-break: the first shortest
/// chain found wins. Returns an empty chain when the kinds are equal.
fn shortest_chain(
    snap: &RegistrySnapshot,
    from: ColorKind,
    to: ColorKind,
) -> Option<Vec<ConversionPath>> {
    if from == to {
        return Some(Vec::new());
    }

    let mut predecessor: HashMap<ColorKind, usize> = HashMap::new();
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(from);

    'search: while let Some(kind) = queue.pop_front() {
        for (idx, path) in snap.paths.iter().enumerate() {
            if path.from != kind {
                continue;
            }
            if path.to == from || predecessor.contains_key(&path.to) {
                continue;
            }
            predecessor.insert(path.to, idx);
            if path.to == to {
                break 'search;
            }
            queue.push_back(path.to);
        }
    }

    predecessor.get(&to)?;

    // Reconstruct the hop list backwards
    let mut hops = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let idx = *predecessor.get(&cursor)?;
        let path = &snap.paths[idx];
        hops.push(path.clone());
        cursor = path.from;
    }
    hops.reverse();
    Some(hops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{D50, D65};
    use crate::color::Color;
    use crate::registry;

    fn snap() -> RegistrySnapshot {
        registry::init();
        registry::snapshot()
    }

    fn plan_names(input: &Color, output: &Color) -> Result<Vec<&'static str>> {
        plan(input, output, &snap(), &Settings::default()).map(|p| p.stage_names())
    }

    #[test]
    fn test_identity_plan_is_assign() {
        let a = Color::lab(50.0, 0.0, 0.0, D50);
        let b = Color::lab(0.0, 0.0, 0.0, D50);
        assert_eq!(plan_names(&a, &b).unwrap(), vec!["assign"]);
    }

    #[test]
    fn test_polar_direct_chain_avoids_hub() {
        let a = Color::lab(50.0, 20.0, -30.0, D50);
        let b = Color::lch_ab(0.0, 0.0, 0.0, D50);
        assert_eq!(plan_names(&a, &b).unwrap(), vec!["primitive"]);
    }

    #[test]
    fn test_white_mismatch_inserts_cat() {
        let a = Color::xyz(0.5, 0.5, 0.5, D65);
        let b = Color::xyz(0.0, 0.0, 0.0, D50);
        assert_eq!(plan_names(&a, &b).unwrap(), vec!["cat"]);

        let a = Color::lab(50.0, 0.0, 0.0, D65);
        let b = Color::lab(0.0, 0.0, 0.0, D50);
        assert_eq!(
            plan_names(&a, &b).unwrap(),
            vec!["primitive", "cat", "primitive"]
        );
    }

    #[test]
    fn test_rgb_preset_change_routes_via_hub() {
        let a = Color::rgb(1.0, 1.0, 1.0, RgbColorspace::SRGB);
        let b = Color::rgb(0.0, 0.0, 0.0, RgbColorspace::REC2020);
        // Same D65 white: no CAT stage
        let names = plan_names(&a, &b).unwrap();
        assert_eq!(names, vec!["primitive", "primitive"]);
    }

    #[test]
    fn test_hsv_reaches_lab_through_rgb_and_hub() {
        let a = Color::hsv(180.0, 0.5, 0.5, RgbColorspace::SRGB);
        let b = Color::lab(0.0, 0.0, 0.0, D50);
        // HSV→RGB, RGB→XYZ, CAT (D65→D50), XYZ→Lab
        assert_eq!(
            plan_names(&a, &b).unwrap(),
            vec!["primitive", "primitive", "cat", "primitive"]
        );
    }

    #[test]
    fn test_plan_determinism() {
        let a = Color::hsv(10.0, 0.2, 0.9, RgbColorspace::ADOBE_RGB);
        let b = Color::lch_uv(0.0, 0.0, 0.0, D50);
        let first = plan_names(&a, &b).unwrap();
        for _ in 0..10 {
            assert_eq!(plan_names(&a, &b).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_cat_method_fails_setup() {
        let a = Color::xyz(0.5, 0.5, 0.5, D65);
        let b = Color::xyz(0.0, 0.0, 0.0, D50);
        let settings = Settings {
            chromatic_adaptation: "NoSuchMethod",
            ..Settings::default()
        };
        let err = plan(&a, &b, &snap(), &settings).unwrap_err();
        assert!(matches!(err, Error::ConversionSetup(_)));
    }

    #[test]
    fn test_cmyk_to_rgb_borrows_target_space() {
        let a = Color::cmyk(0.1, 0.2, 0.3, 0.0);
        let b = Color::rgb(0.0, 0.0, 0.0, RgbColorspace::SRGB);
        // CMYK→CMY→RGB, no hub detour: bindings agree (sRGB, D65)
        assert_eq!(plan_names(&a, &b).unwrap(), vec!["primitive", "primitive"]);
    }
}
