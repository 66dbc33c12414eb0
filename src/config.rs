//! Process-wide conversion defaults
//!
//! Settings are read once per converter construction; already-assembled
//! converters keep the snapshot they were built with.

use std::sync::{OnceLock, RwLock};

use crate::icc::{ClutInterpolation, RenderingIntent};

/// The enumerated process-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Chromatic adaptation method used when a plan needs a CAT
    /// (a name registered in the adaptation registry)
    pub chromatic_adaptation: &'static str,
    /// Rendering intent for ICC stages
    pub rendering_intent: RenderingIntent,
    /// Interpolation method for 3-dimensional CLUTs
    pub clut_interpolation: ClutInterpolation,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chromatic_adaptation: "Bradford",
            rendering_intent: RenderingIntent::RelativeColorimetric,
            clut_interpolation: ClutInterpolation::Tetrahedral,
        }
    }
}

static SETTINGS: OnceLock<RwLock<Settings>> = OnceLock::new();

fn lock() -> &'static RwLock<Settings> {
    SETTINGS.get_or_init(|| RwLock::new(Settings::default()))
}

/// Current settings snapshot
pub fn settings() -> Settings {
    *lock().read().unwrap_or_else(|e| e.into_inner())
}

/// Set the default chromatic adaptation method by registry name
///
/// Takes effect for converters constructed afterward.
pub fn set_default_chromatic_adaptation(name: &'static str) {
    lock().write().unwrap_or_else(|e| e.into_inner()).chromatic_adaptation = name;
}

/// Set the default rendering intent for ICC stages
pub fn set_default_rendering_intent(intent: RenderingIntent) {
    lock().write().unwrap_or_else(|e| e.into_inner()).rendering_intent = intent;
}

/// Set the CLUT interpolation method for 3-dimensional grids
pub fn set_clut_interpolation(interp: ClutInterpolation) {
    lock().write().unwrap_or_else(|e| e.into_inner()).clut_interpolation = interp;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.chromatic_adaptation, "Bradford");
        assert_eq!(s.rendering_intent, RenderingIntent::RelativeColorimetric);
        assert_eq!(s.clut_interpolation, ClutInterpolation::Tetrahedral);
    }
}
