//! Desktop vs AR-presenting scene configuration.

/// Chart scale while presenting in AR.
pub const AR_SCALE: f32 = 0.25;
pub const NON_AR_SCALE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    #[default]
    Desktop,
    ArPresenting,
}

impl PresentationMode {
    pub fn from_presenting(presenting: bool) -> Self {
        if presenting {
            Self::ArPresenting
        } else {
            Self::Desktop
        }
    }

    pub fn is_presenting(self) -> bool {
        self == Self::ArPresenting
    }
}

/// Everything the presentation mode controls, and nothing else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub controls_enabled: bool,
    pub ground_visible: bool,
    pub chart_scale: f32,
}

impl SceneConfig {
    pub fn for_mode(mode: PresentationMode, ar_scale: f32) -> Self {
        match mode {
            PresentationMode::Desktop => Self {
                controls_enabled: true,
                ground_visible: true,
                chart_scale: NON_AR_SCALE,
            },
            PresentationMode::ArPresenting => Self {
                controls_enabled: false,
                ground_visible: false,
                chart_scale: ar_scale,
            },
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::for_mode(PresentationMode::Desktop, AR_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_mapping() {
        let cfg = SceneConfig::for_mode(PresentationMode::Desktop, AR_SCALE);
        assert!(cfg.controls_enabled);
        assert!(cfg.ground_visible);
        assert_eq!(cfg.chart_scale, 1.0);
    }

    #[test]
    fn ar_mapping_flips_every_field() {
        let desktop = SceneConfig::for_mode(PresentationMode::Desktop, AR_SCALE);
        let ar = SceneConfig::for_mode(PresentationMode::ArPresenting, AR_SCALE);
        assert_ne!(desktop.controls_enabled, ar.controls_enabled);
        assert_ne!(desktop.ground_visible, ar.ground_visible);
        assert_eq!(ar.chart_scale, 0.25);
    }

    #[test]
    fn mode_from_flag() {
        assert!(PresentationMode::from_presenting(true).is_presenting());
        assert_eq!(PresentationMode::from_presenting(false), PresentationMode::Desktop);
    }
}
