//! Generator configuration.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```toml
//! seed = 7
//!
//! [raster]
//! dpi = 150
//!
//! [augment]
//! enabled = false
//! ```
//!
//! Overlay sections are the exception: `[signature]` and `[stamp]` replace
//! the role defaults as a whole and have to be complete.

use crate::error::Error;
use crate::prompt::{DEFAULT_TEMPLATE, DEFAULT_TOPICS, PromptTemplate};
use docsynth_geometry::{Footprint, OverlayRole, Region, Size};
use docsynth_render::{NoiseAugmenter, NoiseSettings, PageLayout};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The page geometry and body text metrics, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Margin on all four edges.
    pub margin: f64,
    /// Body text size.
    pub font_size: f64,
    /// Distance between baselines.
    pub leading: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        let layout = PageLayout::default();
        Self {
            width: layout.size.width,
            height: layout.size.height,
            margin: layout.margin,
            font_size: layout.font_size,
            leading: layout.leading,
        }
    }
}

impl PageConfig {
    /// The page layout described by this section.
    pub fn layout(&self) -> PageLayout {
        PageLayout {
            size: Size::new(self.width, self.height),
            margin: self.margin,
            font_size: self.font_size,
            leading: self.leading,
        }
    }
}

/// Rasterization settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RasterConfig {
    /// The resolution of the output images.
    pub dpi: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self { dpi: 300.0 }
    }
}

/// Sizing and placement of one overlay role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    /// The resolution the asset images were made for.
    pub source_dpi: f64,
    /// The maximum size relative to the page.
    pub footprint: Footprint,
    /// Where on the page the overlay may go.
    pub region: Region,
}

/// The resolution at which one asset pixel covers one point.
///
/// Assets are drawn at their native size by default, which is also how
/// `docsynth signatures` renders them.
pub const NATIVE_DPI: f64 = 72.0;

impl OverlayConfig {
    /// The defaults for a role: signatures go to the lower right, stamps to
    /// the lower left.
    pub fn default_for(role: OverlayRole) -> Self {
        match role {
            OverlayRole::Signature => Self {
                source_dpi: NATIVE_DPI,
                footprint: Footprint {
                    width: 0.25,
                    height: 0.20,
                },
                region: Region {
                    x: [0.55, 0.95],
                    y: [0.10, 0.35],
                },
            },
            OverlayRole::Stamp => Self {
                source_dpi: NATIVE_DPI,
                footprint: Footprint {
                    width: 0.30,
                    height: 0.25,
                },
                region: Region {
                    x: [0.15, 0.50],
                    y: [0.10, 0.45],
                },
            },
        }
    }

    fn validate(&self, role: OverlayRole) -> Result<(), Error> {
        if !(self.source_dpi > 0.0 && self.source_dpi.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "{role} source dpi must be positive, got {}",
                self.source_dpi
            )));
        }
        self.footprint.validate()?;
        self.region.validate()?;
        Ok(())
    }
}

/// Post-rasterization noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AugmentConfig {
    /// Whether to apply noise at all.
    pub enabled: bool,
    /// Maximum brightness shift as a fraction of the full range.
    pub brightness: f32,
    /// Maximum relative contrast change.
    pub contrast: f32,
    /// Maximum per-channel noise in 8-bit steps.
    pub noise: f32,
    /// Probability of blurring a page.
    pub blur_probability: f64,
    /// Maximum blur standard deviation in pixels.
    pub max_blur_sigma: f32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        let noise = NoiseSettings::default();
        Self {
            enabled: true,
            brightness: noise.brightness,
            contrast: noise.contrast,
            noise: noise.noise,
            blur_probability: noise.blur_probability,
            max_blur_sigma: noise.max_blur_sigma,
        }
    }
}

impl AugmentConfig {
    /// The noise settings described by this section.
    pub fn settings(&self) -> NoiseSettings {
        NoiseSettings {
            brightness: self.brightness,
            contrast: self.contrast,
            noise: self.noise,
            blur_probability: self.blur_probability,
            max_blur_sigma: self.max_blur_sigma,
        }
    }
}

/// The prompt sent to the text service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptConfig {
    /// The template, with a `{topic}` placeholder.
    pub template: String,
    /// The topics to choose from. The chosen topic is the document type.
    pub topics: Vec<String>,
}

impl PromptConfig {
    /// The prompt template described by this section.
    pub fn template(&self) -> Result<PromptTemplate, Error> {
        PromptTemplate::new(self.template.clone(), self.topics.clone())
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            topics: DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// The language model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// The URL of an OpenAI compatible completions endpoint.
    pub endpoint: String,
    /// The model name.
    pub model: String,
    /// The maximum length of a completion.
    pub max_tokens: u32,
    /// The sampling temperature.
    pub temperature: f32,
    /// The request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/v1/completions".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            max_tokens: 512,
            temperature: 0.8,
            timeout_secs: 120,
        }
    }
}

/// Which artifacts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Also keep the composed PDF of every document.
    pub write_pdf: bool,
}

/// The complete configuration of a generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Page geometry.
    pub page: PageConfig,
    /// Raster output.
    pub raster: RasterConfig,
    /// Signature sizing and placement.
    pub signature: OverlayConfig,
    /// Stamp sizing and placement.
    pub stamp: OverlayConfig,
    /// Noise augmentation.
    pub augment: AugmentConfig,
    /// Prompt template and topics.
    pub prompt: PromptConfig,
    /// Language model endpoint.
    pub text: TextConfig,
    /// Written artifacts.
    pub output: OutputConfig,
    /// How often placement is tried with a fresh asset before a document
    /// is given up.
    pub placement_attempts: u32,
    /// Seed for all random choices. Without one every run differs.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            raster: RasterConfig::default(),
            signature: OverlayConfig::default_for(OverlayRole::Signature),
            stamp: OverlayConfig::default_for(OverlayRole::Stamp),
            augment: AugmentConfig::default(),
            prompt: PromptConfig::default(),
            text: TextConfig::default(),
            output: OutputConfig::default(),
            placement_attempts: 5,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path)?;
        log::debug!("loaded configuration from {}", path.display());
        Self::from_toml(&source)
    }

    /// The overlay settings of a role.
    pub fn overlay(&self, role: OverlayRole) -> &OverlayConfig {
        match role {
            OverlayRole::Signature => &self.signature,
            OverlayRole::Stamp => &self.stamp,
        }
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), Error> {
        self.page.layout().validate()?;
        if !(self.raster.dpi > 0.0 && self.raster.dpi.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "raster dpi must be positive, got {}",
                self.raster.dpi
            )));
        }
        for role in OverlayRole::ALL {
            self.overlay(role).validate(role)?;
        }
        if self.placement_attempts == 0 {
            return Err(Error::InvalidParameter(
                "placement_attempts must be at least 1".to_string(),
            ));
        }
        self.prompt.template()?;
        if self.augment.enabled {
            NoiseAugmenter::new(self.augment.settings(), None)
                .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.page.layout(), PageLayout::default());
        assert_eq!(config.raster.dpi, 300.0);
        assert_eq!(config.prompt.topics.len(), 5);
        assert_eq!(config.signature.source_dpi, NATIVE_DPI);
        assert_eq!(config.stamp.source_dpi, NATIVE_DPI);
    }

    #[test]
    fn partial_files_keep_defaults() {
        let config = GeneratorConfig::from_toml(
            r#"
            seed = 7
            placement_attempts = 2

            [raster]
            dpi = 150

            [stamp.region]
            x = [0.1, 0.5]
            y = [0.05, 0.4]

            [stamp.footprint]
            width = 0.2
            height = 0.2
            "#,
        );
        // The stamp section is complete only with a source dpi.
        assert!(config.is_err());

        let config = GeneratorConfig::from_toml(
            r#"
            seed = 7

            [raster]
            dpi = 150

            [stamp]
            source_dpi = 300
            footprint = { width = 0.2, height = 0.2 }
            region = { x = [0.1, 0.5], y = [0.05, 0.4] }
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.raster.dpi, 150.0);
        assert_eq!(config.stamp.region.x, [0.1, 0.5]);
        assert_eq!(config.signature, OverlayConfig::default_for(OverlayRole::Signature));
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            GeneratorConfig::from_toml("[raster]\ndpi = 0"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_toml("placement_attempts = 0"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_toml("[prompt]\ntemplate = \"no placeholder\""),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_toml("unknown = 1"),
            Err(Error::Config(_))
        ));
    }
}
