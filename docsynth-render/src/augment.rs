//! Visual noise applied to rasterized pages.

use crate::error::RenderError;
use image::RgbaImage;
use image::imageops;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An image-to-image transform applied after rasterization.
///
/// Implementations must return an image with the same dimensions as their
/// input, otherwise the tracked bounding boxes would no longer match.
pub trait Augment {
    /// Transform an image.
    fn augment(&mut self, image: RgbaImage) -> Result<RgbaImage, RenderError>;
}

impl<A: Augment + ?Sized> Augment for Box<A> {
    fn augment(&mut self, image: RgbaImage) -> Result<RgbaImage, RenderError> {
        (**self).augment(image)
    }
}

/// Run an augmentation and check that it kept the image dimensions.
pub fn apply_augment(
    augmenter: &mut dyn Augment,
    image: RgbaImage,
) -> Result<RgbaImage, RenderError> {
    let before = image.dimensions();
    let out = augmenter.augment(image)?;
    if out.dimensions() != before {
        return Err(RenderError::Augment(format!(
            "augmentation changed the image size from {before:?} to {:?}",
            out.dimensions()
        )));
    }

    Ok(out)
}

/// Passes images through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Augment for Identity {
    fn augment(&mut self, image: RgbaImage) -> Result<RgbaImage, RenderError> {
        Ok(image)
    }
}

/// The strength of the effects of a [`NoiseAugmenter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    /// The maximum brightness shift as a fraction of the full range.
    pub brightness: f32,
    /// The maximum relative change of contrast.
    pub contrast: f32,
    /// The maximum per-channel noise amplitude in 8-bit steps.
    pub noise: f32,
    /// The probability of blurring an image.
    pub blur_probability: f64,
    /// The maximum standard deviation of the blur in pixels.
    pub max_blur_sigma: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            brightness: 0.08,
            contrast: 0.15,
            noise: 10.0,
            blur_probability: 0.3,
            max_blur_sigma: 0.8,
        }
    }
}

impl NoiseSettings {
    /// Settings that leave images untouched.
    pub const NONE: Self = Self {
        brightness: 0.0,
        contrast: 0.0,
        noise: 0.0,
        blur_probability: 0.0,
        max_blur_sigma: 0.0,
    };

    fn validate(&self) -> Result<(), RenderError> {
        let amounts = [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("noise", self.noise),
            ("max_blur_sigma", self.max_blur_sigma),
        ];
        for (name, value) in amounts {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(RenderError::Augment(format!("invalid {name} {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.blur_probability) {
            return Err(RenderError::Augment(format!(
                "invalid blur probability {}",
                self.blur_probability
            )));
        }

        Ok(())
    }
}

/// Random brightness, contrast, per-pixel noise and blur.
///
/// The alpha channel is left alone.
#[derive(Debug, Clone)]
pub struct NoiseAugmenter {
    settings: NoiseSettings,
    rng: StdRng,
}

impl NoiseAugmenter {
    /// Create an augmenter. Without a seed the generator is seeded from
    /// system entropy.
    pub fn new(settings: NoiseSettings, seed: Option<u64>) -> Result<Self, RenderError> {
        settings.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self { settings, rng })
    }
}

impl Augment for NoiseAugmenter {
    fn augment(&mut self, mut image: RgbaImage) -> Result<RgbaImage, RenderError> {
        let NoiseSettings {
            brightness,
            contrast,
            noise,
            blur_probability,
            max_blur_sigma,
        } = self.settings;

        let shift = self.rng.gen_range(-brightness..=brightness) * 255.0;
        let factor = 1.0 + self.rng.gen_range(-contrast..=contrast);

        for pixel in image.pixels_mut() {
            for channel in &mut pixel.0[..3] {
                let jitter = if noise > 0.0 {
                    self.rng.gen_range(-noise..=noise)
                } else {
                    0.0
                };
                let value = (f32::from(*channel) - 128.0) * factor + 128.0 + shift + jitter;
                *channel = value.round().clamp(0.0, 255.0) as u8;
            }
        }

        if max_blur_sigma > 0.0 && self.rng.gen_bool(blur_probability) {
            let sigma = self.rng.gen_range(0.0..=max_blur_sigma);
            if sigma > 0.0 {
                log::trace!("blurring with sigma {sigma:.3}");
                image = imageops::blur(&image, sigma);
            }
        }

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn page() -> RgbaImage {
        RgbaImage::from_fn(40, 30, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 200])
            }
        })
    }

    struct Crop;

    impl Augment for Crop {
        fn augment(&mut self, image: RgbaImage) -> Result<RgbaImage, RenderError> {
            Ok(imageops::crop_imm(&image, 0, 0, 10, 10).to_image())
        }
    }

    #[test]
    fn identity_is_a_no_op() {
        let image = page();
        assert_eq!(apply_augment(&mut Identity, image.clone()).unwrap(), image);
    }

    #[test]
    fn rejects_size_changes() {
        assert!(matches!(
            apply_augment(&mut Crop, page()),
            Err(RenderError::Augment(_))
        ));

        let mut boxed: Box<dyn Augment> = Box::new(Crop);
        assert!(apply_augment(&mut boxed, page()).is_err());
    }

    #[test]
    fn noise_keeps_size_and_alpha() {
        let settings = NoiseSettings {
            blur_probability: 0.0,
            ..NoiseSettings::default()
        };
        let mut augmenter = NoiseAugmenter::new(settings, Some(7)).unwrap();
        let input = page();
        let out = apply_augment(&mut augmenter, input.clone()).unwrap();

        assert_eq!(out.dimensions(), input.dimensions());
        assert!(
            input
                .pixels()
                .zip(out.pixels())
                .all(|(a, b)| a.0[3] == b.0[3])
        );
        assert_ne!(out, input);
    }

    #[test]
    fn blur_keeps_size() {
        let settings = NoiseSettings {
            blur_probability: 1.0,
            ..NoiseSettings::default()
        };
        let mut augmenter = NoiseAugmenter::new(settings, Some(1)).unwrap();
        let out = apply_augment(&mut augmenter, page()).unwrap();
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let run = || {
            let mut augmenter = NoiseAugmenter::new(NoiseSettings::default(), Some(99)).unwrap();
            augmenter.augment(page()).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn empty_settings_change_nothing() {
        let mut augmenter = NoiseAugmenter::new(NoiseSettings::NONE, None).unwrap();
        assert_eq!(augmenter.augment(page()).unwrap(), page());
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = NoiseSettings {
            blur_probability: 1.5,
            ..NoiseSettings::default()
        };
        assert!(NoiseAugmenter::new(settings, None).is_err());
        let settings = NoiseSettings {
            noise: -1.0,
            ..NoiseSettings::default()
        };
        assert!(NoiseAugmenter::new(settings, None).is_err());
    }
}
