// feedback-report-service/src/renderers/templates.rs

use image::{Rgb, RgbImage, Rgba};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use super::{PageSize, TemplateKind};
use crate::config::TemplateConfig;
use crate::error::{ReportError, Result};

/// A decoded background page, flattened onto white.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    pub kind: TemplateKind,
    pub image: RgbImage,
    pub page_size: PageSize,
}

impl TemplateAsset {
    pub async fn load(kind: TemplateKind, path: &Path, page_size: PageSize) -> Result<Self> {
        let bytes = fs::read(path).await.map_err(|e| {
            warn!(template = kind.file_label(), path = %path.display(), error = %e, "Template unreadable");
            ReportError::TemplateMissing(kind)
        })?;

        Self::decode(kind, &bytes, page_size)
    }

    pub fn decode(kind: TemplateKind, bytes: &[u8], page_size: PageSize) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ReportError::TemplateInvalid(kind, e.to_string()))?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        // Composite against white background
        let mut flattened = RgbImage::new(width, height);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
            flattened.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
        }

        debug!(template = kind.file_label(), width, height, "Template decoded");

        Ok(Self {
            kind,
            image: flattened,
            page_size,
        })
    }
}

/// The backgrounds one document needs, loaded up front so that a missing
/// file fails the request before any layout work starts.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    assets: HashMap<TemplateKind, TemplateAsset>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: TemplateAsset) {
        self.assets.insert(asset.kind, asset);
    }

    pub fn get(&self, kind: TemplateKind) -> Result<&TemplateAsset> {
        self.assets.get(&kind).ok_or(ReportError::TemplateMissing(kind))
    }

    /// Loads `kinds` in order; the first unreadable file aborts.
    pub async fn load(config: &TemplateConfig, kinds: &[TemplateKind]) -> Result<Self> {
        let page_size = PageSize {
            width: config.page_width,
            height: config.page_height,
        };

        let mut set = Self::new();
        for &kind in kinds {
            let path = config.file(file_name(config, kind));
            set.insert(TemplateAsset::load(kind, &path, page_size).await?);
        }
        Ok(set)
    }
}

fn file_name(config: &TemplateConfig, kind: TemplateKind) -> &str {
    match kind {
        TemplateKind::Theory => &config.theory,
        TemplateKind::Practical => &config.practical,
        TemplateKind::Header => &config.header,
        TemplateKind::StudentLogin => &config.student_login,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn config(dir: &Path) -> TemplateConfig {
        TemplateConfig {
            path: dir.display().to_string(),
            theory: "theory.png".into(),
            practical: "practical.png".into(),
            header: "header.png".into(),
            student_login: "student_login.png".into(),
            page_width: 612.0,
            page_height: 792.0,
        }
    }

    fn png(pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 6, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn transparent_pixels_become_white() {
        let size = PageSize {
            width: 612.0,
            height: 792.0,
        };
        let asset = TemplateAsset::decode(TemplateKind::Header, &png([0, 0, 0, 0]), size).unwrap();
        assert_eq!(asset.image.dimensions(), (4, 6));
        assert_eq!(asset.image.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn garbage_is_reported_as_invalid() {
        let size = PageSize {
            width: 612.0,
            height: 792.0,
        };
        let err = TemplateAsset::decode(TemplateKind::Theory, b"not a png", size).unwrap_err();
        assert!(matches!(err, ReportError::TemplateInvalid(TemplateKind::Theory, _)));
    }

    #[tokio::test]
    async fn first_missing_template_is_named() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("theory.png"), png([10, 20, 30, 255])).unwrap();

        let err = TemplateSet::load(&config(dir.path()), &[TemplateKind::Theory, TemplateKind::Header])
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::TemplateMissing(TemplateKind::Header)));

        let err = TemplateSet::load(&config(dir.path()), &[TemplateKind::Practical, TemplateKind::Header])
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::TemplateMissing(TemplateKind::Practical)));
    }

    #[tokio::test]
    async fn loads_every_requested_template() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["theory.png", "header.png"] {
            std::fs::write(dir.path().join(name), png([200, 200, 200, 255])).unwrap();
        }

        let set = TemplateSet::load(&config(dir.path()), &[TemplateKind::Theory, TemplateKind::Header])
            .await
            .unwrap();
        assert_eq!(set.get(TemplateKind::Header).unwrap().page_size.width, 612.0);
        assert!(set.get(TemplateKind::StudentLogin).is_err());
    }
}
