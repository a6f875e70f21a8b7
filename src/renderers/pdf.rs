// feedback-report-service/src/renderers/pdf.rs

use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, CustomPdfConformance, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Mm, PdfConformance, PdfDocument, PdfDocumentReference, PdfLayerReference, Pt,
    Px,
};
use std::io::BufWriter;
use tracing::{debug, info};

use super::{Canvas, PageSize, TemplateKind, TemplateSet};
use crate::error::{ReportError, Result};
use crate::layout::StandardFont;

/// Assumed resolution of template artwork before it is stretched to the page.
const TEMPLATE_DPI: f32 = 72.0;

/// printpdf-backed canvas. Each page is a copy of its template image with
/// text layered on top.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    templates: TemplateSet,
    layer: Option<PdfLayerReference>,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str, templates: TemplateSet) -> Result<Self> {
        // No embedded ICC profile or XMP packet.
        let doc = PdfDocument::empty(title).with_conformance(PdfConformance::Custom(
            CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            },
        ));

        // Load built-in fonts
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;

        Ok(Self {
            doc,
            templates,
            layer: None,
            regular,
            bold,
            pages: 0,
        })
    }

    /// Serializes the document. Fails if nothing was drawn.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.pages == 0 {
            return Err(ReportError::Render("document has no pages".into()));
        }

        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Render(e.to_string()))?;

        info!(pages = self.pages, size_kb = bytes.len() / 1024, "PDF generated successfully");
        Ok(bytes)
    }

    fn font(&self, font: StandardFont) -> &IndirectFontRef {
        match font {
            StandardFont::Helvetica => &self.regular,
            StandardFont::HelveticaBold => &self.bold,
        }
    }
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

impl Canvas for PdfCanvas {
    fn page_size(&self, template: TemplateKind) -> PageSize {
        self.templates
            .get(template)
            .map(|t| t.page_size)
            .unwrap_or(PageSize {
                width: 612.0,
                height: 792.0,
            })
    }

    fn start_page(&mut self, template: TemplateKind) -> Result<()> {
        let asset = self.templates.get(template)?;
        let size = asset.page_size;
        let (width_px, height_px) = asset.image.dimensions();

        let (page, layer) = self.doc.add_page(
            mm(size.width),
            mm(size.height),
            format!("Page {}", self.pages + 1),
        );
        let layer = self.doc.get_page(page).get_layer(layer);

        let background = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: asset.image.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // At TEMPLATE_DPI one pixel is one point; scale to cover the page.
        background.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                scale_x: Some(size.width / width_px as f32),
                scale_y: Some(size.height / height_px as f32),
                dpi: Some(TEMPLATE_DPI),
                ..Default::default()
            },
        );

        debug!(template = template.file_label(), page = self.pages + 1, "Page started");

        self.layer = Some(layer);
        self.pages += 1;
        Ok(())
    }

    fn draw_text(&mut self, text: &str, font: StandardFont, size: f32, x: f32, y: f32) {
        if let Some(layer) = &self.layer {
            layer.use_text(text, size, mm(x), mm(y), self.font(font));
        }
    }

    fn page_count(&self) -> usize {
        self.pages
    }
}
