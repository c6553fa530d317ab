use crate::foundation::error::{GlimmerError, GlimmerResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Title styling handed to [`TextLayoutEngine::layout_title`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TitleStyle {
    pub(crate) size_px: f32,
    pub(crate) weight: f32,
    pub(crate) letter_spacing: f32,
    pub(crate) brush: TextBrushRgba8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape a single unbroken line of title text with the first family found in `font_bytes`.
    pub(crate) fn layout_title(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        style: TitleStyle,
    ) -> GlimmerResult<parley::Layout<TextBrushRgba8>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(GlimmerError::validation(
                "title font size must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| GlimmerError::render("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| GlimmerError::render("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(style.weight),
        ));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            style.letter_spacing,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}
