//! Font resolution and text shaping for the headless surface.
//!
//! Faces come from a `fontdb` database (system fonts, loaded on first use, plus any fonts added
//! explicitly). The chosen face is registered with Parley for shaping and wrapped as `FontData`
//! for `vello_cpu` glyph rendering.

use std::borrow::Cow;
use std::collections::HashMap;

use usvg::fontdb;

use crate::foundation::error::{StrataError, StrataResult};

/// Parsed CSS font shorthand, e.g. `italic bold 16px "Open Sans", sans-serif`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub families: Vec<String>,
    pub size_px: f32,
    pub weight: u16,
    pub italic: bool,
}

impl FontSpec {
    pub fn parse(font: &str) -> StrataResult<Self> {
        let tokens: Vec<&str> = font.split_whitespace().collect();
        let mut weight = 400;
        let mut italic = false;

        let size_at = tokens
            .iter()
            .position(|t| parse_size(t).is_some())
            .ok_or_else(|| StrataError::construction(format!("font \"{font}\" has no size")))?;

        for t in &tokens[..size_at] {
            match t.to_ascii_lowercase().as_str() {
                "italic" | "oblique" => italic = true,
                "bold" | "bolder" => weight = 700,
                "lighter" => weight = 300,
                "normal" | "small-caps" => {}
                other => {
                    if let Ok(w) = other.parse::<u16>() {
                        weight = w.clamp(1, 1000);
                    }
                }
            }
        }

        let size_px = parse_size(tokens[size_at]).unwrap_or(16.0);
        let families: Vec<String> = tokens[size_at + 1..]
            .join(" ")
            .split(',')
            .map(|f| f.trim().trim_matches(['"', '\'']).to_owned())
            .filter(|f| !f.is_empty())
            .collect();

        Ok(Self {
            families: if families.is_empty() {
                vec!["sans-serif".to_owned()]
            } else {
                families
            },
            size_px,
            weight,
            italic,
        })
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            families: vec!["sans-serif".to_owned()],
            size_px: 16.0,
            weight: 400,
            italic: false,
        }
    }
}

// `16px`, `12pt`, `1.5em`, optionally followed by `/line-height`.
fn parse_size(token: &str) -> Option<f32> {
    let size = token.split('/').next()?;
    let (num, factor) = if let Some(n) = size.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = size.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = size.strip_suffix("rem").or_else(|| size.strip_suffix("em")) {
        (n, 16.0)
    } else {
        return None;
    };
    let v = num.parse::<f32>().ok()? * factor;
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Shaped single-line text with glyph positions relative to the first baseline.
pub struct ShapedText {
    pub glyphs: Vec<vello_cpu::Glyph>,
    pub font: vello_cpu::peniko::FontData,
    pub font_size: f32,
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

struct RegisteredFace {
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Font database plus Parley contexts, shared by every surface a host creates.
pub struct FontLibrary {
    db: fontdb::Database,
    system_fonts: bool,
    system_loaded: bool,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: HashMap<fontdb::ID, RegisteredFace>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

impl FontLibrary {
    /// A library that only knows fonts added through [`FontLibrary::load_font_data`].
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
            system_fonts: false,
            system_loaded: false,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// System fonts are scanned lazily, on the first lookup.
    pub fn with_system_fonts() -> Self {
        Self {
            system_fonts: true,
            ..Self::empty()
        }
    }

    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    pub fn face_count(&mut self) -> usize {
        self.ensure_loaded();
        self.db.len()
    }

    fn ensure_loaded(&mut self) {
        if self.system_fonts && !self.system_loaded {
            self.db.load_system_fonts();
            self.system_loaded = true;
            tracing::debug!(faces = self.db.len(), "loaded system fonts");
        }
    }

    /// Best face for `spec`, falling back to generic families and then to any face at all.
    pub fn resolve(&mut self, spec: &FontSpec) -> Option<fontdb::ID> {
        self.ensure_loaded();

        let mut families: Vec<fontdb::Family<'_>> =
            spec.families.iter().map(|f| family_for(f)).collect();
        families.push(fontdb::Family::SansSerif);
        families.push(fontdb::Family::Serif);
        families.push(fontdb::Family::Monospace);

        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(spec.weight),
            stretch: fontdb::Stretch::Normal,
            style: if spec.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }

    fn register(&mut self, id: fontdb::ID) -> StrataResult<&RegisteredFace> {
        if !self.faces.contains_key(&id) {
            let (bytes, index) = self
                .db
                .with_face_data(id, |data, index| (data.to_vec(), index))
                .ok_or_else(|| StrataError::resource("font face data is unavailable"))?;

            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
            let family_id = families
                .first()
                .map(|(id, _)| *id)
                .ok_or_else(|| StrataError::resource("no font families registered from face"))?;
            let family_name = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| StrataError::resource("registered font family has no name"))?
                .to_string();

            let font =
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index);
            self.faces.insert(id, RegisteredFace { family_name, font });
        }
        self.faces
            .get(&id)
            .ok_or_else(|| StrataError::resource("font face registration was lost"))
    }

    /// Shape `text` on one line.
    pub fn shape(&mut self, text: &str, spec: &FontSpec) -> StrataResult<ShapedText> {
        let id = self.resolve(spec).ok_or_else(|| {
            StrataError::resource(format!(
                "no font face available for {:?}",
                spec.families
            ))
        })?;
        let (family_name, font) = {
            let face = self.register(id)?;
            (face.family_name.clone(), face.font.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(spec.size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|l| {
                let m = l.metrics();
                (m.baseline, m.ascent, m.descent)
            })
            .unwrap_or((0.0, 0.0, 0.0));

        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - baseline,
                }));
            }
        }

        Ok(ShapedText {
            glyphs,
            font,
            font_size: spec.size_px,
            width: f64::from(layout.width()),
            ascent: f64::from(ascent),
            descent: f64::from(descent),
        })
    }
}

fn family_for(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/text.rs"]
mod tests;
