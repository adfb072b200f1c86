//! CSS color strings as accepted by fill/stroke styles and export backgrounds.

use crate::foundation::error::{StrataError, StrataResult};

/// Straight-alpha color with normalized `0..=1` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorDef {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    /// Parse a CSS color: hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()/rgba()`,
    /// `hsl()/hsla()`, `transparent` and the common named colors.
    pub fn parse(s: &str) -> StrataResult<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with('#') {
            return parse_hex(&lower).map_err(StrataError::construction);
        }
        if let Some(args) = functional_args(&lower, "rgba").or_else(|| functional_args(&lower, "rgb"))
        {
            return parse_rgb_args(&args).map_err(StrataError::construction);
        }
        if let Some(args) = functional_args(&lower, "hsla").or_else(|| functional_args(&lower, "hsl"))
        {
            return parse_hsl_args(&args).map_err(StrataError::construction);
        }
        named(&lower)
            .ok_or_else(|| StrataError::construction(format!("unsupported color \"{s}\"")))
    }

    /// Straight RGBA8, rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    pub fn to_rgba8_premul(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        [
            to_u8(self.r.clamp(0.0, 1.0) * a),
            to_u8(self.g.clamp(0.0, 1.0) * a),
            to_u8(self.b.clamp(0.0, 1.0) * a),
            to_u8(a),
        ]
    }
}

fn functional_args(s: &str, name: &str) -> Option<Vec<String>> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(
        inner
            .split([',', ' ', '/'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn parse_number(part: &str) -> Result<f64, String> {
    part.parse::<f64>()
        .map_err(|_| format!("invalid color component \"{part}\""))
}

// `50%` -> 0.5 of `scale`, plain numbers are taken as-is.
fn parse_component(part: &str, scale: f64) -> Result<f64, String> {
    match part.strip_suffix('%') {
        Some(p) => Ok(parse_number(p)? / 100.0 * scale),
        None => parse_number(part),
    }
}

fn parse_alpha(parts: &[String]) -> Result<f64, String> {
    match parts.get(3) {
        Some(p) => parse_component(p, 1.0),
        None => Ok(1.0),
    }
}

fn parse_rgb_args(parts: &[String]) -> Result<ColorDef, String> {
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb()/rgba() expects 3 or 4 components".to_owned());
    }
    let r = parse_component(&parts[0], 255.0)?;
    let g = parse_component(&parts[1], 255.0)?;
    let b = parse_component(&parts[2], 255.0)?;
    let a = parse_alpha(parts)?;
    Ok(ColorDef::rgba(r / 255.0, g / 255.0, b / 255.0, a))
}

fn parse_hsl_args(parts: &[String]) -> Result<ColorDef, String> {
    if parts.len() != 3 && parts.len() != 4 {
        return Err("hsl()/hsla() expects 3 or 4 components".to_owned());
    }
    let h = parse_number(parts[0].trim_end_matches("deg"))?;
    let s = parse_component(&parts[1], 1.0)?;
    let l = parse_component(&parts[2], 1.0)?;
    let a = parse_alpha(parts)?;
    Ok(hsla_to_rgba(h, s, l, a))
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err("hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_owned());
        }
    };

    Ok(ColorDef::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> ColorDef {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return ColorDef::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    ColorDef::rgba(r, g, b, a)
}

fn named(s: &str) -> Option<ColorDef> {
    let rgb = |r: u8, g: u8, b: u8| {
        Some(ColorDef::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        ))
    };
    match s {
        "transparent" => Some(ColorDef::transparent()),
        "black" => rgb(0, 0, 0),
        "white" => rgb(255, 255, 255),
        "red" => rgb(255, 0, 0),
        "lime" => rgb(0, 255, 0),
        "green" => rgb(0, 128, 0),
        "blue" => rgb(0, 0, 255),
        "yellow" => rgb(255, 255, 0),
        "cyan" | "aqua" => rgb(0, 255, 255),
        "magenta" | "fuchsia" => rgb(255, 0, 255),
        "gray" | "grey" => rgb(128, 128, 128),
        "silver" => rgb(192, 192, 192),
        "maroon" => rgb(128, 0, 0),
        "olive" => rgb(128, 128, 0),
        "navy" => rgb(0, 0, 128),
        "purple" => rgb(128, 0, 128),
        "teal" => rgb(0, 128, 128),
        "orange" => rgb(255, 165, 0),
        "pink" => rgb(255, 192, 203),
        "brown" => rgb(165, 42, 42),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
