//! Card composition: paints the fitted display strings over the background
//! and encodes the result as PNG.

use image::{ImageEncoder, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use tracing::debug;

use crate::config::{CardConfig, Region};

use super::fit::{self, FitResult, FontMeasure};
use super::{FontSet, GenError};

/// Debug outline colors for the name / role / phone regions.
const DEBUG_COLORS: [Rgba<u8>; 3] = [
    Rgba([255, 0, 0, 255]),
    Rgba([255, 165, 0, 255]),
    Rgba([0, 0, 255, 255]),
];

/// Normalized display strings; empty fields are skipped entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayStrings {
    pub name: String,
    pub role_area: String,
    pub phone: String,
}

pub fn hex_color(s: &str) -> Result<Rgba<u8>, GenError> {
    let s = s.trim().trim_start_matches('#');
    if s.len() != 6 {
        return Err(GenError::BadRequest(format!("invalid color: {s}")));
    }
    let b = hex::decode(s).map_err(|_| GenError::BadRequest(format!("invalid color: {s}")))?;
    Ok(Rgba([b[0], b[1], b[2], 255]))
}

/// Top edge of a vertically centered line block inside a region.
fn block_top(region: Region, total_height: f32) -> f32 {
    region.y as f32 + ((region.h as f32 - total_height) / 2.0).max(0.0)
}

/// Draws one line of text with its top edge at `y`, alpha-blending glyph
/// coverage over the background. Painting is clipped to `clip`, so no fit
/// outcome can bleed into a neighboring region.
fn draw_line(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgba<u8>,
    text: &str,
    letter_spacing: f32,
    clip: Region,
) {
    let clip_x0 = clip.x as i32;
    let clip_y0 = clip.y as i32;
    let clip_x1 = (clip.x + clip.w).min(img.width()) as i32;
    let clip_y1 = (clip.y + clip.h).min(img.height()) as i32;

    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut caret_x = x as f32;
    let baseline_y = y as f32 + v_metrics.ascent;

    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale).positioned(point(caret_x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let dx = gx as i32 + bb.min.x;
                let dy = gy as i32 + bb.min.y;
                if dx < clip_x0 || dx >= clip_x1 || dy < clip_y0 || dy >= clip_y1 {
                    return;
                }
                let a = (v * 255.0) as u8;
                if a == 0 {
                    return;
                }
                let dst = img.get_pixel_mut(dx as u32, dy as u32);
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
        caret_x += glyph.unpositioned().h_metrics().advance_width + letter_spacing;
    }
}

/// Paints a fitted line block into its region: vertically centered, lines
/// left-aligned at the region's left edge.
fn draw_block(
    img: &mut RgbaImage,
    font: &Font<'static>,
    region: Region,
    fitted: &FitResult,
    color: Rgba<u8>,
    letter_spacing: f32,
) {
    let total_height = fitted.lines.len() as f32 * fitted.line_height;
    let mut y = block_top(region, total_height);
    for line in &fitted.lines {
        draw_line(
            img,
            font,
            fitted.px as f32,
            region.x as i32,
            y.round() as i32,
            color,
            line,
            letter_spacing,
            region,
        );
        y += fitted.line_height;
    }
}

fn draw_region_outline(img: &mut RgbaImage, region: Region, color: Rgba<u8>) {
    let x1 = (region.x + region.w).min(img.width());
    let y1 = (region.y + region.h).min(img.height());
    for y in region.y..y1 {
        for x in region.x..x1 {
            let on_border = x < region.x + 2
                || x + 2 >= x1
                || y < region.y + 2
                || y + 2 >= y1;
            if on_border {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Composites the display strings onto a copy of the background. Fully
/// deterministic: identical inputs produce identical pixels.
pub fn compose_card(
    background: &RgbaImage,
    fonts: &FontSet,
    cfg: &CardConfig,
    text: &DisplayStrings,
) -> Result<RgbaImage, GenError> {
    let color = hex_color(&cfg.color)?;
    let mut out = background.clone();

    if !text.name.is_empty() {
        let style = cfg.styles.name;
        let font = fonts.select(style.weight);
        let measure = FontMeasure { font, letter_spacing: style.letter_spacing };
        let fitted = fit::fit_multiline(&measure, &text.name, cfg.regions.name, style);
        debug!(px = fitted.px, lines = fitted.lines.len(), overflowed = fitted.overflowed, "fit name");
        draw_block(&mut out, font, cfg.regions.name, &fitted, color, style.letter_spacing);
    }

    if !text.role_area.is_empty() {
        let style = cfg.styles.role;
        let font = fonts.select(style.weight);
        let measure = FontMeasure { font, letter_spacing: style.letter_spacing };
        let fitted = fit::fit_single_line(&measure, &text.role_area, cfg.regions.role, style);
        debug!(px = fitted.px, overflowed = fitted.overflowed, "fit role");
        draw_block(&mut out, font, cfg.regions.role, &fitted, color, style.letter_spacing);
    }

    if !text.phone.is_empty() {
        let style = cfg.styles.phone;
        let font = fonts.select(style.weight);
        let measure = FontMeasure { font, letter_spacing: style.letter_spacing };
        let fitted = fit::fit_single_line(&measure, &text.phone, cfg.regions.phone, style);
        debug!(px = fitted.px, overflowed = fitted.overflowed, "fit phone");
        draw_block(&mut out, font, cfg.regions.phone, &fitted, color, style.letter_spacing);
    }

    if cfg.debug {
        let regions = [cfg.regions.name, cfg.regions.role, cfg.regions.phone];
        for (region, color) in regions.iter().zip(DEBUG_COLORS) {
            draw_region_outline(&mut out, *region, color);
        }
    }

    Ok(out)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, GenError> {
    let mut buf = Vec::new();
    let enc = image::codecs::png::PngEncoder::new(&mut buf);
    enc.write_image(img, img.width(), img.height(), image::ExtendedColorType::Rgba8)
        .map_err(|e| GenError::Image(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_rgb() {
        assert_eq!(hex_color("#1b5a92").unwrap(), Rgba([0x1b, 0x5a, 0x92, 255]));
        assert_eq!(hex_color("ffffff").unwrap(), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn hex_color_rejects_malformed() {
        assert!(hex_color("#fff").is_err());
        assert!(hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn block_is_vertically_centered() {
        let region = Region { x: 0, y: 100, w: 500, h: 160 };
        // two lines of 40px leave 80px of air, split evenly
        assert_eq!(block_top(region, 80.0), 140.0);
        // a block taller than the region pins to the region top
        assert_eq!(block_top(region, 400.0), 100.0);
    }

    #[test]
    fn outline_stays_inside_region() {
        let mut img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let region = Region { x: 10, y: 20, w: 30, h: 40 };
        draw_region_outline(&mut img, region, Rgba([255, 0, 0, 255]));

        let painted: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!painted.is_empty());
        for (x, y) in painted {
            assert!(x >= 10 && x < 40 && y >= 20 && y < 60);
        }
    }

    #[test]
    fn encode_png_roundtrips_dimensions() {
        let img = RgbaImage::from_pixel(12, 5, Rgba([1, 2, 3, 255]));
        let png = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 5));
    }
}
