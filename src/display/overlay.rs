//! FPS text overlay drawn straight into RGB24 frames

use bytes::Bytes;

use crate::capture::{Frame, PixelFormat};

/// Shadow is drawn one pixel right of the text, thicker and dark
const SHADOW_ORIGIN: (i32, i32) = (11, 20);
const SHADOW_COLOR: [u8; 3] = [32, 32, 32];
const SHADOW_THICKNESS: i32 = 4;

const TEXT_ORIGIN: (i32, i32) = (10, 20);
const TEXT_COLOR: [u8; 3] = [240, 240, 240];
const TEXT_THICKNESS: i32 = 1;

const GLYPH_W: i32 = 5;
const GLYPH_H: i32 = 7;
const SCALE: i32 = 2;
const ADVANCE: i32 = (GLYPH_W + 1) * SCALE;

/// Draw `FPS: {fps:.2}` at the top-left corner.
///
/// The returned frame owns a new buffer; `frame` is never written to.
pub fn show_fps(frame: Frame, fps: f64) -> Frame {
    if frame.meta.format != PixelFormat::Rgb24 {
        return frame;
    }

    let text = format!("FPS: {:.2}", fps);
    let mut canvas = Canvas {
        pixels: frame.data.to_vec(),
        width: frame.meta.width as i32,
        height: frame.meta.height as i32,
        stride: frame.meta.stride as usize,
    };

    canvas.draw_text(&text, SHADOW_ORIGIN, SHADOW_COLOR, SHADOW_THICKNESS);
    canvas.draw_text(&text, TEXT_ORIGIN, TEXT_COLOR, TEXT_THICKNESS);

    Frame {
        data: Bytes::from(canvas.pixels),
        ..frame
    }
}

struct Canvas {
    pixels: Vec<u8>,
    width: i32,
    height: i32,
    stride: usize,
}

impl Canvas {
    /// `origin` is the bottom-left corner of the first glyph
    fn draw_text(&mut self, text: &str, origin: (i32, i32), color: [u8; 3], thickness: i32) {
        let top = origin.1 - GLYPH_H * SCALE;
        let radius = thickness / 2;

        for (i, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else { continue };
            let left = origin.0 + i as i32 * ADVANCE;

            for (gy, bits) in rows.iter().enumerate() {
                for gx in 0..GLYPH_W {
                    if bits & (0x10 >> gx) == 0 {
                        continue;
                    }
                    for sy in 0..SCALE {
                        for sx in 0..SCALE {
                            let x = left + gx * SCALE + sx;
                            let y = top + gy as i32 * SCALE + sy;
                            self.dot(x, y, radius, color);
                        }
                    }
                }
            }
        }
    }

    fn dot(&mut self, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
        for y in (cy - radius).max(0)..=(cy + radius).min(self.height - 1) {
            for x in (cx - radius).max(0)..=(cx + radius).min(self.width - 1) {
                let offset = y as usize * self.stride + x as usize * 3;
                if let Some(px) = self.pixels.get_mut(offset..offset + 3) {
                    px.copy_from_slice(&color);
                }
            }
        }
    }
}

/// 5x7 bitmaps, bit 4 is the leftmost column
fn glyph(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    })
}
