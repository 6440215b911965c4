use super::Surface;

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
const FALLBACK_CHAR: char = '?';

/// 3x5 glyphs for printable ASCII starting at `' '`, one row per 3 bits with
/// the top row in the highest bits.
const ASCII_GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400, //  !"#$%&'
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4, // ()*+,-./
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292, // 01234567
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2, // 89:;<=>?
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f, // @ABCDEFG
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f, // HIJKLMNO
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd, // PQRSTUVW
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007, // XYZ[\]^_
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79, // `abcdefg
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f, // hijklmno
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a, // pqrstuvw
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780, // xyz{|}~
];

pub fn glyph_advance_px(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub fn line_advance_px(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale.max(1)
}

pub fn text_width_px(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance_px(scale)
}

fn glyph_bits(ch: char) -> u16 {
    let index = match ch {
        ' '..='~' => ch as usize - ' ' as usize,
        _ => FALLBACK_CHAR as usize - ' ' as usize,
    };
    ASCII_GLYPHS[index]
}

fn glyph_row(bits: u16, row: i32) -> u8 {
    ((bits >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111) as u8
}

pub(crate) fn draw_text(surface: &mut Surface, mut x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
    let scale = scale.max(1);
    for ch in text.chars() {
        draw_glyph(surface, x, y, glyph_bits(ch), scale, color);
        x = x.saturating_add(glyph_advance_px(scale));
    }
}

fn draw_glyph(surface: &mut Surface, x: i32, y: i32, bits: u16, scale: i32, color: [u8; 4]) {
    for row in 0..GLYPH_HEIGHT {
        let row_bits = glyph_row(bits, row);
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    surface.put_pixel(
                        x.saturating_add(col * scale + sx),
                        y.saturating_add(row * scale + sy),
                        color,
                    );
                }
            }
        }
    }
}
