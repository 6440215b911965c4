mod renderer;
mod surface;
mod text;

pub use renderer::Renderer;
pub use surface::{Surface, BLACK, TRANSPARENT, WHITE};
pub use text::{glyph_advance_px, line_advance_px, text_width_px, GLYPH_HEIGHT, GLYPH_WIDTH};
