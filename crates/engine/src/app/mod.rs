mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod scheduler;
mod textures;
mod tools;

pub use geometry::{overlaps, point_in_rect, saturate_i32, PointPx, Rect};
pub use input::{key_name, KeyStates};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    glyph_advance_px, line_advance_px, text_width_px, Renderer, Surface, BLACK, GLYPH_HEIGHT,
    GLYPH_WIDTH, TRANSPARENT, WHITE,
};
pub use scene::{
    ConsoleCommandSpec, ConsoleReply, InputSnapshot, PointerButton, PointerEvent,
    PointerEventKind, Scene, SceneCommand,
};
pub use scheduler::{period_for_rate, TickScheduler};
pub use textures::{
    decode_image_file, is_supported_image_path, Bitmap, DecodeCompletion, DecodeError,
    DecodeTicket, ImageDecoder, SUPPORTED_IMAGE_EXTENSIONS,
};
