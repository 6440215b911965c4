pub mod app;

pub use app::{
    decode_image_file, glyph_advance_px, is_supported_image_path, key_name, line_advance_px,
    overlaps, period_for_rate, point_in_rect, run_app, saturate_i32, text_width_px, AppError,
    Bitmap, ConsoleCommandSpec, ConsoleReply, DecodeCompletion, DecodeError, DecodeTicket,
    ImageDecoder, InputSnapshot, KeyStates, LoopConfig, LoopMetricsSnapshot, PointPx,
    PointerButton, PointerEvent, PointerEventKind, Rect, Renderer, Scene, SceneCommand, Surface,
    TickScheduler, BLACK, GLYPH_HEIGHT, GLYPH_WIDTH, SUPPORTED_IMAGE_EXTENSIONS, TRANSPARENT,
    WHITE,
};
