use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use crate::app::geometry::PointPx;

use super::Surface;

/// Presents a [`Surface`] through a fixed-size `pixels` framebuffer that is
/// scaled into the window.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    frame_width: u32,
    frame_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, frame_width: u32, frame_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(frame_width, frame_height, surface_texture)?;
        Ok(Self {
            window,
            pixels,
            frame_width,
            frame_height,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn present(&mut self, surface: &Surface) -> Result<(), Error> {
        copy_surface_into_frame(self.pixels.frame_mut(), self.frame_width, surface);
        self.pixels.render()
    }

    /// Maps a physical window position to framebuffer pixels, or `None` when it
    /// falls in the letterbox around the framebuffer.
    pub fn window_to_framebuffer(&self, x: f64, y: f64) -> Option<PointPx> {
        self.pixels
            .window_pos_to_pixel((x as f32, y as f32))
            .ok()
            .map(|(px, py)| PointPx::new(px as i32, py as i32))
    }
}

fn copy_surface_into_frame(frame: &mut [u8], frame_width: u32, surface: &Surface) {
    if frame_width == 0 {
        return;
    }
    let frame_height = frame.len() / (frame_width as usize * 4);
    let copy_width = surface.width().min(frame_width) as usize * 4;
    let copy_height = (surface.height() as usize).min(frame_height);
    let src_stride = surface.width() as usize * 4;
    let dst_stride = frame_width as usize * 4;
    let src = surface.rgba();
    for row in 0..copy_height {
        let src_start = row * src_stride;
        let dst_start = row * dst_stride;
        frame[dst_start..dst_start + copy_width]
            .copy_from_slice(&src[src_start..src_start + copy_width]);
    }
}
