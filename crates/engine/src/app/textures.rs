use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(pub u64);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported image file {path} (expected .jpg, .jpeg or .png)")]
    UnsupportedExtension { path: PathBuf },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to start decode worker: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug)]
pub struct DecodeCompletion {
    pub ticket: DecodeTicket,
    pub path: PathBuf,
    pub result: Result<Arc<Bitmap>, DecodeError>,
}

/// Decodes image files off the loop thread.
///
/// Every request gets a fresh ticket; completions arrive in whatever order the
/// workers finish and must be matched back to their target by ticket.
pub struct ImageDecoder {
    next_ticket: u64,
    in_flight: usize,
    sender: Sender<DecodeCompletion>,
    receiver: Receiver<DecodeCompletion>,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            next_ticket: 1,
            in_flight: 0,
            sender,
            receiver,
        }
    }

    pub fn request(&mut self, path: impl Into<PathBuf>) -> DecodeTicket {
        let path = path.into();
        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        if !is_supported_image_path(&path) {
            self.send_completion(DecodeCompletion {
                ticket,
                result: Err(DecodeError::UnsupportedExtension { path: path.clone() }),
                path,
            });
            return ticket;
        }

        let worker_sender = self.sender.clone();
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name(format!("image-decode-{}", ticket.0))
            .spawn(move || {
                let result = decode_image_file(&worker_path).map(Arc::new);
                // Receiver is gone only when the decoder was dropped; nothing to report to.
                let _ = worker_sender.send(DecodeCompletion {
                    ticket,
                    path: worker_path,
                    result,
                });
            });

        match spawned {
            Ok(_) => debug!(ticket = ticket.0, path = %path.display(), "image_decode_requested"),
            Err(error) => {
                warn!(ticket = ticket.0, error = %error, "image_decode_spawn_failed");
                self.send_completion(DecodeCompletion {
                    ticket,
                    path,
                    result: Err(DecodeError::Spawn(error)),
                });
            }
        }
        ticket
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn drain_completions_into(&mut self, out: &mut Vec<DecodeCompletion>) {
        while let Ok(completion) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            out.push(completion);
        }
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<DecodeCompletion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn send_completion(&self, completion: DecodeCompletion) {
        // The decoder owns the receiver, so a send from here cannot fail.
        let _ = self.sender.send(completion);
    }
}

pub fn is_supported_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

pub fn decode_image_file(path: &Path) -> Result<Bitmap, DecodeError> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let decoded = reader.decode().map_err(|source| DecodeError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(Bitmap {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
