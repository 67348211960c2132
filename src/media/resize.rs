use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{ImageFormat, ImageResult};

use crate::app::Result;

/// Write an image to `path`, downscaled to `max_width` when it is wider.
///
/// Only PNG and JPEG are re-encoded; other formats, and images that fail to
/// decode, are written unchanged. Returns `true` if the image was resized.
pub fn write_scaled(bytes: &[u8], path: &Path, max_width: Option<u32>) -> Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Some(max_width) = max_width {
        match scale_down(bytes, max_width) {
            Ok(Some(scaled)) => {
                fs::write(path, scaled)?;
                return Ok(true);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Could not resize {}: {}", path.display(), e);
            }
        }
    }

    fs::write(path, bytes)?;
    Ok(false)
}

fn scale_down(bytes: &[u8], max_width: u32) -> ImageResult<Option<Vec<u8>>> {
    let format = image::guess_format(bytes)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Ok(None);
    }

    let img = image::load_from_memory_with_format(bytes, format)?;
    if img.width() <= max_width {
        return Ok(None);
    }

    let height = (u64::from(img.height()) * u64::from(max_width) / u64::from(img.width())).max(1);
    let scaled = img.resize_exact(max_width, height as u32, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    scaled.write_to(&mut out, format)?;
    Ok(Some(out.into_inner()))
}
