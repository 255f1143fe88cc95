use eframe::egui::ColorImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

use crate::error::ArtError;

/// Cover images sit next to the track with this extension (exact match).
pub const ART_EXTENSION: &str = "jpg";

/// Returns the sibling cover path for `track` if such a file exists.
pub fn find_album_art(track: &Path) -> Option<PathBuf> {
    let candidate = track.with_extension(ART_EXTENSION);
    candidate.is_file().then_some(candidate)
}

/// Decodes `path` and scales it to a `size`x`size` thumbnail.
pub fn load_thumbnail(path: &Path, size: u32) -> Result<ColorImage, ArtError> {
    let img = image::open(path)?;
    let rgba = img.resize_exact(size, size, FilterType::Lanczos3).to_rgba8();
    let dims = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(dims, rgba.as_raw()))
}
