use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, ImageReader};

use crate::errors::Result;
use crate::images::{ImageKind, SavedImage};
use crate::storage::{BackendLocal, StorageManager};

/// Bounding box of the fit resize
pub const MAX_WIDTH: u32 = 200;
pub const MAX_HEIGHT: u32 = 300;

/// Taller fitted images are center-cropped down to this height
pub const CROP_HEIGHT: u32 = 200;

const THUMBNAIL_SUFFIX: &str = "-thumbnail";

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub relative_path: String,
    pub dimensions: (u32, u32),
}

/// Shrinks `img` to fit the bounding box, keeping its aspect ratio, then crops
/// the vertical center to [`CROP_HEIGHT`] if it is still taller than that.
/// Images already inside the box are never enlarged.
pub fn fit_and_crop(img: DynamicImage) -> DynamicImage {
    let (width, height) = img.dimensions();

    let fitted = if width > MAX_WIDTH || height > MAX_HEIGHT {
        img.resize(MAX_WIDTH, MAX_HEIGHT, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let (width, height) = fitted.dimensions();
    if height > CROP_HEIGHT {
        fitted.crop_imm(0, (height - CROP_HEIGHT) / 2, width, CROP_HEIGHT)
    } else {
        fitted
    }
}

/// Writes the thumbnail of `original` next to it, named
/// `<id>-thumbnail.<ext>` in the original's encoding.
pub fn create_thumbnail(original: &SavedImage, relative_dir: &str) -> Result<Thumbnail> {
    let img = ImageReader::open(&original.path)?
        .with_guessed_format()?
        .decode()?;

    let thumb = fit_and_crop(img);
    let dimensions = thumb.dimensions();

    // the jpeg encoder rejects alpha channels
    let thumb = match original.kind {
        ImageKind::Jpeg => DynamicImage::ImageRgb8(thumb.to_rgb8()),
        ImageKind::Gif => DynamicImage::ImageRgba8(thumb.to_rgba8()),
        ImageKind::Png => thumb,
    };

    let mut buf = Vec::new();
    thumb.write_to(&mut Cursor::new(&mut buf), original.kind.format())?;

    let save_dir = original.path.parent().unwrap_or(Path::new("."));
    let store = BackendLocal::new(save_dir)?;
    let filename = format!(
        "{}{THUMBNAIL_SUFFIX}.{}",
        original.id,
        original.kind.extension()
    );
    let path = store.path_of(&filename);

    log::info!("saving card thumbnail to {}", path.display());
    store.write(&filename, &buf)?;

    Ok(Thumbnail {
        path,
        relative_path: format!("{relative_dir}/{filename}"),
        dimensions,
    })
}
