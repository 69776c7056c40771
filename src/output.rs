use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::{fs, io::Cursor, path::Path};

/// Encodes `img` as PNG and writes it to `path`.
///
/// The image is encoded in memory, written next to `path` and renamed into place.
/// On error nothing is left at `path`.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let mut encoded = Cursor::new(Vec::new());
    img.write_to(&mut encoded, ImageFormat::Png)
        .context("failed to encode image to png")?;

    let tmp = path.with_extension("png.tmp");
    fs::write(&tmp, encoded.into_inner())
        .with_context(|| format!("failed to create image file {}", tmp.display()))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(anyhow::Error::new(err)
            .context(format!("failed to move image into place at {}", path.display())));
    }
    Ok(())
}
