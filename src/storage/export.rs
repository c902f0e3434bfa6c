//! Annotated image export

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `image` as `<stem>_annotated.png` into `dir`, never overwriting an
/// earlier export. Returns the path written.
pub fn export_annotated(image: &RgbaImage, source_name: &str, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create export directory {:?}", dir))?;

    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");

    let mut out = dir.join(format!("{}_annotated.png", stem));
    let mut n = 0u32;
    while out.exists() {
        n += 1;
        out = dir.join(format!("{}_annotated_{}.png", stem, n));
    }

    image
        .save_with_format(&out, image::ImageFormat::Png)
        .with_context(|| format!("Could not write {:?}", out))?;
    info!("Exported annotated image to {:?}", out);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_export_writes_png_next_to_stem() {
        let dir = tempdir().unwrap();
        let img = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]));

        let path = export_annotated(&img, "street.jpg", dir.path()).unwrap();

        assert_eq!(path, dir.path().join("street_annotated.png"));
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded, img);
    }

    #[test]
    fn test_export_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let img = RgbaImage::new(2, 2);

        let first = export_annotated(&img, "a.png", dir.path()).unwrap();
        let second = export_annotated(&img, "a.png", dir.path()).unwrap();

        assert_ne!(first, second);
        assert_eq!(second, dir.path().join("a_annotated_1.png"));
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("today");

        let path = export_annotated(&RgbaImage::new(1, 1), "", &nested).unwrap();
        assert_eq!(path, nested.join("image_annotated.png"));
    }
}
