use std::path::Path;

use image::imageops::FilterType;
use tract_onnx::prelude::*;

use crate::error::ClassifyError;

/// Fixed model input resolution. The artifact was trained on 150x150 RGB
/// crops and its input fact is pinned to this shape at load time.
pub const INPUT_HEIGHT: u32 = 150;
pub const INPUT_WIDTH: u32 = 150;

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// True iff the filename has an extension and the lowercased part after the
/// last dot is an allowed image format.
pub fn allowed_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, extension)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| extension.eq_ignore_ascii_case(allowed))
    })
}

/// Reduces an untrusted upload filename to a safe basename: path components
/// are dropped, anything outside `[A-Za-z0-9._-]` is removed, and leading
/// dots are stripped. A name with nothing left becomes `upload`.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = basename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Loads the image at `path`, resizes it to exactly `target` (height, width)
/// with no aspect-ratio preservation, and produces an f32 NHWC tensor of
/// shape (1, height, width, 3) with every value scaled into [0, 1].
pub fn preprocess_image(path: &Path, target: (u32, u32)) -> Result<Tensor, ClassifyError> {
    let decoded =
        image::open(path).map_err(|e| ClassifyError::ImageProcessing(e.to_string()))?;
    let (height, width) = target;
    let resized = decoded
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();
    let tensor = tract_ndarray::Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, channel)| resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
    )
    .into_tensor();
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_matches_allowed_set() {
        assert!(allowed_file("x.JPG"));
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("cell.jpeg"));
        assert!(allowed_file("anim.GIF"));
        assert!(!allowed_file("x"));
        assert!(!allowed_file("x.bmp"));
        assert!(!allowed_file(""));
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("trailing."));
        // Only the part after the final dot counts.
        assert!(!allowed_file("archive.png.gz"));
        assert!(allowed_file("archive.gz.png"));
    }

    #[test]
    fn sanitize_strips_paths_and_junk() {
        assert_eq!(sanitize_filename("../../evil.png"), "evil.png");
        assert_eq!(sanitize_filename("C:\\temp\\cell.jpg"), "cell.jpg");
        assert_eq!(sanitize_filename("white blood.png"), "whiteblood.png");
        assert_eq!(sanitize_filename("..hidden.gif"), "hidden.gif");
        assert_eq!(sanitize_filename("???"), "upload");
    }

    #[test]
    fn preprocess_produces_unit_scaled_nhwc_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.png");
        image::RgbImage::from_fn(32, 48, |x, y| image::Rgb([x as u8, y as u8, 200]))
            .save(&path)
            .unwrap();

        let tensor = preprocess_image(&path, (INPUT_HEIGHT, INPUT_WIDTH)).unwrap();
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        let view = tensor.to_array_view::<f32>().unwrap();
        assert!(view.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn preprocess_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"plain text, not pixels").unwrap();

        let result = preprocess_image(&path, (INPUT_HEIGHT, INPUT_WIDTH));
        assert!(matches!(result, Err(ClassifyError::ImageProcessing(_))));
    }
}
