// Photo rendering for the terminal: images become rows of half-block cells
// carrying two vertically stacked pixels each.

use crate::domain::{MediaKind, PhotoAsset};
use crate::error::Result;
use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::path::Path;

/// Rendered preview: either colored image rows or a text placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    Text(Vec<String>),
    Styled(Vec<Line<'static>>),
}

impl PreviewContent {
    /// Rows needed to show the whole preview
    pub fn height(&self) -> usize {
        match self {
            PreviewContent::Text(lines) => lines.len(),
            PreviewContent::Styled(lines) => lines.len(),
        }
    }

    /// Columns of the widest row
    pub fn width(&self) -> usize {
        match self {
            PreviewContent::Text(lines) => lines.iter().map(|l| l.chars().count()).max(),
            PreviewContent::Styled(lines) => lines.iter().map(|l| l.width()).max(),
        }
        .unwrap_or(0)
    }
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Fits `original` inside `max` preserving aspect ratio; never upscales.
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;
    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        (original_width, original_height)
    } else {
        let new_width = ((original_width as f64 * ratio) as u32).max(1);
        let new_height = ((original_height as f64 * ratio) as u32).max(1);
        (new_width, new_height)
    }
}

/// Converts an image to rows of `▀` cells: foreground is the upper pixel,
/// background the lower one.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let height = if height % 2 == 0 { height } else { height + 1 };

    // Lanczos3 is too slow on full-resolution camera images
    let img = img
        .resize_exact(width, height, image::imageops::FilterType::Triangle)
        .to_rgb8();

    (0..height / 2)
        .map(|row| {
            let upper_y = row * 2;
            let lower_y = upper_y + 1;

            let spans: Vec<Span<'static>> = (0..width)
                .map(|x| {
                    let upper = img.get_pixel(x, upper_y).to_rgb();
                    let lower = img.get_pixel(x, lower_y).to_rgb();
                    let style = Style::default()
                        .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                        .bg(Color::Rgb(lower[0], lower[1], lower[2]));
                    Span::styled("▀", style)
                })
                .collect();

            Line::from(spans)
        })
        .collect()
}

/// Renders `img` into at most `max_cols` × `max_rows` cells.
///
/// Terminal cells are about twice as tall as wide, and each row holds two
/// pixels, so one cell covers a square pixel pair.
pub fn render_image(img: &DynamicImage, max_cols: u16, max_rows: u16) -> Vec<Line<'static>> {
    let (original_width, original_height) = img.dimensions();
    let (width, height) = calculate_resize_dimensions(
        original_width,
        original_height,
        max_cols as u32,
        max_rows as u32 * 2,
    );
    image_to_halfblock_lines(img, width, height)
}

/// `m:ss`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn placeholder(asset: &PhotoAsset, reason: &str) -> PreviewContent {
    let mut lines = vec![asset.filename.clone(), String::new(), reason.to_string()];
    if asset.duration > 0.0 {
        lines.push(format!("Duration: {}", format_duration(asset.duration)));
    }
    PreviewContent::Text(lines)
}

/// Preview for one asset sized to the given cell budget.
///
/// Assets that are not still images, or fail to decode, get a text
/// placeholder instead of an error.
pub fn generate_preview(asset: &PhotoAsset, max_cols: u16, max_rows: u16) -> PreviewContent {
    match asset.media_type {
        MediaKind::Photo => match load_image(&asset.path) {
            Ok(img) => PreviewContent::Styled(render_image(&img, max_cols, max_rows)),
            Err(e) => placeholder(asset, &format!("Cannot display photo: {}", e)),
        },
        MediaKind::Video | MediaKind::PairedVideo => placeholder(asset, "▶ Video"),
        MediaKind::Audio => placeholder(asset, "♪ Audio"),
        MediaKind::Unknown => placeholder(asset, "Unsupported file"),
    }
}

/// Header line used above image previews
pub fn caption(asset: &PhotoAsset) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            asset.filename.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}×{}", asset.width, asset.height),
            Style::default().fg(Color::Gray),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetId;
    use tempfile::TempDir;

    fn asset_at(path: &Path) -> PhotoAsset {
        PhotoAsset::from_path(AssetId::new("x"), path).unwrap()
    }

    mod resize_tests {
        use super::*;

        #[test]
        fn test_calculate_resize_dimensions_scale_down() {
            let (width, height) = calculate_resize_dimensions(1600, 1200, 80, 40);
            assert!(width <= 80);
            assert!(height <= 40);
            let ratio_diff = (width * 3).abs_diff(height * 4);
            assert!(ratio_diff <= 4, "Aspect ratio not preserved: {}x{}", width, height);
        }

        #[test]
        fn test_calculate_resize_dimensions_no_upscale() {
            assert_eq!(calculate_resize_dimensions(40, 30, 80, 40), (40, 30));
        }

        #[test]
        fn test_calculate_resize_dimensions_zero() {
            assert_eq!(calculate_resize_dimensions(0, 0, 80, 40), (0, 0));
        }

        #[test]
        fn test_calculate_resize_dimensions_wide_image() {
            assert_eq!(calculate_resize_dimensions(1600, 400, 80, 40), (80, 20));
        }

        #[test]
        fn test_calculate_resize_dimensions_extreme_panorama_keeps_a_row() {
            let (_, height) = calculate_resize_dimensions(10000, 10, 80, 40);
            assert_eq!(height, 1);
        }
    }

    mod halfblock_tests {
        use super::*;

        #[test]
        fn test_image_to_halfblock_dimensions() {
            let img = DynamicImage::new_rgb8(10, 10);
            let lines = image_to_halfblock_lines(&img, 5, 6);

            assert_eq!(lines.len(), 3);
            for line in &lines {
                assert_eq!(line.spans.len(), 5);
            }
        }

        #[test]
        fn test_odd_height_rounds_up() {
            let img = DynamicImage::new_rgb8(4, 4);
            assert_eq!(image_to_halfblock_lines(&img, 4, 3).len(), 2);
        }

        #[test]
        fn test_colors_split_between_halves() {
            let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(1, 2, |_, y| {
                if y == 0 {
                    image::Rgb([255, 0, 0])
                } else {
                    image::Rgb([0, 0, 255])
                }
            }));

            let lines = image_to_halfblock_lines(&img, 1, 2);
            let style = lines[0].spans[0].style;
            assert_eq!(style.fg, Some(Color::Rgb(255, 0, 0)));
            assert_eq!(style.bg, Some(Color::Rgb(0, 0, 255)));
        }

        #[test]
        fn test_render_image_fits_cell_budget() {
            let img = DynamicImage::new_rgb8(400, 300);
            let lines = render_image(&img, 40, 10);

            assert!(lines.len() <= 10);
            assert!(lines.iter().all(|l| l.width() <= 40));
        }
    }

    mod preview_tests {
        use super::*;

        #[test]
        fn test_generate_preview_photo() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("photo.png");
            image::RgbImage::from_fn(100, 100, |x, y| {
                let intensity = ((x + y) * 255 / 200) as u8;
                image::Rgb([intensity, intensity, intensity])
            })
            .save(&path)
            .unwrap();

            match generate_preview(&asset_at(&path), 20, 10) {
                PreviewContent::Styled(lines) => {
                    assert_eq!(lines.len(), 10);
                    assert_eq!(lines[0].spans.len(), 20);
                }
                other => panic!("Expected styled preview, got {:?}", other),
            }
        }

        #[test]
        fn test_generate_preview_undecodable_photo() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("broken.jpg");
            std::fs::write(&path, b"garbage").unwrap();

            match generate_preview(&asset_at(&path), 20, 10) {
                PreviewContent::Text(lines) => {
                    assert_eq!(lines[0], "broken.jpg");
                    assert!(lines[2].starts_with("Cannot display photo"));
                }
                other => panic!("Expected text placeholder, got {:?}", other),
            }
        }

        #[test]
        fn test_generate_preview_video_placeholder() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("clip.mov");
            std::fs::write(&path, b"video").unwrap();
            let mut asset = asset_at(&path);
            asset.duration = 75.0;

            let preview = generate_preview(&asset, 20, 10);
            assert_eq!(
                preview,
                PreviewContent::Text(vec![
                    "clip.mov".to_string(),
                    String::new(),
                    "▶ Video".to_string(),
                    "Duration: 1:15".to_string(),
                ])
            );
        }

        #[test]
        fn test_preview_content_size() {
            let content = PreviewContent::Text(vec!["ab".to_string(), "abcd".to_string()]);
            assert_eq!(content.height(), 2);
            assert_eq!(content.width(), 4);
        }

        #[test]
        fn test_caption_contains_name_and_size() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("beach.png");
            image::RgbImage::new(12, 8).save(&path).unwrap();

            let text: String = caption(&asset_at(&path))
                .spans
                .iter()
                .map(|s| s.content.to_string())
                .collect();
            assert!(text.contains("beach.png"));
            assert!(text.contains("12×8"));
        }
    }
}
