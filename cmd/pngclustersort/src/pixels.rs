//! PNG decoding and encoding for packed `0xAARRGGBB` pixels.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

const OPAQUE: u32 = 0xFF00_0000;

/// Packs RGBA channels into `0xAARRGGBB`.
pub fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Splits a packed pixel into its `(R, G, B, A)` channels.
pub fn unpack(pixel: u32) -> (u8, u8, u8, u8) {
    let [a, r, g, b] = pixel.to_be_bytes();
    (r, g, b, a)
}

/// Reads every pixel of a PNG in row-major order.
///
/// Grayscale and RGB images decode as opaque pixels.
pub fn read_pixels(path: &Path) -> Result<(Vec<u32>, u32, u32)> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            pack(r, g, b, a)
        })
        .collect();
    Ok((pixels, width, height))
}

/// Drops duplicate colors, ignoring alpha, and sorts ascending.
///
/// Every returned pixel is opaque.
pub fn unique_sorted(pixels: &[u32]) -> Vec<u32> {
    let mut out: Vec<u32> = pixels.iter().map(|&p| p | OPAQUE).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Maps a pixel to `(B, G, R)` coordinates.
pub fn pixel_to_point(pixel: u32) -> [f64; 3] {
    let (r, g, b, _) = unpack(pixel);
    [b as f64, g as f64, r as f64]
}

/// Squared Euclidean distance between two pixels' colors.
pub fn color_distance(p1: u32, p2: u32) -> u32 {
    let (r1, g1, b1, _) = unpack(p1);
    let (r2, g2, b2, _) = unpack(p2);
    let d = |a: u8, b: u8| {
        let d = a as i32 - b as i32;
        (d * d) as u32
    };
    d(r1, r2) + d(g1, g2) + d(b1, b2)
}

/// Writes pixels as an RGBA PNG `cols` wide. A short last row is padded
/// with transparent black.
pub fn write_pixels(path: &Path, pixels: &[u32], cols: u32) -> Result<()> {
    anyhow::ensure!(cols > 0, "image width must be positive");
    anyhow::ensure!(!pixels.is_empty(), "no pixels to write to {}", path.display());

    let rows = pixels.len().div_ceil(cols as usize);
    let mut buf = Vec::with_capacity(rows * cols as usize * 4);
    for &pixel in pixels {
        let (r, g, b, a) = unpack(pixel);
        buf.extend_from_slice(&[r, g, b, a]);
    }
    buf.resize(rows * cols as usize * 4, 0);

    let img = RgbaImage::from_raw(cols, rows as u32, buf)
        .context("pixel buffer does not match image dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_layout() {
        assert_eq!(pack(0x12, 0x34, 0x56, 0xFF), 0xFF12_3456);
        assert_eq!(unpack(0x8012_3456), (0x12, 0x34, 0x56, 0x80));
    }

    #[test]
    fn points_are_bgr() {
        assert_eq!(pixel_to_point(0xFF01_0203), [3.0, 2.0, 1.0]);
    }

    #[test]
    fn unique_ignores_alpha() {
        let pixels = [0xFF00_0010, 0x0000_0010, 0xFF00_0001, 0x8000_0010, 0xFF00_0001];
        assert_eq!(unique_sorted(&pixels), vec![0xFF00_0001, 0xFF00_0010]);
    }

    #[test]
    fn distance_ignores_alpha() {
        assert_eq!(color_distance(0xFF00_0000, 0x0001_0203), 1 + 4 + 9);
        assert_eq!(color_distance(0xFF12_3456, 0x0012_3456), 0);
    }

    #[test]
    fn write_then_read_pads_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let pixels = [0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF];
        write_pixels(&path, &pixels, 2).unwrap();

        let (read, width, height) = read_pixels(&path).unwrap();
        assert_eq!((width, height), (2, 2));
        assert_eq!(read, vec![0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0]);
    }

    #[test]
    fn write_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_pixels(&dir.path().join("empty.png"), &[], 4).is_err());
    }

    #[test]
    fn read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_pixels(&dir.path().join("missing.png")).unwrap_err();
        assert!(err.to_string().contains("failed to decode image"));
    }
}
