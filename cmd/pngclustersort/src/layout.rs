//! Arranging clustered pixels into image rows.

use crate::sort::PixelCluster;

fn members(result: &PixelCluster) -> &[u32] {
    result.key.as_deref().unwrap_or_default()
}

/// One block of rows per cluster, each padded with zero pixels to a
/// multiple of `cols`.
///
/// A cluster filling its last row exactly still gets a full row of padding,
/// so consecutive clusters are always visibly separated.
pub fn cluster_rows(results: &[PixelCluster], cols: usize) -> Vec<u32> {
    let mut out = Vec::new();
    for result in results {
        let pixels = members(result);
        out.extend_from_slice(pixels);
        let pad = cols - pixels.len() % cols;
        out.resize(out.len() + pad, 0);
    }
    out
}

/// Member pixels of every cluster in `order`, padded with zero pixels to a
/// whole number of `cols`-wide rows.
pub fn sorted_pixels(results: &[PixelCluster], order: &[usize], cols: usize) -> Vec<u32> {
    let mut out: Vec<u32> = order
        .iter()
        .flat_map(|&i| members(&results[i]).iter().copied())
        .collect();
    let rem = out.len() % cols;
    if rem != 0 {
        out.resize(out.len() + cols - rem, 0);
    }
    out
}
