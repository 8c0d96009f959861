//! Color clustering and the cluster-to-cluster walk.

use anyhow::Result;
use gvm::{ClusterResult, Clusters, ListKeyer, ReduceOptions, VectorSpace};
use tracing::debug;

use crate::pixels::{color_distance, pixel_to_point};

/// A cluster whose key lists its member pixels.
pub type PixelCluster = ClusterResult<Vec<u32>>;

/// Clusters `pixels` in BGR space, keeping every pixel in its cluster's key.
pub fn cluster_pixels(
    pixels: &[u32],
    capacity: usize,
    reduce: Option<&ReduceOptions>,
) -> Result<Vec<PixelCluster>> {
    let space = VectorSpace::new(3)?;
    let mut clusters = Clusters::with_keyer(space, capacity, ListKeyer)?;
    for &pixel in pixels {
        clusters.add(1.0, &pixel_to_point(pixel), Some(vec![pixel]))?;
    }
    debug!("clustered {} pixels into {} clusters", pixels.len(), clusters.count());

    if let Some(opts) = reduce {
        clusters.reduce_with(opts)?;
    }
    Ok(clusters.into_results())
}

/// Index of the pixel nearest `target`. The first minimum wins.
pub fn closest_pixel(pixels: &[u32], target: u32) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &pixel) in pixels.iter().enumerate() {
        let d = color_distance(pixel, target);
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((i, d));
            if d == 0 {
                break;
            }
        }
    }
    best.map(|(i, _)| i)
}

fn clamp_byte(c: f64) -> u8 {
    c.round().clamp(0.0, 255.0) as u8
}

/// The member pixel nearest the cluster's centroid, with alpha cleared.
/// Falls back to the rounded centroid for an empty cluster.
pub fn center_pixel(result: &PixelCluster) -> u32 {
    let (b, g, r) = match result.point.as_slice() {
        [b, g, r] => (clamp_byte(*b), clamp_byte(*g), clamp_byte(*r)),
        _ => (0, 0, 0),
    };
    let centroid = u32::from_be_bytes([0, r, g, b]);
    let members = result.key.as_deref().unwrap_or_default();
    match closest_pixel(members, centroid) {
        Some(i) => members[i] & 0x00FF_FFFF,
        None => centroid,
    }
}

/// Visiting order over cluster centers: start nearest black, then always
/// step to the nearest unvisited center.
pub fn nearest_tour(centers: &[u32]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..centers.len()).collect();
    let mut order = Vec::with_capacity(centers.len());
    let mut current = 0;
    while !remaining.is_empty() {
        let candidates: Vec<u32> = remaining.iter().map(|&i| centers[i]).collect();
        let Some(next) = closest_pixel(&candidates, current) else {
            break;
        };
        let cluster = remaining.remove(next);
        order.push(cluster);
        current = centers[cluster];
    }
    order
}
