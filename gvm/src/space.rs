use crate::GvmError;

/// Fixed-dimension Euclidean coordinate space.
///
/// Points are plain `f64` slices of length [`VectorSpace::dimensions`].
/// All operations are elementwise and never allocate except the
/// `new_*` factories.
///
/// The three `variance*` forms compute the weighted sum of squared
/// deviations `Σ m2[i] - m1[i]² / m` from mass-weighted moments. The split
/// forms fold a point or a second cluster into the moments on the fly so a
/// merge can be costed without materialising the merged cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSpace {
    dim: usize,
}

impl VectorSpace {
    /// Creates a space with `dim` coordinates per point.
    pub fn new(dim: usize) -> Result<Self, GvmError> {
        if dim == 0 {
            return Err(GvmError::InvalidDimension(dim));
        }
        Ok(Self { dim })
    }

    /// Number of coordinates per point.
    pub fn dimensions(&self) -> usize {
        self.dim
    }

    // ---------------------------------------------------------------------
    // Factories
    // ---------------------------------------------------------------------

    pub fn new_origin(&self) -> Vec<f64> {
        vec![0.0; self.dim]
    }

    pub fn new_copy(&self, pt: &[f64]) -> Vec<f64> {
        debug_assert_eq!(pt.len(), self.dim);
        pt.to_vec()
    }

    // ---------------------------------------------------------------------
    // Point reductions
    // ---------------------------------------------------------------------

    pub fn magnitude_sqr(&self, pt: &[f64]) -> f64 {
        pt.iter().map(|&c| c * c).sum()
    }

    pub fn sum(&self, pt: &[f64]) -> f64 {
        pt.iter().sum()
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, pt1: &[f64], pt2: &[f64]) -> f64 {
        pt1.iter()
            .zip(pt2)
            .map(|(&a, &b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    // ---------------------------------------------------------------------
    // In-place point updates
    // ---------------------------------------------------------------------

    pub fn set_to_origin(&self, pt: &mut [f64]) {
        pt.fill(0.0);
    }

    pub fn set_to(&self, dst: &mut [f64], src: &[f64]) {
        dst.copy_from_slice(src);
    }

    pub fn set_to_scaled(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = m * s;
        }
    }

    pub fn set_to_scaled_sqr(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = m * (s * s);
        }
    }

    pub fn add(&self, dst: &mut [f64], src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s;
        }
    }

    pub fn add_scaled(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += m * s;
        }
    }

    pub fn add_scaled_sqr(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += m * (s * s);
        }
    }

    pub fn subtract(&self, dst: &mut [f64], src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d -= s;
        }
    }

    pub fn subtract_scaled(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d -= m * s;
        }
    }

    pub fn subtract_scaled_sqr(&self, dst: &mut [f64], m: f64, src: &[f64]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d -= m * (s * s);
        }
    }

    pub fn scale(&self, pt: &mut [f64], m: f64) {
        for c in pt.iter_mut() {
            *c *= m;
        }
    }

    pub fn square(&self, pt: &mut [f64]) {
        for c in pt.iter_mut() {
            *c *= *c;
        }
    }

    // ---------------------------------------------------------------------
    // Variance
    // ---------------------------------------------------------------------

    /// Variance of a single cluster with mass `m`, first moment `pt` and
    /// second moment `pt_sqr`.
    pub fn variance(&self, m: f64, pt: &[f64], pt_sqr: &[f64]) -> f64 {
        let m_mult = 1.0 / m;
        pt.iter()
            .zip(pt_sqr)
            .map(|(&c, &c_sqr)| c_sqr - (c * c) * m_mult)
            .sum()
    }

    /// Variance of a cluster after adding the point `pt2` with mass `m2`.
    pub fn variance_with_point(
        &self,
        m1: f64,
        pt1: &[f64],
        pt_sqr1: &[f64],
        m2: f64,
        pt2: &[f64],
    ) -> f64 {
        let m0_mult = 1.0 / (m1 + m2);
        let mut sum = 0.0;
        for i in 0..self.dim {
            let c2 = pt2[i];
            let c = pt1[i] + m2 * c2;
            let c_sqr = pt_sqr1[i] + m2 * (c2 * c2);
            sum += c_sqr - (c * c) * m0_mult;
        }
        sum
    }

    /// Variance of the union of two clusters given their moments.
    pub fn variance_with_cluster(
        &self,
        m1: f64,
        pt1: &[f64],
        pt_sqr1: &[f64],
        m2: f64,
        pt2: &[f64],
        pt_sqr2: &[f64],
    ) -> f64 {
        let m0_mult = 1.0 / (m1 + m2);
        let mut sum = 0.0;
        for i in 0..self.dim {
            let c = pt1[i] + pt2[i];
            let c_sqr = pt_sqr1[i] + pt_sqr2[i];
            sum += c_sqr - (c * c) * m0_mult;
        }
        sum
    }

    /// Space-separated coordinates, e.g. `"0.5 0.5 0.5"`.
    pub fn format_point(&self, pt: &[f64]) -> String {
        format_point(pt)
    }
}

pub(crate) fn format_point(pt: &[f64]) -> String {
    pt.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moments(space: &VectorSpace, points: &[(f64, &[f64])]) -> (f64, Vec<f64>, Vec<f64>) {
        let mut m0 = 0.0;
        let mut m1 = space.new_origin();
        let mut m2 = space.new_origin();
        for &(m, pt) in points {
            m0 += m;
            space.add_scaled(&mut m1, m, pt);
            space.add_scaled_sqr(&mut m2, m, pt);
        }
        (m0, m1, m2)
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(VectorSpace::new(0), Err(GvmError::InvalidDimension(0)));
    }

    #[test]
    fn elementwise_ops() {
        let space = VectorSpace::new(3).unwrap();
        let mut p = space.new_origin();
        space.add_scaled(&mut p, 2.0, &[1.0, 2.0, 3.0]);
        assert_eq!(p, vec![2.0, 4.0, 6.0]);
        space.subtract(&mut p, &[1.0, 1.0, 1.0]);
        assert_eq!(p, vec![1.0, 3.0, 5.0]);
        space.scale(&mut p, 0.5);
        assert_eq!(p, vec![0.5, 1.5, 2.5]);
        space.square(&mut p);
        assert_eq!(p, vec![0.25, 2.25, 6.25]);
        space.set_to_scaled_sqr(&mut p, 3.0, &[1.0, 2.0, 0.0]);
        assert_eq!(p, vec![3.0, 12.0, 0.0]);
        space.subtract_scaled_sqr(&mut p, 1.0, &[1.0, 2.0, 0.0]);
        assert_eq!(p, vec![2.0, 8.0, 0.0]);
        space.set_to_origin(&mut p);
        assert_eq!(p, space.new_origin());
    }

    #[test]
    fn reductions() {
        let space = VectorSpace::new(2).unwrap();
        assert_eq!(space.magnitude_sqr(&[3.0, 4.0]), 25.0);
        assert_eq!(space.sum(&[3.0, 4.0]), 7.0);
        assert!((space.distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn variance_matches_squared_deviations() {
        let space = VectorSpace::new(2).unwrap();
        let pts: [&[f64]; 3] = [&[0.0, 0.0], &[2.0, 0.0], &[1.0, 3.0]];
        let (m0, m1, m2) = moments(&space, &[(1.0, pts[0]), (1.0, pts[1]), (1.0, pts[2])]);

        // centroid (1, 1): deviations 2 + 2 + 4
        let var = space.variance(m0, &m1, &m2);
        assert!((var - 8.0).abs() < 1e-9, "got {var}");
    }

    #[test]
    fn split_forms_match_literal_merge() {
        let space = VectorSpace::new(3).unwrap();
        let a: [(f64, &[f64]); 2] = [(1.0, &[0.0, 1.0, 2.0]), (2.5, &[4.0, -1.0, 0.5])];
        let b: [(f64, &[f64]); 2] = [(0.5, &[9.0, 9.0, 9.0]), (3.0, &[-2.0, 0.0, 1.0])];
        let (ma, a1, a2) = moments(&space, &a);
        let (mb, b1, b2) = moments(&space, &b);
        let (mall, all1, all2) = moments(&space, &[a[0], a[1], b[0], b[1]]);

        let literal = space.variance(mall, &all1, &all2);
        let split = space.variance_with_cluster(ma, &a1, &a2, mb, &b1, &b2);
        assert!((literal - split).abs() < 1e-9, "{literal} vs {split}");

        let (mp, p1, p2) = moments(&space, &[a[0], a[1], b[0]]);
        let literal = space.variance(mp, &p1, &p2);
        let split = space.variance_with_point(ma, &a1, &a2, b[0].0, b[0].1);
        assert!((literal - split).abs() < 1e-9, "{literal} vs {split}");
    }

    #[test]
    fn format_point_joins_coordinates() {
        let space = VectorSpace::new(3).unwrap();
        assert_eq!(space.format_point(&[0.5, 1.0, 10.0]), "0.5 1 10");
    }
}
