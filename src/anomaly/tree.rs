//! Isolation tree construction and path lengths

use ndarray::{Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Euler–Mascheroni constant used in the harmonic number approximation
pub const EULER_GAMMA: f64 = 0.5772156649;

/// Isolation Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IsolationTree {
    /// Internal node with split
    Internal {
        /// Feature index for split
        feature: usize,
        /// Split value
        threshold: f64,
        /// Left subtree (values < threshold)
        left: Box<IsolationTree>,
        /// Right subtree (values >= threshold)
        right: Box<IsolationTree>,
    },
    /// External (leaf) node
    External {
        /// Number of training samples routed here
        size: usize,
        /// Depth of the leaf (root = 0)
        depth: usize,
    },
}

impl IsolationTree {
    /// Build an isolation tree over the rows `indices` of `x`.
    ///
    /// Random draws happen in pre-order: at each split node one feature draw,
    /// then one split draw, then the whole left subtree, then the right one.
    /// Leaves consume no randomness.
    pub fn build(
        x: &Array2<f64>,
        indices: &[usize],
        depth: usize,
        max_depth: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let n_samples = indices.len();

        if n_samples <= 1 || depth >= max_depth {
            return IsolationTree::External { size: n_samples, depth };
        }

        // Features that can still separate this node's samples
        let candidates: Vec<(usize, f64, f64)> = (0..x.ncols())
            .filter_map(|feature| {
                let (min_val, max_val) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| {
                        let v = x[[i, feature]];
                        (lo.min(v), hi.max(v))
                    },
                );
                (max_val > min_val).then_some((feature, min_val, max_val))
            })
            .collect();

        // All samples identical
        if candidates.is_empty() {
            return IsolationTree::External { size: n_samples, depth };
        }

        let (feature, min_val, max_val) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(min_val..max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] < threshold);

        let left = Box::new(Self::build(x, &left_indices, depth + 1, max_depth, rng));
        let right = Box::new(Self::build(x, &right_indices, depth + 1, max_depth, rng));

        IsolationTree::Internal {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Depth of the reached leaf plus the expected remaining depth of its samples
    pub fn path_length(&self, sample: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                IsolationTree::External { size, depth } => {
                    return *depth as f64 + average_path_length(*size);
                }
                IsolationTree::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] < *threshold { left } else { right };
                }
            }
        }
    }

    /// Maximum leaf depth
    pub fn height(&self) -> usize {
        match self {
            IsolationTree::External { depth, .. } => *depth,
            IsolationTree::Internal { left, right, .. } => left.height().max(right.height()),
        }
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        match self {
            IsolationTree::External { .. } => 1,
            IsolationTree::Internal { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    /// Total training samples held by the leaves
    pub fn n_samples(&self) -> usize {
        match self {
            IsolationTree::External { size, .. } => *size,
            IsolationTree::Internal { left, right, .. } => left.n_samples() + right.n_samples(),
        }
    }
}

/// Depth ceiling for trees grown on `max_samples` rows: ceil(log2(max_samples))
pub fn max_depth_for(max_samples: usize) -> usize {
    if max_samples <= 1 {
        return 0;
    }
    (max_samples as f64).log2().ceil() as usize
}

/// Average path length of an unsuccessful search in a BST of `n` nodes.
///
/// c(n) = 2·H(n−1) − 2·(n−1)/n for n > 1, and 0 otherwise,
/// with H(i) ≈ ln(i) + γ.
pub fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n_f = n as f64;
    2.0 * harmonic(n_f - 1.0) - 2.0 * (n_f - 1.0) / n_f
}

#[inline]
fn harmonic(i: f64) -> f64 {
    i.ln() + EULER_GAMMA
}
