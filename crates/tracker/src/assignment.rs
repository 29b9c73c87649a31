//! Optimal assignment between predicted tracks and detections

use crate::bbox::BoundingBox;

/// Result of one IoU association pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    /// Matched `(row, col)` pairs, e.g. `(track, detection)`
    pub matches: Vec<(usize, usize)>,
    /// Rows left without a partner
    pub unmatched_rows: Vec<usize>,
    /// Columns left without a partner
    pub unmatched_cols: Vec<usize>,
}

/// Solve the rectangular linear sum assignment problem (minimisation).
///
/// Returns `(row, col)` pairs; every row is assigned when `rows <= cols`,
/// otherwise every column is. Kuhn-Munkres with potentials, O(n^2 m).
pub fn linear_sum_assignment(cost: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let rows = cost.len();
    let cols = cost.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    if rows > cols {
        let transposed: Vec<Vec<f64>> = (0..cols)
            .map(|c| (0..rows).map(|r| cost[r][c]).collect())
            .collect();
        return solve(&transposed)
            .into_iter()
            .map(|(c, r)| (r, c))
            .collect();
    }

    solve(cost)
}

/// Hungarian algorithm for `n <= m`, 1-based potentials
fn solve(cost: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let n = cost.len();
    let m = cost[0].len();
    let at = |i: usize, j: usize| {
        let c = cost[i - 1][j - 1];
        if c.is_finite() {
            c
        } else {
            f64::MAX / 4.0
        }
    };

    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    // p[j]: row assigned to column j (0 = none)
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = at(i0, j) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect()
}

/// Match boxes by maximising total IoU, then drop pairs under `min_iou`
pub fn associate(rows: &[BoundingBox], cols: &[BoundingBox], min_iou: f64) -> Association {
    if rows.is_empty() || cols.is_empty() {
        return Association {
            matches: Vec::new(),
            unmatched_rows: (0..rows.len()).collect(),
            unmatched_cols: (0..cols.len()).collect(),
        };
    }

    let iou: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| cols.iter().map(|c| r.iou(c)).collect())
        .collect();
    let cost: Vec<Vec<f64>> = iou
        .iter()
        .map(|row| row.iter().map(|v| 1.0 - v).collect())
        .collect();

    let mut row_matched = vec![false; rows.len()];
    let mut col_matched = vec![false; cols.len()];
    let mut matches = Vec::new();

    for (r, c) in linear_sum_assignment(&cost) {
        if iou[r][c] >= min_iou {
            row_matched[r] = true;
            col_matched[c] = true;
            matches.push((r, c));
        }
    }
    matches.sort_unstable();

    Association {
        matches,
        unmatched_rows: (0..rows.len()).filter(|&r| !row_matched[r]).collect(),
        unmatched_cols: (0..cols.len()).filter(|&c| !col_matched[c]).collect(),
    }
}
