use crate::{MetricsError, Result};
use ndarray::*;
use tracing::trace;

/// Minimum cost bipartite perfect matching over a square cost matrix.
///
/// Implementations return one column per row such that every column is used
/// exactly once and the total cost is minimal. The minimized total is unique;
/// the permutation achieving it may not be when several optima tie, which is
/// acceptable because callers only consume aggregate sums over the
/// assignment.
pub trait AssignmentSolver {
    /// Solve the assignment problem.
    ///
    /// # Parameters
    ///
    /// * `costs`: A square matrix of finite, non-negative costs where entry `(i, j)` is the cost of assigning row `i` to column `j`.
    ///
    /// # Returns
    ///
    /// The assigned column for each row, forming a permutation of `0..costs.nrows()`.
    fn solve(&self, costs: &Array2<f64>) -> Result<Vec<usize>>;
}

/// Solver backed by the Jonker-Volgenant implementation of the `lapjv` crate.
///
/// Equivalent to `scipy.optimize.linear_sum_assignment` restricted to square
/// inputs: `lapjv` returns the column index chosen for each row together with
/// the inverse mapping, of which only the former is needed here.
#[derive(Debug, Default)]
pub struct JonkerVolgenant;

impl AssignmentSolver for JonkerVolgenant {
    fn solve(&self, costs: &Array2<f64>) -> Result<Vec<usize>> {
        if costs.nrows() != costs.ncols() {
            return Err(MetricsError::Numeric(format!(
                "cost matrix is not square: {:?}",
                costs.dim()
            )));
        }
        if let Some(cost) = costs.iter().find(|cost| !cost.is_finite() || **cost < 0.0) {
            return Err(MetricsError::Numeric(format!(
                "cost matrix contains invalid entry {cost}"
            )));
        }

        let matrix = lapjv::Matrix::from_shape_fn(costs.dim(), |index| costs[index]);
        let (row_assignment, _) =
            lapjv::lapjv(&matrix).map_err(|err| MetricsError::Numeric(err.to_string()))?;

        trace!(rows = row_assignment.len(), "solved assignment");

        Ok(row_assignment)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use ndarray::*;

    fn total_cost(costs: &Array2<f64>, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| costs[[row, col]])
            .sum()
    }

    #[test]
    fn finds_minimum_cost_permutation() -> anyhow::Result<()> {
        let costs = arr2(&[[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]]);
        let assignment = JonkerVolgenant.solve(&costs)?;

        let mut sorted = assignment.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        assert_eq!(total_cost(&costs, &assignment), 5.0);

        Ok(())
    }

    #[test]
    fn avoids_large_sentinel_cells() -> anyhow::Result<()> {
        // A valid zero cost permutation exists through the sentinel-free cells
        let costs = arr2(&[[0.0, 1e10, 1.0], [1e10, 0.0, 1e10], [1.0, 1e10, 0.0]]);
        let assignment = JonkerVolgenant.solve(&costs)?;
        assert_eq!(total_cost(&costs, &assignment), 0.0);

        Ok(())
    }

    #[test]
    fn rejects_nan_costs() {
        let costs = arr2(&[[0.0, f64::NAN], [1.0, 0.0]]);
        assert!(matches!(
            JonkerVolgenant.solve(&costs),
            Err(MetricsError::Numeric(_))
        ));
    }

    #[test]
    fn rejects_negative_costs() {
        let costs = arr2(&[[0.0, -1.0], [1.0, 0.0]]);
        assert!(matches!(
            JonkerVolgenant.solve(&costs),
            Err(MetricsError::Numeric(_))
        ));
    }

    #[test]
    fn rejects_non_square_costs() {
        let costs = arr2(&[[0.0, 1.0, 2.0], [1.0, 0.0, 3.0]]);
        assert!(matches!(
            JonkerVolgenant.solve(&costs),
            Err(MetricsError::Numeric(_))
        ));
    }
}
