use crate::{
    AssignmentSolver, CostMatrices, JonkerVolgenant, MatchCounts, Result, Sequence,
};
use ndarray::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity aware detection counts and scores for one sequence.
///
/// Unlike per-frame overlap metrics these are derived from a single
/// sequence-wide pairing of ground truth to tracker identities, so identity
/// switches are penalized and not just missed or spurious boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityMetrics {
    /// True positive detections under the optimal identity assignment.
    pub idtp: u64,
    /// Ground truth detections left uncovered by the assignment.
    pub idfn: u64,
    /// Tracker detections left uncovered by the assignment.
    pub idfp: u64,
    /// Identity recall.
    pub idr: f64,
    /// Identity precision.
    pub idp: f64,
    /// Combined identity score, the harmonic style mean of precision and recall.
    pub idf1: f64,
}

impl IdentityMetrics {
    /// Derive the score fields from the three counts.
    ///
    /// Denominators floor at one so sequences where both counts are zero
    /// divide cleanly to zero.
    fn from_counts(idtp: u64, idfn: u64, idfp: u64) -> IdentityMetrics {
        let idr = idtp as f64 / ((idtp + idfn) as f64).max(1.0);
        let idp = idtp as f64 / ((idtp + idfp) as f64).max(1.0);
        let idf1 = idtp as f64 / (idtp as f64 + 0.5 * idfp as f64 + 0.5 * idfn as f64).max(1.0);

        IdentityMetrics {
            idtp,
            idfn,
            idfp,
            idr,
            idp,
            idf1,
        }
    }
}

/// Calculate ID metrics for one sequence.
///
/// Scans all timesteps once to count per identity-pair potential matches,
/// builds the augmented false negative and false positive cost matrices, and
/// lets the solver choose the sequence-wide identity pairing that minimizes
/// total mismatches. The aggregate sums over that pairing become the metric
/// counts; cost sums are exact integer values in `f64` and truncate to `u64`.
///
/// # Parameters
///
/// * `sequence`: The normalized sequence to score.
/// * `solver`: The assignment solver to use.
///
/// # Examples
///
/// ```
/// use idmetrics_rs::{identity_score_default, SequenceBuilder};
/// use ndarray::arr2;
///
/// let mut builder = SequenceBuilder::new();
/// builder.push_frame(&[7], &[101], arr2(&[[1.0]]));
/// builder.push_frame(&[7], &[101], arr2(&[[0.9]]));
/// let sequence = builder.build().unwrap();
///
/// let metrics = identity_score_default(&sequence).unwrap();
/// assert_eq!(metrics.idtp, 2);
/// assert_eq!(metrics.idf1, 1.0);
/// ```
pub fn identity_score(
    sequence: &Sequence,
    solver: &dyn AssignmentSolver,
) -> Result<IdentityMetrics> {
    // Return quickly if either side of the sequence is empty
    if sequence.num_tracker_dets() == 0 {
        return Ok(IdentityMetrics::from_counts(0, sequence.num_gt_dets(), 0));
    }
    if sequence.num_gt_dets() == 0 {
        return Ok(IdentityMetrics::from_counts(
            0,
            0,
            sequence.num_tracker_dets(),
        ));
    }

    let counts = MatchCounts::accumulate(sequence);
    let costs = CostMatrices::build(&counts);
    let assignment = solver.solve(&costs.total())?;

    let idfn = assigned_sum(costs.fn_costs(), &assignment) as u64;
    let idfp = assigned_sum(costs.fp_costs(), &assignment) as u64;
    let idtp = sequence.num_gt_dets() - idfn;

    debug!(idtp, idfn, idfp, "scored sequence");

    Ok(IdentityMetrics::from_counts(idtp, idfn, idfp))
}

/// Calculate ID metrics for one sequence with the default Jonker-Volgenant solver.
pub fn identity_score_default(sequence: &Sequence) -> Result<IdentityMetrics> {
    identity_score(sequence, &JonkerVolgenant)
}

fn assigned_sum(costs: &Array2<f64>, assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| costs[[row, col]])
        .sum()
}
