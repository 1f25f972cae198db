use crate::MatchCounts;
use ndarray::*;
use tracing::trace;

/// Cost of pairings the solver must never choose. Far above any achievable
/// real cost, which is bounded by the total detection count of the sequence.
const FORBIDDEN: f64 = 1e10;

/// Augmented square false negative and false positive cost matrices.
///
/// Both are `S x S` with `S = num_gt_ids + num_tracker_ids`. Rows
/// `0..num_gt_ids` are real ground truth identities followed by one dummy row
/// per tracker identity; columns are `0..num_tracker_ids` real tracker
/// identities followed by one dummy column per ground truth identity. A real
/// cell holds the marginal cost of pairing that ground truth with that
/// tracker; a diagonal dummy cell holds the cost of leaving the identity
/// entirely unmatched.
#[derive(Debug)]
pub struct CostMatrices {
    /// False negative cost per candidate pairing.
    fn_costs: Array2<f64>,
    /// False positive cost per candidate pairing.
    fp_costs: Array2<f64>,
}

impl CostMatrices {
    /// Build both cost matrices from the accumulated counts.
    ///
    /// Off-diagonal dummy cells are [`FORBIDDEN`] so that an identity's
    /// unmatched cost can only be paid through its own dummy cell, never
    /// through another identity's.
    pub fn build(counts: &MatchCounts) -> CostMatrices {
        let num_gt_ids = counts.gt_id_count().len();
        let num_tracker_ids = counts.tracker_id_count().len();
        let size = num_gt_ids + num_tracker_ids;

        let mut fn_costs = Array2::<f64>::zeros((size, size));
        let mut fp_costs = Array2::<f64>::zeros((size, size));

        fp_costs
            .slice_mut(s![num_gt_ids.., ..num_tracker_ids])
            .fill(FORBIDDEN);
        fn_costs
            .slice_mut(s![..num_gt_ids, num_tracker_ids..])
            .fill(FORBIDDEN);

        // A fully unmatched identity turns all of its detections into false
        // negatives (ground truth) or false positives (tracker).
        for (gt_id, &count) in counts.gt_id_count().iter().enumerate() {
            fn_costs
                .slice_mut(s![gt_id, ..num_tracker_ids])
                .fill(count as f64);
            fn_costs[[gt_id, num_tracker_ids + gt_id]] = count as f64;
        }
        for (tracker_id, &count) in counts.tracker_id_count().iter().enumerate() {
            fp_costs
                .slice_mut(s![..num_gt_ids, tracker_id])
                .fill(count as f64);
            fp_costs[[num_gt_ids + tracker_id, tracker_id]] = count as f64;
        }

        // Pairing covers the mutual matches; only the remainder goes unmatched
        let potential_matches = counts.potential_matches().mapv(|count| count as f64);
        let mut fn_real = fn_costs.slice_mut(s![..num_gt_ids, ..num_tracker_ids]);
        fn_real -= &potential_matches;
        let mut fp_real = fp_costs.slice_mut(s![..num_gt_ids, ..num_tracker_ids]);
        fp_real -= &potential_matches;

        trace!(size, "built cost matrices");

        CostMatrices { fn_costs, fp_costs }
    }

    /// Returns the false negative cost matrix
    pub fn fn_costs(&self) -> &Array2<f64> {
        &self.fn_costs
    }

    /// Returns the false positive cost matrix
    pub fn fp_costs(&self) -> &Array2<f64> {
        &self.fp_costs
    }

    /// Returns the combined cost matrix handed to the assignment solver
    pub fn total(&self) -> Array2<f64> {
        &self.fn_costs + &self.fp_costs
    }
}
