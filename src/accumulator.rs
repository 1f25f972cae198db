use crate::Sequence;
use ndarray::*;
use tracing::debug;

/// Minimum similarity for a ground truth and tracker detection to count as a
/// potential match of their identities.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Global association counts for one sequence.
///
/// Built in a single pass over all timesteps. These counts are everything the
/// cost matrices need; the per-timestep data is not consulted again afterwards.
#[derive(Debug)]
pub struct MatchCounts {
    /// Number of timesteps where each `(gt, tracker)` identity pair co-occurs with similarity at or above [`SIMILARITY_THRESHOLD`].
    potential_matches: Array2<u64>,
    /// Number of timesteps in which each ground truth identity appears.
    gt_id_count: Array1<u64>,
    /// Number of timesteps in which each tracker identity appears.
    tracker_id_count: Array1<u64>,
}

impl MatchCounts {
    /// Scan every timestep once and accumulate global track information.
    ///
    /// # Parameters
    ///
    /// * `sequence`: The normalized sequence to scan.
    pub fn accumulate(sequence: &Sequence) -> MatchCounts {
        let mut potential_matches =
            Array2::<u64>::zeros((sequence.num_gt_ids(), sequence.num_tracker_ids()));
        let mut gt_id_count = Array1::<u64>::zeros(sequence.num_gt_ids());
        let mut tracker_id_count = Array1::<u64>::zeros(sequence.num_tracker_ids());

        for (gt_ids_t, tracker_ids_t, similarity_t) in sequence.timesteps() {
            // Count the potential matches between identities in this timestep
            for (row, &gt_id) in gt_ids_t.iter().enumerate() {
                for (col, &tracker_id) in tracker_ids_t.iter().enumerate() {
                    if similarity_t[[row, col]] >= SIMILARITY_THRESHOLD {
                        potential_matches[[gt_id, tracker_id]] += 1;
                    }
                }
            }

            // Every active identity counts, matched or not
            for &gt_id in gt_ids_t {
                gt_id_count[gt_id] += 1;
            }
            for &tracker_id in tracker_ids_t {
                tracker_id_count[tracker_id] += 1;
            }
        }

        debug!(
            timesteps = sequence.len(),
            potential_matches = potential_matches.sum(),
            "accumulated match counts"
        );

        MatchCounts {
            potential_matches,
            gt_id_count,
            tracker_id_count,
        }
    }

    /// Returns the potential match counts per `(gt, tracker)` identity pair
    pub fn potential_matches(&self) -> &Array2<u64> {
        &self.potential_matches
    }

    /// Returns the per ground truth identity detection counts
    pub fn gt_id_count(&self) -> &Array1<u64> {
        &self.gt_id_count
    }

    /// Returns the per tracker identity detection counts
    pub fn tracker_id_count(&self) -> &Array1<u64> {
        &self.tracker_id_count
    }
}
