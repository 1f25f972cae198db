use crate::{MetricsError, Result};
use fixedbitset::FixedBitSet;
use itertools::izip;
use ndarray::*;
use std::collections::HashMap;

/// Sequence holds the normalized per-timestep detections of one video
/// sequence: the active ground truth identities, the active tracker
/// identities, and the similarity matrix between them at every timestep.
///
/// Identities are dense zero based integers within their own namespace.
/// Ground truth and tracker identities are independent namespaces and are
/// never compared by value. Use [`SequenceBuilder`] to relabel raw sparse
/// identifiers into this scheme.
#[derive(Debug, Clone)]
pub struct Sequence {
    /// Active ground truth identities at each timestep.
    gt_ids: Vec<Vec<usize>>,
    /// Active tracker identities at each timestep.
    tracker_ids: Vec<Vec<usize>>,
    /// Similarity between active ground truth rows and tracker columns at each timestep.
    similarity: Vec<Array2<f64>>,
    /// Number of distinct ground truth identities.
    num_gt_ids: usize,
    /// Number of distinct tracker identities.
    num_tracker_ids: usize,
    /// Total ground truth detections over all timesteps.
    num_gt_dets: u64,
    /// Total tracker detections over all timesteps.
    num_tracker_dets: u64,
}

impl Sequence {
    /// Returns a new Sequence from already dense, zero based identity labels.
    ///
    /// # Parameters
    ///
    /// * `gt_ids`: Active ground truth identities at each timestep.
    /// * `tracker_ids`: Active tracker identities at each timestep.
    /// * `similarity`: One matrix per timestep of shape `(gt_ids[t].len(), tracker_ids[t].len())` with entries in `[0.0, 1.0]`, rows and columns ordered to match the identity arrays.
    pub fn new(
        gt_ids: Vec<Vec<usize>>,
        tracker_ids: Vec<Vec<usize>>,
        similarity: Vec<Array2<f64>>,
    ) -> Result<Sequence> {
        if gt_ids.len() != tracker_ids.len() || gt_ids.len() != similarity.len() {
            return Err(MetricsError::Validation(format!(
                "timestep counts differ: {} gt, {} tracker, {} similarity",
                gt_ids.len(),
                tracker_ids.len(),
                similarity.len()
            )));
        }

        for (t, (gt_ids_t, tracker_ids_t, similarity_t)) in
            izip!(&gt_ids, &tracker_ids, &similarity).enumerate()
        {
            let expected = (gt_ids_t.len(), tracker_ids_t.len());
            if similarity_t.dim() != expected {
                return Err(MetricsError::Shape {
                    timestep: t,
                    expected,
                    actual: similarity_t.dim(),
                });
            }
            if let Some(score) = similarity_t.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(MetricsError::Validation(format!(
                    "similarity score {score} at timestep {t} is NaN or outside [0.0, 1.0]"
                )));
            }
        }

        let num_gt_ids = dense_id_count(&gt_ids, "ground truth")?;
        let num_tracker_ids = dense_id_count(&tracker_ids, "tracker")?;

        Ok(Sequence {
            num_gt_dets: gt_ids.iter().map(|ids| ids.len() as u64).sum(),
            num_tracker_dets: tracker_ids.iter().map(|ids| ids.len() as u64).sum(),
            gt_ids,
            tracker_ids,
            similarity,
            num_gt_ids,
            num_tracker_ids,
        })
    }

    /// Returns the number of distinct ground truth identities
    pub fn num_gt_ids(&self) -> usize {
        self.num_gt_ids
    }

    /// Returns the number of distinct tracker identities
    pub fn num_tracker_ids(&self) -> usize {
        self.num_tracker_ids
    }

    /// Returns the total number of ground truth detections
    pub fn num_gt_dets(&self) -> u64 {
        self.num_gt_dets
    }

    /// Returns the total number of tracker detections
    pub fn num_tracker_dets(&self) -> u64 {
        self.num_tracker_dets
    }

    /// Returns the number of timesteps
    pub fn len(&self) -> usize {
        self.gt_ids.len()
    }

    /// Returns true when the sequence has no timesteps
    pub fn is_empty(&self) -> bool {
        self.gt_ids.is_empty()
    }

    /// Iterate the aligned `(gt_ids, tracker_ids, similarity)` triple of every timestep
    pub fn timesteps(&self) -> impl Iterator<Item = (&[usize], &[usize], &Array2<f64>)> {
        izip!(&self.gt_ids, &self.tracker_ids, &self.similarity)
            .map(|(gt_ids_t, tracker_ids_t, similarity_t)| {
                (gt_ids_t.as_slice(), tracker_ids_t.as_slice(), similarity_t)
            })
    }
}

/// Verify that the used labels cover a contiguous `0..n` range and return `n`.
fn dense_id_count(ids: &[Vec<usize>], namespace: &str) -> Result<usize> {
    match ids.iter().flatten().max() {
        None => Ok(0),
        Some(&max_id) => {
            let mut seen = FixedBitSet::with_capacity(max_id + 1);
            ids.iter().flatten().for_each(|&id| seen.insert(id));
            match (0..=max_id).find(|&id| !seen.contains(id)) {
                Some(missing) => Err(MetricsError::Validation(format!(
                    "{namespace} identities are not dense: id {missing} never occurs but id {max_id} does"
                ))),
                None => Ok(max_id + 1),
            }
        }
    }
}

/// Incremental adapter that normalizes raw detection tables into a [`Sequence`].
///
/// Raw identifiers may be arbitrary and sparse (database keys, tracker handles).
/// Each namespace is relabeled independently to dense zero based identities in
/// order of first appearance.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    gt_labels: HashMap<i64, usize>,
    tracker_labels: HashMap<i64, usize>,
    gt_ids: Vec<Vec<usize>>,
    tracker_ids: Vec<Vec<usize>>,
    similarity: Vec<Array2<f64>>,
}

impl SequenceBuilder {
    /// Returns a new empty SequenceBuilder
    pub fn new() -> SequenceBuilder {
        SequenceBuilder::default()
    }

    /// Append one frame of detections.
    ///
    /// # Parameters
    ///
    /// * `gt_ids`: Raw ground truth identifiers active in this frame.
    /// * `tracker_ids`: Raw tracker identifiers active in this frame.
    /// * `similarity`: Overlap between the ground truth and tracker detections, rows and columns ordered like the identifier slices.
    pub fn push_frame(
        &mut self,
        gt_ids: &[i64],
        tracker_ids: &[i64],
        similarity: Array2<f64>,
    ) -> &mut Self {
        self.gt_ids.push(relabel(&mut self.gt_labels, gt_ids));
        self.tracker_ids
            .push(relabel(&mut self.tracker_labels, tracker_ids));
        self.similarity.push(similarity);
        self
    }

    /// Finish into a validated [`Sequence`]
    pub fn build(self) -> Result<Sequence> {
        Sequence::new(self.gt_ids, self.tracker_ids, self.similarity)
    }
}

fn relabel(labels: &mut HashMap<i64, usize>, raw: &[i64]) -> Vec<usize> {
    raw.iter()
        .map(|&raw_id| {
            let next = labels.len();
            *labels.entry(raw_id).or_insert(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::*;
    use ndarray::*;

    #[test]
    fn relabels_in_first_appearance_order() -> anyhow::Result<()> {
        let mut builder = SequenceBuilder::new();
        builder.push_frame(&[42, 7], &[900], arr2(&[[0.0], [1.0]]));
        builder.push_frame(&[7, 13], &[900, 901], arr2(&[[1.0, 0.0], [0.0, 1.0]]));
        let sequence = builder.build()?;

        assert_eq!(sequence.num_gt_ids(), 3);
        assert_eq!(sequence.num_tracker_ids(), 2);
        assert_eq!(sequence.num_gt_dets(), 4);
        assert_eq!(sequence.num_tracker_dets(), 3);

        let timesteps = sequence.timesteps().collect::<Vec<_>>();
        assert_eq!(timesteps[0].0, [0, 1]);
        assert_eq!(timesteps[1].0, [1, 2]);
        assert_eq!(timesteps[1].1, [0, 1]);

        Ok(())
    }

    #[test]
    fn rejects_mismatched_similarity_shape() {
        let result = Sequence::new(
            vec![vec![0], vec![0]],
            vec![vec![0], vec![0]],
            vec![arr2(&[[1.0]]), arr2(&[[1.0, 0.5]])],
        );
        assert!(matches!(
            result,
            Err(MetricsError::Shape {
                timestep: 1,
                expected: (1, 1),
                actual: (1, 2),
            })
        ));
    }

    #[test]
    fn rejects_similarity_out_of_range() {
        let result = Sequence::new(vec![vec![0]], vec![vec![0]], vec![arr2(&[[1.5]])]);
        assert!(matches!(result, Err(MetricsError::Validation(_))));

        let result = Sequence::new(vec![vec![0]], vec![vec![0]], vec![arr2(&[[f64::NAN]])]);
        assert!(matches!(result, Err(MetricsError::Validation(_))));
    }

    #[test]
    fn rejects_sparse_identity_labels() {
        let result = Sequence::new(
            vec![vec![0], vec![2]],
            vec![vec![0], vec![0]],
            vec![arr2(&[[1.0]]), arr2(&[[1.0]])],
        );
        assert!(matches!(result, Err(MetricsError::Validation(_))));
    }

    #[test]
    fn rejects_mismatched_timestep_counts() {
        let result = Sequence::new(vec![vec![0]], vec![vec![0], vec![0]], vec![arr2(&[[1.0]])]);
        assert!(matches!(result, Err(MetricsError::Validation(_))));
    }

    #[test]
    fn empty_frames_are_valid() -> anyhow::Result<()> {
        let sequence = Sequence::new(
            vec![vec![], vec![0]],
            vec![vec![], vec![]],
            vec![Array2::zeros((0, 0)), Array2::zeros((1, 0))],
        )?;
        assert_eq!(sequence.num_gt_dets(), 1);
        assert_eq!(sequence.num_tracker_dets(), 0);
        assert_eq!(sequence.num_tracker_ids(), 0);
        Ok(())
    }
}
