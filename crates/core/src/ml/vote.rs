//! Weighted soft voting across sub-models of one target.

use super::models::first_argmax;

/// Probability assigned to classes a sub-model did not speak for.
pub const EPSILON_FLOOR: f64 = 1e-6;

/// Lower bound for the vote denominator.
pub const MIN_TOTAL_WEIGHT: f64 = 1e-9;

/// Fits a sub-model's probability vector to the target's class count. Short
/// vectors keep their known positions and are padded with the epsilon floor;
/// long vectors are truncated.
pub fn reconcile(mut probabilities: Vec<f64>, class_count: usize) -> Vec<f64> {
    if probabilities.len() < class_count {
        probabilities.resize(class_count, EPSILON_FLOOR);
    } else {
        probabilities.truncate(class_count);
    }
    probabilities
}

/// Converts a hard label into a probability vector: 1.0 for the label and the
/// epsilon floor elsewhere. Labels outside the class range only contribute
/// the floor.
pub fn smoothed_one_hot(label: usize, class_count: usize) -> Vec<f64> {
    let mut probabilities = vec![EPSILON_FLOOR; class_count];
    if let Some(slot) = probabilities.get_mut(label) {
        *slot = 1.0;
    }
    probabilities
}

/// Outcome of a vote: chosen class id and its averaged probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoteOutcome {
    pub class_id: usize,
    pub confidence: f64,
}

#[derive(Clone, Debug)]
pub struct SoftVote {
    sums: Vec<f64>,
    total_weight: f64,
    ballots: usize,
}

impl SoftVote {
    pub fn new(class_count: usize) -> Self {
        Self { sums: vec![0.0; class_count], total_weight: 0.0, ballots: 0 }
    }

    /// Adds one sub-model's vector, reconciled to the class count first.
    pub fn cast(&mut self, weight: f64, probabilities: Vec<f64>) {
        let probabilities = reconcile(probabilities, self.sums.len());
        for (sum, probability) in self.sums.iter_mut().zip(probabilities) {
            *sum += weight * probability;
        }
        self.total_weight += weight;
        self.ballots += 1;
    }

    pub fn ballots(&self) -> usize {
        self.ballots
    }

    /// Averaged vector; `None` when nobody voted.
    pub fn averaged(&self) -> Option<Vec<f64>> {
        if self.ballots == 0 {
            return None;
        }
        let denominator = self.total_weight.max(MIN_TOTAL_WEIGHT);
        Some(self.sums.iter().map(|sum| sum / denominator).collect())
    }

    pub fn finish(&self) -> Option<VoteOutcome> {
        let averaged = self.averaged()?;
        let class_id = first_argmax(&averaged)?;
        Some(VoteOutcome { class_id, confidence: averaged[class_id].clamp(0.0, 1.0) })
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, smoothed_one_hot, SoftVote, VoteOutcome, EPSILON_FLOOR};

    #[test]
    fn short_vectors_are_padded_by_index() {
        assert_eq!(reconcile(vec![0.7, 0.3], 4), vec![0.7, 0.3, EPSILON_FLOOR, EPSILON_FLOOR]);
    }

    #[test]
    fn long_vectors_are_truncated() {
        assert_eq!(reconcile(vec![0.5, 0.2, 0.2, 0.1], 2), vec![0.5, 0.2]);
    }

    #[test]
    fn reconciliation_always_yields_class_count() {
        for length in 0..8 {
            for class_count in 0..8 {
                assert_eq!(reconcile(vec![0.1; length], class_count).len(), class_count);
            }
        }
    }

    #[test]
    fn one_hot_handles_out_of_range_labels() {
        assert_eq!(smoothed_one_hot(1, 3), vec![EPSILON_FLOOR, 1.0, EPSILON_FLOOR]);
        assert_eq!(smoothed_one_hot(7, 2), vec![EPSILON_FLOOR, EPSILON_FLOOR]);
    }

    #[test]
    fn weights_shift_the_winner() {
        let mut vote = SoftVote::new(2);
        vote.cast(0.9, vec![0.2, 0.8]);
        vote.cast(0.3, vec![0.9, 0.1]);

        let outcome = vote.finish().expect("outcome");

        assert_eq!(outcome.class_id, 1);
        let expected = (0.9 * 0.8 + 0.3 * 0.1) / 1.2;
        assert!((outcome.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_the_lowest_class_id() {
        let mut vote = SoftVote::new(3);
        vote.cast(1.0, vec![0.4, 0.4, 0.2]);

        assert_eq!(vote.finish(), Some(VoteOutcome { class_id: 0, confidence: 0.4 }));
    }

    #[test]
    fn empty_vote_has_no_outcome() {
        assert_eq!(SoftVote::new(3).finish(), None);
    }

    #[test]
    fn zero_weights_do_not_divide_by_zero() {
        let mut vote = SoftVote::new(2);
        vote.cast(0.0, vec![0.3, 0.7]);

        assert_eq!(vote.finish(), Some(VoteOutcome { class_id: 0, confidence: 0.0 }));
    }
}
