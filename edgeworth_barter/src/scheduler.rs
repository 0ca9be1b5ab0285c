use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Round-robin pairing of actors
///
/// The permutation is read two entries at a time. When the cursor runs off
/// the end a round is complete: the permutation is reshuffled, the cursor
/// goes back to zero and `was_restarted` reports the wrap until the next
/// advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingScheduler {
    permutation: Vec<usize>,
    cursor: usize,
    restarted: bool,
}

impl PairingScheduler {
    /// Build a shuffled permutation of `0..num_actors`
    ///
    /// `num_actors` must be even and non-zero; the simulation validates this
    /// before building a scheduler.
    pub fn new(num_actors: usize, rng: &mut StdRng) -> Self {
        assert!(
            num_actors >= 2 && num_actors % 2 == 0,
            "pairing needs an even, non-zero number of actors, got {num_actors}"
        );
        let mut permutation: Vec<usize> = (0..num_actors).collect();
        permutation.shuffle(rng);
        PairingScheduler {
            permutation,
            cursor: 0,
            restarted: false,
        }
    }

    pub fn current_pair(&self) -> (usize, usize) {
        (
            self.permutation[self.cursor],
            self.permutation[self.cursor + 1],
        )
    }

    /// Move to the next pair; returns true when this completed a round
    pub fn advance(&mut self, rng: &mut StdRng) -> bool {
        self.cursor += 2;
        if self.cursor >= self.permutation.len() {
            self.permutation.shuffle(rng);
            self.cursor = 0;
            self.restarted = true;
        } else {
            self.restarted = false;
        }
        self.restarted
    }

    pub fn was_restarted(&self) -> bool {
        self.restarted
    }

    /// Pairs already processed in the current round
    pub fn done(&self) -> usize {
        self.cursor / 2
    }

    /// Pairs per round
    pub fn total(&self) -> usize {
        self.permutation.len() / 2
    }

    pub fn num_actors(&self) -> usize {
        self.permutation.len()
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }
}
