use crate::Amount;
use crate::situation::EdgeworthSituation;
use serde::Serialize;

/// Accumulators for the round in progress
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundInfo {
    pub q1_traded: Amount,
    pub q2_traded: Amount,
    pub num_successful: usize,
}

impl RoundInfo {
    pub fn record(&mut self, situation: &EdgeworthSituation) {
        self.q1_traded += situation.q1_traded();
        self.q2_traded += situation.q2_traded();
        self.num_successful += 1;
    }

    pub fn reset(&mut self) {
        *self = RoundInfo::default();
    }
}

/// A scalar series indexed by round, with its running maximum
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    values: Vec<Amount>,
    max: Amount,
}

impl TimeSeries {
    pub fn push(&mut self, value: Amount) {
        if self.values.is_empty() || value > self.max {
            self.max = value;
        }
        self.values.push(value);
    }

    pub fn values(&self) -> &[Amount] {
        &self.values
    }

    pub fn max(&self) -> Amount {
        self.max
    }

    pub fn last(&self) -> Option<Amount> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Amount> {
        self.values.get(idx).copied()
    }
}

/// Fixed-width histogram of one per-actor quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub resolution: Amount,
    pub max_value: Amount,
    /// Centre of each bucket, `resolution` apart
    pub bucket_centers: Vec<Amount>,
    pub counts: Vec<usize>,
    pub max_count: usize,
    pub standard_deviation: Amount,
}

impl Distribution {
    /// Bucket `subject` into buckets of width `resolution`
    ///
    /// Values past the last bucket (the maximum on an exact bucket edge, or
    /// non-finite values) are clamped into it, so counts always sum to
    /// `subject.len()`.
    pub fn new(subject: &[Amount], resolution: Amount) -> Self {
        let max_value = subject
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);

        let valid_resolution = resolution.is_finite() && resolution > 0.0;
        let num_buckets = if valid_resolution {
            ((max_value / resolution).ceil() as usize).max(1)
        } else {
            1
        };

        let bucket_centers = (0..num_buckets)
            .map(|idx| resolution / 2.0 + resolution * idx as f64)
            .collect();

        let mut counts = vec![0usize; num_buckets];
        for &amount in subject {
            let bucket_idx = if valid_resolution {
                ((amount / resolution).floor() as usize).min(num_buckets - 1)
            } else {
                0
            };
            counts[bucket_idx] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(0);

        Distribution {
            resolution,
            max_value,
            bucket_centers,
            counts,
            max_count,
            standard_deviation: std_dev(subject),
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.counts.len()
    }

    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bucket widths used for the four distributions of a moment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolutions {
    pub q1: Amount,
    pub q2: Amount,
    pub utility: Amount,
    pub wealth: Amount,
}

/// Per-actor values a moment is built from
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub q1: &'a [Amount],
    pub q2: &'a [Amount],
    pub utilities: &'a [Amount],
    pub wealths: &'a [Amount],
}

/// Distributions of one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moment {
    pub q1_distribution: Distribution,
    pub q2_distribution: Distribution,
    pub utility_distribution: Distribution,
    pub wealth_distribution: Distribution,
}

impl Moment {
    pub fn capture(snapshot: &Snapshot<'_>, resolutions: &Resolutions) -> Self {
        Moment {
            q1_distribution: Distribution::new(snapshot.q1, resolutions.q1),
            q2_distribution: Distribution::new(snapshot.q2, resolutions.q2),
            utility_distribution: Distribution::new(snapshot.utilities, resolutions.utility),
            wealth_distribution: Distribution::new(snapshot.wealths, resolutions.wealth),
        }
    }

    pub fn distributions(&self) -> [(&'static str, &Distribution); 4] {
        [
            ("q1", &self.q1_distribution),
            ("q2", &self.q2_distribution),
            ("utility", &self.utility_distribution),
            ("wealth", &self.wealth_distribution),
        ]
    }
}

/// Everything recorded about completed rounds
///
/// `moments[0]` is the allocation right after setup; `moments[k]` and the
/// k-1'th entry of every scalar series belong to round k.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct History {
    pub time: usize,
    /// Summed utility of the allocation right after setup
    pub initial_sum_utility: Amount,
    pub moments: Vec<Moment>,
    pub q1_traded: TimeSeries,
    pub q2_traded: TimeSeries,
    pub num_successful: TimeSeries,
    pub sum_utilities: TimeSeries,
    pub wealth_deviation: TimeSeries,
}

impl History {
    pub fn reset(&mut self) {
        *self = History::default();
    }

    /// Record the allocation before any trading
    pub fn record_initial(&mut self, snapshot: &Snapshot<'_>, resolutions: &Resolutions) {
        self.initial_sum_utility = snapshot.utilities.iter().sum();
        self.moments.push(Moment::capture(snapshot, resolutions));
    }

    /// Close a round: append its aggregates and its moment
    pub fn record_round(
        &mut self,
        round_info: &RoundInfo,
        snapshot: &Snapshot<'_>,
        resolutions: &Resolutions,
    ) {
        self.time += 1;
        self.q1_traded.push(round_info.q1_traded);
        self.q2_traded.push(round_info.q2_traded);
        self.num_successful.push(round_info.num_successful as f64);
        self.sum_utilities.push(snapshot.utilities.iter().sum());
        self.wealth_deviation.push(std_dev(snapshot.wealths));
        self.moments.push(Moment::capture(snapshot, resolutions));
    }

    pub fn last_moment(&self) -> Option<&Moment> {
        self.moments.last()
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; zero for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
