use std::num::NonZeroUsize;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Upper limit on the number of bins; larger requests are clamped to it.
pub const MAX_HISTOGRAM_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Splits `[min, max]` of the amounts into `bins` equal-width bins. The last
/// bin is closed on the right so the maximum is counted. A single distinct
/// value is centred in a range one unit wide; no amounts gives empty bins over
/// `[0, 1]`. At most [`MAX_HISTOGRAM_BINS`] bins are produced.
pub fn histogram(amounts: &[Decimal], bins: NonZeroUsize) -> Vec<HistogramBin> {
    let values: Vec<f64> = amounts.iter().filter_map(ToPrimitive::to_f64).collect();

    let (lower, upper) = match values.iter().copied().reduce(f64::min).zip(values.iter().copied().reduce(f64::max)) {
        None => (0.0, 1.0),
        Some((min, max)) if min == max => (min - 0.5, max + 0.5),
        Some(range) => range,
    };

    let bins = bins.get().min(MAX_HISTOGRAM_BINS);
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0u64; bins];
    for value in values {
        let index = (((value - lower) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lower + width * i as f64,
            upper: if i + 1 == bins { upper } else { lower + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
