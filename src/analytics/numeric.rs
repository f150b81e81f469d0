use crate::analytics::rounding::{round_to, SUMMARY_DECIMALS};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Occurrences of one distinct sample value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: f64,
    pub count: usize,
}

/// Descriptive statistics over numeric answers (scale ratings, contribution shares).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSummary {
    pub values: Vec<f64>,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    /// Distinct values in ascending order. Serialized as an ordered object
    /// from the value's display form to its count, e.g. `{"1": 1, "2.5": 2}`.
    #[serde(serialize_with = "serialize_distribution")]
    pub distribution: Vec<ValueCount>,
}

fn serialize_distribution<S>(distribution: &[ValueCount], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(distribution.len()))?;
    for entry in distribution {
        map.serialize_entry(&entry.value.to_string(), &entry.count)?;
    }
    map.end()
}

impl NumericSummary {
    /// Number of samples equal to `value`.
    pub fn count_of(&self, value: f64) -> usize {
        self.distribution
            .iter()
            .find(|entry| entry.value == value)
            .map_or(0, |entry| entry.count)
    }
}

pub fn summarize(values: Vec<f64>) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary::default();
    }

    // Sort a copy; `values` keeps the input order
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    let sum: f64 = values.iter().sum();
    let average = round_to(sum / n as f64, SUMMARY_DECIMALS);

    let mid = n / 2;
    let median = if n % 2 == 0 {
        round_to((sorted[mid - 1] + sorted[mid]) / 2.0, SUMMARY_DECIMALS)
    } else {
        sorted[mid]
    };

    // Deviation is measured against the rounded average that is reported.
    let variance = values
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / n as f64;
    let std_dev = round_to(variance.sqrt(), SUMMARY_DECIMALS);

    // Group runs of equal values
    let mut distribution: Vec<ValueCount> = Vec::new();
    for &value in &sorted {
        match distribution.last_mut() {
            Some(last) if last.value == value => last.count += 1,
            _ => distribution.push(ValueCount { value, count: 1 }),
        }
    }

    NumericSummary {
        values,
        average,
        median,
        min,
        max,
        std_dev,
        distribution,
    }
}
