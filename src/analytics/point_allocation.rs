use crate::analytics::labels::LabelMap;
use crate::analytics::rounding::{ratio, SHARE_DECIMALS};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointAllocationStatistics {
    pub options: Vec<String>,
    pub average_per_option: LabelMap<f64>,
    pub total_points_distributed: f64,
    pub average_points_per_response: f64,
}

/// Aggregates point allocations. Each allocation is read positionally against
/// `options`: entries past the last option are ignored, a `None` entry counts
/// as 0, and a short allocation contributes nothing to the options it omits.
/// Averages divide by `valid_responses`, which counts respondents whose
/// allocation could not be read as having given zero points.
pub fn aggregate(
    options: &[String],
    allocations: &[Vec<Option<f64>>],
    valid_responses: usize,
) -> PointAllocationStatistics {
    // Start every option at zero
    let mut option_totals = LabelMap::with_labels(options.iter().map(String::as_str), 0.0f64);
    let mut grand_total = 0.0;

    for allocation in allocations {
        // Positional: entry i belongs to options[i]
        for (i, points) in allocation.iter().take(options.len()).enumerate() {
            let points = points.unwrap_or(0.0);
            let Some(total) = option_totals.get_mut(&options[i]) else {
                continue;
            };
            *total += points;
            grand_total += points;
        }
    }

    PointAllocationStatistics {
        options: option_totals.labels().to_vec(),
        average_per_option: option_totals
            .map_values(|_, &total| ratio(total, valid_responses, SHARE_DECIMALS)),
        total_points_distributed: grand_total,
        average_points_per_response: ratio(grand_total, valid_responses, SHARE_DECIMALS),
    }
}
