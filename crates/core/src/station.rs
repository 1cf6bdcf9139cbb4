//! Resolution of upstream station measurements into work units.
//!
//! The upstream feed returns an array of measurement objects. Only
//! records carrying a textual `stationname` survive; the temperature
//! is formatted to one decimal place when it is a well-formed number
//! and falls back to [`VALUE_UNAVAILABLE`] otherwise. The surviving
//! count -- not the raw feed count -- is what gets installed as the
//! job's unit total.

use serde_json::Value;

/// Cap on units dispatched per job. A deployment policy, not a
/// protocol requirement.
pub const MAX_UNITS_PER_JOB: usize = 50;

/// Sentinel derived value for stations without a usable measurement.
pub const VALUE_UNAVAILABLE: &str = "N/A";

/// One dispatchable work unit resolved from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub name: String,
    pub derived_value: String,
}

/// Resolve raw measurement records into dispatchable work units.
///
/// Applies [`MAX_UNITS_PER_JOB`] to the raw feed before filtering,
/// skips records lacking a textual name, and derives the value string
/// for the rest.
pub fn resolve_units(measurements: &[Value]) -> Vec<WorkUnit> {
    measurements
        .iter()
        .take(MAX_UNITS_PER_JOB)
        .filter_map(resolve_unit)
        .collect()
}

fn resolve_unit(measurement: &Value) -> Option<WorkUnit> {
    let name = measurement.get("stationname")?.as_str()?.to_string();

    let derived_value = match measurement.get("temperature").and_then(Value::as_f64) {
        Some(celsius) => format!("{celsius:.1}"),
        None => VALUE_UNAVAILABLE.to_string(),
    };

    Some(WorkUnit {
        name,
        derived_value,
    })
}
