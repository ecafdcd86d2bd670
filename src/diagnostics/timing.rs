use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock duration of one step of a tool run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Ordered step timings plus the run total.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            stages: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Run `f`, record its duration under `label` and pass its output through.
    pub fn time<R>(&mut self, label: impl Into<String>, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        self.push(label, elapsed_ms(start));
        out
    }

    pub fn stage(&self, label: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.label == label)
    }
}

pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_records_stage_in_order() {
        let mut timings = TimingBreakdown::default();
        let v = timings.time("load", || 7);
        timings.push("save", 1.5);
        assert_eq!(v, 7);
        let labels: Vec<_> = timings.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["load", "save"]);
        assert!(timings.stage("load").unwrap().elapsed_ms >= 0.0);
        assert!(timings.stage("missing").is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let mut timings = TimingBreakdown::with_total(2.0);
        timings.push("transform", 1.0);
        let json = serde_json::to_value(&timings).unwrap();
        assert_eq!(json["totalMs"], 2.0);
        assert_eq!(json["stages"][0]["elapsedMs"], 1.0);
    }
}
