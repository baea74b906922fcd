use crate::models::{MetricObservation, TrendPoint, TrendSummary, TrendView};
use std::collections::HashSet;

pub fn distinct_metric_names(observations: &[MetricObservation]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for obs in observations {
        if seen.insert(obs.metric.as_str()) {
            names.push(obs.metric.clone());
        }
    }
    names
}

pub fn series_for(observations: &[MetricObservation], metric_name: &str) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = observations
        .iter()
        .filter(|obs| obs.metric == metric_name)
        .map(|obs| TrendPoint {
            date: obs.date,
            value: obs.value,
        })
        .collect();
    points.sort_by_key(|point| point.date);
    points
}

pub fn summarize(series: &[TrendPoint]) -> Option<TrendSummary> {
    let first = *series.first()?;
    let latest = *series.last()?;
    let (min, max) = series.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), point| {
        (min.min(point.value), max.max(point.value))
    });
    Some(TrendSummary {
        count: series.len(),
        first,
        latest,
        change: latest.value - first.value,
        min,
        max,
    })
}

pub fn build_trend(observations: &[MetricObservation], metric_name: &str) -> TrendView {
    let points = series_for(observations, metric_name);
    let summary = summarize(&points);
    TrendView {
        metric: metric_name.to_string(),
        title: format!("{} Progression", metric_name),
        points,
        summary,
    }
}
