use std::cmp::Ordering;

use crate::core::distance::distance_km;
use crate::models::{Job, RankedWorker, Worker};

/// Fewer qualifying workers than this triggers threshold relaxation
pub const RELAXATION_MIN_RESULTS: usize = 3;
/// Points subtracted from the threshold when relaxing
pub const RELAXATION_STEP: u32 = 20;
/// Relaxation never goes below this score
pub const RELAXATION_FLOOR: u32 = 30;

/// Check if a worker is close enough to a job
///
/// This is the geospatial hard filter. A distance that cannot be computed
/// (worker or job without coordinates) keeps the worker in.
#[inline]
pub fn within_radius(worker: &Worker, job: &Job, max_distance_km: f64) -> bool {
    match distance_km(worker.coordinates(), job.coordinates()) {
        Some(distance) => distance <= max_distance_km,
        None => true,
    }
}

/// Apply the radius filter to a batch of workers, keeping the computed distance
pub fn filter_by_radius(
    workers: Vec<Worker>,
    job: &Job,
    max_distance_km: f64,
) -> Vec<(Worker, Option<f64>)> {
    let job_coordinates = job.coordinates();

    workers
        .into_iter()
        .filter_map(|worker| {
            let distance = distance_km(worker.coordinates(), job_coordinates);
            match distance {
                Some(d) if d > max_distance_km => None,
                Some(_) => Some((worker, distance)),
                None => {
                    tracing::debug!(
                        "Worker {} has no location data for job {} - including by default",
                        worker.id,
                        job.id
                    );
                    Some((worker, None))
                }
            }
        })
        .collect()
}

/// Ranking order: score descending, then nearest first (unknown distance
/// last), then lowest worker id.
pub fn compare_ranked(a: &RankedWorker, b: &RankedWorker) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| match (a.distance_km, b.distance_km) {
            (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.worker.id.cmp(&b.worker.id))
}

/// Keep workers scoring at least `threshold`, best first
pub fn rank_by_threshold(scored: &[RankedWorker], threshold: u32) -> Vec<RankedWorker> {
    let mut passed: Vec<RankedWorker> = scored
        .iter()
        .filter(|w| w.score >= threshold)
        .cloned()
        .collect();
    passed.sort_by(compare_ranked);
    passed
}

/// Threshold used when too few workers clear the requested one
#[inline]
pub fn relaxed_threshold(threshold: u32) -> u32 {
    threshold.saturating_sub(RELAXATION_STEP).max(RELAXATION_FLOOR)
}

/// Result of the threshold, relaxation and cap stages
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub workers: Vec<RankedWorker>,
    pub threshold_applied: u32,
    pub relaxed: bool,
}

/// Select the workers to notify from the full scored set
///
/// Relaxation runs before the cap, so a capped run still sees the relaxed
/// candidates. A relaxed threshold that is not lower than the requested one is
/// ignored.
pub fn select_candidates(
    scored: &[RankedWorker],
    threshold: u32,
    max_workers: Option<usize>,
) -> Selection {
    let mut workers = rank_by_threshold(scored, threshold);
    let mut threshold_applied = threshold;
    let mut relaxed = false;

    tracing::debug!("{} workers passed score threshold of {}", workers.len(), threshold);

    if workers.len() < RELAXATION_MIN_RESULTS && scored.len() >= RELAXATION_MIN_RESULTS {
        let lower = relaxed_threshold(threshold);
        if lower < threshold {
            tracing::info!(
                "Only {} workers found, lowering threshold from {} to {}",
                workers.len(),
                threshold,
                lower
            );
            workers = rank_by_threshold(scored, lower);
            threshold_applied = lower;
            relaxed = true;
        }
    }

    if let Some(max) = max_workers {
        workers.truncate(max);
    }

    Selection {
        workers,
        threshold_applied,
        relaxed,
    }
}
