// Unit tests for Jobcast

use chrono::NaiveDate;
use jobcast::core::{
    distance::{distance_km, haversine_distance},
    filters::{filter_by_radius, relaxed_threshold, select_candidates, within_radius},
    scoring::{experience_score, is_neighbor, similarity, ScoreBreakdown, MAX_SCORE},
};
use jobcast::models::{Coordinates, Demographics, Job, RankedWorker, Worker};
use jobcast::services::{InMemoryRepository, WorkerRepository};

fn create_worker(id: i64, coordinates: Option<(f64, f64)>) -> Worker {
    Worker {
        id,
        phone: format!("+52616{:07}", id),
        name: None,
        address: None,
        latitude: coordinates.map(|(lat, _)| lat),
        longitude: coordinates.map(|(_, lon)| lon),
        age: Some(30),
        gender: Some("male".to_string()),
        experience: Some(2),
        active: true,
    }
}

fn create_job(coordinates: Option<(f64, f64)>) -> Job {
    Job {
        id: 1,
        employer_id: None,
        title: "Tomato packing".to_string(),
        location: None,
        latitude: coordinates.map(|(lat, _)| lat),
        longitude: coordinates.map(|(_, lon)| lon),
        pay_rate: "300".to_string(),
        pay_type: "per day".to_string(),
        transport_provided: false,
        duration: None,
        date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        description: None,
        active: true,
    }
}

fn ranked(id: i64, score: u32, distance_km: Option<f64>) -> RankedWorker {
    RankedWorker {
        worker: create_worker(id, None),
        distance_km,
        score,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(31.87, -116.61, 31.87, -116.61);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_ensenada_to_tijuana() {
    // Roughly 85 km in a straight line
    let distance = haversine_distance(31.8667, -116.5964, 32.5149, -117.0382);
    assert!(distance > 75.0 && distance < 95.0);
}

#[test]
fn test_distance_symmetric_and_missing() {
    let a = Some(Coordinates::new(31.87, -116.61));
    let b = Some(Coordinates::new(30.56, -115.94));

    let ab = distance_km(a, b).unwrap();
    let ba = distance_km(b, a).unwrap();
    assert!((ab - ba).abs() < 1e-9);

    assert_eq!(distance_km(a, None), None);
    assert_eq!(distance_km(None, b), None);
}

#[test]
fn test_unlocated_worker_always_within_radius() {
    let job = create_job(Some((31.87, -116.61)));
    let worker = create_worker(1, None);

    assert!(within_radius(&worker, &job, 0.0));
    assert!(within_radius(&worker, &job, 10.0));
}

#[test]
fn test_unlocated_job_keeps_every_worker() {
    let job = create_job(None);
    let workers = vec![create_worker(1, Some((10.0, 10.0))), create_worker(2, Some((-40.0, 170.0)))];

    let nearby = filter_by_radius(workers, &job, 1.0);
    assert_eq!(nearby.len(), 2);
    assert!(nearby.iter().all(|(_, distance)| distance.is_none()));
}

#[test]
fn test_far_worker_excluded() {
    let job = create_job(Some((31.87, -116.61)));
    let workers = vec![
        create_worker(1, Some((31.88, -116.60))),
        create_worker(2, Some((32.51, -117.03))),
    ];

    let nearby = filter_by_radius(workers, &job, 10.0);
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].0.id, 1);
}

#[test]
fn test_experience_table() {
    assert_eq!(experience_score(None), 15);
    assert_eq!(experience_score(Some(-1)), 15);
    assert_eq!(experience_score(Some(0)), 25);
    assert_eq!(experience_score(Some(1)), 30);
    assert_eq!(experience_score(Some(5)), 30);
    assert_eq!(experience_score(Some(6)), 20);
    assert_eq!(experience_score(Some(40)), 20);
}

#[test]
fn test_similarity_weights() {
    let candidate = Demographics {
        age: Some(30),
        gender: Some("Female".to_string()),
        experience: Some(4),
    };
    let same = Demographics {
        age: Some(34),
        gender: Some("female".to_string()),
        experience: Some(6),
    };
    let age_and_gender = Demographics {
        age: Some(25),
        gender: Some("female".to_string()),
        experience: Some(10),
    };
    let gender_only = Demographics {
        age: Some(60),
        gender: Some("female".to_string()),
        experience: Some(10),
    };

    assert_eq!(similarity(&candidate, &same), 6);
    assert_eq!(similarity(&candidate, &age_and_gender), 3);
    assert!(is_neighbor(&candidate, &age_and_gender));
    assert_eq!(similarity(&candidate, &gender_only), 1);
    assert!(!is_neighbor(&candidate, &gender_only));
}

#[test]
fn test_missing_demographics_compare_as_zero() {
    let empty = Demographics::default();
    let novice = Demographics {
        age: Some(4),
        gender: None,
        experience: Some(1),
    };

    // experience 0 vs 1, age 0 vs 4, gender never matches
    assert_eq!(similarity(&empty, &novice), 5);
    assert_eq!(similarity(&empty, &empty), 5);
}

#[test]
fn test_composite_bounds() {
    let cold = ScoreBreakdown {
        collaborative: 25,
        experience: 15,
        reliability: 10,
        repeat_employer: 0,
    };
    assert_eq!(cold.total(), 50);

    let maxed = ScoreBreakdown {
        collaborative: 50,
        experience: 30,
        reliability: 20,
        repeat_employer: 20,
    };
    assert_eq!(maxed.total(), MAX_SCORE);
}

#[test]
fn test_relaxation_matches_selection_at_floor() {
    let scored = vec![
        ranked(1, 80, Some(2.0)),
        ranked(2, 55, None),
        ranked(3, 45, Some(1.0)),
        ranked(4, 35, Some(4.0)),
        ranked(5, 20, Some(0.5)),
    ];

    let relaxed = select_candidates(&scored, 50, None);
    let direct = select_candidates(&scored, 30, None);

    assert!(relaxed.relaxed);
    assert_eq!(relaxed.threshold_applied, relaxed_threshold(50));
    assert_eq!(relaxed.workers, direct.workers);
    assert_eq!(relaxed.workers.len(), 4);
}

#[test]
fn test_equal_scores_nearest_first() {
    let scored = vec![
        ranked(3, 60, None),
        ranked(2, 60, Some(7.0)),
        ranked(1, 60, Some(7.0)),
        ranked(4, 60, Some(1.0)),
    ];

    let selection = select_candidates(&scored, 50, None);
    let ids: Vec<i64> = selection.workers.iter().map(|r| r.worker.id).collect();
    assert_eq!(ids, vec![4, 1, 2, 3]);
}

#[test]
fn test_in_memory_listing_skips_inactive() {
    let mut retired = create_worker(2, None);
    retired.active = false;
    let repository = InMemoryRepository::new(vec![create_worker(1, None), retired], vec![], vec![]);

    let active = tokio_test::block_on(repository.list_active_workers()).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, 1);

    let missing = tokio_test::block_on(repository.find_job(7));
    assert!(missing.is_err());
}
