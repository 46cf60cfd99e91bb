use hp_results::*;

fn metrics(cop: f64) -> Metrics {
    Metrics {
        cop,
        compressor_power_w: 250e3,
        evaporator_duty_w: (cop - 1.0) * 250e3,
        condenser_duty_w: cop * 250e3,
    }
}

fn sample_series() -> Vec<ResultSeries> {
    let mut design = ResultSeries::new("design");
    design.push(CaseResult::success(CaseId::Design, metrics(4.5)));

    let mut replay = ResultSeries::new("replay");
    replay.push(CaseResult::success(
        CaseId::Timestep {
            index: 0,
            timestamp: Some("2019-01-01T00:00".into()),
        },
        metrics(4.0),
    ));
    replay.push(CaseResult::not_converged(
        CaseId::Timestep {
            index: 1,
            timestamp: Some("2019-01-01T01:00".into()),
        },
        "infeasible sink temperature",
    ));
    vec![design, replay]
}

#[test]
fn save_and_load_run() {
    let temp_dir = std::env::temp_dir().join("hp_results_test");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = RunStore::new(temp_dir.clone()).unwrap();
    let series = sample_series();
    let manifest = RunManifest::new("run_abc", "study1", "v1", &series);

    store.save_run(&manifest, &series).unwrap();
    assert!(store.has_run("run_abc"));

    let loaded = store.load_manifest("run_abc").unwrap();
    assert_eq!(loaded.series.len(), 2);
    assert_eq!(loaded.series[1].cases, 2);
    assert_eq!(loaded.series[1].converged, 1);

    let replay = store.load_series("run_abc", "replay").unwrap();
    assert_eq!(replay, series[1]);
    assert!(replay.get(1).unwrap().metrics().is_none());

    let all = store.load_all_series("run_abc").unwrap();
    assert_eq!(all, series);

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn list_runs_by_study() {
    let temp_dir = std::env::temp_dir().join("hp_results_test_list");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = RunStore::new(temp_dir.clone()).unwrap();
    let series = sample_series();
    store
        .save_run(&RunManifest::new("r1", "alpha", "v1", &series), &series)
        .unwrap();
    store
        .save_run(&RunManifest::new("r2", "beta", "v1", &series), &series)
        .unwrap();

    let runs = store.list_runs("alpha").unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, "r1");

    store.delete_run("r1").unwrap();
    assert!(!store.has_run("r1"));
    assert!(store.list_runs("alpha").unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn missing_run_and_series_are_reported() {
    let temp_dir = std::env::temp_dir().join("hp_results_test_missing");
    let _ = std::fs::remove_dir_all(&temp_dir);
    let store = RunStore::new(temp_dir.clone()).unwrap();

    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));

    let series = sample_series();
    store
        .save_run(&RunManifest::new("r", "s", "v1", &series), &series)
        .unwrap();
    assert!(matches!(
        store.load_series("r", "sweep_x"),
        Err(ResultsError::SeriesNotFound { .. })
    ));
    assert!(matches!(
        store.load_series("r", "../escape"),
        Err(ResultsError::InvalidSeriesName(_))
    ));

    let _ = std::fs::remove_dir_all(&temp_dir);
}
