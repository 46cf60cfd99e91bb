use hp_project::*;

fn design_study() -> Study {
    Study {
        version: LATEST_VERSION,
        name: "Heat pump design".to_string(),
        fluid: WorkingFluidDef::Water,
        design: DesignDef {
            source: SourceDef {
                medium: MediumDef::Air,
                inlet_temperature_c: 40.0,
                outlet_temperature_c: 10.0,
                cooling_k: 2.0,
                duty_kw: 1000.0,
            },
            sink: SinkDef {
                medium: MediumDef::Water,
                inlet_temperature_c: 40.0,
                outlet_temperature_c: 90.0,
                duty_kw: 1012.0,
            },
            compressor_efficiency: 0.85,
            evaporator_ttd_k: 5.0,
            condenser_ttd_k: 5.0,
            evaporator_outlet_quality: 1.0,
            condenser_outlet_quality: 0.0,
        },
        sweeps: vec![
            SweepDef {
                axis: SweepAxisDef::SourceTemperatureShift,
                range: RangeDef::Linear {
                    start: -5.0,
                    end: 0.0,
                    points: 11,
                },
            },
            SweepDef {
                axis: SweepAxisDef::ThermalLoadScale,
                range: RangeDef::Values {
                    values: vec![0.25, 0.5, 1.0],
                },
            },
        ],
        replay: Some(ReplayDef {
            dataset: DatasetSourceDef::Inline {
                records: vec![DatasetRecord {
                    timestamp: "2019-01-01T00:00".into(),
                    source: SourceCondition {
                        inlet_temperature_c: 40.0,
                        outlet_temperature_c: 10.0,
                    },
                    sink: SinkCondition {
                        inlet_temperature_c: 40.0,
                        outlet_temperature_c: 90.0,
                        duty_kw: 1012.0,
                    },
                }],
            },
            samples: None,
        }),
        solver: SolverDef::default(),
    }
}

#[test]
fn roundtrip_yaml() {
    let study = design_study();
    let path = std::env::temp_dir().join("hp_project_roundtrip.yaml");

    save_yaml(&path, &study).unwrap();
    let loaded = load_study(&path).unwrap();
    assert_eq!(study, loaded);
}

#[test]
fn roundtrip_json() {
    let study = design_study();
    let path = std::env::temp_dir().join("hp_project_roundtrip.json");

    save_json(&path, &study).unwrap();
    let loaded = load_study(&path).unwrap();
    assert_eq!(study, loaded);
}

#[test]
fn minimal_yaml_fills_defaults() {
    let yaml = r#"
version: 2
name: minimal
design:
  source: { inlet_temperature_c: 40, outlet_temperature_c: 10, duty_kw: 1000 }
  sink: { inlet_temperature_c: 40, outlet_temperature_c: 90, duty_kw: 1012 }
  compressor_efficiency: 0.85
"#;
    let study: Study = serde_yaml::from_str(yaml).unwrap();
    validate_study(&study).unwrap();

    assert_eq!(study.design.source.medium, MediumDef::Air);
    assert_eq!(study.design.sink.medium, MediumDef::Water);
    assert_eq!(study.design.source.cooling_k, 2.0);
    assert_eq!(study.design.evaporator_ttd_k, 5.0);
    assert_eq!(study.design.evaporator_outlet_quality, 1.0);
    assert_eq!(study.solver.max_iterations, 50);
    assert!(study.sweeps.is_empty());
    assert!(study.replay.is_none());
}

#[test]
fn version_one_file_is_migrated_on_load() {
    let yaml = r#"
version: 1
name: legacy
design:
  source: { inlet_temperature_c: 40, outlet_temperature_c: 10, duty_kw: 1000 }
  sink: { inlet_temperature_c: 40, outlet_temperature_c: 90, duty_kw: -1012 }
  compressor_efficiency: 0.85
"#;
    let path = std::env::temp_dir().join("hp_project_legacy.yaml");
    std::fs::write(&path, yaml).unwrap();

    let study = load_study(&path).unwrap();
    assert_eq!(study.version, LATEST_VERSION);
    assert_eq!(study.design.sink.duty_kw, 1012.0);
}

#[test]
fn replay_file_is_resolved_and_resampled() {
    let dir = std::env::temp_dir().join("hp_project_replay");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let mut lines = String::new();
    for i in 0..10 {
        lines.push_str(&format!(
            r#"{{"timestamp":"t{i}","source":{{"inlet_temperature_c":40,"outlet_temperature_c":10}},"sink":{{"inlet_temperature_c":40,"outlet_temperature_c":90,"duty_kw":1000}}}}"#
        ));
        lines.push('\n');
    }
    std::fs::write(dir.join("data.jsonl"), lines).unwrap();

    let mut study = design_study();
    study.replay = Some(ReplayDef {
        dataset: DatasetSourceDef::File {
            path: "data.jsonl".into(),
        },
        samples: Some(4),
    });
    let study_path = dir.join("study.yaml");

    let records: Vec<_> = replay_records(&study, &study_path, None)
        .unwrap()
        .unwrap()
        .map(|r| r.unwrap().timestamp)
        .collect();
    assert_eq!(records, ["t0", "t3", "t6", "t9"]);

    let _ = std::fs::remove_dir_all(&dir);
}
