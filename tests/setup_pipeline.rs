mod util;

use landice_setup::config::{CONFIG_DO_RESTART, ConfigBinder, ConfigTable};
use landice_setup::data::{Array2, Pool};
use landice_setup::mesh::IncidenceHandling;
use landice_setup::mesh_error::LandIceError;
use landice_setup::setup::LandIceSetup;
use landice_setup::vertical::FractionSumHandling;
use log::Level;
use util::{PeriodicQuads, assert_close, captured_logs, count_at, geometry_pool};

fn configs(json: &str) -> ConfigTable {
    serde_json::from_str(json).expect("valid config json")
}

#[test]
fn cold_start_fills_geometry_and_mesh_pools() {
    let table = configs(r#"{ "config_do_restart": false, "config_dt": "0001-00-00_00:00:00" }"#);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();
    assert_eq!(setup.vertical_options().fraction_handling, FractionSumHandling::Warn);
    assert_eq!(setup.incidence_handling(), IncidenceHandling::Error);

    let mut geometry = geometry_pool(&[0.2, 0.3, 0.5], &[10.0, 0.0]);
    let report = setup.setup_vertical_grid(&mut geometry).unwrap();
    report.status().unwrap();
    assert!(!report.restart);

    assert_eq!(geometry.dimension("nVertLevelsP1").unwrap(), 4);
    assert_close(
        geometry.array::<Vec<f64>>("layerInterfaceSigma").unwrap(),
        &[0.0, 0.2, 0.5, 1.0],
    );
    assert_close(
        geometry.array::<Vec<f64>>("layerCenterSigma").unwrap(),
        &[0.1, 0.35, 0.75],
    );
    assert_eq!(geometry.n_time_levels("layerThickness").unwrap(), 2);
    for level in 1..=2 {
        let dz = geometry.array_at::<Array2<f64>>("layerThickness", level).unwrap();
        assert_close(dz.column(0), &[2.0, 3.0, 5.0]);
        assert_close(dz.column(1), &[0.0, 0.0, 0.0]);
    }

    let quads = PeriodicQuads::new(3, 4);
    let mut mesh = quads.pool(|e| e % 4 == 1);
    setup.setup_sign_and_index_fields(&mut mesh).unwrap();
    let signs = mesh.array::<Array2<i32>>("edgeSignOnCell").unwrap();
    assert_eq!(signs.dims(), (4, quads.n_cells()));
    assert!(signs.as_slice().iter().all(|&s| s.abs() == 1));
    assert!(mesh.has_field("edgeSignOnVertex"));
    let kites = mesh.array::<Array2<i32>>("kiteIndexOnCell").unwrap();
    assert_eq!(kites.column(0), &[0, 1, 2, 3]);
}

#[test]
fn correction_is_written_back_to_the_pool() {
    let table = ConfigTable::new().with(CONFIG_DO_RESTART, false);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();

    let mut geometry = geometry_pool(&[0.5, 0.25, 0.5], &[100.0]);
    let report = setup.setup_vertical_grid(&mut geometry).unwrap();
    assert!(matches!(
        report.status(),
        Err(LandIceError::FractionSumOutOfTolerance { .. })
    ));
    let fractions = geometry.array::<Vec<f64>>("layerThicknessFractions").unwrap();
    assert_eq!(fractions, &[0.25, 0.25, 0.5]);
    let dz = geometry.array_at::<Array2<f64>>("layerThickness", 2).unwrap();
    assert_eq!(dz.column(0), &[25.0, 25.0, 50.0]);
}

#[test]
fn strict_fraction_policy_from_config_halts() {
    let table = ConfigTable::new()
        .with(CONFIG_DO_RESTART, false)
        .with("config_layer_fraction_policy", "error");
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();

    let mut geometry = geometry_pool(&[0.5, 0.25, 0.5], &[100.0]);
    assert!(matches!(
        setup.setup_vertical_grid(&mut geometry),
        Err(LandIceError::FractionSumOutOfTolerance { .. })
    ));
    assert!(!geometry.has_field("layerThickness"));
}

#[test]
fn repeated_restarts_do_not_drift() {
    let table = ConfigTable::new().with(CONFIG_DO_RESTART, true);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();

    let mut geometry = geometry_pool(&[0.3, 0.3, 0.3], &[90.0, 45.0]);
    setup.setup_vertical_grid(&mut geometry).unwrap();
    let first = geometry.clone();
    setup.setup_vertical_grid(&mut geometry).unwrap();

    for name in ["layerThicknessFractions", "layerCenterSigma", "layerInterfaceSigma"] {
        assert_eq!(
            first.array::<Vec<f64>>(name).unwrap(),
            geometry.array::<Vec<f64>>(name).unwrap()
        );
    }
    for level in 1..=2 {
        assert_eq!(
            first.array_at::<Array2<f64>>("layerThickness", level).unwrap(),
            geometry.array_at::<Array2<f64>>("layerThickness", level).unwrap()
        );
    }
    assert_eq!(
        geometry.array::<Vec<f64>>("layerThicknessFractions").unwrap(),
        &[0.3, 0.3, 0.3]
    );
}

#[test]
fn missing_inputs_are_reported() {
    let table = ConfigTable::new();
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();
    let mut geometry = geometry_pool(&[1.0], &[1.0]);
    assert_eq!(
        setup.setup_vertical_grid(&mut geometry).unwrap_err(),
        LandIceError::MissingConfig(CONFIG_DO_RESTART.to_string())
    );

    let table = ConfigTable::new().with(CONFIG_DO_RESTART, false);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();
    let mut geometry = geometry_pool(&[0.5, 0.5], &[1.0]);
    geometry.add_dimension("nVertLevels", 3);
    assert_eq!(
        setup.setup_vertical_grid(&mut geometry).unwrap_err(),
        LandIceError::LengthMismatch {
            name: "layerThicknessFractions".into(),
            expected: 3,
            found: 2,
        }
    );

    let mut mesh = Pool::new("mesh");
    assert!(matches!(
        setup.setup_sign_and_index_fields(&mut mesh),
        Err(LandIceError::MissingDimension { .. })
    ));
}

#[test]
fn mesh_without_vertices_only_gets_cell_signs() {
    let table = ConfigTable::new().with(CONFIG_DO_RESTART, false);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();

    let mut mesh = Pool::new("mesh");
    mesh.add_dimension("nCells", 2);
    mesh.add_dimension("nEdges", 1);
    mesh.add_dimension("maxEdges", 1);
    mesh.add_field("nEdgesOnCell", vec![1_i32, 1]);
    mesh.add_field("edgesOnCell", Array2::from_vec(1, 2, vec![0, 0]).unwrap());
    mesh.add_field("cellsOnEdge", Array2::from_vec(2, 1, vec![1, 0]).unwrap());
    // stale values from an earlier call are overwritten
    mesh.add_field("edgeSignOnCell", Array2::filled(1, 2, 7_i32));

    setup.setup_sign_and_index_fields(&mut mesh).unwrap();
    let signs = mesh.array::<Array2<i32>>("edgeSignOnCell").unwrap();
    assert_eq!(signs.as_slice(), &[1, -1]);
    assert!(!mesh.has_field("edgeSignOnVertex"));
    assert!(!mesh.has_field("kiteIndexOnCell"));
}

#[test]
fn edge_sign_policy_from_config() {
    let table = ConfigTable::new()
        .with(CONFIG_DO_RESTART, false)
        .with("config_edge_sign_policy", "warn");
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();
    assert_eq!(setup.incidence_handling(), IncidenceHandling::Warn);

    let quads = PeriodicQuads::new(3, 3);
    let mut mesh = quads.pool(|_| false);
    mesh.array_mut::<Array2<i32>>("edgesOnCell").unwrap()[(0, 4)] = 0;
    let (result, records) = captured_logs(|| setup.setup_sign_and_index_fields(&mut mesh));
    result.unwrap();
    assert_eq!(mesh.array::<Array2<i32>>("edgeSignOnCell").unwrap()[(0, 4)], 1);
    // one mismatch, reported once
    assert_eq!(count_at(&records, Level::Warn), 1, "{records:?}");

    let bad = ConfigTable::new().with("config_edge_sign_policy", "sometimes");
    assert!(matches!(
        LandIceSetup::bind(ConfigBinder::bind(&bad)),
        Err(LandIceError::InvalidConfigValue { .. })
    ));
}

#[test]
fn unusable_output_field_leaves_the_pool_untouched() {
    let table = ConfigTable::new().with(CONFIG_DO_RESTART, false);
    let setup = LandIceSetup::bind(ConfigBinder::bind(&table)).unwrap();

    let mut geometry = geometry_pool(&[0.5, 0.25], &[8.0]);
    geometry.add_field("layerThickness", Array2::<f64>::new(2, 1));
    let before = geometry.clone();
    assert_eq!(
        setup.setup_vertical_grid(&mut geometry).unwrap_err(),
        LandIceError::InvalidTimeLevel {
            name: "layerThickness".into(),
            time_level: 2,
            available: 1,
        }
    );
    assert_eq!(
        geometry.array::<Vec<f64>>("layerThicknessFractions").unwrap(),
        &[0.5, 0.25]
    );
    assert!(!geometry.has_field("layerInterfaceSigma"));
    assert!(!geometry.has_dimension("nVertLevelsP1"));
    assert_eq!(
        serde_json::to_value(&before).unwrap(),
        serde_json::to_value(&geometry).unwrap()
    );

    // once the field is usable the out-of-tolerance sum is still reported
    geometry.add_field_with_time_levels("layerThickness", Array2::<f64>::new(2, 1), 2);
    let report = setup.setup_vertical_grid(&mut geometry).unwrap();
    assert!(matches!(
        report.status(),
        Err(LandIceError::FractionSumOutOfTolerance { .. })
    ));

    let mut geometry = geometry_pool(&[0.5, 0.5], &[8.0]);
    geometry.add_field("layerCenterSigma", vec![0_i32]);
    assert!(matches!(
        setup.setup_vertical_grid(&mut geometry),
        Err(LandIceError::FieldTypeMismatch { .. })
    ));
    assert!(!geometry.has_field("layerThickness"));

    let quads = PeriodicQuads::new(3, 3);
    let mut mesh = quads.pool(|_| false);
    mesh.add_field("kiteIndexOnCell", vec![0.0_f64]);
    assert!(matches!(
        setup.setup_sign_and_index_fields(&mut mesh),
        Err(LandIceError::FieldTypeMismatch { .. })
    ));
    assert!(!mesh.has_field("edgeSignOnCell"));
}
