use tourweave::{EngineConfig, Solver, io};

const HOUSE: &str = "\
NAME : house5
COMMENT : five points around a roof
TYPE : TSP
DIMENSION : 5
EDGE_WEIGHT_TYPE : EUC_2D
NODE_COORD_SECTION
1 0 0
2 0 2
3 3 2
4 3 0
5 1.5 3.5
EOF
";

#[test]
fn tsplib_instance_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("house5.tsp");
    std::fs::write(&input, HOUSE).unwrap();

    let instance = io::read_tsplib(&input).unwrap();
    assert_eq!(instance.len(), 5);

    let mut solver = Solver::new(instance.build_index().unwrap(), EngineConfig::default());
    let result = solver.solve().unwrap();
    let sum = result.graph.edges().iter().map(|&e| solver.index().length(e)).sum::<f64>();
    assert!((sum - result.total_length).abs() < 1e-9);

    let report = dir.path().join("report.tsv");
    io::write_report_file(&report, &instance.name, solver.index(), &result).unwrap();
    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("NAME\thouse5\nPOINTS\t5\n"));
    assert!(text.contains("Total Distance:\t"));

    let summary = dir.path().join("summary.json");
    io::TourSummary::new(&instance.name, solver.index(), &result).write_json(&summary).unwrap();
    let parsed: io::TourSummary = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
    assert_eq!(parsed.points, 5);
    assert_eq!(parsed.complete, result.complete);

    let svg = dir.path().join("house5.svg");
    io::write_svg(&svg, solver.index(), &result).unwrap();
    assert!(std::fs::read_to_string(&svg).unwrap().contains("<svg"));

    let tour = dir.path().join("house5.tour");
    assert_eq!(io::write_tour_file(&tour, &instance.name, &result).is_ok(), result.complete);
}

#[test]
fn cached_tables_solve_identically() {
    let dir = tempfile::tempdir().unwrap();
    let instance = io::random_instance(12, 42, 100.0);
    let cache = io::DistanceCache::new(dir.path());

    let fresh = Solver::new(instance.build_index().unwrap(), EngineConfig::default()).solve().unwrap();
    let built = Solver::new(cache.load_or_build(&instance).unwrap(), EngineConfig::default()).solve().unwrap();
    let loaded = Solver::new(cache.load_or_build(&instance).unwrap(), EngineConfig::default()).solve().unwrap();

    assert_eq!(fresh.graph, built.graph);
    assert_eq!(built.graph, loaded.graph);
    assert_eq!(fresh.total_length, loaded.total_length);
}

#[test]
fn generated_instances_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("random.tsp");
    let instance = io::random_instance(20, 9, 500.0);
    io::write_tsplib(&instance, &path).unwrap();

    let read = io::read_tsplib(&path).unwrap();
    assert_eq!(read.len(), 20);
    assert_eq!(read.weight_type, instance.weight_type);
    for (a, b) in read.points.iter().zip(&instance.points) {
        assert!((a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6);
    }
}
