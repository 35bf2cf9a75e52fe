use tandem_core::scenario::NetworkParams;
use tandem_experiments::{
    export_report_json, export_rounds_csv, export_sweep_csv, run_experiment, Metric,
};
use tempfile::tempdir;

fn short_run() -> tandem_experiments::RunReport {
    let params = NetworkParams::default()
        .with_seed(21)
        .with_batch_sizes(15, 25)
        .with_rounds(6);
    run_experiment(&params, false).expect("run")
}

#[test]
fn report_round_trips_through_json() {
    let report = short_run();
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    export_report_json(&report, &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["params"]["batch_size"], 15);
    assert_eq!(value["rounds"].as_array().map(Vec::len), Some(6));
    assert_eq!(value["summary"]["metrics"].as_array().map(Vec::len), Some(10));
    assert_eq!(value["summary"]["metrics"][0]["metric"], "WaitOne");
}

#[test]
fn rounds_and_sweep_csv_have_expected_rows() {
    let report = short_run();
    let dir = tempdir().unwrap();

    let rounds_path = dir.path().join("rounds.csv");
    export_rounds_csv(&report.rounds, &rounds_path).unwrap();
    let mut reader = csv::Reader::from_path(&rounds_path).unwrap();
    assert_eq!(reader.records().count(), 6);

    let sweep_path = dir.path().join("sweep.csv");
    export_sweep_csv(std::slice::from_ref(&report), &sweep_path).unwrap();
    let mut reader = csv::Reader::from_path(&sweep_path).unwrap();
    let metrics: Vec<String> = reader
        .records()
        .map(|record| record.unwrap()[4].to_string())
        .collect();
    assert_eq!(metrics.len(), Metric::ALL.len());
    assert_eq!(metrics[0], "E[W1]");
    assert_eq!(metrics[9], "V[W2]");
}
