use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_stimulus-grid"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run stimulus-grid")
}

#[test]
fn prints_one_record_per_trial() {
    let output = run(&["--trials", "3", "--count", "4", "--seed", "7"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout is utf-8");
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is json"))
        .collect();

    assert_eq!(records.len(), 3);
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record["trial_number_overall"], index as u64 + 1);
        assert_eq!(record["n_stimuli"], 4);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let args = ["--trials", "2", "--count", "5", "--seed", "1234"];
    let first = run(&args);
    let second = run(&args);

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn undersized_grid_is_rejected() {
    let output = run(&["--columns", "2"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid experiment configuration"), "{stderr}");
}
