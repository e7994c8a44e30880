//! Integration tests for the healthbench binaries.
//!
//! None of these reach a real provider: the end-to-end run points Ollama at
//! a closed local port so every call fails fast.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const DATASET: &str = r#"[
    {
        "arquivo": "cardio.pdf",
        "titulo": "Cardiologia",
        "perguntas": [
            "A hipertensão é fator de risco para AVC.",
            "A hipertensão protege contra AVC."
        ]
    }
]"#;

/// Helper to run the single-provider binary with arguments.
fn run_cli(args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_healthbench"));
    cmd.args(args)
        .env_remove("HEALTHBENCH_API_KEY")
        .env_remove("AWS_BEARER_TOKEN_BEDROCK");
    cmd.output().expect("Failed to execute healthbench")
}

/// Helper to run the batch binary with arguments.
fn run_batch(args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_healthbench-batch"));
    cmd.args(args);
    cmd.output().expect("Failed to execute healthbench-batch")
}

fn write_dataset(dir: &Path) -> String {
    let path = dir.join("dataset.json");
    std::fs::write(&path, DATASET).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("healthbench"));
    assert!(stdout.contains("--provider"));
    assert!(stdout.contains("--parallelism"));
}

#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("healthbench"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_unknown_provider_rejected() {
    let output = run_cli(&["--provider", "gemini", "--model", "x"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_missing_api_key() {
    let temp = TempDir::new().unwrap();
    let dataset = write_dataset(temp.path());

    let output = run_cli(&[
        "--provider",
        "openai",
        "--model",
        "gpt-4o",
        "--dataset-path",
        &dataset,
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key required"));
}

#[test]
fn test_cli_invalid_parallelism() {
    let output = run_cli(&[
        "--provider",
        "ollama",
        "--model",
        "llama3",
        "--parallelism",
        "0",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parallelism"));
}

#[test]
fn test_cli_missing_dataset() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.json");

    let output = run_cli(&[
        "--provider",
        "ollama",
        "--model",
        "llama3",
        "--dataset-path",
        &missing.to_string_lossy(),
        "--no-progress",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_cli_unreachable_provider_writes_csv() {
    let temp = TempDir::new().unwrap();
    let dataset = write_dataset(temp.path());
    let csv_out = temp.path().join("out").join("results.csv");

    let output = run_cli(&[
        "--provider",
        "ollama",
        "--model",
        "llama3",
        "--base-url",
        "http://127.0.0.1:1",
        "--max-retries",
        "0",
        "--timeout",
        "5",
        "--dataset-path",
        &dataset,
        "--csv-out",
        &csv_out.to_string_lossy(),
        "--detailed-report",
        "--no-progress",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let csv = std::fs::read_to_string(&csv_out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "arquivo,titulo,idx_local,pergunta,esperado,pred,correta,resposta_bruta"
    );
    for line in &lines[1..] {
        assert!(line.contains(",,0,"), "row should have empty pred: {line}");
        assert!(line.contains("[ERRO NA CHAMADA]"));
    }

    assert!(temp.path().join("out").join("results_detailed.json").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESUMO DA AVALIAÇÃO"));
}

#[test]
fn test_batch_help() {
    let output = run_batch(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--providers"));
}

#[test]
fn test_batch_missing_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("providers.json");

    let output = run_batch(&["--config", &config.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("providers"));
}

#[test]
fn test_batch_run_writes_output_dir() {
    let temp = TempDir::new().unwrap();
    let dataset = write_dataset(temp.path());
    let config = temp.path().join("providers.json");
    std::fs::write(
        &config,
        r#"{
            "providers": [
                {
                    "name": "Local Llama",
                    "type": "ollama",
                    "model": "llama3",
                    "base_url": "http://127.0.0.1:1",
                    "max_retries": 0,
                    "timeout": 5
                }
            ]
        }"#,
    )
    .unwrap();
    let output_dir = temp.path().join("evaluation_results");

    let output = run_batch(&[
        "--config",
        &config.to_string_lossy(),
        "--dataset",
        &dataset,
        "--output-dir",
        &output_dir.to_string_lossy(),
        "--no-progress",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let run_dirs: Vec<_> = std::fs::read_dir(&output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(run_dirs.len(), 1);
    let run_dir = &run_dirs[0];
    assert!(run_dir.join("Local_Llama_results.csv").exists());
    assert!(run_dir.join("Local_Llama_detailed.json").exists());
    assert!(run_dir.join("combined_summary.csv").exists());
    assert!(run_dir.join("run_metadata.json").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BATCH EVALUATION COMPLETE"));
}
