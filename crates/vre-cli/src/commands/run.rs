//! `vre run`: one verification pass from files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use tracing::info;
use uuid::Uuid;
use vre_config::sha256_hex;
use vre_engine::{PassInputs, PassOutput, VrePass};

use super::load_config;

#[derive(Serialize)]
struct RunReport<'a> {
    run_id: Uuid,
    config_hash: &'a str,
    inputs_hash: &'a str,
    digest: &'a str,
    output: &'a PassOutput,
}

pub fn run_pass(config_paths: Vec<String>, inputs_path: String, out: Option<String>) -> Result<()> {
    let (loaded, cfg) = load_config(&config_paths, false)?;

    let raw = fs::read(&inputs_path).with_context(|| format!("read inputs failed: {}", inputs_path))?;
    let raw = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&raw);
    let inputs: PassInputs = serde_json::from_slice(raw).context("inputs must be a valid pass-inputs JSON document")?;
    let inputs_hash = sha256_hex(raw);

    let output = VrePass::new(cfg).run(&inputs)?;
    let digest = output.digest()?;
    let run_id = derive_cli_run_id(&loaded.config_hash, &inputs_hash, &inputs);

    let report = RunReport {
        run_id,
        config_hash: &loaded.config_hash,
        inputs_hash: &inputs_hash,
        digest: &digest,
        output: &output,
    };
    let body = serde_json::to_string_pretty(&report).context("serialize run report failed")?;

    match out {
        Some(path) => {
            fs::write(&path, body).with_context(|| format!("write report failed: {}", path))?;
            info!(path = %path, "pass report written");
            println!("run_id={}", run_id);
            println!("config_hash={}", loaded.config_hash);
            println!("digest={}", digest);
            println!("fraud_flags={}", output.fraud_flags.len());
            println!("out={}", path);
        }
        None => println!("{body}"),
    }
    Ok(())
}

/// Same config + same inputs => same run id.
fn derive_cli_run_id(config_hash: &str, inputs_hash: &str, inputs: &PassInputs) -> Uuid {
    let data = format!(
        "vre-cli.run.v1|{}|{}|{}|{}",
        config_hash, inputs_hash, inputs.window_start, inputs.window_end
    );
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, data.as_bytes())
}
