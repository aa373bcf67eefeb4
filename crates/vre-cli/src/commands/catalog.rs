use anyhow::{Context, Result};
use vre_fraud::{catalog, RuleInfo};

pub fn print_catalog(json: bool) -> Result<()> {
    if json {
        let rules: Vec<RuleInfo> = catalog().iter().map(RuleInfo::from).collect();
        let s = serde_json::to_string_pretty(&rules).context("serialize catalog failed")?;
        println!("{s}");
        return Ok(());
    }

    for r in catalog() {
        let sources: Vec<&str> = r.sources.iter().map(|d| d.as_str()).collect();
        println!(
            "{}\t{}\t{:?}\t{}\t{}",
            r.id,
            r.severity.as_status().as_str(),
            r.detection,
            sources.join(","),
            r.label
        );
    }
    Ok(())
}
