use colored::Colorize;
use siteflow_site::LoadedSite;
use std::path::Path;

pub fn handle(site: &LoadedSite, output: Option<&Path>) -> anyhow::Result<()> {
    let stack = siteflow_site::declare_site(&site.config, &site.project_root)?;
    let json = serde_json::to_string_pretty(&stack.stack.graph())?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            eprintln!(
                "{}",
                format!("✓ Wrote resource graph to {}", path.display()).green()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
