use crate::utils;
use colored::Colorize;
use siteflow_cloud::{CloudProvider, ResourceSet, StateManager, diff};
use siteflow_site::LoadedSite;

pub async fn handle(site: &LoadedSite, yes: bool) -> anyhow::Result<()> {
    println!("{}", "Destroying site...".red().bold());
    utils::print_loaded_site(site);

    let manager = StateManager::new(&site.project_root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    if state.resources.is_empty() {
        println!("{}", "Nothing recorded, nothing to destroy".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let plan = diff(&ResourceSet::new(), &state)?;
    utils::print_plan(&plan);

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: every resource above will be deleted.".yellow()
        );
        println!("Run again with --yes to destroy");
        lock.release().await?;
        return Ok(());
    }

    let engine = utils::engine_for(site)?;
    let result = engine.apply(&plan).await?;

    state.record(&plan, &result);
    manager.save(&state).await?;
    lock.release().await?;

    for action in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            action.action_id,
            action.error.as_deref().unwrap_or("failed")
        );
    }

    if !result.is_success() {
        anyhow::bail!(
            "{} deletions failed, {} resources still recorded",
            result.failed.len(),
            state.resources.len()
        );
    }

    println!("{}", "✓ Site destroyed".green().bold());
    Ok(())
}
