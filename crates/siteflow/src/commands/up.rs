use crate::utils;
use colored::Colorize;
use siteflow_cloud::{CloudProvider, StateManager, diff};
use siteflow_site::LoadedSite;

pub async fn handle(site: &LoadedSite, yes: bool, refresh: bool) -> anyhow::Result<()> {
    println!("{}", "Provisioning site...".blue().bold());
    utils::print_loaded_site(site);

    let stack = utils::declare(site)?;
    let manager = StateManager::new(&site.project_root);
    let lock = manager.acquire_lock().await?;
    let mut state = utils::current_state(site, &manager, refresh).await?;

    let plan = diff(stack.stack.resources(), &state)?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        println!("{}", "✓ Everything is up to date".green());
        utils::print_exports(&stack.stack.resolve_exports(&state));
        lock.release().await?;
        return Ok(());
    }

    if !yes {
        println!();
        println!("Run again with --yes to apply this plan");
        lock.release().await?;
        return Ok(());
    }

    let engine = utils::engine_for(site)?;
    let auth = engine.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "Engine unavailable: {}",
            auth.error.unwrap_or_else(|| engine.command().to_string())
        );
    }

    println!();
    println!(
        "{}",
        format!("Applying {} actions with {}...", plan.actions.len(), engine.command()).blue()
    );
    let result = engine.apply(&plan).await?;

    state.record(&plan, &result);
    manager.save(&state).await?;
    lock.release().await?;

    for action in &result.succeeded {
        println!("  {} {}", "✓".green(), action.action_id);
    }
    for action in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            action.action_id,
            action.error.as_deref().unwrap_or("failed")
        );
    }
    println!(
        "{}",
        format!("Finished in {}ms", result.duration_ms).dimmed()
    );

    utils::print_exports(&stack.stack.resolve_exports(&state));

    if !result.is_success() {
        anyhow::bail!("{} actions failed", result.failed.len());
    }

    println!();
    println!("{}", "✓ Site is up".green().bold());
    Ok(())
}
