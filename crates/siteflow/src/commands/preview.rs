use crate::utils;
use colored::Colorize;
use siteflow_cloud::{StateManager, diff};
use siteflow_site::LoadedSite;

pub async fn handle(site: &LoadedSite, refresh: bool) -> anyhow::Result<()> {
    println!("{}", "Previewing site...".blue());
    utils::print_loaded_site(site);

    let stack = utils::declare(site)?;
    let manager = StateManager::new(&site.project_root);
    // refreshing rewrites the state file
    let lock = if refresh {
        Some(manager.acquire_lock().await?)
    } else {
        None
    };
    let state = utils::current_state(site, &manager, refresh).await?;
    if let Some(lock) = lock {
        lock.release().await?;
    }

    let plan = diff(stack.stack.resources(), &state)?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        println!("{}", "✓ Everything is up to date".green());
    }

    Ok(())
}
