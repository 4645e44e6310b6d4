use crate::utils;
use siteflow_cloud::StateManager;
use siteflow_site::LoadedSite;

pub async fn handle(site: &LoadedSite) -> anyhow::Result<()> {
    let stack = siteflow_site::declare_site(&site.config, &site.project_root)?;
    let state = StateManager::new(&site.project_root).load().await?;

    utils::print_exports(&stack.stack.resolve_exports(&state));
    Ok(())
}
