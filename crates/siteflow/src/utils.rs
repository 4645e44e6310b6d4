use colored::Colorize;
use siteflow_cloud::{ActionType, CloudProvider, ExternalEngine, GlobalState, Plan, StateManager};
use siteflow_site::{LoadedSite, SiteStack};
use std::collections::BTreeMap;

/// Print where the configuration came from
pub fn print_loaded_site(site: &LoadedSite) {
    match &site.source {
        Some(path) => println!("Site file: {}", path.display().to_string().cyan()),
        None => println!("Site file: {}", "(built-in defaults)".dimmed()),
    }
}

/// Declare the site, reporting a skipped upload
pub fn declare(site: &LoadedSite) -> anyhow::Result<SiteStack> {
    let stack = siteflow_site::declare_site(&site.config, &site.project_root)?;
    if stack.upload_skipped {
        println!(
            "{}",
            format!(
                "⚠ Website directory {} does not exist, upload skipped",
                stack.upload_root.display()
            )
            .yellow()
        );
    }
    Ok(stack)
}

/// The configured provisioning engine
pub fn engine_for(site: &LoadedSite) -> anyhow::Result<ExternalEngine> {
    let settings = site.config.engine.as_ref().ok_or_else(|| {
        anyhow::anyhow!("No engine configured. Add an `engine \"<command>\"` node to site.kdl")
    })?;
    Ok(ExternalEngine::new(
        settings.command.clone(),
        settings.args.clone(),
    ))
}

/// Recorded state, optionally replaced by what the engine reports
pub async fn current_state(
    site: &LoadedSite,
    manager: &StateManager,
    refresh: bool,
) -> anyhow::Result<GlobalState> {
    if !refresh {
        return Ok(manager.load().await?);
    }

    let engine = engine_for(site)?;
    println!("{}", format!("Refreshing state from {}...", engine.command()).blue());
    let state = engine.get_state().await?;
    manager.save(&state).await?;
    Ok(state)
}

pub fn print_plan(plan: &Plan) {
    println!();
    println!("{}", "Plan:".bold());
    for action in &plan.actions {
        let key = action.resource_key();
        match action.action_type {
            ActionType::Create => println!("  {} {}", "+".green(), key.green()),
            ActionType::Update => println!("  {} {}", "~".yellow(), key.yellow()),
            ActionType::Delete => println!("  {} {}", "-".red(), key.red()),
            ActionType::NoOp => println!("    {}", key.dimmed()),
        }
    }
    println!();
    println!("{}", plan.summary().to_string().bold());
}

pub fn print_exports(exports: &BTreeMap<String, Option<String>>) {
    println!();
    println!("{}", "Outputs:".bold());
    for (name, value) in exports {
        match value {
            Some(v) => println!("  {} = {}", name.cyan(), v),
            None => println!("  {} = {}", name.cyan(), "(pending)".dimmed()),
        }
    }
}
