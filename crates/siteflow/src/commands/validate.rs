use colored::Colorize;
use siteflow_site::SiteConfig;
use std::path::Path;

pub fn handle(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "Validating site...".blue());

    let site = match siteflow_site::load_site(config_path) {
        Ok(site) => site,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Configuration error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let stack = match siteflow_site::declare_site(&site.config, &site.project_root) {
        Ok(stack) => stack,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Declaration error".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    match &site.source {
        Some(path) => println!("Site file: {}", path.display().to_string().cyan()),
        None => println!("Site file: {}", "(built-in defaults)".dimmed()),
    }
    println!("{}", "✓ Site configuration is valid".green().bold());
    println!();
    print_summary(&site.config);

    let resources = stack.stack.resources();
    println!("  Resources: {}", resources.len());
    if stack.upload_skipped {
        println!(
            "  Upload: {} ({})",
            "skipped".yellow(),
            stack.upload_root.display()
        );
    } else {
        println!(
            "  Upload: {} files from {}",
            stack.objects.len(),
            stack.upload_root.display()
        );
    }
    for entry in &stack.objects {
        println!("    - {} ({})", entry.key.cyan(), entry.content_type);
    }

    Ok(())
}

fn print_summary(config: &SiteConfig) {
    println!("Summary:");
    println!("  Project: {}", config.project.cyan());
    println!("  Provider: {}", config.provider);
    println!(
        "  Bucket: {} (index: {})",
        config.bucket.name.cyan(),
        config.bucket.index_document
    );
    println!(
        "  CDN: {} ({}, TTL {}/{}/{})",
        config.cdn.name.cyan(),
        config.cdn.price_class,
        config.cdn.min_ttl,
        config.cdn.default_ttl,
        config.cdn.max_ttl
    );
    match &config.engine {
        Some(engine) => println!("  Engine: {}", engine.command),
        None => println!("  Engine: {}", "(none, preview only)".dimmed()),
    }
}
