use anyhow::{Context, Result};

use crate::config::Settings;
use crate::error::Error;
use crate::locate::list_supported_files;
use crate::pipeline::Orchestrator;
use crate::ui::{Spinner, Style};

/// Lists translatable files in the documents folder, or in `container`.
pub async fn run_files(container: Option<&str>, settings: &Settings) -> Result<()> {
    let orchestrator = Orchestrator::from_settings(settings);

    match container {
        Some(container) => list_container(&orchestrator, container).await,
        None => list_local(&orchestrator),
    }
}

fn list_local(orchestrator: &Orchestrator) -> Result<()> {
    let locator = orchestrator.locator();
    let Some(directory) = locator.find_first_valid() else {
        let host = locator.host();
        return Err(Error::DirectoryNotFound {
            searched: locator.enumerate(),
            platform: host.platform.name().to_string(),
            home: host.home,
        }
        .into());
    };

    let files = list_supported_files(&directory)
        .with_context(|| format!("Failed to list {}", directory.display()))?;

    println!(
        "{} {}",
        Style::header("Translatable files in"),
        Style::value(directory.display())
    );
    if files.is_empty() {
        println!("  {}", Style::secondary("No translatable files found."));
    }
    for (name, _) in &files {
        println!("  {name}");
    }
    Ok(())
}

async fn list_container(orchestrator: &Orchestrator, container: &str) -> Result<()> {
    let gateway = orchestrator.storage()?;

    let spinner = Spinner::new(&format!("Listing container '{container}'..."));
    let objects = gateway.list_documents(container).await;
    spinner.stop();
    let objects = objects.map_err(Error::from)?;

    println!(
        "{} {}",
        Style::header("Translatable files in container"),
        Style::value(container)
    );
    if objects.is_empty() {
        println!("  {}", Style::secondary("No translatable files found."));
    }
    for object in &objects {
        println!(
            "  {} {}",
            object.key,
            Style::secondary(format!("({} bytes)", object.size))
        );
    }
    Ok(())
}
