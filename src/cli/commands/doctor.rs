use crate::config::Settings;
use crate::document::SUPPORTED_EXTENSIONS;
use crate::pipeline::Orchestrator;
use crate::ui::Style;

/// Prints platform details, candidate folders and backend status.
pub fn run_doctor(settings: &Settings) {
    let orchestrator = Orchestrator::from_settings(settings);
    let locator = orchestrator.locator();
    let host = locator.host();

    println!("{}", Style::header("System"));
    print_row("platform", host.platform.name());
    print_row("home", &display_or_unknown(host.home.as_deref()));
    print_row("cwd", &display_or_unknown(host.cwd.as_deref()));
    if let Some(ref user) = host.username {
        print_row("user", user);
    }

    println!();
    println!("{}", Style::header("Documents folders (in priority order)"));
    for candidate in locator.inspect() {
        let mark = if candidate.valid {
            Style::success("✓")
        } else {
            Style::error("✗")
        };
        println!("  {mark} {}", candidate.path.display());
    }
    match locator.find_first_valid() {
        Some(dir) => print_row("using", &Style::value(dir.display())),
        None => print_row("using", &Style::warning("none found")),
    }

    println!();
    println!("{}", Style::header("Documents"));
    print_row("supported", &SUPPORTED_EXTENSIONS.join(", "));
    print_row(
        "partial match",
        if settings.partial_matching { "on" } else { "off" },
    );
    print_row("ambiguous a/b", &settings.ambiguous_paths.to_string());
    print_row("scratch dir", &orchestrator.scratch().root().display().to_string());

    println!();
    println!("{}", Style::header("Backends"));
    let missing = orchestrator.missing_translation_vars();
    if missing.is_empty() {
        print_row("translation", &Style::success("configured"));
    } else {
        print_row(
            "translation",
            &Style::warning(format!("missing {}", missing.join(", "))),
        );
    }
    match orchestrator.storage() {
        Ok(gateway) => print_row(
            "storage",
            &Style::success(format!("configured ({})", gateway.store().provider_name())),
        ),
        Err(e) => print_row("storage", &Style::warning(e)),
    }
}

fn print_row(label: &str, value: &str) {
    println!("  {} {value}", Style::label(format!("{label:14}")));
}

fn display_or_unknown(path: Option<&std::path::Path>) -> String {
    path.map_or_else(|| "(unknown)".to_string(), |p| p.display().to_string())
}
