use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use dtl_cli::cli::commands::{ask, config, doctor, files, load_settings, translate};
use dtl_cli::cli::{Args, Command};
use dtl_cli::output::{self, OutputConfig};
use dtl_cli::translation::print_languages;
use dtl_cli::ui::Style;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(args.global.verbose);
    let json = args.json || matches!(args.command, Some(Command::Ask { json: true, .. }));
    output::init(OutputConfig::from_flags(
        args.global.quiet,
        args.global.no_color,
        json,
    ));

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", Style::error("Error:"));
            exitcode::SOFTWARE
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "dtl_cli=warn",
        1 => "dtl_cli=info",
        _ => "dtl_cli=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<exitcode::ExitCode> {
    let overrides = args.global.overrides();
    let load = || {
        load_settings(&overrides)
            .inspect_err(|e| eprintln!("{} {e:#}", Style::error("Configuration error:")))
            .ok()
    };

    match args.command {
        Some(Command::Languages) => print_languages(),
        Some(Command::Files { container }) => {
            let Some(settings) = load() else {
                return Ok(exitcode::CONFIG);
            };
            files::run_files(container.as_deref(), &settings).await?;
        }
        Some(Command::Doctor) => {
            let Some(settings) = load() else {
                return Ok(exitcode::CONFIG);
            };
            doctor::run_doctor(&settings);
        }
        Some(Command::Ask {
            request,
            location,
            json,
        }) => {
            let Some(settings) = load() else {
                return Ok(exitcode::CONFIG);
            };
            let outcome = ask::run_ask(&request, &location, json, &settings).await?;
            return Ok(outcome.exit_code());
        }
        Some(Command::Config { init }) => {
            let Some(settings) = load() else {
                return Ok(exitcode::CONFIG);
            };
            config::run_config(init, &settings)?;
        }
        None => {
            let (Some(reference), Some(to)) = (args.reference, args.to) else {
                Args::command().print_help()?;
                return Ok(exitcode::USAGE);
            };
            let Some(settings) = load() else {
                return Ok(exitcode::CONFIG);
            };

            let options = translate::TranslateOptions {
                reference,
                to,
                from: args.from,
                output: args.output,
                mode: args.location.mode(),
                container: args.location.container,
                json: args.json,
            };
            let outcome = translate::run_translate(options, &settings).await?;
            return Ok(outcome.exit_code());
        }
    }

    Ok(exitcode::OK)
}
