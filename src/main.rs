use anyhow::Result;
use clap::Parser;
use log::error;

use specmatch::{Cli, CommandHandler, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let options = specmatch::cli::RenderOptions::from(&cli);
    let command = match cli.command {
        Some(command) => command,
        None => {
            print_help();
            return Ok(());
        }
    };

    // Version needs no settings or client.
    if matches!(command, Commands::Version) {
        println!("{}", specmatch::cli::version_info());
        return Ok(());
    }

    let mut handler = match CommandHandler::new() {
        Ok(handler) => handler,
        Err(e) => {
            error!("Failed to initialize specmatch: {e}");
            eprintln!("Error: Failed to initialize specmatch: {e}");
            std::process::exit(1);
        }
    };

    match handler.handle_command(command, options).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("Command failed: {e}");
            eprintln!("{}", handler.format_error(&e.to_string()));
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help() {
    let help = r#"Specmatch - Compare printer and MFP spec sheets using an xAI-compatible chat API

Usage:
  specmatch compare <MODEL1> <MODEL2>
  specmatch search <DESCRIPTION>...
  specmatch [COMMAND]

Examples:
  specmatch compare "Lexmark MX421" "HP LaserJet Pro M428"
  specmatch search color laser MFP with duplex, under $600
  specmatch compare "Epson L3250" "Canon G3110" --output result.html

Commands:
  init      Write the default config file
  config    Show configuration
  version   Show version information

Options:
  -o, --output <FILE>   Write the result as a standalone HTML page
      --raw             Print the normalized Markdown table instead of HTML
  -v, --verbose         Verbose output
  -h, --help            Print help

An xAI API key is required for compare and search; set XAI_API_KEY.
"#;
    println!("{help}");
}
