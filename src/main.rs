use anyhow::Result;
use chatscribe::app::{
    apply_cli_overrides, run_batch_command, run_probe_command, run_split_command,
    run_transcribe_command,
};
use chatscribe::cli::{Cli, Commands};
use chatscribe::config::Config;
use chatscribe::diagnostics::check_dependencies;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = apply_cli_overrides(
        load_config(cli.config.as_deref())?,
        cli.model,
        cli.language,
        cli.model_path,
        cli.chunk_length,
        cli.min_length,
        cli.max_retries,
    );

    match cli.command {
        None => {
            let Some(export_dir) = cli.export_dir else {
                eprintln!("No export directory given. Usage: chatscribe <EXPORT_DIR>");
                eprintln!("Run `chatscribe --help` for details.");
                std::process::exit(2);
            };
            run_batch_command(config, &export_dir, &cli.output, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Probe { file }) => {
            run_probe_command(&file)?;
        }
        Some(Commands::Split {
            input,
            output,
            chunk_length,
            min_length,
        }) => {
            run_split_command(&input, &output, chunk_length, min_length)?;
        }
        Some(Commands::Transcribe {
            file,
            model,
            language,
        }) => {
            let config = apply_cli_overrides(
                config,
                Some(model),
                language,
                None,
                None,
                None,
                None,
            );
            run_transcribe_command(config, &file, cli.quiet).await?;
        }
        Some(Commands::Check) => {
            check_dependencies(&config.stt.model);
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/chatscribe/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}
