//! Turns a directory of SVG icons into an icon font, a C++ header that
//! embeds it, and an HTML preview.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use iconpress::core::cli::{CliArgs, Command};
use iconpress::core::{config, platform, prompt, ConfigFile};
use iconpress::pipeline::{self, Pipeline};

async fn run_command(command: Command) -> Result<()> {
    let mut ask = |label: &str, default: Option<&str>| prompt::ask_text(label, default);

    match command {
        Command::Build(args) => {
            let settings = ConfigFile::load().unwrap_or_default();
            let plan = config::resolve_build(&args, &settings, &mut ask)?;
            tracing::info!(
                "Building '{}' from {} into {}",
                plan.pipeline.font_name,
                plan.pipeline.icons_dir.display(),
                plan.pipeline.output_dir().display()
            );

            let report = Pipeline::standard(plan.pipeline, plan.fontc_command, plan.skip_invalid)
                .run_build()
                .await?;
            println!("Built {} icons", report.glyphs.len());
            for (label, path) in report.artifacts() {
                println!("  {label}: {}", path.display());
            }
        }
        Command::Header(args) => {
            let plan = config::resolve_header(&args, &mut ask)?;
            let header =
                pipeline::run_header_only(&plan.font, &plan.name, plan.codepoints.as_deref())
                    .await?;
            println!("  Header: {}", header.display());
        }
        Command::InitConfig => {
            ConfigFile::initialize_config_directory()
                .context("initializing the configuration directory")?;
        }
    }
    Ok(())
}

/// Parse arguments, set up logging and run the command to completion
fn run_app(cli_args: CliArgs) -> Result<()> {
    let _log_guard = iconpress::logging::init(cli_args.verbose);
    cli_args.validate().map_err(|e| anyhow!(e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;
    runtime.block_on(run_command(cli_args.command))
}

fn main() {
    let cli_args = CliArgs::parse();
    if let Err(error) = run_app(cli_args) {
        platform::handle_error(error);
    }
}
