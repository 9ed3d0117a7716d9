use clap::{Parser, Subcommand};
use edgeone_deploy::deploy::{self, DeployEnv, DeployError, DeployOutcome, SystemRunner};
use edgeone_deploy::validate::{self, ValidateError, ValidateOptions};
use edgeone_deploy::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "edgeone-deploy")]
#[command(about = "Validate and deploy a static web game to EdgeOne Pages")]
#[command(long_about = "\
Validate and deploy a static web game to EdgeOne Pages

Project layout:

  ./
  ├── index.html        # Entry page (required)
  ├── deploy.toml       # Optional settings, see 'gen-config'
  ├── style.css
  └── assets/           # Images and other static files

Environment:
  EDGEONE_PAGES_PROJECT_NAME   Target project (default from deploy.toml)
  EDGEONE_PAGES_API_TOKEN      API token; without it a temporary link is created

Deployment runs the edgeone-pages-mcp npm package, so Node.js and npm must be
installed.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct ValidateArgs {
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Do not write sitemap.xml and robots.txt
    #[arg(long)]
    no_artifacts: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check the project and generate sitemap.xml and robots.txt
    Validate(ValidateArgs),
    /// Deploy the whole project folder
    Deploy,
    /// Deploy only the entry page to a temporary link
    DeploySingle,
    /// Print a stock deploy.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    edgeone_deploy::init_tracing(cli.verbose);

    let result = run(&cli);
    if matches!(cli.command, Command::DeploySingle) {
        cleanup(&cli.source);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let json = matches!(&cli.command, Command::Validate(args) if args.json);
            if let Some(ValidateError::MissingRequired(required)) =
                e.downcast_ref::<ValidateError>()
                && !json
            {
                output::print_required_files(required);
                println!();
            }
            eprintln!("❌ {e}");
            if let Some(deploy_error) = e.downcast_ref::<DeployError>() {
                eprintln!();
                let single = matches!(cli.command, Command::DeploySingle);
                output::print_troubleshooting(deploy_error, single);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Validate(args) => {
            let config = config::load_config(&cli.source)?;
            let options = ValidateOptions {
                write_artifacts: !args.no_artifacts,
                ..ValidateOptions::default()
            };
            let outcome = validate::validate(&cli.source, &config, options)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                output::print_validation_outcome(&outcome);
                println!("✅ Ready to deploy to EdgeOne Pages");
            }
        }
        Command::Deploy => {
            let config = config::load_config(&cli.source)?;
            let env = DeployEnv::from_env(&config);
            output::print_deploy_env(&env, &cli.source);
            println!();

            deploy::require_entry(&cli.source, &config.site.entry_file)?;
            let images = deploy::top_level_images(&cli.source).unwrap_or_else(|e| {
                warn!("cannot list images in {}: {e}", cli.source.display());
                Vec::new()
            });
            output::print_project_files(&config.site.entry_file, &images);
            println!();

            println!("🚀 Deploying to EdgeOne Pages, this may take a few minutes...");
            let outcome = deploy::deploy(&cli.source, &config, &env, &SystemRunner)?;
            finish(&outcome);
        }
        Command::DeploySingle => {
            let config = config::load_config(&cli.source)?;
            let env = DeployEnv::from_env(&config);
            output::print_deploy_env(&env, &cli.source);
            println!();
            output::print_single_file_notes();
            println!();

            println!("🚀 Deploying {}...", config.site.entry_file);
            let outcome = deploy::deploy_single(&cli.source, &config, &env, &SystemRunner)?;
            finish(&outcome);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn finish(outcome: &DeployOutcome) {
    println!();
    output::print_deploy_success(outcome);
}

/// Best-effort removal of the single-file staging copy. Never fails the run.
fn cleanup(source: &Path) {
    match deploy::cleanup_temp_file(source) {
        Ok(true) => info!("removed {}", deploy::TEMP_FILE),
        Ok(false) => {}
        Err(e) => warn!("could not remove {}: {e}", deploy::TEMP_FILE),
    }
}
