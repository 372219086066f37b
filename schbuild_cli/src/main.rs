use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use schbuild_cli::args::BuildArgs;
use schbuild_cli::config::{AppConfig, ConfigManager};
use schbuild_cli::error::{CliError, CliResult, ErrorContext, ExitCode};
use schbuild_cli::orchestrators::build_orchestrator::{BuildCommand, RunFlags};
use schbuild_cli::orchestrators::clean_orchestrator;
use schbuild_cli::terminal;
use schbuild_core::{BuildRequest, Target};
use std::path::Path;

#[derive(Parser)]
#[command(name = "schbuild")]
#[command(author, version, about = "Incrementally convert schematics to PNG, PDF and TeX", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(flatten)]
    build: BuildArgs,

    /// What to do; builds the default targets when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the default target groups (png unless configured otherwise)
    All,

    /// Build PNG outputs
    Png,

    /// Build PDF outputs
    Pdf,

    /// Build TeX outputs
    Tex,

    /// Remove generated pdf, png, tex, aux and log files
    Clean,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Build request for the build verbs
    fn request(&self) -> Option<BuildRequest> {
        match self {
            Self::All => Some(BuildRequest::All),
            Self::Png => Some(BuildRequest::Group(Target::Png)),
            Self::Pdf => Some(BuildRequest::Group(Target::Pdf)),
            Self::Tex => Some(BuildRequest::Group(Target::Tex)),
            Self::Clean => Some(BuildRequest::Clean),
            Self::Config { .. } | Self::Completions { .. } => None,
        }
    }
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., build.jobs)
        key: String,
    },

    /// Set a configuration value in the user config file
    Set {
        /// Configuration key (e.g., build.default_targets)
        key: String,

        /// Value; lists are comma-separated
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the user config file path
    Path,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("schbuild_core", log::LevelFilter::Debug)
            .filter_module("schbuild_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let debug = cli.debug;
    match run(cli).await {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => {
            eprint!("{}", error.format_for_user(debug));
            error.exit_code().into()
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let command = cli.command.unwrap_or(Commands::All);

    let Some(request) = command.request() else {
        return match command {
            Commands::Config { command } => config_command(command, &cli.build),
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
            _ => Ok(()),
        };
    };

    let dir = cli.build.build_dir();
    let mut config = match load_config(&dir) {
        Ok(config) => config,
        // Cleaning is best effort and never fails on configuration
        Err(e) if request == BuildRequest::Clean => {
            log::warn!("Ignoring configuration: {e}");
            AppConfig::default()
        }
        Err(e) => return Err(e),
    };
    config.apply_cli_overrides(&cli.build);

    let use_color = config.output.color_enabled && terminal::supports_ansi();
    colored::control::set_override(use_color);

    if request == BuildRequest::Clean {
        clean_orchestrator::execute(&dir, &config, use_color);
        return Ok(());
    }

    let flags = RunFlags {
        force: cli.build.force,
        dry_run: cli.build.dry_run,
        show_progress: config.output.progress_enabled
            && !cli.build.dry_run
            && terminal::should_show_progress_by_default(),
        use_color,
    };

    let invocation_dir =
        std::env::current_dir().map_err(|e| CliError::from_io_error(e, "."))?;
    let build = BuildCommand::new(&dir, config, flags, &invocation_dir)?;
    build.execute(request).await?;

    Ok(())
}

fn load_config(dir: &Path) -> CliResult<AppConfig> {
    let manager = ConfigManager::new().with_project_dir(dir);
    manager.load().map_err(|e| {
        CliError::misuse(&format!("{e:#}"))
            .with_context("config", &manager.get_config_path().display().to_string())
    })
}

fn config_command(command: ConfigCommand, args: &BuildArgs) -> CliResult<()> {
    let mut manager = ConfigManager::new();
    if let Some(dir) = &args.dir {
        manager = manager.with_project_dir(dir);
    }

    match command {
        ConfigCommand::Get { key } => {
            let value = manager.get(&key)?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            manager
                .set(&key, &value)
                .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("Config file: {}", manager.get_config_path().display());
            if let Some(project) = manager.project_config_path()
                && project.exists()
            {
                eprintln!("Project file: {}", project.display());
            }

            let mut section = "";
            for (key, value) in &items {
                let (head, rest) = key.split_once('.').unwrap_or(("general", key.as_str()));
                if head != section {
                    println!("[{}]", head.yellow());
                    section = head;
                }
                println!("  {} = {}", rest.cyan(), value);
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
