use crate::source::{SecretSource, sources};
use crate::{
    GlobalConfig, GlobalDefaults, RunEnv, SecretInjectError, Variables, inject, parse_var,
    parser_for, run,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use colored::Colorize;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Env file picked up by `run` when `--envar-file` is not given.
const DEFAULT_ENV_FILE: &str = "secretinject.env";

/// Main CLI structure for the secretinject application.
#[derive(Parser, Debug)]
#[command(name = "secretinject")]
#[command(about = "Inject secrets into templates and process environments", long_about = None)]
#[command(version)]
struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands for the secretinject CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Inject secrets into a template read from stdin or a file
    Inject {
        /// Read the template from this file instead of stdin
        #[arg(short, long)]
        in_file: Option<PathBuf>,
        /// Write the injected template to a file instead of stdout
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// File mode for a newly created output file, in octal. Ignored without --file
        #[arg(long, default_value = "0600", value_parser = parse_file_mode)]
        file_mode: u32,
        /// Overwrite an existing output file without asking
        #[arg(long)]
        force: bool,
        /// Set a template variable (name=value); may be repeated
        #[arg(short = 'v', long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Template syntax version: 1, 2 or latest
        #[arg(long, env = "SECRETINJECT_TEMPLATE_VERSION")]
        template_version: Option<String>,
        /// Secret source to fetch values from (e.g., env://, dotenv:.env, keyring)
        #[arg(short, long, env = "SECRETINJECT_SOURCE")]
        source: Option<String>,
    },
    /// Run a command with secrets injected into its environment
    Run {
        /// Env file with KEY=VALUE lines or flat YAML, whose values are templates
        #[arg(short, long)]
        envar_file: Option<PathBuf>,
        /// Set a template variable (name=value); may be repeated
        #[arg(short = 'v', long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Template syntax version: 1, 2 or latest
        #[arg(long, env = "SECRETINJECT_TEMPLATE_VERSION")]
        template_version: Option<String>,
        /// Secret source to fetch values from
        #[arg(short, long, env = "SECRETINJECT_SOURCE")]
        source: Option<String>,
        /// Command and arguments to run
        #[arg(trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Init or show ~/.config/secretinject/config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration-related subcommands.
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Initialize user configuration
    Init,
    /// Show current configuration
    Show,
}

fn parse_file_mode(mode: &str) -> std::result::Result<u32, String> {
    u32::from_str_radix(mode, 8).map_err(|e| format!("invalid octal file mode '{}': {}", mode, e))
}

/// Appends a newline unless the text already ends with one.
fn with_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Logs go to stderr so injected output on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secretinject=warn,secretinject_tpl=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_template(in_file: Option<&Path>) -> crate::Result<String> {
    if let Some(path) = in_file {
        return Ok(fs::read_to_string(path)?);
    }

    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(SecretInjectError::NoDataOnStdin);
    }
    let mut raw = String::new();
    stdin.read_to_string(&mut raw)?;
    Ok(raw)
}

/// Writes `content` to `path`, applying `mode` only when the file is created.
///
/// Returns `false` when the user declined to overwrite an existing file.
fn write_output(path: &Path, content: &str, mode: u32, force: bool) -> crate::Result<bool> {
    let existed = path.exists();
    if existed && !force {
        if !io::stdout().is_terminal() {
            return Err(SecretInjectError::FileAlreadyExists(
                path.display().to_string(),
            ));
        }

        let overwrite = inquire::Confirm::new(&format!(
            "File {} already exists, overwrite it?",
            path.display()
        ))
        .with_default(false)
        .prompt()?;
        if !overwrite {
            return Ok(false);
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true);
    if existed {
        options.truncate(true);
    } else {
        // mode applies to newly created files only
        options.create_new(true);
        #[cfg(unix)]
        options.mode(mode);
    }
    let mut file = options.open(path)?;

    // creation mode is masked by the umask
    #[cfg(unix)]
    {
        if !existed {
            file.set_permissions(fs::Permissions::from_mode(mode))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    file.write_all(content.as_bytes())?;

    Ok(true)
}

/// Main entry point for the secretinject CLI application.
pub fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = GlobalConfig::load()
        .wrap_err("Failed to load secretinject configuration")?
        .unwrap_or_default();

    match cli.command {
        Commands::Inject {
            in_file,
            file,
            file_mode,
            force,
            vars,
            template_version,
            source,
        } => {
            let raw = read_template(in_file.as_deref())?;
            let vars = Variables::from_process_env().with_pairs(vars).build()?;
            let parser = parser_for(&config.template_version_or_default(template_version))?;
            let source = Box::<dyn SecretSource>::try_from(config.source_or_default(source))?;

            let injected = inject(&raw, parser.as_ref(), &vars, source.as_ref())
                .wrap_err("Failed to inject secrets")?;
            let out = with_trailing_newline(injected);

            match file {
                Some(path) => {
                    if !write_output(&path, &out, file_mode, force)? {
                        println!("{}", "Aborting.".yellow());
                        return Ok(());
                    }
                    let absolute = fs::canonicalize(&path)?;
                    println!("{}", absolute.display());
                }
                None => print!("{}", out),
            }
            Ok(())
        }
        Commands::Run {
            envar_file,
            vars,
            template_version,
            source,
            command,
        } => {
            if command.is_empty() {
                return Err(SecretInjectError::NoCommand.into());
            }

            let vars = Variables::from_process_env().with_pairs(vars).build()?;
            let parser = parser_for(&config.template_version_or_default(template_version))?;
            let source = Box::<dyn SecretSource>::try_from(config.source_or_default(source))?;

            let envar_file = envar_file.or_else(|| {
                let default = PathBuf::from(DEFAULT_ENV_FILE);
                default.exists().then_some(default)
            });
            let raw = match &envar_file {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };

            let env = RunEnv {
                process_env: std::env::vars().collect(),
                env_file: raw.as_deref(),
                parser: parser.as_ref(),
                vars: &vars,
            }
            .resolve(source.as_ref())
            .wrap_err("Failed to resolve environment")?;

            let code = run(&command, &env).wrap_err("Failed to run command")?;
            std::process::exit(code);
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => {
                use inquire::Select;

                let source_choices: Vec<String> = sources()
                    .into_iter()
                    .map(|info| info.display_with_examples())
                    .collect();
                let selected_choice =
                    Select::new("Select your default secret source:", source_choices).prompt()?;
                let source = selected_choice
                    .split(':')
                    .next()
                    .unwrap_or(crate::DEFAULT_SOURCE);

                let versions = vec!["latest", "2", "1"];
                let template_version = Select::new("Select the template version:", versions)
                    .with_help_message("'latest' follows the newest syntax")
                    .prompt()?;

                let config = GlobalConfig {
                    defaults: GlobalDefaults {
                        source: Some(source.to_string()),
                        template_version: Some(template_version.to_string()),
                    },
                };
                config.save()?;
                println!(
                    "\n{} Configuration saved to {}",
                    "✓".green(),
                    GlobalConfig::path()?.display()
                );
                Ok(())
            }
            ConfigAction::Show => {
                match GlobalConfig::load()? {
                    Some(config) => {
                        println!("Configuration file: {}\n", GlobalConfig::path()?.display());
                        match config.defaults.source {
                            Some(source) => println!("Source:           {}", source),
                            None => println!("Source:           (none)"),
                        }
                        match config.defaults.template_version {
                            Some(version) => println!("Template version: {}", version),
                            None => println!("Template version: (none)"),
                        }
                    }
                    None => {
                        println!(
                            "{} No configuration found. Run 'secretinject config init' to create one.",
                            "!".yellow()
                        );
                    }
                }
                Ok(())
            }
        },
    }
}
