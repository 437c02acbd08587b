//! DCAT-AP Catalogue CLI
//!
//! Command-line tool for publishing context broker data models as a DCAT-AP
//! RDF/XML catalogue.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use dcat_catalogue::api::check_api_status;
use dcat_catalogue::config::write_template;
use dcat_catalogue::logging::init_logging;
use dcat_catalogue::{
    CatalogueError, ConfigStore, DeleteOutcome, IdentifierStore, Integrator, TemplateSource,
};

#[derive(Parser)]
#[command(name = "dcat-catalogue")]
#[command(about = "Maintain a DCAT-AP RDF/XML catalogue of context broker datasets")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Configuration file
    #[arg(long, global = true, default_value = "catalogue.toml")]
    config: PathBuf,

    /// RDF/XML catalogue document
    #[arg(long, global = true, default_value = "catalogue.rdf")]
    document: PathBuf,

    /// Store of integrated data-model identifiers
    #[arg(long, global = true, default_value = "integrated.toml")]
    ids: PathBuf,

    /// Custom DCAT-AP template (default: embedded template)
    #[arg(long, global = true, value_name = "FILE")]
    template: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a new catalogue, replacing any existing one
    Integrate(IntegrateArgs),
    /// Add or refresh data models in the existing catalogue
    Modify(ModifyArgs),
    /// Remove data models from the existing catalogue
    Delete(DeleteArgs),
    /// Write a configuration template
    NewConfig(NewConfigArgs),
    /// List the data models published in the catalogue
    ShowIntegrated,
}

#[derive(Args)]
struct IntegrateArgs {
    /// Data models to publish (default: all)
    #[arg(short = 'd', long = "datamodels", num_args = 1..)]
    datamodels: Vec<String>,

    /// Replace an existing catalogue without asking
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args)]
struct ModifyArgs {
    /// Data models to add or refresh ("all" for every configured one)
    #[arg(short = 'd', long = "datamodels", num_args = 1.., required = true)]
    datamodels: Vec<String>,
}

#[derive(Args)]
struct DeleteArgs {
    /// Data models to remove (default: all integrated)
    #[arg(short = 'd', long = "datamodels", num_args = 1..)]
    datamodels: Vec<String>,
}

#[derive(Args)]
struct NewConfigArgs {
    /// Replace an existing configuration file without asking
    #[arg(long)]
    overwrite: bool,
}

/// Ask a yes/no question on stdin; anything but `y` is a no
fn confirm(question: &str) -> Result<bool, CatalogueError> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn integrator(paths: &PathArgs) -> Result<Integrator, CatalogueError> {
    let config = ConfigStore::load(&paths.config)?;
    check_api_status(&config.main_settings()?.api);
    let store = IdentifierStore::load(&paths.ids)?;
    Ok(Integrator::new(
        config,
        store,
        paths.document.clone(),
        TemplateSource::from(paths.template.clone()),
    ))
}

fn run_integrate(paths: &PathArgs, args: IntegrateArgs) -> Result<(), CatalogueError> {
    if paths.document.exists()
        && !args.overwrite
        && !confirm(&format!(
            "{} already exists and will be replaced. Continue?",
            paths.document.display()
        ))?
    {
        eprintln!("Integration cancelled.");
        return Ok(());
    }

    let models = integrator(paths)?.integrate(&args.datamodels)?;
    eprintln!(
        "Integrated {} data models into {}",
        models.len(),
        paths.document.display()
    );
    Ok(())
}

fn run_modify(paths: &PathArgs, args: ModifyArgs) -> Result<(), CatalogueError> {
    let models = integrator(paths)?.modify(&args.datamodels)?;
    eprintln!("Modified {} data models: {}", models.len(), models.join(", "));
    Ok(())
}

fn run_delete(paths: &PathArgs, args: DeleteArgs) -> Result<(), CatalogueError> {
    match integrator(paths)?.delete(&args.datamodels)? {
        DeleteOutcome::Removed(models) => {
            eprintln!("Deleted {} data models: {}", models.len(), models.join(", "));
        }
        DeleteOutcome::CatalogueRemoved => {
            eprintln!("No datasets left, removed {}", paths.document.display());
        }
    }
    Ok(())
}

fn run_new_config(path: &Path, args: NewConfigArgs) -> Result<(), CatalogueError> {
    let overwrite = if path.exists() && !args.overwrite {
        if !confirm(&format!("{} already exists. Overwrite?", path.display()))? {
            eprintln!("Configuration left untouched.");
            return Ok(());
        }
        true
    } else {
        args.overwrite
    };

    write_template(path, overwrite)?;
    eprintln!("Wrote configuration template to {}", path.display());
    Ok(())
}

fn run_show_integrated(paths: &PathArgs) -> Result<(), CatalogueError> {
    let store = IdentifierStore::load(&paths.ids)?;
    for name in store.list_all() {
        println!("{}", name);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let _guard = match init_logging(&cli.log_level, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Integrate(args) => run_integrate(&cli.paths, args),
        Commands::Modify(args) => run_modify(&cli.paths, args),
        Commands::Delete(args) => run_delete(&cli.paths, args),
        Commands::NewConfig(args) => run_new_config(&cli.paths.config, args),
        Commands::ShowIntegrated => run_show_integrated(&cli.paths),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
