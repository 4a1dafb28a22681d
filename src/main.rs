use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use modsolve::{
    cli::args::{CliArgs, Command},
    config::ModsolveConfig,
    Modsolve,
};

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();
    let config = ModsolveConfig::load()?;

    let mut builder = Modsolve::builder();
    if let Some(root) = cli_args.root {
        builder = builder.root(root);
    }
    if let Some(catalog) = cli_args
        .catalog_location
        .map(PathBuf::from)
        .or(config.catalog_path)
    {
        builder = builder.catalog_file_name(catalog);
    }
    if let Some(tenant) = cli_args
        .tenant_location
        .map(PathBuf::from)
        .or(config.tenant_file)
    {
        builder = builder.tenant_file_name(tenant);
    }
    let modsolve = builder.try_build()?;

    match cli_args.cmd {
        Command::Catalog => modsolve.list_modules(),
        Command::Bundles => modsolve.list_bundles(),
        Command::Validate => modsolve.validate(),
        Command::Enable { module } => modsolve.enable(&module),
        Command::Disable { module, yes } => modsolve.disable(&module, yes),
        Command::ApplyBundle { bundle } => modsolve.apply_bundle(&bundle),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
