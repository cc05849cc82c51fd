use clap::{Parser, Subcommand};
use ng_template_cache::host::{DirHost, run_pass};
use ng_template_cache::{TemplateCache, config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ng-template-cache")]
#[command(about = "Compile HTML templates into an AngularJS $templateCache module")]
#[command(long_about = "\
Compile HTML templates into an AngularJS $templateCache module

Collects the templates matched by `source`, escapes each one into a string
literal and writes a single JavaScript file that registers them all:

  angular.module('templates').run(['$templateCache', function($templateCache) {
  $templateCache.put('home.html','<h1>Home</h1>');
  }]);

Cache keys are the template paths relative to the static part of the glob
pattern (src/app/**/*.html → src/app), prefixed with `root`.

Run 'ng-template-cache gen-config' to generate a documented templates.toml.")]
#[command(version)]
struct Cli {
    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, short, default_value = "templates.toml", global = true)]
    config: PathBuf,

    /// Output directory for the generated module
    #[arg(long, short, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log pass details to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the template cache module
    Build,
    /// Resolve templates and show their cache keys without writing anything
    Check,
    /// Print the generated module to stdout instead of writing it
    Print,
    /// Print a stock templates.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let cache = load_cache(&cli.config)?;
            let mut host = DirHost::new(&cli.output);
            let report = run_pass(&cache, &mut host)?;
            output::print_pass_output(&report, host.out_dir());
        }
        Command::Check => {
            let cache = load_cache(&cli.config)?;
            let files = cache.resolve()?;
            output::print_check_output(&files);
        }
        Command::Print => {
            let cache = load_cache(&cli.config)?;
            print!("{}", cache.assemble()?.output);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_cache(path: &std::path::Path) -> Result<TemplateCache, config::ConfigError> {
    let config = config::load_config(path)?;
    TemplateCache::new(config)
}

/// Logs go to stderr so `print` output stays a clean module.
fn init_tracing(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("ng_template_cache=debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
