//! gtm-inject: render and check tag manager injection from a config file.
//!
//! ```text
//! gtm.toml ─▶ load_config ─▶ TagInjector::initialize ─▶ install ─▶ Page
//!                                   │                               │
//!                             --route ... ─▶ track_page_view   render_head / render_body
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gtm_injector::config::watcher::ConfigWatcher;
use gtm_injector::config::{load_config, InjectorConfig};
use gtm_injector::observability::init_logging;
use gtm_injector::{InstallOutcome, Page, Route, TagInjector};

#[derive(Parser)]
#[command(name = "gtm-inject")]
#[command(about = "Render Google Tag Manager injection markup", long_about = None)]
struct Cli {
    /// Path to the TOML configuration.
    #[arg(short, long, default_value = "gtm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and print the public runtime config
    Check,
    /// Print the head and body markup for one page load
    Render {
        /// Route visited, as NAME=PATH or PATH (repeatable)
        #[arg(short, long = "route")]
        routes: Vec<Route>,

        /// Render as if the visitor sent Do-Not-Track
        #[arg(long)]
        do_not_track: bool,
    },
    /// Render on start and again whenever the config file changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability);

    tracing::info!(
        path = %cli.config.display(),
        container_id = %config.gtm.container_id,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Check => {
            let handle = TagInjector::initialize(config.gtm)?;
            let public = TagInjector::public_runtime_config(&handle);
            println!("{}", serde_json::to_string_pretty(&public)?);
        }
        Commands::Render {
            routes,
            do_not_track,
        } => {
            println!("{}", render(&config, &routes, do_not_track)?);
        }
        Commands::Watch => watch(cli.config, config).await?,
    }

    Ok(())
}

fn render(config: &InjectorConfig, routes: &[Route], do_not_track: bool) -> Result<String, Box<dyn Error>> {
    let handle = TagInjector::initialize(config.gtm.clone())?;
    let mut injector = TagInjector::new(Page::with_do_not_track(do_not_track));

    let outcome = injector.install(&handle)?;
    if outcome != InstallOutcome::Installed {
        tracing::warn!(?outcome, "Nothing injected");
    }
    for route in routes {
        injector.track_page_view(&handle, route);
    }

    let page = injector.page();
    Ok(format!(
        "<!-- head -->\n{}\n<!-- body -->\n{}",
        page.render_head()?,
        page.render_body()
    ))
}

async fn watch(path: PathBuf, config: InjectorConfig) -> Result<(), Box<dyn Error>> {
    println!("{}", render(&config, &[], false)?);

    let (watcher, mut updates) = ConfigWatcher::new(&path, config);
    // Dropping the watcher stops it.
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(next) = updates.recv() => match render(&next, &[], false) {
                Ok(markup) => println!("{markup}"),
                Err(e) => tracing::error!(error = %e, "Render failed after reload"),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
