//! Main entry point for the anymaps binary
//!
//! A command line front end over the job controller, wired to the real
//! HTTP client and a directory-backed artifact store.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tokio::signal;

use controller::{
    core::DisplayState,
    services::{RealArtifactStore, RealMapApi},
    ClientConfig, ControllerError, ControllerResult, FormFields, JobController, MapApi,
};
use shared::{component_debug, component_info, component_warn, logging, Component, JobState, LocationType};

/// Client for the map rendering server
#[derive(Parser)]
#[command(name = "anymaps")]
#[command(about = "Generate relief maps on a rendering server and manage the results")]
pub struct Cli {
    /// Server base URL (overrides ANYMAPS_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Request timeout in seconds (overrides ANYMAPS_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory downloaded maps are written to (overrides ANYMAPS_OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a map and follow it until it finishes
    Generate {
        #[command(flatten)]
        form: FormArgs,

        /// Do not download the finished map
        #[arg(long)]
        no_download: bool,
    },
    /// Show the current job status
    Status,
    /// List previously generated maps
    History,
    /// Show or change the server defaults
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Download a map by filename
    Download {
        filename: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the server defaults
    Show,
    /// Save new server defaults, starting from the current ones
    Set {
        #[command(flatten)]
        form: FormArgs,
    },
}

/// Overrides applied on top of the server defaults
#[derive(Args, Clone, Default)]
pub struct FormArgs {
    /// Location name, e.g. "Greece"
    #[arg(long)]
    pub name: Option<String>,

    /// Location type: country or region
    #[arg(long = "type")]
    pub location_type: Option<LocationType>,

    /// Parent country for a region; pass "" for none
    #[arg(long)]
    pub parent: Option<String>,

    /// Low elevation color as #rrggbb
    #[arg(long)]
    pub low: Option<String>,

    /// High elevation color as #rrggbb
    #[arg(long)]
    pub high: Option<String>,
}

impl FormArgs {
    fn apply(self, mut fields: FormFields) -> FormFields {
        if let Some(name) = self.name {
            fields.location_name = name;
        }
        if let Some(location_type) = self.location_type {
            fields.location_type = location_type;
        }
        if let Some(parent) = self.parent {
            fields.parent_country = parent;
        }
        if let Some(low) = self.low {
            fields.low_color = low;
        }
        if let Some(high) = self.high {
            fields.high_color = high;
        }
        fields
    }
}

fn load_config(cli: &Cli) -> ControllerResult<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(server) = &cli.server {
        config = config.with_server_url(server)?;
    }
    if let Some(secs) = cli.timeout {
        if secs == 0 {
            return Err(ControllerError::config("--timeout must be greater than zero"));
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(output) = &cli.output {
        config = config.with_output_dir(output);
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ControllerResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    logging::init_tracing_with_level(Some(&config.log_level));
    component_debug!(
        Component::Cli,
        "Server: {}, timeout: {:?}, output: {}",
        config.server_url,
        config.request_timeout,
        config.output_dir.display()
    );

    let api = RealMapApi::new(&config)?;
    let store = RealArtifactStore::new(config.output_dir.clone());

    let result = match cli.command {
        Command::Generate { form, no_download } => generate(api, store, form, !no_download).await,
        Command::Status => show_status(&api).await,
        Command::History => show_history(api, store).await,
        Command::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => show_config(&api).await,
            ConfigAction::Set { form } => set_config(api, store, form).await,
        },
        Command::Download { filename } => {
            let controller = JobController::new(api, store);
            controller.download(&filename).await.map(|path| {
                println!("{}", path.display());
            })
        }
    };

    if let Err(e) = &result {
        logging::log_error(Component::Cli, "Command", e);
    }
    result
}

async fn generate(
    api: RealMapApi,
    store: RealArtifactStore,
    form: FormArgs,
    download: bool,
) -> ControllerResult<()> {
    let controller = JobController::new(api, store);
    controller.start().await?;

    let fields = form.apply(controller.form_defaults()?);
    controller.submit(&fields).await?;
    component_info!(Component::Cli, "⏳ Waiting for '{}' to render", fields.location_name);

    let mut updates = controller.subscribe();
    let follow = async {
        let mut last_message = String::new();
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if let DisplayState::Generating { message } = snapshot.display() {
                if message != last_message {
                    logging::log_progress(Component::Cli, "Job", &message);
                    last_message = message;
                }
            }
            if snapshot.is_settled() || updates.changed().await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = follow => {}
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => logging::log_shutdown(Component::Cli, "Received Ctrl+C signal"),
                Err(err) => logging::log_error(Component::Cli, "Signal handling", &err),
            }
            controller.shutdown();
            return Ok(());
        }
    }

    let snapshot = controller.wait_until_settled().await;
    match snapshot.status.status {
        JobState::Complete => {
            logging::log_success(Component::Cli, &snapshot.status.message);
            if controller.is_selection_dangling() {
                component_warn!(Component::Cli, "Finished map is not listed in the server history yet");
            }
            if download {
                let path = controller.download_selected().await?;
                println!("{}", path.display());
            } else if let Some(filename) = &snapshot.selection {
                println!("{filename}");
            }
            Ok(())
        }
        JobState::Error => Err(ControllerError::JobFailed {
            message: snapshot.status.message,
        }),
        other => Err(ControllerError::JobFailed {
            message: format!("job stopped in state '{other}'"),
        }),
    }
}

async fn show_status(api: &RealMapApi) -> ControllerResult<()> {
    let status = api.fetch_status().await?;
    match &status.current_file {
        Some(file) => println!("{}: {} ({})", status.status, status.message, file),
        None => println!("{}: {}", status.status, status.message),
    }
    Ok(())
}

async fn show_history(api: RealMapApi, store: RealArtifactStore) -> ControllerResult<()> {
    let controller = JobController::new(api, store);
    let entries = controller.refresh_history().await?;
    if entries.is_empty() {
        println!("No maps generated yet");
    }
    for entry in entries {
        let when = entry
            .modified_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let size = entry
            .size
            .map(|bytes| format!("{:.1} KiB", bytes as f64 / 1024.0))
            .unwrap_or_default();
        let saved = if controller.is_downloaded(&entry.filename).await { "saved" } else { "" };
        println!("{:<32} {:<24} {} {:>10} {}", entry.filename, entry.name, when, size, saved);
    }
    Ok(())
}

async fn show_config(api: &RealMapApi) -> ControllerResult<()> {
    let config = api.fetch_config().await?;
    let fields = FormFields::from_configuration(&config);
    println!("location_name:  {}", fields.location_name);
    println!("location_type:  {}", fields.location_type);
    println!("parent_country: {}", config.parent_country.as_deref().unwrap_or("-"));
    println!("low_color:      {}", fields.low_color);
    println!("high_color:     {}", fields.high_color);
    Ok(())
}

async fn set_config(api: RealMapApi, store: RealArtifactStore, form: FormArgs) -> ControllerResult<()> {
    let controller = JobController::new(api, store);
    controller.load_configuration().await?;
    let fields = form.apply(controller.form_defaults()?);
    controller.save_configuration(&fields).await?;
    println!("Saved defaults for {}", fields.location_name);
    Ok(())
}
