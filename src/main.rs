use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_notes::models::{EditField, ImageUpload, NoteForm, NoteId};
use food_notes::{auth, config, render, server, HttpController};

#[derive(Parser)]
#[command(name = "fnotes")]
#[command(about = "Keep a priced list of food notes with optional photos")]
struct Cli {
    /// Path to the config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Notes(NoteCommand),
    /// Sign in by storing a bearer token
    Login {
        #[arg(long)]
        token: String,
    },
    /// Sign out by forgetting the stored token
    Logout,
    /// Run the in-memory mock backend
    Serve {
        /// Port for the GraphQL and storage endpoints
        #[arg(short, long, default_value = "17020")]
        port: u16,
    },
}

/// Commands that need a signed-in connection to the backend.
#[derive(Subcommand)]
enum NoteCommand {
    /// Show every note and the total price
    List,
    /// Add a note, optionally uploading an image
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Price, e.g. 4.50
        #[arg(long, allow_hyphen_values = true)]
        price: String,
        /// Image file, stored under its own file name
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change a note's name, description or price in one update
    #[command(group(
        ArgGroup::new("fields")
            .required(true)
            .multiple(true)
            .args(["name", "description", "price"])
    ))]
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        price: Option<String>,
    },
    /// Delete a note and its image
    Delete { id: String },
    /// Print the total price
    Total,
}

/// Initialize tracing with output to stderr (client commands) or stdout
fn init_tracing(verbose: u8, use_stderr: bool) {
    let default = match verbose {
        0 => "food_notes=info,tower_http=info",
        1 => "food_notes=debug,tower_http=debug",
        _ => "food_notes=trace,tower_http=trace",
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    if use_stderr {
        // Client output goes to stdout, keep logs out of it
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, Commands::Serve { .. });
    init_tracing(cli.verbose, use_stderr);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    match cli.command {
        Commands::Serve { port } => {
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            server::serve(server::MockBackend::new(), addr).await?;
        }
        Commands::Login { token } => {
            auth::sign_in(&config_path, &token)?;
            println!("Signed in.");
        }
        Commands::Logout => {
            if auth::sign_out(&config_path)? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Commands::Notes(command) => {
            let controller = connect(&config_path)?;
            run_note_command(&controller, command).await?;
        }
    }

    Ok(())
}

fn connect(config_path: &Path) -> anyhow::Result<HttpController> {
    let config = config::Config::load(Some(config_path))?;
    let credentials = auth::require(&config)?;
    tracing::debug!(api = %config.api_url, storage = %config.storage_url, "connecting");
    Ok(food_notes::connect(&config, &credentials))
}

async fn run_note_command(controller: &HttpController, command: NoteCommand) -> anyhow::Result<()> {
    controller
        .fetch_all()
        .await
        .map_err(explain)
        .context("Failed to load notes")?;

    match command {
        NoteCommand::List => {}
        NoteCommand::Total => {
            println!("Total Price: ${}", controller.total_price());
            return Ok(());
        }
        NoteCommand::Add {
            name,
            description,
            price,
            image,
        } => {
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let created = controller
                .create(NoteForm {
                    name,
                    description,
                    price,
                    image,
                })
                .await
                .map_err(explain)?;
            println!("Created note {}", created.id);
        }
        NoteCommand::Edit {
            id,
            name,
            description,
            price,
        } => {
            let id = NoteId::new(id);
            controller.begin_edit(&id)?;
            for (field, value) in [
                (EditField::Name, name),
                (EditField::Description, description),
                (EditField::Price, price),
            ] {
                if let Some(value) = value {
                    controller.set_draft(field, value)?;
                }
            }
            controller.commit_edit().await.map_err(explain)?;
            println!("Updated note {}", id);
        }
        NoteCommand::Delete { id } => {
            let id = NoteId::new(id);
            controller.delete_by_id(&id).await.map_err(explain)?;
            println!("Deleted note {}", id);
        }
    }

    print!("\n{}", render::render_state(&controller.snapshot()));
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Image path has no file name: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageUpload::new(file_name, bytes))
}

/// Point signed-out users at `fnotes login`.
fn explain(e: food_notes::NotesError) -> anyhow::Error {
    if e.is_unauthorized() {
        anyhow::Error::new(e).context("The backend rejected the token; run `fnotes login` again")
    } else {
        anyhow::Error::new(e)
    }
}
