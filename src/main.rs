//! ragdeck CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use ragdeck::{
    api::BackendClient,
    chat::ChatClient,
    commands::{
        cmd_chat_interactive, cmd_chat_once, cmd_delete_file, cmd_init, cmd_list_files,
        cmd_process_file, cmd_show_config, cmd_status, cmd_upload, cmd_watch, print_config,
        print_files, print_init_result, print_status, print_upload_receipt, print_watch_outcome,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
    proxy,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ragdeck")]
#[command(version, about = "CLI control panel for a RAG document-processing backend", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ragdeck configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and backend reachability
    Status,

    /// Upload a document for processing
    Upload {
        /// Path to the document (pdf, docx, doc, pptx, ppt)
        path: PathBuf,

        /// Follow processing status until it finishes
        #[arg(long)]
        watch: bool,
    },

    /// List files known to the backend
    Files,

    /// Trigger processing of a file already on the backend
    Process {
        /// Filename as listed by 'ragdeck files'
        filename: String,

        /// Follow processing status until it finishes
        #[arg(long)]
        watch: bool,
    },

    /// Delete a file and its derived text/embeddings
    Delete {
        /// Filename as listed by 'ragdeck files'
        filename: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Follow processing status for file identifiers
    Watch {
        /// File identifiers to track
        #[arg(required = true)]
        file_ids: Vec<String>,
    },

    /// Show the backend's embedding configuration
    Config,

    /// Chat with the hosted assistant
    Chat {
        /// Message to send; omit for an interactive session
        message: Option<String>,
    },

    /// Run the local chat proxy service
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if matches!(cli.command, Commands::Init { .. }) {
        return handle_init(cli).await;
    }

    // Handle completions command (doesn't need config or a backend)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "ragdeck", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = load_config(cli.config.as_deref())?;
    let client = BackendClient::new(&config.backend_url)?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Status => {
            let status = cmd_status(&config, &client).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Upload { path, watch } => {
            let receipt = cmd_upload(&client, &path).await?;
            if cli.json && !watch {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                print_upload_receipt(&receipt);
            }

            if watch {
                let outcome = cmd_watch(&client, &[receipt.file_id.clone()]).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    print_watch_outcome(&outcome);
                }
            }
        }

        Commands::Files => {
            let files = cmd_list_files(&client).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                print_files(&files);
            }
        }

        Commands::Process { filename, watch } => {
            let receipt = cmd_process_file(&client, &filename).await?;
            if cli.json && !watch {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                println!("✓ Processing started for \"{}\"", filename);
                println!("  File ID: {}", receipt.file_id);
            }

            if watch {
                let outcome = cmd_watch(&client, &[receipt.file_id.clone()]).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    print_watch_outcome(&outcome);
                }
            }
        }

        Commands::Delete { filename, yes } => {
            let deleted = cmd_delete_file(&client, &filename, |prompt| {
                if yes {
                    true
                } else {
                    dialoguer::Confirm::new()
                        .with_prompt(prompt.to_string())
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                }
            })
            .await?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({"filename": filename, "deleted": deleted})
                );
            } else if deleted {
                println!("✓ \"{}\" and associated files deleted", filename);
            } else {
                println!("Aborted.");
            }
        }

        Commands::Watch { file_ids } => {
            let outcome = cmd_watch(&client, &file_ids).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_watch_outcome(&outcome);
            }
        }

        Commands::Config => {
            let embedding_config = cmd_show_config(&client).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&embedding_config)?);
            } else {
                print_config(&embedding_config);
            }
        }

        Commands::Chat { message } => {
            let chat_client = ChatClient::from_config(&config)?;
            match message {
                Some(message) => {
                    let reply = cmd_chat_once(&chat_client, &message).await?;
                    if cli.json {
                        println!("{}", serde_json::json!({"message": reply}));
                    } else {
                        println!("{}", reply);
                    }
                }
                None => cmd_chat_interactive(&chat_client).await?,
            }
        }

        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.proxy.host = host;
            }
            if let Some(port) = port {
                config.proxy.port = port;
            }
            proxy::serve(config).await?;
        }
    }

    Ok(())
}

async fn handle_init(cli: Cli) -> Result<()> {
    let Commands::Init { force } = cli.command else {
        unreachable!()
    };

    // If the user points --config at a file, init next to it; at a
    // directory, init inside it
    let base_dir = cli.config.map(|path| {
        if path.extension().is_some_and(|ext| ext == "toml") {
            path.parent()
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_base_dir)
        } else {
            path
        }
    });

    let config = cmd_init(base_dir, force).await?;
    print_init_result(&config);
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'ragdeck init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}
