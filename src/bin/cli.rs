//! Mockup Studio CLI
//!
//! One-shot commands against the mockup backend:
//! - Check the backend
//! - List and show mockups
//! - Generate a mockup from a prompt
//! - Submit a mockup to the issue tracker
//! - Show the tracker board

use clap::{Parser, Subcommand};
use mockup_studio::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mockup-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "One-shot commands for the mockup backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (default: from config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the backend is running
    Health,

    /// List past projects
    Projects,

    /// Show one mockup
    Show {
        /// Mockup id
        id: String,
        /// Print the HTML source
        #[arg(long)]
        html: bool,
    },

    /// Generate a mockup directly from a prompt
    Generate {
        /// What to build
        prompt: String,
        /// Project name
        #[arg(short, long, default_value = "")]
        name: String,
        /// Write the HTML into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create tracker tickets from a mockup
    Submit {
        /// Mockup id
        id: String,
    },

    /// Show the tracker board
    Board {
        /// Filter (all, todo, inprogress, done)
        #[arg(long, default_value = "all")]
        filter: TicketFilter,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_default();
    if let Some(url) = cli.api_url.clone() {
        config.api.base_url = url;
    }
    logging::init(&config.logging);

    let backend = Arc::new(ApiClient::from_config(&config)?);
    let json = cli.format == "json";

    match cli.command {
        Commands::Health => match backend.health().await {
            Ok(()) => println!("Backend at {} is healthy", config.api.base_url),
            Err(e) => {
                eprintln!("Cannot connect to the mockup backend at {}", config.api.base_url);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Projects => {
            let projects = ProjectList::new(backend).load().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else if projects.is_empty() {
                println!("No projects yet.");
                println!();
                println!("Create your first mockup with:");
                println!("  mockup-cli generate \"a todo app\" --name Todo");
            } else {
                println!("{:<26} {:<30} {}", "ID", "Project", "Created");
                println!("{}", "-".repeat(76));
                for p in projects {
                    println!("{:<26} {:<30} {}", p.id, p.project_name, p.created_display());
                }
            }
        }

        Commands::Show { id, html } => {
            let mockup = ProjectList::new(backend).open(&id).await?.into_mockup();
            if json {
                println!("{}", serde_json::to_string_pretty(&mockup)?);
            } else if html {
                println!("{}", mockup.html_content);
            } else {
                println!("{} ({})", mockup.project_name, mockup.id);
                println!("Generated: {}", mockup.created_display());
                println!("Prompt: {}", mockup.prompt);
                println!("HTML: {} bytes", mockup.html_content.len());
                println!("Feedback: {} comment(s)", mockup.feedback.len());
            }
        }

        Commands::Generate { prompt, name, output } => {
            eprintln!("Generating...");
            let handoff = ProjectList::new(Arc::clone(&backend)).generate(&prompt, &name).await?;
            let mockup = handoff.mockup().clone();
            println!("Generated {} ({})", mockup.project_name, mockup.id);

            if let Some(dir) = output {
                let viewer = MockupViewer::new(backend, handoff);
                let path = viewer.download(&dir).await?;
                println!("Written to {:?}", path);
            }
        }

        Commands::Submit { id } => {
            let report = TicketSubmission::new(backend).submit(&id).await?;
            println!("{}", report.summary());
            for outcome in &report.outcomes {
                match outcome {
                    TicketOutcome::Created {
                        title,
                        issue_key,
                        issue_url,
                        ..
                    } => println!(
                        "  created {:<10} {} {}",
                        issue_key,
                        title,
                        issue_url.as_deref().unwrap_or("")
                    ),
                    TicketOutcome::Failed { title, error } => {
                        println!("  failed  {:<10} {}: {}", "", title, error)
                    }
                }
            }
        }

        Commands::Board { filter } => {
            let board = TrackerBoard::new(backend);
            board.set_filter(filter);
            match board.refresh().await? {
                BoardState::NotConnected { reason } => {
                    eprintln!("Issue tracker not connected: {}", reason);
                    std::process::exit(1);
                }
                BoardState::Error { message } => {
                    eprintln!("Failed to load tickets: {}", message);
                    std::process::exit(1);
                }
                BoardState::Idle | BoardState::Loaded { .. } => {
                    let visible = board.visible();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&visible)?);
                    } else if visible.is_empty() {
                        println!("No tickets found.");
                    } else {
                        println!("{:<10} {:<14} {:<8} {}", "Key", "Status", "Priority", "Summary");
                        println!("{}", "-".repeat(76));
                        for t in visible {
                            println!("{:<10} {:<14} {:<8} {}", t.key, t.status, t.priority, t.summary);
                        }
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = mockup_studio::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}
