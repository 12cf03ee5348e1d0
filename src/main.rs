//! Mockup Studio
//!
//! Interactive terminal front end: chat about a product, review the
//! generated mockup, edit it, and submit it to the issue tracker.

use anyhow::Context;
use clap::Parser;
use mockup_studio::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "mockup-studio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat your way to an HTML mockup, then refine it and file tickets")]
struct Args {
    /// Config file (default: standard locations, then environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend URL, overriding the config
    #[arg(long)]
    api_url: Option<String>,
}

const DASHBOARD_HELP: &str = "Type a message to chat. Commands: /new, /projects, /open <id>, \
/generate <name> :: <prompt>, /board, /quit";
const VIEWER_HELP: &str = "Type an instruction to edit. Commands: /save, /refine, /feedback, \
/comment <text>, /refine-feedback, /simulate, /code, /preview, /download [dir], /submit, /back";
const BOARD_HELP: &str = "Commands: /refresh, /filter <all|todo|inprogress|done>, /back";

struct Studio {
    backend: Arc<ApiClient>,
    store: Store,
    chat: ConversationController<ApiClient>,
    projects: ProjectList<ApiClient>,
    submission: TicketSubmission<ApiClient>,
    board: TrackerBoard<ApiClient>,
    viewer: Option<MockupViewer<ApiClient>>,
    chat_printed: usize,
    viewer_printed: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }

    logging::init(&config.logging);
    tracing::info!("Mockup Studio v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.api.base_url);

    let gate = AuthGate::new(ConfiguredIdentity::new(config.auth.clone()));
    let user = match gate.view().await {
        GateView::Loading => {
            println!("Checking sign-in status...");
            return Ok(());
        }
        GateView::Login { redirect_url } => {
            println!("Sign in to get started.");
            match redirect_url {
                Some(url) => println!("Open {} and set MOCKUP_STUDIO_ACCESS_TOKEN to the issued token.", url),
                None => println!("No identity provider configured; set [auth] in the config file."),
            }
            return Ok(());
        }
        GateView::App { user } => user,
    };

    let backend = Arc::new(ApiClient::from_config(&config).context("building HTTP client")?);
    let mut studio = Studio {
        store: Store::new(),
        chat: ConversationController::new(Arc::clone(&backend), &config.chat),
        projects: ProjectList::new(Arc::clone(&backend)),
        submission: TicketSubmission::new(Arc::clone(&backend)),
        board: TrackerBoard::new(Arc::clone(&backend)),
        viewer: None,
        chat_printed: 0,
        viewer_printed: 0,
        backend,
    };
    studio.store.dispatch(Action::AuthChanged(AuthState::Authenticated(user.clone())));

    println!("Welcome, {}!", user.name);
    studio.show_projects().await;
    studio.print_chat();
    println!("{}", DASHBOARD_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        match studio.store.state().view {
            View::Dashboard => studio.dashboard(line).await,
            View::Viewer => studio.viewer(line).await,
            View::TrackerBoard => studio.board(line).await,
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}

impl Studio {
    async fn dashboard(&mut self, line: &str) {
        let (cmd, rest) = split_command(line);
        match cmd {
            Some("new") => {
                self.chat.reset_conversation();
                self.store.dispatch(Action::ConversationReset);
                self.chat_printed = 0;
                self.print_chat();
            }
            Some("projects") => self.show_projects().await,
            Some("open") => match self.projects.open(rest).await {
                Ok(handoff) => self.open_viewer(handoff).await,
                Err(e) => println!("Failed to load project: {}", e.user_message()),
            },
            Some("generate") => {
                let (name, prompt) = rest.split_once("::").unwrap_or(("", rest));
                println!("Generating...");
                match self.projects.generate(prompt, name).await {
                    Ok(handoff) => self.open_viewer(handoff).await,
                    Err(e) => println!("Generation failed: {}", e.user_message()),
                }
            }
            Some("board") => {
                self.store.dispatch(Action::ShowTrackerBoard);
                self.refresh_board().await;
                println!("{}", BOARD_HELP);
            }
            Some(other) => println!("Unknown command /{}. {}", other, DASHBOARD_HELP),
            None => {
                println!("Thinking...");
                let result = self.chat.send_turn(line).await;
                if let Some(id) = self.chat.conversation_id() {
                    self.store.dispatch(Action::ConversationStarted(id));
                }
                self.print_chat();
                match result {
                    Ok(SendOutcome::ArtifactReady(handoff)) => self.open_viewer(handoff).await,
                    Ok(SendOutcome::Replied) => {}
                    Err(_) => {
                        if let Some(error) = self.chat.error() {
                            println!("! {}", error);
                        }
                    }
                }
            }
        }
    }

    async fn viewer(&mut self, line: &str) {
        let Some(viewer) = self.viewer.as_ref() else {
            self.store.dispatch(Action::BackToDashboard);
            return;
        };
        let (cmd, rest) = split_command(line);
        match cmd {
            Some("save") => match viewer.save_changes().await {
                Ok(mockup) => {
                    println!("Saved.");
                    self.store.dispatch(Action::ArtifactSaved(mockup));
                }
                Err(e) => println!("! {}", e.user_message()),
            },
            Some("refine") => {
                println!("Refining...");
                match viewer.refine().await {
                    Ok(()) => {
                        println!("Refined. Use /save to keep it.");
                        self.store.dispatch(Action::ArtifactEdited);
                    }
                    Err(e) => println!("! {}", e.user_message()),
                }
            }
            Some("refine-feedback") => match viewer.refine_with_feedback().await {
                Ok(()) => {
                    println!("Refined from feedback. Use /save to keep it.");
                    self.store.dispatch(Action::ArtifactEdited);
                }
                Err(e) => println!("! {}", e.user_message()),
            },
            Some("feedback") => match viewer.load_feedback().await {
                Ok(items) if items.is_empty() => println!("No feedback yet. Be the first to comment!"),
                Ok(items) => {
                    for item in items {
                        println!("- {} ({}): {}", item.author, item.timestamp, item.text);
                    }
                }
                Err(e) => println!("! {}", e.user_message()),
            },
            Some("comment") => match viewer.add_feedback(rest, "").await {
                Ok(items) => println!("Thanks! {} comment(s) on this mockup.", items.len()),
                Err(e) => println!("! {}", e.user_message()),
            },
            Some("simulate") => {
                println!("Asking simulated stakeholders...");
                match viewer.simulate_feedback().await {
                    Ok(items) => {
                        for item in items {
                            println!("[{}] {}: {}", item.category, item.title, item.description);
                        }
                    }
                    Err(e) => println!("! {}", e.user_message()),
                }
            }
            Some("code") => {
                viewer.set_view(ViewMode::Code);
                println!("{}", viewer.html());
            }
            Some("preview") => {
                viewer.set_view(ViewMode::Preview);
                print_preview(&viewer.artifact(), viewer.is_dirty());
            }
            Some("download") => {
                let dir = if rest.is_empty() { PathBuf::from(".") } else { PathBuf::from(rest) };
                match viewer.download(&dir).await {
                    Ok(path) => println!("Wrote {}", path.display()),
                    Err(e) => println!("! {}", e.user_message()),
                }
            }
            Some("submit") => {
                let id = viewer.artifact().id;
                println!("Creating tickets...");
                match self.submission.submit(&id).await {
                    Ok(report) => {
                        print_report(&report);
                        self.store.dispatch(Action::TicketsSubmitted { artifact_id: id });
                    }
                    Err(e) => println!("! Failed to create tickets: {}", e.user_message()),
                }
            }
            Some("back") => {
                if viewer.is_dirty() {
                    println!("Leaving with unsaved changes.");
                }
                self.viewer = None;
                self.store.dispatch(Action::BackToDashboard);
                self.show_projects().await;
            }
            Some(other) => println!("Unknown command /{}. {}", other, VIEWER_HELP),
            None => {
                println!("Editing...");
                match viewer.edit_with_instruction(line).await {
                    Ok(EditOutcome::Applied { saved }) => {
                        self.store.dispatch(Action::ArtifactEdited);
                        if saved {
                            self.store.dispatch(Action::ArtifactSaved(viewer.artifact()));
                        }
                    }
                    Ok(EditOutcome::Failed { .. }) => {}
                    Err(e) => println!("! {}", e.user_message()),
                }
                self.print_viewer_turns();
            }
        }
    }

    async fn board(&mut self, line: &str) {
        let (cmd, rest) = split_command(line);
        match cmd {
            Some("refresh") => self.refresh_board().await,
            Some("filter") => match rest.parse::<TicketFilter>() {
                Ok(filter) => {
                    self.board.set_filter(filter);
                    self.print_board();
                }
                Err(e) => println!("! {}", e),
            },
            Some("back") => {
                self.store.dispatch(Action::BackToDashboard);
                self.print_chat();
            }
            _ => println!("{}", BOARD_HELP),
        }
    }

    async fn open_viewer(&mut self, handoff: ArtifactHandoff) {
        let viewer = MockupViewer::new(Arc::clone(&self.backend), handoff.clone());
        print_preview(&viewer.artifact(), false);
        self.viewer = Some(viewer);
        self.viewer_printed = 0;
        self.store.dispatch(Action::ArtifactReady(handoff));
        self.print_viewer_turns();
        println!("{}", VIEWER_HELP);
    }

    async fn show_projects(&self) {
        match self.projects.load().await {
            Ok(projects) if projects.is_empty() => {
                println!("No projects yet. Start chatting to create your first mockup!");
            }
            Ok(projects) => {
                println!("Past projects:");
                for p in projects {
                    println!("  {}  {}  ({})", p.id, p.project_name, p.created_display());
                    println!("      {}", p.prompt_preview());
                }
            }
            Err(e) => println!("(Could not load past projects: {})", e.user_message()),
        }
    }

    async fn refresh_board(&self) {
        println!("Loading tickets...");
        if let Err(e) = self.board.refresh().await {
            println!("! {}", e.user_message());
        }
        self.print_board();
    }

    fn print_board(&self) {
        match self.board.state() {
            BoardState::Idle => println!("Board not loaded."),
            BoardState::NotConnected { reason } => {
                println!("Issue tracker not connected.");
                println!("{}", reason);
            }
            BoardState::Error { message } => println!("! {}", message),
            BoardState::Loaded { .. } => {
                let counts: Vec<String> = TicketFilter::ALL
                    .iter()
                    .map(|f| format!("{} {}", f.label(), self.board.count(*f)))
                    .collect();
                println!("{}", counts.join(" | "));

                let visible = self.board.visible();
                if visible.is_empty() {
                    println!("No tickets found.");
                }
                for t in visible {
                    println!(
                        "{:<10} [{}] {} (priority: {} / {:?}, assignee: {}, updated {})",
                        t.key,
                        t.status,
                        t.summary,
                        t.priority,
                        PriorityClass::of(&t.priority),
                        t.assignee,
                        t.updated_display()
                    );
                    println!("           {}", t.url);
                }
            }
        }
    }

    fn print_chat(&mut self) {
        let transcript = self.chat.transcript();
        // Rolled-back turns shrink the transcript
        self.chat_printed = self.chat_printed.min(transcript.len());
        for turn in &transcript[self.chat_printed..] {
            print_turn(turn);
        }
        self.chat_printed = transcript.len();
    }

    fn print_viewer_turns(&mut self) {
        let Some(viewer) = self.viewer.as_ref() else {
            return;
        };
        let transcript = viewer.transcript();
        for turn in transcript.iter().skip(self.viewer_printed) {
            print_turn(turn);
        }
        self.viewer_printed = transcript.len();
    }
}

fn split_command(line: &str) -> (Option<&str>, &str) {
    match line.strip_prefix('/') {
        Some(cmd) => {
            let (name, rest) = cmd.split_once(' ').unwrap_or((cmd, ""));
            (Some(name), rest.trim())
        }
        None => (None, line),
    }
}

fn print_turn(turn: &ChatTurn) {
    let label = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "*",
    };
    println!("{}> {}", label, turn.display_text());
}

fn print_preview(mockup: &Mockup, dirty: bool) {
    println!(
        "== {} (generated {}){}",
        mockup.project_name,
        mockup.created_display(),
        if dirty { " [unsaved changes]" } else { "" }
    );
    println!("   {} bytes of HTML. /code shows the source, /download saves it.", mockup.html_content.len());
}

fn print_report(report: &SubmissionReport) {
    println!("{}", report.summary());
    for outcome in &report.outcomes {
        match outcome {
            TicketOutcome::Created {
                title,
                issue_key,
                priority_rank,
                difficulty_score,
                issue_url,
            } => {
                print!("  ✓ {} {}", issue_key, title);
                if let Some(rank) = priority_rank {
                    print!(" (priority #{})", rank);
                }
                if let Some(score) = difficulty_score {
                    print!(" (difficulty {:.1})", score);
                }
                println!();
                if let Some(url) = issue_url {
                    println!("    {}", url);
                }
            }
            TicketOutcome::Failed { title, error } => println!("  ✗ {}: {}", title, error),
        }
    }
}
