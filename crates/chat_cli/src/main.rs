mod interactive;
mod logging;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chat_client::{ApiClient, ChatBackend, CredentialStore, FileCredentialStore, Registration};
use chat_core::{Config, DocumentUpload, UserRole, MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};
use chat_state::{ChatController, ChatError, Notice, NoticeLevel, ValidationError};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with your documents from the terminal")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides config and API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => UserRole::Student,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an identity-provider ID token
    Login {
        #[arg(long)]
        token: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value = "student")]
        role: RoleArg,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List chat sessions
    Sessions,
    /// Create a chat session
    NewSession {
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a chat session
    DeleteSession { id: String },
    /// Show the messages of a session
    History { id: String },
    /// Send a single message
    Send {
        /// Session to send in; a new one is created when omitted
        #[arg(long)]
        session: Option<String>,
        /// Ground the answer in this document (repeatable)
        #[arg(long = "doc")]
        docs: Vec<String>,
        /// Message content
        text: String,
    },
    /// List uploaded documents
    Docs,
    /// Upload a PDF
    Upload { path: PathBuf },
    /// Delete an uploaded document
    DeleteDoc { id: String },
    /// Start interactive chat
    Chat {
        #[arg(long)]
        session: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = Config::load();
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    log::debug!("Using API base {}", config.api_base);

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::open(&config.data_dir()));
    let client = ApiClient::new(config, credentials).context("Failed to build HTTP client")?;
    let auth_events = client.auth_events().subscribe();
    let mut controller = ChatController::new(Arc::new(client.clone()), auth_events);
    let mut notices = controller.notifier().subscribe();

    let result = run(cli.command, &client, &mut controller).await;

    let shown_errors = print_notices(&mut notices);
    if controller.drain_auth_events() {
        eprintln!(
            "{}",
            "🔒 Your session has expired. Run `docchat login --token <ID_TOKEN>`.".yellow()
        );
        std::process::exit(1);
    }
    if let Err(err) = result {
        if shown_errors == 0 {
            eprintln!("{}", format!("❌ {:#}", err).red());
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    command: Commands,
    client: &ApiClient,
    controller: &mut ChatController,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { token } => {
            let user = controller.login(&token).await?;
            render::print_user(&user);
        }
        Commands::Register {
            email,
            password,
            name,
            role,
        } => {
            let registration = Registration {
                email,
                secret: password,
                display_name: name,
                role: role.into(),
            };
            let user = controller.register(&registration).await?;
            render::print_user(&user);
        }
        Commands::Logout => {
            controller.logout()?;
            println!("{}", "👋 Logged out".cyan());
        }
        Commands::Whoami => {
            if client.credentials().token().is_none() {
                return Err(anyhow!("Not logged in"));
            }
            let user = client.verify().await.map_err(ChatError::from)?;
            render::print_user(&user);
        }
        Commands::Sessions => {
            controller.sessions().list().await?;
            let state = controller.store().snapshot();
            render::print_sessions(&state.sessions, state.current_session_id.as_deref());
        }
        Commands::NewSession { name } => {
            let session = controller.sessions().create(name.as_deref()).await?;
            println!("{} {}", "Created".green(), session.id.bold());
        }
        Commands::DeleteSession { id } => {
            controller.sessions().delete(&id).await?;
        }
        Commands::History { id } => {
            controller.sessions().load_history(&id).await?;
            let messages = controller.store().read(|state| state.history(&id).to_vec());
            if messages.is_empty() {
                println!("{}", "No messages yet".dimmed());
            }
            for message in &messages {
                render::print_message(message);
                println!();
            }
        }
        Commands::Send {
            session,
            docs,
            text,
        } => {
            if let Some(id) = session {
                use_session(controller, &id).await?;
            }
            if !docs.is_empty() {
                controller.documents().load().await?;
                for doc in &docs {
                    if !controller.documents().toggle(doc) {
                        return Err(anyhow!("Unknown document: {}", doc));
                    }
                }
            }
            let message = controller.pipeline().submit(&text).await?;
            render::print_message(&message);
        }
        Commands::Docs => {
            controller.documents().load().await?;
            controller
                .store()
                .read(|state| render::print_documents(&state.selector));
        }
        Commands::Upload { path } => {
            let upload = read_upload(&path).await?;
            let uploaded = controller.uploads().upload(upload).await?;
            println!(
                "{} {}",
                uploaded.document.id.bold(),
                uploaded.document.filename
            );
        }
        Commands::DeleteDoc { id } => {
            controller.documents().delete(&id).await?;
        }
        Commands::Chat { session } => {
            interactive::run_interactive_chat(controller, session).await?;
        }
    }
    Ok(())
}

/// Load the directory and make `id` current.
pub(crate) async fn use_session(controller: &ChatController, id: &str) -> anyhow::Result<()> {
    controller.sessions().list().await?;
    controller.sessions().select(id).await?;
    Ok(())
}

/// Load a file for upload. Type and size are checked from the file name and
/// metadata first, so an oversized file is never read.
pub(crate) async fn read_upload(path: &Path) -> anyhow::Result<DocumentUpload> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    let media_type = DocumentUpload::media_type_for(&filename);
    if media_type != PDF_MEDIA_TYPE {
        let err = ValidationError::InvalidFileType {
            media_type: media_type.to_string(),
        };
        return Err(ChatError::from(err).into());
    }

    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?
        .len();
    if size > MAX_UPLOAD_BYTES {
        let err = ValidationError::FileTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        };
        return Err(ChatError::from(err).into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(DocumentUpload::new(filename, media_type, bytes))
}

/// Print queued notices; returns how many were errors.
pub(crate) fn print_notices(rx: &mut broadcast::Receiver<Notice>) -> usize {
    let mut errors = 0;
    while let Ok(notice) = rx.try_recv() {
        if notice.level == NoticeLevel::Error {
            errors += 1;
        }
        render::print_notice(&notice);
    }
    errors
}
