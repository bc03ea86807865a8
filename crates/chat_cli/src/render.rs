use chat_core::{ChatMessage, ContextKind, Session, User};
use chat_state::{ContextSelector, Notice, NoticeLevel};
use colored::Colorize;

pub fn print_user(user: &User) {
    println!(
        "{} {} <{}> ({})",
        "👤".cyan(),
        user.display_name.bold(),
        user.email,
        user.role.as_str()
    );
}

pub fn print_sessions(sessions: &[Session], current: Option<&str>) {
    if sessions.is_empty() {
        println!("{}", "No chat sessions yet".dimmed());
        return;
    }
    for session in sessions {
        let marker = if current == Some(session.id.as_str()) {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "{} {}  {}  {}",
            marker,
            session.id.dimmed(),
            session.name.bold(),
            format!(
                "{} messages, updated {}",
                session.message_count,
                session.updated_at.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        );
    }
}

pub fn print_documents(selector: &ContextSelector) {
    if selector.candidates().is_empty() {
        println!("{}", "No documents uploaded".dimmed());
        return;
    }
    for doc in selector.candidates() {
        let marker = if selector.is_selected(&doc.id) {
            "[x]".green()
        } else {
            "[ ]".normal()
        };
        println!(
            "{} {}  {}  {}",
            marker,
            doc.id.dimmed(),
            doc.filename.bold(),
            format!("{} pages, {} KB", doc.page_count, doc.file_size / 1024).dimmed()
        );
    }
}

pub fn print_message(message: &ChatMessage) {
    println!("{} {}", "You:".cyan().bold(), message.message);
    if message.is_pending() {
        println!("{}", "Assistant: ...".dimmed());
        return;
    }
    println!("{} {}", "Assistant:".green().bold(), message.response);
    if message.context_kind == ContextKind::DocumentGrounded {
        let sources = message.metadata.sources();
        let label = if sources.is_empty() {
            message.metadata.document_ids().join(", ")
        } else {
            sources
                .iter()
                .map(|source| source.filename.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{}", format!("📄 Grounded in: {}", label).dimmed());
    }
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => eprintln!("{}", notice.text.normal()),
        NoticeLevel::Success => eprintln!("{}", format!("✅ {}", notice.text).green()),
        NoticeLevel::Error => eprintln!("{}", format!("❌ {}", notice.text).red()),
        NoticeLevel::Loading => eprintln!("{}", format!("⏳ {}", notice.text).yellow()),
    }
}
