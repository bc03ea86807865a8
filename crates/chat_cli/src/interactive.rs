use anyhow::Context;
use chat_state::{ChatController, ChatError};
use colored::Colorize;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{print_notices, read_upload, render, use_session};

const HELP: &str = "Commands: /new [name], /use ID, /sessions, /docs, /doc ID, /all, \
/upload PATH, /clear, /help, /quit";

pub async fn run_interactive_chat(
    controller: &mut ChatController,
    session: Option<String>,
) -> anyhow::Result<()> {
    let mut notices = controller.notifier().subscribe();
    // Failures are reported through notices.
    let _ = controller.bootstrap().await;
    if let Some(id) = session {
        use_session(controller, &id).await?;
    }
    print_notices(&mut notices);
    if controller.login_required() {
        return Err(ChatError::Unauthorized.into());
    }

    println!("{}", "📚 Document Chat".cyan().bold());
    println!("{}", HELP.dimmed());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = controller.store().read(|state| {
            let session = state
                .current_session()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "new chat".to_string());
            let docs = state.selector.selected_ids().len();
            if docs == 0 {
                format!("[{}] You:", session)
            } else {
                format!("[{} | {} docs] You:", session, docs)
            }
        });
        print!("{} ", prompt.cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let keep_going = if let Some(command) = input.strip_prefix('/') {
            handle_command(controller, command).await
        } else {
            if let Ok(message) = controller.pipeline().submit(input).await {
                render::print_message(&message);
            }
            true
        };

        print_notices(&mut notices);
        if controller.drain_auth_events() {
            return Err(ChatError::Unauthorized.into());
        }
        if !keep_going {
            break;
        }
        println!();
    }

    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}

/// Returns false when the loop should stop.
async fn handle_command(controller: &ChatController, command: &str) -> bool {
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "help" => println!("{}", HELP.dimmed()),
        "new" => {
            let name = (!arg.is_empty()).then_some(arg);
            if let Ok(session) = controller.sessions().create(name).await {
                println!("{} {}", "Started".green(), session.name.bold());
            }
        }
        "use" => match use_session(controller, arg).await {
            Ok(()) => controller.store().read(|state| {
                for message in state.messages() {
                    render::print_message(message);
                }
            }),
            Err(err) => eprintln!("{}", format!("❌ {}", err).red()),
        },
        "sessions" => {
            let _ = controller.sessions().list().await;
            controller.store().read(|state| {
                render::print_sessions(&state.sessions, state.current_session_id.as_deref())
            });
        }
        "docs" => controller
            .store()
            .read(|state| render::print_documents(&state.selector)),
        "doc" => {
            let known = controller
                .store()
                .read(|state| state.selector.has_candidate(arg));
            if known {
                controller.documents().toggle(arg);
            } else {
                eprintln!("{}", format!("❌ Unknown document: {}", arg).red());
            }
            controller
                .store()
                .read(|state| render::print_documents(&state.selector));
        }
        "all" => {
            controller.documents().select_all();
            controller
                .store()
                .read(|state| render::print_documents(&state.selector));
        }
        "upload" => match read_upload(std::path::Path::new(arg)).await {
            Ok(upload) => {
                let _ = controller.uploads().upload(upload).await;
            }
            Err(err) => eprintln!("{}", format!("❌ {:#}", err).red()),
        },
        "clear" => controller.sessions().clear_chat(),
        other => eprintln!("{}", format!("Unknown command /{}. {}", other, HELP).yellow()),
    }
    true
}
