//! Conversation history commands
//!
//! Lists, shows, and deletes conversations saved by the chat client.

use crate::cli::HistoryAction;
use crate::error::{PalaverError, Result};
use crate::storage::ConversationStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(action: HistoryAction) -> Result<()> {
    let store = ConversationStore::open_default()?;

    match action {
        HistoryAction::List => list_conversations(&store),
        HistoryAction::Show { id } => show_conversation(&store, &id),
        HistoryAction::Delete { id } => delete_conversation(&store, &id),
    }
}

fn list_conversations(store: &ConversationStore) -> Result<()> {
    let conversations = store.load();

    if conversations.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for conversation in conversations {
        let id_short = conversation.short_id();
        let title = if conversation.title.chars().count() > 40 {
            let prefix: String = conversation.title.chars().take(37).collect();
            format!("{}...", prefix)
        } else {
            conversation.title.clone()
        };
        let updated = conversation.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            title,
            conversation.len(),
            updated
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    println!(
        "Use {} to resume a conversation.",
        "palaver chat --resume <ID>".cyan()
    );
    println!();

    Ok(())
}

fn show_conversation(store: &ConversationStore, id: &str) -> Result<()> {
    let conversation = store
        .get(id)
        .ok_or_else(|| PalaverError::Storage(format!("Conversation {} not found", id)))?;

    println!("\n=== {} ===", conversation.title);
    println!("ID:      {}", conversation.id);
    println!(
        "Created: {}",
        conversation.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Updated: {}",
        conversation.updated_at.format("%Y-%m-%d %H:%M")
    );

    super::chat::print_transcript(&conversation);

    Ok(())
}

fn delete_conversation(store: &ConversationStore, id: &str) -> Result<()> {
    if store.delete(id)? {
        println!("{}", format!("Deleted conversation {}", id).green());
    } else {
        println!("{}", format!("No conversation matching {}", id).yellow());
    }

    Ok(())
}
