//! `kawaii chats`: list stored conversations.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use kawaii_core::chat::repository::ConversationRepository;
use kawaii_infra::sqlite::conversation::SqliteConversationRepository;
use kawaii_infra::sqlite::pool::DatabasePool;

pub async fn list_chats(data_dir: &Path, json: bool) -> Result<()> {
    let pool = DatabasePool::open_in(data_dir).await?;
    let repo = SqliteConversationRepository::new(pool.clone());
    let chats = repo.list_conversations().await?;
    pool.close().await;

    if json {
        let items: Vec<_> = chats
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "created_at": c.created_at,
                    "turns": c.turn_count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!(
            "  {} No conversations stored in {}",
            style("💬").bold(),
            style(data_dir.display()).dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
    ]);

    for chat in &chats {
        table.add_row(vec![
            Cell::new(chat.id).fg(Color::Cyan),
            Cell::new(chat.created_at.format("%Y-%m-%d %H:%M:%S UTC")).fg(Color::DarkGrey),
            Cell::new(chat.turn_count),
        ]);
    }

    println!("{table}");
    println!(
        "  {} conversation{}",
        style(chats.len()).bold(),
        if chats.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
