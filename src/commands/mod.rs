mod account;
mod manage;
mod search;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::state::{AppState, Context};

/// Finder - search open-source projects and manage your account
#[poise::command(
    slash_command,
    subcommands(
        "search::search",
        "search::topic",
        "search::untopic",
        "search::issue",
        "search::unissue",
        "search::clear",
        "search::facets",
        "search::results",
        "account::form",
        "account::switch",
        "account::submit",
        "account::login",
        "account::register",
        "account::github",
        "account::callback",
        "account::whoami",
        "account::logout",
        "manage::reload",
        "manage::status"
    )
)]
pub async fn finder(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}

/// Register the `/finder` tree, instantly in one guild when configured, else globally.
pub async fn register(
    ctx: &serenity::Context,
    commands: &[poise::Command<AppState, anyhow::Error>],
    guild_id: Option<serenity::GuildId>,
) -> Result<(), anyhow::Error> {
    for cmd in commands {
        let subcommands: Vec<&str> = cmd.subcommands.iter().map(|s| s.name.as_str()).collect();
        info!(
            command = %cmd.name,
            subcommands = %subcommands.join(" "),
            "registering finder commands"
        );
    }

    match guild_id {
        Some(gid) => {
            info!(guild = %gid, "registering in guild");
            poise::builtins::register_in_guild(ctx, commands, gid).await?;
        }
        None => {
            info!("registering globally, may take up to an hour to appear");
            poise::builtins::register_globally(ctx, commands).await?;
        }
    }
    Ok(())
}

/// Send a message in Discord-safe chunks (max 1990 chars), splitting on line breaks.
async fn send_chunked(ctx: &Context<'_>, text: &str) -> Result<(), anyhow::Error> {
    for chunk in split_chunks(text, 1990) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let mut chunk_len = remaining.len().min(max);
        while !remaining.is_char_boundary(chunk_len) {
            chunk_len -= 1;
        }
        if chunk_len == 0 {
            // `max` is narrower than the first char; emit that char whole.
            chunk_len = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
        }
        let split_at = if chunk_len < remaining.len() {
            remaining[..chunk_len]
                .rfind('\n')
                .or_else(|| remaining[..chunk_len].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(chunk_len)
        } else {
            chunk_len
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chunks_on_newlines() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_chunks(text, 10), vec!["aaaa\nbbbb\n", "cccc"]);
    }

    #[test]
    fn test_split_chunks_short_text() {
        assert_eq!(split_chunks("hello", 1990), vec!["hello"]);
        assert!(split_chunks("", 1990).is_empty());
    }

    #[test]
    fn test_split_chunks_advances_past_wide_chars() {
        let text = "日本";
        assert_eq!(split_chunks(text, 1), vec!["日", "本"]);
        assert_eq!(split_chunks("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_split_chunks_respects_char_boundaries() {
        let text = "ééééé";
        let chunks = split_chunks(text, 3);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= 3));
    }
}
