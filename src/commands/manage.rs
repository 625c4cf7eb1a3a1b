use tracing::{info, warn};

use crate::projects::fetch_projects;
use crate::state::Context;

/// Reload the project list (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn reload(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    let data = ctx.data();
    let fresh = match fetch_projects(&data.source, &data.api).await {
        Ok(fresh) => fresh,
        Err(e) => {
            warn!(error = %e, source = %data.source, "project reload failed");
            ctx.say(format!("Reload failed: {:#}", e)).await?;
            return Ok(());
        }
    };

    let (projects, topics, issues) = {
        let mut catalog = data.catalog.write().await;
        catalog.replace(fresh);
        (
            catalog.len(),
            catalog.facets().topics.len(),
            catalog.facets().issues.len(),
        )
    };

    info!(user_id, projects, "project catalog reloaded");
    ctx.say(format!(
        "Reloaded **{}** projects ({} topics, {} issue labels) from `{}`.",
        projects, topics, issues, data.source
    ))
    .await?;
    Ok(())
}

/// Show where projects come from and when they were loaded
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let data = ctx.data();
    let text = {
        let catalog = data.catalog.read().await;
        format!(
            "**{}** projects from `{}`, loaded {}\nBackend: {}\nGitHub login: {}",
            catalog.len(),
            data.source,
            catalog.loaded_at().format("%Y-%m-%d %H:%M UTC"),
            data.api.base_url(),
            if data.github.is_some() { "enabled" } else { "disabled" }
        )
    };
    ctx.say(text).await?;
    Ok(())
}
