use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::account::{self, oauth, AuthError, AuthForm, Credentials, Identity};
use crate::api::ApiClient;
use crate::state::Context;

const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

/// Show whether the form will log in or register
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn form(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let form = ctx.data().with_session(user_id, |s| s.form.clone()).await?;
    ctx.say(describe_form(&form)).await?;
    Ok(())
}

/// Toggle between logging in and registering
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn switch(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let form = ctx
        .data()
        .with_session(user_id, |s| {
            s.form.switch();
            s.form.clone()
        })
        .await?;
    debug!(user_id, mode = ?form.mode(), "auth form switched");
    ctx.say(describe_form(&form)).await?;
    Ok(())
}

/// Submit the form (log in or register, depending on its mode)
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn submit(
    ctx: Context<'_>,
    #[description = "Username"] username: String,
    #[description = "Password"] password: String,
    #[description = "Email (registration only)"] email: Option<String>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let (form, api) = ctx
        .data()
        .with_session(user_id, |s| (s.form.clone(), s.api.clone()))
        .await?;
    let creds = Credentials {
        username,
        password,
        email,
    };
    let result = form.submit(&api, &creds).await;
    finish_auth(ctx, result).await
}

/// Log in with username and password
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn login(
    ctx: Context<'_>,
    #[description = "Username"] username: String,
    #[description = "Password"] password: String,
) -> Result<(), anyhow::Error> {
    let api = session_api(&ctx).await?;
    let creds = Credentials {
        username,
        password,
        email: None,
    };
    let result = account::login(&api, &creds).await;
    finish_auth(ctx, result).await
}

/// Create an account, then log in
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Username"] username: String,
    #[description = "Password"] password: String,
    #[description = "Email"] email: String,
) -> Result<(), anyhow::Error> {
    let api = session_api(&ctx).await?;
    let creds = Credentials {
        username,
        password,
        email: Some(email),
    };
    let result = account::register(&api, &creds).await;
    finish_auth(ctx, result).await
}

/// Get the link to log in with GitHub
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn github(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let Some(github) = &ctx.data().github else {
        ctx.say(AuthError::OAuthDisabled.to_string()).await?;
        return Ok(());
    };
    let url = github.authorize_url()?;
    ctx.say(format!(
        "[Login with GitHub]({})\nWhen GitHub sends you back, run `/finder callback` with the code (or the whole address).",
        url
    ))
    .await?;
    Ok(())
}

/// Finish GitHub login with the code GitHub sent back
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn callback(
    ctx: Context<'_>,
    #[description = "Authorization code or callback address"] code: String,
) -> Result<(), anyhow::Error> {
    if ctx.data().github.is_none() {
        ctx.say(AuthError::OAuthDisabled.to_string()).await?;
        return Ok(());
    }
    let api = session_api(&ctx).await?;
    let result = oauth::complete(&api, &code).await;
    finish_auth(ctx, result).await
}

/// Show who you are logged in as
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn whoami(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let identity = ctx.data().with_session(user_id, |s| s.identity.clone()).await?;
    let text = match identity {
        Some(identity) => format!(
            "Logged in as **{}** ({:?}) since {}",
            identity.username,
            identity.method,
            identity.since.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "Not logged in.".to_string(),
    };
    ctx.say(text).await?;
    Ok(())
}

/// Forget your login and backend session
#[poise::command(slash_command, guild_only, ephemeral)]
pub async fn logout(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let fresh = Arc::new(ctx.data().api.fork()?);
    let previous = ctx
        .data()
        .with_session(user_id, |s| {
            s.api = fresh;
            s.identity.take()
        })
        .await?;
    match previous {
        Some(identity) => {
            info!(user_id, username = %identity.username, "logged out");
            ctx.say(format!("Logged out **{}**.", identity.username)).await?;
        }
        None => {
            ctx.say("Not logged in.").await?;
        }
    }
    Ok(())
}

async fn session_api(ctx: &Context<'_>) -> Result<Arc<ApiClient>, anyhow::Error> {
    let user_id = ctx.author().id.get();
    ctx.data().with_session(user_id, |s| s.api.clone()).await
}

/// Store the identity on success; otherwise tell the user what they can act on.
async fn finish_auth(
    ctx: Context<'_>,
    result: Result<Identity, AuthError>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    match result {
        Ok(identity) => {
            let text = format!("Logged in as **{}**.", identity.username);
            ctx.data()
                .with_session(user_id, |s| s.identity = Some(identity))
                .await?;
            ctx.say(text).await?;
        }
        Err(e) if e.is_user_facing() => {
            ctx.say(e.to_string()).await?;
        }
        Err(e) => {
            warn!(user_id, error = %e, "authentication failed");
            ctx.say(GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

fn describe_form(form: &AuthForm) -> String {
    format!(
        "Mode: **{}** (use `/finder submit`)\n{} Use `/finder switch`.",
        form.button_text(),
        form.switch_text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_form_follows_mode() {
        let mut form = AuthForm::new();
        assert_eq!(
            describe_form(&form),
            "Mode: **Login** (use `/finder submit`)\nDon't have an account? Register here. Use `/finder switch`."
        );
        form.switch();
        assert!(describe_form(&form).starts_with("Mode: **Register**"));
        assert!(describe_form(&form).contains("Already have an account? Login here."));
    }
}
