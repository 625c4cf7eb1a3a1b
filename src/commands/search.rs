use tracing::debug;

use super::send_chunked;
use crate::projects::filter::FilterState;
use crate::projects::types::Project;
use crate::projects::ProjectCatalog;
use crate::state::Context;

/// Projects listed per reply; the rest are counted.
const MAX_LISTED: usize = 25;

/// Search projects by keyword (repo name, topic or issue label)
#[poise::command(slash_command, guild_only)]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Keyword, empty to drop the keyword"] query: Option<String>,
) -> Result<(), anyhow::Error> {
    let query = query.unwrap_or_default();
    update_and_show(ctx, |filter| filter.set_query(&query)).await
}

/// Only show projects with this topic (repeat to require several)
#[poise::command(slash_command, guild_only)]
pub async fn topic(
    ctx: Context<'_>,
    #[description = "Topic"]
    #[autocomplete = "autocomplete_topic"]
    value: String,
) -> Result<(), anyhow::Error> {
    let known = ctx.data().catalog.read().await.facets().has_topic(&value);
    if !known {
        ctx.say(format!("No project has the topic **{}**.", value)).await?;
        return Ok(());
    }
    update_and_show(ctx, |filter| filter.select_topic(value)).await
}

/// Remove a topic filter
#[poise::command(slash_command, guild_only)]
pub async fn untopic(
    ctx: Context<'_>,
    #[description = "Topic"]
    #[autocomplete = "autocomplete_selected_topic"]
    value: String,
) -> Result<(), anyhow::Error> {
    update_and_show(ctx, |filter| {
        filter.deselect_topic(&value);
    })
    .await
}

/// Only show projects with this issue label (repeat to require several)
#[poise::command(slash_command, guild_only)]
pub async fn issue(
    ctx: Context<'_>,
    #[description = "Issue label"]
    #[autocomplete = "autocomplete_issue"]
    value: String,
) -> Result<(), anyhow::Error> {
    let known = ctx.data().catalog.read().await.facets().has_issue(&value);
    if !known {
        ctx.say(format!("No project has the issue label **{}**.", value))
            .await?;
        return Ok(());
    }
    update_and_show(ctx, |filter| filter.select_issue(value)).await
}

/// Remove an issue label filter
#[poise::command(slash_command, guild_only)]
pub async fn unissue(
    ctx: Context<'_>,
    #[description = "Issue label"]
    #[autocomplete = "autocomplete_selected_issue"]
    value: String,
) -> Result<(), anyhow::Error> {
    update_and_show(ctx, |filter| {
        filter.deselect_issue(&value);
    })
    .await
}

/// Clear the keyword and all filters
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    update_and_show(ctx, FilterState::clear).await
}

/// Show the current results again
#[poise::command(slash_command, guild_only)]
pub async fn results(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    update_and_show(ctx, |_| {}).await
}

/// List every topic and issue label you can filter by
#[poise::command(slash_command, guild_only)]
pub async fn facets(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let text = {
        let catalog = ctx.data().catalog.read().await;
        let facets = catalog.facets();
        if facets.is_empty() {
            "No topics or issue labels yet.".to_string()
        } else {
            format!(
                "**Topics ({})**\n{}\n\n**Issue labels ({})**\n{}",
                facets.topics.len(),
                join_or_none(&facets.topics),
                facets.issues.len(),
                join_or_none(&facets.issues)
            )
        }
    };
    send_chunked(&ctx, &text).await
}

/// Apply `change` to the caller's filter, then reply with the recomputed results.
async fn update_and_show(
    ctx: Context<'_>,
    change: impl FnOnce(&mut FilterState),
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    let text = {
        let catalog = ctx.data().catalog.read().await;
        ctx.data()
            .with_session(user_id, |session| {
                change(&mut session.filter);
                debug!(
                    user_id,
                    query = session.filter.query(),
                    topics = session.filter.topics().len(),
                    issues = session.filter.issues().len(),
                    "filter updated"
                );
                render_results(&session.filter, &catalog)
            })
            .await?
    };
    send_chunked(&ctx, &text).await
}

fn render_results(filter: &FilterState, catalog: &ProjectCatalog) -> String {
    if catalog.is_empty() {
        return "No projects loaded yet.".to_string();
    }

    let found = catalog.search(filter);
    let mut out = format!("**{} of {} projects**", found.len(), catalog.len());
    if filter.is_empty() {
        out.push_str(" (no filters)");
    }

    if !filter.query().is_empty() {
        out.push_str(&format!("\nKeyword: `{}`", filter.query()));
    }
    let active = filter.active_filters();
    if !active.is_empty() {
        out.push_str(&format!("\nActive filters: {}", active.join(", ")));
    }
    out.push('\n');

    for project in found.iter().take(MAX_LISTED) {
        out.push_str(&render_project(project));
    }
    if found.len() > MAX_LISTED {
        out.push_str(&format!("...and {} more\n", found.len() - MAX_LISTED));
    }
    out
}

fn render_project(project: &Project) -> String {
    let name = match &project.url {
        Some(url) => format!("[{}]({})", project.repo_name, url),
        None => format!("**{}**", project.repo_name),
    };
    let mut line = format!("- {}", name);
    if let Some(description) = &project.description {
        line.push_str(&format!(": {}", description));
    }
    if !project.topics.is_empty() {
        line.push_str(&format!(" | topics: {}", project.topics.join(", ")));
    }
    if !project.issues.is_empty() {
        line.push_str(&format!(" | issues: {}", project.issues.join(", ")));
    }
    line.push('\n');
    line
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

async fn autocomplete_topic(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let catalog = ctx.data().catalog.read().await;
    matching(&catalog.facets().topics, partial)
}

async fn autocomplete_issue(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let catalog = ctx.data().catalog.read().await;
    matching(&catalog.facets().issues, partial)
}

async fn autocomplete_selected_topic(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let user_id = ctx.author().id.get();
    ctx.data()
        .with_session(user_id, |s| matching(s.filter.topics(), partial))
        .await
        .unwrap_or_default()
}

async fn autocomplete_selected_issue(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let user_id = ctx.author().id.get();
    ctx.data()
        .with_session(user_id, |s| matching(s.filter.issues(), partial))
        .await
        .unwrap_or_default()
}

fn matching(values: &[String], partial: &str) -> Vec<String> {
    let partial = partial.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if value.to_lowercase().contains(&partial) && !out.contains(value) {
            out.push(value.clone());
        }
    }
    out.truncate(25);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProjectCatalog {
        ProjectCatalog::new(vec![
            Project::new("alpha").with_topics(["rust"]).with_issues(["bug"]),
            Project::new("beta").with_topics(["go"]),
        ])
    }

    #[test]
    fn test_render_results_lists_matches() {
        let mut filter = FilterState::new();
        filter.set_query("AL");
        let text = render_results(&filter, &catalog());
        assert!(text.starts_with("**1 of 2 projects**"));
        assert!(text.contains("Keyword: `al`"));
        assert!(text.contains("- **alpha** | topics: rust | issues: bug"));
        assert!(!text.contains("beta"));
    }

    #[test]
    fn test_render_results_shows_active_filters_once() {
        let mut filter = FilterState::new();
        filter.select_topic("go");
        filter.select_topic("go");
        let text = render_results(&filter, &catalog());
        assert!(text.contains("Active filters: go\n"));
        assert!(text.contains("**beta**"));
    }

    #[test]
    fn test_render_results_empty_catalog() {
        let text = render_results(&FilterState::new(), &ProjectCatalog::new(Vec::new()));
        assert_eq!(text, "No projects loaded yet.");
    }

    #[test]
    fn test_render_results_truncates() {
        let projects = (0..30).map(|i| Project::new(format!("p{i}"))).collect();
        let text = render_results(&FilterState::new(), &ProjectCatalog::new(projects));
        assert!(text.starts_with("**30 of 30 projects** (no filters)"));
        assert!(text.contains("...and 5 more"));
    }

    #[test]
    fn test_render_project_links_url() {
        let mut project = Project::new("alpha");
        project.url = Some("https://github.com/o/alpha".to_string());
        assert_eq!(render_project(&project), "- [alpha](https://github.com/o/alpha)\n");
    }

    #[test]
    fn test_matching_is_case_insensitive_and_distinct() {
        let values = vec!["Rust".to_string(), "rust-lang".to_string(), "Rust".to_string()];
        assert_eq!(matching(&values, "RUST"), vec!["Rust", "rust-lang"]);
        assert!(matching(&values, "go").is_empty());
    }
}
