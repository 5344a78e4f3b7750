use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use pictura_lib::domain::entities::ExternalBlob;
use pictura_lib::domain::value_objects::{Principal, UserRole};
use pictura_lib::infrastructure::backend::InMemoryBackend;
use pictura_lib::infrastructure::identity::StaticIdentityProvider;
use pictura_lib::presentation::forms::{CommentForm, ProfileForm};
use pictura_lib::presentation::Screen;
use pictura_lib::shared::config::ClientConfig;
use pictura_lib::AppState;
use serde::Serialize;
use tracing::{info, warn};

const DEFAULT_USERS: &str = "Alice,Bob,Carol";

#[derive(Debug, Clone)]
struct HarnessConfig {
    users: Vec<String>,
    posts_per_user: u64,
    search_term: String,
    summary_path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct HarnessStats {
    profiles_created: u64,
    posts_created: u64,
    progress_events: u64,
    feed_len: usize,
    feed_newest_first: bool,
    search_hits: usize,
    first_post_likes: usize,
    first_post_comments: usize,
    cache_entries_before_sign_out: usize,
    cache_entries_collected: usize,
    cache_entries_after_sign_out: usize,
    backend_calls: usize,
    last_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct HarnessSummary {
    users: Vec<String>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    elapsed_ms: u64,
    config: ClientConfig,
    stats: HarnessStats,
}

fn parse_env_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn parse_optional_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

fn build_config() -> HarnessConfig {
    let users = {
        let explicit = parse_env_list(std::env::var("PICTURA_HARNESS_USERS").ok());
        if explicit.is_empty() {
            parse_env_list(Some(DEFAULT_USERS.to_string()))
        } else {
            explicit
        }
    };

    HarnessConfig {
        users,
        posts_per_user: parse_optional_u64(std::env::var("PICTURA_HARNESS_POSTS_PER_USER").ok())
            .unwrap_or(2),
        search_term: std::env::var("PICTURA_HARNESS_SEARCH_TERM").unwrap_or_default(),
        summary_path: std::env::var("PICTURA_HARNESS_SUMMARY_PATH")
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from),
    }
}

fn principal_for(display_name: &str) -> anyhow::Result<Principal> {
    Principal::from_text(display_name.to_lowercase().replace(' ', "-"))
        .map_err(|e| anyhow::anyhow!("invalid principal for {display_name}: {e}"))
}

async fn sign_in_session(
    backend: &InMemoryBackend,
    config: &ClientConfig,
    principal: Principal,
) -> anyhow::Result<AppState> {
    let identity = Arc::new(StaticIdentityProvider::new(principal));
    identity.initialize().await;
    let state = AppState::in_memory(config.clone(), backend, identity)?;
    state.session_service.sign_in().await?;
    Ok(state)
}

async fn run_user(
    backend: &InMemoryBackend,
    config: &ClientConfig,
    cfg: &HarnessConfig,
    display_name: &str,
    stats: &mut HarnessStats,
) -> anyhow::Result<()> {
    let state = sign_in_session(backend, config, principal_for(display_name)?).await?;
    let shell = state.app_shell();

    if shell.screen().await == (Screen::Main { needs_profile_setup: true }) {
        shell
            .complete_profile_setup(ProfileForm::new(display_name, format!("{display_name}'s photos")))
            .await?;
        stats.profiles_created += 1;
    }

    let mut dialog = state.new_post_view();
    for index in 0..cfg.posts_per_user {
        let bytes = format!("{display_name}-{index}").into_bytes();
        dialog.select_image("image/png", ExternalBlob::from_bytes(bytes));
        dialog.set_caption(format!("{display_name} #{index}"));

        let post_id = dialog.submit().await?;
        stats.progress_events += dialog.progress().len() as u64;
        info!(user = %display_name, post_id = %post_id, progress = ?dialog.progress(), "post uploaded");
        stats.posts_created += 1;
    }

    state.session_service.sign_out().await?;
    Ok(())
}

async fn run_viewer(
    backend: &InMemoryBackend,
    config: &ClientConfig,
    cfg: &HarnessConfig,
    display_name: &str,
    stats: &mut HarnessStats,
) -> anyhow::Result<()> {
    let state = sign_in_session(backend, config, principal_for(display_name)?).await?;

    let mut feed = state.feed_view();
    let posts = feed
        .load()
        .await
        .value()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("feed failed to load"))?;
    stats.feed_len = posts.len();
    stats.feed_newest_first = posts
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp);

    if let Some(first) = posts.into_iter().next() {
        let mut card = state.post_card(first);
        card.load_author().await;
        info!(author = %card.author_name(), "first post in feed");
        card.like().await?;
        card.like().await?;
        card.comment(CommentForm::new("Lovely shot")).await?;
        stats.first_post_likes = card.likes_count();
        stats.first_post_comments = card.comments_count();
    }

    let mut search = state.search_view();
    search.set_term(cfg.search_term.clone());
    stats.search_hits = search
        .search_now()
        .await
        .value()
        .map_or(0, |profiles| profiles.len());

    if state.role_service.caller_role().await? == UserRole::Admin {
        if let Some(other) = cfg.users.get(1) {
            state
                .role_service
                .assign_role(&principal_for(other)?, UserRole::User)
                .await?;
        }
    }

    stats.cache_entries_before_sign_out = state.queries.len().await;
    stats.cache_entries_collected = state.queries.collect_garbage().await;
    state.session_service.sign_out().await?;
    stats.cache_entries_after_sign_out = state.queries.len().await;
    Ok(())
}

async fn write_summary(path: &PathBuf, summary: &HarnessSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(summary)?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pictura_lib::init_logging();

    let cfg = build_config();
    let client_config = ClientConfig::from_env();
    let started_at = Utc::now();
    let start_instant = Instant::now();
    info!(users = %cfg.users.join(","), posts_per_user = cfg.posts_per_user, "Starting session harness");

    let backend = match cfg.users.first() {
        Some(admin) => InMemoryBackend::new().with_admin(&principal_for(admin)?).await,
        None => InMemoryBackend::new(),
    };

    let mut stats = HarnessStats::default();
    for user in &cfg.users {
        if let Err(err) = run_user(&backend, &client_config, &cfg, user, &mut stats).await {
            stats.last_error = Some(err.to_string());
            warn!(user = %user, error = %err, "Harness user session failed");
        }
    }
    if let Some(viewer) = cfg.users.first() {
        if let Err(err) = run_viewer(&backend, &client_config, &cfg, viewer, &mut stats).await {
            stats.last_error = Some(err.to_string());
            warn!(user = %viewer, error = %err, "Harness viewer session failed");
        }
    }
    stats.backend_calls = backend.total_calls().await;

    let summary = HarnessSummary {
        users: cfg.users.clone(),
        started_at,
        finished_at: Utc::now(),
        elapsed_ms: start_instant.elapsed().as_millis() as u64,
        config: client_config,
        stats,
    };

    if let Some(path) = cfg.summary_path.as_ref() {
        write_summary(path, &summary).await?;
        info!(path = %path.display(), "Session harness summary written");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
