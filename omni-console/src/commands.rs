use anyhow::{bail, Context, Result};
use omni_feed::{FeedConfig, FeedFilter, FeedService, FeedUpdate, SocketStatus};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::cli::{Command, FilterArgs};
use crate::render;

/// Execute one console command against the configured store and socket.
pub async fn run(config: FeedConfig, command: Command) -> Result<()> {
    let service = FeedService::new(&config).context("Failed to build feed service")?;

    match command {
        Command::List { filter } => list(&service, &filter).await,
        Command::Watch { filter } => watch(&service, &filter).await,
        Command::Transcript { user_id } => transcript(&service, &user_id).await,
        Command::Send { user_id, text } => send(&service, &user_id, &text).await,
        Command::Manage { conversation_id } => manage(&service, &conversation_id).await,
        Command::Stats => stats(&service).await,
    }
}

async fn hydrate(service: &FeedService) -> Result<()> {
    let count = service
        .hydrate()
        .await
        .context("Failed to load conversations")?;
    info!(count, "Conversations hydrated");
    Ok(())
}

async fn list(service: &FeedService, args: &FilterArgs) -> Result<()> {
    hydrate(service).await?;
    let rows = service.filtered(&FeedFilter::from(args)).await?;
    for summary in &rows {
        println!("{}", render::conversation_row(summary));
    }
    if rows.is_empty() {
        println!("No conversations match");
    }
    Ok(())
}

async fn watch(service: &FeedService, args: &FilterArgs) -> Result<()> {
    let filter = FeedFilter::from(args);
    list(service, args).await?;

    let mut updates = service.feed().subscribe();
    let handle = service.connect();
    let mut status = handle.status();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, closing live channel");
                handle.shutdown().await;
                return Ok(());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                eprintln!("-- {}", render::socket_status(&current));
                match current {
                    SocketStatus::GaveUp => bail!("Live channel gave up reconnecting"),
                    SocketStatus::Closed => break,
                    _ => {}
                }
            }
            update = updates.recv() => match update {
                Ok(FeedUpdate::Upserted { user_id, .. }) => {
                    let snapshot = service.feed().snapshot().await?;
                    if let Some(summary) = snapshot.iter().find(|c| c.user_id == user_id) {
                        if filter.matches(summary) {
                            println!("{}", render::conversation_row(summary));
                        }
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Console fell behind the feed");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    handle.finished().await;
    Ok(())
}

async fn transcript(service: &FeedService, user_id: &str) -> Result<()> {
    hydrate(service).await?;
    let summary = service
        .open_transcript(user_id)
        .await
        .with_context(|| format!("Failed to open conversation {}", user_id))?;
    print!("{}", render::transcript(&summary));
    Ok(())
}

async fn send(service: &FeedService, user_id: &str, text: &str) -> Result<()> {
    hydrate(service).await?;
    let message = service
        .send_reply(user_id, text)
        .await
        .with_context(|| format!("Failed to reply to {}", user_id))?;
    println!("{}", render::message_line(&message));
    Ok(())
}

async fn manage(service: &FeedService, conversation_id: &str) -> Result<()> {
    service
        .mark_managed(conversation_id)
        .await
        .with_context(|| format!("Failed to mark {} as managed", conversation_id))?;
    println!("{} marked as managed", conversation_id);
    Ok(())
}

async fn stats(service: &FeedService) -> Result<()> {
    hydrate(service).await?;
    print!("{}", render::stats(&service.stats().await?));
    Ok(())
}
