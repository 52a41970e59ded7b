use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_attempts(config: Config, email: Option<String>) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let attempts = match email.as_deref() {
        Some(email) => state.access.list_attempts_for(email).await?,
        None => state.access.list_attempts().await?,
    };

    if attempts.is_empty() {
        println!("No entry attempts recorded.");
        return Ok(());
    }

    println!("Entry attempts ({}):", attempts.len());
    println!("{:-<100}", "");

    for attempt in attempts {
        let status = if attempt.successful { "✓" } else { "…" };
        println!(
            "{status} {} | tag {} | checkpoint {} | {}",
            attempt.timestamp.format("%Y-%m-%d %H:%M:%S"),
            attempt.tag_id,
            attempt.check_point_id,
            attempt.id
        );
    }

    Ok(())
}
