use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config;
use crate::feed::{self, FeedSource};
use crate::logging;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
    pub feed_url: Option<String>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let mut cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    if let Some(url) = options.feed_url.filter(|url| !url.trim().is_empty()) {
        cfg.feed.url = url;
    }

    logging::init(&cfg.log).context("initialize logging")?;
    let config_path = options.config_file.or_else(config::default_path);
    debug!(path = ?config_path, "configuration resolved");

    let feed_source: Arc<dyn FeedSource> = Arc::new(
        feed::HttpFeed::new(feed::ClientConfig {
            url: cfg.feed.url.clone(),
            user_agent: cfg.feed.user_agent.clone(),
            timeout: Some(cfg.feed.timeout),
            http_client: None,
        })
        .context("build feed client")?,
    );
    info!(feed = %cfg.feed.url, "starting gallery");

    let options = ui::Options {
        status_message: format!(
            "Astronomy Picture of the Day · press f to fetch from {}",
            friendly_url(&cfg.feed.url)
        ),
        feed: feed_source,
        date_selector: cfg.ui.date_selector,
        fact_mode: cfg.facts.mode,
        fact_transition: cfg.facts.transition,
        player_command: cfg.player.video_command.clone(),
        fetch_on_start: cfg.ui.fetch_on_start,
    };

    let mut model = ui::Model::new(options);
    model.run()?;

    info!("gallery closed");
    Ok(())
}

fn friendly_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
