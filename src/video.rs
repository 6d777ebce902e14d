use std::process::{Child, Command, ExitStatus, Stdio};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use url::Url;

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static VIMEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4,12}$").unwrap());

pub const URL_PLACEHOLDER: &str = "%URL%";
pub const TITLE_PLACEHOLDER: &str = "%TITLE%";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoHost {
    YouTube { id: String },
    Vimeo { id: String },
}

impl VideoHost {
    /// Recognizes YouTube (`watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`,
    /// `/live/`, `/v/`) and Vimeo (`vimeo.com/<id>`, `player.vimeo.com/video/<id>`)
    /// links. Anything else, including non-http schemes, is unrecognized.
    pub fn recognize(raw: &str) -> Option<Self> {
        let url = Url::parse(raw.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host.as_str())
            .to_string();
        let segments: Vec<&str> = url
            .path_segments()
            .map(|parts| parts.filter(|part| !part.is_empty()).collect())
            .unwrap_or_default();

        match host.as_str() {
            "youtube.com" | "youtube-nocookie.com" => {
                let candidate = match segments.as_slice() {
                    ["watch"] => url
                        .query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned()),
                    ["embed" | "shorts" | "live" | "v", id, ..] => Some((*id).to_string()),
                    _ => None,
                };
                candidate
                    .filter(|id| YOUTUBE_ID.is_match(id))
                    .map(|id| VideoHost::YouTube { id })
            }
            "youtu.be" => segments
                .first()
                .filter(|id| YOUTUBE_ID.is_match(id))
                .map(|id| VideoHost::YouTube { id: id.to_string() }),
            "vimeo.com" => segments
                .first()
                .filter(|id| VIMEO_ID.is_match(id))
                .map(|id| VideoHost::Vimeo { id: id.to_string() }),
            "player.vimeo.com" => match segments.as_slice() {
                ["video", id, ..] if VIMEO_ID.is_match(id) => Some(VideoHost::Vimeo {
                    id: id.to_string(),
                }),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        match self {
            VideoHost::YouTube { id } => Some(format!("https://img.youtube.com/vi/{id}/hqdefault.jpg")),
            // Vimeo thumbnails need an API round trip.
            VideoHost::Vimeo { .. } => None,
        }
    }

    pub fn embed_url(&self) -> String {
        match self {
            VideoHost::YouTube { id } => format!("https://www.youtube-nocookie.com/embed/{id}"),
            VideoHost::Vimeo { id } => format!("https://player.vimeo.com/video/{id}"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VideoHost::YouTube { .. } => "YouTube",
            VideoHost::Vimeo { .. } => "Vimeo",
        }
    }
}

pub fn derive_thumbnail(url: &str) -> Option<String> {
    VideoHost::recognize(url).and_then(|host| host.thumbnail_url())
}

pub fn derive_embed(url: &str) -> Option<String> {
    VideoHost::recognize(url).map(|host| host.embed_url())
}

pub struct LaunchOptions<'a> {
    pub command: &'a [String],
    pub url: &'a str,
    pub title: &'a str,
}

/// A running player process. Dropping the session kills the player.
pub struct PlayerSession {
    child: Option<Child>,
    url: String,
}

impl PlayerSession {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn try_status(&mut self) -> Option<Result<ExitStatus>> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                self.child = None;
                Some(Ok(status))
            }
            Ok(None) => None,
            Err(err) => {
                self.child = None;
                Some(Err(anyhow::Error::new(err).context("poll player status")))
            }
        }
    }

    pub fn stop(mut self) {
        self.kill();
    }

    fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let status = child.wait();
            debug!(url = %self.url, ?status, "player stopped");
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.kill();
    }
}

pub fn player_args(command: &[String], url: &str, title: &str) -> Vec<String> {
    let mut saw_url = false;
    let mut args: Vec<String> = command
        .iter()
        .map(|arg| {
            if arg.contains(URL_PLACEHOLDER) {
                saw_url = true;
            }
            arg.replace(URL_PLACEHOLDER, url)
                .replace(TITLE_PLACEHOLDER, title)
        })
        .collect();
    if !saw_url && !args.is_empty() {
        args.push(url.to_string());
    }
    args
}

pub fn spawn_player(opts: LaunchOptions<'_>) -> Result<PlayerSession> {
    if opts.url.trim().is_empty() {
        return Err(anyhow!("video URL missing"));
    }
    let args = player_args(opts.command, opts.url, opts.title);
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| anyhow!("player command is empty"))?;

    let mut command = Command::new(program);
    command.args(rest);
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());
    let child = command
        .spawn()
        .with_context(|| format!("launch {program} to play {}", opts.url))?;
    info!(program = %program, url = %opts.url, "player started");

    Ok(PlayerSession {
        child: Some(child),
        url: opts.url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_youtube_forms() {
        let expected = Some(VideoHost::YouTube {
            id: "dQw4w9WgXcQ".into(),
        });
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0",
            "http://m.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(VideoHost::recognize(url), expected, "{url}");
        }
    }

    #[test]
    fn recognizes_vimeo_forms() {
        let expected = Some(VideoHost::Vimeo { id: "76979871".into() });
        assert_eq!(VideoHost::recognize("https://vimeo.com/76979871"), expected);
        assert_eq!(
            VideoHost::recognize("https://player.vimeo.com/video/76979871?h=abc"),
            expected
        );
    }

    #[test]
    fn rejects_unknown_hosts_and_bad_ids() {
        assert_eq!(VideoHost::recognize("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(VideoHost::recognize("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(VideoHost::recognize("https://www.youtube.com/channel/abc"), None);
        assert_eq!(VideoHost::recognize("javascript:alert(1)"), None);
        assert_eq!(VideoHost::recognize("ftp://youtu.be/dQw4w9WgXcQ"), None);
        assert_eq!(VideoHost::recognize("not a url"), None);
    }

    #[test]
    fn derives_thumbnail_and_embed() {
        let url = "https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0";
        assert_eq!(
            derive_thumbnail(url).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(
            derive_embed(url).as_deref(),
            Some("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(derive_thumbnail("https://vimeo.com/76979871"), None);
        assert_eq!(
            derive_embed("https://vimeo.com/76979871").as_deref(),
            Some("https://player.vimeo.com/video/76979871")
        );
    }

    #[test]
    fn player_args_substitute_placeholders() {
        let command = vec!["mpv".to_string(), "--title=%TITLE%".to_string(), "%URL%".to_string()];
        assert_eq!(
            player_args(&command, "https://v/1", "Moon"),
            vec!["mpv", "--title=Moon", "https://v/1"]
        );
    }

    #[test]
    fn player_args_append_url_without_placeholder() {
        let command = vec!["vlc".to_string()];
        assert_eq!(player_args(&command, "https://v/1", ""), vec!["vlc", "https://v/1"]);
    }

    #[test]
    fn spawn_rejects_empty_command() {
        let result = spawn_player(LaunchOptions {
            command: &[],
            url: "https://v/1",
            title: "",
        });
        assert!(result.is_err());
    }
}
