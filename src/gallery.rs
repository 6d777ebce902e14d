use chrono::NaiveDate;

use crate::record::{MediaKind, MediaRecord};
use crate::state::{LoadStatus, ViewState};
use crate::video;

pub const ALL_DATES_LABEL: &str = "All dates";
pub const NO_ITEMS_MESSAGE: &str = "No items found.";
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load images. Please try again.";
pub const LOADING_MESSAGE: &str = "Loading space photos…";
pub const IDLE_MESSAGE: &str = "Press f to fetch space images.";
pub const NO_THUMBNAIL_MESSAGE: &str = "No thumbnail available";

/// `YYYY-MM-DD` as `Month D, YYYY`. Empty stays empty; anything unparseable
/// is shown verbatim.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardMedia {
    InlineImage { src: String },
    LinkedThumbnail { href: String, thumbnail: String },
    ExternalLink { href: String, label: &'static str },
    None,
}

impl CardMedia {
    pub fn link(&self) -> Option<&str> {
        match self {
            CardMedia::LinkedThumbnail { href, .. } | CardMedia::ExternalLink { href, .. } => {
                Some(href)
            }
            CardMedia::InlineImage { .. } | CardMedia::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPresentation {
    pub title: String,
    pub date: String,
    pub media: CardMedia,
}

pub fn card_view(record: &MediaRecord) -> CardPresentation {
    let media = match (record.media_kind, &record.url, &record.thumbnail_url) {
        (MediaKind::Image, Some(url), _) => CardMedia::InlineImage { src: url.clone() },
        (_, Some(url), Some(thumbnail)) => CardMedia::LinkedThumbnail {
            href: url.clone(),
            thumbnail: thumbnail.clone(),
        },
        (_, Some(url), None) => CardMedia::ExternalLink {
            href: url.clone(),
            label: "Open",
        },
        (_, None, _) => CardMedia::None,
    };

    CardPresentation {
        title: record.display_title().to_string(),
        date: format_date(&record.date),
        media,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKey {
    Enter,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Card,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click(Target),
    Key(ActivationKey, Target),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    OpenModal,
    FollowLink(String),
    Ignore,
}

/// Pointer and keyboard activation of a card behave the same, unless the input
/// landed on the card's link, in which case the link navigates instead.
pub fn activate(card: &CardPresentation, trigger: Trigger) -> Activation {
    let target = match trigger {
        Trigger::Click(target) => target,
        Trigger::Key(ActivationKey::Enter | ActivationKey::Space, target) => target,
        Trigger::Key(ActivationKey::Other, _) => return Activation::Ignore,
    };
    match (target, card.media.link()) {
        (Target::Link, Some(href)) => Activation::FollowLink(href.to_string()),
        _ => Activation::OpenModal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMedia {
    Image {
        src: String,
    },
    Video {
        thumbnail: Option<String>,
        embed: Option<String>,
        external: String,
    },
    ExternalLink {
        href: String,
        label: &'static str,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalPresentation {
    pub title: String,
    pub date: String,
    pub explanation: String,
    pub media: ModalMedia,
}

impl ModalPresentation {
    pub fn can_play_inline(&self) -> bool {
        matches!(&self.media, ModalMedia::Video { embed: Some(_), .. })
    }

    pub fn external_link(&self) -> Option<&str> {
        match &self.media {
            ModalMedia::Video { external, .. } => Some(external),
            ModalMedia::ExternalLink { href, .. } => Some(href),
            ModalMedia::Image { .. } | ModalMedia::None => None,
        }
    }
}

pub fn modal_view(record: &MediaRecord) -> ModalPresentation {
    let media = match (record.media_kind, &record.url) {
        (MediaKind::Image, _) => record
            .hd_url
            .as_ref()
            .or(record.url.as_ref())
            .map(|src| ModalMedia::Image { src: src.clone() })
            .unwrap_or(ModalMedia::None),
        (MediaKind::Video, Some(url)) => ModalMedia::Video {
            thumbnail: record
                .thumbnail_url
                .clone()
                .or_else(|| video::derive_thumbnail(url)),
            embed: video::derive_embed(url),
            external: url.clone(),
        },
        (MediaKind::Other, Some(url)) => ModalMedia::ExternalLink {
            href: url.clone(),
            label: "Open media",
        },
        (MediaKind::Video | MediaKind::Other, None) => ModalMedia::None,
    };

    ModalPresentation {
        title: record.display_title().to_string(),
        date: format_date(&record.date),
        explanation: record.explanation_text().to_string(),
        media,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryBody {
    Idle,
    Loading,
    Error(&'static str),
    Empty(&'static str),
    Cards(Vec<(usize, CardPresentation)>),
}

/// What the gallery area shows for the current state. A failed load with
/// records already present keeps showing those records.
pub fn gallery_body(state: &ViewState) -> GalleryBody {
    match state.status() {
        LoadStatus::Idle => GalleryBody::Idle,
        LoadStatus::Loading => GalleryBody::Loading,
        LoadStatus::Failed if state.records().is_empty() => GalleryBody::Error(LOAD_ERROR_MESSAGE),
        LoadStatus::Failed | LoadStatus::Loaded => {
            let cards: Vec<(usize, CardPresentation)> = state
                .visible_indices()
                .into_iter()
                .filter_map(|index| state.records().get(index).map(|r| (index, card_view(r))))
                .collect();
            if cards.is_empty() {
                GalleryBody::Empty(NO_ITEMS_MESSAGE)
            } else {
                GalleryBody::Cards(cards)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOption {
    pub value: Option<String>,
    pub label: String,
}

pub fn date_options(dates: &[String]) -> Vec<DateOption> {
    let mut options = Vec::with_capacity(dates.len() + 1);
    options.push(DateOption {
        value: None,
        label: ALL_DATES_LABEL.to_string(),
    });
    options.extend(dates.iter().map(|date| DateOption {
        value: Some(date.clone()),
        label: format_date(date),
    }));
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: MediaKind, url: Option<&str>, thumb: Option<&str>) -> MediaRecord {
        MediaRecord {
            date: "2024-03-09".into(),
            title: Some("Orion".into()),
            media_kind: kind,
            url: url.map(Into::into),
            thumbnail_url: thumb.map(Into::into),
            ..MediaRecord::default()
        }
    }

    #[test]
    fn formats_long_dates() {
        assert_eq!(format_date("2024-01-01"), "January 1, 2024");
        assert_eq!(format_date("1999-12-31"), "December 31, 1999");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn image_with_thumbnail_is_still_inline_image() {
        let card = card_view(&record(MediaKind::Image, Some("http://x/a.jpg"), Some("http://x/t.jpg")));
        assert_eq!(
            card.media,
            CardMedia::InlineImage {
                src: "http://x/a.jpg".into()
            }
        );
    }

    #[test]
    fn card_classification_fallbacks() {
        let linked = card_view(&record(MediaKind::Video, Some("http://v/1"), Some("http://v/t.jpg")));
        assert_eq!(
            linked.media,
            CardMedia::LinkedThumbnail {
                href: "http://v/1".into(),
                thumbnail: "http://v/t.jpg".into()
            }
        );
        let plain = card_view(&record(MediaKind::Other, Some("http://o/1"), None));
        assert_eq!(
            plain.media,
            CardMedia::ExternalLink {
                href: "http://o/1".into(),
                label: "Open"
            }
        );
        let bare = card_view(&record(MediaKind::Image, None, Some("http://x/t.jpg")));
        assert_eq!(bare.media, CardMedia::None);
        assert_eq!(bare.title, "Orion");
        assert_eq!(bare.date, "March 9, 2024");
    }

    #[test]
    fn untitled_placeholder() {
        let card = card_view(&MediaRecord::default());
        assert_eq!(card.title, "Untitled");
        assert_eq!(card.date, "");
    }

    #[test]
    fn click_and_keys_open_modal_equally() {
        let card = card_view(&record(MediaKind::Image, Some("http://x/a.jpg"), None));
        assert_eq!(activate(&card, Trigger::Click(Target::Card)), Activation::OpenModal);
        assert_eq!(
            activate(&card, Trigger::Key(ActivationKey::Enter, Target::Card)),
            Activation::OpenModal
        );
        assert_eq!(
            activate(&card, Trigger::Key(ActivationKey::Space, Target::Card)),
            Activation::OpenModal
        );
        assert_eq!(
            activate(&card, Trigger::Key(ActivationKey::Other, Target::Card)),
            Activation::Ignore
        );
    }

    #[test]
    fn link_target_follows_link() {
        let card = card_view(&record(MediaKind::Video, Some("http://v/1"), None));
        assert_eq!(
            activate(&card, Trigger::Click(Target::Link)),
            Activation::FollowLink("http://v/1".into())
        );
        assert_eq!(
            activate(&card, Trigger::Key(ActivationKey::Enter, Target::Link)),
            Activation::FollowLink("http://v/1".into())
        );
    }

    #[test]
    fn modal_prefers_hd_image() {
        let mut image = record(MediaKind::Image, Some("http://x/a.jpg"), None);
        image.hd_url = Some("http://x/a_hd.jpg".into());
        assert_eq!(
            modal_view(&image).media,
            ModalMedia::Image {
                src: "http://x/a_hd.jpg".into()
            }
        );
        image.url = None;
        assert_eq!(
            modal_view(&image).media,
            ModalMedia::Image {
                src: "http://x/a_hd.jpg".into()
            }
        );
        image.hd_url = None;
        assert_eq!(modal_view(&image).media, ModalMedia::None);
    }

    #[test]
    fn unrecognized_video_has_no_thumbnail_or_play() {
        let modal = modal_view(&record(MediaKind::Video, Some("https://example.org/clip.mp4"), None));
        assert_eq!(
            modal.media,
            ModalMedia::Video {
                thumbnail: None,
                embed: None,
                external: "https://example.org/clip.mp4".into()
            }
        );
        assert!(!modal.can_play_inline());
        assert_eq!(modal.external_link(), Some("https://example.org/clip.mp4"));
    }

    #[test]
    fn youtube_video_derives_thumbnail_and_embed() {
        let modal = modal_view(&record(
            MediaKind::Video,
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0"),
            None,
        ));
        assert!(modal.can_play_inline());
        match modal.media {
            ModalMedia::Video { thumbnail, embed, .. } => {
                assert_eq!(
                    thumbnail.as_deref(),
                    Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
                );
                assert!(embed.is_some());
            }
            other => panic!("unexpected media {other:?}"),
        }
    }

    #[test]
    fn provider_thumbnail_wins_for_video() {
        let modal = modal_view(&record(
            MediaKind::Video,
            Some("https://youtu.be/dQw4w9WgXcQ"),
            Some("http://apod/thumb.jpg"),
        ));
        assert!(matches!(
            modal.media,
            ModalMedia::Video { thumbnail: Some(ref t), .. } if t == "http://apod/thumb.jpg"
        ));
    }

    #[test]
    fn other_kind_gets_open_media_link() {
        let modal = modal_view(&record(MediaKind::Other, Some("http://o/1"), None));
        assert_eq!(
            modal.media,
            ModalMedia::ExternalLink {
                href: "http://o/1".into(),
                label: "Open media"
            }
        );
        assert_eq!(modal.explanation, "");
        assert_eq!(modal_view(&record(MediaKind::Other, None, None)).media, ModalMedia::None);
    }

    #[test]
    fn video_without_url_has_no_media_or_link() {
        let modal = modal_view(&record(
            MediaKind::Video,
            None,
            Some("http://t/thumb.jpg"),
        ));
        assert_eq!(modal.media, ModalMedia::None);
        assert!(!modal.can_play_inline());
        assert_eq!(modal.external_link(), None);
    }

    #[test]
    fn date_options_start_with_all_dates() {
        let options = date_options(&["2024-01-02".to_string()]);
        assert_eq!(options[0].label, ALL_DATES_LABEL);
        assert_eq!(options[0].value, None);
        assert_eq!(options[1].label, "January 2, 2024");
        assert_eq!(options[1].value.as_deref(), Some("2024-01-02"));
    }
}
