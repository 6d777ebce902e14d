use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaKind {
    Image,
    Video,
    #[default]
    Other,
}

impl MediaKind {
    pub fn from_media_type(raw: &str) -> Self {
        match raw {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaRecord {
    pub date: String,
    pub title: Option<String>,
    pub explanation: Option<String>,
    pub media_kind: MediaKind,
    pub url: Option<String>,
    pub hd_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl MediaRecord {
    /// Decodes a single feed entry. Fields with the wrong JSON type, and
    /// entries that are not objects at all, fall back to empty defaults.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return MediaRecord::default();
        };
        let text = |key: &str| -> Option<String> {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        // Empty URLs are as good as missing ones for every presentation rule.
        let link = |key: &str| text(key).filter(|value| !value.trim().is_empty());

        MediaRecord {
            date: text("date").unwrap_or_default(),
            title: text("title"),
            explanation: text("explanation"),
            media_kind: text("media_type")
                .map(|raw| MediaKind::from_media_type(&raw))
                .unwrap_or_default(),
            url: link("url"),
            hd_url: link("hdurl"),
            thumbnail_url: link("thumbnail_url"),
        }
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => "Untitled",
        }
    }

    pub fn explanation_text(&self) -> &str {
        self.explanation.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_provider_fields() {
        let record = MediaRecord::from_value(&json!({
            "date": "2024-01-01",
            "title": "Test",
            "explanation": "Body",
            "media_type": "image",
            "url": "http://x/img.png",
            "hdurl": "http://x/img_hd.png",
        }));
        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.display_title(), "Test");
        assert_eq!(record.media_kind, MediaKind::Image);
        assert_eq!(record.hd_url.as_deref(), Some("http://x/img_hd.png"));
        assert_eq!(record.thumbnail_url, None);
    }

    #[test]
    fn unknown_media_type_is_other() {
        let record = MediaRecord::from_value(&json!({ "media_type": "Image" }));
        assert_eq!(record.media_kind, MediaKind::Other);
        let missing = MediaRecord::from_value(&json!({ "date": "2024-01-01" }));
        assert_eq!(missing.media_kind, MediaKind::Other);
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let record = MediaRecord::from_value(&json!({
            "date": 20240101,
            "title": null,
            "url": "",
            "thumbnail_url": ["nope"],
        }));
        assert_eq!(record.date, "");
        assert_eq!(record.display_title(), "Untitled");
        assert_eq!(record.url, None);
        assert_eq!(record.thumbnail_url, None);
        assert_eq!(record.explanation_text(), "");
    }

    #[test]
    fn present_titles_are_kept_verbatim() {
        let spaced = MediaRecord::from_value(&json!({ "title": "   " }));
        assert_eq!(spaced.display_title(), "   ");
        let empty = MediaRecord::from_value(&json!({ "title": "" }));
        assert_eq!(empty.display_title(), "Untitled");
    }

    #[test]
    fn non_object_entry_is_empty_record() {
        assert_eq!(MediaRecord::from_value(&json!("hello")), MediaRecord::default());
    }
}
