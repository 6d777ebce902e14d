use apod_tui::feed::{FeedSource, StaticFeed};
use apod_tui::gallery::{
    self, activate, card_view, date_options, gallery_body, modal_view, Activation, ActivationKey,
    CardMedia, GalleryBody, ModalMedia, Target, Trigger,
};
use apod_tui::state::{Dismiss, FetchDecision, ViewState};

fn load(body: &str) -> ViewState {
    let mut state = ViewState::new();
    assert_eq!(state.begin_fetch(), FetchDecision::Start);
    state.finish_fetch(StaticFeed::new(body).load());
    state
}

#[test]
fn empty_feed_shows_placeholder_and_only_all_dates() {
    let state = load("[]");
    assert_eq!(gallery_body(&state), GalleryBody::Empty(gallery::NO_ITEMS_MESSAGE));
    let options = date_options(&state.available_dates());
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].label, gallery::ALL_DATES_LABEL);
    assert_eq!(options[0].value, None);
}

#[test]
fn single_image_record_renders_card_and_modal() {
    let mut state = load(
        r#"[{"date":"2024-01-01","title":"Test","media_type":"image","url":"http://x/img.png"}]"#,
    );
    let GalleryBody::Cards(cards) = gallery_body(&state) else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 1);
    let (index, card) = &cards[0];
    assert_eq!(card.title, "Test");
    assert_eq!(card.date, "January 1, 2024");
    assert_eq!(
        card.media,
        CardMedia::InlineImage {
            src: "http://x/img.png".into()
        }
    );

    assert_eq!(
        activate(card, Trigger::Key(ActivationKey::Enter, Target::Card)),
        Activation::OpenModal
    );
    assert!(state.open(*index));
    let modal = modal_view(state.open_record().expect("open record"));
    assert_eq!(modal.title, "Test");
    assert_eq!(modal.date, "January 1, 2024");
    assert_eq!(modal.explanation, "");
    assert_eq!(
        modal.media,
        ModalMedia::Image {
            src: "http://x/img.png".into()
        }
    );
}

#[test]
fn image_with_thumbnail_prefers_inline_image() {
    let state = load(
        r#"[{"date":"2024-01-01","media_type":"image","url":"http://x/a.png","thumbnail_url":"http://x/t.png"}]"#,
    );
    assert_eq!(
        card_view(&state.records()[0]).media,
        CardMedia::InlineImage {
            src: "http://x/a.png".into()
        }
    );
}

#[test]
fn hd_image_wins_in_modal() {
    let state = load(
        r#"[{"date":"2024-01-01","media_type":"image","url":"http://x/a.png","hdurl":"http://x/a_hd.png"}]"#,
    );
    assert_eq!(
        modal_view(&state.records()[0]).media,
        ModalMedia::Image {
            src: "http://x/a_hd.png".into()
        }
    );
}

#[test]
fn unknown_video_host_falls_back_but_keeps_external_link() {
    let state = load(
        r#"[{"date":"2024-01-01","media_type":"video","url":"https://videos.example.com/v/42"}]"#,
    );
    let modal = modal_view(&state.records()[0]);
    assert!(!modal.can_play_inline());
    assert_eq!(modal.external_link(), Some("https://videos.example.com/v/42"));
    assert!(matches!(
        modal.media,
        ModalMedia::Video {
            thumbnail: None,
            embed: None,
            ..
        }
    ));
}

#[test]
fn unmatched_filter_yields_empty_gallery() {
    let mut state = load(r#"[{"date":"2024-01-01"},{"date":"2024-01-02"}]"#);
    state.set_date_filter(Some("1999-01-01".into()));
    assert!(state.visible_records().is_empty());
    assert_eq!(gallery_body(&state), GalleryBody::Empty(gallery::NO_ITEMS_MESSAGE));
    state.set_date_filter(None);
    assert_eq!(state.visible_records().len(), 2);
}

#[test]
fn available_dates_collapse_duplicates() {
    let state = load(
        r#"[{"date":"2021-01-01"},{"date":"2021-03-05"},{"date":"2021-01-01"}]"#,
    );
    assert_eq!(state.available_dates(), vec!["2021-03-05", "2021-01-01"]);
    assert_eq!(state.visible_records().len(), 3);
}

#[test]
fn all_dismissals_are_equivalent() {
    for via in [Dismiss::Escape, Dismiss::Overlay, Dismiss::CloseControl] {
        let mut state = load(
            r#"[{"date":"2024-01-01","media_type":"video","url":"https://youtu.be/dQw4w9WgXcQ"}]"#,
        );
        assert!(state.open(0));
        let embed = modal_view(state.open_record().unwrap()).media;
        let ModalMedia::Video { embed: Some(embed), .. } = embed else {
            panic!("expected embeddable video");
        };
        assert!(state.start_inline_embed(embed));
        assert!(state.close(via));
        assert!(state.open_record().is_none());
        assert!(state.inline_embed().is_none());
    }
}

#[test]
fn failed_load_shows_error_then_retry_succeeds() {
    let mut state = ViewState::new();
    state.begin_fetch();
    state.finish_fetch(StaticFeed::new(r#"{"oops":true}"#).load());
    assert_eq!(gallery_body(&state), GalleryBody::Error(gallery::LOAD_ERROR_MESSAGE));
    assert_eq!(state.begin_fetch(), FetchDecision::Start);
    state.finish_fetch(StaticFeed::new("[]").load());
    assert_eq!(gallery_body(&state), GalleryBody::Empty(gallery::NO_ITEMS_MESSAGE));
}
