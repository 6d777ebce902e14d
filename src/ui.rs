use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::wrap;
use tracing::{info, warn};
use unicode_width::UnicodeWidthChar;

use crate::facts::{self, FactMode, FactPanel};
use crate::feed::{FeedSource, LoadError};
use crate::gallery::{
    self, Activation, ActivationKey, CardMedia, CardPresentation, GalleryBody, ModalMedia,
    ModalPresentation, Target, Trigger,
};
use crate::record::MediaRecord;
use crate::state::{Dismiss, FetchDecision, ViewState};
use crate::video::{self, PlayerSession};

const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_PANEL_BG: Color = Color::Rgb(24, 24, 36);
const COLOR_PANEL_FOCUSED_BG: Color = Color::Rgb(49, 50, 68);
const COLOR_PANEL_SELECTED_BG: Color = Color::Rgb(69, 71, 90);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_SUCCESS: Color = Color::Rgb(166, 227, 161);
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CARD_HEIGHT: u16 = 4;
const CARD_MEDIA_LINE: u16 = 2;
const CARD_HIGHLIGHT: &str = "▶ ";
const FACT_PANEL_HEIGHT: u16 = 3;

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

fn rect_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut used = 0usize;
    let mut out = String::new();
    let total: usize = text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModalControl {
    Close,
    Play,
    Open,
}

impl ModalControl {
    fn label(self, modal: &ModalPresentation) -> &'static str {
        match self {
            ModalControl::Close => "Close",
            ModalControl::Play => "Play inline",
            ModalControl::Open => match &modal.media {
                ModalMedia::ExternalLink { label, .. } => *label,
                _ => "Open in new tab",
            },
        }
    }
}

fn modal_controls(modal: &ModalPresentation) -> Vec<ModalControl> {
    let mut controls = vec![ModalControl::Close];
    if modal.can_play_inline() {
        controls.push(ModalControl::Play);
    }
    if modal.external_link().is_some() {
        controls.push(ModalControl::Open);
    }
    controls
}

fn card_media_line(media: &CardMedia) -> String {
    match media {
        CardMedia::InlineImage { src } => format!("🖼  {src}"),
        CardMedia::LinkedThumbnail { href, thumbnail } => format!("▶  {thumbnail} ↗ {href}"),
        CardMedia::ExternalLink { href, label } => format!("↗  {label}: {href}"),
        CardMedia::None => String::new(),
    }
}

/// Every card occupies exactly `CARD_HEIGHT` rows so mouse hits map back to cards.
fn card_lines(card: &CardPresentation, width: usize) -> Vec<Line<'static>> {
    let link_style = if card.media.link().is_some() {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(COLOR_SUCCESS)
    };
    vec![
        Line::from(Span::styled(
            truncate_to_width(&card.title, width),
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width(&card.date, width),
            Style::default().fg(COLOR_TEXT_SECONDARY),
        )),
        Line::from(Span::styled(
            truncate_to_width(&card_media_line(&card.media), width),
            link_style,
        )),
        Line::default(),
    ]
}

fn media_label(text: &str) -> Span<'static> {
    Span::styled(
        format!("{text}: "),
        Style::default()
            .fg(COLOR_TEXT_SECONDARY)
            .add_modifier(Modifier::BOLD),
    )
}

fn media_link(url: &str) -> Span<'static> {
    Span::styled(url.to_string(), Style::default().fg(COLOR_ACCENT))
}

fn modal_media_lines(modal: &ModalPresentation, playing: Option<&str>) -> Vec<Line<'static>> {
    match &modal.media {
        ModalMedia::Image { src } => vec![Line::from(vec![media_label("Image"), media_link(src)])],
        ModalMedia::Video {
            thumbnail,
            external,
            ..
        } => {
            let mut lines = Vec::new();
            match (playing, thumbnail) {
                (Some(embed), _) => lines.push(Line::from(vec![
                    Span::styled(
                        "▶ Playing inline: ",
                        Style::default()
                            .fg(COLOR_SUCCESS)
                            .add_modifier(Modifier::BOLD),
                    ),
                    media_link(embed),
                ])),
                (None, Some(thumbnail)) => {
                    lines.push(Line::from(vec![media_label("Thumbnail"), media_link(thumbnail)]))
                }
                (None, None) => lines.push(Line::from(Span::styled(
                    gallery::NO_THUMBNAIL_MESSAGE,
                    Style::default()
                        .fg(COLOR_TEXT_SECONDARY)
                        .add_modifier(Modifier::ITALIC),
                ))),
            }
            lines.push(Line::from(vec![media_label("Video"), media_link(external)]));
            lines
        }
        ModalMedia::ExternalLink { href, label: text } => {
            vec![Line::from(vec![media_label(text), media_link(href)])]
        }
        ModalMedia::None => Vec::new(),
    }
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

enum AsyncResponse {
    Feed {
        request_id: u64,
        result: Result<Vec<MediaRecord>, LoadError>,
    },
}

#[derive(Clone)]
pub struct Options {
    pub status_message: String,
    pub feed: Arc<dyn FeedSource>,
    pub date_selector: bool,
    pub fact_mode: FactMode,
    pub fact_transition: Duration,
    pub player_command: Vec<String>,
    pub fetch_on_start: bool,
}

pub struct Model {
    state: ViewState,
    feed: Arc<dyn FeedSource>,
    status_message: String,
    selected_card: usize,
    gallery_list: ListState,
    gallery_inner: Option<Rect>,
    modal_area: Option<Rect>,
    modal_focus: ModalControl,
    modal_scroll: u16,
    date_selector: bool,
    date_menu_visible: bool,
    date_menu_selected: usize,
    facts: FactPanel,
    player: Option<PlayerSession>,
    player_command: Vec<String>,
    fetch_on_start: bool,
    needs_redraw: bool,
    spinner: Spinner,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
    next_request_id: u64,
    pending_request: Option<u64>,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        let mut fact_panel = FactPanel::new(options.fact_mode, options.fact_transition);
        fact_panel.start(facts::random_fact());
        Self {
            state: ViewState::new(),
            feed: options.feed,
            status_message: options.status_message,
            selected_card: 0,
            gallery_list: ListState::default(),
            gallery_inner: None,
            modal_area: None,
            modal_focus: ModalControl::Close,
            modal_scroll: 0,
            date_selector: options.date_selector,
            date_menu_visible: false,
            date_menu_selected: 0,
            facts: fact_panel,
            player: None,
            player_command: options.player_command,
            fetch_on_start: options.fetch_on_start,
            needs_redraw: true,
            spinner: Spinner::new(),
            response_tx,
            response_rx,
            next_request_id: 1,
            pending_request: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        if self.fetch_on_start {
            self.request_fetch();
        }

        let result = self.event_loop(&mut terminal);

        self.stop_player();
        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = self.handle_mouse(mouse) {
                            self.status_message = format!("Error: {}", err);
                            self.mark_dirty();
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if self.poll_async() {
                self.mark_dirty();
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                let mut ticked = false;
                if self.state.is_loading() && self.spinner.advance() {
                    ticked = true;
                } else if !self.state.is_loading() {
                    self.spinner.reset();
                }
                if self.facts.tick(Instant::now()) {
                    ticked = true;
                }
                if self.poll_player() {
                    ticked = true;
                }
                if ticked {
                    self.mark_dirty();
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        match message {
            AsyncResponse::Feed { request_id, result } => {
                if self.pending_request != Some(request_id) {
                    return;
                }
                self.pending_request = None;
                match &result {
                    Ok(records) => {
                        self.status_message = format!("Loaded {} items.", records.len());
                    }
                    Err(err) => {
                        warn!(error = %err, "feed load failed");
                        self.status_message = format!("Failed to load feed: {err}");
                    }
                }
                self.state.finish_fetch(result);
                self.clamp_selection();
                self.mark_dirty();
            }
        }
    }

    fn poll_player(&mut self) -> bool {
        let Some(player) = self.player.as_mut() else {
            return false;
        };
        match player.try_status() {
            None => false,
            Some(result) => {
                info!(url = player.url(), "inline player exited");
                self.player = None;
                self.state.stop_inline_embed();
                self.status_message = match result {
                    Ok(status) if status.success() => "Playback finished.".to_string(),
                    Ok(status) => format!("Player exited with {status}."),
                    Err(err) => format!("Player failed: {err}"),
                };
                true
            }
        }
    }

    fn request_fetch(&mut self) {
        match self.state.begin_fetch() {
            FetchDecision::Start => {
                let request_id = self.next_request_id;
                self.next_request_id += 1;
                self.pending_request = Some(request_id);
                self.status_message = format!("Fetching {}…", self.feed.location());
                info!(request_id, location = self.feed.location(), "fetch started");

                let feed = self.feed.clone();
                let tx = self.response_tx.clone();
                thread::spawn(move || {
                    let result = feed.load();
                    let _ = tx.send(AsyncResponse::Feed { request_id, result });
                });
            }
            FetchDecision::InFlight => {
                self.status_message = "Already loading, please wait…".to_string();
            }
            FetchDecision::Cached => {
                self.status_message = format!(
                    "Showing {} cached items.",
                    self.state.records().len()
                );
                self.clamp_selection();
            }
        }
        self.mark_dirty();
    }

    fn visible_cards(&self) -> Vec<(usize, CardPresentation)> {
        match gallery::gallery_body(&self.state) {
            GalleryBody::Cards(cards) => cards,
            _ => Vec::new(),
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.state.visible_indices().len();
        self.selected_card = self.selected_card.min(count.saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.state.visible_indices().len();
        if count == 0 {
            return;
        }
        let current = self.selected_card as isize;
        let next = (current + delta).clamp(0, count as isize - 1);
        self.selected_card = next as usize;
        self.mark_dirty();
    }

    fn activate_card(&mut self, position: usize, trigger: Trigger) -> Result<()> {
        let cards = self.visible_cards();
        let Some((index, card)) = cards.get(position) else {
            return Ok(());
        };
        self.selected_card = position;
        match gallery::activate(card, trigger) {
            Activation::OpenModal => self.open_modal(*index),
            Activation::FollowLink(url) => self.open_external(&url),
            Activation::Ignore => {}
        }
        self.mark_dirty();
        Ok(())
    }

    fn follow_card_link(&mut self) -> Result<()> {
        let has_link = self
            .visible_cards()
            .get(self.selected_card)
            .is_some_and(|(_, card)| card.media.link().is_some());
        if !has_link {
            self.status_message = "This card has no link to open.".to_string();
            self.mark_dirty();
            return Ok(());
        }
        self.activate_card(
            self.selected_card,
            Trigger::Key(ActivationKey::Enter, Target::Link),
        )
    }

    fn open_modal(&mut self, index: usize) {
        self.stop_player();
        if self.state.open(index) {
            self.modal_focus = ModalControl::Close;
            self.modal_scroll = 0;
            if let Some(record) = self.state.open_record() {
                info!(date = %record.date, "modal opened");
            }
        }
    }

    fn close_modal(&mut self, via: Dismiss) {
        if self.state.close(via) {
            self.stop_player();
            self.modal_area = None;
            self.mark_dirty();
        }
    }

    fn stop_player(&mut self) {
        if let Some(player) = self.player.take() {
            player.stop();
        }
        self.state.stop_inline_embed();
    }

    fn open_modal_view(&self) -> Option<ModalPresentation> {
        self.state.open_record().map(gallery::modal_view)
    }

    fn play_inline(&mut self) {
        let Some(modal) = self.open_modal_view() else {
            return;
        };
        let ModalMedia::Video {
            embed: Some(embed),
            external,
            ..
        } = &modal.media
        else {
            self.status_message = "This item cannot be played inline.".to_string();
            return;
        };
        if self.player.is_some() {
            return;
        }
        if !self.state.start_inline_embed(embed.clone()) {
            return;
        }
        match video::spawn_player(video::LaunchOptions {
            command: &self.player_command,
            url: embed,
            title: &modal.title,
        }) {
            Ok(session) => {
                self.status_message = match video::VideoHost::recognize(external) {
                    Some(host) => format!("Playing {} from {}…", modal.title, host.name()),
                    None => format!("Playing {}…", modal.title),
                };
                self.player = Some(session);
            }
            Err(err) => {
                warn!(error = %err, "inline player failed to start");
                self.state.stop_inline_embed();
                self.status_message = format!("Failed to start player: {err}");
            }
        }
    }

    fn open_external(&mut self, url: &str) {
        match webbrowser::open(url) {
            Ok(_) => {
                self.status_message = format!("Opened {url} in your browser.");
            }
            Err(err) => {
                self.status_message = format!("Failed to open {url}: {err}");
            }
        }
    }

    fn activate_modal_control(&mut self, control: ModalControl) {
        match control {
            ModalControl::Close => self.close_modal(Dismiss::CloseControl),
            ModalControl::Play => self.play_inline(),
            ModalControl::Open => {
                if let Some(url) = self
                    .open_modal_view()
                    .and_then(|modal| modal.external_link().map(str::to_string))
                {
                    self.open_external(&url);
                }
            }
        }
    }

    fn cycle_modal_focus(&mut self, forward: bool) {
        let Some(modal) = self.open_modal_view() else {
            return;
        };
        let controls = modal_controls(&modal);
        let position = controls
            .iter()
            .position(|control| *control == self.modal_focus)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % controls.len()
        } else {
            (position + controls.len() - 1) % controls.len()
        };
        self.modal_focus = controls[next];
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.state.open_record().is_some() {
            self.handle_modal_key(code);
            self.mark_dirty();
            return Ok(false);
        }

        if self.date_menu_visible {
            self.handle_date_menu_key(code);
            self.mark_dirty();
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::Char('g') | KeyCode::Home => self.move_selection(isize::MIN / 2),
            KeyCode::Char('G') | KeyCode::End => self.move_selection(isize::MAX / 2),
            KeyCode::Enter => {
                self.activate_card(
                    self.selected_card,
                    Trigger::Key(ActivationKey::Enter, Target::Card),
                )?;
            }
            KeyCode::Char(' ') => {
                self.activate_card(
                    self.selected_card,
                    Trigger::Key(ActivationKey::Space, Target::Card),
                )?;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => self.follow_card_link()?,
            KeyCode::Char('f') | KeyCode::Char('F') => self.request_fetch(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.open_date_menu(),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                if self.facts.trigger(facts::random_fact(), Instant::now()) {
                    self.mark_dirty();
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_modal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_modal(Dismiss::Escape),
            KeyCode::Char('x') | KeyCode::Char('q') => self.close_modal(Dismiss::CloseControl),
            KeyCode::Tab | KeyCode::Right => self.cycle_modal_focus(true),
            KeyCode::BackTab | KeyCode::Left => self.cycle_modal_focus(false),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_modal_control(self.modal_focus),
            KeyCode::Char('p') | KeyCode::Char('P') => self.activate_modal_control(ModalControl::Play),
            KeyCode::Char('o') | KeyCode::Char('O') => self.activate_modal_control(ModalControl::Open),
            KeyCode::Char('j') | KeyCode::Down => {
                self.modal_scroll = self.modal_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.modal_scroll = self.modal_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => self.modal_scroll = self.modal_scroll.saturating_add(10),
            KeyCode::PageUp => self.modal_scroll = self.modal_scroll.saturating_sub(10),
            _ => {}
        }
    }

    fn open_date_menu(&mut self) {
        if !self.date_selector {
            return;
        }
        let dates = self.state.available_dates();
        self.date_menu_selected = self
            .state
            .selected_date_filter()
            .and_then(|current| dates.iter().position(|date| date == current))
            .map(|position| position + 1)
            .unwrap_or(0);
        self.date_menu_visible = true;
        self.mark_dirty();
    }

    fn handle_date_menu_key(&mut self, code: KeyCode) {
        let options = gallery::date_options(&self.state.available_dates());
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('d') => {
                self.date_menu_visible = false;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.date_menu_selected =
                    (self.date_menu_selected + 1).min(options.len().saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.date_menu_selected = self.date_menu_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(option) = options.get(self.date_menu_selected) {
                    self.state.set_date_filter(option.value.clone());
                    self.selected_card = 0;
                    self.status_message = match &option.value {
                        Some(_) => format!("Showing items from {}.", option.label),
                        None => "Showing all dates.".to_string(),
                    };
                }
                self.date_menu_visible = false;
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        if self.date_menu_visible {
            return Ok(());
        }

        if self.state.open_record().is_some() {
            if let MouseEventKind::Down(MouseButton::Left) = event.kind {
                let inside = self
                    .modal_area
                    .map(|area| rect_contains(area, event.column, event.row))
                    .unwrap_or(true);
                if !inside {
                    self.close_modal(Dismiss::Overlay);
                }
            }
            return Ok(());
        }

        match event.kind {
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((position, target)) = self.card_hit(event.column, event.row) {
                    self.activate_card(position, Trigger::Click(target))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Maps a terminal cell to a card position and the part of the card hit.
    fn card_hit(&self, column: u16, row: u16) -> Option<(usize, Target)> {
        let inner = self.gallery_inner?;
        if !rect_contains(inner, column, row) {
            return None;
        }
        let relative = row - inner.y;
        let position = self.gallery_list.offset() + usize::from(relative / CARD_HEIGHT);
        if position >= self.state.visible_indices().len() {
            return None;
        }
        let target = if relative % CARD_HEIGHT == CARD_MEDIA_LINE {
            Target::Link
        } else {
            Target::Card
        };
        Some((position, target))
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), full);

        let fact_height = if self.facts.mode() == FactMode::Off {
            0
        } else {
            FACT_PANEL_HEIGHT
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(fact_height),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.state.is_loading() {
            format!("{} {}", self.spinner.frame(), self.status_message)
                .trim()
                .to_string()
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .bg(COLOR_PANEL_FOCUSED_BG)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        self.draw_gallery(frame, layout[1]);
        if fact_height > 0 {
            self.draw_fact_panel(frame, layout[2]);
        }

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .bg(COLOR_PANEL_BG)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[3]);

        if self.date_menu_visible {
            self.draw_date_menu(frame, layout[1]);
        }

        if self.state.open_record().is_some() {
            self.draw_modal(frame, layout[1]);
        } else {
            self.modal_area = None;
        }
    }

    fn gallery_title(&self) -> String {
        let total = self.state.records().len();
        let shown = self.state.visible_indices().len();
        match self.state.selected_date_filter() {
            Some(date) => format!(" Gallery · {} · {shown} of {total} ", gallery::format_date(date)),
            None if total > 0 => format!(" Gallery · {total} items "),
            None => " Gallery ".to_string(),
        }
    }

    fn draw_gallery(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(Span::styled(
                self.gallery_title(),
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_IDLE))
            .style(Style::default().bg(COLOR_PANEL_BG));
        let inner = block.inner(area);

        let placeholder = |message: String, color: Color| {
            Paragraph::new(message)
                .block(block.clone())
                .alignment(Alignment::Center)
                .style(Style::default().fg(color).add_modifier(Modifier::ITALIC))
                .wrap(Wrap { trim: true })
        };

        match gallery::gallery_body(&self.state) {
            GalleryBody::Idle => {
                self.gallery_inner = None;
                frame.render_widget(
                    placeholder(gallery::IDLE_MESSAGE.to_string(), COLOR_TEXT_SECONDARY),
                    area,
                );
            }
            GalleryBody::Loading => {
                self.gallery_inner = None;
                let message = format!("{} {}", self.spinner.frame(), gallery::LOADING_MESSAGE);
                frame.render_widget(placeholder(message, COLOR_TEXT_SECONDARY), area);
            }
            GalleryBody::Error(message) => {
                self.gallery_inner = None;
                frame.render_widget(placeholder(message.to_string(), COLOR_ERROR), area);
            }
            GalleryBody::Empty(message) => {
                self.gallery_inner = None;
                frame.render_widget(placeholder(message.to_string(), COLOR_TEXT_SECONDARY), area);
            }
            GalleryBody::Cards(cards) => {
                let width = usize::from(inner.width)
                    .saturating_sub(CARD_HIGHLIGHT.chars().count())
                    .max(1);
                let items: Vec<ListItem> = cards
                    .iter()
                    .map(|(_, card)| ListItem::new(card_lines(card, width)))
                    .collect();
                let list = List::new(items)
                    .block(block.clone())
                    .highlight_style(
                        Style::default()
                            .bg(COLOR_PANEL_SELECTED_BG)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol(CARD_HIGHLIGHT);
                self.gallery_list
                    .select(Some(self.selected_card.min(cards.len().saturating_sub(1))));
                frame.render_stateful_widget(list, area, &mut self.gallery_list);
                self.gallery_inner = Some(inner);
            }
        }
    }

    fn draw_fact_panel(&self, frame: &mut Frame<'_>, area: Rect) {
        let body = match self.facts.visible_fact() {
            Some(fact) => Line::from(vec![
                Span::styled(
                    "Did you know? ",
                    Style::default()
                        .fg(COLOR_ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(fact, Style::default().fg(COLOR_TEXT_PRIMARY)),
            ]),
            None if self.facts.is_animating() => Line::default(),
            None => Line::from(Span::styled(
                "Press t for a space fact.",
                Style::default()
                    .fg(COLOR_TEXT_SECONDARY)
                    .add_modifier(Modifier::ITALIC),
            )),
        };
        let panel = Paragraph::new(body)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(COLOR_BORDER_IDLE))
                    .style(Style::default().bg(COLOR_PANEL_BG)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(panel, area);
    }

    fn draw_date_menu(&self, frame: &mut Frame<'_>, area: Rect) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let current = self.state.selected_date_filter();
        let options = gallery::date_options(&self.state.available_dates());
        let items: Vec<ListItem> = options
            .iter()
            .map(|option| {
                let marker = if option.value.as_deref() == current { "• " } else { "  " };
                ListItem::new(Line::from(Span::styled(
                    format!("{marker}{}", option.label),
                    Style::default().fg(COLOR_TEXT_PRIMARY).bg(COLOR_PANEL_BG),
                )))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(Span::styled(
                        "Filter by date",
                        Style::default()
                            .fg(COLOR_ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(COLOR_ACCENT))
                    .style(Style::default().bg(COLOR_PANEL_BG)),
            )
            .highlight_style(
                Style::default()
                    .fg(COLOR_TEXT_PRIMARY)
                    .bg(COLOR_PANEL_SELECTED_BG)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(
            self.date_menu_selected.min(options.len().saturating_sub(1)),
        ));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn draw_modal(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let Some(modal) = self.open_modal_view() else {
            return;
        };
        let popup_area = centered_rect(80, 85, area);
        self.modal_area = Some(popup_area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", modal.title),
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_ACCENT))
            .style(Style::default().bg(COLOR_PANEL_BG));
        let inner = block.inner(popup_area);
        let width = usize::from(inner.width).max(1);

        let mut lines: Vec<Line<'static>> = Vec::new();
        lines.push(Line::from(Span::styled(
            modal.date.clone(),
            Style::default().fg(COLOR_TEXT_SECONDARY),
        )));
        lines.push(Line::default());

        let media = modal_media_lines(&modal, self.state.inline_embed());
        if !media.is_empty() {
            lines.extend(media);
            lines.push(Line::default());
        }

        let mut controls: Vec<Span<'static>> = Vec::new();
        for control in modal_controls(&modal) {
            let style = if control == self.modal_focus {
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(COLOR_TEXT_PRIMARY)
            };
            controls.push(Span::styled(format!("[ {} ]", control.label(&modal)), style));
            controls.push(Span::raw(" "));
        }
        lines.push(Line::from(controls));
        lines.push(Line::default());

        for paragraph in modal.explanation.split('\n') {
            if paragraph.trim().is_empty() {
                lines.push(Line::default());
                continue;
            }
            for wrapped in wrap(paragraph, width) {
                lines.push(Line::from(Span::styled(
                    wrapped.into_owned(),
                    Style::default().fg(COLOR_TEXT_PRIMARY),
                )));
            }
        }

        let max_scroll = (lines.len() as u16).saturating_sub(inner.height);
        self.modal_scroll = self.modal_scroll.min(max_scroll);

        let body = Paragraph::new(Text::from(lines))
            .block(block)
            .scroll((self.modal_scroll, 0));
        frame.render_widget(body, popup_area);
    }

    fn footer_text(&self) -> String {
        if self.state.open_record().is_some() {
            return "Tab focus · Enter activate · p play inline · o open link · j/k scroll · Esc/x close"
                .to_string();
        }
        if self.date_menu_visible {
            return "Date filter: j/k move · Enter apply · Esc cancel".to_string();
        }

        let mut parts: Vec<&str> = Vec::new();
        if self.state.is_loading() {
            parts.push("Loading…");
        } else {
            parts.push("f fetch");
        }
        parts.push("j/k move");
        parts.push("Enter/Space details");
        parts.push("o open link");
        if self.date_selector {
            parts.push("d dates");
        }
        if self.facts.mode() != FactMode::Off {
            parts.push("t fact");
        }
        parts.push("q quit");
        parts.join(" · ")
    }
}
