use std::collections::BTreeSet;

use tracing::debug;

use crate::feed::LoadError;
use crate::record::MediaRecord;

fn matches_filter(record: &MediaRecord, filter: Option<&str>) -> bool {
    match filter {
        None | Some("") => true,
        Some(date) => record.date == date,
    }
}

pub fn visible_indices(records: &[MediaRecord], filter: Option<&str>) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_filter(record, filter))
        .map(|(index, _)| index)
        .collect()
}

pub fn visible_records<'a>(records: &'a [MediaRecord], filter: Option<&str>) -> Vec<&'a MediaRecord> {
    records
        .iter()
        .filter(|record| matches_filter(record, filter))
        .collect()
}

pub fn available_dates(records: &[MediaRecord]) -> Vec<String> {
    let unique: BTreeSet<&str> = records
        .iter()
        .map(|record| record.date.as_str())
        .filter(|date| !date.is_empty())
        .collect();
    unique.into_iter().rev().map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    CloseControl,
    Overlay,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    Start,
    InFlight,
    Cached,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    records: Vec<MediaRecord>,
    selected_date_filter: Option<String>,
    open_record: Option<usize>,
    inline_embed: Option<String>,
    status: LoadStatus,
    last_error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            selected_date_filter: None,
            open_record: None,
            inline_embed: None,
            status: LoadStatus::Idle,
            last_error: None,
        }
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin_fetch(&mut self) -> FetchDecision {
        match self.status {
            LoadStatus::Loading => FetchDecision::InFlight,
            LoadStatus::Loaded => FetchDecision::Cached,
            LoadStatus::Idle | LoadStatus::Failed => {
                self.status = LoadStatus::Loading;
                self.last_error = None;
                FetchDecision::Start
            }
        }
    }

    /// Applies a finished retrieval. A failure keeps whatever records were
    /// already present and re-enables the fetch control.
    pub fn finish_fetch(&mut self, result: Result<Vec<MediaRecord>, LoadError>) {
        match result {
            Ok(records) => {
                debug!(count = records.len(), "records loaded");
                self.records = records;
                self.status = LoadStatus::Loaded;
                self.last_error = None;
                if self.open_record.is_some_and(|index| index >= self.records.len()) {
                    self.open_record = None;
                    self.inline_embed = None;
                }
            }
            Err(err) => {
                self.status = LoadStatus::Failed;
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn selected_date_filter(&self) -> Option<&str> {
        self.selected_date_filter.as_deref()
    }

    pub fn set_date_filter(&mut self, date: Option<String>) {
        self.selected_date_filter = date.filter(|value| !value.is_empty());
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        visible_indices(&self.records, self.selected_date_filter())
    }

    pub fn visible_records(&self) -> Vec<&MediaRecord> {
        visible_records(&self.records, self.selected_date_filter())
    }

    pub fn available_dates(&self) -> Vec<String> {
        available_dates(&self.records)
    }

    pub fn open_record(&self) -> Option<&MediaRecord> {
        self.open_record.and_then(|index| self.records.get(index))
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open_record
    }

    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.records.len() {
            return false;
        }
        self.open_record = Some(index);
        self.inline_embed = None;
        true
    }

    pub fn close(&mut self, via: Dismiss) -> bool {
        if self.open_record.is_none() {
            return false;
        }
        debug!(?via, "modal dismissed");
        self.open_record = None;
        self.inline_embed = None;
        true
    }

    pub fn inline_embed(&self) -> Option<&str> {
        self.inline_embed.as_deref()
    }

    pub fn start_inline_embed(&mut self, embed_url: String) -> bool {
        if self.open_record.is_none() {
            return false;
        }
        self.inline_embed = Some(embed_url);
        true
    }

    pub fn stop_inline_embed(&mut self) {
        self.inline_embed = None;
    }
}
