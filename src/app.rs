use std::collections::{HashMap, HashSet};

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, info, warn};
use ratatui::style::Color;
use ratatui::widgets::ListState;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use tokio::sync::mpsc;

use crate::model::{is_placeholder, ChapterId, ChapterImages, Listing, ManhwaDetail};
use crate::nav::{Command, NavigationState, Overlay};
use crate::net::{Action, NetworkEvent, RequestId};

/// Minimum horizontal drag, in columns, that turns a page.
pub const SWIPE_THRESHOLD: u16 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    List,
    Detail,
    Chapter,
}

impl Scope {
    fn of(command: &Command) -> Self {
        match command {
            Command::LoadList(_) => Scope::List,
            Command::LoadDetail { .. } => Scope::Detail,
            Command::LoadChapter { .. } => Scope::Chapter,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Searching,
}

pub struct App {
    pub nav: NavigationState,
    pub mode: InputMode,
    pub input: String,
    pub theme: Color,
    /// One-line notice for the status bar (validation messages, skipped entries).
    pub notice: Option<String>,

    pub listing: Listing,
    pub list_error: Option<String>,
    pub selected_index: usize,
    /// Scroll position of the listing; selection mirrors `selected_index`.
    pub list_state: ListState,

    pub detail: Option<ManhwaDetail>,
    detail_id: Option<String>,
    /// Chapter last opened from this detail; reselected when the detail reloads.
    last_chapter: Option<ChapterId>,
    pub detail_error: Option<String>,
    pub chapter_list_state: ListState,

    pub images: ChapterImages,
    pub chapter_error: Option<String>,

    in_flight: usize,
    next_request: u64,
    latest: HashMap<Scope, RequestId>,

    image_picker: Option<Picker>,
    pub image_protocols: HashMap<String, StatefulProtocol>,
    pub failed_images: HashSet<String>,
    pending_images: HashSet<String>,
    drag_origin: Option<u16>,

    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    /// Without a picker images are never downloaded; the reader shows page URLs instead.
    pub fn new(
        action_tx: mpsc::UnboundedSender<Action>,
        theme: Color,
        mature: bool,
        image_picker: Option<Picker>,
    ) -> Self {
        Self {
            nav: NavigationState::new(mature),
            mode: InputMode::Browse,
            input: String::new(),
            theme,
            notice: None,
            listing: Listing::default(),
            list_error: None,
            selected_index: 0,
            list_state: ListState::default(),
            detail: None,
            detail_id: None,
            last_chapter: None,
            detail_error: None,
            chapter_list_state: ListState::default(),
            images: Vec::new(),
            chapter_error: None,
            in_flight: 0,
            next_request: 0,
            latest: HashMap::new(),
            image_picker,
            image_protocols: HashMap::new(),
            failed_images: HashSet::new(),
            pending_images: HashSet::new(),
            drag_origin: None,
            action_tx,
        }
    }

    pub fn images_enabled(&self) -> bool {
        self.image_picker.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn start(&mut self) {
        let cmd = self.nav.reload_list();
        self.dispatch(cmd);
    }

    fn dispatch(&mut self, command: Command) {
        let scope = Scope::of(&command);
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.latest.insert(scope, id);
        self.in_flight += 1;

        if let Command::LoadChapter { chapter, .. } = &command {
            self.last_chapter = Some(chapter.clone());
        }
        match scope {
            Scope::List => self.list_error = None,
            Scope::Detail => self.detail_error = None,
            Scope::Chapter => {
                self.chapter_error = None;
                self.clear_pages();
            }
        }

        info!("request {:?}: {:?}", id, command);
        let _ = self.action_tx.send(Action::Load { id, command });
    }

    /// Counts the response against the loading indicator and reports whether
    /// it is the newest one for its scope.
    fn settle(&mut self, scope: Scope, id: RequestId) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        let current = self.latest.get(&scope) == Some(&id);
        if !current {
            debug!("dropping stale {:?} response {:?}", scope, id);
        }
        current
    }

    /// Drops chapter pages and their images. The detail cover survives.
    fn clear_pages(&mut self) {
        let cover = self.detail.as_ref().map(|d| d.image_url.clone());
        let keep = |url: &String| cover.as_ref() == Some(url);
        self.images.clear();
        self.image_protocols.retain(|url, _| keep(url));
        self.failed_images.retain(|url| keep(url));
        self.pending_images.retain(|url| keep(url));
    }

    fn request_image(&mut self, url: &str) {
        if self.image_picker.is_none()
            || is_placeholder(url)
            || self.image_protocols.contains_key(url)
            || self.failed_images.contains(url)
            || !self.pending_images.insert(url.to_string())
        {
            return;
        }
        let _ = self.action_tx.send(Action::DownloadImage(url.to_string()));
    }

    /// Current page plus the one after it.
    fn request_visible_pages(&mut self) {
        let Some(index) = self.nav.image_index() else {
            return;
        };
        let urls: Vec<String> = self
            .images
            .iter()
            .skip(index)
            .take(2)
            .map(|img| img.url.clone())
            .collect();
        for url in urls {
            self.request_image(&url);
        }
    }

    pub fn on_network_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::ListLoaded { id, query, result } => {
                if !self.settle(Scope::List, id) {
                    return;
                }
                match result {
                    Ok(listing) => {
                        info!(
                            "loaded {} entries for {:?} page {}",
                            listing.entries.len(),
                            query.view,
                            query.page
                        );
                        self.notice = (listing.skipped > 0)
                            .then(|| format!("Skipped {} entries without an id", listing.skipped));
                        self.listing = listing;
                        self.selected_index = 0;
                        self.list_state = ListState::default();
                    }
                    Err(err) => {
                        self.listing = Listing::default();
                        self.list_error = Some(err.to_string());
                    }
                }
            }
            NetworkEvent::DetailLoaded {
                id,
                manhwa_id,
                result,
            } => {
                if !self.settle(Scope::Detail, id) {
                    return;
                }
                match result {
                    Ok(detail) => {
                        let cover = detail.image_url.clone();
                        let reselect = self.last_chapter.as_ref().and_then(|last| {
                            detail.chapters.iter().position(|c| &c.chapter_number == last)
                        });
                        self.chapter_list_state.select(
                            reselect.or((!detail.chapters.is_empty()).then_some(0)),
                        );
                        self.detail = Some(detail);
                        self.detail_id = Some(manhwa_id);
                        self.request_image(&cover);
                    }
                    Err(err) => self.detail_error = Some(err.to_string()),
                }
            }
            NetworkEvent::ChapterLoaded {
                id,
                manhwa_id,
                chapter,
                result,
            } => {
                if !self.settle(Scope::Chapter, id) {
                    return;
                }
                match result {
                    Ok(images) => {
                        info!(
                            "chapter {chapter} of {manhwa_id}: {} pages",
                            images.len()
                        );
                        self.images = images;
                        self.request_visible_pages();
                    }
                    Err(err) => self.chapter_error = Some(err.to_string()),
                }
            }
            NetworkEvent::ImageDownloaded(url, result) => {
                if !self.pending_images.remove(&url) {
                    return;
                }
                match (result, self.image_picker.as_mut()) {
                    (Ok(img), Some(picker)) => {
                        let protocol = picker.new_resize_protocol(img);
                        self.image_protocols.insert(url, protocol);
                    }
                    (Ok(_), None) => {}
                    (Err(err), _) => {
                        warn!("image {url} failed: {err}");
                        self.failed_images.insert(url);
                    }
                }
            }
            NetworkEvent::ThemeUpdate(color) => self.theme = color,
        }
    }

    // Transitions

    pub fn select_home(&mut self) {
        let cmd = self.nav.select_home();
        self.forget_overlay();
        self.dispatch(cmd);
    }

    pub fn select_popular(&mut self) {
        let cmd = self.nav.select_popular();
        self.forget_overlay();
        self.dispatch(cmd);
    }

    pub fn submit_search(&mut self) {
        match self.nav.search(&self.input) {
            Ok(cmd) => {
                self.mode = InputMode::Browse;
                self.notice = None;
                self.dispatch(cmd);
            }
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    pub fn next_page(&mut self) {
        let cmd = self.nav.next_page();
        self.dispatch(cmd);
    }

    pub fn prev_page(&mut self) {
        if let Some(cmd) = self.nav.prev_page() {
            self.dispatch(cmd);
        }
    }

    pub fn toggle_mature(&mut self) {
        let cmd = self.nav.toggle_mature();
        self.notice = Some(format!(
            "Mature content {}",
            if self.nav.mature { "on" } else { "off" }
        ));
        self.dispatch(cmd);
    }

    pub fn retry_list(&mut self) {
        let cmd = self.nav.reload_list();
        self.dispatch(cmd);
    }

    pub fn open_detail(&mut self, manhwa_id: &str) {
        if self.detail_id.as_deref() != Some(manhwa_id) {
            self.detail = None;
            self.detail_id = None;
            self.last_chapter = None;
        }
        self.forget(Scope::Chapter);
        self.clear_pages();
        self.chapter_error = None;
        let cmd = self.nav.open_detail(manhwa_id);
        self.dispatch(cmd);
    }

    pub fn open_selected_entry(&mut self) {
        if let Some(id) = self
            .listing
            .entries
            .get(self.selected_index)
            .map(|e| e.id.clone())
        {
            self.open_detail(&id);
        }
    }

    pub fn open_selected_chapter(&mut self) {
        let Some(manhwa_id) = self.nav.selected_manhwa().map(str::to_string) else {
            return;
        };
        let chapter = self
            .chapter_list_state
            .selected()
            .zip(self.detail.as_ref())
            .and_then(|(i, detail)| detail.chapters.get(i))
            .map(|c| c.chapter_number.clone());
        if let Some(chapter) = chapter {
            let cmd = self.nav.open_chapter(&manhwa_id, chapter);
            self.dispatch(cmd);
        }
    }

    fn forget(&mut self, scope: Scope) {
        self.latest.remove(&scope);
    }

    fn forget_overlay(&mut self) {
        self.forget(Scope::Detail);
        self.forget(Scope::Chapter);
        self.clear_pages();
        self.chapter_error = None;
        self.detail_error = None;
    }

    /// Drops the overlay; responses still in flight for it are ignored.
    pub fn close_overlay(&mut self) {
        self.nav.close_overlay();
        self.forget_overlay();
    }

    pub fn back_to_detail(&mut self) {
        self.forget(Scope::Chapter);
        self.clear_pages();
        self.chapter_error = None;
        if let Some(cmd) = self.nav.back_to_detail() {
            self.dispatch(cmd);
        }
    }

    pub fn retry_overlay(&mut self) {
        if let Some(cmd) = self.nav.retry_overlay() {
            self.dispatch(cmd);
        }
    }

    pub fn next_image(&mut self) {
        if self.nav.next_image(self.images.len()) {
            self.request_visible_pages();
        }
    }

    pub fn prev_image(&mut self) {
        if self.nav.prev_image(self.images.len()) {
            self.request_visible_pages();
        }
    }

    pub fn next_chapter(&mut self) {
        let cmd = self
            .detail
            .as_ref()
            .and_then(|d| self.nav.next_chapter(&d.chapters));
        if let Some(cmd) = cmd {
            self.dispatch(cmd);
        }
    }

    pub fn prev_chapter(&mut self) {
        let cmd = self
            .detail
            .as_ref()
            .and_then(|d| self.nav.prev_chapter(&d.chapters));
        if let Some(cmd) = cmd {
            self.dispatch(cmd);
        }
    }

    fn move_selection(&mut self, down: bool) {
        match self.nav.overlay {
            Overlay::None => {
                let len = self.listing.entries.len();
                if down && self.selected_index + 1 < len {
                    self.selected_index += 1;
                } else if !down && self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            Overlay::Detail { .. } => {
                let len = self.detail.as_ref().map_or(0, |d| d.chapters.len());
                let i = self.chapter_list_state.selected().unwrap_or(0);
                if down && i + 1 < len {
                    self.chapter_list_state.select(Some(i + 1));
                } else if !down && i > 0 {
                    self.chapter_list_state.select(Some(i - 1));
                }
            }
            Overlay::Chapter { .. } => {
                if down {
                    self.next_image();
                } else {
                    self.prev_image();
                }
            }
        }
    }

    // Input

    /// Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if self.mode == InputMode::Searching {
            match key {
                KeyCode::Esc => {
                    self.mode = InputMode::Browse;
                    self.input.clear();
                }
                KeyCode::Enter => self.submit_search(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            }
            return false;
        }

        if key == KeyCode::Char('q') {
            return true;
        }
        self.notice = None;

        match self.nav.overlay {
            Overlay::None => match key {
                KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
                KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
                KeyCode::Enter => self.open_selected_entry(),
                KeyCode::Char('n') | KeyCode::Right => self.next_page(),
                KeyCode::Char('p') | KeyCode::Left => self.prev_page(),
                KeyCode::Char('h') => self.select_home(),
                KeyCode::Char('P') => self.select_popular(),
                KeyCode::Char('m') => self.toggle_mature(),
                KeyCode::Char('r') => self.retry_list(),
                KeyCode::Char('/') => {
                    self.input.clear();
                    self.mode = InputMode::Searching;
                }
                _ => {}
            },
            Overlay::Detail { .. } => match key {
                KeyCode::Esc => self.close_overlay(),
                KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
                KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
                KeyCode::Enter => self.open_selected_chapter(),
                KeyCode::Char('r') => self.retry_overlay(),
                _ => {}
            },
            Overlay::Chapter { .. } => match key {
                KeyCode::Esc | KeyCode::Char('b') => self.back_to_detail(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.next_image(),
                KeyCode::Left | KeyCode::Char('h') => self.prev_image(),
                KeyCode::Char(']') => self.next_chapter(),
                KeyCode::Char('[') => self.prev_chapter(),
                KeyCode::Char('r') => self.retry_overlay(),
                _ => {}
            },
        }
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.move_selection(true),
            MouseEventKind::ScrollUp => self.move_selection(false),
            MouseEventKind::Down(MouseButton::Left) => self.drag_origin = Some(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(origin) = self.drag_origin.take() {
                    self.handle_swipe(origin, mouse.column);
                }
            }
            _ => {}
        }
    }

    fn handle_swipe(&mut self, start: u16, end: u16) {
        if !matches!(self.nav.overlay, Overlay::Chapter { .. }) {
            return;
        }
        if start.saturating_sub(end) > SWIPE_THRESHOLD {
            self.next_image();
        } else if end.saturating_sub(start) > SWIPE_THRESHOLD {
            self.prev_image();
        }
    }
}
