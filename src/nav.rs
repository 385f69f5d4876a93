//! Navigation state: which listing is shown, which page, and what (if
//! anything) is layered over it. Transitions mutate the state in place and
//! hand back the fetch they require; performing it is the caller's job.

use crate::error::{Error, Result};
use crate::model::{ChapterId, ChapterRef};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Popular,
    Search(String),
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::Home => "Latest Manhwa".to_string(),
            View::Popular => "Popular Manhwa".to_string(),
            View::Search(query) => format!("Search Results for \"{}\"", query),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    None,
    Detail {
        manhwa_id: String,
    },
    Chapter {
        manhwa_id: String,
        chapter: ChapterId,
        image_index: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub view: View,
    pub page: u32,
    pub mature: bool,
}

/// A fetch requested by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    LoadList(ListQuery),
    LoadDetail { manhwa_id: String },
    LoadChapter { manhwa_id: String, chapter: ChapterId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    pub view: View,
    pub page: u32,
    pub mature: bool,
    pub overlay: Overlay,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            view: View::Home,
            page: 1,
            mature: false,
            overlay: Overlay::None,
        }
    }
}

impl NavigationState {
    pub fn new(mature: bool) -> Self {
        Self {
            mature,
            ..Self::default()
        }
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            view: self.view.clone(),
            page: self.page,
            mature: self.mature,
        }
    }

    fn load_list(&self) -> Command {
        Command::LoadList(self.list_query())
    }

    fn reset_view(&mut self, view: View) -> Command {
        self.view = view;
        self.page = 1;
        self.overlay = Overlay::None;
        self.load_list()
    }

    pub fn select_home(&mut self) -> Command {
        self.reset_view(View::Home)
    }

    pub fn select_popular(&mut self) -> Command {
        self.reset_view(View::Popular)
    }

    /// Leaves the state untouched when the trimmed query is empty.
    pub fn search(&mut self, query: &str) -> Result<Command> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        self.view = View::Search(query.to_string());
        self.page = 1;
        Ok(self.load_list())
    }

    pub fn next_page(&mut self) -> Command {
        self.page += 1;
        self.load_list()
    }

    pub fn prev_page(&mut self) -> Option<Command> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.load_list())
    }

    pub fn reload_list(&self) -> Command {
        self.load_list()
    }

    pub fn toggle_mature(&mut self) -> Command {
        self.mature = !self.mature;
        self.page = 1;
        self.load_list()
    }

    pub fn open_detail(&mut self, manhwa_id: &str) -> Command {
        self.overlay = Overlay::Detail {
            manhwa_id: manhwa_id.to_string(),
        };
        Command::LoadDetail {
            manhwa_id: manhwa_id.to_string(),
        }
    }

    pub fn open_chapter(&mut self, manhwa_id: &str, chapter: ChapterId) -> Command {
        self.overlay = Overlay::Chapter {
            manhwa_id: manhwa_id.to_string(),
            chapter: chapter.clone(),
            image_index: 0,
        };
        Command::LoadChapter {
            manhwa_id: manhwa_id.to_string(),
            chapter,
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    /// Leaves the chapter reader for the detail of the same manhwa, refetching it.
    pub fn back_to_detail(&mut self) -> Option<Command> {
        let manhwa_id = match &self.overlay {
            Overlay::Chapter { manhwa_id, .. } => manhwa_id.clone(),
            _ => return None,
        };
        Some(self.open_detail(&manhwa_id))
    }

    /// Repeats the fetch behind the current overlay.
    pub fn retry_overlay(&self) -> Option<Command> {
        match &self.overlay {
            Overlay::None => None,
            Overlay::Detail { manhwa_id } => Some(Command::LoadDetail {
                manhwa_id: manhwa_id.clone(),
            }),
            Overlay::Chapter {
                manhwa_id, chapter, ..
            } => Some(Command::LoadChapter {
                manhwa_id: manhwa_id.clone(),
                chapter: chapter.clone(),
            }),
        }
    }

    pub fn selected_manhwa(&self) -> Option<&str> {
        match &self.overlay {
            Overlay::None => None,
            Overlay::Detail { manhwa_id } | Overlay::Chapter { manhwa_id, .. } => Some(manhwa_id),
        }
    }

    pub fn selected_chapter(&self) -> Option<&ChapterId> {
        match &self.overlay {
            Overlay::Chapter { chapter, .. } => Some(chapter),
            _ => None,
        }
    }

    pub fn image_index(&self) -> Option<usize> {
        match &self.overlay {
            Overlay::Chapter { image_index, .. } => Some(*image_index),
            _ => None,
        }
    }

    /// Moves the reader to `index` clamped into `[0, image_count - 1]`.
    /// Returns whether the index changed.
    pub fn show_image(&mut self, index: usize, image_count: usize) -> bool {
        let Overlay::Chapter { image_index, .. } = &mut self.overlay else {
            return false;
        };
        let clamped = index.min(image_count.saturating_sub(1));
        if clamped == *image_index {
            return false;
        }
        *image_index = clamped;
        true
    }

    pub fn next_image(&mut self, image_count: usize) -> bool {
        match self.image_index() {
            Some(i) => self.show_image(i + 1, image_count),
            None => false,
        }
    }

    pub fn prev_image(&mut self, image_count: usize) -> bool {
        match self.image_index() {
            Some(i) if i > 0 => self.show_image(i - 1, image_count),
            _ => false,
        }
    }

    fn neighbor_chapter(&mut self, chapters: &[ChapterRef], forward: bool) -> Option<Command> {
        let Overlay::Chapter {
            manhwa_id, chapter, ..
        } = &self.overlay
        else {
            return None;
        };
        let pos = chapters
            .iter()
            .position(|c| &c.chapter_number == chapter)?;
        let target = if forward {
            chapters.get(pos + 1)?
        } else {
            chapters.get(pos.checked_sub(1)?)?
        };
        let manhwa_id = manhwa_id.clone();
        Some(self.open_chapter(&manhwa_id, target.chapter_number.clone()))
    }

    /// Opens the chapter after the current one in `chapters` order.
    pub fn next_chapter(&mut self, chapters: &[ChapterRef]) -> Option<Command> {
        self.neighbor_chapter(chapters, true)
    }

    pub fn prev_chapter(&mut self, chapters: &[ChapterRef]) -> Option<Command> {
        self.neighbor_chapter(chapters, false)
    }

    pub fn has_next_chapter(&self, chapters: &[ChapterRef]) -> bool {
        self.selected_chapter()
            .and_then(|ch| chapters.iter().position(|c| &c.chapter_number == ch))
            .map(|pos| pos + 1 < chapters.len())
            .unwrap_or(false)
    }

    pub fn has_prev_chapter(&self, chapters: &[ChapterRef]) -> bool {
        self.selected_chapter()
            .and_then(|ch| chapters.iter().position(|c| &c.chapter_number == ch))
            .map(|pos| pos > 0)
            .unwrap_or(false)
    }
}
