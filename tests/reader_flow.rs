//! Drives `App` through its public API with synthetic network events.

use ratatui::style::Color;
use rmanhwa::app::App;
use rmanhwa::error::Error;
use rmanhwa::model::{ChapterId, ChapterRef, Listing, ListingEntry, ManhwaDetail, PageImage};
use rmanhwa::nav::{Command, ListQuery, Overlay, View};
use rmanhwa::net::{Action, NetworkEvent, RequestId};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

struct Harness {
    app: App,
    rx: UnboundedReceiver<Action>,
}

impl Harness {
    fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            app: App::new(tx, Color::Yellow, false, None),
            rx,
        }
    }

    /// Every load dispatched since the last call, oldest first.
    fn loads(&mut self) -> Vec<(RequestId, Command)> {
        let mut out = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            if let Action::Load { id, command } = action {
                out.push((id, command));
            }
        }
        out
    }

    fn single_load(&mut self) -> (RequestId, Command) {
        let mut loads = self.loads();
        assert_eq!(loads.len(), 1, "expected exactly one request");
        loads.remove(0)
    }

    fn list_loaded(&mut self, id: RequestId, result: Result<Listing, Error>) {
        let query = self.app.nav.list_query();
        self.app
            .on_network_event(NetworkEvent::ListLoaded { id, query, result });
    }

    fn detail_loaded(&mut self, id: RequestId, manhwa_id: &str, detail: ManhwaDetail) {
        self.app.on_network_event(NetworkEvent::DetailLoaded {
            id,
            manhwa_id: manhwa_id.to_string(),
            result: Ok(detail),
        });
    }

    fn chapter_loaded(
        &mut self,
        id: RequestId,
        chapter: &str,
        result: Result<Vec<PageImage>, Error>,
    ) {
        self.app.on_network_event(NetworkEvent::ChapterLoaded {
            id,
            manhwa_id: "solo".to_string(),
            chapter: ChapterId::from(chapter),
            result,
        });
    }
}

fn listing(ids: &[&str]) -> Listing {
    Listing {
        entries: ids
            .iter()
            .map(|id| ListingEntry {
                id: id.to_string(),
                title: id.to_uppercase(),
                image_url: "cover.jpg".to_string(),
                status: None,
                latest_chapter_label: "Chapter N/A".to_string(),
            })
            .collect(),
        skipped: 0,
    }
}

fn detail(chapter_ids: &[&str]) -> ManhwaDetail {
    ManhwaDetail {
        title: "Solo".to_string(),
        image_url: "cover.jpg".to_string(),
        description: "No description available.".to_string(),
        status: "Ongoing".to_string(),
        author: "Author unknown".to_string(),
        genre: "Genre unknown".to_string(),
        chapters: chapter_ids
            .iter()
            .map(|id| ChapterRef {
                chapter_number: ChapterId::from(*id),
                title: format!("Chapter {id}"),
                date: "2024-01-01".to_string(),
            })
            .collect(),
    }
}

fn pages(n: usize) -> Vec<PageImage> {
    (0..n)
        .map(|i| PageImage {
            url: format!("p{i}.jpg"),
        })
        .collect()
}

/// Home listing loaded, detail for "solo" loaded, reader open on `chapter`.
fn reading(chapter_ids: &[&str], chapter: &str, page_count: usize) -> Harness {
    let mut h = Harness::new();
    h.app.start();
    let (id, _) = h.single_load();
    h.list_loaded(id, Ok(listing(&["solo"])));

    h.app.open_selected_entry();
    let (id, _) = h.single_load();
    h.detail_loaded(id, "solo", detail(chapter_ids));

    let index = chapter_ids.iter().position(|c| *c == chapter).unwrap();
    h.app.chapter_list_state.select(Some(index));
    h.app.open_selected_chapter();
    let (id, _) = h.single_load();
    h.chapter_loaded(id, chapter, Ok(pages(page_count)));
    h
}

#[test]
fn startup_loads_first_home_page() {
    let mut h = Harness::new();
    h.app.start();
    let (_, cmd) = h.single_load();
    assert_eq!(
        cmd,
        Command::LoadList(ListQuery {
            view: View::Home,
            page: 1,
            mature: false
        })
    );
    assert!(h.app.is_loading());
}

#[test]
fn failed_list_keeps_view_and_clears_loading() {
    let mut h = Harness::new();
    h.app.select_popular();
    let (id, _) = h.single_load();
    h.list_loaded(
        id,
        Err(Error::InvalidResponseShape("expected an array of manhwa".into())),
    );

    assert!(!h.app.is_loading());
    assert_eq!(h.app.nav.view, View::Popular);
    assert!(h
        .app
        .list_error
        .as_deref()
        .unwrap()
        .contains("expected an array of manhwa"));

    h.app.retry_list();
    let (id, _) = h.single_load();
    assert!(h.app.list_error.is_none());
    h.list_loaded(id, Ok(listing(&["a"])));
    assert_eq!(h.app.listing.entries.len(), 1);
}

#[test]
fn list_failure_leaves_open_detail_alone() {
    let mut h = reading(&["2", "1"], "2", 3);
    h.app.back_to_detail();
    let (id, _) = h.single_load();
    h.detail_loaded(id, "solo", detail(&["2", "1"]));

    h.app.next_page();
    let (id, _) = h.single_load();
    h.list_loaded(id, Err(Error::Network("HTTP error! Status: 500".into())));

    assert!(matches!(h.app.nav.overlay, Overlay::Detail { .. }));
    assert!(h.app.detail.is_some());
    assert!(h.app.detail_error.is_none());
}

#[test]
fn stale_list_response_is_ignored() {
    let mut h = Harness::new();
    h.app.start();
    let (first, _) = h.single_load();
    h.app.select_popular();
    let (second, _) = h.single_load();

    h.list_loaded(second, Ok(listing(&["popular"])));
    h.list_loaded(first, Ok(listing(&["home"])));

    assert_eq!(h.app.listing.entries[0].id, "popular");
    assert!(!h.app.is_loading());
}

#[test]
fn chapter_opens_on_first_page() {
    let h = reading(&["3", "2", "1"], "2", 4);
    assert_eq!(h.app.nav.image_index(), Some(0));
    assert_eq!(h.app.images, pages(4));
    assert!(!h.app.is_loading());
}

#[test]
fn next_image_at_last_page_is_idempotent() {
    let mut h = reading(&["1"], "1", 2);
    h.app.next_image();
    h.app.next_image();
    h.app.next_image();
    assert_eq!(h.app.nav.image_index(), Some(1));
}

#[test]
fn next_chapter_on_last_element_does_nothing() {
    let mut h = reading(&["3", "2", "1"], "1", 2);
    let before = h.app.nav.clone();
    h.app.next_chapter();
    assert!(h.loads().is_empty());
    assert_eq!(h.app.nav, before);
    assert!(!h.app.is_loading());
}

#[test]
fn prev_chapter_moves_back_in_list_order() {
    let mut h = reading(&["3", "2", "1"], "2", 2);
    h.app.next_image();
    h.app.prev_chapter();
    let (_, cmd) = h.single_load();
    assert_eq!(
        cmd,
        Command::LoadChapter {
            manhwa_id: "solo".into(),
            chapter: ChapterId::from("3")
        }
    );
    assert_eq!(h.app.nav.image_index(), Some(0));
    assert!(h.app.images.is_empty());
}

#[test]
fn close_then_reopen_detail_shows_same_chapters() {
    let mut h = reading(&["3", "2", "1"], "2", 2);
    let chapters_before = h.app.detail.as_ref().unwrap().chapters.clone();

    h.app.close_overlay();
    assert_eq!(h.app.nav.overlay, Overlay::None);
    assert!(h.app.images.is_empty());
    assert_eq!(h.app.nav.selected_chapter(), None);

    h.app.open_detail("solo");
    assert!(matches!(&h.app.nav.overlay, Overlay::Detail { manhwa_id } if manhwa_id == "solo"));
    assert_eq!(h.app.detail.as_ref().unwrap().chapters, chapters_before);
}

#[test]
fn back_to_detail_reselects_chapter_just_read() {
    let mut h = reading(&["3", "2", "1"], "2", 2);
    h.app.next_chapter();
    let (id, _) = h.single_load();
    h.chapter_loaded(id, "1", Ok(pages(1)));

    h.app.back_to_detail();
    let (id, cmd) = h.single_load();
    assert!(matches!(cmd, Command::LoadDetail { .. }));
    h.detail_loaded(id, "solo", detail(&["3", "2", "1"]));
    assert_eq!(h.app.chapter_list_state.selected(), Some(2));
}

#[test]
fn reselection_falls_back_to_first_chapter() {
    let mut h = reading(&["3", "2", "1"], "2", 2);
    h.app.back_to_detail();
    let (id, _) = h.single_load();
    h.detail_loaded(id, "solo", detail(&["5", "4"]));
    assert_eq!(h.app.chapter_list_state.selected(), Some(0));
}

#[test]
fn opening_another_manhwa_drops_previous_detail() {
    let mut h = reading(&["1"], "1", 1);
    h.app.close_overlay();
    h.app.open_detail("other");
    assert!(h.app.detail.is_none());
}

#[test]
fn response_after_close_is_discarded() {
    let mut h = Harness::new();
    h.app.open_detail("solo");
    let (id, _) = h.single_load();
    h.app.close_overlay();
    h.detail_loaded(id, "solo", detail(&["1"]));

    assert!(h.app.detail.is_none());
    assert!(!h.app.is_loading());
}

#[test]
fn chapter_failure_keeps_detail_for_retry() {
    let mut h = Harness::new();
    h.app.open_detail("solo");
    let (id, _) = h.single_load();
    h.detail_loaded(id, "solo", detail(&["2", "1"]));

    h.app.open_selected_chapter();
    let (id, _) = h.single_load();
    h.chapter_loaded(id, "2", Err(Error::InvalidChapterFormat));

    assert!(h.app.chapter_error.is_some());
    assert!(h.app.detail.is_some());

    h.app.retry_overlay();
    let (_, cmd) = h.single_load();
    assert_eq!(
        cmd,
        Command::LoadChapter {
            manhwa_id: "solo".into(),
            chapter: ChapterId::from("2")
        }
    );
    assert!(h.app.chapter_error.is_none());
}

#[test]
fn detail_failure_offers_retry() {
    let mut h = Harness::new();
    h.app.open_detail("solo");
    let (id, _) = h.single_load();
    h.app.on_network_event(NetworkEvent::DetailLoaded {
        id,
        manhwa_id: "solo".into(),
        result: Err(Error::Network("HTTP error! Status: 503".into())),
    });
    assert_eq!(
        h.app.detail_error.as_deref(),
        Some("HTTP error! Status: 503")
    );

    h.app.retry_overlay();
    let (_, cmd) = h.single_load();
    assert_eq!(
        cmd,
        Command::LoadDetail {
            manhwa_id: "solo".into()
        }
    );
}

#[test]
fn skipped_entries_are_reported() {
    let mut h = Harness::new();
    h.app.start();
    let (id, _) = h.single_load();
    let mut page = listing(&["a"]);
    page.skipped = 2;
    h.list_loaded(id, Ok(page));
    assert_eq!(
        h.app.notice.as_deref(),
        Some("Skipped 2 entries without an id")
    );
}
