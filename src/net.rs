use std::time::Duration;

use image::DynamicImage;
use log::{error, info};
use ratatui::style::Color;
use tokio::sync::mpsc;

use crate::api::Client;
use crate::config::load_config_theme;
use crate::error::Result;
use crate::model::{ChapterId, ChapterImages, Listing, ManhwaDetail};
use crate::nav::{Command, ListQuery};

/// Monotonic token attached to every fetch so late answers can be recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

#[derive(Debug)]
pub enum Action {
    Load { id: RequestId, command: Command },
    DownloadImage(String),
}

pub enum NetworkEvent {
    ListLoaded {
        id: RequestId,
        query: ListQuery,
        result: Result<Listing>,
    },
    DetailLoaded {
        id: RequestId,
        manhwa_id: String,
        result: Result<ManhwaDetail>,
    },
    ChapterLoaded {
        id: RequestId,
        manhwa_id: String,
        chapter: ChapterId,
        result: Result<ChapterImages>,
    },
    ImageDownloaded(String, Result<DynamicImage>),
    ThemeUpdate(Color),
}

async fn perform(client: &Client, id: RequestId, command: Command) -> NetworkEvent {
    match command {
        Command::LoadList(query) => {
            let result = client.list(&query).await;
            if let Err(err) = &result {
                error!("Error loading manhwa list ({:?}): {err}", query.view);
            }
            NetworkEvent::ListLoaded { id, query, result }
        }
        Command::LoadDetail { manhwa_id } => {
            let result = client.detail(&manhwa_id).await;
            if let Err(err) = &result {
                error!("Error loading manhwa details for {manhwa_id}: {err}");
            }
            NetworkEvent::DetailLoaded {
                id,
                manhwa_id,
                result,
            }
        }
        Command::LoadChapter { manhwa_id, chapter } => {
            let result = client.chapter(&manhwa_id, &chapter).await;
            if let Err(err) = &result {
                error!("Error loading chapter {chapter} of {manhwa_id}: {err}");
            }
            NetworkEvent::ChapterLoaded {
                id,
                manhwa_id,
                chapter,
                result,
            }
        }
    }
}

/// Serves actions until the UI drops its sender. Each request runs on its own
/// task, so overlapping requests race and the app sorts them out by token.
pub async fn run_network_loop(
    client: Client,
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    event_tx: mpsc::UnboundedSender<NetworkEvent>,
) {
    while let Some(action) = action_rx.recv().await {
        let client = client.clone();
        let event_tx = event_tx.clone();

        tokio::spawn(async move {
            let event = match action {
                Action::Load { id, command } => perform(&client, id, command).await,
                Action::DownloadImage(url) => {
                    let result = client.image(&url).await;
                    NetworkEvent::ImageDownloaded(url, result)
                }
            };
            let _ = event_tx.send(event);
        });
    }
    info!("network loop stopped");
}

pub async fn run_config_watcher(event_tx: mpsc::UnboundedSender<NetworkEvent>) {
    let mut last_color = load_config_theme();
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    loop {
        interval.tick().await;
        let new_color = load_config_theme();
        if new_color != last_color {
            last_color = new_color;
            if event_tx.send(NetworkEvent::ThemeUpdate(new_color)).is_err() {
                break;
            }
        }
    }
}
