use ratatui::{prelude::*, widgets::*};
use ratatui_image::StatefulImage;

use crate::app::{App, InputMode};
use crate::model::is_placeholder;
use crate::nav::Overlay;

pub fn ui(f: &mut Frame, app: &mut App) {
    let bottom_height = if app.mode == InputMode::Searching { 3 } else { 1 };
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(bottom_height),
    ])
    .split(f.area());

    render_header(f, app, chunks[0]);
    render_listing(f, app, chunks[1]);

    match app.nav.overlay.clone() {
        Overlay::None => {}
        Overlay::Detail { manhwa_id } => {
            f.render_widget(Clear, chunks[1]);
            render_detail(f, app, chunks[1], &manhwa_id);
        }
        Overlay::Chapter {
            chapter,
            image_index,
            ..
        } => {
            f.render_widget(Clear, chunks[1]);
            render_chapter(f, app, chunks[1], chapter.as_str(), image_index);
        }
    }

    render_bottom(f, app, chunks[2]);
}

fn border(theme: Color, title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(theme)))
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.nav.view.title()),
            Style::default().fg(Color::Black).bg(app.theme).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" Page {} ", app.nav.page)),
    ];
    if app.nav.mature {
        spans.push(Span::styled(" 18+ ", Style::default().fg(Color::Red)));
    }
    if app.is_loading() {
        spans.push(Span::styled(
            " Fetching... ",
            Style::default().fg(app.theme).add_modifier(Modifier::RAPID_BLINK),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_listing(f: &mut Frame, app: &mut App, area: Rect) {
    if let Some(err) = &app.list_error {
        let t = vec![
            Line::from("Failed to load manhwa. Please try again later."),
            Line::from(Span::styled(err.clone(), Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("[ r: Try Again ]"),
        ];
        f.render_widget(
            Paragraph::new(t)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(border(app.theme, &app.nav.view.title())),
            area,
        );
        return;
    }

    if app.listing.entries.is_empty() {
        let msg = if app.is_loading() { "Fetching..." } else { "No manhwa found." };
        f.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .block(border(app.theme, &app.nav.view.title())),
            area,
        );
        return;
    }

    let c = Layout::horizontal([Constraint::Min(30), Constraint::Length(40)]).split(area);

    let items: Vec<ListItem> = app
        .listing
        .entries
        .iter()
        .map(|entry| ListItem::new(format!(" {} ", entry.title)))
        .collect();
    let list = List::new(items)
        .block(border(app.theme, &app.nav.view.title()))
        .highlight_style(Style::default().fg(Color::Black).bg(app.theme));
    app.list_state.select(Some(app.selected_index));
    f.render_stateful_widget(list, c[0], &mut app.list_state);

    if let Some(entry) = app.listing.entries.get(app.selected_index) {
        let mut t = vec![
            Line::from(Span::styled(
                entry.title.clone(),
                Style::default().fg(app.theme).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Latest: {}", entry.latest_chapter_label)),
        ];
        if let Some(status) = &entry.status {
            t.push(Line::from(format!("Status: {}", status)));
        }
        if is_placeholder(&entry.image_url) {
            t.push(Line::from(Span::styled(
                "Image Not Available",
                Style::default().fg(Color::DarkGray),
            )));
        }
        f.render_widget(
            Paragraph::new(t)
                .wrap(Wrap { trim: true })
                .block(border(app.theme, "Info")),
            c[1],
        );
    }
}

fn render_image(f: &mut Frame, app: &mut App, url: &str, area: Rect) {
    let fallback = if is_placeholder(url) {
        "Image Not Available".to_string()
    } else if app.failed_images.contains(url) {
        "[Image failed to load]".to_string()
    } else if !app.images_enabled() {
        url.to_string()
    } else {
        "[Loading Image...]".to_string()
    };

    if let Some(protocol) = app.image_protocols.get_mut(url) {
        f.render_stateful_widget(StatefulImage::default(), area, protocol);
    } else {
        f.render_widget(
            Paragraph::new(fallback)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

fn render_detail(f: &mut Frame, app: &mut App, area: Rect, manhwa_id: &str) {
    if let Some(err) = app.detail_error.clone() {
        let t = vec![
            Line::from(Span::styled(
                "Error Loading Details",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Failed to load details for manhwa ID: {}", manhwa_id)),
            Line::from(Span::styled(err, Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("[ r: Try Again ] [ Esc: Close ]"),
        ];
        f.render_widget(
            Paragraph::new(t)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(border(app.theme, "Details")),
            area,
        );
        return;
    }

    let Some(detail) = app.detail.clone() else {
        f.render_widget(
            Paragraph::new("Fetching...")
                .alignment(Alignment::Center)
                .block(border(app.theme, "Details")),
            area,
        );
        return;
    };

    let outer = border(app.theme, &detail.title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::vertical([Constraint::Percentage(45), Constraint::Min(5)]).split(inner);
    let top = Layout::horizontal([Constraint::Length(30), Constraint::Min(20)]).split(rows[0]);

    render_image(f, app, &detail.image_url, top[0]);

    let width = top[1].width.saturating_sub(1).max(10) as usize;
    let mut info = vec![
        Line::from(Span::styled(
            detail.title.clone(),
            Style::default().fg(app.theme).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Status: {}", detail.status)),
        Line::from(format!("Author: {}", detail.author)),
        Line::from(format!("Genre:  {}", detail.genre)),
        Line::from(""),
    ];
    for line in detail.description.lines() {
        for w in textwrap::wrap(line, width) {
            info.push(Line::from(w.into_owned()));
        }
    }
    f.render_widget(Paragraph::new(info), top[1]);

    let chap_block = border(app.theme, &format!("Chapters ({})", detail.chapters.len()));
    if detail.chapters.is_empty() {
        f.render_widget(
            Paragraph::new("No chapters available")
                .alignment(Alignment::Center)
                .block(chap_block),
            rows[1],
        );
        return;
    }
    let items: Vec<ListItem> = detail
        .chapters
        .iter()
        .map(|c| ListItem::new(format!("{}  {}", c.title, c.date)))
        .collect();
    let list = List::new(items)
        .block(chap_block)
        .highlight_style(Style::default().bg(app.theme).fg(Color::Black));
    f.render_stateful_widget(list, rows[1], &mut app.chapter_list_state);
}

fn render_chapter(f: &mut Frame, app: &mut App, area: Rect, chapter: &str, image_index: usize) {
    let title = format!("Chapter {}", chapter);

    if let Some(err) = app.chapter_error.clone() {
        let t = vec![
            Line::from(Span::styled(
                format!("Error Loading Chapter {}", chapter),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(err, Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("[ r: Try Again ] [ b: Back to Details ]"),
        ];
        f.render_widget(
            Paragraph::new(t)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(border(app.theme, &title)),
            area,
        );
        return;
    }

    let outer = border(app.theme, &title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);
    let c = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);

    let chapters = app.detail.as_ref().map(|d| d.chapters.as_slice()).unwrap_or(&[]);
    let enabled = |on: bool| {
        if on {
            Style::default().fg(app.theme)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let total = app.images.len();
    let page = if total == 0 { 0 } else { image_index + 1 };
    let nav_line = Line::from(vec![
        Span::styled("[ [: Prev Chapter ]", enabled(app.nav.has_prev_chapter(chapters))),
        Span::raw(format!("   ← {}/{} →   ", page, total)),
        Span::styled("[ ]: Next Chapter ]", enabled(app.nav.has_next_chapter(chapters))),
    ]);
    f.render_widget(Paragraph::new(nav_line).alignment(Alignment::Center), c[0]);

    match app.images.get(image_index).map(|img| img.url.clone()) {
        Some(url) => render_image(f, app, &url, c[1]),
        None => {
            let msg = if app.is_loading() { "Fetching..." } else { "No pages in this chapter" };
            f.render_widget(Paragraph::new(msg).alignment(Alignment::Center), c[1]);
        }
    }
}

fn render_bottom(f: &mut Frame, app: &App, area: Rect) {
    if app.mode == InputMode::Searching {
        f.render_widget(
            Paragraph::new(app.input.as_str())
                .style(Style::default().fg(app.theme))
                .block(border(app.theme, "Search Query")),
            area,
        );
        return;
    }

    if let Some(notice) = &app.notice {
        f.render_widget(
            Paragraph::new(format!(" {} ", notice))
                .style(Style::default().bg(Color::Red).fg(Color::White)),
            area,
        );
        return;
    }

    let help = match app.nav.overlay {
        Overlay::None => concat!(
            " [ /: Search ] [ h: Home ] [ P: Popular ] [ n/p: Page ]",
            " [ m: Mature ] [ Enter: Open ] [ q: Quit ] "
        ),
        Overlay::Detail { .. } => {
            " [ j/k: Select ] [ Enter: Read ] [ r: Retry ] [ Esc: Close ] [ q: Quit ] "
        }
        Overlay::Chapter { .. } => {
            " [ ←/→: Page ] [ [/]: Chapter ] [ b: Back to Details ] [ r: Retry ] [ q: Quit ] "
        }
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().bg(app.theme).fg(Color::Black)),
        area,
    );
}
