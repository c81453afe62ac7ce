//! Plain-text session view.
//!
//! [`render`] turns the App's state into a block of lines; [`TextDriver`]
//! writes that block, plus any requested [`Overlay`], on every render.

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use poker_app::{App, Driver};
use poker_client::{ConnectionState, SessionState};
use qrcode::QrCode;
use tokio::sync::mpsc;

use crate::commands::{HELP, Overlay};

const NAME_WIDTH: usize = 16;

/// Render the session view.
pub fn render(app: &App) -> String {
    let state = app.store().state();
    let mut out = String::new();

    let title = match state.room_name.trim() {
        "" => "(unnamed room)",
        name => name,
    };
    let _ = writeln!(out, "== {title} [{}] ==", state.connection);
    let _ = writeln!(
        out,
        "host: {}  room: {}  you: {}",
        or_dash(&state.host_name),
        state.room_id.as_deref().unwrap_or("-"),
        or_dash(&state.username),
    );
    let _ = writeln!(out, "deck: {} [{}]", state.deck, state.deck.cards().join(" "));

    match &state.session {
        Some(session) if session.estimates.is_empty() => {
            let _ = writeln!(out, "  nobody has joined yet");
        },
        Some(session) => {
            for entry in &session.estimates {
                let own = entry.username == state.username.trim();
                let marker = if own { '*' } else { ' ' };
                let _ = writeln!(
                    out,
                    " {marker}{:<NAME_WIDTH$} {}",
                    entry.username,
                    shown_estimate(&state, own, entry.estimate.as_deref())
                );
            }
            let voted = session.vote_count();
            let visibility = if session.is_visible { "shown" } else { "hidden" };
            let _ = writeln!(
                out,
                "{voted}/{} voted, estimates {visibility}",
                session.estimates.len()
            );
        },
        None if state.connection == ConnectionState::Closed => {
            let _ = writeln!(out, "  not in a room, `create` or `open <url>`");
        },
        None => {
            let _ = writeln!(out, "  waiting for the relay...");
        },
    }

    if let Some(confirmation) = app.confirmation() {
        let _ = writeln!(out, "? {confirmation} (yes/no)");
    }
    out
}

/// What a participant's estimate shows as. Others' votes stay hidden until
/// revealed; the local one is always visible to its owner.
fn shown_estimate<'a>(state: &'a SessionState, own: bool, estimate: Option<&'a str>) -> &'a str {
    let estimate = if own { state.my_estimate.as_deref() } else { estimate };
    match estimate {
        Some(card) if own || state.estimates_visible => card,
        Some(_) => "voted",
        None => "-",
    }
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text.trim() }
}

/// Render `data` as a terminal QR code, each module two full-block
/// characters wide so it stays roughly square.
pub fn qr(data: &str) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(data.as_bytes())?;
    Ok(code.render::<char>().quiet_zone(true).module_dimensions(2, 1).build())
}

/// [`Driver`] writing the text view to any writer.
pub struct TextDriver<W> {
    out: W,
    overlays: mpsc::UnboundedReceiver<Overlay>,
}

impl<W: Write + Send> TextDriver<W> {
    /// Driver writing to `out`. Overlays sent on the paired sender are shown
    /// on the next render.
    pub fn new(out: W, overlays: mpsc::UnboundedReceiver<Overlay>) -> Self {
        Self { out, overlays }
    }

    fn overlay(&mut self, app: &App, overlay: Overlay) -> io::Result<()> {
        match overlay {
            Overlay::Help => writeln!(self.out, "{HELP}"),
            Overlay::Notice(message) => writeln!(self.out, "! {message}"),
            Overlay::Link | Overlay::Qr => {
                let Some(url) = app.share_url() else {
                    return writeln!(self.out, "! no room to share yet");
                };
                writeln!(self.out, "link: {url}")?;
                if overlay == Overlay::Qr {
                    match qr(&url) {
                        Ok(code) => writeln!(self.out, "{code}")?,
                        Err(error) => writeln!(self.out, "! cannot render QR code: {error}")?,
                    }
                }
                Ok(())
            },
        }
    }
}

impl<W: Write + Send> Driver for TextDriver<W> {
    type Error = io::Error;

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        writeln!(self.out)?;
        self.out.write_all(render(app).as_bytes())?;
        while let Ok(overlay) = self.overlays.try_recv() {
            self.overlay(app, overlay)?;
        }
        self.out.flush()
    }
}
