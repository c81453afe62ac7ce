//! Session view state machine.
//!
//! This module defines the [`App`] state machine, which owns the
//! [`SessionStore`] of one view and decides what every user action and channel
//! event means for it.
//!
//! This is a pure state machine: it consumes [`UserInput`] and [`AppEvent`]
//! inputs and produces [`AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Prevents actions that are not allowed right now (returns no actions).
//! - Stages destructive actions until the user confirms them.
//! - Reconciles the local estimate and reveal toggle with each snapshot.

use poker_client::{
    ConnectionState, Deck, Endpoint, Reconciler, RoomLink, SessionFacts, SessionState,
    SessionStore, is_member,
};
use poker_proto::{Session, intent};

use crate::{AppAction, AppConfig, AppEvent, Confirmation, UserInput};

/// Session view state machine.
///
/// Connection state and snapshot are written only from [`AppEvent`]s.
/// Identity and the local estimate are written only from user operations and
/// snapshot reconciliation.
#[derive(Debug)]
pub struct App {
    store: SessionStore,
    reconciler: Reconciler,
    confirmation: Option<Confirmation>,
    config: AppConfig,
}

impl App {
    /// App over `store`.
    pub fn new(store: SessionStore, config: AppConfig) -> Self {
        Self { store, reconciler: Reconciler::new(), confirmation: None, config }
    }

    /// The store this view renders from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Destructive action waiting for confirmation.
    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Process a channel event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::ConnectionChanged(state) => {
                // Left over from a link the view already walked away from.
                if state != ConnectionState::Closed && self.store.read(|s| s.room_id.is_none()) {
                    tracing::debug!(%state, "connection change without a room, ignored");
                    return Vec::new();
                }
                let mut changed = self.store.set_connection(state);
                if state == ConnectionState::Closed {
                    changed |= self.store.set_session(None);
                }
                render_if(changed)
            },
            AppEvent::SnapshotReceived(session) => self.apply_snapshot(session),
        }
    }

    /// Process a user input and return actions.
    pub fn handle_input(&mut self, input: UserInput) -> Vec<AppAction> {
        match input {
            UserInput::SetHostName(name) => render_if(self.store.set_host_name(name)),
            UserInput::SetRoomName(name) => render_if(self.store.set_room_name(name)),
            UserInput::SetUsername(name) => render_if(self.store.set_username(name)),
            UserInput::SetDeck(deck) => self.set_deck(deck),
            UserInput::OpenLink(link) => self.open_link(link),
            UserInput::CreateRoom => self.create_room(),
            UserInput::JoinRoom => self.join_room(),
            UserInput::Vote(card) => self.vote(&card),
            UserInput::ToggleVisibility => self.toggle_visibility(),
            UserInput::RequestClearVotes => self.request_clear_votes(),
            UserInput::RequestRemoveUser(username) => self.request_remove_user(username),
            UserInput::Confirm => self.confirm(),
            UserInput::Cancel => self.cancel(),
            UserInput::Disconnect => self.disconnect(),
            UserInput::Redraw => vec![AppAction::Render],
            UserInput::Quit => vec![AppAction::Quit],
        }
    }

    /// Switch decks. The local estimate is dropped if the new deck lacks it.
    pub fn set_deck(&mut self, deck: Deck) -> Vec<AppAction> {
        let mut changed = self.store.set_deck(deck);
        let stale = self.store.read(|s| s.my_estimate.as_deref().is_some_and(|e| !deck.contains(e)));
        if stale {
            changed |= self.store.set_my_estimate(None);
        }
        render_if(changed)
    }

    /// Open a room from a shared link, then connect to it.
    ///
    /// Opening the room the view is already in only picks up the room name.
    /// A blank host or room id is prevented.
    pub fn open_link(&mut self, link: RoomLink) -> Vec<AppAction> {
        if link.host_name.trim().is_empty() || link.room_id.trim().is_empty() {
            tracing::debug!("open link prevented");
            return Vec::new();
        }
        let same_room = self.is_session_active()
            && self.store.read(|s| {
                s.room_id.as_deref() == Some(link.room_id.as_str())
                    && s.host_name.trim() == link.host_name
            });
        if same_room {
            tracing::debug!(room = %link.room_id, "already in linked room");
            return render_if(self.store.set_room_name(link.room_name));
        }

        tracing::info!(host = %link.host_name, room = %link.room_id, "opening shared room");
        self.store.set_host_name(link.host_name);
        self.store.set_room_name(link.room_name);
        self.store.set_room_id(Some(link.room_id));
        self.connect()
    }

    /// Mint a new room id and connect to it.
    pub fn create_room(&mut self) -> Vec<AppAction> {
        if !self.can_create_room() {
            tracing::debug!("create room prevented");
            return Vec::new();
        }
        let room_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(room = %room_id, "creating room");
        self.store.set_room_id(Some(room_id));
        self.connect()
    }

    /// Join the connected room without voting.
    pub fn join_room(&mut self) -> Vec<AppAction> {
        if !self.can_join() {
            tracing::debug!("join prevented");
            return Vec::new();
        }
        let username = self.store.read(|s| s.username.trim().to_owned());
        vec![AppAction::Send(intent::vote(username, None)), AppAction::Render]
    }

    /// Vote `card`. Voting the current estimate again retracts it.
    pub fn vote(&mut self, card: &str) -> Vec<AppAction> {
        if !self.can_vote() {
            tracing::debug!(card, "vote prevented");
            return Vec::new();
        }
        let (username, deck, current) =
            self.store.read(|s| (s.username.trim().to_owned(), s.deck, s.my_estimate.clone()));
        if !deck.contains(card) {
            tracing::debug!(card, %deck, "card not in deck");
            return Vec::new();
        }

        let estimate = if current.as_deref() == Some(card) { None } else { Some(card.to_owned()) };
        self.store.set_my_estimate(estimate.clone());
        vec![AppAction::Send(intent::vote(username, estimate.as_deref())), AppAction::Render]
    }

    /// Flip the reveal toggle for everyone.
    pub fn toggle_visibility(&mut self) -> Vec<AppAction> {
        if !self.is_member() {
            tracing::debug!("toggle visibility prevented");
            return Vec::new();
        }
        let visible = !self.store.read(|s| s.estimates_visible);
        self.store.set_estimates_visible(visible);
        vec![AppAction::Send(intent::reveal(visible)), AppAction::Render]
    }

    /// Stage clearing every vote.
    pub fn request_clear_votes(&mut self) -> Vec<AppAction> {
        if !self.is_member() {
            tracing::debug!("clear votes prevented");
            return Vec::new();
        }
        self.stage(Confirmation::ClearVotes)
    }

    /// Stage removing `username`.
    pub fn request_remove_user(&mut self, username: String) -> Vec<AppAction> {
        let target_present = self
            .store
            .read(|s| s.session.as_ref().is_some_and(|session| is_member(session, &username)));
        if !self.is_member() || !target_present {
            tracing::debug!(%username, "remove user prevented");
            return Vec::new();
        }
        self.stage(Confirmation::RemoveUser(username))
    }

    /// Send the staged intent. There is no undo.
    pub fn confirm(&mut self) -> Vec<AppAction> {
        match self.confirmation.take() {
            Some(confirmation) => {
                tracing::info!(%confirmation, "confirmed");
                vec![AppAction::Send(confirmation.intent()), AppAction::Render]
            },
            None => Vec::new(),
        }
    }

    /// Drop the staged intent.
    pub fn cancel(&mut self) -> Vec<AppAction> {
        render_if(self.confirmation.take().is_some())
    }

    /// Leave the room: disconnect the channel, then reset the session.
    pub fn disconnect(&mut self) -> Vec<AppAction> {
        self.confirmation = None;
        self.reconciler.reset();
        self.store.reset_session();
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Host and room name are set and no connection attempt is under way.
    pub fn can_create_room(&self) -> bool {
        self.store.read(|s| {
            !s.host_name.trim().is_empty()
                && !s.room_name.trim().is_empty()
                && s.connection != ConnectionState::Connecting
        })
    }

    /// Open, named, and not yet a member.
    pub fn can_join(&self) -> bool {
        self.store.read(|s| is_open_and_named(s) && !facts(s).is_some_and(|f| f.is_member))
    }

    /// Open, named, and a member.
    pub fn can_vote(&self) -> bool {
        self.is_member()
    }

    /// A room is set and the link fields are filled in.
    pub fn can_share_link(&self) -> bool {
        self.share_link().is_some()
    }

    /// A room is set and the channel targets it.
    pub fn is_session_active(&self) -> bool {
        self.store.read(|s| s.room_id.is_some() && s.connection != ConnectionState::Closed)
    }

    /// Link to the current room.
    pub fn share_link(&self) -> Option<RoomLink> {
        self.store.read(|s| {
            let room_id = s.room_id.clone()?;
            let link = RoomLink {
                host_name: s.host_name.trim().to_owned(),
                room_id,
                room_name: s.room_name.trim().to_owned(),
            };
            (!link.host_name.is_empty() && !link.room_name.is_empty()).then_some(link)
        })
    }

    /// Full URL of [`App::share_link`], rooted at the configured origin.
    pub fn share_url(&self) -> Option<String> {
        let link = self.share_link()?;
        match link.to_url(&self.config.origin) {
            Ok(url) => Some(url.into()),
            Err(error) => {
                tracing::warn!(%error, "cannot build share link");
                None
            },
        }
    }

    fn is_member(&self) -> bool {
        self.store.read(|s| is_open_and_named(s) && facts(s).is_some_and(|f| f.is_member))
    }

    fn stage(&mut self, confirmation: Confirmation) -> Vec<AppAction> {
        tracing::debug!(%confirmation, "awaiting confirmation");
        self.confirmation = Some(confirmation);
        vec![AppAction::Render]
    }

    fn connect(&mut self) -> Vec<AppAction> {
        let Some(endpoint) = self.store.read(|s| {
            let room_id = s.room_id.clone()?;
            Some(Endpoint::new(s.host_name.trim(), room_id).with_scheme(self.config.scheme))
        }) else {
            return Vec::new();
        };

        self.confirmation = None;
        self.reconciler.reset();
        self.store.set_session(None);
        vec![AppAction::Connect { endpoint }, AppAction::Render]
    }

    fn apply_snapshot(&mut self, session: Session) -> Vec<AppAction> {
        if self.store.read(|s| s.connection == ConnectionState::Closed) {
            tracing::debug!("snapshot while closed, discarded");
            return Vec::new();
        }

        let username = self.store.read(|s| s.username.trim().to_owned());
        let facts = SessionFacts::derive(&session, &username);
        let cleared = self.reconciler.observe(&session);

        let mut changed = false;
        if facts.is_member {
            changed |= self.store.set_my_estimate(facts.own_estimate);
        }
        changed |= self.store.set_estimates_visible(session.is_visible);
        if cleared {
            tracing::debug!("estimates cleared");
            changed |= self.store.clear_votes();
        }
        changed |= self.store.set_session(Some(session));
        render_if(changed)
    }
}

fn is_open_and_named(state: &SessionState) -> bool {
    state.connection == ConnectionState::Open && !state.username.trim().is_empty()
}

fn facts(state: &SessionState) -> Option<SessionFacts> {
    let session = state.session.as_ref()?;
    Some(SessionFacts::derive(session, state.username.trim()))
}

fn render_if(changed: bool) -> Vec<AppAction> {
    if changed { vec![AppAction::Render] } else { Vec::new() }
}
