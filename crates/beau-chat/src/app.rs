#![forbid(unsafe_code)]

//! Top-level application model.
//!
//! The chat screen renders inside an [`ErrorBoundary`]. While the boundary
//! shows its fallback, input goes to the reset control only: Enter, `r`, or
//! a click on "Try Again". `Ctrl+C` always quits; `Esc` quits unless the
//! background picker is open.

use std::cell::RefCell;
use std::time::Duration;

use beau_core::event::{Event, KeyCode, MouseButton, MouseEventKind};
use beau_render::frame::Frame;
use beau_runtime::{Cmd, Model};
use beau_widgets::{BoundaryState, ErrorBoundary, StatefulWidget};
use time::UtcOffset;

use crate::cli::Opts;
use crate::screens::Screen;
use crate::screens::chat::{ChatConfig, ChatMsg, ChatScreen, FaultInjection};

/// Messages for the app model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMsg {
    /// A raw terminal event.
    ScreenEvent(Event),
    /// A message from one of the chat screen's commands.
    Chat(ChatMsg),
    Quit,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        Self::ScreenEvent(event)
    }
}

/// Top-level application state.
#[derive(Debug)]
pub struct AppModel {
    chat: ChatScreen,
    // Written during `view`, which only has `&self`.
    boundary: RefCell<BoundaryState>,
    tick_interval: Duration,
}

impl AppModel {
    pub fn new(chat: ChatScreen, tick_interval: Duration) -> Self {
        Self {
            chat,
            boundary: RefCell::new(BoundaryState::default()),
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    /// Build the model from parsed options.
    ///
    /// Reads the local UTC offset, so call this before any thread is spawned.
    pub fn from_opts(opts: &Opts) -> Self {
        let fault = opts
            .inject_fault
            .as_ref()
            .map(|message| FaultInjection::new(message.clone(), opts.inject_fault_renders));
        let chat = ChatScreen::new(ChatConfig {
            reply_delay: Duration::from_millis(opts.reply_delay_ms),
            background: opts.background,
            fault,
            utc_offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        });
        Self::new(chat, Duration::from_millis(opts.tick_ms))
    }

    pub fn chat(&self) -> &ChatScreen {
        &self.chat
    }

    /// Snapshot of the boundary state.
    pub fn boundary(&self) -> BoundaryState {
        self.boundary.borrow().clone()
    }

    fn is_faulted(&self) -> bool {
        self.boundary.borrow().is_faulted()
    }

    /// Whether `event` activates the fallback's reset control.
    fn is_reset(&self, event: &Event) -> bool {
        match event {
            Event::Key(key) if key.is_press() && !key.ctrl() => {
                key.code == KeyCode::Enter || key.is_char('r') || key.is_char('R')
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                self.boundary.borrow().hits_reset(mouse.x, mouse.y)
            }
            _ => false,
        }
    }

    fn handle_event(&mut self, event: Event) -> Cmd<AppMsg> {
        if let Event::Key(key) = &event
            && key.is_press()
        {
            if key.ctrl() && key.is_char('c') {
                return Cmd::quit();
            }
            if key.code == KeyCode::Escape && (self.is_faulted() || !self.chat.has_overlay()) {
                return Cmd::quit();
            }
        }

        if event == Event::Tick {
            self.chat.tick(self.tick_interval);
            return Cmd::none();
        }

        if self.is_faulted() {
            if self.is_reset(&event) {
                tracing::info!(screen = self.chat.title(), "retrying after render fault");
                self.boundary.get_mut().reset();
            }
            return Cmd::none();
        }

        self.chat.update(&event).map(AppMsg::Chat)
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        self.chat.init();
        tracing::info!(
            screen = self.chat.title(),
            tick_ms = self.tick_interval.as_millis() as u64,
            "app started"
        );
        Cmd::tick(self.tick_interval)
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::ScreenEvent(event) => self.handle_event(event),
            AppMsg::Chat(msg) => self.chat.receive(msg).map(AppMsg::Chat),
            AppMsg::Quit => Cmd::quit(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.bounds();
        let mut boundary = self.boundary.borrow_mut();
        ErrorBoundary::new(&self.chat).render(area, frame, &mut boundary);
    }
}
