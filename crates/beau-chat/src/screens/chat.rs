#![forbid(unsafe_code)]

//! The chat screen.
//!
//! Header on top, transcript in the middle, input bar at the bottom, all on
//! the selected background gradient. `Ctrl+B` opens the background picker
//! over everything.
//!
//! Sending a message appends it, shows the typing indicator and schedules
//! the scripted reply as a background task that sleeps for the configured
//! delay before returning [`ChatMsg::ReplyReady`].

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use beau_core::animation::{Animation, Fade, Oscillator, ease_in_out};
use beau_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use beau_core::geometry::{Rect, Sides};
use beau_core::layout::{Constraint, Flex};
use beau_core::panic_capture::render_scope;
use beau_render::cell::{Cell as BufferCell, PackedRgba};
use beau_render::display_width;
use beau_render::frame::{Frame, HitId, HitRegion};
use beau_render::style::Style;
use beau_runtime::Cmd;
use beau_widgets::background_picker::{
    BackgroundOption, BackgroundPicker, PickerOutcome, PickerState,
};
use beau_widgets::header::Header;
use beau_widgets::input::TextInput;
use beau_widgets::message_list::{Author, ChatMessage, MessageList};
use beau_widgets::typing_indicator::TypingIndicator;
use beau_widgets::{Fault, StatefulWidget, Widget};
use time::{OffsetDateTime, UtcOffset};
use unicode_segmentation::UnicodeSegmentation;

use super::Screen;
use crate::{script, theme};

/// Hit id for the send button.
pub const SEND_BUTTON: HitId = HitId::new(0xC4_01);

const SEND_LABEL: &str = " Send ➤ ";
const HINT: &str = "Enter send · Ctrl+B background · Esc quit";
const INPUT_BAR_HEIGHT: u16 = 3;
const WHEEL_ROWS: u16 = 3;

const FADE_IN: Duration = Duration::from_millis(800);
const TYPING_BLINK: Duration = Duration::from_millis(600);
const HEADER_PULSE: Duration = Duration::from_secs(2);

/// Messages produced by the chat screen's own commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMsg {
    /// The scripted reply is due.
    ReplyReady,
}

/// A forced render failure for exercising the error boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultInjection {
    pub message: String,
    /// Faulting renders left; `None` faults on every render.
    remaining: Cell<Option<u32>>,
}

impl FaultInjection {
    pub fn new(message: impl Into<String>, renders: Option<u32>) -> Self {
        Self {
            message: message.into(),
            remaining: Cell::new(renders),
        }
    }

    /// Whether this render should fault. Consumes one bounded render.
    fn fire(&self) -> bool {
        match self.remaining.get() {
            Some(0) => false,
            Some(n) => {
                self.remaining.set(Some(n - 1));
                true
            }
            None => true,
        }
    }
}

/// Startup configuration for [`ChatScreen`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub reply_delay: Duration,
    /// Index into [`theme::BACKGROUNDS`]; clamped.
    pub background: usize,
    pub fault: Option<FaultInjection>,
    /// Offset for bubble clock labels.
    pub utc_offset: UtcOffset,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            background: 0,
            fault: None,
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Chat screen state.
#[derive(Debug)]
pub struct ChatScreen {
    messages: Vec<ChatMessage>,
    next_id: u64,
    input: TextInput,
    typing: bool,
    scroll_from_bottom: u16,
    background: usize,
    /// Open picker. Its state records row positions while rendering.
    picker: Option<Cell<PickerState>>,
    fade: Fade,
    blink: Oscillator,
    pulse: Oscillator,
    reply_delay: Duration,
    fault: Option<FaultInjection>,
    utc_offset: UtcOffset,
    // Written by `view`, read back by `update` for scrolling and clicks.
    list_area: Cell<Rect>,
    send_button: Cell<Option<Rect>>,
}

impl ChatScreen {
    pub fn new(config: ChatConfig) -> Self {
        let input = TextInput::new()
            .with_placeholder(script::PLACEHOLDER)
            .with_max_length(script::MAX_MESSAGE_LEN)
            .with_style(Style::new().fg(theme::INPUT_FG).bg(theme::INPUT_FIELD_BG))
            .with_placeholder_style(Style::new().fg(theme::PLACEHOLDER_FG).bg(theme::INPUT_FIELD_BG))
            .with_focused(true);
        Self {
            messages: Vec::new(),
            next_id: 1,
            input,
            typing: false,
            scroll_from_bottom: 0,
            background: config.background.min(theme::BACKGROUNDS.len() - 1),
            picker: None,
            fade: Fade::new(FADE_IN),
            blink: Oscillator::new(TYPING_BLINK),
            pulse: Oscillator::new(HEADER_PULSE).easing(ease_in_out),
            reply_delay: config.reply_delay,
            fault: config.fault,
            utc_offset: config.utc_offset,
            list_area: Cell::new(Rect::default()),
            send_button: Cell::new(None),
        }
    }

    /// Post the welcome message.
    pub fn init(&mut self) {
        if self.messages.is_empty() {
            self.push(Author::Persona, script::WELCOME);
            tracing::info!(background = self.background_option().id, "chat started");
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Index into [`theme::BACKGROUNDS`] of the current background.
    pub fn background(&self) -> usize {
        self.background
    }

    pub fn scroll_from_bottom(&self) -> u16 {
        self.scroll_from_bottom
    }

    /// Whether an overlay (the background picker) is consuming input.
    pub fn has_overlay(&self) -> bool {
        self.picker.is_some()
    }

    /// Handle a message produced by one of this screen's commands.
    pub fn receive(&mut self, msg: ChatMsg) -> Cmd<ChatMsg> {
        match msg {
            ChatMsg::ReplyReady => {
                self.typing = false;
                let id = self.push(Author::Persona, script::REPLY);
                self.scroll_from_bottom = 0;
                tracing::info!(id, "reply delivered");
            }
        }
        Cmd::none()
    }

    fn background_option(&self) -> BackgroundOption {
        theme::BACKGROUNDS[self.background]
    }

    fn push(&mut self, author: Author, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            text: text.into(),
            author,
            timestamp: OffsetDateTime::now_utc(),
        });
        id
    }

    fn send(&mut self) -> Cmd<ChatMsg> {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            tracing::debug!("ignoring empty message");
            return Cmd::none();
        }
        let graphemes = text.graphemes(true).count();
        let id = self.push(Author::User, text);
        self.input.clear();
        self.scroll_from_bottom = 0;
        self.typing = true;
        self.blink.reset();
        tracing::info!(id, graphemes, "message sent");

        let delay = self.reply_delay;
        Cmd::task(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            ChatMsg::ReplyReady
        })
    }

    fn open_picker(&mut self) {
        self.picker = Some(Cell::new(PickerState::new(self.background)));
        self.input.set_focused(false);
        tracing::debug!("background picker opened");
    }

    fn close_picker(&mut self) {
        self.picker = None;
        self.input.set_focused(true);
    }

    fn handle_picker(&mut self, event: &Event) {
        let Some(picker) = &self.picker else {
            return;
        };
        let mut state = picker.get();
        let outcome = state.handle_event(event, theme::BACKGROUNDS.len());
        picker.set(state);
        match outcome {
            PickerOutcome::Chosen(index) => {
                self.background = index.min(theme::BACKGROUNDS.len() - 1);
                tracing::info!(background = self.background_option().id, "background changed");
                self.close_picker();
            }
            PickerOutcome::Dismissed => self.close_picker(),
            PickerOutcome::Moved | PickerOutcome::Ignored => {}
        }
    }

    fn transcript(&self) -> MessageList<'_> {
        let typing = self.typing.then(|| TypingIndicator::new(self.blink.value()));
        MessageList::new(&self.messages)
            .scroll_from_bottom(self.scroll_from_bottom)
            .typing(typing)
            .utc_offset(self.utc_offset)
    }

    fn scroll_up(&mut self, rows: u16) {
        let max = self.transcript().max_scroll(self.list_area.get());
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(rows).min(max);
    }

    fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    fn page(&self) -> u16 {
        self.list_area.get().height.saturating_sub(1).max(1)
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Cmd<ChatMsg> {
        match key.code {
            KeyCode::Enter => return self.send(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(self.page()),
            KeyCode::PageDown => self.scroll_down(self.page()),
            _ => {
                self.input.handle_event(&Event::Key(*key));
            }
        }
        Cmd::none()
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Cmd<ChatMsg> {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_ROWS),
            MouseEventKind::ScrollDown => self.scroll_down(WHEEL_ROWS),
            MouseEventKind::Down(MouseButton::Left)
                if self
                    .send_button
                    .get()
                    .is_some_and(|rect| rect.contains(mouse.x, mouse.y)) =>
            {
                return self.send();
            }
            _ => {}
        }
        Cmd::none()
    }

    fn paint_background(&self, frame: &mut Frame, area: Rect) {
        let option = self.background_option();
        for row in 0..area.height {
            let bg = option
                .color_at(row, area.height)
                .lerp(PackedRgba::BLACK, theme::OVERLAY);
            frame.buffer.fill(
                Rect::new(area.x, area.y + row, area.width, 1),
                BufferCell {
                    bg,
                    ..BufferCell::from_char(' ')
                },
            );
        }
    }

    fn render_input_bar(&self, frame: &mut Frame, bar: Rect) {
        frame.buffer.fill(
            bar,
            BufferCell {
                bg: theme::INPUT_BAR_BG,
                ..BufferCell::from_char(' ')
            },
        );
        self.send_button.set(None);
        if bar.height == 0 || bar.width < 4 {
            return;
        }

        let y = bar.y + bar.height.min(INPUT_BAR_HEIGHT) / 2;
        let send_width = (display_width(SEND_LABEL) as u16).min(bar.width / 2);
        let send = Rect::new(bar.right().saturating_sub(send_width + 1), y, send_width, 1);
        let field = Rect::new(bar.x + 1, y, send.x.saturating_sub(bar.x + 2), 1);

        frame.buffer.fill(
            field,
            BufferCell {
                bg: theme::INPUT_FIELD_BG,
                ..BufferCell::from_char(' ')
            },
        );
        self.input.render(field, frame);

        frame.buffer.fill(
            send,
            BufferCell {
                bg: theme::SEND_BG,
                ..BufferCell::from_char(' ')
            },
        );
        let label = Style::new().fg(theme::SEND_FG).bg(theme::SEND_BG).bold();
        frame.buffer.draw_text(send.x, y, SEND_LABEL, label, send.right());
        frame.register_hit(send, SEND_BUTTON, HitRegion::Button, 0);
        self.send_button.set(Some(send));

        if y + 1 < bar.bottom() {
            let hint = Style::new().fg(theme::HINT_FG).bg(theme::INPUT_BAR_BG);
            frame.buffer.draw_text(bar.x + 1, y + 1, HINT, hint, bar.right());
        }
    }
}

/// Blend every drawn glyph toward its background; `t` of 1.0 is fully shown.
fn fade_in(frame: &mut Frame, area: Rect, t: f32) {
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = frame.buffer.get_mut(x, y)
                && cell.fg.a() > 0
                && cell.bg.a() > 0
            {
                cell.fg = cell.bg.lerp(cell.fg, t);
            }
        }
    }
}

impl Screen for ChatScreen {
    type Message = ChatMsg;

    fn update(&mut self, event: &Event) -> Cmd<ChatMsg> {
        if let Event::Key(key) = event
            && key.is_press()
            && key.ctrl()
            && key.is_char('b')
        {
            if self.has_overlay() {
                self.close_picker();
            } else {
                self.open_picker();
            }
            return Cmd::none();
        }
        if self.has_overlay() {
            self.handle_picker(event);
            return Cmd::none();
        }

        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(_) => {
                self.input.handle_event(event);
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let _scope = render_scope("ChatScreen");
        if let Some(fault) = &self.fault
            && fault.fire()
        {
            Fault::new(fault.message.clone()).raise();
        }
        if area.is_empty() {
            return;
        }

        self.paint_background(frame, area);
        let rows = Flex::vertical()
            .constraints([
                Constraint::Fixed(Header::HEIGHT),
                Constraint::Fill,
                Constraint::Fixed(INPUT_BAR_HEIGHT),
            ])
            .split(area);

        Header::new(self.pulse.value()).render(rows[0], frame);

        let list_area = rows[1].inner(Sides::all(1));
        self.list_area.set(list_area);
        {
            let _scope = render_scope("MessageList");
            self.transcript().render(list_area, frame);
        }

        self.render_input_bar(frame, rows[2]);

        if let Some(picker) = &self.picker {
            let _scope = render_scope("BackgroundPicker");
            let mut state = picker.get();
            BackgroundPicker::new(&theme::BACKGROUNDS)
                .active(self.background)
                .render(area, frame, &mut state);
            picker.set(state);
        }

        let shown = self.fade.value();
        if shown < 1.0 {
            fade_in(frame, area, shown);
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.fade.tick(dt);
        self.pulse.tick(dt);
        if self.typing {
            self.blink.tick(dt);
        }
    }

    fn title(&self) -> &'static str {
        "ChatScreen"
    }
}

impl Widget for ChatScreen {
    fn render(&self, area: Rect, frame: &mut Frame) {
        self.view(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn ctrl_b() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('b')).with_modifiers(beau_core::event::Modifiers::CTRL))
    }

    fn type_text(screen: &mut ChatScreen, text: &str) {
        screen.update(&Event::Paste(text.to_string()));
    }

    fn screen() -> ChatScreen {
        let mut screen = ChatScreen::new(ChatConfig {
            reply_delay: Duration::ZERO,
            ..ChatConfig::default()
        });
        screen.init();
        screen
    }

    fn render(screen: &ChatScreen, width: u16, height: u16) -> Frame {
        let mut frame = Frame::with_hit_grid(width, height);
        screen.view(&mut frame, Rect::from_size(width, height));
        frame
    }

    #[test]
    fn init_posts_welcome_once() {
        let mut screen = screen();
        screen.init();
        assert_eq!(screen.messages().len(), 1);
        assert_eq!(screen.messages()[0].author, Author::Persona);
        assert_eq!(screen.messages()[0].text, script::WELCOME);
    }

    #[test]
    fn whitespace_is_not_sent() {
        let mut screen = screen();
        type_text(&mut screen, "   ");
        assert!(screen.update(&key(KeyCode::Enter)).is_none());
        assert_eq!(screen.messages().len(), 1);
        assert!(!screen.is_typing());
        assert_eq!(screen.input().value(), "   ");
    }

    #[test]
    fn send_then_reply() {
        let mut screen = screen();
        type_text(&mut screen, "  hello there ");
        let cmd = screen.update(&key(KeyCode::Enter));
        assert!(screen.is_typing());
        assert!(screen.input().value().is_empty());
        let last = screen.messages().last().expect("user message");
        assert_eq!(last.author, Author::User);
        assert_eq!(last.text, "hello there");

        let Cmd::Task(task) = cmd else {
            panic!("expected a reply task, got {cmd:?}");
        };
        assert_eq!(task(), ChatMsg::ReplyReady);
        screen.receive(ChatMsg::ReplyReady);
        assert!(!screen.is_typing());
        let reply = screen.messages().last().expect("reply");
        assert_eq!(reply.author, Author::Persona);
        assert_eq!(reply.text, script::REPLY);

        let ids: Vec<u64> = screen.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    }

    #[test]
    fn picker_changes_background() {
        let mut screen = screen();
        screen.update(&ctrl_b());
        assert!(screen.has_overlay());
        screen.update(&key(KeyCode::Down));
        screen.update(&key(KeyCode::Down));
        // Typing goes to the picker, not the input.
        screen.update(&key(KeyCode::Char('x')));
        assert!(screen.input().value().is_empty());
        screen.update(&key(KeyCode::Enter));
        assert!(!screen.has_overlay());
        assert_eq!(screen.background(), 2);
        assert!(screen.messages().len() == 1, "Enter in the picker must not send");
    }

    #[test]
    fn escape_and_ctrl_b_close_picker() {
        let mut screen = screen();
        screen.update(&ctrl_b());
        screen.update(&key(KeyCode::Escape));
        assert!(!screen.has_overlay());
        screen.update(&ctrl_b());
        screen.update(&ctrl_b());
        assert!(!screen.has_overlay());
        assert_eq!(screen.background(), 0);
    }

    #[test]
    fn renders_header_transcript_and_input() {
        let screen = screen();
        let frame = render(&screen, 80, 24);
        let text = frame.buffer.text();
        assert!(text.contains("Beau"));
        assert!(text.contains("Your Relationship Coach"));
        assert!(text.contains("Hi! I'm Beau"));
        assert!(text.contains(script::PLACEHOLDER));
        assert!(text.contains("Send"));
    }

    #[test]
    fn clicking_send_sends() {
        let mut screen = screen();
        let frame = render(&screen, 80, 24);
        let send = screen.send_button.get().expect("send button drawn");
        assert_eq!(
            frame.hit_test(send.x, send.y).map(|(id, region, _)| (id, region)),
            Some((SEND_BUTTON, HitRegion::Button))
        );
        type_text(&mut screen, "hi");
        let click = Event::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            send.x,
            send.y,
        ));
        assert!(!screen.update(&click).is_none());
        assert_eq!(screen.messages().len(), 2);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut screen = screen();
        for i in 0..6 {
            type_text(&mut screen, &format!("message {i}"));
            screen.update(&key(KeyCode::Enter));
            screen.receive(ChatMsg::ReplyReady);
        }
        render(&screen, 40, 16);
        screen.update(&key(KeyCode::PageUp));
        assert!(screen.scroll_from_bottom() > 0);
        for _ in 0..200 {
            screen.update(&key(KeyCode::Up));
        }
        let max = screen.transcript().max_scroll(screen.list_area.get());
        assert_eq!(screen.scroll_from_bottom(), max);
        screen.update(&Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 1, 1)));
        assert_eq!(screen.scroll_from_bottom(), max - WHEEL_ROWS);

        type_text(&mut screen, "back to the bottom");
        screen.update(&key(KeyCode::Enter));
        assert_eq!(screen.scroll_from_bottom(), 0);
    }

    #[test]
    fn fade_completes() {
        let mut screen = screen();
        assert!(screen.fade.value() < 1.0);
        for _ in 0..20 {
            screen.tick(Duration::from_millis(50));
        }
        assert!((screen.fade.value() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bounded_fault_injection() {
        let fault = FaultInjection::new("boom", Some(2));
        assert!(fault.fire());
        assert!(fault.fire());
        assert!(!fault.fire());
        let forever = FaultInjection::new("boom", None);
        assert!((0..10).all(|_| forever.fire()));
    }
}
