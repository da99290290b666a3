#![forbid(unsafe_code)]

//! Elm-style runtime for terminal applications.
//!
//! The program runtime manages the update/view loop, handling events and
//! rendering frames. It separates state (Model) from rendering (view) and
//! provides a command pattern for side effects.
//!
//! # Example
//!
//! ```ignore
//! use beau_runtime::{Cmd, Model, Program, ProgramConfig};
//! use beau_core::event::Event;
//! use beau_render::frame::Frame;
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! enum Msg {
//!     Increment,
//!     Quit,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             _ => Msg::Increment,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => {
//!                 self.count += 1;
//!                 Cmd::none()
//!             }
//!             Msg::Quit => Cmd::quit(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         // Render counter
//!     }
//! }
//!
//! Program::new(Counter { count: 0 }, ProgramConfig::default())?.run()?;
//! ```

use std::any::Any;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use beau_core::event::Event;
use beau_core::panic_capture::{catch_contained, install_capture_hook};
use beau_core::terminal_session::{SessionOptions, TerminalSession};
use beau_render::frame::Frame;
use beau_render::presenter::Presenter;
use tracing::{debug_span, info_span};

/// The Model trait defines application state and behavior.
///
/// Implementations define how the application responds to events
/// and renders its current state.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Messages represent actions that update the model state.
    /// Must be convertible from terminal events.
    type Message: From<Event> + Send + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    fn view(&self, frame: &mut Frame);
}

/// Commands represent side effects to be executed by the runtime.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver [`Event::Tick`] at this interval from now on.
    Tick(Duration),
    /// Record a log line. The terminal belongs to the UI, so this goes to
    /// `tracing`.
    Log(String),
    /// Run a blocking closure on a background thread; its return value is
    /// sent back to `update`. Results arriving after the program stopped
    /// are dropped. A panicking task is logged and sends nothing; the
    /// terminal session stays up.
    Task(Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Task(_) => write!(f, "Task"),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a batch of commands, collapsing trivial batches.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        cmds.retain(|c| !matches!(c, Self::None));
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Create a tick command.
    #[inline]
    pub fn tick(duration: Duration) -> Self {
        Self::Tick(duration)
    }

    /// Create a background task command.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Convert the messages this command produces, including those returned
    /// by tasks.
    pub fn map<N>(self, f: fn(M) -> N) -> Cmd<N>
    where
        M: 'static,
        N: 'static,
    {
        match self {
            Self::None => Cmd::None,
            Self::Quit => Cmd::Quit,
            Self::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(|c| c.map(f)).collect()),
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Tick(d) => Cmd::Tick(d),
            Self::Log(s) => Cmd::Log(s),
            Self::Task(task) => Cmd::Task(Box::new(move || f(task()))),
        }
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Log(_) => "Log",
            Self::Task(_) => "Task",
        }
    }

    /// True for [`Cmd::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Configuration for the program runtime.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Use the alternate screen.
    pub alternate_screen: bool,
    /// Enable mouse capture.
    pub mouse: bool,
    /// Enable bracketed paste.
    pub bracketed_paste: bool,
    /// Input poll timeout while no tick is scheduled.
    pub poll_timeout: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            bracketed_paste: true,
            poll_timeout: Duration::from_millis(100),
        }
    }
}

impl ProgramConfig {
    #[must_use]
    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    #[must_use]
    pub fn with_alternate_screen(mut self, alternate_screen: bool) -> Self {
        self.alternate_screen = alternate_screen;
        self
    }
}

/// The program runtime that manages the update/view loop.
pub struct Program<M: Model> {
    model: M,
    presenter: Presenter<Stdout>,
    // Declared after `presenter`: the terminal is restored after the last frame.
    session: TerminalSession,
    running: bool,
    dirty: bool,
    width: u16,
    height: u16,
    tick_rate: Option<Duration>,
    last_tick: Instant,
    poll_timeout: Duration,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    /// Each task thread yields its panic message, if it panicked.
    task_handles: Vec<JoinHandle<Result<(), String>>>,
}

impl<M: Model> Program<M> {
    /// Enter the terminal session and prepare the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be configured.
    pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
            bracketed_paste: config.bracketed_paste,
        })?;
        let (width, height) = session.size()?;
        let (task_sender, task_receiver) = mpsc::channel();

        Ok(Self {
            model,
            presenter: Presenter::new(io::stdout()),
            session,
            running: true,
            dirty: true,
            width: width.max(1),
            height: height.max(1),
            tick_rate: None,
            last_tick: Instant::now(),
            poll_timeout: config.poll_timeout,
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
        })
    }

    /// Run until the model returns [`Cmd::Quit`].
    ///
    /// # Errors
    ///
    /// Returns an error on terminal I/O failure.
    pub fn run(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = info_span!("beau.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        self.render_frame()?;

        while self.running {
            let timeout = self.effective_timeout();
            if self.session.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.process_task_results()?;
            self.reap_finished_tasks();

            if self.running && self.should_tick() {
                self.dispatch(M::Message::from(Event::Tick), "Tick")?;
            }

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }

        tracing::info!(pending_tasks = self.task_handles.len(), "program stopped");
        Ok(())
    }

    /// Borrow the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            self.width = width.max(1);
            self.height = height.max(1);
            self.presenter.invalidate();
        }
        let kind = match &event {
            Event::Key(_) => "Key",
            Event::Mouse(_) => "Mouse",
            Event::Resize { .. } => "Resize",
            Event::Paste(_) => "Paste",
            Event::Focus(_) => "Focus",
            Event::Tick => "Tick",
        };
        self.dispatch(M::Message::from(event), kind)
    }

    fn dispatch(&mut self, msg: M::Message, msg_type: &'static str) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!(
                "beau.program.update",
                msg_type,
                duration_us = tracing::field::Empty,
                cmd_type = tracing::field::Empty
            )
            .entered();
            let start = Instant::now();
            let cmd = self.model.update(msg);
            tracing::Span::current().record("duration_us", start.elapsed().as_micros() as u64);
            tracing::Span::current().record("cmd_type", cmd.type_name());
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch(m, "Msg")?,
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.tick_rate = Some(duration);
                self.last_tick = Instant::now();
            }
            Cmd::Log(text) => tracing::info!(target: "beau::program", "{}", text.trim_end()),
            Cmd::Task(f) => {
                let sender = self.task_sender.clone();
                let handle = std::thread::spawn(move || {
                    let msg = run_task(f)?;
                    // The receiver is gone once the program has stopped.
                    let _ = sender.send(msg);
                    Ok(())
                });
                self.task_handles.push(handle);
            }
        }
        Ok(())
    }

    fn process_task_results(&mut self) -> io::Result<()> {
        while self.running {
            let Ok(msg) = self.task_receiver.try_recv() else {
                break;
            };
            self.dispatch(msg, "Task")?;
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        if self.task_handles.is_empty() {
            return;
        }

        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if handle.is_finished() {
                let outcome = handle
                    .join()
                    .map_err(|payload| panic_message(payload.as_ref()))
                    .and_then(|result| result);
                if let Err(msg) = outcome {
                    tracing::error!("spawned task panicked: {msg}");
                    // Repaint over anything a panic hook wrote.
                    self.presenter.invalidate();
                    self.dirty = true;
                }
            } else {
                remaining.push(handle);
            }
        }
        self.task_handles = remaining;
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let mut frame = Frame::with_hit_grid(self.width, self.height);
        {
            let _span = debug_span!("beau.program.view", w = self.width, h = self.height).entered();
            self.model.view(&mut frame);
        }
        self.presenter.present(&frame)?;
        self.dirty = false;
        Ok(())
    }

    fn effective_timeout(&self) -> Duration {
        match self.tick_rate {
            Some(tick_rate) => tick_rate.saturating_sub(self.last_tick.elapsed()),
            None => self.poll_timeout,
        }
    }

    fn should_tick(&mut self) -> bool {
        if let Some(tick_rate) = self.tick_rate
            && self.last_tick.elapsed() >= tick_rate
        {
            self.last_tick = Instant::now();
            return true;
        }
        false
    }
}

/// Run a task body, containing a panic so the session's hook leaves the
/// terminal in place. Returns the panic message on failure.
fn run_task<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    install_capture_hook();
    catch_contained(f).map_err(|(payload, _)| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Msg {
        A,
    }

    #[test]
    fn batch_collapses() {
        assert!(Cmd::<Msg>::batch(vec![]).is_none());
        assert!(Cmd::<Msg>::batch(vec![Cmd::none(), Cmd::none()]).is_none());
        assert!(matches!(
            Cmd::batch(vec![Cmd::none(), Cmd::msg(Msg::A)]),
            Cmd::Msg(Msg::A)
        ));
        assert!(matches!(
            Cmd::<Msg>::batch(vec![Cmd::quit(), Cmd::tick(Duration::from_millis(5))]),
            Cmd::Batch(ref cmds) if cmds.len() == 2
        ));
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::<Msg>::none().type_name(), "None");
        assert_eq!(Cmd::<Msg>::quit().type_name(), "Quit");
        assert_eq!(Cmd::msg(Msg::A).type_name(), "Msg");
        assert_eq!(Cmd::<Msg>::log("x").type_name(), "Log");
        assert_eq!(Cmd::task(|| Msg::A).type_name(), "Task");
        assert_eq!(Cmd::<Msg>::tick(Duration::ZERO).type_name(), "Tick");
    }

    #[test]
    fn map_wraps_messages_and_tasks() {
        #[derive(Debug, PartialEq)]
        struct Outer(Msg);

        assert!(matches!(Cmd::msg(Msg::A).map(Outer), Cmd::Msg(Outer(Msg::A))));
        assert!(matches!(Cmd::<Msg>::quit().map(Outer), Cmd::Quit));
        match Cmd::task(|| Msg::A).map(Outer) {
            Cmd::Task(task) => assert_eq!(task(), Outer(Msg::A)),
            other => panic!("expected task, got {other:?}"),
        }
        match Cmd::batch(vec![Cmd::msg(Msg::A), Cmd::log("x")]).map(Outer) {
            Cmd::Batch(cmds) => assert_eq!(cmds.len(), 2),
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn task_panic_is_contained() {
        let result = std::thread::spawn(|| {
            let failed = run_task(|| -> Msg { panic!("reply failed") });
            (failed, beau_core::panic_capture::is_contained())
        })
        .join()
        .expect("panic must not escape the task thread");
        assert_eq!(result, (Err("reply failed".to_string()), false));
    }

    #[test]
    fn task_result_passes_through() {
        assert_eq!(run_task(|| Msg::A), Ok(Msg::A));
        assert_eq!(
            run_task(|| -> u8 { std::panic::panic_any(3_u8) }),
            Err("unknown panic payload".to_string())
        );
    }

    #[test]
    fn debug_hides_task_closure() {
        assert_eq!(format!("{:?}", Cmd::task(|| Msg::A)), "Task");
        assert_eq!(format!("{:?}", Cmd::msg(Msg::A)), "Msg(A)");
    }

    #[test]
    fn config_defaults() {
        let config = ProgramConfig::default();
        assert!(config.alternate_screen && config.mouse && config.bracketed_paste);
        assert!(!config.with_mouse(false).mouse);
    }
}
