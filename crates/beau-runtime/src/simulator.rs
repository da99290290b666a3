#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal, enabling
//! event injection and frame capture in plain unit tests.
//!
//! Background tasks run synchronously by default. With
//! [`ProgramSimulator::with_deferred_tasks`] they are queued instead, so a
//! test can inspect the state between scheduling and delivery and then call
//! [`ProgramSimulator::run_pending_tasks`].
//!
//! # Example
//!
//! ```ignore
//! use beau_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Counter { value: 0 });
//! sim.init();
//! sim.send(Msg::Increment);
//! assert_eq!(sim.model().value, 1);
//!
//! let buf = sim.capture_frame(80, 24);
//! // Assert on buffer contents...
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use beau_core::event::Event;
use beau_render::buffer::Buffer;
use beau_render::frame::{Frame, HitData, HitGrid, HitId, HitRegion};

use crate::program::{Cmd, Model};

type Task<M> = Box<dyn FnOnce() -> M + Send>;

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// No-op command.
    None,
    /// Quit command.
    Quit,
    /// Message sent to model (not stored, just noted).
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Tick scheduled.
    Tick(Duration),
    /// Log message emitted.
    Log(String),
    /// Background task executed or queued.
    Task,
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    /// Captured frame buffers.
    frames: Vec<Buffer>,
    /// Hit grid and cursor of the last captured frame.
    last_hits: Option<HitGrid>,
    last_cursor: Option<(u16, u16)>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick_rate: Option<Duration>,
    logs: Vec<String>,
    defer_tasks: bool,
    pending: VecDeque<Task<M::Message>>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            last_hits: None,
            last_cursor: None,
            command_log: Vec::new(),
            running: true,
            tick_rate: None,
            logs: Vec::new(),
            defer_tasks: false,
            pending: VecDeque::new(),
        }
    }

    /// Queue background tasks instead of running them immediately.
    #[must_use]
    pub fn with_deferred_tasks(mut self) -> Self {
        self.defer_tasks = true;
        self
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject terminal events into the model, stopping at quit.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Deliver `n` tick events.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.inject_event(Event::Tick);
        }
    }

    /// Send a specific message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Run queued tasks, in scheduling order, including any they schedule.
    ///
    /// Returns the number of tasks run. Results produced after quit are
    /// dropped, as in the real runtime.
    pub fn run_pending_tasks(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pending.pop_front() {
            ran += 1;
            let msg = task();
            self.send(msg);
        }
        ran
    }

    /// Number of queued tasks.
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    /// Render the model into a fresh frame of the given size.
    ///
    /// The frame has a hit grid; see [`hit_test`](Self::hit_test).
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::with_hit_grid(width, height);
        self.model.view(&mut frame);
        self.last_hits = frame.hit_grid;
        self.last_cursor = frame.cursor_position;
        let idx = self.frames.len();
        self.frames.push(frame.buffer);
        &self.frames[idx]
    }

    /// Hit test against the last captured frame.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        self.last_hits.as_ref().and_then(|grid| grid.hit_test(x, y))
    }

    /// Cursor position requested by the last captured frame.
    pub fn last_cursor(&self) -> Option<(u16, u16)> {
        self.last_cursor
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Returns `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    /// Log messages emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.tick_rate = Some(duration);
                self.command_log.push(CmdRecord::Tick(duration));
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Task(f) => {
                self.command_log.push(CmdRecord::Task);
                if self.defer_tasks {
                    self.pending.push_back(f);
                } else {
                    let msg = f();
                    let cmd = self.model.update(msg);
                    self.execute_cmd(cmd);
                }
            }
        }
    }
}
