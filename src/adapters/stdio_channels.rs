/*
 * stdio_channels.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::io::BufRead;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use chrono::Local;
use crossbeam::channel::unbounded;
use crossbeam::channel::Receiver;
use serde::Deserialize;
use uuid::Uuid;

use crate::adapters::channels::BlockMessage;
use crate::adapters::channels::BreakpointsUpdate;
use crate::adapters::channels::Channels;
use crate::adapters::channels::StartupReply;
use crate::adapters::channels::StartupSnapshot;
use crate::status::Status;

/// One line of JSON read from stdin, internally tagged on `type` so a
/// front-end can multiplex all four inbound channels (§6) over one
/// stream. A line that fails to parse as any of these is treated as a
/// bare interactive command line — this is what lets a human type
/// directly at the binary without hand-crafting JSON.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundFrame {
    Command {
        line: String,
    },
    Code {
        #[serde(flatten)]
        block: BlockMessage,
    },
    Startup {
        #[serde(flatten)]
        snapshot: StartupSnapshot,
    },
    Breakpoints {
        breakpoints: HashMap<String, Vec<u32>>,
    },
}

#[derive(Default)]
struct Queues {
    commands: VecDeque<String>,
    code: VecDeque<BlockMessage>,
    startup: Option<StartupSnapshot>,
    breakpoints: VecDeque<BreakpointsUpdate>,
}

/// The stand-in `Channels` wired up by the `nucleus` binary (`src/bin`):
/// a real transport (named sockets, a message queue) is explicitly an
/// external collaborator the kernel only consumes the trait of (§1), so
/// this crate's own binary drives that trait over stdin/stdout instead,
/// the way `ark`'s own `main.rs` wires `amalthea`'s `Kernel` to whatever
/// connection file the launcher hands it.
///
/// A background thread owns the blocking stdin read and forwards whole
/// lines over a `crossbeam` channel; every `Channels` method here stays
/// non-blocking as §5 requires.
pub struct StdioChannels {
    rx: Receiver<String>,
    closed: Arc<AtomicBool>,
    queues: Queues,
    session_id: Uuid,
}

impl StdioChannels {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let closed = Arc::new(AtomicBool::new(false));
        let closed_for_thread = closed.clone();

        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(text) => {
                        if tx.send(text).is_err() {
                            break;
                        }
                    },
                    Err(err) => {
                        log::warn!("stdin read error: {err}");
                        break;
                    },
                }
            }
            closed_for_thread.store(true, Ordering::SeqCst);
        });

        let session_id = Uuid::new_v4();
        log::info!(
            "nucleus stdio channels up at {}, session {session_id}",
            Local::now().to_rfc3339()
        );

        StdioChannels {
            rx,
            closed,
            queues: Queues::default(),
            session_id,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Pull every line currently buffered and sort it into the right
    /// queue. Called at the top of every trait method so a single
    /// incoming batch can satisfy several `try_recv_*` calls in one tick.
    fn drain(&mut self) {
        while let Ok(line) = self.rx.try_recv() {
            classify_into(&line, &mut self.queues);
        }
    }
}

/// Sorts one raw stdin line into the right queue: JSON that parses as an
/// [`InboundFrame`] goes to its matching queue, anything else (including
/// a blank line) is treated as a bare interactive command. Split out of
/// `drain` so it can be unit-tested without a real stdin-reading thread.
fn classify_into(line: &str, queues: &mut Queues) {
    if line.trim().is_empty() {
        queues.commands.push_back(line.to_string());
        return;
    }
    match serde_json::from_str::<InboundFrame>(line) {
        Ok(InboundFrame::Command { line }) => queues.commands.push_back(line),
        Ok(InboundFrame::Code { block }) => queues.code.push_back(block),
        Ok(InboundFrame::Startup { snapshot }) => queues.startup = Some(snapshot),
        Ok(InboundFrame::Breakpoints { breakpoints }) => {
            queues.breakpoints.push_back(BreakpointsUpdate(breakpoints))
        },
        Err(_) => queues.commands.push_back(line.to_string()),
    }
}

impl Default for StdioChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl Channels for StdioChannels {
    fn try_recv_command(&mut self) -> Option<String> {
        self.drain();
        self.queues.commands.pop_front()
    }

    fn try_recv_code(&mut self) -> Option<BlockMessage> {
        self.drain();
        self.queues.code.pop_front()
    }

    fn take_startup_snapshot(&mut self) -> Option<StartupSnapshot> {
        self.drain();
        self.queues.startup.take()
    }

    fn try_recv_breakpoints(&mut self) -> Option<BreakpointsUpdate> {
        self.drain();
        self.queues.breakpoints.pop_front()
    }

    fn send_prompt(&mut self, prompt: &str) {
        print!("{prompt}");
        let _ = io::stdout().flush();
    }

    fn send_echo(&mut self, text: &str) {
        println!("{text}");
    }

    fn send_status(&mut self, status: Status) {
        log::debug!("session {} -> {status}", self.session_id);
        eprintln!("[{status}]");
    }

    fn send_startup_reply(&mut self, reply: &StartupReply) {
        match serde_json::to_string(reply) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("failed to encode startup reply: {err}"),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) && self.rx.is_empty()
    }
}
