/*
 * repl.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::fs;

use futures::executor::block_on;

use crate::adapters::channels::BlockMessage;
use crate::adapters::channels::BreakpointsUpdate;
use crate::adapters::channels::Channels;
use crate::adapters::channels::StartupReply;
use crate::adapters::debugger::Debugger;
use crate::adapters::gui_host::GuiHost;
use crate::adapters::gui_host::GuiTick;
use crate::adapters::magician::MagicOutcome;
use crate::adapters::magician::Magician;
use crate::compiler::CompileOutcome;
use crate::compiler::Compiler;
use crate::compiler::Mode;
use crate::compiler::OriginTag;
use crate::executor::ExecutionReport;
use crate::executor::Executor;
use crate::line_buffer::LineBuffer;
use crate::namespace::UserNamespace;
use crate::prompt::PromptModel;
use crate::prompt::PromptState;
use crate::runtime::Runtime;
use crate::shutdown::ExitIntent;
use crate::shutdown::ShutdownCoordinator;
use crate::source_registry::SourceRegistry;
use crate::status::Status;
use crate::traceback::TracebackRewriter;
use crate::KernelConfig;

/// The distinct color a block-execution banner is echoed in (§4.3 step
/// 1), matching the original's `\x1b[0;33m` yellow.
const BLOCK_BANNER_COLOR: &str = "\x1b[0;33m";
const BLOCK_BANNER_RESET: &str = "\x1b[0m";

/// The single-threaded cooperative main loop (§4.7). Owns every piece of
/// session state named in §3's Data Model except `DebugFrameStack`,
/// which belongs to the `Debugger` collaborator.
pub struct REPLLoop {
    config: KernelConfig,
    channels: Box<dyn Channels>,
    magician: Box<dyn Magician>,
    debugger: Box<dyn Debugger>,
    runtime: Box<dyn Runtime>,

    namespace: UserNamespace,
    compiler: Compiler,
    executor: Executor,
    rewriter: TracebackRewriter,
    registry: SourceRegistry,

    buffer: LineBuffer,
    prompt_state: PromptState,
    last_status: Option<Status>,
    last_breakpoints: BreakpointsUpdate,
    shutdown: ShutdownCoordinator,

    startup_pending: bool,
    new_prompt: bool,
}

impl REPLLoop {
    pub fn new(
        config: KernelConfig,
        channels: Box<dyn Channels>,
        magician: Box<dyn Magician>,
        debugger: Box<dyn Debugger>,
        runtime: Box<dyn Runtime>,
    ) -> Self {
        let prompt_state = PromptState {
            extension_shell: config.extension_shell,
            ..Default::default()
        };
        REPLLoop {
            config,
            channels,
            magician,
            debugger,
            runtime,
            namespace: UserNamespace::new(),
            compiler: Compiler::new(),
            executor: Executor::new(),
            rewriter: TracebackRewriter::new(),
            registry: SourceRegistry::new(),
            buffer: LineBuffer::new(),
            prompt_state,
            last_status: None,
            last_breakpoints: BreakpointsUpdate::default(),
            shutdown: ShutdownCoordinator::new(),
            startup_pending: true,
            new_prompt: true,
        }
    }

    /// Drives the loop to completion via `gui_host`'s own event loop
    /// (§4.7's "the REPL body runs inside a callback the GuiHost
    /// invokes"), returning the final [`ExitIntent`] for the caller to
    /// turn into a process exit code.
    pub fn run(mut self, gui_host: &mut dyn GuiHost) -> ExitIntent {
        let period = self.config.sleeptime;
        {
            let mut callback = || self.tick();
            gui_host.run(period, &mut callback);
        }
        self.shutdown.resolve()
    }

    /// One iteration of the loop body (§4.7 steps 1-5). Exposed directly
    /// so tests can single-step the kernel without a real `GuiHost`.
    pub fn tick(&mut self) -> GuiTick {
        if self.startup_pending {
            self.run_startup();
            self.startup_pending = false;
            return GuiTick::Continue;
        }

        if self.new_prompt {
            let prompt = PromptModel::current(&self.prompt_state);
            self.channels.send_prompt(&prompt);
            self.new_prompt = false;
        }

        let status = Status::from_state(self.debugger.is_active(), self.prompt_state.more_expected);
        if self.last_status != Some(status) {
            self.channels.send_status(status);
            self.last_status = Some(status);
        }

        if self.channels.is_closed() {
            self.shutdown.request(ExitIntent::generic());
            return GuiTick::Stop;
        }

        if let Some(line) = self.channels.try_recv_command() {
            self.channels.send_echo(&line);
            self.emit_status(Status::Busy);
            return self.handle_command_line(&line);
        }

        if let Some(block) = self.channels.try_recv_code() {
            return self.handle_block(block);
        }

        if let Some(snapshot) = self.channels.take_startup_snapshot() {
            let reply = StartupReply {
                snapshot,
                builtins: vec!["print".to_string(), "breakpoint".to_string()],
                version: (0, 1, 0, 0),
                keywords: vec!["raise".to_string()],
            };
            self.channels.send_startup_reply(&reply);
        }

        GuiTick::Continue
    }

    /// Request an external interrupt (§5's "cancellation"): clears the
    /// line buffer and reports `KeyboardInterrupt` without touching
    /// status beyond the usual recompute on the next tick.
    pub fn interrupt(&mut self) {
        self.buffer.clear();
        self.prompt_state.more_expected = false;
        self.channels.send_echo("KeyboardInterrupt");
        self.new_prompt = true;
    }

    fn emit_status(&mut self, status: Status) {
        if self.last_status != Some(status) {
            self.channels.send_status(status);
            self.last_status = Some(status);
        }
    }

    /// Drains the breakpoint channel into `last_breakpoints`, the full
    /// table re-installed into Debugger on every execution (§4.8).
    fn drain_breakpoints(&mut self) {
        if let Some(update) = self.channels.try_recv_breakpoints() {
            self.last_breakpoints = update;
        }
    }

    fn run_startup(&mut self) {
        self.emit_status(Status::Busy);

        let source = if let Some(path) = self.config.script_file.clone() {
            match fs::read_to_string(&path) {
                Ok(text) => Some((text, OriginTag::bare(&path.to_string_lossy()))),
                Err(err) => {
                    log::warn!("startup script {path:?} unreadable: {err}");
                    None
                },
            }
        } else {
            self.config
                .startup_script
                .clone()
                .map(|text| (text, OriginTag::bare("<startup>")))
        };

        let Some((text, origin)) = source else {
            return;
        };

        self.drain_breakpoints();
        match self.compiler.compile(&text, origin, Mode::Exec) {
            CompileOutcome::Complete(unit) => {
                let report = self.executor.execute(
                    &unit,
                    self.runtime.as_mut(),
                    &mut self.namespace,
                    self.debugger.as_mut(),
                    &self.last_breakpoints,
                    &mut self.rewriter,
                    &self.registry,
                );
                self.report_outcome(report);
            },
            CompileOutcome::Invalid(err) => {
                for line in self.rewriter.rewrite_syntax_error(&err) {
                    self.channels.send_echo(&line);
                }
            },
            CompileOutcome::Incomplete => {
                log::warn!("startup script is an incomplete fragment; skipping");
            },
        }
    }

    fn handle_command_line(&mut self, line: &str) -> GuiTick {
        let outcome = block_on(self.magician.process(line));
        match outcome {
            MagicOutcome::Consumed => {
                self.buffer.clear();
                self.prompt_state.more_expected = false;
                self.new_prompt = true;
                GuiTick::Continue
            },
            MagicOutcome::Rewritten(rewritten) => {
                let mut tick = GuiTick::Continue;
                for segment in rewritten.split('\n') {
                    tick = self.dispatch_line(segment);
                    if tick == GuiTick::Stop {
                        break;
                    }
                }
                tick
            },
            MagicOutcome::NotMagic => self.dispatch_line(line),
        }
    }

    /// Single-line dispatch through LineBuffer and the Compiler (§4.2).
    fn dispatch_line(&mut self, line: &str) -> GuiTick {
        self.buffer.push(line);
        let joined = self.buffer.joined();

        match self.compiler.compile(&joined, OriginTag::bare("<stdin>"), Mode::Single) {
            CompileOutcome::Complete(unit) => {
                self.buffer.clear();
                self.prompt_state.more_expected = false;
                self.prompt_state.execution_count += 1;
                self.drain_breakpoints();
                let report = self.executor.execute(
                    &unit,
                    self.runtime.as_mut(),
                    &mut self.namespace,
                    self.debugger.as_mut(),
                    &self.last_breakpoints,
                    &mut self.rewriter,
                    &self.registry,
                );
                self.new_prompt = true;
                self.report_outcome(report)
            },
            CompileOutcome::Incomplete => {
                self.prompt_state.more_expected = true;
                self.new_prompt = true;
                GuiTick::Continue
            },
            CompileOutcome::Invalid(err) => {
                self.buffer.clear();
                self.prompt_state.more_expected = false;
                self.new_prompt = true;
                for line in self.rewriter.rewrite_syntax_error(&err) {
                    self.channels.send_echo(&line);
                }
                GuiTick::Continue
            },
        }
    }

    /// Block execution (§4.3): editor-submitted source, compiled in
    /// `exec` mode under a synthetic origin tag.
    fn handle_block(&mut self, block: BlockMessage) -> GuiTick {
        let banner = match &block.cell_name {
            Some(name) => format!(
                "executing cell {name:?} (line {} of {:?})",
                block.lineno + 1,
                block.fname
            ),
            None => format!(
                "executing lines {} to {} of {:?}",
                block.lineno + 1,
                block.lineno + block.source.lines().count() as u32,
                block.fname
            ),
        };
        self.channels
            .send_echo(&format!("{BLOCK_BANNER_COLOR}{banner}{BLOCK_BANNER_RESET}"));
        self.emit_status(Status::Busy);

        self.prompt_state.execution_count += 1;
        let origin = OriginTag::for_block(&block.fname, block.lineno);

        match self.compiler.compile(&block.source, origin, Mode::Exec) {
            CompileOutcome::Complete(unit) => {
                self.registry.insert(&unit, block.source.clone());
                self.drain_breakpoints();
                let report = self.executor.execute(
                    &unit,
                    self.runtime.as_mut(),
                    &mut self.namespace,
                    self.debugger.as_mut(),
                    &self.last_breakpoints,
                    &mut self.rewriter,
                    &self.registry,
                );
                self.new_prompt = true;
                self.report_outcome(report)
            },
            CompileOutcome::Invalid(err) => {
                for line in self.rewriter.rewrite_syntax_error(&err) {
                    self.channels.send_echo(&line);
                }
                self.new_prompt = true;
                GuiTick::Continue
            },
            CompileOutcome::Incomplete => {
                self.channels.send_echo("block is incomplete; cannot run");
                self.new_prompt = true;
                GuiTick::Continue
            },
        }
    }

    /// Applies loop-level exception handling to one [`ExecutionReport`]
    /// (§4.7's "exception handling at loop level").
    fn report_outcome(&mut self, report: ExecutionReport) -> GuiTick {
        match report {
            ExecutionReport::Completed(outcome) => {
                if let crate::runtime::RuntimeOutcome::Ok(Some(value)) = outcome {
                    self.channels.send_echo(&value.to_string());
                }
                GuiTick::Continue
            },
            ExecutionReport::Reported(lines) => {
                let is_interrupt = lines.len() == 1 && lines[0] == "KeyboardInterrupt";
                if is_interrupt {
                    self.buffer.clear();
                    self.prompt_state.more_expected = false;
                }
                for line in lines {
                    self.channels.send_echo(&line);
                }
                GuiTick::Continue
            },
            ExecutionReport::DebuggerQuit => GuiTick::Continue,
            ExecutionReport::SystemExit(code) => {
                self.shutdown.request(ExitIntent::with_code(code));
                block_on(self.debugger.leave_interaction());
                GuiTick::Stop
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::channels::BreakpointsUpdate;
    use crate::fixtures::EchoMagician;
    use crate::fixtures::MemoryChannels;
    use crate::fixtures::StubDebugger;
    use crate::runtime::ExprRuntime;

    fn new_loop(channels: MemoryChannels) -> REPLLoop {
        REPLLoop::new(
            KernelConfig::new(),
            Box::new(channels),
            Box::new(EchoMagician::new()),
            Box::new(StubDebugger::new()),
            Box::new(ExprRuntime::new()),
        )
    }

    #[test]
    fn scenario_one_assignment_then_expression() {
        let mut channels = MemoryChannels::new();
        channels.push_command("x = 1");
        channels.push_command("x+1");
        let mut repl = new_loop(channels);

        // startup tick (no-op, no script configured)
        assert_eq!(repl.tick(), GuiTick::Continue);
        // command "x = 1"
        assert_eq!(repl.tick(), GuiTick::Continue);
        // command "x+1"
        assert_eq!(repl.tick(), GuiTick::Continue);

        assert_eq!(repl.prompt_state.execution_count, 2);
    }

    #[test]
    fn scenario_two_multiline_def_then_blank() {
        let mut channels = MemoryChannels::new();
        channels.push_command("def f():");
        channels.push_command("    return 42");
        channels.push_command("");
        let mut repl = new_loop(channels);

        repl.tick(); // startup
        repl.tick(); // "def f():"
        assert!(repl.prompt_state.more_expected);
        repl.tick(); // "    return 42"
        assert!(repl.prompt_state.more_expected);
        repl.tick(); // ""
        assert!(!repl.prompt_state.more_expected);
    }

    #[test]
    fn scenario_four_block_system_exit_sets_shutdown() {
        let mut channels = MemoryChannels::new();
        channels.push_code(BlockMessage {
            source: "raise SystemExit(7)".to_string(),
            fname: "ex.py".to_string(),
            lineno: 0,
            cell_name: None,
        });
        let mut repl = new_loop(channels);

        repl.tick(); // startup
        let tick = repl.tick(); // block
        assert_eq!(tick, GuiTick::Stop);
        assert_eq!(repl.shutdown.intent(), Some(ExitIntent::with_code(7)));
    }

    #[test]
    fn channel_teardown_requests_generic_shutdown() {
        let mut channels = MemoryChannels::new();
        channels.close();
        let mut repl = new_loop(channels);

        repl.tick(); // startup
        let tick = repl.tick();
        assert_eq!(tick, GuiTick::Stop);
        assert_eq!(repl.shutdown.intent(), Some(ExitIntent::generic()));
    }

    #[test]
    fn breakpoint_resync_reaches_the_debugger_before_execution() {
        let mut update = BreakpointsUpdate::default();
        update.0.insert("ex.py".to_string(), vec![2]);

        let mut channels = MemoryChannels::new();
        channels.push_breakpoints(update.clone());
        channels.push_command("x = 1");
        let mut repl = new_loop(channels);

        repl.tick(); // startup
        // Dispatches "x = 1", draining the breakpoint channel right
        // before that execution (§4.8).
        repl.tick();
        assert_eq!(repl.last_breakpoints, update);
    }

    #[test]
    fn interrupt_clears_the_buffer_and_echoes() {
        let channels = MemoryChannels::new();
        let mut repl = new_loop(channels);
        repl.buffer.push("if True:");
        repl.prompt_state.more_expected = true;
        repl.interrupt();
        assert!(repl.buffer.is_empty());
        assert!(!repl.prompt_state.more_expected);
    }
}
