/*
 * executor.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::thread;
use std::time::Duration;

use crate::adapters::debugger::Debugger;
use crate::compiler::CompiledUnit;
use crate::namespace::Namespace;
use crate::namespace::UserNamespace;
use crate::runtime::RuntimeOutcome;
use crate::runtime::Runtime;
use crate::source_registry::SourceRegistry;
use crate::traceback::TracebackRewriter;

/// The brief pause Executor takes before formatting a traceback (§4.4):
/// the kernel's one concession to the output stream not being flushable
/// synchronously.
const POST_EXCEPTION_SETTLE: Duration = Duration::from_millis(1);

/// What running one [`CompiledUnit`] produced, already formatted where an
/// exception occurred (§4.4 step 4).
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionReport {
    /// Ran to completion; carries the `Runtime`'s result value, if any.
    Completed(RuntimeOutcome),

    /// An ordinary exception or `KeyboardInterrupt`, already rewritten
    /// into displayable lines.
    Reported(Vec<String>),

    /// `DebuggerQuit`: a control signal, never formatted as a traceback.
    DebuggerQuit,

    /// `SystemExit(code)`: must propagate to `ShutdownCoordinator`, never
    /// recovered here (§4.4 step 4, §7.5).
    SystemExit(i32),
}

/// Runs a [`CompiledUnit`] against the user namespace or, while paused,
/// against the debugger's selected frame (§4.4).
#[derive(Default)]
pub struct Executor;

impl Executor {
    pub fn new() -> Self {
        Executor
    }

    /// `breakpoints` is REPLLoop's latest known full breakpoint table —
    /// always re-installed in full before every execution, never merged
    /// incrementally (§4.8).
    pub fn execute(
        &self,
        unit: &CompiledUnit,
        runtime: &mut dyn Runtime,
        user_namespace: &mut UserNamespace,
        debugger: &mut dyn Debugger,
        breakpoints: &crate::adapters::channels::BreakpointsUpdate,
        rewriter: &mut TracebackRewriter,
        registry: &SourceRegistry,
    ) -> ExecutionReport {
        debugger.sync_breakpoints(breakpoints);
        debugger.set_tracing_enabled(!breakpoints.0.is_empty());

        let outcome = match debugger.current_namespace() {
            Some(frame_ns) => runtime.execute(unit, frame_ns),
            None => runtime.execute(unit, user_namespace as &mut dyn Namespace),
        };

        match outcome {
            RuntimeOutcome::DebuggerQuit => {
                debugger.stop();
                ExecutionReport::DebuggerQuit
            },
            RuntimeOutcome::SystemExit(code) => ExecutionReport::SystemExit(code),
            RuntimeOutcome::Exception(ref exc) => {
                thread::sleep(POST_EXCEPTION_SETTLE);
                let lines = rewriter.rewrite(exc, unit, registry, debugger.is_active());
                ExecutionReport::Reported(lines)
            },
            RuntimeOutcome::KeyboardInterrupt => {
                thread::sleep(POST_EXCEPTION_SETTLE);
                ExecutionReport::Reported(vec!["KeyboardInterrupt".to_string()])
            },
            RuntimeOutcome::Ok(_) => ExecutionReport::Completed(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::debugger::NullDebugger;
    use crate::compiler::CompileOutcome;
    use crate::compiler::Compiler;
    use crate::compiler::Mode;
    use crate::compiler::OriginTag;
    use crate::runtime::ExprRuntime;

    fn compile(source: &str, mode: Mode) -> CompiledUnit {
        match Compiler::new().compile(source, OriginTag::bare("<stdin>"), mode) {
            CompileOutcome::Complete(unit) => unit,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn successful_unit_completes() {
        let executor = Executor::new();
        let mut runtime = ExprRuntime::new();
        let mut ns = UserNamespace::new();
        let mut debugger = NullDebugger::new();
        let mut rewriter = TracebackRewriter::new();
        let registry = SourceRegistry::new();

        let unit = compile("x = 1", Mode::Single);
        let report = executor.execute(
            &unit,
            &mut runtime,
            &mut ns,
            &mut debugger,
            &Default::default(),
            &mut rewriter,
            &registry,
        );
        assert_eq!(report, ExecutionReport::Completed(RuntimeOutcome::Ok(None)));
    }

    #[test]
    fn exception_is_rewritten_into_report() {
        let executor = Executor::new();
        let mut runtime = ExprRuntime::new();
        let mut ns = UserNamespace::new();
        let mut debugger = NullDebugger::new();
        let mut rewriter = TracebackRewriter::new();
        let registry = SourceRegistry::new();

        let unit = compile("1/0", Mode::Single);
        match executor.execute(
            &unit,
            &mut runtime,
            &mut ns,
            &mut debugger,
            &Default::default(),
            &mut rewriter,
            &registry,
        ) {
            ExecutionReport::Reported(lines) => {
                assert!(lines.last().unwrap().contains("ZeroDivisionError"));
            },
            other => panic!("expected Reported, got {other:?}"),
        }
    }

    #[test]
    fn system_exit_propagates_unformatted() {
        let executor = Executor::new();
        let mut runtime = ExprRuntime::new();
        let mut ns = UserNamespace::new();
        let mut debugger = NullDebugger::new();
        let mut rewriter = TracebackRewriter::new();
        let registry = SourceRegistry::new();

        let unit = compile("raise SystemExit(9)", Mode::Exec);
        let report = executor.execute(
            &unit,
            &mut runtime,
            &mut ns,
            &mut debugger,
            &Default::default(),
            &mut rewriter,
            &registry,
        );
        assert_eq!(report, ExecutionReport::SystemExit(9));
    }

    #[test]
    fn debugger_quit_stops_without_a_traceback() {
        let executor = Executor::new();
        let mut runtime = ExprRuntime::new();
        let mut ns = UserNamespace::new();
        let mut debugger = NullDebugger::new();
        let mut rewriter = TracebackRewriter::new();
        let registry = SourceRegistry::new();

        let unit = compile("breakpoint()", Mode::Exec);
        let report = executor.execute(
            &unit,
            &mut runtime,
            &mut ns,
            &mut debugger,
            &Default::default(),
            &mut rewriter,
            &registry,
        );
        assert_eq!(report, ExecutionReport::DebuggerQuit);
    }
}
