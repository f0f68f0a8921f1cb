//! The `Process` trait — the extension point for robot control logic.

use wh_core::ProcessId;

use crate::{Claim, Completion, MailGet, SimHandle};

/// What a process waits on when it hands control back to the runner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Yield {
    /// Resume after `n` ticks.  `Sleep(0)` re-queues at the current tick.
    Sleep(u64),
    /// Resume when the completion triggers.
    Event(Completion),
    /// Resume once the claim is granted.
    Claim(Claim),
    /// Resume once the mail get is fulfilled.
    Mail(MailGet),
    /// The process has finished and is dropped.
    Done,
}

/// A logical process driven by the [`Sim`][crate::Sim] runner.
///
/// `resume` is called once per wake.  It runs to completion without
/// interruption and returns the next thing to wait on, so a process is
/// written as an explicit state machine over its own fields.
///
/// Closures `FnMut(ProcessId, &mut W, &SimHandle) -> Yield` implement the
/// trait, which keeps small test processes short.
pub trait Process<W> {
    fn resume(&mut self, pid: ProcessId, world: &mut W, sched: &SimHandle) -> Yield;
}

impl<W, F> Process<W> for F
where
    F: FnMut(ProcessId, &mut W, &SimHandle) -> Yield,
{
    fn resume(&mut self, pid: ProcessId, world: &mut W, sched: &SimHandle) -> Yield {
        self(pid, world, sched)
    }
}
