//! The `Sim` struct and its event loop.

use tracing::{debug, info};

use wh_core::{ProcessId, SimConfig, Tick};

use crate::{Process, SchedError, SchedResult, SimHandle, SimObserver, Yield};

/// The main simulation runner.
///
/// `Sim<W>` owns the world `W` (typically the cell table), every spawned
/// process, and a [`SimHandle`].  Build the handle first, construct the world
/// with clones of it, then hand both to [`Sim::new`].
///
/// ```rust,ignore
/// let handle = SimHandle::new();
/// let world = Layout::build(&handle, specs)?;
/// let mut sim = Sim::new(config, handle, world);
/// sim.spawn(Robot::new(route));
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct Sim<W> {
    /// Global configuration (total ticks, seed, …).
    pub config: SimConfig,

    /// Shared state every process reads and mutates (cells, counters).
    pub world: W,

    handle:    SimHandle,
    /// Indexed by `ProcessId`; `None` once the process returned `Done`.
    processes: Vec<Option<Box<dyn Process<W>>>>,
}

impl<W> Sim<W> {
    pub fn new(config: SimConfig, handle: SimHandle, world: W) -> Self {
        Self {
            config,
            world,
            handle,
            processes: Vec::new(),
        }
    }

    pub fn handle(&self) -> &SimHandle {
        &self.handle
    }

    pub fn now(&self) -> Tick {
        self.handle.now()
    }

    /// Register `process` and schedule its first resumption at the current tick.
    pub fn spawn<P: Process<W> + 'static>(&mut self, process: P) -> ProcessId {
        let now = self.handle.now();
        self.spawn_at(now, process)
    }

    /// Register `process` and schedule its first resumption at `tick`.
    pub fn spawn_at<P: Process<W> + 'static>(&mut self, tick: Tick, process: P) -> ProcessId {
        let pid = ProcessId(self.processes.len() as u32);
        self.processes.push(Some(Box::new(process)));
        self.handle.schedule(tick, pid);
        pid
    }

    /// Processes that have not yet returned `Done`.
    pub fn live_processes(&self) -> usize {
        self.processes.iter().filter(|p| p.is_some()).count()
    }

    /// Resume exactly one process.  Returns the `(tick, pid)` that ran, or
    /// `None` if no wake is queued.
    pub fn step(&mut self) -> SchedResult<Option<(Tick, ProcessId)>> {
        let Some((tick, pid)) = self.handle.pop_wake() else {
            return Ok(None);
        };
        let slot = self
            .processes
            .get_mut(pid.index())
            .ok_or(SchedError::UnknownProcess(pid))?;
        let Some(process) = slot.as_mut() else {
            // Finished processes are never re-queued by the engine; tolerate
            // a stale external wake.
            return Ok(Some((tick, pid)));
        };

        self.handle.set_active(Some(pid));
        let yielded = process.resume(pid, &mut self.world, &self.handle);
        self.handle.set_active(None);

        if yielded == Yield::Done {
            debug!(%pid, %tick, "process finished");
            *slot = None;
        } else {
            self.handle.park(pid, yielded)?;
        }
        Ok(Some((tick, pid)))
    }

    /// Run until the wake queue is empty or `config.end_tick()` is reached.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SchedResult<Tick> {
        let end = self.config.end_tick();
        self.run_until(end, observer)
    }

    /// Run every wake scheduled strictly before `until`.
    pub fn run_until<O: SimObserver>(&mut self, until: Tick, observer: &mut O) -> SchedResult<Tick> {
        let mut current: Option<(Tick, usize)> = None;

        while let Some(next) = self.handle.next_wake_tick() {
            if next >= until {
                break;
            }
            if let Some((tick, resumed)) = current {
                if tick != next {
                    self.end_tick(tick, resumed, observer);
                    current = None;
                }
            }
            let Some((tick, pid)) = self.step()? else {
                break;
            };
            observer.on_step(tick, pid);
            current = Some(match current {
                Some((t, n)) => (t, n + 1),
                None => (tick, 1),
            });
        }
        if let Some((tick, resumed)) = current {
            self.end_tick(tick, resumed, observer);
        }

        let final_tick = self.handle.now();
        observer.on_sim_end(final_tick);
        info!(
            %final_tick,
            live = self.live_processes(),
            pending = self.handle.pending_wakes(),
            "simulation stopped"
        );
        Ok(final_tick)
    }

    fn end_tick<O: SimObserver>(&self, tick: Tick, resumed: usize, observer: &mut O) {
        observer.on_tick_end(tick, resumed);
        let interval = self.config.log_interval_ticks;
        if interval > 0 && tick.0 % interval == 0 {
            info!(%tick, resumed, live = self.live_processes(), "progress");
        }
    }
}
