//! Robot control logic: a state machine over one loop of cells.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, info, warn};

use wh_cell::{AnyCell, CellError, Reserve, Token};
use wh_core::{CellId, ProcessId, ProcessRng};
use wh_sched::{Mail, MailGet, Process, SimHandle, Yield};

use crate::Warehouse;

const LOAD_TICKS:      u64 = 2;
const UNLOAD_TICKS:    u64 = 1;
const CHARGE_TICKS:    u64 = 6;
const MAX_MOVE_TICKS:  u64 = 2;
const MAX_RETRY_TICKS: u64 = 3;
const BATTERY_FULL:    u32 = 30;
const BATTERY_LOW:     u32 = 12;

enum Phase {
    /// First resumption: claim the starting cell.
    Enter,
    /// Standing in a cell, deciding what to do next.
    Idle,
    /// Waiting for mail from the input under the current cell.
    Loading(MailGet),
    /// Waiting for the reservation on the next cell to take effect.
    Moving(Token),
}

pub struct Robot {
    name:     String,
    route:    Vec<CellId>,
    at:       usize,
    held:     Option<Token>,
    carrying: Option<Mail>,
    battery:  u32,
    phase:    Phase,
    seed:     u64,
    rng:      Option<ProcessRng>,
}

impl Robot {
    /// A robot that starts at `route[start]` and drives the route in order,
    /// wrapping around at the end.
    pub fn new(name: impl Into<String>, route: Vec<CellId>, start: usize, seed: u64) -> Self {
        Self {
            name: name.into(),
            at: start % route.len().max(1),
            route,
            held: None,
            carrying: None,
            battery: BATTERY_FULL,
            phase: Phase::Enter,
            seed,
            rng: None,
        }
    }

    fn rng(&mut self, pid: ProcessId) -> &mut ProcessRng {
        let seed = self.seed;
        self.rng.get_or_insert_with(|| ProcessRng::new(seed, pid))
    }

    fn here(&self) -> CellId {
        self.route[self.at]
    }

    fn next(&self) -> CellId {
        self.route[(self.at + 1) % self.route.len()]
    }

    fn step(&mut self, pid: ProcessId, world: &mut Warehouse, sched: &SimHandle) -> Result<Yield> {
        if self.route.is_empty() {
            return Ok(Yield::Done);
        }
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Enter => {
                let here = self.here();
                let token = cell_mut(world, here)?
                    .reserve()
                    .with_context(|| format!("{} cannot enter its start cell", self.name))?;
                self.held = Some(token);
                Ok(token.wait())
            }
            Phase::Loading(get) => {
                self.carrying = sched.take(&get);
                match self.carrying {
                    Some(mail) => {
                        debug!(robot = %self.name, mail = %mail.id, output = %mail.output, "loaded");
                        world.loaded += 1;
                    }
                    None => warn!(robot = %self.name, "woken without mail"),
                }
                Ok(Yield::Sleep(LOAD_TICKS))
            }
            Phase::Moving(token) => {
                let prev = self.here();
                if let Some(old) = self.held.replace(token) {
                    cell_mut(world, prev)?.unreserve(&old)?;
                }
                self.at = (self.at + 1) % self.route.len();
                self.battery = self.battery.saturating_sub(1);
                world.moves += 1;
                let dwell = self.rng(pid).gen_range(1..=MAX_MOVE_TICKS);
                Ok(Yield::Sleep(dwell))
            }
            Phase::Idle => self.decide(pid, world),
        }
    }

    fn decide(&mut self, pid: ProcessId, world: &mut Warehouse) -> Result<Yield> {
        let here = self.here();
        let cell = world
            .grid
            .get(here)
            .ok_or_else(|| anyhow!("route names missing cell {here}"))?;

        if self.carrying.is_none() && cell.input_id().is_some() {
            let get = cell.get_input()??;
            self.phase = Phase::Loading(get);
            return Ok(Yield::Mail(get));
        }

        if let (Some(mail), Some(output)) = (self.carrying, cell.output_id()) {
            if mail.output == output {
                info!(robot = %self.name, mail = %mail.id, %output, "delivered");
                self.carrying = None;
                world.delivered += 1;
                return Ok(Yield::Sleep(UNLOAD_TICKS));
            }
        }

        if self.battery < BATTERY_LOW {
            if let Some(charger) = cell.charge_id() {
                debug!(robot = %self.name, %charger, battery = self.battery, "charging");
                self.battery = BATTERY_FULL;
                world.charges += 1;
                return Ok(Yield::Sleep(CHARGE_TICKS));
            }
        }

        let next = self.next();
        match cell_mut(world, next)?.reserve() {
            Ok(token) => {
                self.phase = Phase::Moving(token);
                Ok(token.wait())
            }
            Err(CellError::Reserved(_)) => {
                world.blocked += 1;
                Ok(Yield::Sleep(self.rng(pid).gen_range(1..=MAX_RETRY_TICKS)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Process<Warehouse> for Robot {
    fn resume(&mut self, pid: ProcessId, world: &mut Warehouse, sched: &SimHandle) -> Yield {
        match self.step(pid, world, sched) {
            Ok(y) => y,
            Err(e) => {
                error!(robot = %self.name, %pid, error = %e, "robot halted");
                Yield::Done
            }
        }
    }
}

fn cell_mut(world: &mut Warehouse, id: CellId) -> Result<&mut AnyCell<SimHandle>> {
    world
        .grid
        .get_mut(id)
        .ok_or_else(|| anyhow!("route names missing cell {id}"))
}
