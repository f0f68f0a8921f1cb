//! corridor — smallest example for the rust_wh warehouse simulation.
//!
//! Four robots drive one loop of cells.  Mail arrives at an input cell,
//! robots carry it to the matching output chute, and top up at a charger
//! when their battery runs low.  Most cells are fail-fast, where a robot
//! that finds the next cell taken backs off and retries; the doorway cells
//! are queued, where robots line up in arrival order.

mod robot;

use std::io::Cursor;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, info};

use wh_cell::{
    CellError, CellGrid, MailInput, MailInputProvider, Reserve, StoreInputs, load_cell_specs_reader,
};
use wh_core::{InputId, MailId, OutputId, Position, ProcessId, SimConfig, SimRng, Tick};
use wh_sched::{Mail, Sim, SimHandle, SimObserver, Yield};

use robot::Robot;

// ── Constants ─────────────────────────────────────────────────────────────────

const ROBOT_COUNT:        usize = 4;
const SEED:               u64   = 42;
const SIM_TICKS:          u64   = 600;
const LOG_INTERVAL_TICKS: u64   = 100;
const INPUT:              InputId = InputId(0);
const INPUT_CAPACITY:     usize = 8;
const OUTPUT_COUNT:       u32   = 2;
const MIN_ARRIVAL_TICKS:  u64   = 3;
const MAX_ARRIVAL_TICKS:  u64   = 9;

// ── Layout CSV ────────────────────────────────────────────────────────────────

// Rows 0..12 form the loop in travel order.  (2,0), (5,1) and (2,1) are
// doorways and queue robots; (6,0) is a sealed bay off the loop.
const LAYOUT_CSV: &str = "\
x,y,reservable,input_id,output_id,charge_id,policy\n\
0,0,true,0,,,fail_fast\n\
1,0,true,,,,fail_fast\n\
2,0,true,,,,queued\n\
3,0,true,,,,fail_fast\n\
4,0,true,,,,fail_fast\n\
5,0,true,,0,,fail_fast\n\
5,1,true,,,,queued\n\
4,1,true,,,,fail_fast\n\
3,1,true,,1,,fail_fast\n\
2,1,true,,,,queued\n\
1,1,true,,,0,fail_fast\n\
0,1,true,,,,fail_fast\n\
6,0,false,,,,\n\
";

const SEALED_BAY: Position = Position { x: 6, y: 0 };

// ── World ─────────────────────────────────────────────────────────────────────

/// Everything robots share: the cell table and run counters.
pub struct Warehouse {
    pub grid:      CellGrid<SimHandle>,
    pub arrived:   u64,
    pub dropped:   u64,
    pub loaded:    u64,
    pub delivered: u64,
    pub moves:     u64,
    pub blocked:   u64,
    pub charges:   u64,
}

impl Warehouse {
    fn new(grid: CellGrid<SimHandle>) -> Self {
        Self {
            grid,
            arrived: 0,
            dropped: 0,
            loaded: 0,
            delivered: 0,
            moves: 0,
            blocked: 0,
            charges: 0,
        }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StepCounter {
    steps:   usize,
    ticks:   usize,
    busiest: (Tick, usize),
}

impl SimObserver for StepCounter {
    fn on_step(&mut self, _tick: Tick, _pid: ProcessId) {
        self.steps += 1;
    }

    fn on_tick_end(&mut self, tick: Tick, resumed: usize) {
        self.ticks += 1;
        if resumed > self.busiest.1 {
            self.busiest = (tick, resumed);
        }
    }
}

// ── Tracing ───────────────────────────────────────────────────────────────────

/// Install an env-filtered fmt subscriber unless one is already set.
fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    println!("=== corridor — rust_wh warehouse simulation ===");
    println!("Robots: {ROBOT_COUNT}  |  Ticks: {SIM_TICKS}  |  Seed: {SEED}");
    println!();

    // 1. Scheduler handle and mail inputs.
    let handle = SimHandle::new();
    let mut inputs = StoreInputs::new(handle.clone());
    let store = inputs.register(INPUT, INPUT_CAPACITY);

    // 2. Cells from the embedded layout.
    let placed = load_cell_specs_reader(Cursor::new(LAYOUT_CSV))?;
    let provider: &dyn MailInputProvider<MailInput> = &inputs;
    let mut grid = CellGrid::build(&handle, &placed, Some(provider))?;
    println!("Layout: {} cells", grid.len());
    for (id, input) in grid.input_cells() {
        debug!(cell = %id, %input, "input cell");
    }

    // The sealed bay refuses everyone.
    let bay = grid
        .at_mut(SEALED_BAY)
        .ok_or_else(|| anyhow!("layout has no cell at {SEALED_BAY}"))?;
    match bay.reserve() {
        Err(CellError::NotFree(name)) => println!("{name} is sealed"),
        other => return Err(anyhow!("sealed bay accepted a reservation: {other:?}")),
    }

    let route: Vec<_> = grid
        .iter()
        .filter(|(_, c)| c.reservable())
        .map(|(id, _)| id)
        .collect();

    // 3. Simulation.
    let config = SimConfig {
        total_ticks:        SIM_TICKS,
        seed:               SEED,
        log_interval_ticks: LOG_INTERVAL_TICKS,
    };
    config.validate()?;
    let mut sim = Sim::new(config, handle, Warehouse::new(grid));

    // Mail feeder: one piece every few ticks, dropped when the input is full.
    let mut arrivals = SimRng::new(SEED).child(1);
    let mut next_mail = 0u64;
    sim.spawn(move |_pid: ProcessId, world: &mut Warehouse, sched: &SimHandle| {
        let mail = Mail {
            id:     MailId(next_mail),
            output: OutputId(arrivals.gen_range(0..OUTPUT_COUNT)),
        };
        next_mail += 1;
        match sched.put(store, mail) {
            Ok(Ok(())) => world.arrived += 1,
            Ok(Err(mail)) => {
                world.dropped += 1;
                debug!(mail = %mail.id, "input full, mail dropped");
            }
            Err(e) => {
                error!(error = %e, "mail feeder stopped");
                return Yield::Done;
            }
        }
        Yield::Sleep(arrivals.gen_range(MIN_ARRIVAL_TICKS..=MAX_ARRIVAL_TICKS))
    });

    let spacing = route.len() / ROBOT_COUNT;
    for i in 0..ROBOT_COUNT {
        sim.spawn(Robot::new(format!("robot-{i}"), route.clone(), i * spacing, SEED));
    }

    // 4. Run.
    let mut observer = StepCounter::default();
    let t0 = Instant::now();
    let final_tick = sim.run(&mut observer).context("simulation failed")?;
    let elapsed = t0.elapsed();
    info!(%final_tick, elapsed_ms = elapsed.as_millis() as u64, "run complete");

    // 5. Report.
    let world = &sim.world;
    println!();
    println!("Finished at {final_tick} in {:.1} ms", elapsed.as_secs_f64() * 1e3);
    println!("Resumptions: {}  over {} ticks", observer.steps, observer.ticks);
    println!("Busiest tick: {} ({} resumptions)", observer.busiest.0, observer.busiest.1);
    println!(
        "Mail: {} arrived, {} dropped, {} loaded, {} delivered, {} still queued",
        world.arrived,
        world.dropped,
        world.loaded,
        world.delivered,
        sim.handle().queued_mail(store),
    );
    println!(
        "Robots: {} moves, {} blocked retries, {} charges",
        world.moves, world.blocked, world.charges
    );
    let occupied: Vec<String> = world
        .grid
        .iter()
        .filter(|(_, c)| c.is_occupied())
        .map(|(_, c)| c.to_string())
        .collect();
    println!("Occupied at end: {}", occupied.join(" "));
    println!("Live claims at end: {}", sim.handle().live_claims());

    Ok(())
}
