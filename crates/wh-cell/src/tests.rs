//! Unit tests for wh-cell.

use std::cell::{Cell as StdCell, RefCell};
use std::rc::Rc;

use wh_core::{ChargeId, EventId, InputId, MailId, OutputId, Position, ProcessId, ResourceId, SimConfig, Tick};
use wh_sched::{
    Claim, ClaimState, Completion, Mail, NoopObserver, Process, ResourceView, Scheduler, Sim,
    SimHandle, Yield,
};

use crate::{
    AnyCell, Cell, CellError, CellGrid, CellPolicy, CellSpec, MailGetter, MailInput, MailInputProvider,
    QueuedCell, Reserve, StoreInputs, Token, Unreserved, load_cell_specs_reader,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fail_fast(h: &SimHandle, spec: CellSpec) -> Cell<SimHandle> {
    Cell::new(h.clone(), &spec, None).unwrap()
}

fn queued(h: &SimHandle, spec: CellSpec) -> QueuedCell<SimHandle> {
    QueuedCell::new(h.clone(), &CellSpec { policy: CellPolicy::Queued, ..spec }, None).unwrap()
}

/// Scheduler fake that only hands out completions and counts them.
#[derive(Clone, Default)]
struct CountingScheduler {
    issued: Rc<StdCell<u64>>,
}

impl Scheduler for CountingScheduler {
    fn completion(&self) -> Completion {
        let n = self.issued.get();
        self.issued.set(n + 1);
        Completion { id: EventId(n), at: Tick(0) }
    }
    fn create_resource(&self, _capacity: u32) -> ResourceId {
        ResourceId(0)
    }
    fn request(&self, _resource: ResourceId) -> Claim {
        unreachable!("fail-fast cells never submit claims")
    }
    fn cancel(&self, _claim: &Claim) -> bool {
        unreachable!("fail-fast cells never cancel claims")
    }
    fn release(&self, _resource: ResourceId, _claim: &Claim) -> bool {
        unreachable!("fail-fast cells never release claims")
    }
}

// ── Fail-fast cell ────────────────────────────────────────────────────────────

#[cfg(test)]
mod fail_fast_cell {
    use super::*;

    #[test]
    fn scenario_a_reserve_conflict_then_rereserve() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::default());

        let token1 = cell.reserve().unwrap();
        assert!(cell.is_reserved());

        assert!(matches!(cell.reserve(), Err(CellError::Reserved(_))));
        // First token is still the outstanding one.
        assert_eq!(cell.outstanding().map(Token::Completion), Some(token1));

        assert_eq!(cell.unreserve(&token1).unwrap(), Unreserved::Released);
        assert!(!cell.is_reserved());

        let token2 = cell.reserve().unwrap();
        assert_ne!(token1, token2);
    }

    #[test]
    fn scenario_b_not_reservable() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::blocked());
        assert!(matches!(cell.reserve(), Err(CellError::NotFree(_))));
        assert!(!cell.is_reserved());
    }

    #[test]
    fn not_reservable_never_changes_state() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::blocked());
        for _ in 0..5 {
            assert!(matches!(cell.reserve(), Err(CellError::NotFree(_))));
        }
        assert!(cell.outstanding().is_none());
    }

    #[test]
    fn stale_token_rejected() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::default());
        let old = cell.reserve().unwrap();
        cell.unreserve(&old).unwrap();
        let current = cell.reserve().unwrap();

        assert!(matches!(cell.unreserve(&old), Err(CellError::UnknownRequest(_))));
        assert!(cell.is_reserved());
        assert_eq!(cell.unreserve(&current).unwrap(), Unreserved::Released);
    }

    #[test]
    fn foreign_token_rejected() {
        let h = SimHandle::new();
        let mut a = fail_fast(&h, CellSpec::default());
        let mut b = fail_fast(&h, CellSpec::default());
        let ta = a.reserve().unwrap();
        let _tb = b.reserve().unwrap();

        assert!(matches!(b.unreserve(&ta), Err(CellError::UnknownRequest(_))));
        assert!(b.is_reserved());
        assert!(a.is_reserved());
    }

    #[test]
    fn claim_token_rejected() {
        let h = SimHandle::new();
        let mut q = queued(&h, CellSpec::default());
        let mut cell = fail_fast(&h, CellSpec::default());
        let claim = q.reserve().unwrap();
        cell.reserve().unwrap();
        assert!(matches!(cell.unreserve(&claim), Err(CellError::UnknownRequest(_))));
        assert!(cell.is_reserved());
    }

    #[test]
    fn unreserve_when_free_is_unknown_request() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::default());
        let t = cell.reserve().unwrap();
        cell.unreserve(&t).unwrap();
        assert!(matches!(cell.unreserve(&t), Err(CellError::UnknownRequest(_))));
        assert!(!cell.is_reserved());
    }

    #[test]
    fn tokens_are_fresh_completions_at_now() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::default());
        let mut seen = Vec::new();
        for _ in 0..4 {
            let t = cell.reserve().unwrap();
            let Token::Completion(c) = t else { panic!("fail-fast token must be a completion") };
            assert_eq!(c.at, h.now());
            assert!(!seen.contains(&c.id));
            seen.push(c.id);
            cell.unreserve(&t).unwrap();
        }
    }

    #[test]
    fn works_against_injected_fake_scheduler() {
        let fake = CountingScheduler::default();
        let mut cell: Cell<CountingScheduler> = Cell::new(fake.clone(), &CellSpec::default(), None).unwrap();
        let t = cell.reserve().unwrap();
        assert!(matches!(cell.reserve(), Err(CellError::Reserved(_))));
        cell.unreserve(&t).unwrap();
        cell.reserve().unwrap();
        assert_eq!(fake.issued.get(), 2);
    }
}

// ── Queued cell ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod queued_cell {
    use super::*;

    #[test]
    fn not_reservable_rejected_before_queueing() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::blocked());
        assert!(matches!(cell.reserve(), Err(CellError::NotFree(_))));
        assert!(!cell.is_occupied());
        assert_eq!(cell.waiting(), 0);
    }

    #[test]
    fn vacant_cell_grants_in_same_step() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let t = cell.reserve().unwrap();
        let claim = t.claim().copied().unwrap();
        assert_eq!(h.claim_state(&claim), Some(ClaimState::Granted));
        assert!(cell.is_occupied());
    }

    #[test]
    fn n_claims_granted_one_at_a_time_in_order() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let tokens: Vec<Token> = (0..5).map(|_| cell.reserve().unwrap()).collect();
        let claims: Vec<Claim> = tokens.iter().map(|t| *t.claim().unwrap()).collect();

        for (i, token) in tokens.iter().enumerate() {
            let granted: Vec<usize> = claims
                .iter()
                .enumerate()
                .filter(|(_, c)| h.claim_state(c) == Some(ClaimState::Granted))
                .map(|(j, _)| j)
                .collect();
            assert_eq!(granted, vec![i], "only claim {i} may hold the cell");
            assert_eq!(cell.waiting(), tokens.len() - i - 1);
            assert_eq!(cell.unreserve(token).unwrap(), Unreserved::Released);
        }
        assert!(!cell.is_occupied());
    }

    #[test]
    fn withdrawn_claim_never_granted() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let t1 = cell.reserve().unwrap();
        let t2 = cell.reserve().unwrap();
        let t3 = cell.reserve().unwrap();

        assert_eq!(cell.unreserve(&t2).unwrap(), Unreserved::Withdrawn);
        assert_eq!(cell.unreserve(&t1).unwrap(), Unreserved::Released);

        assert_eq!(h.claim_state(t2.claim().unwrap()), None);
        assert_eq!(h.claim_state(t3.claim().unwrap()), Some(ClaimState::Granted));

        assert_eq!(cell.unreserve(&t3).unwrap(), Unreserved::Released);
        assert_eq!(h.claim_state(t2.claim().unwrap()), None);
        assert!(!cell.is_occupied());
    }

    #[test]
    fn unrecognized_token_is_ignored() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let mut other = fail_fast(&h, CellSpec::default());
        let held = cell.reserve().unwrap();
        let foreign = other.reserve().unwrap();

        assert_eq!(cell.unreserve(&foreign).unwrap(), Unreserved::Ignored);
        assert!(cell.is_occupied());
        assert_eq!(h.claim_state(held.claim().unwrap()), Some(ClaimState::Granted));
    }

    #[test]
    fn claim_from_another_queued_cell_is_ignored() {
        let h = SimHandle::new();
        let mut a = queued(&h, CellSpec::default());
        let mut b = queued(&h, CellSpec::default());
        let ta = a.reserve().unwrap();
        let _tb = b.reserve().unwrap();

        assert_eq!(b.unreserve(&ta).unwrap(), Unreserved::Ignored);
        assert!(a.is_occupied());
        assert!(b.is_occupied());
    }

    #[test]
    fn double_unreserve_is_ignored() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let t1 = cell.reserve().unwrap();
        let t2 = cell.reserve().unwrap();
        assert_eq!(cell.unreserve(&t1).unwrap(), Unreserved::Released);
        assert_eq!(cell.unreserve(&t1).unwrap(), Unreserved::Ignored);
        // The second holder keeps the cell.
        assert_eq!(h.claim_state(t2.claim().unwrap()), Some(ClaimState::Granted));
        assert!(cell.is_occupied());
    }

    #[test]
    fn repeated_use_leaves_no_claims_behind() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        for _ in 0..1_000 {
            let held = cell.reserve().unwrap();
            let queued_behind = cell.reserve().unwrap();
            assert_eq!(held.claim().unwrap().resource, cell.resource());
            assert_eq!(cell.unreserve(&queued_behind).unwrap(), Unreserved::Withdrawn);
            assert_eq!(cell.unreserve(&held).unwrap(), Unreserved::Released);
        }
        assert!(!cell.is_occupied());
        assert_eq!(h.live_claims(), 0);
    }

    #[test]
    fn token_wait_maps_to_claim_yield() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let t = cell.reserve().unwrap();
        assert_eq!(t.wait(), Yield::Claim(*t.claim().unwrap()));
    }
}

// ── Scenario C: three robots racing for one queued cell ───────────────────────

#[cfg(test)]
mod queued_processes {
    use super::*;

    type Log = Rc<RefCell<Vec<(u64, u32, &'static str)>>>;

    /// Reserve, hold for `hold` ticks once granted, then vacate.
    struct Holder {
        hold:  u64,
        token: Option<Token>,
        held:  bool,
        log:   Log,
    }

    impl Holder {
        fn new(hold: u64, log: &Log) -> Self {
            Self { hold, token: None, held: false, log: log.clone() }
        }
    }

    impl Process<QueuedCell<SimHandle>> for Holder {
        fn resume(&mut self, pid: ProcessId, cell: &mut QueuedCell<SimHandle>, s: &SimHandle) -> Yield {
            match (self.token, self.held) {
                (None, _) => {
                    let token = cell.reserve().unwrap();
                    self.token = Some(token);
                    token.wait()
                }
                (Some(_), false) => {
                    self.held = true;
                    self.log.borrow_mut().push((s.now().0, pid.0, "granted"));
                    Yield::Sleep(self.hold)
                }
                (Some(token), true) => {
                    assert_eq!(cell.unreserve(&token).unwrap(), Unreserved::Released);
                    self.log.borrow_mut().push((s.now().0, pid.0, "released"));
                    Yield::Done
                }
            }
        }
    }

    #[test]
    fn scenario_c_fifo_handover() {
        let log: Log = Rc::default();
        let h = SimHandle::new();
        let cell = queued(&h, CellSpec::default());
        let mut sim = Sim::new(SimConfig { total_ticks: 100, seed: 1, log_interval_ticks: 0 }, h, cell);
        for _ in 0..3 {
            sim.spawn(Holder::new(10, &log));
        }

        // Everyone has submitted; only process 0 holds the cell.
        sim.run_until(Tick(1), &mut NoopObserver).unwrap();
        assert_eq!(*log.borrow(), vec![(0, 0, "granted")]);
        assert_eq!(sim.world.waiting(), 2);

        // Process 0 leaves at 10; process 1 takes over, process 2 still waits.
        sim.run_until(Tick(15), &mut NoopObserver).unwrap();
        assert_eq!(log.borrow()[1..], [(10, 0, "released"), (10, 1, "granted")]);
        assert_eq!(sim.world.waiting(), 1);

        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(
            log.borrow()[3..],
            [(20, 1, "released"), (20, 2, "granted"), (30, 2, "released")]
        );
        assert!(!sim.world.is_occupied());
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn abandoned_wait_does_not_receive_late_grant() {
        let h = SimHandle::new();
        let mut cell = queued(&h, CellSpec::default());
        let holder = cell.reserve().unwrap();
        let mut sim = Sim::new(SimConfig::default(), h.clone(), cell);

        // Submits, then gives up before the holder leaves.
        let mut token = None;
        sim.spawn(move |_pid: ProcessId, cell: &mut QueuedCell<SimHandle>, _s: &SimHandle| {
            match token {
                None => {
                    let t = cell.reserve().unwrap();
                    token = Some(t);
                    Yield::Sleep(2)
                }
                Some(t) => {
                    assert_eq!(cell.unreserve(&t).unwrap(), Unreserved::Withdrawn);
                    Yield::Done
                }
            }
        });
        sim.run_until(Tick(5), &mut NoopObserver).unwrap();

        assert_eq!(sim.world.unreserve(&holder).unwrap(), Unreserved::Released);
        assert!(!sim.world.is_occupied());
        assert_eq!(sim.world.waiting(), 0);
    }
}

// ── Mail input (Scenario D) ───────────────────────────────────────────────────

#[cfg(test)]
mod mail_input {
    use super::*;

    #[test]
    fn scenario_d_delegates_to_provider_for_exact_input() {
        let asked: Rc<RefCell<Vec<InputId>>> = Rc::default();
        let calls = Rc::new(StdCell::new(0u32));

        let (a, c) = (asked.clone(), calls.clone());
        let closure = move |input: InputId| -> Result<MailGetter<(InputId, u32)>, CellError> {
            a.borrow_mut().push(input);
            let c = c.clone();
            Ok(Box::new(move || {
                c.set(c.get() + 1);
                (input, c.get())
            }))
        };
        let provider: &dyn MailInputProvider<(InputId, u32)> = &closure;

        let h = SimHandle::new();
        let spec = CellSpec::default().with_input(InputId(5));
        let cell: Cell<SimHandle, (InputId, u32)> = Cell::new(h.clone(), &spec, Some(provider)).unwrap();

        // Resolved once at construction.
        assert_eq!(*asked.borrow(), vec![InputId(5)]);
        assert_eq!(cell.get_input().unwrap(), (InputId(5), 1));
        assert_eq!(cell.get_input().unwrap(), (InputId(5), 2));
        assert_eq!(asked.borrow().len(), 1);
    }

    #[test]
    fn scenario_d_no_input_is_not_input_cell() {
        let h = SimHandle::new();
        let cell = fail_fast(&h, CellSpec::default());
        assert!(matches!(cell.get_input(), Err(CellError::NotInput(_))));
        let q = queued(&h, CellSpec::default());
        assert!(matches!(q.get_input(), Err(CellError::NotInput(_))));
    }

    #[test]
    fn input_without_provider_fails_at_construction() {
        let h = SimHandle::new();
        let spec = CellSpec::default().with_input(InputId(3));
        assert!(matches!(
            Cell::<SimHandle>::new(h.clone(), &spec, None),
            Err(CellError::MissingMailProvider(InputId(3)))
        ));
        assert!(matches!(
            QueuedCell::<SimHandle>::new(h.clone(), &spec, None),
            Err(CellError::MissingMailProvider(InputId(3)))
        ));
    }

    #[test]
    fn store_inputs_get_from_registered_store() {
        let h = SimHandle::new();
        let mut inputs = StoreInputs::new(h.clone());
        let store = inputs.register(InputId(5), 8);
        let mail = Mail { id: MailId(1), output: OutputId(2) };
        h.put(store, mail).unwrap().unwrap();

        let spec = CellSpec::default().with_input(InputId(5));
        let provider: &dyn MailInputProvider<MailInput> = &inputs;
        let cell: Cell<SimHandle> = Cell::new(h.clone(), &spec, Some(provider)).unwrap();
        let get = cell.get_input().unwrap().unwrap();
        assert_eq!(get.store, store);
        assert_eq!(h.take(&get), Some(mail));
    }

    #[test]
    fn store_inputs_unknown_input_fails_at_construction() {
        let h = SimHandle::new();
        let inputs = StoreInputs::new(h.clone());
        let spec = CellSpec::default().with_input(InputId(9));
        let provider: &dyn MailInputProvider<MailInput> = &inputs;
        assert!(matches!(
            Cell::<SimHandle>::new(h, &spec, Some(provider)),
            Err(CellError::UnknownInput(InputId(9)))
        ));
    }

    #[test]
    fn links_are_descriptive() {
        let h = SimHandle::new();
        let spec = CellSpec::default().with_output(OutputId(4)).with_charge(ChargeId(1));
        let cell = fail_fast(&h, spec);
        assert_eq!(cell.output_id(), Some(OutputId(4)));
        assert_eq!(cell.charge_id(), Some(ChargeId(1)));
        assert_eq!(cell.input_id(), None);
    }
}

// ── Policy selection, position, layout ────────────────────────────────────────

#[cfg(test)]
mod any_cell {
    use super::*;

    #[test]
    fn build_selects_policy() {
        let h = SimHandle::new();
        let ff = AnyCell::<SimHandle>::build(h.clone(), &CellSpec::open(CellPolicy::FailFast), None).unwrap();
        let q = AnyCell::<SimHandle>::build(h.clone(), &CellSpec::open(CellPolicy::Queued), None).unwrap();
        assert_eq!(ff.policy(), CellPolicy::FailFast);
        assert_eq!(q.policy(), CellPolicy::Queued);
    }

    #[test]
    fn dyn_reserve_over_both_policies() {
        let h = SimHandle::new();
        let mut cells: Vec<Box<dyn Reserve<Input = MailInput>>> = vec![
            Box::new(fail_fast(&h, CellSpec::default())),
            Box::new(queued(&h, CellSpec::default())),
        ];
        for cell in &mut cells {
            let t = cell.reserve().unwrap();
            assert_eq!(cell.unreserve(&t).unwrap(), Unreserved::Released);
        }
    }

    #[test]
    fn occupancy_reflects_policy_state() {
        let h = SimHandle::new();
        let mut cell = AnyCell::<SimHandle>::build(h.clone(), &CellSpec::open(CellPolicy::Queued), None).unwrap();
        assert!(!cell.is_occupied());
        let t = cell.reserve().unwrap();
        assert!(cell.is_occupied());
        cell.unreserve(&t).unwrap();
        assert!(!cell.is_occupied());
    }

    #[test]
    fn position_is_write_once() {
        let h = SimHandle::new();
        let cell = fail_fast(&h, CellSpec::default());
        assert_eq!(cell.to_string(), "Cell(unplaced)");
        cell.base().set_position(Position::new(2, 3)).unwrap();
        assert_eq!(cell.position(), Some(Position::new(2, 3)));
        assert_eq!(cell.to_string(), "Cell(2, 3)");

        let err = cell.base().set_position(Position::new(9, 9)).unwrap_err();
        assert!(matches!(err, CellError::PositionAlreadySet { existing, .. } if existing == Position::new(2, 3)));
        assert_eq!(cell.position(), Some(Position::new(2, 3)));
    }

    #[test]
    fn errors_name_the_cell() {
        let h = SimHandle::new();
        let mut cell = fail_fast(&h, CellSpec::blocked());
        cell.base().set_position(Position::new(1, 1)).unwrap();
        let msg = cell.reserve().unwrap_err().to_string();
        assert!(msg.contains("Cell(1, 1)"), "got {msg}");
    }
}

#[cfg(test)]
mod layout {
    use super::*;

    const LAYOUT_CSV: &str = "\
x,y,reservable,input_id,output_id,charge_id,policy\n\
0,0,true,5,,,fail_fast\n\
1,0,true,,,,queued\n\
2,0,false,,,,\n\
3,0,yes,,2,7,\n\
";

    #[test]
    fn loader_parses_rows() {
        let specs = load_cell_specs_reader(LAYOUT_CSV.as_bytes()).unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].position, Position::new(0, 0));
        assert_eq!(specs[0].spec.input, Some(InputId(5)));
        assert_eq!(specs[1].spec.policy, CellPolicy::Queued);
        assert!(!specs[2].spec.reservable);
        assert_eq!(specs[2].spec.policy, CellPolicy::FailFast);
        assert_eq!(specs[3].spec.output, Some(OutputId(2)));
        assert_eq!(specs[3].spec.charge, Some(ChargeId(7)));
        assert!(specs[3].spec.reservable);
    }

    #[test]
    fn loader_rejects_bad_policy() {
        let csv = "x,y,reservable,input_id,output_id,charge_id,policy\n0,0,true,,,,sometimes\n";
        assert!(matches!(load_cell_specs_reader(csv.as_bytes()), Err(CellError::Parse(_))));
    }

    #[test]
    fn loader_reads_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LAYOUT_CSV.as_bytes()).unwrap();
        let specs = crate::load_cell_specs_csv(file.path()).unwrap();
        assert_eq!(specs.len(), 4);
    }

    #[test]
    fn grid_builds_and_places_cells() {
        let h = SimHandle::new();
        let mut inputs = StoreInputs::new(h.clone());
        inputs.register(InputId(5), 4);
        let specs = load_cell_specs_reader(LAYOUT_CSV.as_bytes()).unwrap();

        let provider: &dyn MailInputProvider<MailInput> = &inputs;
        let mut grid: CellGrid<SimHandle> = CellGrid::build(&h, &specs, Some(provider)).unwrap();
        assert_eq!(grid.len(), 4);
        let id = grid.id_at(Position::new(1, 0)).unwrap();
        assert_eq!(grid.get(id).unwrap().policy(), CellPolicy::Queued);
        assert_eq!(grid.input_cells().collect::<Vec<_>>(), vec![(wh_core::CellId(0), InputId(5))]);

        let wall = grid.at_mut(Position::new(2, 0)).unwrap();
        assert!(matches!(wall.reserve(), Err(CellError::NotFree(_))));
        assert_eq!(wall.to_string(), "Cell(2, 0)");
    }

    #[test]
    fn grid_rejects_duplicate_positions() {
        let h = SimHandle::new();
        let spec = crate::PlacedSpec { position: Position::new(0, 0), spec: CellSpec::default() };
        let result = CellGrid::<SimHandle>::build(&h, &[spec.clone(), spec], None);
        assert!(matches!(result, Err(CellError::DuplicatePosition(_))));
    }
}
