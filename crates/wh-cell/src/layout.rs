//! `CellGrid` — the cell table a simulation world holds.
//!
//! Builds every cell from its spec, then assigns positions.  Routing and
//! topology stay with the caller; the grid only answers "which cell is at
//! this position".

use std::collections::HashMap;

use wh_core::{CellId, InputId, Position};
use wh_sched::Scheduler;

use crate::{AnyCell, CellError, CellResult, MailInput, MailInputProvider, PlacedSpec, Reserve};

pub struct CellGrid<S, G = MailInput> {
    cells:       Vec<AnyCell<S, G>>,
    by_position: HashMap<Position, CellId>,
}

impl<S: Scheduler + Clone, G> CellGrid<S, G> {
    /// Construct one cell per entry, in order, so `CellId(i)` is `placed[i]`.
    pub fn build(
        sched:    &S,
        placed:   &[PlacedSpec],
        provider: Option<&dyn MailInputProvider<G>>,
    ) -> CellResult<Self> {
        let mut cells = Vec::with_capacity(placed.len());
        let mut by_position = HashMap::with_capacity(placed.len());

        for (i, entry) in placed.iter().enumerate() {
            if by_position.contains_key(&entry.position) {
                return Err(CellError::DuplicatePosition(entry.position));
            }
            let cell = AnyCell::build(sched.clone(), &entry.spec, provider)?;
            cell.base().set_position(entry.position)?;
            by_position.insert(entry.position, CellId(i as u32));
            cells.push(cell);
        }

        Ok(Self { cells, by_position })
    }
}

impl<S, G> CellGrid<S, G> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn id_at(&self, position: Position) -> Option<CellId> {
        self.by_position.get(&position).copied()
    }

    pub fn get(&self, id: CellId) -> Option<&AnyCell<S, G>> {
        self.cells.get(id.index())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut AnyCell<S, G>> {
        self.cells.get_mut(id.index())
    }

    pub fn at_mut(&mut self, position: Position) -> Option<&mut AnyCell<S, G>> {
        let id = self.id_at(position)?;
        self.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &AnyCell<S, G>)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId(i as u32), c))
    }
}

impl<S: Scheduler, G> CellGrid<S, G> {
    /// Cells linked to a mail input, with the input they read from.
    pub fn input_cells(&self) -> impl Iterator<Item = (CellId, InputId)> + '_ {
        self.iter().filter_map(|(id, c)| c.input_id().map(|input| (id, input)))
    }
}
