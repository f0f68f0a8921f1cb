//! State shared by both policies: structural flag, resource links, position
//! and the resolved mail-input getter.

use std::cell::OnceCell;
use std::fmt;

use wh_core::{ChargeId, InputId, OutputId, Position};

use crate::{CellError, CellResult, CellSpec, MailGetter, MailInputProvider};

/// The policy-independent half of a cell.
pub struct CellBase<G> {
    reservable: bool,
    input:      Option<InputId>,
    output:     Option<OutputId>,
    charge:     Option<ChargeId>,
    getter:     Option<MailGetter<G>>,
    /// Assigned once by the layout builder; diagnostics only.
    position:   OnceCell<Position>,
}

impl<G> CellBase<G> {
    /// Resolve the spec's input link against `provider`.
    ///
    /// An input link without a provider is a configuration error and fails
    /// here, never at first use.
    pub fn new(spec: &CellSpec, provider: Option<&dyn MailInputProvider<G>>) -> CellResult<Self> {
        let getter = match spec.input {
            None => None,
            Some(input) => {
                let provider = provider.ok_or(CellError::MissingMailProvider(input))?;
                Some(provider.getter(input)?)
            }
        };
        Ok(Self {
            reservable: spec.reservable,
            input:      spec.input,
            output:     spec.output,
            charge:     spec.charge,
            getter,
            position:   OnceCell::new(),
        })
    }

    pub fn reservable(&self) -> bool {
        self.reservable
    }

    pub fn input_id(&self) -> Option<InputId> {
        self.input
    }

    pub fn output_id(&self) -> Option<OutputId> {
        self.output
    }

    pub fn charge_id(&self) -> Option<ChargeId> {
        self.charge
    }

    pub fn position(&self) -> Option<Position> {
        self.position.get().copied()
    }

    /// Record where the cell sits.  Write-once.
    pub fn set_position(&self, position: Position) -> CellResult<()> {
        self.position.set(position).map_err(|_| CellError::PositionAlreadySet {
            cell:     self.to_string(),
            existing: self.position().unwrap_or(position),
        })
    }

    /// Start one retrieval from the linked mail input.
    pub fn get_input(&self) -> CellResult<G> {
        match &self.getter {
            Some(getter) => Ok(getter()),
            None => Err(CellError::NotInput(self.to_string())),
        }
    }
}

impl<G> fmt::Display for CellBase<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position.get() {
            Some(p) => write!(f, "Cell{p}"),
            None => f.write_str("Cell(unplaced)"),
        }
    }
}

impl<G> fmt::Debug for CellBase<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellBase")
            .field("reservable", &self.reservable)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("charge", &self.charge)
            .field("position", &self.position.get())
            .finish_non_exhaustive()
    }
}
