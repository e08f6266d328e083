//! The combined (STS-3) sequence.
//!
//! Slot `width * k + j` belongs to round `k` and source `j + 1`.

use crate::types::Slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSequence {
    width: usize,
    slots: Vec<Slot>,
}

impl CombinedSequence {
    pub fn new(width: usize) -> Self {
        Self { width, slots: Vec::new() }
    }

    /// Wrap raw slots. Alignment is checked by the reconstructor, not here.
    pub fn from_slots(width: usize, slots: Vec<Slot>) -> Self {
        Self { width, slots }
    }

    /// Parse legacy wire bytes; every zero byte becomes `Absent`.
    pub fn from_wire(width: usize, data: &[u8]) -> Self {
        Self {
            width,
            slots: data.iter().copied().map(Slot::from_wire).collect(),
        }
    }

    pub(crate) fn push_round(&mut self, round: &[Slot]) {
        debug_assert_eq!(round.len(), self.width);
        self.slots.extend_from_slice(round);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.width > 0 && self.slots.len() % self.width == 0
    }

    /// Number of complete rounds.
    pub fn rounds(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.slots.len() / self.width
        }
    }

    /// Slots of round `k`, in source order.
    pub fn round(&self, k: usize) -> Option<&[Slot]> {
        if self.width == 0 {
            return None;
        }
        let start = k.checked_mul(self.width)?;
        self.slots.get(start..start + self.width)
    }

    pub fn absent_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_present()).count()
    }

    /// Legacy STS-3 bytes with `Absent` rendered as the zero placeholder.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        self.slots.iter().map(|s| s.to_wire()).collect()
    }
}
