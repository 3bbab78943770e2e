//! Ordered assignment of seeds to a consumer's input sequence.
//!
//! Every operation is a pure function from an old assignment to a new one. Apart from
//! [`Assignment::with_raw_position`], they keep the assigned positions a contiguous
//! `0..k` permutation.

use std::collections::BTreeMap;

use crate::seeds::SeedId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    positions: BTreeMap<SeedId, usize>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, id: SeedId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Assigned ids sorted by position.
    pub fn ordered_ids(&self) -> Vec<SeedId> {
        let mut ids: Vec<(usize, SeedId)> =
            self.positions.iter().map(|(id, pos)| (*pos, *id)).collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether the assigned positions are exactly `0..len`.
    pub fn is_contiguous(&self) -> bool {
        let mut positions: Vec<usize> = self.positions.values().copied().collect();
        positions.sort_unstable();
        positions.iter().enumerate().all(|(i, p)| i == *p)
    }

    /// Sets a position without renormalizing the others.
    pub fn with_raw_position(&self, id: SeedId, position: Option<usize>) -> Assignment {
        let mut positions = self.positions.clone();
        match position {
            Some(position) => positions.insert(id, position),
            None => positions.remove(&id),
        };
        Assignment { positions }
    }

    /// Unassigns `id` and closes the gap it leaves. Unassigned ids are a no-op.
    pub fn remove(&self, id: SeedId) -> Assignment {
        let Some(removed) = self.position(id) else {
            return self.clone();
        };

        let positions = self
            .positions
            .iter()
            .filter(|(other, _)| **other != id)
            .map(|(other, pos)| {
                let pos = if *pos > removed { pos - 1 } else { *pos };
                (*other, pos)
            })
            .collect();

        Assignment { positions }
    }

    /// Moves or adds `id` to the end of the sequence.
    pub fn append(&self, id: SeedId) -> Assignment {
        let compacted = self.remove(id);
        let end = compacted.len();
        compacted.with_raw_position(id, Some(end))
    }

    /// Moves or adds `dragged` to the position `target` held before the move.
    ///
    /// Dropping onto an unassigned target appends instead, and dropping an id onto
    /// itself changes nothing.
    pub fn insert_at_target(&self, dragged: SeedId, target: SeedId) -> Assignment {
        if dragged == target {
            return self.clone();
        }

        let Some(target_position) = self.position(target) else {
            return self.append(dragged);
        };

        let compacted = self.remove(dragged);
        let positions = compacted
            .positions
            .iter()
            .map(|(id, pos)| {
                let pos = if *pos >= target_position { pos + 1 } else { *pos };
                (*id, pos)
            })
            .chain(std::iter::once((dragged, target_position)))
            .collect();

        Assignment { positions }
    }
}
