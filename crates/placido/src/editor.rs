//! Value-semantic ring-map editing with snapshot undo history.
//!
//! The pipeline never mutates a [`RingMap`] in place; an editor owns a
//! working copy, records a snapshot before every mutation, and hands the
//! edited value back for re-entry via
//! [`Analyzer::analyze_ring_map`](crate::Analyzer::analyze_ring_map).
//! Recentring is deliberately absent: ring radii are center-relative, so a
//! new center means a re-scan with an updated
//! [`ScanConfig::center`](crate::ScanConfig), not a point translation.

use crate::scan::{Ring, RingMap};

/// Interactive editing session over one ring map.
#[derive(Debug, Clone)]
pub struct RingMapEditor {
    current: RingMap,
    undo_stack: Vec<RingMap>,
}

impl RingMapEditor {
    /// Start an editing session over a scanned (or previously edited) map.
    pub fn new(map: RingMap) -> Self {
        Self {
            current: map,
            undo_stack: Vec::new(),
        }
    }

    /// The map as edited so far.
    pub fn current(&self) -> &RingMap {
        &self.current
    }

    /// True when at least one edit can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Delete one ring by angle and in-sequence index.
    ///
    /// Drops the angle key when its list empties. Returns the removed ring,
    /// or `None` (and records no snapshot) when the target does not exist.
    pub fn delete_ring(&mut self, angle_deg: u16, index: usize) -> Option<Ring> {
        if self
            .current
            .rings_at(angle_deg)
            .map_or(true, |list| index >= list.len())
        {
            return None;
        }
        self.undo_stack.push(self.current.clone());
        self.current.remove_ring(angle_deg, index)
    }

    /// Delete every ring within `brush_radius` of `(x, y)`.
    ///
    /// Returns the number of rings removed; a miss records no snapshot.
    pub fn delete_within(&mut self, x: f64, y: f64, brush_radius: f64) -> usize {
        let r2 = brush_radius * brush_radius;
        let hit = |ring: &Ring| {
            let dx = ring.x - x;
            let dy = ring.y - y;
            dx * dx + dy * dy <= r2
        };
        let before = self.current.total_rings();
        if !self.current.iter().any(|(_, list)| list.iter().any(hit)) {
            return 0;
        }
        self.undo_stack.push(self.current.clone());
        self.current.retain(|_, ring| !hit(ring));
        before - self.current.total_rings()
    }

    /// Remove radial outliers: rings whose radius deviates from the
    /// per-sequence-index median across all angles by more than
    /// `max_deviation` pixels.
    ///
    /// Returns the number of rings removed.
    pub fn auto_clean(&mut self, max_deviation: f64) -> usize {
        let medians = per_index_median_radii(&self.current);
        let cleaned = RingMap::from_entries(self.current.iter().map(|(angle, list)| {
            let kept: Vec<Ring> = list
                .iter()
                .enumerate()
                .filter(|(i, ring)| {
                    medians
                        .get(*i)
                        .map_or(true, |&med| (ring.radius - med).abs() <= max_deviation)
                })
                .map(|(_, &ring)| ring)
                .collect();
            (angle, kept)
        }));

        let removed = self.current.total_rings() - cleaned.total_rings();
        if removed > 0 {
            self.undo_stack.push(std::mem::take(&mut self.current));
            self.current = cleaned;
        }
        removed
    }

    /// Undo the most recent edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }

    /// Discard all edits, restoring the map the session started from.
    pub fn reset(&mut self) {
        if let Some(first) = self.undo_stack.first().cloned() {
            self.current = first;
            self.undo_stack.clear();
        }
    }

    /// Consume the session, returning the edited map.
    pub fn finish(self) -> RingMap {
        self.current
    }
}

/// Median ring radius per sequence index across all angles.
fn per_index_median_radii(map: &RingMap) -> Vec<f64> {
    let max_len = map.iter().map(|(_, list)| list.len()).max().unwrap_or(0);
    let mut medians = Vec::with_capacity(max_len);
    for i in 0..max_len {
        let mut radii: Vec<f64> = map
            .iter()
            .filter_map(|(_, list)| list.get(i).map(|r| r.radius))
            .collect();
        radii.sort_by(|a, b| a.partial_cmp(b).unwrap());
        medians.push(radii[radii.len() / 2]);
    }
    medians
}
