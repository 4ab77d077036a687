//! Floating-block selection
//!
//! A floating block is a single open cell that, when made solid, cuts its
//! region into pieces that are each still anchored somewhere else: at a room
//! or at another floating block. Toggling such a cell opens or closes a
//! secret area. Selection is greedy: a random candidate is tentatively
//! blocked, the pieces are flood-filled under fresh region ids, and the
//! attempt is rolled back if any piece would be left hanging.

use std::collections::{HashMap, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use super::regions::{RegionLabel, RegionMap};
use crate::core::types::IVec3;

/// Regions smaller than this never receive a floating block
pub const MIN_REGION_CELLS: usize = 5;

/// Rolled-back attempts allowed per region id
pub const MAX_REGION_RETRIES: u32 = 2000;

/// Random draws when looking for a candidate cell in a region
pub const CANDIDATE_ATTEMPTS: usize = 100;

/// Number of obstruction classes blocks are dealt into by default
pub const DEFAULT_OBSTRUCTION_CLASSES: usize = 2;

/// What a piece's flood fill ran into besides its own region
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub touches_room: bool,
    /// Touched a committed floating block other than the tentative one
    pub touches_other_pending: bool,
}

impl FillOutcome {
    /// A piece anchored nowhere; blocking would strand it
    pub fn is_isolated(&self) -> bool {
        !self.touches_room && !self.touches_other_pending
    }
}

/// Selected floating blocks, one ordered list per obstruction class
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FloatingBlocks {
    classes: Vec<Vec<IVec3>>,
}

impl FloatingBlocks {
    pub fn new(num_classes: usize) -> Self {
        Self {
            classes: vec![Vec::new(); num_classes],
        }
    }

    pub fn classes(&self) -> &[Vec<IVec3>] {
        &self.classes
    }

    /// Total number of blocks across all classes
    pub fn len(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        self.classes.iter().any(|class| class.contains(&cell))
    }

    /// Obstruction class holding `cell`
    pub fn class_of(&self, cell: IVec3) -> Option<usize> {
        self.classes.iter().position(|class| class.contains(&cell))
    }

    fn remove(&mut self, cell: IVec3) -> bool {
        for class in &mut self.classes {
            if let Some(i) = class.iter().position(|&c| c == cell) {
                class.remove(i);
                return true;
            }
        }
        false
    }
}

/// Greedy floating-block selector with rollback
#[derive(Clone, Debug)]
pub struct FloatingBlockSelector {
    num_classes: usize,
    /// Cell the post-filter floods from
    origin: IVec3,
}

impl FloatingBlockSelector {
    /// Selector dealing blocks into `num_classes` classes (at least one),
    /// post-filtering from the start cell `(1, 1, 1)`.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes: num_classes.max(1),
            origin: IVec3::ONE,
        }
    }

    pub fn with_origin(mut self, origin: IVec3) -> Self {
        self.origin = origin;
        self
    }

    /// Select floating blocks for every region of `map`, relabelling the
    /// chosen cells `Floating` and the pieces they split off with fresh ids.
    pub fn select<R: Rng + ?Sized>(&self, map: &mut RegionMap, rng: &mut R) -> FloatingBlocks {
        let mut blocks = FloatingBlocks::new(self.num_classes);
        let mut members = map.members();
        let mut next_id = map.region_count() + 1;
        let mut class = 0;
        let mut rollbacks = 0usize;

        for region in 1..=map.region_count() {
            // No piece of a region bordering nothing could ever be anchored
            if !members.get(&region).is_some_and(|cells| borders_anchor(map, cells)) {
                continue;
            }
            let mut worklist = VecDeque::from([region]);
            let mut retries: HashMap<u32, u32> = HashMap::new();

            while let Some(id) = worklist.pop_front() {
                let size = members.get(&id).map_or(0, Vec::len);
                if size < MIN_REGION_CELLS || retries.get(&id).copied().unwrap_or(0) > MAX_REGION_RETRIES {
                    continue;
                }
                let Some((cell, neighbors)) = pick_candidate(map, &members[&id], id, rng) else {
                    continue;
                };

                map.set_label(cell, RegionLabel::Floating);
                let first_fresh = next_id;
                let mut pieces = Vec::with_capacity(neighbors.len());
                for neighbor in neighbors {
                    // Already swallowed by an earlier piece of this attempt
                    if map.label(neighbor) != Some(RegionLabel::Region(id)) {
                        continue;
                    }
                    let (cells, outcome) = fill_piece(map, neighbor, id, cell);
                    for &c in &cells {
                        map.set_label(c, RegionLabel::Region(next_id));
                    }
                    pieces.push((next_id, cells, outcome));
                    next_id += 1;
                }

                if pieces.iter().any(|(_, _, outcome)| outcome.is_isolated()) {
                    map.set_label(cell, RegionLabel::Region(id));
                    for (_, cells, _) in &pieces {
                        for &c in cells {
                            map.set_label(c, RegionLabel::Region(id));
                        }
                    }
                    next_id = first_fresh;
                    *retries.entry(id).or_default() += 1;
                    rollbacks += 1;
                    worklist.push_back(id);
                    continue;
                }

                members.remove(&id);
                for (piece_id, cells, outcome) in pieces {
                    if outcome.touches_room {
                        worklist.push_back(piece_id);
                    }
                    members.insert(piece_id, cells);
                }
                blocks.classes[class].push(cell);
                class = (class + 1) % self.num_classes;
            }
        }

        let selected = blocks.len();
        let stripped = self.strip_externally_reachable(map, &mut blocks);
        log::debug!(
            "Selected {} floating blocks ({} rollbacks, {} stripped as reachable from {})",
            selected, rollbacks, stripped, self.origin
        );
        blocks
    }

    /// Flood from the origin through unvisited and floating cells; every
    /// floating block reached that way is a shortcut rather than a gate and
    /// is reverted to `Unvisited`. Returns how many were removed.
    fn strip_externally_reachable(&self, map: &mut RegionMap, blocks: &mut FloatingBlocks) -> usize {
        let reached = map.labels().flood_from(self.origin, |_, label| {
            matches!(label, RegionLabel::Unvisited | RegionLabel::Floating)
        });

        let mut stripped = 0;
        for cell in reached {
            if map.label(cell) == Some(RegionLabel::Floating) {
                blocks.remove(cell);
                map.set_label(cell, RegionLabel::Unvisited);
                stripped += 1;
            }
        }
        stripped
    }
}

/// Whether any of `cells` touches a room or a floating block
fn borders_anchor(map: &RegionMap, cells: &[IVec3]) -> bool {
    cells.iter().any(|&cell| {
        map.labels()
            .neighbors(cell)
            .any(|(_, label)| matches!(label, RegionLabel::Room | RegionLabel::Floating))
    })
}

/// Random region cell with at least two neighbours in the same region
fn pick_candidate<R: Rng + ?Sized>(
    map: &RegionMap,
    cells: &[IVec3],
    id: u32,
    rng: &mut R,
) -> Option<(IVec3, Vec<IVec3>)> {
    for _ in 0..CANDIDATE_ATTEMPTS {
        let &cell = cells.choose(rng)?;
        let neighbors: Vec<IVec3> = map
            .labels()
            .neighbors(cell)
            .filter(|&(_, label)| label == RegionLabel::Region(id))
            .map(|(c, _)| c)
            .collect();
        if neighbors.len() >= 2 {
            return Some((cell, neighbors));
        }
    }
    None
}

/// Flood region `id` from `start`, noting rooms and other floating blocks
/// bordering the piece. `tentative` is the block being tried.
fn fill_piece(map: &RegionMap, start: IVec3, id: u32, tentative: IVec3) -> (Vec<IVec3>, FillOutcome) {
    let mut outcome = FillOutcome::default();
    let cells = map.labels().flood_from(start, |coord, label| match label {
        RegionLabel::Region(r) => r == id,
        RegionLabel::Room => {
            outcome.touches_room = true;
            false
        }
        RegionLabel::Floating => {
            if coord != tentative {
                outcome.touches_other_pending = true;
            }
            false
        }
        _ => false,
    });
    (cells, outcome)
}
