//! The VSIDS branching heuristic.
//!
//! The VSIDS (Variable State Independent Decaying Sum) branching heuristic keeps an activity value
//! for each variable. For each conflict some variables are bumped, which means that their activity
//! is increased by a constant. After each conflict, the activity of all variables is decayed by
//! multiplying it with a constant below 1.
//!
//! When a decision is made, it branches on the variable with the highest activity among the
//! unassigned variables.
//!
//! There are a few variants that differ in which variables are bumped. Like Minisat and many
//! others, this bumps all variables of the conflict clause and all variables resolved on during
//! conflict analysis.

use ordered_float::OrderedFloat;

use sonata_formula::Var;

use crate::config::SolverConfig;

/// The VSIDS branching heuristic.
///
/// Instead of decaying all activities on each conflict, the bump value is divided by the decay
/// factor, which is equivalent up to a uniform scaling factor. As only the order of activities
/// matters, the scaling factor can be ignored as long as it stays finite. When the bump value or
/// an activity would overflow, all values are rescaled into a small range.
///
/// The unassigned variables are kept in a lazy binary max-heap: a variable stays in the heap when
/// it is assigned and stale entries are filtered when the maximum is extracted.
pub struct Vsids {
    /// The activity of each variable.
    activity: Vec<OrderedFloat<f32>>,
    /// A binary max-heap of the variables, ordered by activity.
    heap: Vec<Var>,
    /// The position in the binary heap for each variable.
    position: Vec<Option<usize>>,
    /// The value to add on bumping.
    bump: f32,
    /// The inverse of the decay factor.
    inv_decay: f32,
}

impl Default for Vsids {
    fn default() -> Vsids {
        Vsids {
            activity: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / SolverConfig::default().vsids_decay,
        }
    }
}

impl Vsids {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.activity.len();
        debug_assert!(!self.heap.iter().any(|&v| v.index() >= count));
        self.activity.resize(count, OrderedFloat(0.0));
        self.position.resize(count, None);

        for i in old_count..count {
            self.make_available(Var::from_index(i));
        }
    }

    /// Rescale activities if any value exceeds this value.
    fn rescale_limit() -> f32 {
        std::f32::MAX / 16.0
    }

    /// Change the decay factor.
    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Bump a variable by increasing its activity.
    pub fn bump(&mut self, var: Var) {
        let rescale = {
            let value = &mut self.activity[var.index()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    /// Decay all variable activities.
    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    /// Rescale all values to avoid an overflow.
    fn rescale(&mut self) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for activity in &mut self.activity {
            activity.0 *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }

    /// Insert a variable into the heap if not already present.
    pub fn make_available(&mut self, var: Var) {
        if self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    /// Whether `a` is extracted before `b`: higher activity first, ties broken towards the
    /// smaller variable index.
    fn before(&self, a: Var, b: Var) -> bool {
        (self.activity[a.index()], b.index()) > (self.activity[b.index()], a.index())
    }

    /// Swap two heap entries, given by their positions.
    fn swap_entries(&mut self, pos_a: usize, pos_b: usize) {
        self.heap.swap(pos_a, pos_b);
        self.position[self.heap[pos_a].index()] = Some(pos_a);
        self.position[self.heap[pos_b].index()] = Some(pos_b);
    }

    /// Move a variable closer to the root until the heap property is restored.
    fn sift_up(&mut self, mut pos: usize) {
        while pos != 0 {
            let parent_pos = (pos - 1) / 2;
            let var = self.heap[pos];
            let parent_var = self.heap[parent_pos];
            if !self.before(var, parent_var) {
                return;
            }
            self.swap_entries(pos, parent_pos);
            pos = parent_pos;
        }
    }

    /// Move a variable away from the root until the heap property is restored.
    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let mut first_pos = pos;

            for child_pos in [pos * 2 + 1, pos * 2 + 2].iter().cloned() {
                if child_pos < self.heap.len()
                    && self.before(self.heap[child_pos], self.heap[first_pos])
                {
                    first_pos = child_pos;
                }
            }

            if first_pos == pos {
                return;
            }

            self.swap_entries(pos, first_pos);
            pos = first_pos;
        }
    }
}

/// Extracts the variable with the maximal activity.
///
/// May contain stale entries of assigned variables, the caller is responsible for skipping those.
impl Iterator for Vsids {
    type Item = Var;

    fn next(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            None
        } else {
            let var = self.heap.swap_remove(0);
            if !self.heap.is_empty() {
                let top_var = self.heap[0];
                self.position[top_var.index()] = Some(0);
                self.sift_down(0);
            }
            self.position[var.index()] = None;
            Some(var)
        }
    }
}
