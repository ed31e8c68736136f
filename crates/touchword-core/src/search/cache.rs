//! The search frontier: bounded per-depth lists, the terminal list, and the
//! continuation snapshots that let a later call resume this search.

use std::cmp::Ordering;
use std::mem;

use super::dic_node::DicNode;
use super::LOOKAHEAD_DIC_NODES_CACHE_SIZE;

/// Frontier ordering key: normalized compound distance, ties broken by
/// lower language distance, then lower depth. `total_cmp` keeps the order
/// bit-identical across runs.
fn compare(a: &DicNode, b: &DicNode) -> Ordering {
    a.scoring
        .normalized_compound_distance()
        .total_cmp(&b.scoring.normalized_compound_distance())
        .then(
            a.scoring
                .language_distance()
                .total_cmp(&b.scoring.language_distance()),
        )
        .then(a.depth().cmp(&b.depth()))
}

/// A bounded list kept sorted best-first. Insertion into a full list with a
/// worse key is a no-op; a better key evicts the current worst.
///
/// A sorted `Vec` with `partition_point` insertion beats a binary heap here:
/// capacities are small, nodes are value-copied anyway, and the stable order
/// gives deterministic iteration for free.
#[derive(Debug, Default)]
pub(crate) struct BoundedNodeList {
    nodes: Vec<DicNode>,
    capacity: usize,
}

impl BoundedNodeList {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, node: DicNode) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let pos = self
            .nodes
            .partition_point(|n| compare(n, &node) != Ordering::Greater);
        if pos >= self.capacity {
            return false;
        }
        self.nodes.insert(pos, node);
        self.nodes.truncate(self.capacity);
        true
    }

    pub(crate) fn pop_best(&mut self) -> Option<DicNode> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.remove(0))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    fn take_nodes(&mut self) -> Vec<DicNode> {
        mem::take(&mut self.nodes)
    }

    fn best(&self) -> Option<&DicNode> {
        self.nodes.first()
    }

    fn retain(&mut self, f: impl FnMut(&DicNode) -> bool) {
        self.nodes.retain(f);
    }
}

/// Frontier cache: active list for the current input depth, next-active list
/// for the depth one ahead, terminal list, and one continuation snapshot per
/// input depth.
pub struct SearchCache {
    active: BoundedNodeList,
    next_active: BoundedNodeList,
    terminals: BoundedNodeList,
    continuation: Vec<BoundedNodeList>,
    input_index: usize,
    last_cached_input_index: usize,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    pub fn new() -> Self {
        Self {
            active: BoundedNodeList::new(0),
            next_active: BoundedNodeList::new(0),
            terminals: BoundedNodeList::new(0),
            continuation: Vec::new(),
            input_index: 0,
            last_cached_input_index: 0,
        }
    }

    pub fn reset(&mut self, max_cache_size: usize, max_terminals: usize) {
        self.active = BoundedNodeList::new(max_cache_size);
        self.next_active = BoundedNodeList::new(max_cache_size);
        self.terminals = BoundedNodeList::new(max_terminals);
        self.continuation.clear();
        self.input_index = 0;
        self.last_cached_input_index = 0;
    }

    pub fn push_active(&mut self, node: DicNode) {
        self.active.push(node);
    }

    pub fn push_next_active(&mut self, node: DicNode) {
        self.next_active.push(node);
    }

    pub fn push_terminal(&mut self, node: DicNode) {
        self.terminals.push(node);
    }

    pub fn pop_active(&mut self) -> Option<DicNode> {
        self.active.pop_best()
    }

    pub fn active_size(&self) -> usize {
        self.active.len()
    }

    pub fn terminal_size(&self) -> usize {
        self.terminals.len()
    }

    /// Promote the next-active list to active.
    pub fn advance_active(&mut self) {
        mem::swap(&mut self.active, &mut self.next_active);
        self.next_active.clear();
    }

    /// Advance the input-depth counter, capped at the input size so that
    /// completion rounds keep snapshotting into the deepest slot.
    pub fn advance_input_index(&mut self, input_size: usize) {
        if self.input_index < input_size {
            self.input_index += 1;
        }
    }

    pub fn input_index(&self) -> usize {
        self.input_index
    }

    /// Snapshot a node into the continuation cache at the current depth.
    pub fn push_continuation(&mut self, mut node: DicNode) {
        while self.continuation.len() <= self.input_index {
            self.continuation
                .push(BoundedNodeList::new(LOOKAHEAD_DIC_NODES_CACHE_SIZE));
        }
        node.set_cached();
        self.continuation[self.input_index].push(node);
    }

    pub fn has_continuation(&self) -> bool {
        self.continuation.iter().any(|level| !level.is_empty())
    }

    /// Restore the active list from the deepest continuation snapshot and
    /// rewind the depth counter to it. Snapshots above it are discarded and
    /// will be rebuilt as the search re-expands.
    pub fn continue_search(&mut self) -> bool {
        let Some(depth) = self
            .continuation
            .iter()
            .rposition(|level| !level.is_empty())
        else {
            return false;
        };
        self.active.clear();
        self.next_active.clear();
        let mut level = self.continuation.split_off(depth);
        for mut node in level.remove(0).take_nodes() {
            node.clear_cached();
            self.active.push(node);
        }
        self.input_index = depth;
        self.last_cached_input_index = depth;
        true
    }

    /// Commit the first `k` words of the current top-1 path: prune every
    /// snapshot to descendants of the committed prefix and return the top
    /// node so the caller can update its previous-word position. The top-1
    /// is read from the deepest snapshot, the frontier at input exhaustion.
    pub fn set_commit_point(&mut self, commit_point: usize) -> Option<DicNode> {
        let top = self
            .continuation
            .iter()
            .rev()
            .find_map(|level| level.best())?
            .clone();

        let spaces = top.space_indices();
        let prefix_len = if spaces.len() >= commit_point && commit_point > 0 {
            spaces[commit_point - 1] + 1
        } else {
            top.output().len()
        };
        let prefix: Vec<char> = top.output()[..prefix_len].to_vec();
        for level in &mut self.continuation {
            level.retain(|node| {
                node.output().len() >= prefix.len() && node.output()[..prefix.len()] == prefix[..]
            });
        }
        Some(top)
    }

    pub fn update_last_cached_input_index(&mut self) {
        self.last_cached_input_index = self.input_index;
    }

    /// True when `point_index` belongs to a node deferred from the previous
    /// depth, which is when look-ahead corrections may fire.
    pub fn is_look_ahead_correction_input_index(&self, point_index: usize) -> bool {
        self.input_index > 0 && point_index + 1 == self.input_index
    }

    /// Remove and return all terminals, best first.
    pub fn drain_terminals_best_first(&mut self) -> Vec<DicNode> {
        self.terminals.take_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_distance(spatial: f32, consumed: u16) -> DicNode {
        let mut node = DicNode::init_as_root(0, None);
        node.forward_input_index(0, consumed);
        node.scoring.add_cost(
            spatial,
            0.0,
            true,
            node.total_input_index(),
            false,
            false,
            100.0,
        );
        node
    }

    #[test]
    fn bounded_push_evicts_worst() {
        let mut list = BoundedNodeList::new(2);
        assert!(list.push(node_with_distance(0.5, 1)));
        assert!(list.push(node_with_distance(0.3, 1)));
        // Full, and worse than both: rejected.
        assert!(!list.push(node_with_distance(0.9, 1)));
        assert_eq!(list.len(), 2);
        // Full, better than the worst: accepted, worst evicted.
        assert!(list.push(node_with_distance(0.1, 1)));
        assert_eq!(list.len(), 2);
        let best = list.pop_best().unwrap();
        assert!((best.scoring.normalized_compound_distance() - 0.1).abs() < 1e-6);
        let second = list.pop_best().unwrap();
        assert!((second.scoring.normalized_compound_distance() - 0.3).abs() < 1e-6);
        assert!(list.pop_best().is_none());
    }

    #[test]
    fn tie_break_prefers_lower_language_distance() {
        let mut a = DicNode::init_as_root(0, None);
        a.forward_input_index(0, 1);
        a.scoring.add_cost(0.2, 0.3, true, 1, false, false, 100.0);
        let mut b = DicNode::init_as_root(0, None);
        b.forward_input_index(0, 1);
        b.scoring.add_cost(0.3, 0.2, true, 1, false, false, 100.0);
        // Same normalized distance (0.5), b has the lower language distance.
        assert_eq!(compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn advance_active_swaps_lists() {
        let mut cache = SearchCache::new();
        cache.reset(8, 4);
        cache.push_next_active(node_with_distance(0.2, 1));
        assert_eq!(cache.active_size(), 0);
        cache.advance_active();
        assert_eq!(cache.active_size(), 1);
        cache.advance_active();
        assert_eq!(cache.active_size(), 0);
    }

    #[test]
    fn input_index_caps_at_input_size() {
        let mut cache = SearchCache::new();
        cache.reset(8, 4);
        for _ in 0..5 {
            cache.advance_input_index(3);
        }
        assert_eq!(cache.input_index(), 3);
    }

    #[test]
    fn continuation_restores_deepest_snapshot() {
        let mut cache = SearchCache::new();
        cache.reset(8, 4);
        cache.push_continuation(node_with_distance(0.4, 0));
        cache.advance_input_index(3);
        cache.advance_input_index(3);
        cache.push_continuation(node_with_distance(0.2, 2));
        assert!(cache.has_continuation());

        assert!(cache.continue_search());
        assert_eq!(cache.input_index(), 2);
        assert_eq!(cache.active_size(), 1);
        let node = cache.pop_active().unwrap();
        assert!(!node.is_cached);
        assert_eq!(node.input_index(0), 2);

        // The shallower snapshot is still there for a later rewind.
        assert!(cache.has_continuation());
        assert!(cache.continue_search());
        assert_eq!(cache.input_index(), 0);
    }

    #[test]
    fn continue_search_empty_cache() {
        let mut cache = SearchCache::new();
        cache.reset(8, 4);
        assert!(!cache.has_continuation());
        assert!(!cache.continue_search());
    }

    #[test]
    fn look_ahead_index_is_previous_depth() {
        let mut cache = SearchCache::new();
        cache.reset(8, 4);
        assert!(!cache.is_look_ahead_correction_input_index(0));
        cache.advance_input_index(4);
        cache.advance_input_index(4);
        assert!(cache.is_look_ahead_correction_input_index(1));
        assert!(!cache.is_look_ahead_correction_input_index(2));
    }

    #[test]
    fn terminal_list_is_bounded() {
        let mut cache = SearchCache::new();
        cache.reset(8, 2);
        cache.push_terminal(node_with_distance(0.5, 1));
        cache.push_terminal(node_with_distance(0.3, 1));
        cache.push_terminal(node_with_distance(0.1, 1));
        assert_eq!(cache.terminal_size(), 2);
        let terminals = cache.drain_terminals_best_first();
        assert!(
            terminals[0].scoring.normalized_compound_distance()
                <= terminals[1].scoring.normalized_compound_distance()
        );
        assert_eq!(cache.terminal_size(), 0);
    }
}
