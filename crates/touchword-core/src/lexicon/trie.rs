use std::collections::{BTreeMap, HashMap, VecDeque};

use memmap2::Mmap;

use super::{ChildEdge, Lexicon, ShortcutTarget, WordAttributes};

pub(super) const MAGIC: &[u8; 4] = b"TWLX";
pub(super) const VERSION: u8 = 1;
// magic(4) + version(1) + reserved(3) + nodes_len(4) + attrs_len(4) = 16
pub(super) const HEADER_SIZE: usize = 16;

/// Node record: code_point(4) + flags(1) + probability(1) + child_count(2)
/// + children_offset(4) + attributes_offset(4).
pub(super) const NODE_SIZE: usize = 16;

pub(super) const NO_ATTRIBUTES: u32 = u32::MAX;

const FLAG_TERMINAL: u8 = 0x01;
const FLAG_HAS_CHILDREN: u8 = 0x02;
const FLAG_BLACKLISTED: u8 = 0x04;
const FLAG_NOT_A_WORD: u8 = 0x08;

/// Backing storage for the two byte regions: either owned or memory-mapped.
#[derive(Debug)]
pub(super) enum LexStore {
    Owned {
        nodes: Vec<u8>,
        attrs: Vec<u8>,
    },
    Mapped {
        mmap: Mmap,
        nodes_len: usize,
        attrs_len: usize,
    },
}

impl LexStore {
    pub(super) fn nodes(&self) -> &[u8] {
        match self {
            LexStore::Owned { nodes, .. } => nodes,
            LexStore::Mapped {
                mmap, nodes_len, ..
            } => &mmap[HEADER_SIZE..HEADER_SIZE + nodes_len],
        }
    }

    pub(super) fn attrs(&self) -> &[u8] {
        match self {
            LexStore::Owned { attrs, .. } => attrs,
            LexStore::Mapped {
                mmap,
                nodes_len,
                attrs_len,
            } => &mmap[HEADER_SIZE + nodes_len..HEADER_SIZE + nodes_len + attrs_len],
        }
    }
}

/// Lexicon trie over a flat byte region. Node positions are byte offsets of
/// fixed-size records; each node's children are stored contiguously.
#[derive(Debug)]
pub struct TrieLexicon {
    pub(super) store: LexStore,
}

fn read_u16(data: &[u8], off: usize) -> Option<u16> {
    data.get(off..off + 2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], off: usize) -> Option<u32> {
    data.get(off..off + 4)
        .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
}

/// Decoded node record fields.
struct NodeRecord {
    code_point: u32,
    flags: u8,
    probability: u8,
    child_count: u16,
    children_offset: u32,
    attributes_offset: u32,
}

impl TrieLexicon {
    fn record_at(&self, pos: u32) -> Option<NodeRecord> {
        let nodes = self.store.nodes();
        let off = pos as usize;
        if off + NODE_SIZE > nodes.len() {
            return None;
        }
        Some(NodeRecord {
            code_point: read_u32(nodes, off)?,
            flags: nodes[off + 4],
            probability: nodes[off + 5],
            child_count: read_u16(nodes, off + 6)?,
            children_offset: read_u32(nodes, off + 8)?,
            attributes_offset: read_u32(nodes, off + 12)?,
        })
    }

    /// Word count (terminal records) and total node count.
    pub fn stats(&self) -> (usize, usize) {
        let nodes = self.store.nodes();
        let total = nodes.len() / NODE_SIZE;
        let words = (0..total)
            .filter(|i| nodes[i * NODE_SIZE + 4] & FLAG_TERMINAL != 0)
            .count();
        (words, total)
    }

    /// Resolve a word to its terminal node position, if present.
    pub fn position_of(&self, word: &str) -> Option<u32> {
        let mut pos = self.root_position();
        let mut children = Vec::new();
        for c in word.chars() {
            children.clear();
            self.collect_children(pos, &mut children);
            pos = children.iter().find(|e| e.code_point == c)?.position;
        }
        let rec = self.record_at(pos)?;
        (rec.flags & FLAG_TERMINAL != 0).then_some(pos)
    }
}

impl Lexicon for TrieLexicon {
    fn root_position(&self) -> u32 {
        0
    }

    fn collect_children(&self, pos: u32, out: &mut Vec<ChildEdge>) {
        let Some(rec) = self.record_at(pos) else {
            return;
        };
        if rec.flags & FLAG_HAS_CHILDREN == 0 {
            return;
        }
        let nodes = self.store.nodes();
        let base = rec.children_offset as usize;
        let count = rec.child_count as usize;
        // Corrupt child block: yield nothing rather than read out of bounds.
        if base + count * NODE_SIZE > nodes.len() {
            return;
        }
        out.reserve(count);
        for i in 0..count {
            let off = base + i * NODE_SIZE;
            let Some(cp) = read_u32(nodes, off).and_then(char::from_u32) else {
                continue;
            };
            let flags = nodes[off + 4];
            out.push(ChildEdge {
                code_point: cp,
                position: off as u32,
                is_terminal: flags & FLAG_TERMINAL != 0,
                has_children: flags & FLAG_HAS_CHILDREN != 0,
                probability: nodes[off + 5],
            });
        }
    }

    fn word_probability(&self, pos: u32) -> u8 {
        match self.record_at(pos) {
            Some(rec) if rec.flags & FLAG_TERMINAL != 0 => rec.probability,
            _ => 0,
        }
    }

    fn bigram_probability(&self, prev_word_pos: u32, word_pos: u32) -> Option<u8> {
        let rec = self.record_at(prev_word_pos)?;
        if rec.attributes_offset == NO_ATTRIBUTES {
            return None;
        }
        let attrs = self.store.attrs();
        let mut off = rec.attributes_offset as usize;
        let count = read_u16(attrs, off)? as usize;
        off += 2;
        for _ in 0..count {
            let target = read_u32(attrs, off)?;
            let prob = *attrs.get(off + 4)?;
            if target == word_pos {
                return Some(prob);
            }
            off += 5;
        }
        None
    }

    fn attributes_at(&self, pos: u32) -> WordAttributes {
        let Some(rec) = self.record_at(pos) else {
            return WordAttributes::default();
        };
        let mut result = WordAttributes {
            blacklisted: rec.flags & FLAG_BLACKLISTED != 0,
            not_a_word: rec.flags & FLAG_NOT_A_WORD != 0,
            shortcuts: Vec::new(),
        };
        if rec.attributes_offset == NO_ATTRIBUTES {
            return result;
        }
        let attrs = self.store.attrs();
        let mut off = rec.attributes_offset as usize;

        // Skip the bigram list.
        let Some(bigram_count) = read_u16(attrs, off) else {
            return result;
        };
        off += 2 + bigram_count as usize * 5;

        let Some(shortcut_count) = read_u16(attrs, off) else {
            return result;
        };
        off += 2;
        for _ in 0..shortcut_count {
            let Some(&prob) = attrs.get(off) else {
                return result;
            };
            let Some(&len) = attrs.get(off + 1) else {
                return result;
            };
            off += 2;
            let mut text = String::with_capacity(len as usize);
            for _ in 0..len {
                let Some(cp) = read_u32(attrs, off).and_then(char::from_u32) else {
                    return result;
                };
                text.push(cp);
                off += 4;
            }
            result.shortcuts.push(ShortcutTarget {
                text,
                probability: prob,
            });
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct BuildNode {
    code_point: char,
    children: BTreeMap<char, usize>,
    terminal: bool,
    probability: u8,
    blacklisted: bool,
    not_a_word: bool,
    shortcuts: Vec<(String, u8)>,
}

impl Default for BuildNode {
    fn default() -> Self {
        Self {
            code_point: '\0',
            children: BTreeMap::new(),
            terminal: false,
            probability: 0,
            blacklisted: false,
            not_a_word: false,
            shortcuts: Vec::new(),
        }
    }
}

/// In-memory lexicon builder. Words, bigrams, and shortcuts accumulate, then
/// `build()` lays the trie out breadth-first so each node's children form one
/// contiguous block.
pub struct LexiconBuilder {
    arena: Vec<BuildNode>,
    bigrams: Vec<(String, String, u8)>,
}

impl Default for LexiconBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconBuilder {
    pub fn new() -> Self {
        Self {
            arena: vec![BuildNode::default()],
            bigrams: Vec::new(),
        }
    }

    fn node_for(&mut self, word: &str) -> usize {
        let mut idx = 0;
        for c in word.chars() {
            idx = match self.arena[idx].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.arena.len();
                    self.arena.push(BuildNode {
                        code_point: c,
                        ..Default::default()
                    });
                    self.arena[idx].children.insert(c, child);
                    child
                }
            };
        }
        idx
    }

    pub fn add_word(&mut self, word: &str, probability: u8) -> &mut Self {
        let idx = self.node_for(word);
        self.arena[idx].terminal = true;
        self.arena[idx].probability = probability;
        self
    }

    pub fn add_bigram(&mut self, prev: &str, word: &str, probability: u8) -> &mut Self {
        self.bigrams
            .push((prev.to_string(), word.to_string(), probability));
        self
    }

    pub fn add_shortcut(&mut self, word: &str, target: &str, probability: u8) -> &mut Self {
        let idx = self.node_for(word);
        self.arena[idx].shortcuts.push((target.to_string(), probability));
        self
    }

    pub fn mark_blacklisted(&mut self, word: &str) -> &mut Self {
        let idx = self.node_for(word);
        self.arena[idx].blacklisted = true;
        self
    }

    pub fn mark_not_a_word(&mut self, word: &str) -> &mut Self {
        let idx = self.node_for(word);
        self.arena[idx].not_a_word = true;
        self
    }

    fn terminal_offset_of(&self, word: &str, offsets: &[u32]) -> Option<u32> {
        let mut idx = 0;
        for c in word.chars() {
            idx = *self.arena[idx].children.get(&c)?;
        }
        self.arena[idx].terminal.then(|| offsets[idx])
    }

    pub fn build(&self) -> TrieLexicon {
        // Breadth-first offset assignment: the root record sits at 0, every
        // child block is contiguous.
        let mut offsets = vec![0u32; self.arena.len()];
        let mut order: Vec<usize> = Vec::with_capacity(self.arena.len());
        let mut next_free = NODE_SIZE as u32;
        let mut queue = VecDeque::from([0usize]);
        order.push(0);
        while let Some(idx) = queue.pop_front() {
            for &child in self.arena[idx].children.values() {
                offsets[child] = next_free;
                next_free += NODE_SIZE as u32;
                order.push(child);
                queue.push_back(child);
            }
        }

        // Bigram lists grouped by source node, targets resolved to offsets.
        let mut bigrams_by_node: HashMap<usize, Vec<(u32, u8)>> = HashMap::new();
        for (prev, word, prob) in &self.bigrams {
            let (Some(prev_idx), Some(target)) = (
                self.index_of(prev),
                self.terminal_offset_of(word, &offsets),
            ) else {
                continue;
            };
            bigrams_by_node.entry(prev_idx).or_default().push((target, *prob));
        }

        // Attribute region: one block per terminal that needs one.
        let mut attrs = Vec::new();
        let mut attr_offsets = vec![NO_ATTRIBUTES; self.arena.len()];
        for &idx in &order {
            let node = &self.arena[idx];
            let bigrams = bigrams_by_node.get(&idx);
            if !node.terminal || (bigrams.is_none() && node.shortcuts.is_empty()) {
                continue;
            }
            attr_offsets[idx] = attrs.len() as u32;
            let bigrams = bigrams.map(|v| v.as_slice()).unwrap_or(&[]);
            attrs.extend_from_slice(&(bigrams.len() as u16).to_ne_bytes());
            for &(target, prob) in bigrams {
                attrs.extend_from_slice(&target.to_ne_bytes());
                attrs.push(prob);
            }
            attrs.extend_from_slice(&(node.shortcuts.len() as u16).to_ne_bytes());
            for (text, prob) in &node.shortcuts {
                attrs.push(*prob);
                attrs.push(text.chars().count().min(u8::MAX as usize) as u8);
                for c in text.chars().take(u8::MAX as usize) {
                    attrs.extend_from_slice(&(c as u32).to_ne_bytes());
                }
            }
        }

        // Node region, records written at their assigned offsets.
        let mut nodes = vec![0u8; next_free as usize];
        for &idx in &order {
            let node = &self.arena[idx];
            let off = offsets[idx] as usize;
            let mut flags = 0u8;
            if node.terminal {
                flags |= FLAG_TERMINAL;
            }
            if !node.children.is_empty() {
                flags |= FLAG_HAS_CHILDREN;
            }
            if node.blacklisted {
                flags |= FLAG_BLACKLISTED;
            }
            if node.not_a_word {
                flags |= FLAG_NOT_A_WORD;
            }
            let children_offset = node
                .children
                .values()
                .next()
                .map(|&c| offsets[c])
                .unwrap_or(0);
            nodes[off..off + 4].copy_from_slice(&(node.code_point as u32).to_ne_bytes());
            nodes[off + 4] = flags;
            nodes[off + 5] = node.probability;
            nodes[off + 6..off + 8]
                .copy_from_slice(&(node.children.len() as u16).to_ne_bytes());
            nodes[off + 8..off + 12].copy_from_slice(&children_offset.to_ne_bytes());
            nodes[off + 12..off + 16].copy_from_slice(&attr_offsets[idx].to_ne_bytes());
        }

        TrieLexicon {
            store: LexStore::Owned { nodes, attrs },
        }
    }

    fn index_of(&self, word: &str) -> Option<usize> {
        let mut idx = 0;
        for c in word.chars() {
            idx = *self.arena[idx].children.get(&c)?;
        }
        Some(idx)
    }
}
