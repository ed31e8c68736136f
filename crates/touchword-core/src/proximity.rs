//! Keyboard geometry and per-touch-point proximity tables.
//!
//! `ProximityState` is built once per pointer at the start of a search: for
//! every touch point it precomputes the ordered near-key list (nearest key
//! first) and the normalized spatial cost to each key. The search core only
//! ever reads from it.

use crate::settings::settings;

/// A single key on the layout. Coordinates are in key-width units; `x`/`y`
/// is the key center.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    pub code_point: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Static key geometry for one keyboard layout.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: Vec<Key>,
    most_common_key_width: f32,
}

impl KeyboardLayout {
    pub fn new(keys: Vec<Key>, most_common_key_width: f32) -> Self {
        Self {
            keys,
            most_common_key_width,
        }
    }

    /// US QWERTY letters plus apostrophe and space bar, unit key size.
    pub fn qwerty() -> Self {
        let mut keys = Vec::with_capacity(28);
        let rows: [(&str, f32, f32); 3] = [
            ("qwertyuiop", 0.5, 0.5),
            ("asdfghjkl", 0.9, 1.5),
            ("zxcvbnm", 1.4, 2.5),
        ];
        for (letters, x0, y) in rows {
            for (i, c) in letters.chars().enumerate() {
                keys.push(Key {
                    code_point: c,
                    x: x0 + i as f32,
                    y,
                    width: 1.0,
                    height: 1.0,
                });
            }
        }
        keys.push(Key {
            code_point: '\'',
            x: 9.1,
            y: 1.5,
            width: 1.0,
            height: 1.0,
        });
        keys.push(Key {
            code_point: ' ',
            x: 5.0,
            y: 3.5,
            width: 6.0,
            height: 1.0,
        });
        Self::new(keys, 1.0)
    }

    pub fn key_for(&self, code_point: char) -> Option<&Key> {
        self.keys.iter().find(|k| k.code_point == code_point)
    }

    /// Distance from a point to a key in key-width units. Wide keys (space
    /// bar) measure to the nearest point of the key rectangle, regular keys
    /// to the center.
    fn normalized_distance(&self, key: &Key, x: f32, y: f32) -> f32 {
        let (dx, dy) = if key.width > 1.5 * self.most_common_key_width {
            let half_w = key.width / 2.0;
            let half_h = key.height / 2.0;
            (
                (x - key.x).abs().max(half_w) - half_w,
                (y - key.y).abs().max(half_h) - half_h,
            )
        } else {
            (x - key.x, y - key.y)
        };
        (dx * dx + dy * dy).sqrt() / self.most_common_key_width
    }

    fn keys(&self) -> &[Key] {
        &self.keys
    }
}

/// How a lexicon code point relates to a touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityType {
    MatchChar,
    ProximityChar,
    AdditionalProximityChar,
    SubstitutionChar,
    UnrelatedChar,
}

/// Strength of the hint that the user intentionally repeated a letter.
/// Ordered so that transitions toward `Strong` are monotone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DoubleLetterLevel {
    #[default]
    None,
    Weak,
    Strong,
}

#[derive(Debug, Clone, Copy)]
struct NearKey {
    code_point: char,
    distance: f32,
}

#[derive(Debug, Clone, Copy)]
struct TouchPoint {
    x: f32,
    y: f32,
    time: i32,
}

/// Per-pointer view of the touch trace over one keyboard layout.
pub struct ProximityState {
    layout: KeyboardLayout,
    points: Vec<TouchPoint>,
    typed: Vec<char>,
    near: Vec<Vec<NearKey>>,
}

impl ProximityState {
    /// Build the state for one pointer. A negative x/y means "no geometry
    /// for this point": the touch is synthesized at the typed key's center.
    pub fn new(
        layout: &KeyboardLayout,
        xs: &[i32],
        ys: &[i32],
        times: &[i32],
        pointer_ids: &[i32],
        code_points: &[char],
        pointer_id: i32,
    ) -> Self {
        let s = settings();
        let mut points = Vec::new();
        let mut typed = Vec::new();
        for i in 0..code_points.len() {
            if pointer_ids.get(i).copied().unwrap_or(0) != pointer_id {
                continue;
            }
            let (x, y) = match (xs.get(i), ys.get(i)) {
                (Some(&x), Some(&y)) if x >= 0 && y >= 0 => (x as f32, y as f32),
                _ => layout
                    .key_for(code_points[i])
                    .map(|k| (k.x, k.y))
                    .unwrap_or((-1.0, -1.0)),
            };
            points.push(TouchPoint {
                x,
                y,
                time: times.get(i).copied().unwrap_or(0),
            });
            typed.push(code_points[i]);
        }

        let near = points
            .iter()
            .map(|p| {
                if p.x < 0.0 {
                    return Vec::new();
                }
                let mut list: Vec<NearKey> = layout
                    .keys()
                    .iter()
                    .map(|k| NearKey {
                        code_point: k.code_point,
                        distance: layout.normalized_distance(k, p.x, p.y),
                    })
                    .filter(|nk| nk.distance <= s.proximity.additional_proximity_radius)
                    .collect();
                list.sort_by(|a, b| {
                    a.distance
                        .total_cmp(&b.distance)
                        .then(a.code_point.cmp(&b.code_point))
                });
                list
            })
            .collect();

        Self {
            layout: layout.clone(),
            points,
            typed,
            near,
        }
    }

    pub fn is_used(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn input_size(&self) -> usize {
        self.points.len()
    }

    pub fn typed_code_points(&self) -> &[char] {
        &self.typed
    }

    /// Keys near the touch at `index`, nearest first, with their normalized
    /// distances.
    pub fn near_keys(&self, index: usize) -> impl Iterator<Item = (char, f32)> + '_ {
        self.near
            .get(index)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|nk| (nk.code_point, nk.distance))
    }

    /// The nearest key at `index`, falling back to the typed code point when
    /// the touch had no usable geometry.
    pub fn primary_code_point(&self, index: usize) -> Option<char> {
        self.near
            .get(index)?
            .first()
            .map(|nk| nk.code_point)
            .or_else(|| self.typed.get(index).copied())
    }

    /// Normalized spatial cost of aligning the touch at `index` to the key
    /// for `code_point`. Capped at the traversal's max spatial distance.
    pub fn spatial_cost(&self, index: usize, code_point: char) -> f32 {
        let s = settings();
        let max = s.traversal.max_spatial_distance;
        let Some(point) = self.points.get(index) else {
            return max;
        };
        if point.x < 0.0 {
            // No geometry: exact typed char is free, everything else maxes out.
            return if self.typed.get(index) == Some(&code_point) {
                0.0
            } else {
                max
            };
        }
        match self.layout.key_for(code_point) {
            Some(key) => self
                .layout
                .normalized_distance(key, point.x, point.y)
                .min(max),
            None => max,
        }
    }

    /// Classify a lexicon code point against the touch at `index`.
    pub fn classify(&self, index: usize, code_point: char) -> ProximityType {
        let s = settings();
        let Some(near) = self.near.get(index) else {
            return ProximityType::UnrelatedChar;
        };
        if near.is_empty() {
            // Geometry-free input: the typed character is the match, any
            // other key on the layout is a plain substitution.
            return if self.typed.get(index) == Some(&code_point) {
                ProximityType::MatchChar
            } else if self.layout.key_for(code_point).is_some() {
                ProximityType::SubstitutionChar
            } else {
                ProximityType::UnrelatedChar
            };
        }
        if near[0].code_point == code_point {
            return ProximityType::MatchChar;
        }
        match near.iter().find(|nk| nk.code_point == code_point) {
            Some(nk) if nk.distance <= s.proximity.proximity_radius => {
                ProximityType::ProximityChar
            }
            Some(_) => ProximityType::AdditionalProximityChar,
            None if self.layout.key_for(code_point).is_some() => {
                ProximityType::SubstitutionChar
            }
            None => ProximityType::UnrelatedChar,
        }
    }

    /// True when the space bar is close enough to the touch at `index` that
    /// the touch may have been a missed space.
    pub fn has_space_proximity(&self, index: usize) -> bool {
        let s = settings();
        self.near
            .get(index)
            .map(|near| {
                near.iter()
                    .any(|nk| nk.code_point == ' ' && nk.distance <= s.proximity.proximity_radius)
            })
            .unwrap_or(false)
    }

    /// Double-letter hint for the touch at `index`: set when it repeats the
    /// previous touch's key, `Strong` when the dwell indicates a held key.
    pub fn double_letter_hint(&self, index: usize) -> DoubleLetterLevel {
        if index == 0 || index >= self.points.len() {
            return DoubleLetterLevel::None;
        }
        let (prev, cur) = (
            self.primary_code_point(index - 1),
            self.primary_code_point(index),
        );
        if prev.is_none() || prev != cur {
            return DoubleLetterLevel::None;
        }
        let dwell = self.points[index].time - self.points[index - 1].time;
        if dwell >= settings().proximity.double_letter_strong_hold_ms {
            DoubleLetterLevel::Strong
        } else {
            DoubleLetterLevel::Weak
        }
    }
}
