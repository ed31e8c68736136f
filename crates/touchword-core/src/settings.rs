//! Global tuning settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Every numeric here is a calibration input: the search treats them as opaque
//! costs and thresholds, so alternative layouts and languages retune without
//! touching engine code.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub weighting: WeightingSettings,
    pub scoring: ScoringSettings,
    pub traversal: TraversalSettings,
    pub proximity: ProximitySettings,
}

/// Per-event correction costs, in key-width units.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightingSettings {
    pub distance_weight: f32,
    pub proximity_cost: f32,
    pub additional_proximity_cost: f32,
    pub substitution_cost: f32,
    pub omission_cost: f32,
    pub insertion_cost: f32,
    pub insertion_same_key_cost: f32,
    pub transposition_cost: f32,
    pub space_substitution_cost: f32,
    pub new_word_cost: f32,
    pub new_word_bigram_bonus: f32,
    pub unigram_cost_scale: f32,
    pub completion_cost: f32,
    pub terminal_cost: f32,
    pub max_value_for_weighting: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub score_scale: f32,
    pub autocorrect_bonus: i32,
    pub double_letter_demotion_weak: f32,
    pub double_letter_demotion_strong: f32,
    pub most_probable_threshold: f32,
    pub safety_net_score_tolerance: i32,
    pub low_confidence_language_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraversalSettings {
    pub max_cache_size: usize,
    pub max_spatial_distance: f32,
    pub error_correction_threshold: f32,
    pub max_word_count: usize,
    pub min_probability_for_next_word: u8,
    pub expand_node_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProximitySettings {
    pub proximity_radius: f32,
    pub additional_proximity_radius: f32,
    pub double_letter_strong_hold_ms: i32,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field <= 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_non_negative!(weighting.distance_weight);
    check_non_negative!(weighting.proximity_cost);
    check_non_negative!(weighting.additional_proximity_cost);
    check_non_negative!(weighting.substitution_cost);
    check_non_negative!(weighting.omission_cost);
    check_non_negative!(weighting.insertion_cost);
    check_non_negative!(weighting.insertion_same_key_cost);
    check_non_negative!(weighting.transposition_cost);
    check_non_negative!(weighting.space_substitution_cost);
    check_non_negative!(weighting.new_word_cost);
    check_non_negative!(weighting.new_word_bigram_bonus);
    check_non_negative!(weighting.unigram_cost_scale);
    check_non_negative!(weighting.completion_cost);
    check_non_negative!(weighting.terminal_cost);
    check_positive!(weighting.max_value_for_weighting);

    check_positive!(scoring.score_scale);
    check_non_negative!(scoring.double_letter_demotion_weak);
    check_non_negative!(scoring.double_letter_demotion_strong);
    check_positive!(scoring.most_probable_threshold);
    if s.scoring.safety_net_score_tolerance < 0 {
        return Err(SettingsError::InvalidValue {
            field: "scoring.safety_net_score_tolerance".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }
    check_positive!(scoring.low_confidence_language_weight);

    check_positive_usize!(traversal.max_cache_size);
    check_positive!(traversal.max_spatial_distance);
    check_positive!(traversal.error_correction_threshold);
    check_positive_usize!(traversal.max_word_count);
    check_positive_usize!(traversal.expand_node_capacity);

    check_positive!(proximity.proximity_radius);
    check_positive!(proximity.additional_proximity_radius);
    if s.proximity.additional_proximity_radius < s.proximity.proximity_radius {
        return Err(SettingsError::InvalidValue {
            field: "proximity.additional_proximity_radius".to_string(),
            reason: "must be >= proximity_radius".to_string(),
        });
    }
    if s.proximity.double_letter_strong_hold_ms < 0 {
        return Err(SettingsError::InvalidValue {
            field: "proximity.double_letter_strong_hold_ms".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }

    Ok(())
}
