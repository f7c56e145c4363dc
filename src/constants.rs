// Page layout and asset table for the layered animation.

// Container the layers are mounted into, and where the asset root may be overridden
pub const MAIN_ELEMENT_ID: &str = "animation-main";
pub const ASSET_ROOT_ATTRIBUTE: &str = "data-asset-root";
pub const DEFAULT_ASSET_ROOT: &str = "/tyes-animation/";

// Element ids, top to bottom
pub const KEYS_LAYER_ID: &str = "top";
pub const MIXER_LAYER_ID: &str = "middle";
pub const TREES_LAYER_ID: &str = "bottom";
pub const SLIDER_ID_SUFFIX: &str = "_slider";

// CSS classes
pub const LAYER_CLASS: &str = "layer";
pub const SLIDER_CLASS: &str = "slider";

pub const STYLESHEET: &str = "styles.css";

// Click cues
pub const AUDIO_CLICK_ON: &str = "click_on.wav";
pub const AUDIO_CLICK_OFF: &str = "click_off.wav";

// Loops
pub const AUDIO_KEYS: &str = "keys.wav";
pub const AUDIO_TREES: &str = "trees.wav";

// Image sequences: (file, is_transition)
pub const IMAGES_KEYS: [(&str, bool); 2] = [("keys_off.png", false), ("keys_on.gif", false)];
pub const IMAGES_MIXER: [(&str, bool); 4] = [
    ("mixer_off.png", false),
    ("mixer_to_on.gif", true),
    ("mixer_on.png", false),
    ("mixer_to_off.gif", true),
];
pub const IMAGES_TREES: [(&str, bool); 2] = [("trees_off.png", false), ("trees_on.gif", false)];

// Body events that count as a user gesture for resuming audio
pub const UNLOCK_EVENTS: [&str; 4] = ["touchstart", "touchend", "mousedown", "keydown"];

/// Join an asset file name onto the asset root.
pub fn asset_url(root: &str, name: &str) -> String {
    if root.is_empty() || root.ends_with('/') {
        format!("{root}{name}")
    } else {
        format!("{root}/{name}")
    }
}

#[inline]
pub fn slider_id(layer_id: &str) -> String {
    format!("{layer_id}{SLIDER_ID_SUFFIX}")
}
