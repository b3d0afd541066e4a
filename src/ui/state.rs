use gtk4 as gtk;

use super::flip::{HoverGate, TILE_COUNT};
use crate::animation::Timeline;

/// Live presentation state of one tile: the rotation the draw function reads
/// and, while an animation runs, the timeline driving it.
#[derive(Clone, Debug, Default)]
pub struct TileMotion {
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub timeline: Option<Timeline>,
    /// Frame-clock timestamp of the first animation frame, in microseconds.
    pub started_at_us: Option<i64>,
    /// Identifies the animation a tick callback belongs to; a newer animation
    /// on the same tile retires the older callback.
    pub anim_id: u64,
}

pub struct AppState {
    // Whether the board's resting orientation is the back face. Written only
    // by the flip-all action, read by every hover handler at event time.
    pub is_flipped: bool,

    pub tiles: Vec<TileMotion>,
    pub hover_gates: Vec<HoverGate>,

    pub tile_areas: Vec<gtk::DrawingArea>,
    pub hover_controllers: Vec<(gtk::DrawingArea, gtk::EventControllerMotion)>,
    pub flip_button: Option<gtk::Button>,
    pub flip_handler: Option<glib::SignalHandlerId>,
    pub interactions_detached: bool,

    anim_counter: u64,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            is_flipped: false,
            tiles: Vec::new(),
            hover_gates: Vec::new(),
            tile_areas: Vec::new(),
            hover_controllers: Vec::new(),
            flip_button: None,
            flip_handler: None,
            interactions_detached: false,
            anim_counter: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        let mut st = Self::default();
        st.tiles = (0..TILE_COUNT).map(|_| TileMotion::default()).collect();
        st.hover_gates = (0..TILE_COUNT).map(|_| HoverGate::default()).collect();
        st
    }

    pub fn next_anim_id(&mut self) -> u64 {
        self.anim_counter += 1;
        self.anim_counter
    }
}
