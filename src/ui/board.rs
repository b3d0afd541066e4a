use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;
use std::time::Instant;

use gtk4 as gtk;
use gtk4::prelude::*;

use super::flip::{self, COLS, ROWS};
use super::state::{AppState, TileMotion};
use crate::animation::{Channel, Timeline};

pub const CONTENT_MARGIN: i32 = 12;
pub const TILE_GAP: i32 = 6;

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("flip-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let mut areas = Vec::new();
    let mut controllers = Vec::new();

    for index in 0..flip::TILE_COUNT {
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        area.add_css_class("flip-tile");

        let state_draw = state.clone();
        area.set_draw_func(move |_, cr, width, height| {
            let st = state_draw.borrow();
            let Some(tile) = st.tiles.get(index) else {
                return;
            };
            let _ = draw_tile(cr, tile, index, width, height);
        });

        let motion = gtk::EventControllerMotion::new();
        let state_hover = state.clone();
        motion.connect_enter(move |_, _, _| {
            on_tile_hover(&state_hover, index);
        });
        area.add_controller(motion.clone());

        aspect_frame.set_child(Some(&area));

        let col = (index % COLS) as i32;
        let row = (index / COLS) as i32;
        grid.attach(&aspect_frame, col, row, 1, 1);

        controllers.push((area.clone(), motion));
        areas.push(area);
    }

    let mut st = state.borrow_mut();
    st.tile_areas = areas;
    st.hover_controllers = controllers;

    grid
}

fn on_tile_hover(state: &Rc<RefCell<AppState>>, index: usize) {
    let timeline = {
        let mut st = state.borrow_mut();
        if st.interactions_detached {
            return;
        }
        let flipped = st.is_flipped;
        let Some(gate) = st.hover_gates.get_mut(index) else {
            return;
        };
        if !gate.accept(Instant::now()) {
            return;
        }
        flip::hover_timeline(flipped, flip::tilt_for_index(index))
    };
    start_tile_animation(state, index, timeline);
}

/// Hands a timeline to a tile and drives it from the frame clock. Replaces
/// any animation already running on that tile; the stale tick callback sees
/// the newer anim id and retires itself.
pub(super) fn start_tile_animation(
    state: &Rc<RefCell<AppState>>,
    index: usize,
    timeline: Timeline,
) {
    let (area, anim_id) = {
        let mut st = state.borrow_mut();
        let Some(area) = st.tile_areas.get(index).cloned() else {
            return;
        };
        let anim_id = st.next_anim_id();
        let Some(tile) = st.tiles.get_mut(index) else {
            return;
        };
        tile.timeline = Some(timeline);
        tile.started_at_us = None;
        tile.anim_id = anim_id;
        (area, anim_id)
    };

    let state_tick = state.clone();
    area.add_tick_callback(move |area, clock| {
        let mut st = state_tick.borrow_mut();
        let Some(tile) = st.tiles.get_mut(index) else {
            return glib::ControlFlow::Break;
        };
        if tile.anim_id != anim_id {
            return glib::ControlFlow::Break;
        }
        let Some(timeline) = tile.timeline.as_mut() else {
            return glib::ControlFlow::Break;
        };

        let now_us = clock.frame_time();
        let started_us = *tile.started_at_us.get_or_insert(now_us);
        let elapsed = (now_us - started_us) as f64 / 1_000_000.0;

        timeline.advance(elapsed);
        tile.rotate_x = timeline.value(Channel::RotateX);
        tile.rotate_y = timeline.value(Channel::RotateY);
        let finished = timeline.is_finished(elapsed);
        if finished {
            tile.timeline = None;
        }
        drop(st);

        area.queue_draw();
        if finished {
            glib::ControlFlow::Break
        } else {
            glib::ControlFlow::Continue
        }
    });
}

fn draw_tile(
    cr: &gtk::cairo::Context,
    tile: &TileMotion,
    index: usize,
    width: i32,
    height: i32,
) -> Result<(), gtk::cairo::Error> {
    let w = width as f64;
    let h = height as f64;
    if w <= 0.0 || h <= 0.0 {
        return Ok(());
    }

    let fold_v = tile.rotate_x.to_radians().cos();
    let fold_h = tile.rotate_y.to_radians().cos();
    // Never collapse to a zero-width sliver; it flickers at the midpoint.
    let squash_v = fold_v.abs().max(0.004);
    let squash_h = fold_h.abs().max(0.004);
    let front_facing = fold_v * fold_h >= 0.0;

    cr.save()?;
    cr.set_antialias(gtk::cairo::Antialias::Best);
    cr.translate(w / 2.0, h / 2.0);
    cr.scale(squash_h, squash_v);
    cr.translate(-w / 2.0, -h / 2.0);

    let radius = w.min(h) * 0.15;
    rounded_rect(cr, 0.0, 0.0, w, h, radius);
    cr.clip();

    // Each face shows its slice of a board-sized gradient, positioned by the
    // tile's percentage offset, so the 36 faces assemble one image.
    let (offset_x_pct, offset_y_pct) = flip::face_background_offset(index / COLS, index % COLS);
    let origin_x = -(offset_x_pct / 100.0) * (COLS as f64 - 1.0) * w;
    let origin_y = -(offset_y_pct / 100.0) * (ROWS as f64 - 1.0) * h;

    let gradient = face_gradient(front_facing, origin_x, origin_y, w, h);
    cr.set_source(&gradient)?;
    cr.paint()?;

    // darken as the face folds away from the viewer
    let shade = (1.0 - squash_v.min(squash_h)) * 0.55;
    if shade > 0.0 {
        cr.set_source_rgba(0.0, 0.0, 0.0, shade);
        cr.paint()?;
    }

    cr.restore()?;
    Ok(())
}

fn face_gradient(
    front: bool,
    origin_x: f64,
    origin_y: f64,
    w: f64,
    h: f64,
) -> gtk::cairo::LinearGradient {
    let gradient = gtk::cairo::LinearGradient::new(
        origin_x,
        origin_y,
        origin_x + COLS as f64 * w,
        origin_y + ROWS as f64 * h,
    );
    if front {
        gradient.add_color_stop_rgb(0.0, 0.98, 0.58, 0.23);
        gradient.add_color_stop_rgb(0.5, 0.91, 0.30, 0.44);
        gradient.add_color_stop_rgb(1.0, 0.56, 0.21, 0.68);
    } else {
        gradient.add_color_stop_rgb(0.0, 0.16, 0.71, 0.85);
        gradient.add_color_stop_rgb(0.5, 0.20, 0.42, 0.89);
        gradient.add_color_stop_rgb(1.0, 0.10, 0.18, 0.45);
    }
    gradient
}

fn rounded_rect(cr: &gtk::cairo::Context, x: f64, y: f64, w: f64, h: f64, radius: f64) {
    let r = radius.min(w / 2.0).min(h / 2.0);
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -FRAC_PI_2, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, FRAC_PI_2);
    cr.arc(x + r, y + h - r, r, FRAC_PI_2, PI);
    cr.arc(x + r, y + r, r, PI, PI + FRAC_PI_2);
    cr.close_path();
}
