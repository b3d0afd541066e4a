use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;

use super::board::{self, CONTENT_MARGIN};
use super::flip::{self, FLIP_ALL_STAGGER_SECS};
use super::state::AppState;
use crate::animation::Timeline;

pub fn run() {
    glib::set_prgname(Some("io.github.ashdev.FlipGrid"));
    let app = adw::Application::builder()
        .application_id("io.github.ashdev.FlipGrid")
        .build();

    app.connect_activate(move |app| {
        load_css();

        let state = Rc::new(RefCell::new(AppState::new()));

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| show_about_dialog(&app)
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let brand = gtk::Label::new(None);
        brand.set_markup("Ash<b>Dev</b>");
        brand.add_css_class("brand-title");
        brand.set_halign(gtk::Align::Center);

        let header = adw::HeaderBar::builder().title_widget(&brand).build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let flip_button = gtk::Button::with_label("Flip Tiles");
        flip_button.add_css_class("flip-toggle");
        flip_button.add_css_class("suggested-action");
        let flip_handler = flip_button.connect_clicked({
            let state = state.clone();
            move |_| on_flip_all(&state)
        });

        let menu_model = gio::Menu::new();
        menu_model.append(Some("About FlipGrid"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        header.pack_end(&menu_button);
        header.pack_end(&flip_button);

        let board_container = gtk::Box::new(gtk::Orientation::Vertical, 0);
        board_container.set_hexpand(true);
        board_container.set_vexpand(true);
        board_container.set_margin_top(CONTENT_MARGIN);
        board_container.set_margin_bottom(CONTENT_MARGIN);
        board_container.set_margin_start(CONTENT_MARGIN);
        board_container.set_margin_end(CONTENT_MARGIN);

        let grid = board::build_board_grid(&state);
        let grid_ratio = flip::COLS as f32 / flip::ROWS as f32;
        let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
        grid_frame.set_halign(gtk::Align::Fill);
        grid_frame.set_valign(gtk::Align::Fill);
        grid_frame.set_hexpand(true);
        grid_frame.set_vexpand(true);
        grid_frame.set_child(Some(&grid));
        board_container.append(&grid_frame);

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&board_container));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("FlipGrid")
            .default_width(760)
            .default_height(820)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 420);
        win.add_css_class("app-window");

        let style_manager = adw::StyleManager::default();
        if style_manager.is_dark() {
            win.add_css_class("theme-dark");
        } else {
            win.add_css_class("theme-light");
        }
        style_manager.connect_notify_local(Some("dark"), {
            let win = win.clone();
            move |manager, _| {
                if manager.is_dark() {
                    win.remove_css_class("theme-light");
                    win.add_css_class("theme-dark");
                } else {
                    win.remove_css_class("theme-dark");
                    win.add_css_class("theme-light");
                }
            }
        });

        {
            let mut st = state.borrow_mut();
            st.flip_button = Some(flip_button.clone());
            st.flip_handler = Some(flip_handler);
        }

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                detach_interactions(&state);
                gtk::glib::Propagation::Proceed
            }
        });

        win.present();
    });

    app.run();
}

/// Toggles the board orientation and flips every tile to match. The flag is
/// committed before any animation starts, so a hover firing mid-wave already
/// sees the new orientation.
fn on_flip_all(state: &Rc<RefCell<AppState>>) {
    let timelines: Vec<(usize, Timeline)> = {
        let mut st = state.borrow_mut();
        if st.interactions_detached {
            return;
        }
        let new_flipped = !st.is_flipped;
        st.is_flipped = new_flipped;

        let mut rng = rand::rng();
        let delays = flip::stagger_delays(st.tiles.len(), FLIP_ALL_STAGGER_SECS, &mut rng);
        st.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                let timeline =
                    flip::flip_all_timeline(new_flipped, tile.rotate_x, tile.rotate_y, delays[index]);
                (index, timeline)
            })
            .collect()
    };

    for (index, timeline) in timelines {
        board::start_tile_animation(state, index, timeline);
    }
}

/// Removes every hover controller and the flip-button handler and drops live
/// timelines. Events delivered after this point trigger nothing.
fn detach_interactions(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    if st.interactions_detached {
        return;
    }
    st.interactions_detached = true;

    for (area, controller) in st.hover_controllers.drain(..) {
        area.remove_controller(&controller);
    }
    if let Some(handler) = st.flip_handler.take()
        && let Some(button) = &st.flip_button
    {
        button.disconnect(handler);
    }
    for tile in &mut st.tiles {
        tile.timeline = None;
    }
}

fn show_about_dialog(app: &adw::Application) {
    let dialog = adw::AboutDialog::builder()
        .application_name("FlipGrid")
        .developer_name("AshDev")
        .version("1.0.0")
        .comments("A board of flip tiles with hover flips and a staggered full-board flip.")
        .build();
    dialog.present(app.active_window().as_ref());
}

fn load_css() {
    static RESOURCES_INIT: Once = Once::new();
    RESOURCES_INIT.call_once(|| {
        gio::resources_register_include!("flipgrid.gresource")
            .expect("failed to register embedded resources");
    });

    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };

    let provider = gtk::CssProvider::new();
    provider.load_from_resource("/io/github/ashdev/FlipGrid/style.css");
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
