mod animation;
mod ui;

fn main() {
    ui::app::run();
}
