mod app;
mod formset;
mod logging;
mod model;
mod nav;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    logging::init()?;
    ui::run(std::env::args().nth(1))
}
