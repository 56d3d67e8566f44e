mod timer;

pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

// Render is Crux's built-in capability; it covers everything the shell needs
// to know about view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub timer: Timer<Event>,
}
