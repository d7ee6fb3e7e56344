use crate::settings::Settings;

/// Display geometry of the target screen.
#[derive(Debug, Clone, Copy)]
pub struct Display {
    pub dims: (u32, u32),
}

/// Shared application state threaded through event handling.
///
/// Kept deliberately small: the view controllers need the display geometry
/// for layout decisions and the settings for policy flags, nothing else.
pub struct Context {
    pub display: Display,
    pub settings: Settings,
}

impl Context {
    pub fn new(display: Display, settings: Settings) -> Context {
        Context { display, settings }
    }
}
