//! HUD composed into the window title: altitude, score, crash notice.

pub const GAME_TITLE: &str = "OpenGlide";

/// Build the window title for the current frame.
pub fn window_title(altitude: f32, score: u32, crashed: bool) -> String {
    let mut title = format!("{GAME_TITLE} | Altitude: {altitude:.2} m | Score: {score}");
    if crashed {
        title.push_str(" | CRASHED! Press R to reset");
    }
    title
}
