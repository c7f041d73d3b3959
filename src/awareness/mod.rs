mod clock;
/// Awareness - remote participants' carets
///
/// Unlike document operations, cursor positions are ephemeral:
/// - No persistence (lives for the bridge's session)
/// - Stamped by a simple increasing clock; delivery order is the engine's
/// - Separate broadcast channel (doesn't mix with text operations)
/// - Positions are live markers that move with the text under them
mod overlay;

pub use clock::IncreasingClock;
pub use overlay::{CursorOverlay, CursorUpdate, OverlayPainter};
