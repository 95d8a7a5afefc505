//! # hand_sigil
//!
//! Draws a glowing magic circle around each tracked hand.  Spread your
//! fingers to grow it, bring the hand closer to spin it faster, hold a fist
//! for a moment to shatter it.
//!
//! ## Controls (simulation mode)
//!
//! | Input            | Effect                                   |
//! |------------------|------------------------------------------|
//! | Mouse            | Move the hand                            |
//! | Space / left btn | Clench the hand into a fist              |
//! | Wheel, Up/Down   | Spread or close the fingers              |
//! | W / S            | Bring the hand nearer / farther          |
//! | H                | Show or hide a mirrored second hand      |
//! | K                | Clench the second hand                   |
//! | Q / Esc          | Quit                                     |
//!
//! Build with `--features leap` to track real hands with a LeapMotion
//! controller instead.
//!
//! ## Modules
//!
//! | Module       | Role                                              |
//! |--------------|---------------------------------------------------|
//! | `error`      | `AppError` for window, tracker and config faults  |
//! | `raster`     | Software `Canvas` over an ARGB framebuffer        |
//! | `tracker`    | Hand sources (simulation, LeapMotion)             |
//! | `visualizer` | `minifb` window, input polling, HUD               |
//! | `app`        | CLI, `AppConfig`, frame loop                      |

pub mod error;
pub mod raster;
pub mod tracker;
pub mod visualizer;
pub mod app;
