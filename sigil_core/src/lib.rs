//! # sigil_core
//!
//! Gesture-reactive "magic circle" animation, independent of any window,
//! camera or audio device.
//!
//! Each frame the detector's hand list goes through [`scene::Scene::tick`]:
//!
//! | Stage | Module | Output |
//! |---|---|---|
//! | Measure | [`classifier`] | hand size, openness ratio, center |
//! | Smooth | [`smoother`] | circle size, alpha, rotation |
//! | Debounce | [`fist`] | Normal / Broken, break and recover events |
//! | Simulate | [`particles`] | fingertip sparkles, shatter shards |
//! | Draw | [`sigil`], [`backdrop`] | calls on a [`canvas::Canvas`] |
//! | Sound | [`audio`] | calls on a [`audio::SoundBank`] |
//!
//! ## Gestures
//!
//! | Gesture | Effect |
//! |---|---|
//! | Spread fingers | Circle grows and brightens |
//! | Larger (closer) hand | Circle spins faster |
//! | Fist held 50 ms | Circle shatters into 36 shards for up to 3 s |
//! | Open hand wide | Ends a shatter early |
//!
//! Time is passed in explicitly as a [`std::time::Duration`] since start and
//! randomness through an injected [`rand::Rng`], so a seeded run is fully
//! reproducible.

pub mod geometry;
pub mod hand;
pub mod config;
pub mod smoother;
pub mod classifier;
pub mod fist;
pub mod canvas;
pub mod particles;
pub mod audio;
pub mod sigil;
pub mod backdrop;
pub mod scene;

pub use config::{ParamScope, SceneConfig};
pub use geometry::{FrameMapper, Point};
pub use hand::{HandIndex, HandObservation, HandPose};
pub use scene::{FrameReport, Scene};
