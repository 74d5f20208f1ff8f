// Body-language pipeline: pose landmarks per frame, rolling-window scoring,
// and the live video socket. Landmark detection itself is external.

pub mod detector;
pub mod landmarks;
pub mod tracker;
pub mod ws;
