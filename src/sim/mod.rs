pub mod anim;
pub mod event;
pub mod history;
pub mod level;
pub mod puzzle;
pub mod sequencer;
pub mod step;
pub mod world;
