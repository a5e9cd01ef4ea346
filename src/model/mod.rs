//! The model module contains the simulation core of the two-workshop line
pub mod clock;
pub mod durations;
pub mod error;
pub mod item;
pub mod simulation;
pub mod snapshot;
pub mod time;
pub mod transfer;
pub mod workshop_one;
pub mod workshop_two;
