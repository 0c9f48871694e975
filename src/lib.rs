#![no_std]

extern crate alloc;

pub use error::*;
pub use image::*;
pub use puzzle::*;
pub use shape::*;
pub use state::*;
pub use turn::*;

mod error;
mod image;
mod puzzle;
mod shape;
mod state;
mod turn;
