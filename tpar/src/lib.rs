#[macro_use]
extern crate failure;

extern crate enum_map;

#[macro_use]
extern crate itertools;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

extern crate pest;

#[macro_use]
extern crate pest_derive;

extern crate serde;

#[macro_use]
extern crate serde_derive;

use std::result;

pub use failure::Error;

pub type Result<T> = result::Result<T, Error>;

pub mod batch;

pub mod driver;

pub mod features;

pub mod lexicon;

pub mod sentence;

pub mod system;

pub mod systems;

pub mod task;
