extern crate conllx;

#[macro_use]
extern crate failure;

extern crate indicatif;

extern crate serde;

extern crate serde_cbor;

#[macro_use]
extern crate serde_derive;

extern crate toml;

extern crate tpar;

use std::result;

pub use failure::Error;

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! stderr {
    ($fmt:expr) => {
        {
            use std::io::Write;
            writeln!(::std::io::stderr(), $fmt).expect("Cannot write to standard error")
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        {
            use std::io::Write;
            writeln!(::std::io::stderr(), $fmt, $($arg)*).expect("Cannot write to standard error")
        }
    };
}

mod config;
pub use config::{Config, Corpora, Features, Lookups, Parser, TomlRead};

mod progress;
pub use progress::FileProgress;

mod source;
pub use source::ConllxSource;

mod util;
pub use util::{write_oracle_record, OracleRecord, OrExit};
