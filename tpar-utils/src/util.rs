use std::fmt::Display;
use std::io::Write;
use std::process;

use serde_cbor;
use tpar::driver::GroupFeatures;

use Result;

/// Unwrap a value or exit the program with an error message.
pub trait OrExit<T> {
    fn or_exit(self) -> T;
}

impl<T, E> OrExit<T> for ::std::result::Result<T, E>
where
    E: Display,
{
    fn or_exit(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                stderr!("Error: {}", err);
                process::exit(1)
            }
        }
    }
}

/// One serialized step of gold-driver output: the sparse feature groups
/// of the live states and the oracle actions that advance them.
#[derive(Serialize)]
pub struct OracleRecord<'a> {
    pub features: &'a [GroupFeatures],
    pub gold_actions: &'a [usize],
}

/// Write an oracle record as CBOR.
pub fn write_oracle_record<W>(mut write: W, record: &OracleRecord) -> Result<()>
where
    W: Write,
{
    serde_cbor::ser::to_writer(&mut write, record)?;
    Ok(())
}
