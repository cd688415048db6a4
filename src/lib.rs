mod date;
mod dump;
mod duckdb_impl;
mod error;
mod interpreter;
mod log;
mod moves;
mod path;
mod reader;
mod scanner;
mod serialize;
mod tree;
mod types;

use duckdb::{Connection, Result};
use duckdb_ext_macros::duckdb_extension;
use dump::SgfTreeScalar;
use moves::{SgfMovesJsonScalar, SgfNormalizeScalar};
use reader::ReadSgfVTab;
use std::error::Error;

pub use dump::render_collection;
pub use error::{ErrorAccumulator, ErrorKind, SgfError};
pub use interpreter::{RecordCheck, check_record, interpret, parse_sgf};
pub use path::select_path;
pub use scanner::find_first;
pub use serialize::to_sgf;
pub use tree::{
    GameNode, GameTree, Property, PropertyValues, TreeCollection, TreeId, consume_node,
    parse_to_collection,
};
pub use types::{Color, GameRecord, GoCoord, GoMove, GoPos, UnparsedProperty};

#[duckdb_extension(name = "duckdb_sgf", api_version = "v1.0.0")]
pub unsafe fn extension_entrypoint(con: Connection) -> Result<(), Box<dyn Error>> {
    // Table functions
    con.register_table_function::<ReadSgfVTab>("read_sgf")?;

    // Scalar functions
    con.register_scalar_function::<SgfMovesJsonScalar>("sgf_moves_json")?;
    con.register_scalar_function::<SgfNormalizeScalar>("sgf_normalize")?;
    con.register_scalar_function::<SgfTreeScalar>("sgf_tree")?;

    Ok(())
}
