use std::error::Error;

use duckdb::vtab::arrow::WritableVector;
use duckdb::{
    Result,
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vscalar::{ScalarFunctionSignature, VScalar},
};
use serde_json::{Value, json};

use crate::duckdb_impl::scalar::{VarcharOutput, invoke_unary_varchar_to_varchar};
use crate::interpreter::parse_sgf;
use crate::serialize::to_sgf;
use crate::types::{GoMove, GoPos, UnparsedProperty};

/// `[{"ply":1,"color":"B","x":15,"y":3}, {"ply":2,"color":"W","pass":true}, ...]`
pub fn moves_to_json(moves: &[GoMove]) -> String {
    let moves: Vec<Value> = moves
        .iter()
        .enumerate()
        .map(|(idx, mv)| match mv.pos {
            Some((x, y)) => json!({ "ply": idx + 1, "color": mv.player.as_str(), "x": x, "y": y }),
            None => json!({ "ply": idx + 1, "color": mv.player.as_str(), "pass": true }),
        })
        .collect();
    Value::Array(moves).to_string()
}

/// `[[x,y], ...]`
pub fn stones_to_json(stones: &[GoPos]) -> String {
    let stones: Vec<Value> = stones.iter().map(|&(x, y)| json!([x, y])).collect();
    Value::Array(stones).to_string()
}

/// `[{"id":"GN","value":"..."}, ...]`, in input order; ids may repeat.
pub fn unparsed_to_json(unparsed: &[UnparsedProperty]) -> String {
    let entries: Vec<Value> = unparsed
        .iter()
        .map(|p| json!({ "id": p.id, "value": p.value }))
        .collect();
    Value::Array(entries).to_string()
}

fn sgf_moves_json(sgf: &str) -> Option<String> {
    parse_sgf(sgf, None, None)
        .ok()
        .map(|record| moves_to_json(&record.moves))
}

fn sgf_normalize(sgf: &str) -> Option<String> {
    parse_sgf(sgf, None, None).ok().map(|record| to_sgf(&record))
}

fn varchar_signature() -> Vec<ScalarFunctionSignature> {
    vec![ScalarFunctionSignature::exact(
        vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)],
        LogicalTypeHandle::from(LogicalTypeId::Varchar),
    )]
}

pub struct SgfMovesJsonScalar;

impl VScalar for SgfMovesJsonScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_varchar(input, output, |sgf| {
            Ok(match sgf_moves_json(sgf) {
                Some(json) => VarcharOutput::Value(json),
                None => VarcharOutput::Null,
            })
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        varchar_signature()
    }
}

pub struct SgfNormalizeScalar;

impl VScalar for SgfNormalizeScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_varchar(input, output, |sgf| {
            Ok(match sgf_normalize(sgf) {
                Some(normalized) => VarcharOutput::Value(normalized),
                None => VarcharOutput::Null,
            })
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        varchar_signature()
    }
}
