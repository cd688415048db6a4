//! Maps the main line of a parsed collection onto a [`GameRecord`].

use crate::dump::render_collection;
use crate::error::{ErrorAccumulator, SgfError};
use crate::log;
use crate::path::select_path;
use crate::tree::{GameNode, Property, parse_to_collection};
use crate::types::{
    Color, DEFAULT_KOMI, GameRecord, GoCoord, GoMove, GoPos, RESIGN_RESULT, UnparsedProperty,
};

fn single_value<'a>(prop: &Property<'a>, message: &str) -> Result<&'a str, SgfError> {
    match prop.values.as_slice() {
        [value] => Ok(*value),
        _ => Err(SgfError::semantic(message)),
    }
}

fn text_value(prop: &Property<'_>, message: &str) -> Result<Option<String>, SgfError> {
    single_value(prop, message).map(|value| Some(value.to_string()))
}

fn coord(c: char) -> Option<GoCoord> {
    GoCoord::try_from(i64::from(u32::from(c)) - i64::from(u32::from('a'))).ok()
}

/// Two letters, `"aa"` being the top-left point. Case is ignored.
pub(crate) fn parse_point(value: &str) -> Option<GoPos> {
    let lower = value.to_ascii_lowercase();
    let mut chars = lower.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(x), Some(y), None) => Some((coord(x)?, coord(y)?)),
        _ => None,
    }
}

fn parse_result(value: &str, record: &mut GameRecord) -> Result<(), SgfError> {
    let re = value.to_ascii_uppercase();

    // Resign, Timeout or Forfeit.
    if ["B+R", "B+T", "B+F"].iter().any(|p| re.starts_with(p)) {
        record.result = RESIGN_RESULT;
        record.resigned = true;
        return Ok(());
    }
    if ["W+R", "W+T", "W+F"].iter().any(|p| re.starts_with(p)) {
        record.result = -RESIGN_RESULT;
        record.resigned = true;
        return Ok(());
    }

    if re.len() < 3 {
        return Err(SgfError::semantic("Bad result (RE) value: value too short."));
    }
    let score = re
        .get(2..)
        .and_then(|s| s.trim().parse::<f32>().ok())
        .ok_or_else(|| SgfError::semantic("Bad result (RE) value: failed in parsing score."))?;
    record.result = match re.as_bytes()[0] {
        b'B' => score,
        b'W' => -score,
        _ => return Err(SgfError::semantic("Bad result (RE) value: unknown color.")),
    };
    record.resigned = false;
    Ok(())
}

fn handle_property(
    prop: &Property<'_>,
    record: &mut GameRecord,
    unparsed: Option<&mut Vec<UnparsedProperty>>,
) -> Result<(), SgfError> {
    let id = prop.id.to_ascii_uppercase();
    match id.as_str() {
        "SZ" => {
            let value = single_value(prop, "Bad SZ property.")?;
            let size = value
                .trim()
                .parse::<GoCoord>()
                .map_err(|_| SgfError::semantic("Bad SZ value."))?;
            record.board_width = size;
            record.board_height = size;
        }
        "HA" => {
            let value = single_value(prop, "Bad HA property.")?;
            record.handicap = value
                .trim()
                .parse()
                .map_err(|_| SgfError::semantic("Bad HA value."))?;
        }
        "TM" => {
            let value = single_value(prop, "Bad TM property.")?;
            record.time_limit = match value.trim().parse() {
                Ok(tm) => Some(tm),
                Err(_) => {
                    log::warn(format!("Cannot parse TM value '{value}', using 0"));
                    Some(0)
                }
            };
        }
        "KM" => {
            let value = single_value(prop, "Bad Komi property.")?;
            record.komi = match value.trim().parse() {
                Ok(komi) => komi,
                Err(_) => {
                    log::warn(format!(
                        "Cannot parse Komi value '{value}', using default {DEFAULT_KOMI}"
                    ));
                    DEFAULT_KOMI
                }
            };
        }
        "RU" => record.rule = text_value(prop, "Bad rule.")?,
        "PB" | "BT" => record.black_name = text_value(prop, "Bad black name value.")?,
        "PW" | "WT" => record.white_name = text_value(prop, "Bad white name value.")?,
        "BR" => record.black_rank = text_value(prop, "Bad black rank.")?,
        "WR" => record.white_rank = text_value(prop, "Bad white rank.")?,
        "DT" => record.date = text_value(prop, "Bad date.")?,
        "RE" => {
            let value = single_value(prop, "Bad result (RE) property.")?;
            parse_result(value, record)?;
        }
        "AB" | "AW" => {
            let stones = if id == "AB" {
                &mut record.black_stones
            } else {
                &mut record.white_stones
            };
            for value in &prop.values {
                let pos = parse_point(value)
                    .ok_or_else(|| SgfError::semantic(format!("Bad coordinate: {value}")))?;
                stones.push(pos);
            }
        }
        "B" | "W" => {
            let color = if id == "B" { Color::Black } else { Color::White };
            for value in &prop.values {
                if value.is_empty() {
                    record.moves.push(GoMove::pass(color));
                    continue;
                }
                let pos = parse_point(value)
                    .ok_or_else(|| SgfError::semantic(format!("Bad coordinate: {value}")))?;
                record.moves.push(GoMove::play(color, pos));
            }
        }
        _ => {
            if let Some(unparsed) = unparsed {
                unparsed.push(UnparsedProperty {
                    id,
                    value: prop.values.join(","),
                });
            }
        }
    }
    Ok(())
}

/// Builds a record from `nodes` in order. Scalar fields keep the last value
/// seen; stones and moves accumulate.
///
/// Properties the record has no field for go to `unparsed` when given.
pub fn interpret(
    nodes: &[&GameNode<'_>],
    mut unparsed: Option<&mut Vec<UnparsedProperty>>,
) -> Result<GameRecord, SgfError> {
    let mut record = GameRecord::default();
    for node in nodes {
        for prop in node.iter() {
            handle_property(prop, &mut record, unparsed.as_deref_mut())?;
        }
    }
    Ok(record)
}

fn parse_main_line(
    sgf: &str,
    unparsed: Option<&mut Vec<UnparsedProperty>>,
) -> Result<GameRecord, SgfError> {
    let trees = parse_to_collection(sgf)?;
    if log::debug_enabled() {
        log::debug(render_collection(&trees));
    }

    let nodes = select_path(&trees)?;
    let record = interpret(&nodes, unparsed)?;
    if log::debug_enabled() {
        log::debug(record.to_string());
    }
    Ok(record)
}

/// Parses an SGF buffer and interprets its main line.
///
/// On failure the message is also pushed to `errors`. Anything already pushed
/// to `unparsed` belongs to the failed parse and should be dropped with it.
pub fn parse_sgf(
    sgf: &str,
    unparsed: Option<&mut Vec<UnparsedProperty>>,
    errors: Option<&mut ErrorAccumulator>,
) -> Result<GameRecord, SgfError> {
    let result = parse_main_line(sgf, unparsed);
    if let (Err(err), Some(errors)) = (&result, errors) {
        errors.push(&err.message);
    }
    result
}

/// Extra acceptance rules for records that parsed fine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCheck {
    pub expected_board_size: Option<GoCoord>,
    pub require_result: bool,
}

pub fn check_record(record: &GameRecord, check: &RecordCheck) -> Result<(), SgfError> {
    if let Some(size) = check.expected_board_size
        && (record.board_width != size || record.board_height != size)
    {
        return Err(SgfError::semantic("Unexpected board size."));
    }
    if check.require_result && record.result == 0.0 {
        return Err(SgfError::semantic("The game has an unknown result."));
    }
    Ok(())
}
