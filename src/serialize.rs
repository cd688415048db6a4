//! Canonical SGF text for the fields a [`GameRecord`] carries.

use std::fmt::Write;

use crate::types::{GameRecord, GoCoord, GoPos};

fn point_char(c: GoCoord) -> char {
    u32::try_from(i32::from(c) + i32::from(b'a'))
        .ok()
        .and_then(char::from_u32)
        .unwrap_or('?')
}

fn push_point(out: &mut String, (x, y): GoPos) {
    out.push('[');
    out.push(point_char(x));
    out.push(point_char(y));
    out.push(']');
}

/// Existing `\x` pairs pass through untouched, so parsed text keeps its
/// escapes. A bare `]` or a trailing lone `\` gets escaped.
fn push_escaped(out: &mut String, value: &str) {
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push_str("\\\\"),
            },
            ']' => out.push_str("\\]"),
            _ => out.push(c),
        }
    }
}

fn push_text(out: &mut String, id: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(id);
        out.push('[');
        push_escaped(out, value);
        out.push(']');
    }
}

fn push_stones(out: &mut String, id: &str, stones: &[GoPos]) {
    if stones.is_empty() {
        return;
    }
    out.push_str(id);
    for &pos in stones {
        push_point(out, pos);
    }
}

fn result_text(record: &GameRecord) -> Option<String> {
    let winner = record.winner()?;
    if record.resigned {
        Some(format!("{}+R", winner.as_str()))
    } else {
        Some(format!("{}+{}", winner.as_str(), record.result.abs()))
    }
}

/// Writes a single-sequence game tree: one root node with the header, then
/// one node per move.
///
/// Text values parsed from SGF are written back as stored, escapes included.
/// Text set in code has any bare `]` escaped so the output always parses.
pub fn to_sgf(record: &GameRecord) -> String {
    let mut out = String::with_capacity(64 + record.moves.len() * 6);
    out.push_str("(;FF[4]GM[1]");

    if record.board_width > 0 {
        let _ = write!(out, "SZ[{}]", record.board_width);
    }
    if record.komi != 0.0 {
        let _ = write!(out, "KM[{}]", record.komi);
    }
    if record.handicap != 0 {
        let _ = write!(out, "HA[{}]", record.handicap);
    }
    if let Some(tm) = record.time_limit {
        let _ = write!(out, "TM[{tm}]");
    }
    push_text(&mut out, "RU", record.rule.as_deref());
    push_text(&mut out, "PB", record.black_name.as_deref());
    push_text(&mut out, "BR", record.black_rank.as_deref());
    push_text(&mut out, "PW", record.white_name.as_deref());
    push_text(&mut out, "WR", record.white_rank.as_deref());
    push_text(&mut out, "DT", record.date.as_deref());
    push_text(&mut out, "RE", result_text(record).as_deref());
    push_stones(&mut out, "AB", &record.black_stones);
    push_stones(&mut out, "AW", &record.white_stones);

    for mv in &record.moves {
        out.push(';');
        out.push_str(mv.player.as_str());
        match mv.pos {
            Some(pos) => push_point(&mut out, pos),
            None => out.push_str("[]"),
        }
    }

    out.push(')');
    out
}
