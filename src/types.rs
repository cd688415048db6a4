use std::fmt;

/// Zero-based board coordinate; `'a'` maps to 0.
pub type GoCoord = i16;
pub type GoPos = (GoCoord, GoCoord);

/// Result stored for wins by resignation, timeout or forfeit. Only the sign is
/// meaningful.
pub const RESIGN_RESULT: f32 = 1.2;

/// Komi used when the `KM` value cannot be parsed.
pub const DEFAULT_KOMI: f32 = 6.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "B",
            Self::White => "W",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoMove {
    pub player: Color,
    /// `None` for a pass.
    pub pos: Option<GoPos>,
}

impl GoMove {
    pub fn play(player: Color, pos: GoPos) -> Self {
        Self {
            player,
            pos: Some(pos),
        }
    }

    pub fn pass(player: Color) -> Self {
        Self { player, pos: None }
    }

    pub fn is_pass(&self) -> bool {
        self.pos.is_none()
    }
}

/// A property the interpreter does not map, with its values joined by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedProperty {
    pub id: String,
    pub value: String,
}

/// Game record extracted from the main line of an SGF collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    // SZ
    pub board_width: GoCoord,
    pub board_height: GoCoord,
    // KM
    pub komi: f32,
    // HA
    pub handicap: i32,
    /// TM, in seconds.
    pub time_limit: Option<i32>,

    // AB / AW
    pub black_stones: Vec<GoPos>,
    pub white_stones: Vec<GoPos>,
    // B / W
    pub moves: Vec<GoMove>,

    /// RE: positive when black wins, negative when white wins, by this many
    /// points. `0.0` when unknown.
    pub result: f32,
    pub resigned: bool,

    pub black_name: Option<String>,
    pub black_rank: Option<String>,
    pub white_name: Option<String>,
    pub white_rank: Option<String>,
    pub date: Option<String>,
    pub rule: Option<String>,
}

impl Default for GameRecord {
    fn default() -> Self {
        Self {
            board_width: 0,
            board_height: 0,
            komi: 0.0,
            handicap: 0,
            time_limit: None,
            black_stones: Vec::new(),
            white_stones: Vec::new(),
            moves: Vec::new(),
            result: 0.0,
            resigned: false,
            black_name: None,
            black_rank: None,
            white_name: None,
            white_rank: None,
            date: None,
            rule: None,
        }
    }
}

impl GameRecord {
    pub fn winner(&self) -> Option<Color> {
        if self.result > 0.0 {
            Some(Color::Black)
        } else if self.result < 0.0 {
            Some(Color::White)
        } else {
            None
        }
    }
}

fn write_stones(f: &mut fmt::Formatter<'_>, label: &str, stones: &[GoPos]) -> fmt::Result {
    if stones.is_empty() {
        return Ok(());
    }
    write!(f, "{label}: ")?;
    for (x, y) in stones {
        write!(f, "[{x},{y}] ")?;
    }
    writeln!(f)
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let time_limit = self.time_limit.unwrap_or(-1);

        writeln!(
            f,
            "Board Size: [{}*{}]  Komi: {}  Handicap: {}  Time limit: {} seconds.",
            self.board_width, self.board_height, self.komi, self.handicap, time_limit
        )?;
        writeln!(
            f,
            "Black: {} Rank: {}  White: {} Rank: {}",
            text(&self.black_name),
            text(&self.black_rank),
            text(&self.white_name),
            text(&self.white_rank)
        )?;
        write!(f, "Date: {}  Rule: {}  ", text(&self.date), text(&self.rule))?;
        match self.winner() {
            None => writeln!(f, "Result: unknown")?,
            Some(color) if self.resigned => {
                writeln!(f, "Result: {} wins by resignation", color.as_str())?
            }
            Some(color) => {
                writeln!(f, "Result: {} wins by +{}", color.as_str(), self.result.abs())?
            }
        }
        write_stones(f, "Black stones", &self.black_stones)?;
        write_stones(f, "White stones", &self.white_stones)?;
        write!(f, "Moves:")?;
        for mv in &self.moves {
            match mv.pos {
                Some((x, y)) => write!(f, " {}[{x},{y}]", mv.player.as_str())?,
                None => write!(f, " {} passed", mv.player.as_str())?,
            }
        }
        Ok(())
    }
}
