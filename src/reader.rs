use crate::{
    date::sgf_date_to_duckdb,
    duckdb_impl::bind_info_ffi::get_named_parameter,
    error::ErrorAccumulator,
    interpreter::{RecordCheck, check_record, parse_sgf},
    log,
    moves::{moves_to_json, stones_to_json, unparsed_to_json},
    types::{GameRecord, GoCoord, UnparsedProperty},
};
use duckdb::{
    core::{DataChunkHandle, Inserter, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use libduckdb_sys::duckdb_date;
use std::borrow::Cow;
use std::ffi::CString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type SgfInput = Box<dyn Read + Send>;

#[repr(C)]
pub struct ReadSgfBindData {
    paths: Vec<PathBuf>,
    compression: CompressionMode,
    check: RecordCheck,
}

#[repr(C)]
pub struct ReadSgfInitData {
    state: Mutex<SharedState>,
}

struct SharedState {
    next_path_idx: usize,
}

pub struct ReadSgfVTab;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CompressionMode {
    Plain,
    Zstd,
}

const PATH_PATTERN_PARAM_INDEX: u64 = 0;
const ROWS_PER_CHUNK: usize = 2048;
const READ_SGF_COLUMN_COUNT: usize = 22;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ReadSgfColumn {
    Black = 0,
    BlackRank = 1,
    White = 2,
    WhiteRank = 3,
    Date = 4,
    DateText = 5,
    Rule = 6,
    BoardWidth = 7,
    BoardHeight = 8,
    Komi = 9,
    Handicap = 10,
    TimeLimit = 11,
    Result = 12,
    Resigned = 13,
    BlackStones = 14,
    WhiteStones = 15,
    Moves = 16,
    MoveCount = 17,
    Unparsed = 18,
    ParseError = 19,
    Source = 20,
    Winner = 21,
}

impl ReadSgfColumn {
    const fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        READ_SGF_COLUMNS[self.index()].name
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ReadSgfLogicalType {
    Varchar,
    Integer,
    Float,
    Boolean,
    Date,
}

impl ReadSgfLogicalType {
    fn to_handle(self) -> LogicalTypeHandle {
        match self {
            Self::Varchar => LogicalTypeHandle::from(LogicalTypeId::Varchar),
            Self::Integer => LogicalTypeHandle::from(LogicalTypeId::Integer),
            Self::Float => LogicalTypeHandle::from(LogicalTypeId::Float),
            Self::Boolean => LogicalTypeHandle::from(LogicalTypeId::Boolean),
            Self::Date => LogicalTypeHandle::from(LogicalTypeId::Date),
        }
    }
}

struct ReadSgfColumnDef {
    name: &'static str,
    logical_type: ReadSgfLogicalType,
}

const fn column(name: &'static str, logical_type: ReadSgfLogicalType) -> ReadSgfColumnDef {
    ReadSgfColumnDef { name, logical_type }
}

const READ_SGF_COLUMNS: [ReadSgfColumnDef; READ_SGF_COLUMN_COUNT] = [
    column("black", ReadSgfLogicalType::Varchar),
    column("black_rank", ReadSgfLogicalType::Varchar),
    column("white", ReadSgfLogicalType::Varchar),
    column("white_rank", ReadSgfLogicalType::Varchar),
    column("date", ReadSgfLogicalType::Date),
    column("date_text", ReadSgfLogicalType::Varchar),
    column("rule", ReadSgfLogicalType::Varchar),
    column("board_width", ReadSgfLogicalType::Integer),
    column("board_height", ReadSgfLogicalType::Integer),
    column("komi", ReadSgfLogicalType::Float),
    column("handicap", ReadSgfLogicalType::Integer),
    column("time_limit", ReadSgfLogicalType::Integer),
    column("result", ReadSgfLogicalType::Float),
    column("resigned", ReadSgfLogicalType::Boolean),
    column("black_stones", ReadSgfLogicalType::Varchar),
    column("white_stones", ReadSgfLogicalType::Varchar),
    column("moves", ReadSgfLogicalType::Varchar),
    column("move_count", ReadSgfLogicalType::Integer),
    column("unparsed", ReadSgfLogicalType::Varchar),
    column("parse_error", ReadSgfLogicalType::Varchar),
    column("source", ReadSgfLogicalType::Varchar),
    column("winner", ReadSgfLogicalType::Varchar),
];

impl CompressionMode {
    fn parse(raw: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(
                "Invalid compression value ''. Supported values: 'zstd' or NULL/omitted."
                    .to_string()
                    .into(),
            );
        }

        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(format!(
                "Invalid compression value '{}'. Supported values: 'zstd' or NULL/omitted.",
                normalized
            )
            .into())
        }
    }

    fn from_parameter(raw: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match raw.map(str::trim) {
            None => Ok(Self::Plain),
            Some(value) if value.eq_ignore_ascii_case("null") => Ok(Self::Plain),
            Some(value) => Self::parse(value),
        }
    }
}

fn parse_board_size(raw: Option<&str>) -> Result<Option<GoCoord>, Box<dyn std::error::Error>> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    match raw.parse::<GoCoord>() {
        Ok(size) if size > 0 => Ok(Some(size)),
        _ => Err(format!(
            "Invalid board_size value '{}'. Expected a positive integer or NULL/omitted.",
            raw
        )
        .into()),
    }
}

fn parse_require_result(raw: Option<&str>) -> Result<bool, Box<dyn std::error::Error>> {
    match raw.map(str::trim) {
        None => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(format!(
            "Invalid require_result value '{}'. Expected a boolean or NULL/omitted.",
            value
        )
        .into()),
    }
}

fn resolve_record_check(bind: &BindInfo) -> Result<RecordCheck, Box<dyn std::error::Error>> {
    let board_size = get_named_parameter(bind, "board_size")?.into_value();
    let require_result = get_named_parameter(bind, "require_result")?.into_value();

    Ok(RecordCheck {
        expected_board_size: parse_board_size(board_size.as_deref())?,
        require_result: parse_require_result(require_result.as_deref())?,
    })
}

fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<SgfInput, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as SgfInput)
            .map_err(|e| {
                format!(
                    "Failed to initialize zstd decoder for '{}': {}",
                    path.display(),
                    e
                )
            }),
    }
}

/// Whole input as text. Invalid UTF-8 is replaced and a leading BOM dropped.
fn read_input(mut input: SgfInput) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    Ok(String::from_utf8_lossy(body).into_owned())
}

/// One output row. `record` is `None` when the file failed to parse or check.
struct SgfRow {
    source: String,
    record: Option<GameRecord>,
    unparsed: Vec<UnparsedProperty>,
    parse_error: ErrorAccumulator,
}

fn load_game(input: SgfInput, source_path: &Path, check: &RecordCheck) -> SgfRow {
    let mut row = SgfRow {
        source: source_path.display().to_string(),
        record: None,
        unparsed: Vec::new(),
        parse_error: ErrorAccumulator::default(),
    };

    let text = match read_input(input) {
        Ok(text) => text,
        Err(e) => {
            let error_msg = format!(
                "Reader-stage error: file='{}'; error={}",
                source_path.display(),
                e
            );
            log::warn(&error_msg);
            row.parse_error.push(&error_msg);
            return row;
        }
    };

    let parsed = parse_sgf(&text, Some(&mut row.unparsed), Some(&mut row.parse_error))
        .and_then(|record| check_record(&record, check).map(|()| record));
    match parsed {
        Ok(record) => row.record = Some(record),
        Err(e) => {
            // parse_sgf has already recorded its own failure.
            if row.parse_error.is_empty() {
                row.parse_error.push(&e.message);
            }
            row.unparsed.clear();
        }
    }
    row
}

fn sanitize_for_cstring<'a>(
    value: &'a str,
    field_name: &str,
    parse_error: &mut ErrorAccumulator,
) -> Cow<'a, str> {
    if value.contains('\0') {
        parse_error.push(&format!("Sanitized interior NUL in {}", field_name));
        Cow::Owned(value.replace('\0', " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn sanitize_for_cstring_silent(value: &str) -> Cow<'_, str> {
    if value.contains('\0') {
        Cow::Owned(value.replace('\0', " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn nonzero(value: GoCoord) -> Option<i32> {
    (value > 0).then_some(i32::from(value))
}

struct ChunkWriter<'a> {
    output: &'a mut DataChunkHandle,
    row_count: usize,
}

impl<'a> ChunkWriter<'a> {
    fn new(output: &'a mut DataChunkHandle) -> Self {
        Self {
            output,
            row_count: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.row_count >= ROWS_PER_CHUNK
    }

    fn write_row(&mut self, row: &SgfRow) -> Result<(), Box<dyn std::error::Error>> {
        let row_idx = self.row_count;
        let mut row_parse_error = row.parse_error.clone();

        match &row.record {
            Some(game) => self.write_record(row_idx, game, &row.unparsed, &mut row_parse_error)?,
            None => {
                for column in NULLABLE_RECORD_COLUMNS {
                    self.write_null(column, row_idx);
                }
            }
        }

        self.write_optional_varchar(
            ReadSgfColumn::Source,
            row_idx,
            Some(row.source.as_str()),
            &mut row_parse_error,
        )?;

        let mut parse_error_vec = self.output.flat_vector(ReadSgfColumn::ParseError.index());
        match row_parse_error.take() {
            None => parse_error_vec.set_null(row_idx),
            Some(parse_error) => {
                let parse_error = sanitize_for_cstring_silent(parse_error.as_str());
                parse_error_vec.insert(row_idx, CString::new(parse_error.as_ref())?);
            }
        }

        self.row_count += 1;
        Ok(())
    }

    fn write_record(
        &mut self,
        row_idx: usize,
        game: &GameRecord,
        unparsed: &[UnparsedProperty],
        parse_error: &mut ErrorAccumulator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.write_optional_varchar(
            ReadSgfColumn::Black,
            row_idx,
            game.black_name.as_deref(),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::BlackRank,
            row_idx,
            game.black_rank.as_deref(),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::White,
            row_idx,
            game.white_name.as_deref(),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::WhiteRank,
            row_idx,
            game.white_rank.as_deref(),
            parse_error,
        )?;
        let date = game
            .date
            .as_deref()
            .and_then(|raw| sgf_date_to_duckdb(raw, parse_error));
        self.write_optional_date(ReadSgfColumn::Date, row_idx, date);
        self.write_optional_varchar(
            ReadSgfColumn::DateText,
            row_idx,
            game.date.as_deref(),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::Rule,
            row_idx,
            game.rule.as_deref(),
            parse_error,
        )?;

        self.write_optional_integer(
            ReadSgfColumn::BoardWidth,
            row_idx,
            nonzero(game.board_width),
        );
        self.write_optional_integer(
            ReadSgfColumn::BoardHeight,
            row_idx,
            nonzero(game.board_height),
        );
        self.write_optional_float(ReadSgfColumn::Komi, row_idx, Some(game.komi));
        self.write_optional_integer(ReadSgfColumn::Handicap, row_idx, Some(game.handicap));
        self.write_optional_integer(ReadSgfColumn::TimeLimit, row_idx, game.time_limit);
        self.write_optional_float(
            ReadSgfColumn::Result,
            row_idx,
            (game.result != 0.0).then_some(game.result),
        );
        self.write_optional_boolean(ReadSgfColumn::Resigned, row_idx, Some(game.resigned));
        self.write_optional_varchar(
            ReadSgfColumn::Winner,
            row_idx,
            game.winner().map(|color| color.as_str()),
            parse_error,
        )?;

        self.write_optional_varchar(
            ReadSgfColumn::BlackStones,
            row_idx,
            Some(stones_to_json(&game.black_stones).as_str()),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::WhiteStones,
            row_idx,
            Some(stones_to_json(&game.white_stones).as_str()),
            parse_error,
        )?;
        self.write_optional_varchar(
            ReadSgfColumn::Moves,
            row_idx,
            Some(moves_to_json(&game.moves).as_str()),
            parse_error,
        )?;
        self.write_optional_integer(
            ReadSgfColumn::MoveCount,
            row_idx,
            Some(i32::try_from(game.moves.len()).unwrap_or(i32::MAX)),
        );
        self.write_optional_varchar(
            ReadSgfColumn::Unparsed,
            row_idx,
            Some(unparsed_to_json(unparsed).as_str()),
            parse_error,
        )?;
        Ok(())
    }

    fn set_output_len(&mut self) {
        self.output.set_len(self.row_count);
    }

    fn write_null(&mut self, column: ReadSgfColumn, row_idx: usize) {
        let mut vector = self.output.flat_vector(column.index());
        vector.set_null(row_idx);
    }

    fn write_optional_varchar(
        &mut self,
        column: ReadSgfColumn,
        row_idx: usize,
        value: Option<&str>,
        parse_error: &mut ErrorAccumulator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut vector = self.output.flat_vector(column.index());
        if let Some(value) = value {
            let sanitized = sanitize_for_cstring(value, column.name(), parse_error);
            vector.insert(row_idx, CString::new(sanitized.as_ref())?);
        } else {
            vector.set_null(row_idx);
        }
        Ok(())
    }

    fn write_optional_integer(&mut self, column: ReadSgfColumn, row_idx: usize, value: Option<i32>) {
        let mut vector = self.output.flat_vector(column.index());
        if let Some(value) = value {
            vector.as_mut_slice::<i32>()[row_idx] = value;
        } else {
            vector.set_null(row_idx);
        }
    }

    fn write_optional_float(&mut self, column: ReadSgfColumn, row_idx: usize, value: Option<f32>) {
        let mut vector = self.output.flat_vector(column.index());
        if let Some(value) = value {
            vector.as_mut_slice::<f32>()[row_idx] = value;
        } else {
            vector.set_null(row_idx);
        }
    }

    fn write_optional_boolean(
        &mut self,
        column: ReadSgfColumn,
        row_idx: usize,
        value: Option<bool>,
    ) {
        let mut vector = self.output.flat_vector(column.index());
        if let Some(value) = value {
            vector.as_mut_slice::<bool>()[row_idx] = value;
        } else {
            vector.set_null(row_idx);
        }
    }

    fn write_optional_date(
        &mut self,
        column: ReadSgfColumn,
        row_idx: usize,
        value: Option<duckdb_date>,
    ) {
        let mut vector = self.output.flat_vector(column.index());
        if let Some(value) = value {
            vector.as_mut_slice::<duckdb_date>()[row_idx] = value;
        } else {
            vector.set_null(row_idx);
        }
    }
}

/// Every column filled from the record; NULL for rows that failed.
const NULLABLE_RECORD_COLUMNS: [ReadSgfColumn; 20] = [
    ReadSgfColumn::Black,
    ReadSgfColumn::BlackRank,
    ReadSgfColumn::White,
    ReadSgfColumn::WhiteRank,
    ReadSgfColumn::Date,
    ReadSgfColumn::DateText,
    ReadSgfColumn::Rule,
    ReadSgfColumn::BoardWidth,
    ReadSgfColumn::BoardHeight,
    ReadSgfColumn::Komi,
    ReadSgfColumn::Handicap,
    ReadSgfColumn::TimeLimit,
    ReadSgfColumn::Result,
    ReadSgfColumn::Resigned,
    ReadSgfColumn::BlackStones,
    ReadSgfColumn::WhiteStones,
    ReadSgfColumn::Moves,
    ReadSgfColumn::MoveCount,
    ReadSgfColumn::Unparsed,
    ReadSgfColumn::Winner,
];

fn next_path_idx(
    init_data: &ReadSgfInitData,
    bind_data: &ReadSgfBindData,
) -> Option<usize> {
    let mut state = init_data
        .state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if state.next_path_idx < bind_data.paths.len() {
        let path_idx = state.next_path_idx;
        state.next_path_idx += 1;
        Some(path_idx)
    } else {
        None
    }
}

fn expand_path_pattern(pattern: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if pattern.contains('*') || pattern.contains('?') {
        Ok(glob::glob(pattern)?
            .filter_map(|entry| entry.ok())
            .collect())
    } else {
        Ok(vec![PathBuf::from(pattern)])
    }
}

impl VTab for ReadSgfVTab {
    type InitData = ReadSgfInitData;
    type BindData = ReadSgfBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn std::error::Error>> {
        let pattern = bind.get_parameter(PATH_PATTERN_PARAM_INDEX).to_string();
        let compression = CompressionMode::from_parameter(
            get_named_parameter(bind, "compression")?
                .into_value()
                .as_deref(),
        )?;
        let check = resolve_record_check(bind)?;
        let paths = expand_path_pattern(&pattern)?;

        for column in READ_SGF_COLUMNS.iter() {
            bind.add_result_column(column.name, column.logical_type.to_handle());
        }

        Ok(ReadSgfBindData {
            paths,
            compression,
            check,
        })
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn std::error::Error>> {
        Ok(ReadSgfInitData {
            state: Mutex::new(SharedState { next_path_idx: 0 }),
        })
    }

    fn func(
        func: &TableFunctionInfo<Self>,
        output: &mut DataChunkHandle,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let init_data = func.get_init_data();
        let bind_data = func.get_bind_data();
        let mut chunk_writer = ChunkWriter::new(output);

        while !chunk_writer.is_full() {
            let Some(path_idx) = next_path_idx(init_data, bind_data) else {
                break;
            };

            let path = &bind_data.paths[path_idx];
            let input = match open_input_stream(path, bind_data.compression) {
                Ok(input) => input,
                Err(err_msg) => {
                    if bind_data.paths.len() == 1 {
                        log::error(&err_msg);
                        return Err(err_msg.into());
                    }
                    log::warn(&err_msg);
                    continue;
                }
            };

            let row = load_game(input, path, &bind_data.check);
            chunk_writer.write_row(&row)?;
        }

        chunk_writer.set_output_len();
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![
            LogicalTypeHandle::from(LogicalTypeId::Varchar), // path pattern (required)
        ])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(vec![
            (
                "compression".to_string(),
                LogicalTypeHandle::from(LogicalTypeId::Varchar),
            ),
            (
                "board_size".to_string(),
                LogicalTypeHandle::from(LogicalTypeId::Integer),
            ),
            (
                "require_result".to_string(),
                LogicalTypeHandle::from(LogicalTypeId::Boolean),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    fn in_memory(text: &str) -> SgfInput {
        Box::new(Cursor::new(text.as_bytes().to_vec()))
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("duckdb_sgf_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_read_sgf_bind_data_creation() {
        let bind_data = ReadSgfBindData {
            paths: vec![PathBuf::from("game.sgf")],
            compression: CompressionMode::Plain,
            check: RecordCheck::default(),
        };
        assert_eq!(bind_data.paths[0], PathBuf::from("game.sgf"));
        assert_eq!(bind_data.compression, CompressionMode::Plain);
        assert_eq!(bind_data.check.expected_board_size, None);
        assert!(!bind_data.check.require_result);
    }

    #[test]
    fn test_next_path_idx_claims_each_path_once() {
        let bind_data = ReadSgfBindData {
            paths: vec![PathBuf::from("a.sgf"), PathBuf::from("b.sgf")],
            compression: CompressionMode::Plain,
            check: RecordCheck::default(),
        };
        let init_data = ReadSgfInitData {
            state: Mutex::new(SharedState { next_path_idx: 0 }),
        };

        assert_eq!(next_path_idx(&init_data, &bind_data), Some(0));
        assert_eq!(next_path_idx(&init_data, &bind_data), Some(1));
        assert_eq!(next_path_idx(&init_data, &bind_data), None);
    }

    #[test]
    fn test_read_sgf_columns_match_contract() {
        let expected: [(&str, ReadSgfLogicalType); READ_SGF_COLUMN_COUNT] = [
            ("black", ReadSgfLogicalType::Varchar),
            ("black_rank", ReadSgfLogicalType::Varchar),
            ("white", ReadSgfLogicalType::Varchar),
            ("white_rank", ReadSgfLogicalType::Varchar),
            ("date", ReadSgfLogicalType::Date),
            ("date_text", ReadSgfLogicalType::Varchar),
            ("rule", ReadSgfLogicalType::Varchar),
            ("board_width", ReadSgfLogicalType::Integer),
            ("board_height", ReadSgfLogicalType::Integer),
            ("komi", ReadSgfLogicalType::Float),
            ("handicap", ReadSgfLogicalType::Integer),
            ("time_limit", ReadSgfLogicalType::Integer),
            ("result", ReadSgfLogicalType::Float),
            ("resigned", ReadSgfLogicalType::Boolean),
            ("black_stones", ReadSgfLogicalType::Varchar),
            ("white_stones", ReadSgfLogicalType::Varchar),
            ("moves", ReadSgfLogicalType::Varchar),
            ("move_count", ReadSgfLogicalType::Integer),
            ("unparsed", ReadSgfLogicalType::Varchar),
            ("parse_error", ReadSgfLogicalType::Varchar),
            ("source", ReadSgfLogicalType::Varchar),
            ("winner", ReadSgfLogicalType::Varchar),
        ];

        for (idx, column) in READ_SGF_COLUMNS.iter().enumerate() {
            assert_eq!(column.name, expected[idx].0);
            assert_eq!(column.logical_type, expected[idx].1);
        }
        assert_eq!(ReadSgfColumn::ParseError.name(), "parse_error");
        assert_eq!(ReadSgfColumn::Winner.name(), "winner");
    }

    #[test]
    fn test_nullable_record_columns_skip_row_metadata() {
        assert!(!NULLABLE_RECORD_COLUMNS.contains(&ReadSgfColumn::ParseError));
        assert!(!NULLABLE_RECORD_COLUMNS.contains(&ReadSgfColumn::Source));
        assert!(NULLABLE_RECORD_COLUMNS.contains(&ReadSgfColumn::Winner));
        assert_eq!(NULLABLE_RECORD_COLUMNS.len() + 2, READ_SGF_COLUMN_COUNT);
    }

    #[test]
    fn test_rows_per_chunk_constant_matches_contract() {
        assert_eq!(ROWS_PER_CHUNK, 2048);
    }

    #[test]
    fn test_sanitize_for_cstring_preserves_clean_values() {
        let mut parse_error = ErrorAccumulator::default();
        let sanitized = sanitize_for_cstring("Honinbo Shusaku", "black", &mut parse_error);
        assert_eq!(sanitized.as_ref(), "Honinbo Shusaku");
        assert!(parse_error.is_empty());
    }

    #[test]
    fn test_sanitize_for_cstring_replaces_interior_nul_and_records_error() {
        let mut parse_error = ErrorAccumulator::default();
        let sanitized = sanitize_for_cstring("A\0B", "white", &mut parse_error);
        assert_eq!(sanitized.as_ref(), "A B");

        let message = parse_error.take().expect("expected parse_error message");
        assert!(message.contains("Sanitized interior NUL in white"));
    }

    #[test]
    fn test_parse_compression_mode_zstd_case_insensitive() {
        assert_eq!(CompressionMode::parse("zstd").unwrap(), CompressionMode::Zstd);
        assert_eq!(CompressionMode::parse(" ZsTd ").unwrap(), CompressionMode::Zstd);
    }

    #[test]
    fn test_parse_compression_mode_rejects_unsupported_value() {
        let err = CompressionMode::parse("gzip").unwrap_err().to_string();
        assert!(err.contains("Invalid compression value 'gzip'"));
        let err = CompressionMode::parse("   ").unwrap_err().to_string();
        assert!(err.contains("Invalid compression value ''"));
    }

    #[test]
    fn test_compression_parameter_defaults_to_plain() {
        assert_eq!(CompressionMode::from_parameter(None).unwrap(), CompressionMode::Plain);
        assert_eq!(
            CompressionMode::from_parameter(Some("NULL")).unwrap(),
            CompressionMode::Plain
        );
        assert_eq!(
            CompressionMode::from_parameter(Some("zstd")).unwrap(),
            CompressionMode::Zstd
        );
    }

    #[test]
    fn test_parse_board_size() {
        assert_eq!(parse_board_size(None).unwrap(), None);
        assert_eq!(parse_board_size(Some("19")).unwrap(), Some(19));
        assert!(parse_board_size(Some("0")).is_err());
        let err = parse_board_size(Some("big")).unwrap_err().to_string();
        assert!(err.contains("Invalid board_size value 'big'"));
    }

    #[test]
    fn test_parse_require_result() {
        assert!(!parse_require_result(None).unwrap());
        assert!(parse_require_result(Some("true")).unwrap());
        assert!(!parse_require_result(Some("FALSE")).unwrap());
        assert!(parse_require_result(Some("maybe")).is_err());
    }

    #[test]
    fn test_read_input_strips_bom_and_replaces_invalid_utf8() {
        let mut bytes = b"\xEF\xBB\xBF(;PB[".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b"])");
        let text = read_input(Box::new(Cursor::new(bytes))).unwrap();
        assert_eq!(text, "(;PB[\u{FFFD}])");
    }

    #[test]
    fn test_load_game_fills_record_and_unparsed() {
        let row = load_game(
            in_memory("(;GM[1]SZ[19]PB[Black]PW[White]RE[W+R]C[hi];B[pd];W[dp])"),
            Path::new("game.sgf"),
            &RecordCheck::default(),
        );

        assert_eq!(row.source, "game.sgf");
        assert!(row.parse_error.is_empty());
        let record = row.record.expect("record should parse");
        assert_eq!(record.black_name.as_deref(), Some("Black"));
        assert_eq!(record.moves.len(), 2);
        assert!(record.resigned);
        let ids: Vec<&str> = row.unparsed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["GM", "C"]);
    }

    #[test]
    fn test_load_game_structural_failure_keeps_only_error() {
        let row = load_game(
            in_memory("(;B[aa]"),
            Path::new("broken.sgf"),
            &RecordCheck::default(),
        );

        assert!(row.record.is_none());
        assert!(row.unparsed.is_empty());
        let mut parse_error = row.parse_error;
        let message = parse_error.take().expect("expected parse_error message");
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_load_game_applies_record_check() {
        let check = RecordCheck {
            expected_board_size: Some(9),
            require_result: false,
        };
        let row = load_game(in_memory("(;SZ[19];B[aa])"), Path::new("big.sgf"), &check);
        assert!(row.record.is_none());
        let mut parse_error = row.parse_error;
        assert_eq!(parse_error.take().as_deref(), Some("Unexpected board size."));

        let check = RecordCheck {
            expected_board_size: None,
            require_result: true,
        };
        let row = load_game(in_memory("(;SZ[19];B[aa])"), Path::new("open.sgf"), &check);
        let mut parse_error = row.parse_error;
        assert_eq!(
            parse_error.take().as_deref(),
            Some("The game has an unknown result.")
        );
    }

    #[test]
    fn test_open_input_stream_reads_zstd_file() {
        let path = temp_path("compressed.sgf.zst");
        let compressed =
            zstd::stream::encode_all(Cursor::new(b"(;SZ[9]KM[5.5];B[ee])".to_vec()), 3).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let input = open_input_stream(&path, CompressionMode::Zstd).unwrap();
        let row = load_game(input, &path, &RecordCheck::default());
        std::fs::remove_file(&path).unwrap();

        let record = row.record.expect("record should parse");
        assert_eq!(record.board_width, 9);
        assert_eq!(record.komi, 5.5);
    }

    #[test]
    fn test_open_input_stream_reports_missing_file() {
        let path = temp_path("missing.sgf");
        let err = match open_input_stream(&path, CompressionMode::Plain) {
            Ok(_) => panic!("missing file should not open"),
            Err(err) => err,
        };
        assert!(err.starts_with("Failed to open file"));
    }

    #[test]
    fn test_expand_path_pattern_literal_path() {
        let paths = expand_path_pattern("games/one.sgf").unwrap();
        assert_eq!(paths, vec![PathBuf::from("games/one.sgf")]);
    }

    #[test]
    fn test_nonzero_board_dimension() {
        assert_eq!(nonzero(0), None);
        assert_eq!(nonzero(19), Some(19));
    }
}
