// src/services/parser.rs
use std::fmt;

use log::debug;
use regex::Regex;

use crate::models::{DataPoint, ParsedSeries};

use super::safety::SafetyFilter;

/// Axis label for the extracted series; uploads follow the
/// years-across-columns convention.
pub const DEFAULT_X_LABEL: &str = "연도";
/// Fallback metric name when the value row has an empty name cell.
pub const DEFAULT_VALUE_LABEL: &str = "수치";

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Empty,
    UnsafeContent { word: String },
    NoHeaderOrValueRow,
    NoValidPoints,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Empty => {
                write!(f, "파일에서 읽을 수 있는 내용이 없어요. 내용이 있는 파일을 올려 주세요.")
            }
            ParseError::UnsafeContent { word } => {
                write!(f, "자료에 사용할 수 없는 말('{}')이 들어 있어요. 내용을 확인해 주세요.", word)
            }
            ParseError::NoHeaderOrValueRow => {
                write!(
                    f,
                    "표를 찾지 못했어요. 첫 줄에 2019, 2020처럼 네 자리 연도가 3개 이상 있고, 바로 아래 줄에 숫자가 있어야 해요."
                )
            }
            ParseError::NoValidPoints => {
                write!(f, "표에서 숫자로 읽을 수 있는 칸을 찾지 못했어요. 연도 아래 칸에 숫자를 넣어 주세요.")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Extracts a labeled time series from loosely structured delimited text.
///
/// The heuristic targets one spreadsheet export convention: a header row
/// holding at least three four-digit year tokens, with a row of numeric
/// values somewhere below it. Header/value cells pair strictly by column
/// index; columns failing either the label or the numeric check are skipped
/// independently. The denylist gate runs over the full raw text before any
/// row scanning.
pub fn parse_series(
    raw_text: &str,
    file_name: &str,
    filter: &SafetyFilter,
) -> Result<ParsedSeries, ParseError> {
    if raw_text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let check = filter.check(raw_text);
    if !check.safe {
        return Err(ParseError::UnsafeContent {
            word: check.matched_word.unwrap_or_default(),
        });
    }

    // Pattern is a literal; compilation cannot fail.
    let year_re = Regex::new(r"^[0-9]{4}$").unwrap();

    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    // Header row: first line, scanning down, with >= 3 four-digit cells.
    let mut header: Option<(usize, Vec<String>)> = None;
    for (idx, line) in lines.iter().enumerate() {
        let delimiter = match line_delimiter(line) {
            Some(delimiter) => delimiter,
            None => continue,
        };
        let cells = split_cells(line, delimiter);
        let year_cells = cells.iter().filter(|cell| year_re.is_match(cell)).count();
        if year_cells >= 3 {
            header = Some((idx, cells));
            break;
        }
    }

    let (header_idx, header_cells) = match header {
        Some(found) => found,
        None => return Err(ParseError::NoHeaderOrValueRow),
    };

    // Value row: first line below the header with a numeric cell past the
    // name column. Unit rows ("명", "kg", ...) fall through naturally.
    let mut value_cells: Option<Vec<String>> = None;
    for line in &lines[header_idx + 1..] {
        let delimiter = match line_delimiter(line) {
            Some(delimiter) => delimiter,
            None => continue,
        };
        let cells = split_cells(line, delimiter);
        if cells.iter().skip(1).any(|cell| parse_number(cell).is_some()) {
            value_cells = Some(cells);
            break;
        }
    }

    let value_cells = match value_cells {
        Some(found) => found,
        None => return Err(ParseError::NoHeaderOrValueRow),
    };

    let original_label = match value_cells.first().map(|cell| cell.trim()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_VALUE_LABEL.to_string(),
    };

    let mut points = Vec::new();
    for (i, label) in header_cells.iter().enumerate().skip(1) {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        let value = match value_cells.get(i).and_then(|cell| parse_number(cell)) {
            Some(value) => value,
            None => continue,
        };
        let year = if year_re.is_match(label) {
            Some(label.to_string())
        } else {
            None
        };
        points.push(DataPoint {
            label: label.to_string(),
            value,
            original_label: original_label.clone(),
            year,
        });
    }

    if points.is_empty() {
        return Err(ParseError::NoValidPoints);
    }

    debug!("Parsed {} points from '{}'", points.len(), file_name);

    Ok(ParsedSeries {
        name: file_name.to_string(),
        x_label: DEFAULT_X_LABEL.to_string(),
        y_label: original_label,
        points,
    })
}

/// Tab wins over comma so Excel copy-paste keeps its thousands separators.
fn line_delimiter(line: &str) -> Option<char> {
    if line.contains('\t') {
        Some('\t')
    } else if line.contains(',') {
        Some(',')
    } else {
        None
    }
}

/// Splits one line into trimmed cells. A double-quoted cell may contain the
/// delimiter; quotes are stripped. Escaped quotes inside quotes are not
/// supported.
fn split_cells(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    cells.push(current.trim().to_string());

    cells
}

/// Parses a cell as a finite number after stripping thousands separators.
fn parse_number(cell: &str) -> Option<f64> {
    let cleaned = cell.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SafetyFilter {
        SafetyFilter::default()
    }

    #[test]
    fn extracts_year_columns_and_values() {
        let text = "구분,2019,2020,2021\n인구,100,120,150";
        let series = parse_series(text, "인구.csv", &filter()).unwrap();

        assert_eq!(series.name, "인구.csv");
        assert_eq!(series.x_label, "연도");
        assert_eq!(series.y_label, "인구");
        assert_eq!(series.points.len(), 3);

        let first = &series.points[0];
        assert_eq!(first.label, "2019");
        assert_eq!(first.value, 100.0);
        assert_eq!(first.original_label, "인구");
        assert_eq!(first.year.as_deref(), Some("2019"));

        assert_eq!(series.points[1].value, 120.0);
        assert_eq!(series.points[2].value, 150.0);
        assert_eq!(series.points[2].year.as_deref(), Some("2021"));
    }

    #[test]
    fn repeated_parsing_is_idempotent() {
        let text = "구분,2018,2019,2020,2021\n강수량,1200,980,1340,1100";
        let a = parse_series(text, "비.csv", &filter()).unwrap();
        let b = parse_series(text, "비.csv", &filter()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(parse_series("", "x.csv", &filter()), Err(ParseError::Empty));
        assert_eq!(
            parse_series("  \n \t ", "x.csv", &filter()),
            Err(ParseError::Empty)
        );
    }

    #[test]
    fn denylist_hit_short_circuits_before_scanning() {
        // A perfectly parseable table still fails when the raw text
        // contains a denylisted word.
        let text = "구분,2019,2020,2021\n바보,100,120,150";
        assert_eq!(
            parse_series(text, "x.csv", &filter()),
            Err(ParseError::UnsafeContent {
                word: "바보".to_string()
            })
        );
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(
            parse_series("aaa,bbb,ccc", "x.csv", &filter()),
            Err(ParseError::NoHeaderOrValueRow)
        );
    }

    #[test]
    fn two_year_tokens_are_not_enough() {
        let text = "구분,2020,2021\n인구,100,120";
        assert_eq!(
            parse_series(text, "x.csv", &filter()),
            Err(ParseError::NoHeaderOrValueRow)
        );
    }

    #[test]
    fn header_without_numeric_row_below_is_rejected() {
        let text = "구분,2019,2020,2021\n단위,명,명,명";
        assert_eq!(
            parse_series(text, "x.csv", &filter()),
            Err(ParseError::NoHeaderOrValueRow)
        );
    }

    #[test]
    fn unit_row_between_header_and_values_is_skipped() {
        let text = "구분,2019,2020,2021\n단위,명,명,명\n인구,100,120,150";
        let series = parse_series(text, "x.csv", &filter()).unwrap();
        assert_eq!(series.y_label, "인구");
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[0].value, 100.0);
    }

    #[test]
    fn columns_are_skipped_independently() {
        // Column 2 has no header label, column 3 has no numeric value, the
        // trailing column has a non-year label; the rest still come through.
        let text = "구분,2019,,2021,메모\n키,10,20,abc,30";
        let series = parse_series(text, "x.csv", &filter()).unwrap();

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].label, "2019");
        assert_eq!(series.points[0].value, 10.0);
        assert_eq!(series.points[1].label, "메모");
        assert_eq!(series.points[1].value, 30.0);
        assert_eq!(series.points[1].year, None);
    }

    #[test]
    fn no_overlapping_columns_yields_no_valid_points() {
        // The only numeric cell sits under an empty header cell.
        let text = "구분,2019,2020,2021,\n인구,a,b,c,5";
        assert_eq!(
            parse_series(text, "x.csv", &filter()),
            Err(ParseError::NoValidPoints)
        );
    }

    #[test]
    fn quoted_cells_keep_embedded_commas() {
        let text = "\"구분, 상세\",2019,2020,2021\n\"인구, 전체\",\"1,000\",\"1,200\",\"1,500\"";
        let series = parse_series(text, "x.csv", &filter()).unwrap();

        assert_eq!(series.y_label, "인구, 전체");
        assert_eq!(series.points[0].value, 1000.0);
        assert_eq!(series.points[1].value, 1200.0);
        assert_eq!(series.points[2].value, 1500.0);
    }

    #[test]
    fn tab_delimited_lines_are_supported() {
        let text = "구분\t2019\t2020\t2021\n인구\t1,000\t1,200\t1,500";
        let series = parse_series(text, "x.tsv", &filter()).unwrap();
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points[0].value, 1000.0);
        assert_eq!(series.points[2].value, 1500.0);
    }

    #[test]
    fn non_four_digit_tokens_do_not_count_as_years() {
        // "21" and "year2021" must not satisfy the header heuristic.
        let text = "구분,21,22,year2021\n인구,100,120,150";
        assert_eq!(
            parse_series(text, "x.csv", &filter()),
            Err(ParseError::NoHeaderOrValueRow)
        );
    }

    #[test]
    fn empty_name_cell_falls_back_to_placeholder() {
        let text = "구분,2019,2020,2021\n,100,120,150";
        let series = parse_series(text, "x.csv", &filter()).unwrap();
        assert_eq!(series.y_label, "수치");
        assert_eq!(series.points[0].original_label, "수치");
    }

    #[test]
    fn first_qualifying_header_wins() {
        // Two candidate headers; the upper one is used even though the
        // lower one also qualifies.
        let text = "제목,2010,2011,2012\n값,1,2,3\n구분,2019,2020,2021\n인구,100,120,150";
        let series = parse_series(text, "x.csv", &filter()).unwrap();
        assert_eq!(series.points[0].label, "2010");
        assert_eq!(series.points[0].value, 1.0);
    }
}
