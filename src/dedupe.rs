//! 중복 제거 모듈
//!
//! JSON 배열의 각 요소를 정규화된 형태로 직렬화한 뒤 BLAKE3로 해시하여
//! 지문(fingerprint)을 만들고, 처음 등장한 지문의 요소만 순서대로 남깁니다.
//!
//! 정규화 규칙:
//! - 객체 키는 재귀적으로 코드 포인트 순 정렬
//! - 배열 순서는 그대로 유지
//! - 공백 없음
//! - 정수는 원문 그대로 (범위 제한 없음), 실수는 f64 최단 왕복 표현
//!   (`1.0`, `1.00`, `1e0`은 같은 값, `1`과 `1.0`은 다른 값)
//! - 문자열은 `"`, `\`, 제어 문자만 이스케이프

use memmap2::Mmap;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::cli::WriteMode;
use crate::collector::DEFAULT_MMAP_THRESHOLD;
use crate::error::{JMergeError, Result};
use crate::output::write_json_array;
use crate::report::Reporter;
use crate::stats::DedupeStats;

/// 레코드의 정규화된 내용에 대한 256비트 지문
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// 레코드의 지문 계산
    pub fn of(record: &Value) -> Self {
        Self(blake3::hash(canonical_form(record).as_bytes()))
    }

    /// 16진수 문자열 (64자)
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// 레코드의 정규화된 직렬화 형태
///
/// # Examples
/// ```
/// use jmerge::dedupe::canonical_form;
/// use serde_json::json;
///
/// assert_eq!(canonical_form(&json!({"b": [1, 2.5], "a": null})), r#"{"a":null,"b":[1,2.5]}"#);
/// ```
pub fn canonical_form(record: &Value) -> String {
    let mut out = String::new();
    write_canonical(record, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::String(s) => write_canonical_str(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_str(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// 숫자의 정규화된 텍스트
///
/// 원문이 정수 리터럴이면 그대로 두고(`-0`만 `0`으로), 실수 리터럴은
/// f64로 읽어 최단 표현으로 다시 씁니다. f64 범위를 넘는 실수는 원문을 씁니다.
fn canonical_number(n: &Number) -> String {
    let text = n.to_string();
    if !text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        return if text == "-0" { "0".to_string() } else { text };
    }

    match n.as_f64().and_then(Number::from_f64) {
        Some(normalized) => normalized.to_string(),
        None => text,
    }
}

fn write_canonical_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// 처음 등장한 요소들의 원래 인덱스 (오름차순)
pub fn surviving_indices(records: &[Value]) -> Vec<usize> {
    let mut seen: HashSet<Fingerprint> = HashSet::with_capacity(records.len());
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| seen.insert(Fingerprint::of(record)))
        .map(|(i, _)| i)
        .collect()
}

/// 중복 제거 결과
#[derive(Debug)]
pub struct DedupeOutcome {
    pub records: Vec<Value>,
    pub stats: DedupeStats,
}

/// 완전히 같은 레코드를 제거하고 첫 등장 순서를 유지
pub fn dedupe(records: Vec<Value>) -> DedupeOutcome {
    let mut stats = DedupeStats::new(records.len());
    let mut seen: HashSet<Fingerprint> = HashSet::with_capacity(records.len());

    let records: Vec<Value> = records
        .into_iter()
        .filter(|record| seen.insert(Fingerprint::of(record)))
        .collect();

    stats.final_count = records.len();
    DedupeOutcome { records, stats }
}

/// JSON 배열 파일 읽기
///
/// 열거나 읽을 수 없으면 `InputRead`, 유효한 JSON이 아니면 `InputParse`,
/// 최상위 값이 배열이 아니면 `InputShape`.
pub fn load_array(path: &Path) -> Result<Vec<Value>> {
    let read_error = |reason: String| JMergeError::InputRead {
        file: path.to_path_buf(),
        reason,
    };
    let parse_error = |e: serde_json::Error| {
        if e.is_io() {
            read_error(e.to_string())
        } else {
            JMergeError::InputParse {
                file: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    };

    let file = File::open(path).map_err(|e| read_error(e.to_string()))?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    let value: Value = if file_size >= DEFAULT_MMAP_THRESHOLD {
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| read_error(format!("메모리 매핑 실패: {}", e)))?;
        serde_json::from_slice(&mmap).map_err(parse_error)?
    } else {
        serde_json::from_reader(BufReader::new(file)).map_err(parse_error)?
    };

    match value {
        Value::Array(items) => Ok(items),
        other => Err(JMergeError::InputShape {
            file: path.to_path_buf(),
            found: kind_name(&other),
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 입력 파일 중복 제거 후 저장
///
/// 어떤 실패든 보고 후 에러로 반환하며, 이 경우 출력 파일은 건드리지 않습니다.
pub fn run_dedupe(
    input: &Path,
    output: &Path,
    mode: WriteMode,
    reporter: &mut dyn Reporter,
) -> Result<DedupeStats> {
    reporter.status(&format!("파일 읽는 중: {}", input.display()));

    let records = load_array(input).map_err(|e| {
        reporter.failure(&e);
        e
    })?;
    let bytes_read = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);

    let DedupeOutcome { records, mut stats } = dedupe(records);
    stats.bytes_read = bytes_read;

    let bytes = write_json_array(output, &records, mode).map_err(|e| {
        reporter.failure(&e);
        e
    })?;
    stats.bytes_written = bytes;

    reporter.dedupe_finished(&stats);
    reporter.saved(output, bytes);

    Ok(stats)
}
