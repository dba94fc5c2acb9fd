//! JSONL 병합 모듈
//!
//! 폴더 내 JSONL 파일들을 이름 순으로 읽어, 파싱에 성공한 줄을
//! 파일 순서 → 줄 순서대로 하나의 레코드 시퀀스에 모읍니다.
//!
//! 줄 하나가 깨져도 해당 줄만 건너뛰고, 파일을 읽을 수 없으면
//! 그 파일 전체를 건너뜁니다. 어떤 경우에도 나머지 파일 처리는 계속됩니다.
//! 줄 끝은 `\n`, `\r\n`, `\r` 모두 인식합니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::WriteMode;
use crate::error::{JMergeError, Result};
use crate::output::write_json_array;
use crate::pattern::PatternMatcher;
use crate::report::Reporter;
use crate::stats::MergeStats;

/// 대용량 파일 임계값 기본값 (이상이면 메모리 매핑 사용)
pub const DEFAULT_MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 병합 옵션
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// 파일 이름 패턴 (None이면 `*.jsonl`)
    pub pattern: Option<String>,
    /// 최대 폴더 탐색 깊이
    pub max_depth: usize,
    /// 대용량 파일 임계값
    pub mmap_threshold: u64,
}

impl MergeOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            pattern: None,
            max_depth: 1,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }

    /// 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 탐색 깊이 설정
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// 병합 결과
#[derive(Debug)]
pub struct MergeOutcome {
    /// 파일 → 줄 순서로 모인 레코드
    pub records: Vec<Value>,
    pub stats: MergeStats,
}

/// 결과 파일 저장 상태
#[derive(Debug)]
pub enum OutputStatus {
    /// 저장 성공
    Written { path: PathBuf, bytes: u64 },
    /// 저장 실패 (보고 완료)
    Failed(JMergeError),
    /// 저장하지 않음 (유효성 검사 모드)
    Skipped,
}

impl OutputStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, OutputStatus::Failed(_))
    }
}

/// 병합 실행 보고서
#[derive(Debug)]
pub struct MergeReport {
    pub stats: MergeStats,
    pub output: OutputStatus,
}

/// 파일 하나를 처리한 결과
#[derive(Debug, Default)]
pub struct FileOutcome {
    /// 파싱에 성공한 레코드
    pub records: Vec<Value>,
    /// 파싱 실패한 줄 수
    pub failed_lines: usize,
    /// 읽은 바이트
    pub bytes_read: u64,
}

impl FileOutcome {
    /// 한 줄 파싱 (공백뿐이면 무시, 실패하면 보고)
    fn parse_line(
        &mut self,
        path: &Path,
        line_no: usize,
        line: &str,
        reporter: &mut dyn Reporter,
    ) {
        let text = line.trim();
        if text.is_empty() {
            return;
        }

        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.records.push(value),
            Err(e) => {
                self.failed_lines += 1;
                reporter.failure(&JMergeError::LineParse {
                    file: path.to_path_buf(),
                    line: line_no,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// 파일 수준 실패로 전환 (이미 보고된 줄 실패 수는 유지)
    fn fail(self, error: JMergeError) -> FileFailure {
        FileFailure {
            error,
            failed_lines: self.failed_lines,
        }
    }
}

/// 파일 수준 실패
#[derive(Debug)]
pub struct FileFailure {
    pub error: JMergeError,
    /// 실패 전까지 보고된 줄 파싱 실패 수
    pub failed_lines: usize,
}

/// 파일 탐색 결과
#[derive(Debug, Default)]
pub struct Discovery {
    /// 병합 대상 파일 (경로 사전순)
    pub files: Vec<PathBuf>,
    /// 탐색 중 발생한 에러
    pub errors: Vec<JMergeError>,
}

/// 입력 경로 유효성 검사
pub fn validate_input(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(JMergeError::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    if !input_dir.is_dir() {
        return Err(JMergeError::NotADirectory {
            path: input_dir.to_path_buf(),
        });
    }

    Ok(())
}

/// 병합 대상 파일 수집
///
/// 패턴과 일치하는 파일(심볼릭 링크는 대상 기준)을 모아 경로 사전순으로 정렬합니다.
/// 대상이 없는 링크는 목록에 남겨 읽기 단계에서 실패로 보고되게 하고,
/// 폴더 탐색 에러는 버리지 않고 `errors`에 모읍니다.
pub fn discover_files(
    input_dir: &Path,
    matcher: &PatternMatcher,
    max_depth: usize,
) -> Discovery {
    let mut discovery = Discovery::default();

    for entry in WalkDir::new(input_dir).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                discovery.errors.push(JMergeError::FileRead {
                    file: e.path().unwrap_or(input_dir).to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let name_matches = entry
            .file_name()
            .to_str()
            .map(|name| matcher.matches(name))
            .unwrap_or(false);
        if !name_matches {
            continue;
        }

        let path = entry.path();
        let dangling = entry.path_is_symlink() && fs::metadata(path).is_err();
        if path.is_file() || dangling {
            discovery.files.push(entry.into_path());
        }
    }

    discovery.files.sort();
    discovery
}

/// 폴더 내 JSONL 파일들을 하나의 레코드 시퀀스로 병합
///
/// 줄/파일/탐색 단위 실패는 `reporter`로 보고한 뒤 계속 진행하며,
/// 입력 폴더나 패턴 자체가 잘못된 경우에만 (보고 후) 에러를 반환합니다.
pub fn merge(
    input_dir: &Path,
    options: &MergeOptions,
    reporter: &mut dyn Reporter,
) -> Result<MergeOutcome> {
    let matcher = validate_input(input_dir)
        .and_then(|_| PatternMatcher::new(options.pattern.as_deref()))
        .map_err(|e| {
            reporter.failure(&e);
            e
        })?;

    let Discovery { files, errors } = discover_files(input_dir, &matcher, options.max_depth);
    for error in &errors {
        reporter.failure(error);
    }
    reporter.files_discovered(files.len());

    let mut stats = MergeStats::new(files.len());
    stats.discovery_errors = errors.len();
    let mut records = Vec::new();

    for path in &files {
        reporter.file_started(path);

        match read_file(path, options.mmap_threshold, reporter) {
            Ok(outcome) => {
                stats.files_processed += 1;
                stats.lines_failed += outcome.failed_lines;
                stats.bytes_read += outcome.bytes_read;
                records.extend(outcome.records);
            }
            Err(failure) => {
                stats.files_failed += 1;
                stats.lines_failed += failure.failed_lines;
                reporter.failure(&failure.error);
            }
        }

        reporter.file_finished(path);
    }

    stats.records = records.len();
    reporter.merge_finished(&stats);

    Ok(MergeOutcome { records, stats })
}

/// 병합 후 결과를 JSON 배열 파일로 저장
///
/// 저장 실패는 에러로 올리지 않고 보고한 뒤 `OutputStatus::Failed`로 돌려줍니다.
/// `validate_only`이면 파일을 쓰지 않습니다.
pub fn run_merge(
    input_dir: &Path,
    output: &Path,
    mode: WriteMode,
    options: &MergeOptions,
    validate_only: bool,
    reporter: &mut dyn Reporter,
) -> Result<MergeReport> {
    let MergeOutcome { records, mut stats } = merge(input_dir, options, reporter)?;

    if validate_only {
        return Ok(MergeReport {
            stats,
            output: OutputStatus::Skipped,
        });
    }

    let output = match write_json_array(output, &records, mode) {
        Ok(bytes) => {
            stats.bytes_written = bytes;
            reporter.saved(output, bytes);
            OutputStatus::Written {
                path: output.to_path_buf(),
                bytes,
            }
        }
        Err(e) => {
            reporter.failure(&e);
            OutputStatus::Failed(e)
        }
    };

    Ok(MergeReport { stats, output })
}

/// 단일 JSONL 파일 처리
///
/// 파일 크기가 임계값 이상이면 메모리 매핑, 아니면 버퍼 리더로 읽습니다.
/// 파일 수준 실패 시 그 파일에서 읽은 레코드는 모두 버려집니다.
pub fn read_file(
    path: &Path,
    mmap_threshold: u64,
    reporter: &mut dyn Reporter,
) -> std::result::Result<FileOutcome, FileFailure> {
    let file = File::open(path).map_err(|e| FileOutcome::default().fail(file_error(path, e)))?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut outcome = if file_size >= mmap_threshold && file_size > 0 {
        // 대용량 파일: 메모리 매핑 사용
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| {
            FileOutcome::default().fail(file_error(path, format!("메모리 매핑 실패: {}", e)))
        })?;
        let lines = mmap.split(|&b| b == b'\n').map(Ok::<_, io::Error>);
        collect_lines(path, lines, reporter)?
    } else {
        // 일반 파일: 버퍼 리더 사용
        let lines = BufReader::new(file).split(b'\n');
        collect_lines(path, lines, reporter)?
    };

    outcome.bytes_read = file_size;
    Ok(outcome)
}

/// `\n`으로 나뉜 바이트 조각들을 JSON 값으로 파싱
///
/// 각 조각 안의 `\r`도 줄 끝으로 취급합니다 (`\r\n`은 한 줄 끝).
/// 공백뿐인 줄은 건너뛰고, 파싱 실패한 줄은 보고 후 건너뜁니다.
/// 읽기 또는 UTF-8 디코딩 실패는 파일 수준 실패로 반환합니다.
pub fn collect_lines<I, B>(
    path: &Path,
    lines: I,
    reporter: &mut dyn Reporter,
) -> std::result::Result<FileOutcome, FileFailure>
where
    I: IntoIterator<Item = io::Result<B>>,
    B: AsRef<[u8]>,
{
    let mut outcome = FileOutcome::default();
    let mut line_no = 0;

    for chunk in lines {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => return Err(outcome.fail(file_error(path, e))),
        };
        let text = match std::str::from_utf8(bytes.as_ref()) {
            Ok(text) => text,
            Err(e) => {
                let reason = format!("{}번째 줄 UTF-8 디코딩 실패: {}", line_no + 1, e);
                return Err(outcome.fail(file_error(path, reason)));
            }
        };

        let text = text.strip_suffix('\r').unwrap_or(text);
        for line in text.split('\r') {
            line_no += 1;
            outcome.parse_line(path, line_no, line, reporter);
        }
    }

    Ok(outcome)
}

fn file_error(path: &Path, reason: impl ToString) -> JMergeError {
    JMergeError::FileRead {
        file: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn byte_lines(lines: &[&str]) -> Vec<io::Result<Vec<u8>>> {
        lines.iter().map(|l| Ok(l.as_bytes().to_vec())).collect()
    }

    #[test]
    fn test_collect_lines_skips_blank_and_bad() {
        let mut reporter = RecordingReporter::new();
        let lines = byte_lines(&[r#"{"a":1}"#, "   ", "", "bad json", "\t[1, 2]\r"]);

        let outcome = collect_lines(Path::new("x.jsonl"), lines, &mut reporter).unwrap();

        assert_eq!(outcome.records, vec![json!({"a": 1}), json!([1, 2])]);
        assert_eq!(outcome.failed_lines, 1);
        assert_eq!(reporter.failures.len(), 1);
        assert!(reporter.failures[0].contains("x.jsonl:4"));
    }

    #[test]
    fn test_collect_lines_scalars() {
        let mut reporter = RecordingReporter::new();
        let lines = byte_lines(&["1", "\"text\"", "null", "true"]);

        let outcome = collect_lines(Path::new("s.jsonl"), lines, &mut reporter).unwrap();

        assert_eq!(
            outcome.records,
            vec![json!(1), json!("text"), Value::Null, json!(true)]
        );
    }

    #[test]
    fn test_collect_lines_invalid_utf8_fails_file() {
        let mut reporter = RecordingReporter::new();
        let lines: Vec<io::Result<Vec<u8>>> =
            vec![Ok(br#"{"a":1}"#.to_vec()), Ok(vec![0xff, 0xfe, b'{'])];

        let result = collect_lines(Path::new("bin.jsonl"), lines, &mut reporter);

        assert!(matches!(
            result,
            Err(FileFailure {
                error: JMergeError::FileRead { .. },
                failed_lines: 0
            })
        ));
    }

    #[test]
    fn test_collect_lines_keeps_line_failures_on_file_failure() {
        let mut reporter = RecordingReporter::new();
        let lines: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"bad json".to_vec()),
            Ok(b"{\"a\":1}".to_vec()),
            Ok(vec![0xff]),
        ];

        let failure = collect_lines(Path::new("mixed.jsonl"), lines, &mut reporter).unwrap_err();

        assert_eq!(failure.failed_lines, 1);
        assert_eq!(reporter.failures.len(), 1);
        assert!(failure.error.to_string().contains("3번째 줄"));
    }

    #[test]
    fn test_collect_lines_carriage_return_endings() {
        let mut reporter = RecordingReporter::new();
        let lines = byte_lines(&["{\"a\":1}\r{\"a\":2}\r", "{\"a\":3}\r", "{\"a\":4}"]);

        let outcome = collect_lines(Path::new("cr.jsonl"), lines, &mut reporter).unwrap();

        assert_eq!(
            outcome.records,
            vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3}), json!({"a": 4})]
        );
        assert!(reporter.failures.is_empty());
    }

    #[test]
    fn test_collect_lines_read_error_fails_file() {
        let mut reporter = RecordingReporter::new();
        let lines: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"1".to_vec()),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
        ];

        let result = collect_lines(Path::new("io.jsonl"), lines, &mut reporter);

        match result {
            Err(FileFailure {
                error: JMergeError::FileRead { reason, .. },
                ..
            }) => assert!(reason.contains("disk gone")),
            other => panic!("FileRead 에러가 아님: {:?}", other),
        }
    }

    #[test]
    fn test_discover_files_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.jsonl"), "1").unwrap();
        fs::write(temp_dir.path().join("a.jsonl"), "1").unwrap();
        fs::write(temp_dir.path().join("c.json"), "1").unwrap();
        fs::create_dir(temp_dir.path().join("dir.jsonl")).unwrap();

        let matcher = PatternMatcher::new(None).unwrap();
        let discovery = discover_files(temp_dir.path(), &matcher, 1);

        assert!(discovery.errors.is_empty());
        let names: Vec<_> = discovery
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jsonl", "b.jsonl"]);
    }

    #[test]
    fn test_discover_files_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        let sub_dir = temp_dir.path().join("sub");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(temp_dir.path().join("root.jsonl"), "1").unwrap();
        fs::write(sub_dir.join("nested.jsonl"), "2").unwrap();

        let matcher = PatternMatcher::new(None).unwrap();

        assert_eq!(discover_files(temp_dir.path(), &matcher, 1).files.len(), 1);
        assert_eq!(discover_files(temp_dir.path(), &matcher, 2).files.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_files_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let input = temp_dir.path().join("input");
        fs::create_dir(&data_dir).unwrap();
        fs::create_dir(&input).unwrap();
        fs::write(data_dir.join("real.jsonl"), "1").unwrap();
        symlink(data_dir.join("real.jsonl"), input.join("link.jsonl")).unwrap();
        symlink(&data_dir, input.join("dir_link.jsonl")).unwrap();

        let matcher = PatternMatcher::new(None).unwrap();
        let discovery = discover_files(&input, &matcher, 1);

        assert_eq!(discovery.files, vec![input.join("link.jsonl")]);
    }

    #[test]
    fn test_read_file_mmap_and_reader_agree() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.jsonl");
        fs::write(&path, "{\"a\":1}\n\n{\"b\":\"é\"}\n").unwrap();

        let mut reporter = RecordingReporter::new();
        let buffered = read_file(&path, u64::MAX, &mut reporter).unwrap();
        let mapped = read_file(&path, 1, &mut reporter).unwrap();

        assert_eq!(buffered.records, mapped.records);
        assert_eq!(buffered.records.len(), 2);
        assert_eq!(mapped.bytes_read, fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_merge_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let mut reporter = RecordingReporter::new();

        let result = merge(
            &temp_dir.path().join("missing"),
            &MergeOptions::new(),
            &mut reporter,
        );

        assert!(matches!(result, Err(JMergeError::InputNotFound { .. })));
        assert_eq!(reporter.failures.len(), 1);
    }

    #[test]
    fn test_merge_input_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.jsonl");
        fs::write(&path, "1").unwrap();
        let mut reporter = RecordingReporter::new();

        let result = merge(&path, &MergeOptions::new(), &mut reporter);

        assert!(matches!(result, Err(JMergeError::NotADirectory { .. })));
        assert_eq!(reporter.failures.len(), 1);
    }

    #[test]
    fn test_merge_invalid_pattern_reported() {
        let temp_dir = TempDir::new().unwrap();
        let mut reporter = RecordingReporter::new();

        let options = MergeOptions::new().with_pattern(Some("[bad".to_string()));
        let result = merge(temp_dir.path(), &options, &mut reporter);

        assert!(matches!(result, Err(JMergeError::InvalidPattern { .. })));
        assert!(reporter.failures[0].contains("[bad"));
    }

    #[test]
    fn test_merge_options_builder() {
        let options = MergeOptions::new()
            .with_pattern(Some("*.ndjson".to_string()))
            .with_max_depth(3)
            .with_mmap_threshold(42);

        assert_eq!(options.pattern.as_deref(), Some("*.ndjson"));
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.mmap_threshold, 42);
    }
}
