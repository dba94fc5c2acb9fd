//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 병합 입력 폴더 기본값
pub const DEFAULT_INPUT_DIR: &str = "zips";
/// 병합 결과 파일 기본값 (중복 제거 입력 기본값이기도 함)
pub const DEFAULT_MERGED_FILE: &str = "merged_dataset.json";

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// jmerge CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "jmerge",
    author = "YourName <your@email.com>",
    version,
    about = "JSONL FOLDER MERGER & DEDUPLICATOR - JSONL 파일 병합 및 중복 제거 CLI 도구",
    long_about = r#"
JSONL FOLDER MERGER & DEDUPLICATOR
==================================

1단계 (merge): 폴더 내 모든 *.jsonl 파일을 이름 순으로 읽어
한 줄에 하나씩 JSON 값을 파싱하고, 하나의 JSON 배열 파일로 병합합니다.
깨진 줄은 보고 후 건너뛰고, 읽을 수 없는 파일은 파일 단위로 건너뜁니다.

2단계 (dedupe): JSON 배열 파일을 읽어 각 요소의 정규화된 형태를
해시하여, 처음 등장한 요소만 순서대로 남깁니다.

예제:
  jmerge merge -i ./zips -o merged_dataset.json
  jmerge merge -i ./zips --dry-run
  jmerge dedupe -i merged_dataset.json -o merged_dataset_unique.json
  jmerge dedupe -i merged_dataset.json            # 입력 파일을 덮어씀
"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// 실행 단계
#[derive(Subcommand, Debug)]
pub enum Command {
    /// 폴더 내 JSONL 파일들을 하나의 JSON 배열로 병합
    Merge(MergeArgs),
    /// JSON 배열에서 완전히 같은 레코드 제거
    Dedupe(DedupeArgs),
}

/// merge 서브커맨드 인자
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// JSONL 파일들이 있는 입력 폴더 경로
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,

    /// 생성될 JSON 배열 파일 경로
    #[arg(short, long, default_value = DEFAULT_MERGED_FILE)]
    pub output: PathBuf,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 파일 이름 패턴 필터 (glob 형식, 기본값: "*.jsonl")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 최대 폴더 탐색 깊이 (1 = 입력 폴더 바로 아래만)
    #[arg(long, default_value_t = 1)]
    pub max_depth: usize,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 병합 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// JSONL 유효성 검사만 수행 (출력 파일 없음)
    #[arg(long)]
    pub validate_only: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// dedupe 서브커맨드 인자
#[derive(Args, Debug, Clone)]
pub struct DedupeArgs {
    /// JSON 배열 입력 파일 경로
    #[arg(short, long, default_value = DEFAULT_MERGED_FILE)]
    pub input: PathBuf,

    /// 결과 파일 경로 (생략하면 입력 파일을 덮어씀)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl DedupeArgs {
    /// 실제 출력 경로 (기본값: 입력 경로)
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input.clone())
    }
}
