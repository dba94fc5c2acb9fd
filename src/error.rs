//! 에러 타입 정의 모듈
//!
//! jmerge에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! 병합 단계의 줄/파일 단위 에러는 보고 후 복구되고,
//! 중복 제거 단계의 입력 에러는 치명적입니다.

use std::path::PathBuf;
use thiserror::Error;

/// jmerge에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum JMergeError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 경로를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// JSONL 한 줄 파싱 실패 (해당 줄만 건너뜀)
    #[error("JSON 파싱 실패 ({file}:{line}): {reason}")]
    LineParse {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    /// 파일 열기/읽기/디코딩 실패 (해당 파일 전체를 건너뜀)
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    FileRead { file: PathBuf, reason: String },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {reason}")]
    OutputWrite { path: PathBuf, reason: String },

    /// 입력 파일 열기/읽기 실패
    #[error("입력 파일을 읽을 수 없습니다 ({file}): {reason}")]
    InputRead { file: PathBuf, reason: String },

    /// 입력 파일이 유효한 JSON이 아님
    #[error("입력 JSON 파싱 실패 ({file}): {reason}")]
    InputParse { file: PathBuf, reason: String },

    /// 입력 최상위 값이 배열이 아님
    #[error("입력 파일은 JSON 배열이어야 합니다 ({file}): 최상위 값이 {found}입니다")]
    InputShape { file: PathBuf, found: &'static str },
}

impl JMergeError {
    /// 실행을 계속할 수 있는 에러인지 여부
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::LineParse { .. } | Self::FileRead { .. })
    }
}

/// jmerge 결과 타입 별칭
pub type Result<T> = std::result::Result<T, JMergeError>;
