//! jmerge - JSONL FOLDER MERGER & DEDUPLICATOR
//!
//! 폴더 내 JSONL 파일들을 하나의 JSON 배열로 병합하고,
//! 완전히 같은 레코드를 제거하는 2단계 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 📂 **병합**: 파일 이름 순 → 줄 순서대로 모든 JSON 값을 하나의 배열로 수집
//! - 🛡️ **장애 격리**: 깨진 줄은 그 줄만, 읽을 수 없는 파일은 그 파일만 건너뜀
//! - 🧹 **중복 제거**: 키 순서와 무관한 정규화 + BLAKE3 지문으로 첫 등장만 유지
//! - 💾 **원자적 저장**: 임시 파일에 쓴 뒤 rename, 비 ASCII 문자는 그대로 출력
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터링
//! - 🧪 **드라이런/유효성 검사 모드**
//! - 📝 **에러 로그**: 보고된 모든 실패를 파일로 저장
//!
//! # 예제
//!
//! ```bash
//! # 1단계: 병합
//! jmerge merge -i ./zips -o merged_dataset.json
//!
//! # 2단계: 중복 제거 (새 파일로 저장)
//! jmerge dedupe -i merged_dataset.json -o merged_dataset_unique.json
//! ```

pub mod cli;
pub mod collector;
pub mod dedupe;
pub mod error;
pub mod output;
pub mod pattern;
pub mod report;
pub mod stats;

// Re-exports for convenient access
pub use cli::{Cli, Command, DedupeArgs, MergeArgs, WriteMode};
pub use collector::{merge, run_merge, MergeOptions, MergeOutcome, MergeReport, OutputStatus};
pub use dedupe::{canonical_form, dedupe, run_dedupe, surviving_indices, DedupeOutcome, Fingerprint};
pub use error::{JMergeError, Result};
pub use pattern::PatternMatcher;
pub use report::{ConsoleReporter, RecordingReporter, Reporter};
pub use stats::{format_bytes, DedupeStats, MergeStats};
