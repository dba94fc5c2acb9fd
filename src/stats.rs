//! 통계 및 유틸리티 모듈
//!
//! 병합/중복 제거 통계 수집 및 포맷팅을 담당합니다.

use std::time::{Duration, Instant};

/// 병합 단계 통계
#[derive(Debug, Clone)]
pub struct MergeStats {
    /// 발견된 파일 수
    pub files_found: usize,
    /// 정상 처리된 파일 수
    pub files_processed: usize,
    /// 읽기 실패로 건너뛴 파일 수
    pub files_failed: usize,
    /// 파싱 실패로 건너뛴 줄 수
    pub lines_failed: usize,
    /// 폴더 탐색 중 발생한 에러 수
    pub discovery_errors: usize,
    /// 병합된 레코드 수
    pub records: usize,
    /// 읽은 총 바이트
    pub bytes_read: u64,
    /// 쓴 총 바이트
    pub bytes_written: u64,
    /// 처리 시작 시간
    start_time: Instant,
}

impl MergeStats {
    /// 새 통계 인스턴스 생성
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            files_processed: 0,
            files_failed: 0,
            lines_failed: 0,
            discovery_errors: 0,
            records: 0,
            bytes_read: 0,
            bytes_written: 0,
            start_time: Instant::now(),
        }
    }

    /// 실패 항목(탐색 + 파일 + 줄) 총합
    pub fn failures(&self) -> usize {
        self.discovery_errors + self.files_failed + self.lines_failed
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// 중복 제거 단계 통계
#[derive(Debug, Clone)]
pub struct DedupeStats {
    /// 입력 레코드 수
    pub initial_count: usize,
    /// 남은 고유 레코드 수
    pub final_count: usize,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓴 바이트
    pub bytes_written: u64,
    start_time: Instant,
}

impl DedupeStats {
    pub fn new(initial_count: usize) -> Self {
        Self {
            initial_count,
            final_count: initial_count,
            bytes_read: 0,
            bytes_written: 0,
            start_time: Instant::now(),
        }
    }

    /// 제거된 중복 수
    pub fn removed(&self) -> usize {
        self.initial_count - self.final_count
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use jmerge::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
