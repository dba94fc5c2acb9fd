//! 진행 상황 보고 모듈
//!
//! 병합/중복 제거 로직은 전역 로거 대신 [`Reporter`]를 주입받아 상태를 알립니다.
//! 콘솔 출력은 [`ConsoleReporter`], 테스트는 [`RecordingReporter`]를 사용합니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::JMergeError;
use crate::stats::{format_bytes, format_duration, DedupeStats, MergeStats};

/// 상태 메시지를 받는 싱크
///
/// 필수 메서드는 `status`와 `failure` 두 개뿐이며, 나머지 훅은
/// 기본적으로 상태 문자열로 변환되어 `status`로 전달됩니다.
pub trait Reporter {
    /// 일반 상태 메시지
    fn status(&mut self, message: &str);

    /// 실패 보고 (복구 가능/불가능 모두)
    fn failure(&mut self, error: &JMergeError);

    /// 병합 대상 파일 발견
    fn files_discovered(&mut self, count: usize) {
        self.status(&format!("발견된 파일 수: {}", count));
    }

    /// 파일 처리 시작
    fn file_started(&mut self, path: &Path) {
        self.status(&format!("파일 처리 중: {}", display_name(path)));
    }

    /// 파일 처리 종료 (성공/실패 무관)
    fn file_finished(&mut self, _path: &Path) {}

    /// 병합 요약
    fn merge_finished(&mut self, stats: &MergeStats) {
        self.status(&format!(
            "파일 {}개 중 {}개 처리, 실패 파일 {}개, 실패 줄 {}개, 탐색 실패 {}개",
            stats.files_found,
            stats.files_processed,
            stats.files_failed,
            stats.lines_failed,
            stats.discovery_errors
        ));
        self.status(&format!("전체 객체 수: {}", stats.records));
    }

    /// 중복 제거 요약
    fn dedupe_finished(&mut self, stats: &DedupeStats) {
        self.status(&format!("초기 객체 수: {}", stats.initial_count));
        self.status(&format!("제거된 중복 수: {}", stats.removed()));
        self.status(&format!("남은 고유 객체 수: {}", stats.final_count));
    }

    /// 결과 파일 저장 완료
    fn saved(&mut self, path: &Path, bytes: u64) {
        self.status(&format!(
            "저장 완료: {} ({})",
            path.display(),
            format_bytes(bytes)
        ));
    }
}

/// 경로의 파일 이름만 표시용으로 추출
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 메모리에 메시지를 쌓아두는 리포터 (테스트용)
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub statuses: Vec<String>,
    pub failures: Vec<String>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 특정 문자열을 포함하는 상태 메시지가 있는지 확인
    pub fn has_status(&self, needle: &str) -> bool {
        self.statuses.iter().any(|s| s.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }

    fn failure(&mut self, error: &JMergeError) {
        self.failures.push(error.to_string());
    }
}

/// 컬러 콘솔 출력 + 진행률 바 리포터
pub struct ConsoleReporter {
    verbose: bool,
    progress: Option<ProgressBar>,
    failures: Vec<String>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress: None,
            failures: Vec::new(),
        }
    }

    /// 지금까지 보고된 실패 메시지
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// 진행률 바가 떠 있으면 바 위에, 아니면 바로 출력
    fn print_line(&self, line: String) {
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    fn print_rule(&self) {
        println!("{}", "═".repeat(50).bright_blue());
    }
}

impl Reporter for ConsoleReporter {
    fn status(&mut self, message: &str) {
        self.print_line(format!("  {} {}", "ℹ️".bright_blue(), message));
    }

    fn failure(&mut self, error: &JMergeError) {
        let message = error.to_string();
        if self.verbose || !error.is_recoverable() {
            self.print_line(format!("  {} {}", "❌".bright_red(), message.red()));
        }
        self.failures.push(message);
    }

    fn files_discovered(&mut self, count: usize) {
        println!(
            "  {} 발견된 파일 수: {}",
            "📋".bright_white(),
            count.to_string().bright_green()
        );

        if count > 0 {
            self.progress = Some(create_progress_bar(count));
        }
    }

    fn file_started(&mut self, path: &Path) {
        let name = display_name(path);
        if self.verbose {
            self.print_line(format!("  {} {}", "▶".cyan(), name));
        }
        if let Some(pb) = &self.progress {
            pb.set_message(name);
        }
    }

    fn file_finished(&mut self, _path: &Path) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn merge_finished(&mut self, stats: &MergeStats) {
        if let Some(pb) = self.progress.take() {
            pb.finish_with_message("완료!");
        }

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 병합 통계".bright_white().bold());
        self.print_rule();
        println!("  {} 전체 파일:    {}", "📁".bright_cyan(), stats.files_found);
        println!(
            "  {} 처리 파일:    {}",
            "✅".bright_green(),
            stats.files_processed.to_string().green()
        );
        print_failure_count("실패 파일:   ", stats.files_failed);
        print_failure_count("실패 줄:     ", stats.lines_failed);
        if stats.discovery_errors > 0 {
            print_failure_count("탐색 실패:   ", stats.discovery_errors);
        }
        println!(
            "  {} 전체 객체:    {}",
            "🧩".bright_white(),
            stats.records.to_string().bright_green()
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(stats.bytes_read)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(stats.elapsed())
        );
        self.print_rule();
    }

    fn dedupe_finished(&mut self, stats: &DedupeStats) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 🧹 중복 제거 결과".bright_white().bold());
        self.print_rule();
        println!(
            "  {} 초기 객체:    {}",
            "📁".bright_cyan(),
            stats.initial_count
        );
        println!(
            "  {} 제거된 중복:  {}",
            "🗑️".bright_yellow(),
            stats.removed().to_string().yellow()
        );
        println!(
            "  {} 고유 객체:    {}",
            "✅".bright_green(),
            stats.final_count.to_string().green()
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(stats.elapsed())
        );
        self.print_rule();
    }

    fn saved(&mut self, path: &Path, bytes: u64) {
        println!(
            "\n{} 저장 완료: {:?} ({})\n",
            "✅".bright_green(),
            path,
            format_bytes(bytes)
        );
    }
}

fn print_failure_count(label: &str, count: usize) {
    if count > 0 {
        println!("  {} {} {}", "❌".bright_red(), label, count.to_string().red());
    } else {
        println!("  {} {} {}", "✅".bright_green(), label, "0".green());
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

/// 에러 로그 파일 작성
pub fn write_error_log(log_path: &Path, failures: &[String]) -> std::io::Result<()> {
    let mut log_file = File::create(log_path)?;

    writeln!(log_file, "jmerge 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", failures.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for failure in failures {
        writeln!(log_file, "\n{}", failure)?;
    }

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
