//! jmerge - JSONL FOLDER MERGER & DEDUPLICATOR
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use jmerge::{
    cli::{Cli, Command, DedupeArgs, MergeArgs},
    collector::{discover_files, run_merge, validate_input, MergeOptions, OutputStatus},
    dedupe::run_dedupe,
    error::JMergeError,
    pattern::PatternMatcher,
    report::{display_name, write_error_log, ConsoleReporter, Reporter},
};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Merge(args) => run_merge_command(&args),
        Command::Dedupe(args) => run_dedupe_command(&args),
    }
}

/// merge 서브커맨드 실행
fn run_merge_command(args: &MergeArgs) -> Result<ExitCode> {
    print_merge_header(args);

    let options = MergeOptions::new()
        .with_pattern(args.pattern.clone())
        .with_max_depth(args.max_depth);

    let mut reporter = ConsoleReporter::new(args.verbose);

    if args.dry_run {
        let discovery = validate_input(&args.input)
            .and_then(|_| PatternMatcher::new(args.pattern.as_deref()))
            .map(|matcher| discover_files(&args.input, &matcher, args.max_depth));

        return match discovery {
            Ok(discovery) => {
                for error in &discovery.errors {
                    reporter.failure(error);
                }
                print_dry_run(&discovery.files);
                print_failures(reporter.failures(), args.verbose);
                write_log(args.log.as_deref(), reporter.failures())?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                reporter.failure(&e);
                abort_merge(args, &reporter, &e)
            }
        };
    }

    // 입력 폴더/패턴 에러는 run_merge 안에서 이미 보고됨
    let report = match run_merge(
        &args.input,
        &args.output,
        args.mode,
        &options,
        args.validate_only,
        &mut reporter,
    ) {
        Ok(report) => report,
        Err(e) => return abort_merge(args, &reporter, &e),
    };

    print_failures(reporter.failures(), args.verbose);
    write_log(args.log.as_deref(), reporter.failures())?;

    match report.output {
        OutputStatus::Written { .. } => Ok(ExitCode::SUCCESS),
        OutputStatus::Skipped => {
            if report.stats.failures() == 0 {
                println!("\n{} 모든 줄이 유효합니다!\n", "✅".bright_green());
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "\n{} {} 개의 항목에 오류가 있습니다.\n",
                    "⚠️".bright_yellow(),
                    report.stats.failures().to_string().red()
                );
                Ok(ExitCode::FAILURE)
            }
        }
        OutputStatus::Failed(_) => {
            println!(
                "\n{} 결과를 저장하지 못했습니다: {:?}\n",
                "❌".bright_red(),
                args.output
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// 병합을 시작하지 못한 경우: 로그를 남기고 실패 코드 반환
fn abort_merge(
    args: &MergeArgs,
    reporter: &ConsoleReporter,
    error: &JMergeError,
) -> Result<ExitCode> {
    write_log(args.log.as_deref(), reporter.failures())?;
    println!("\n{} 병합 실패: {}\n", "❌".bright_red(), error);
    Ok(ExitCode::FAILURE)
}

/// dedupe 서브커맨드 실행
fn run_dedupe_command(args: &DedupeArgs) -> Result<ExitCode> {
    let output = args.output_path();
    print_dedupe_header(args, &output);

    let mut reporter = ConsoleReporter::new(args.verbose);
    let result = run_dedupe(&args.input, &output, args.mode, &mut reporter);

    write_log(args.log.as_deref(), reporter.failures())?;

    match result {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            println!("\n{} 중복 제거 실패: {}\n", "❌".bright_red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// merge 헤더 출력
fn print_merge_header(args: &MergeArgs) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 JSONL FOLDER MERGER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);

    if !args.validate_only {
        println!("  {} 출력 파일: {:?}", "📄".bright_green(), args.output);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if args.max_depth != 1 {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), args.max_depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 병합 없음)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "유효성 검사 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// dedupe 헤더 출력
fn print_dedupe_header(args: &DedupeArgs, output: &Path) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🧹 JSON ARRAY DEDUPLICATOR".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 파일: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 파일: {:?}", "📄".bright_green(), output);

    if args.output.is_none() {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "출력 경로 미지정: 입력 파일을 덮어씁니다".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
}

/// 드라이런 출력
fn print_dry_run(files: &[PathBuf]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, display_name(path));
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 에러 목록 출력 (상세 모드에서는 이미 실시간으로 출력됨)
fn print_failures(failures: &[String], verbose: bool) {
    if failures.is_empty() || verbose {
        return;
    }

    println!("\n{}", "❌ 오류 목록:".bright_red());
    for failure in failures {
        println!("  {} {}", "•".red(), failure.dimmed());
    }
}

/// 에러 로그 파일 작성
fn write_log(log_path: Option<&Path>, failures: &[String]) -> Result<()> {
    if let Some(log_path) = log_path {
        write_error_log(log_path, failures)
            .with_context(|| format!("에러 로그 저장 실패: {:?}", log_path))?;
        println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);
    }
    Ok(())
}
