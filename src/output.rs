//! 결과 파일 쓰기 모듈
//!
//! 레코드 시퀀스를 들여쓰기된 JSON 배열 하나로 저장합니다.
//! 같은 폴더의 임시 파일에 먼저 쓴 뒤 rename 하므로, 실패해도
//! 기존 출력 파일은 손상되지 않습니다.
//!
//! 새 파일은 일반 파일처럼 umask를 따른 권한으로 만들어지고,
//! 기존 파일을 덮어쓸 때는 그 파일의 권한을 그대로 이어받습니다.

use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

use crate::cli::WriteMode;
use crate::error::{JMergeError, Result};

/// 출력 모드 확인
pub fn check_output_mode(path: &Path, mode: WriteMode) -> Result<()> {
    if mode == WriteMode::Error && path.exists() {
        return Err(JMergeError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// 항목들을 JSON 배열로 직렬화하여 원자적으로 저장
///
/// 2칸 들여쓰기를 사용하며 비 ASCII 문자는 이스케이프하지 않습니다.
///
/// # Returns
/// 기록된 바이트 수
pub fn write_json_array<T: Serialize>(path: &Path, items: &[T], mode: WriteMode) -> Result<u64> {
    check_output_mode(path, mode)?;

    let write_error = |reason: String| JMergeError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = create_temp(dir, path).map_err(|e| write_error(e.to_string()))?;
    let mut writer = BufWriter::new(temp);

    serde_json::to_writer_pretty(&mut writer, items).map_err(|e| write_error(e.to_string()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| write_error(e.to_string()))?;

    let temp = writer
        .into_inner()
        .map_err(|e| write_error(e.error().to_string()))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| write_error(e.to_string()))?;
    let bytes = temp
        .as_file()
        .metadata()
        .map(|m| m.len())
        .map_err(|e| write_error(e.to_string()))?;

    temp.persist(path)
        .map_err(|e| write_error(e.error.to_string()))?;

    Ok(bytes)
}

/// 대상 경로 옆에 임시 파일 생성
///
/// tempfile 기본값(0600) 대신 0666에 umask를 적용하고,
/// 대상이 이미 있으면 그 권한을 복사합니다.
fn create_temp(dir: &Path, target: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".jmerge").suffix(".tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let temp = builder.tempfile_in(dir)?;
    if let Ok(existing) = fs::metadata(target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    Ok(temp)
}
