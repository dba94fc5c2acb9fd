//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 JSONL 파일 이름 필터링을 담당합니다.

use glob::Pattern;

use crate::error::{JMergeError, Result};

/// 기본 JSONL 파일 이름 패턴
pub const DEFAULT_PATTERN: &str = "*.jsonl";

/// 컴파일된 패턴 매처
pub struct PatternMatcher {
    pattern: Pattern,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 `*.jsonl`)
    ///
    /// # Returns
    /// 컴파일된 `PatternMatcher` 또는 에러
    ///
    /// # Examples
    /// ```
    /// use jmerge::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("part_*.jsonl")).unwrap();
    /// assert!(matcher.matches("part_01.jsonl"));
    /// assert!(!matcher.matches("other.jsonl"));
    /// ```
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let source = pattern.unwrap_or(DEFAULT_PATTERN);
        let pattern = Pattern::new(source).map_err(|_| JMergeError::InvalidPattern {
            pattern: source.to_string(),
        })?;

        Ok(Self { pattern })
    }

    /// 파일 이름이 패턴과 일치하는지 확인
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.matches(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_jsonl_only() {
        let matcher = PatternMatcher::new(None).unwrap();
        assert!(matcher.matches("data.jsonl"));
        assert!(matcher.matches("2024-01-01.jsonl"));
        assert!(!matcher.matches("data.json"));
        assert!(!matcher.matches("data.jsonl.bak"));
    }

    #[test]
    fn test_pattern_matcher_with_question_mark() {
        let matcher = PatternMatcher::new(Some("shard?.jsonl")).unwrap();
        assert!(matcher.matches("shard1.jsonl"));
        assert!(!matcher.matches("shard.jsonl"));
        assert!(!matcher.matches("shard12.jsonl"));
    }

    #[test]
    fn test_pattern_matcher_with_brackets() {
        let matcher = PatternMatcher::new(Some("file[0-9].jsonl")).unwrap();
        assert!(matcher.matches("file1.jsonl"));
        assert!(!matcher.matches("fileA.jsonl"));
    }

    #[test]
    fn test_pattern_matcher_invalid() {
        let result = PatternMatcher::new(Some("[invalid"));
        assert!(matches!(
            result,
            Err(JMergeError::InvalidPattern { pattern }) if pattern == "[invalid"
        ));
    }
}
