//! Error types for the locator
//!
//! 모든 에러를 중앙에서 관리

use crate::core::ModuleId;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Locator 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 모듈 관련
    // ========================================================================
    #[error("Module error: {0}")]
    Module(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(ModuleId),

    #[error("Type load error: {0}")]
    TypeLoad(#[from] TypeLoadError),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 호출자가 기본값으로 대체할 수 있는 "없음" 계열 에러인지 확인
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::ModuleNotFound(_)
                | Error::TypeLoad(TypeLoadError::NotFound { .. })
        )
    }

    /// 사용자에게 메시지만 보여줘도 되는 에러인지 확인 (입력/설정 문제)
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::ModuleNotFound(_)
                | Error::InvalidInput(_)
                | Error::Config(_)
                | Error::Module(_)
        )
    }
}

// ============================================================================
// TypeLoadError - 모듈 타입 로딩 실패
// ============================================================================

/// 모듈이 이름으로 타입을 로드하지 못했을 때의 에러
///
/// 로더가 실패를 캐시하고 이후 호출자에게 그대로 돌려주므로 `Clone`이 필요하다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeLoadError {
    #[error("type '{name}' is not visible from module {module}")]
    NotFound { name: String, module: ModuleId },

    #[error("type '{name}' was rejected by module {module}: {reason}")]
    Rejected {
        name: String,
        module: ModuleId,
        reason: String,
    },
}

impl TypeLoadError {
    pub fn not_found(name: impl Into<String>, module: ModuleId) -> Self {
        TypeLoadError::NotFound {
            name: name.into(),
            module,
        }
    }

    pub fn rejected(name: impl Into<String>, module: ModuleId, reason: impl Into<String>) -> Self {
        TypeLoadError::Rejected {
            name: name.into(),
            module,
            reason: reason.into(),
        }
    }

    /// 로드를 시도한 타입 이름
    pub fn type_name(&self) -> &str {
        match self {
            TypeLoadError::NotFound { name, .. } | TypeLoadError::Rejected { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::ModuleNotFound(ModuleId(3)).is_not_found());
        assert!(Error::from(TypeLoadError::not_found("a.B", ModuleId(1))).is_not_found());
        assert!(!Error::Config("bad".into()).is_not_found());
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(Error::Config("bad".into()).is_user_facing());
        assert!(Error::Module("no manifest".into()).is_user_facing());
        assert!(!Error::from(std::io::Error::other("disk")).is_user_facing());
        assert!(!Error::from(TypeLoadError::not_found("a.B", ModuleId(1))).is_user_facing());
    }

    #[test]
    fn test_type_load_error_display() {
        let err = TypeLoadError::not_found("com.example.Impl", ModuleId(7));
        assert_eq!(
            err.to_string(),
            "type 'com.example.Impl' is not visible from module 7"
        );
        assert_eq!(err.type_name(), "com.example.Impl");
    }
}
