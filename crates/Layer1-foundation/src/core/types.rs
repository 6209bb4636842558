//! Core Types - 호스트 모듈 시스템과 주고받는 값 타입

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ModuleId
// ============================================================================

/// 모듈 식별자 (호스트가 부여, 재사용될 수 있음)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ModuleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// ResourceUrl - 모듈 내부 리소스 위치
// ============================================================================

/// 모듈 내부 엔트리의 위치
///
/// 로더의 동일성은 해석된 타입이 아니라 이 값으로 판단한다.
/// 디렉토리 엔트리는 `/`로 끝난다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUrl(String);

impl ResourceUrl {
    pub const SCHEME: &'static str = "module://";

    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// `module://<id>/<path>` 형태의 위치 생성
    pub fn for_entry(module: ModuleId, path: &str) -> Self {
        Self(format!("{}{}/{}", Self::SCHEME, module, path.trim_start_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 하위 디렉토리를 가리키는지
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// 마지막 `/` 이후의 이름
    pub fn base_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// 스킴과 모듈 식별자를 뗀 모듈 내부 경로
    pub fn entry_path(&self) -> Option<&str> {
        self.split().map(|(_, path)| path)
    }

    /// 위치가 가리키는 모듈
    pub fn module_id(&self) -> Option<ModuleId> {
        self.split().map(|(id, _)| id)
    }

    fn split(&self) -> Option<(ModuleId, &str)> {
        let rest = self.0.strip_prefix(Self::SCHEME)?;
        let (id, path) = rest.split_once('/')?;
        id.parse().ok().map(|id| (ModuleId(id), path))
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// TypeHandle - 해석된 구현 타입
// ============================================================================

/// 모듈이 이름으로 로드한 타입
///
/// `origin`은 이 타입을 정의한 모듈이다. 같은 이름이라도 정의 모듈이 다르면
/// 서로 다른 타입으로 취급된다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeHandle {
    name: String,
    origin: ModuleId,
}

impl TypeHandle {
    pub fn new(name: impl Into<String>, origin: ModuleId) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    /// 정규화된 타입 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 정의 모듈
    pub fn origin(&self) -> ModuleId {
        self.origin
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// ModuleState - 호스트가 보고하는 모듈 상태
// ============================================================================

/// 모듈 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// 설치됨 (타입 공간 미확정)
    Installed,
    /// 의존성 해석 완료
    Resolved,
    /// 시작 중
    Starting,
    /// 실행 중
    Active,
    /// 정지 중
    Stopping,
    /// 제거됨
    Uninstalled,
}

impl ModuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Resolved => "resolved",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Stopping => "stopping",
            Self::Uninstalled => "uninstalled",
        }
    }

    /// 타입을 로드할 수 있는 상태인지
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            Self::Resolved | Self::Starting | Self::Active | Self::Stopping
        )
    }

    /// 시작 시 스캔 대상이 되는 기본 상태 목록
    pub fn startup_defaults() -> Vec<ModuleState> {
        vec![Self::Resolved, Self::Starting, Self::Active, Self::Stopping]
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
