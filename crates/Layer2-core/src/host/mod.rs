//! Host - 번들 호스트 구현
//!
//! - `local.rs` - 프로세스 내 ModuleHost (설치/해석/제거 + 이벤트 발행)
//! - `static_module.rs` - 메모리 상의 모듈 (빌더로 구성)
//! - `directory.rs` - 파일 시스템 디렉토리 기반 모듈 (`module.json` 매니페스트)

mod directory;
mod local;
mod static_module;

pub use directory::{DirectoryModule, ModuleManifest, MANIFEST_FILE};
pub use local::LocalHost;
pub use static_module::{StaticModule, StaticModuleBuilder};

use locator_foundation::{ModuleId, ResourceUrl, TypeHandle, TypeLoadError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// TypeSpace - 모듈 하나의 타입 공간
// ============================================================================

/// 모듈이 이름으로 볼 수 있는 타입들
///
/// - `defined`: 모듈 자신이 정의한 타입 (origin = 자기 자신)
/// - `imports`: 다른 모듈에서 가져온 타입 (origin = 정의 모듈)
/// - `rejected`: 보이지만 로드가 거부되는 타입 (이유 포함)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpace {
    #[serde(default)]
    pub defined: BTreeSet<String>,

    #[serde(default)]
    pub imports: BTreeMap<String, ModuleId>,

    #[serde(default)]
    pub rejected: BTreeMap<String, String>,
}

impl TypeSpace {
    /// `owner` 모듈의 관점에서 타입 로드
    pub fn load(&self, owner: ModuleId, name: &str) -> Result<TypeHandle, TypeLoadError> {
        if let Some(reason) = self.rejected.get(name) {
            return Err(TypeLoadError::rejected(name, owner, reason.clone()));
        }
        if self.defined.contains(name) {
            return Ok(TypeHandle::new(name, owner));
        }
        if let Some(origin) = self.imports.get(name) {
            return Ok(TypeHandle::new(name, *origin));
        }
        Err(TypeLoadError::not_found(name, owner))
    }
}

/// 디렉토리 경로 정규화 (`/`로 끝나게, 선행 `/` 제거)
pub(crate) fn dir_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

/// 이 모듈에 속한 위치인지 확인하고 내부 경로를 돌려줌
pub(crate) fn owned_path(owner: ModuleId, url: &ResourceUrl) -> std::io::Result<&str> {
    match (url.module_id(), url.entry_path()) {
        (Some(id), Some(path)) if id == owner => Ok(path),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not belong to module {}", url, owner),
        )),
    }
}
