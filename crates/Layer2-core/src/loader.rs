//! Factory Loader - 서비스 기술자 하나에 대한 지연 로더
//!
//! 기술자 엔트리는 첫 줄에 구현 타입 이름을 담은 UTF-8 텍스트다.
//! 첫 `resolve()` 호출에서 엔트리를 읽고, 소유 모듈에게 타입 로드를
//! 위임한 뒤 결과를 캐시한다. 이후 호출은 리소스를 다시 읽지 않는다.

use locator_foundation::{Module, ModuleId, ResourceUrl, TypeHandle, TypeLoadError};
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// ResolveError
// ============================================================================

/// 로더 하나의 해석 실패
///
/// 캐시된 실패를 이후 호출자에게 그대로 돌려주므로 `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("descriptor {url} is unreadable: {reason}")]
    Unreadable { url: ResourceUrl, reason: String },

    #[error("descriptor {url} has an empty first line")]
    EmptyDescriptor { url: ResourceUrl },

    #[error(transparent)]
    TypeNotFound(#[from] TypeLoadError),
}

// ============================================================================
// FactoryLoader
// ============================================================================

/// 지연 팩토리 로더
///
/// 동일성은 해석된 타입이 아니라 기술자 위치(`url`)로 판단한다.
pub struct FactoryLoader {
    factory_id: String,
    url: ResourceUrl,
    module: Arc<dyn Module>,
    cache_failures: bool,

    /// 해석 결과 (한 번만 기록)
    resolved: OnceLock<Result<TypeHandle, ResolveError>>,

    /// 최초 해석 직렬화
    init: Mutex<()>,
}

impl FactoryLoader {
    pub fn new(factory_id: impl Into<String>, url: ResourceUrl, module: Arc<dyn Module>) -> Self {
        Self {
            factory_id: factory_id.into(),
            url,
            module,
            cache_failures: true,
            resolved: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// 실패 캐시 여부 설정 (false면 실패 시 다음 호출에서 재시도)
    pub fn cache_failures(mut self, cache: bool) -> Self {
        self.cache_failures = cache;
        self
    }

    pub fn factory_id(&self) -> &str {
        &self.factory_id
    }

    pub fn url(&self) -> &ResourceUrl {
        &self.url
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    pub fn module_id(&self) -> ModuleId {
        self.module.id()
    }

    /// 결과(성공 또는 캐시된 실패)가 기록되었는지
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// 구현 타입 해석
    ///
    /// 이미 기록된 결과가 있으면 리소스를 건드리지 않고 돌려준다.
    pub fn resolve(&self) -> Result<TypeHandle, ResolveError> {
        if let Some(result) = self.resolved.get() {
            return result.clone();
        }

        let _guard = self.init.lock();
        if let Some(result) = self.resolved.get() {
            return result.clone();
        }

        let result = self.load();
        match &result {
            Ok(handle) => {
                debug!(
                    factory_id = %self.factory_id,
                    module = %self.module.id(),
                    "Resolved {} to {}", self.url, handle
                );
            }
            Err(e) => {
                warn!(
                    factory_id = %self.factory_id,
                    module = %self.module.id(),
                    "Failed to resolve {}: {}", self.url, e
                );
            }
        }

        if result.is_ok() || self.cache_failures {
            let _ = self.resolved.set(result.clone());
        }
        result
    }

    fn load(&self) -> Result<TypeHandle, ResolveError> {
        let name = self.read_first_line()?;
        if name.is_empty() {
            return Err(ResolveError::EmptyDescriptor {
                url: self.url.clone(),
            });
        }
        Ok(self.module.load_type(&name)?)
    }

    /// 첫 줄만 읽는다 (줄바꿈 문자만 제거)
    fn read_first_line(&self) -> Result<String, ResolveError> {
        let unreadable = |e: std::io::Error| ResolveError::Unreadable {
            url: self.url.clone(),
            reason: e.to_string(),
        };

        let reader = self.module.open(&self.url).map_err(unreadable)?;
        let mut line = String::new();
        BufReader::new(reader)
            .read_line(&mut line)
            .map_err(unreadable)?;

        let end = line.find(['\r', '\n']).unwrap_or(line.len());
        line.truncate(end);
        Ok(line)
    }
}

impl PartialEq for FactoryLoader {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for FactoryLoader {}

impl Hash for FactoryLoader {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Display for FactoryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl fmt::Debug for FactoryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryLoader")
            .field("factory_id", &self.factory_id)
            .field("url", &self.url)
            .field("module", &self.module.id())
            .field("resolved", &self.resolved.get())
            .finish()
    }
}
