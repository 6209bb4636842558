//! Module Scanner - 모듈의 서비스 기술자 스캔
//!
//! 기술자 디렉토리 바로 아래의 엔트리만 본다 (재귀하지 않음).
//! 엔트리의 마지막 `/` 이후 이름이 factory id가 된다.

use crate::loader::FactoryLoader;
use locator_foundation::{LocatorConfig, Module, ModuleId, DEFAULT_DESCRIPTOR_DIR};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// RegistrationGroup
// ============================================================================

/// 모듈 하나가 한 시점에 기여한 (factory id, 로더) 쌍들
#[derive(Debug, Clone)]
pub struct RegistrationGroup {
    module: ModuleId,
    entries: Vec<(String, Arc<FactoryLoader>)>,
}

impl RegistrationGroup {
    pub fn new(module: ModuleId) -> Self {
        Self {
            module,
            entries: Vec::new(),
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn push(&mut self, loader: Arc<FactoryLoader>) {
        self.entries
            .push((loader.factory_id().to_string(), loader));
    }

    pub fn entries(&self) -> &[(String, Arc<FactoryLoader>)] {
        &self.entries
    }

    pub fn factory_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// ModuleScanner
// ============================================================================

/// 모듈 스캐너
#[derive(Debug, Clone)]
pub struct ModuleScanner {
    descriptor_dir: String,
    cache_failures: bool,
}

impl ModuleScanner {
    pub fn new() -> Self {
        Self {
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
            cache_failures: true,
        }
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        Self {
            descriptor_dir: config.descriptor_dir.clone(),
            cache_failures: config.cache_failures,
        }
    }

    pub fn descriptor_dir(&self) -> &str {
        &self.descriptor_dir
    }

    /// 모듈의 현재 내용으로 등록 그룹 생성
    ///
    /// 엔트리 나열에 실패하면 빈 그룹을 돌려준다.
    pub fn scan(&self, module: &Arc<dyn Module>) -> RegistrationGroup {
        let mut group = RegistrationGroup::new(module.id());

        let entries = match module.entries(&self.descriptor_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to list {} in module {} ({}): {}",
                    self.descriptor_dir,
                    module.id(),
                    module.name(),
                    e
                );
                return group;
            }
        };

        let mut seen = HashSet::new();
        for url in entries {
            if url.is_directory() {
                continue;
            }
            let factory_id = url.base_name().to_string();
            if factory_id.is_empty() || !seen.insert(url.clone()) {
                continue;
            }

            debug!("Found descriptor {} in module {}", url, module.id());
            let loader = FactoryLoader::new(factory_id, url, module.clone())
                .cache_failures(self.cache_failures);
            group.push(Arc::new(loader));
        }

        debug!(
            "Scanned module {} ({}): {} descriptors",
            module.id(),
            module.name(),
            group.len()
        );
        group
    }
}

impl Default for ModuleScanner {
    fn default() -> Self {
        Self::new()
    }
}
