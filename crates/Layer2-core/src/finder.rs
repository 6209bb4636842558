//! Factory Finder - 호출자 관점의 구현 찾기 (fallback 체인)
//!
//! 순서:
//! 1. Locator (호출자 계약으로 검사)
//! 2. 호출자 모듈 자신의 서비스 기술자
//! 3. override 값 (호출자 모듈로 로드)
//! 4. 호출자가 준 기본 구현 이름 (호출자 모듈로 로드)

use crate::host::dir_path;
use crate::loader::FactoryLoader;
use crate::registry::{Contract, Locator, OverrideSource};
use locator_foundation::{Error, Module, ResourceUrl, Result, TypeHandle, DEFAULT_DESCRIPTOR_DIR};
use std::sync::Arc;
use tracing::{debug, warn};

/// 호출자 모듈에 묶인 구현 탐색기
pub struct FactoryFinder {
    locator: Arc<Locator>,
    context: Arc<dyn Module>,
    overrides: Arc<dyn OverrideSource>,
    descriptor_dir: String,
}

impl FactoryFinder {
    /// `context`는 호출자 자신의 모듈 (계약 타입과 fallback 로드에 사용)
    pub fn new(locator: Arc<Locator>, context: Arc<dyn Module>) -> Self {
        let overrides = locator.overrides().clone();
        Self {
            locator,
            context,
            overrides,
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
        }
    }

    pub fn with_descriptor_dir(mut self, dir: impl AsRef<str>) -> Self {
        self.descriptor_dir = dir_path(dir.as_ref());
        self
    }

    /// 호출자 모듈이 보는 계약 (타입이 안 보이면 이름만)
    pub fn contract(&self, id: &str) -> Contract {
        match self.context.load_type(id) {
            Ok(handle) => Contract::from_type(&handle),
            Err(_) => Contract::named(id),
        }
    }

    /// 구현 찾기
    pub fn find(&self, id: &str, fallback: Option<&str>) -> Result<TypeHandle> {
        // 1. Locator
        let contract = self.contract(id);
        if let Some(handle) = self.locator.locate_as(&contract, id) {
            return Ok(handle);
        }

        // 2. 호출자 모듈의 기술자
        let url = ResourceUrl::for_entry(
            self.context.id(),
            &format!("{}{}", self.descriptor_dir, id),
        );
        let has_own = self
            .context
            .entries(&self.descriptor_dir)
            .map(|entries| entries.contains(&url))
            .unwrap_or(false);
        if has_own {
            let own = FactoryLoader::new(id, url, self.context.clone()).cache_failures(false);
            if let Ok(handle) = own.resolve() {
                return Ok(handle);
            }
        } else {
            debug!("Module {} has no own descriptor for {}", self.context.id(), id);
        }

        // 3. override
        if let Some(name) = self.overrides.lookup(id) {
            match self.context.load_type(&name) {
                Ok(handle) => return Ok(handle),
                Err(e) => warn!("Override {} for {} cannot be loaded: {}", name, id, e),
            }
        }

        // 4. 기본 구현
        match fallback {
            Some(name) => Ok(self.context.load_type(name)?),
            None => Err(Error::NotFound(format!(
                "Provider for {} cannot be found",
                id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticModule;
    use crate::registry::StaticOverrides;
    use locator_foundation::ModuleId;

    const SVC: &str = "com.example.Svc";

    fn locator(overrides: StaticOverrides) -> Arc<Locator> {
        Arc::new(Locator::with_overrides(Arc::new(overrides)))
    }

    fn caller() -> Arc<dyn Module> {
        Arc::new(
            StaticModule::builder(10)
                .imports(SVC, ModuleId(1))
                .defines("caller.Default")
                .defines("caller.Pinned")
                .build(),
        )
    }

    fn register(locator: &Locator, id: u64, implementation: &str, api: ModuleId) {
        let module: Arc<dyn Module> = Arc::new(
            StaticModule::builder(id)
                .service(SVC, implementation)
                .defines(implementation)
                .imports(SVC, api)
                .build(),
        );
        for (fid, loader) in crate::scanner::ModuleScanner::new().scan(&module).entries() {
            locator.register(fid.clone(), loader.clone());
        }
    }

    #[test]
    fn test_registry_hit() {
        let locator = locator(StaticOverrides::new());
        register(&locator, 2, "impl.A", ModuleId(1));

        let finder = FactoryFinder::new(locator, caller());
        assert_eq!(finder.find(SVC, None).unwrap().name(), "impl.A");
    }

    #[test]
    fn test_incompatible_provider_skipped() {
        let locator = locator(StaticOverrides::new());
        register(&locator, 2, "impl.Foreign", ModuleId(99));

        let finder = FactoryFinder::new(locator, caller());
        let found = finder.find(SVC, Some("caller.Default")).unwrap();
        assert_eq!(found.name(), "caller.Default");
        assert_eq!(found.origin(), ModuleId(10));
    }

    #[test]
    fn test_own_descriptor() {
        let context: Arc<dyn Module> = Arc::new(
            StaticModule::builder(11)
                .service(SVC, "caller.Bundled")
                .defines("caller.Bundled")
                .build(),
        );
        let finder = FactoryFinder::new(locator(StaticOverrides::new()), context);
        assert_eq!(finder.find(SVC, None).unwrap().name(), "caller.Bundled");
    }

    #[test]
    fn test_override_loaded_by_context() {
        let finder = FactoryFinder::new(
            locator(StaticOverrides::new().with(SVC, "caller.Pinned")),
            caller(),
        );
        assert_eq!(
            finder.find(SVC, Some("caller.Default")).unwrap().name(),
            "caller.Pinned"
        );
    }

    #[test]
    fn test_not_found() {
        let finder = FactoryFinder::new(locator(StaticOverrides::new()), caller());
        let err = finder.find(SVC, None).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Not found: Provider for com.example.Svc cannot be found"
        );
    }

    #[test]
    fn test_unloadable_fallback() {
        let finder = FactoryFinder::new(locator(StaticOverrides::new()), caller());
        let err = finder.find(SVC, Some("caller.Missing")).unwrap_err();
        assert!(matches!(err, Error::TypeLoad(_)));
    }
}
