//! Contract - 호출자가 기대하는 확장점 타입

use crate::loader::FactoryLoader;
use locator_foundation::{ModuleId, TypeHandle};
use std::fmt;
use tracing::debug;

/// 확장점 타입에 대한 호출자의 관점
///
/// `origin`이 있으면 후보의 소유 모듈이 같은 이름을 로드했을 때 같은 정의
/// 모듈의 타입을 얻어야 한다. 다른 버전의 동명 인터페이스로 빌드된 구현을
/// 걸러낸다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contract {
    name: String,
    origin: Option<ModuleId>,
}

impl Contract {
    /// 정의 모듈을 따지지 않는 계약
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: None,
        }
    }

    /// 특정 모듈이 정의한 타입에 대한 계약
    pub fn defined_by(name: impl Into<String>, origin: ModuleId) -> Self {
        Self {
            name: name.into(),
            origin: Some(origin),
        }
    }

    /// 호출자가 이미 로드한 타입에서 계약 생성
    pub fn from_type(handle: &TypeHandle) -> Self {
        Self::defined_by(handle.name(), handle.origin())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Option<ModuleId> {
        self.origin
    }

    /// 후보 로더의 소유 모듈이 이 계약과 호환되는지
    pub fn accepts(&self, loader: &FactoryLoader) -> bool {
        let Some(origin) = self.origin else {
            return true;
        };

        match loader.module().load_type(&self.name) {
            Ok(handle) if handle.origin() == origin => true,
            Ok(handle) => {
                debug!(
                    "Skipping {}: module {} sees {} from module {}, expected module {}",
                    loader,
                    loader.module_id(),
                    self.name,
                    handle.origin(),
                    origin
                );
                false
            }
            Err(e) => {
                debug!("Skipping {}: {}", loader, e);
                false
            }
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(f, "{}@{}", self.name, origin),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticModule;
    use locator_foundation::{Module, ResourceUrl};
    use std::sync::Arc;

    fn loader(module: StaticModule) -> FactoryLoader {
        let module: Arc<dyn Module> = Arc::new(module);
        let url = ResourceUrl::for_entry(module.id(), "META-INF/services/api.Svc");
        FactoryLoader::new("api.Svc", url, module)
    }

    #[test]
    fn test_named_accepts_anything() {
        let l = loader(StaticModule::builder(5).build());
        assert!(Contract::named("api.Svc").accepts(&l));
    }

    #[test]
    fn test_origin_must_match() {
        let api = ModuleId(1);
        let contract = Contract::defined_by("api.Svc", api);

        let compatible = loader(StaticModule::builder(2).imports("api.Svc", api).build());
        let foreign = loader(
            StaticModule::builder(3)
                .imports("api.Svc", ModuleId(99))
                .build(),
        );
        let blind = loader(StaticModule::builder(4).build());

        assert!(contract.accepts(&compatible));
        assert!(!contract.accepts(&foreign));
        assert!(!contract.accepts(&blind));
        assert_eq!(contract.to_string(), "api.Svc@1");
    }

    #[test]
    fn test_from_type() {
        let handle = TypeHandle::new("api.Svc", ModuleId(7));
        let contract = Contract::from_type(&handle);
        assert_eq!(contract.name(), "api.Svc");
        assert_eq!(contract.origin(), Some(ModuleId(7)));
    }
}
