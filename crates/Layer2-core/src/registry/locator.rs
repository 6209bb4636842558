//! Locator - factory id → 후보 로더 목록 레지스트리
//!
//! 후보 목록은 최근 등록이 앞에 온다 (prepend). 조회는 읽기 락 아래에서
//! 후보 스냅샷만 뜨고, 로더 해석은 락 밖에서 한다.

use super::contract::Contract;
use super::overrides::{EnvOverrides, OverrideChain, OverrideSource};
use crate::loader::FactoryLoader;
use crate::scanner::RegistrationGroup;
use locator_foundation::{LocatorConfig, ResourceUrl, TypeHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// 서비스 팩토리 레지스트리
pub struct Locator {
    table: RwLock<HashMap<String, Vec<Arc<FactoryLoader>>>>,
    overrides: Arc<dyn OverrideSource>,
}

impl Locator {
    /// 환경 변수 override를 쓰는 레지스트리
    pub fn new() -> Self {
        Self::with_overrides(Arc::new(EnvOverrides))
    }

    pub fn with_overrides(overrides: Arc<dyn OverrideSource>) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            overrides,
        }
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        Self::with_overrides(Arc::new(OverrideChain::from_config(config)))
    }

    pub fn overrides(&self) -> &Arc<dyn OverrideSource> {
        &self.overrides
    }

    // ========================================================================
    // 등록 / 해제
    // ========================================================================

    /// 로더 등록
    ///
    /// 같은 위치의 로더가 이미 있으면 빼고 맨 앞에 다시 넣는다.
    pub fn register(&self, id: impl Into<String>, loader: Arc<FactoryLoader>) {
        let id = id.into();
        let mut table = self.table.write();
        Self::insert(&mut table, &id, loader);
    }

    /// 로더 해제 (위치로 비교, 없으면 아무 일도 없음)
    pub fn unregister(&self, id: &str, loader: &FactoryLoader) -> bool {
        let mut table = self.table.write();
        Self::remove(&mut table, id, loader.url())
    }

    /// 그룹 전체를 한 번의 쓰기 락으로 등록
    pub fn register_group(&self, group: &RegistrationGroup) {
        if group.is_empty() {
            return;
        }
        let mut table = self.table.write();
        for (id, loader) in group.entries() {
            Self::insert(&mut table, id, loader.clone());
        }
    }

    /// 그룹 전체를 한 번의 쓰기 락으로 해제, 제거된 로더 수
    pub fn unregister_group(&self, group: &RegistrationGroup) -> usize {
        if group.is_empty() {
            return 0;
        }
        let mut table = self.table.write();
        group
            .entries()
            .iter()
            .filter(|(id, loader)| Self::remove(&mut table, id, loader.url()))
            .count()
    }

    fn insert(
        table: &mut HashMap<String, Vec<Arc<FactoryLoader>>>,
        id: &str,
        loader: Arc<FactoryLoader>,
    ) {
        let candidates = table.entry(id.to_string()).or_default();
        candidates.retain(|existing| existing.url() != loader.url());
        debug!("Registered: {} -> {}", id, loader);
        candidates.insert(0, loader);
    }

    fn remove(
        table: &mut HashMap<String, Vec<Arc<FactoryLoader>>>,
        id: &str,
        url: &ResourceUrl,
    ) -> bool {
        let Some(candidates) = table.get_mut(id) else {
            return false;
        };
        let before = candidates.len();
        candidates.retain(|existing| existing.url() != url);
        let removed = candidates.len() != before;
        if candidates.is_empty() {
            table.remove(id);
        }
        if removed {
            debug!("Unregistered: {} -> {}", id, url);
        }
        removed
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 가장 적합한 구현 하나 (계약 검사 없음)
    pub fn locate(&self, id: &str) -> Option<TypeHandle> {
        self.locate_as(&Contract::named(id), id)
    }

    /// 가장 적합한 구현 하나
    ///
    /// override 값이 있으면 해석된 이름이 그 값과 같은 첫 후보, 없으면
    /// 해석에 성공하고 계약을 통과하는 첫 후보. 실패한 후보는 건너뛴다.
    pub fn locate_as(&self, contract: &Contract, id: &str) -> Option<TypeHandle> {
        let candidates = self.snapshot(id);
        if candidates.is_empty() {
            trace!("No candidates for {}", id);
            return None;
        }

        let pinned = self.overrides.lookup(id);
        if let Some(pinned) = &pinned {
            debug!("Override for {}: {} (via {})", id, pinned, self.overrides.name());
        }

        candidates.iter().find_map(|loader| {
            let handle = loader.resolve().ok()?;
            if let Some(pinned) = &pinned {
                if handle.name() != pinned {
                    return None;
                }
            }
            contract.accepts(loader).then_some(handle)
        })
    }

    /// 해석에 성공한 모든 구현 (등록 역순 = 최근 것부터)
    pub fn locate_all(&self, id: &str) -> Vec<TypeHandle> {
        self.locate_all_as(&Contract::named(id), id)
    }

    pub fn locate_all_as(&self, contract: &Contract, id: &str) -> Vec<TypeHandle> {
        self.snapshot(id)
            .iter()
            .filter_map(|loader| {
                let handle = loader.resolve().ok()?;
                contract.accepts(loader).then_some(handle)
            })
            .collect()
    }

    fn snapshot(&self, id: &str) -> Vec<Arc<FactoryLoader>> {
        self.table.read().get(id).cloned().unwrap_or_default()
    }

    // ========================================================================
    // 조회 (검사용)
    // ========================================================================

    /// 등록된 factory id (정렬됨)
    pub fn factory_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.table.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// factory id의 후보 위치 (우선순위 순)
    pub fn candidates(&self, id: &str) -> Vec<ResourceUrl> {
        self.snapshot(id)
            .iter()
            .map(|loader| loader.url().clone())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.table.read().contains_key(id)
    }

    /// 전체 (id, 로더) 쌍의 수
    pub fn len(&self) -> usize {
        self.table.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("factory_ids", &self.factory_ids())
            .field("overrides", &self.overrides.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticModule;
    use crate::registry::StaticOverrides;
    use locator_foundation::{Module, ModuleId};

    const SVC: &str = "com.example.Svc";

    fn provider(id: u64, implementation: &str) -> Arc<FactoryLoader> {
        let module: Arc<dyn Module> = Arc::new(
            StaticModule::builder(id)
                .service(SVC, implementation)
                .defines(implementation)
                .imports(SVC, ModuleId(100))
                .build(),
        );
        let url = ResourceUrl::for_entry(module.id(), &format!("META-INF/services/{}", SVC));
        Arc::new(FactoryLoader::new(SVC, url, module))
    }

    fn isolated() -> Locator {
        Locator::with_overrides(Arc::new(StaticOverrides::new()))
    }

    #[test]
    fn test_unknown_id_is_empty() {
        let locator = isolated();
        assert!(locator.locate("nothing.Here").is_none());
        assert!(locator.locate_all("nothing.Here").is_empty());
        assert!(locator.is_empty());
    }

    #[test]
    fn test_most_recent_wins() {
        let locator = isolated();
        locator.register(SVC, provider(1, "impl.A"));
        locator.register(SVC, provider(2, "impl.B"));

        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.B");
        let all: Vec<_> = locator
            .locate_all(SVC)
            .into_iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(all, vec!["impl.B", "impl.A"]);
    }

    #[test]
    fn test_reregistration_replaces() {
        let locator = isolated();
        let a = provider(1, "impl.A");
        locator.register(SVC, a.clone());
        locator.register(SVC, provider(2, "impl.B"));
        locator.register(SVC, a.clone());

        assert_eq!(locator.len(), 2);
        assert_eq!(locator.candidates(SVC)[0], *a.url());
        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.A");
    }

    #[test]
    fn test_unregister_by_url() {
        let locator = isolated();
        let a = provider(1, "impl.A");
        let b = provider(2, "impl.B");
        locator.register(SVC, a.clone());
        locator.register(SVC, b.clone());

        assert!(locator.unregister(SVC, &b));
        assert!(!locator.unregister(SVC, &b));
        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.A");

        assert!(locator.unregister(SVC, &a));
        assert!(!locator.contains(SVC));
        assert!(locator.factory_ids().is_empty());
    }

    #[test]
    fn test_failed_candidate_skipped() {
        let locator = isolated();
        locator.register(SVC, provider(1, "impl.A"));

        let broken: Arc<dyn Module> =
            Arc::new(StaticModule::builder(2).service(SVC, "impl.Missing").build());
        let url = ResourceUrl::for_entry(ModuleId(2), &format!("META-INF/services/{}", SVC));
        locator.register(SVC, Arc::new(FactoryLoader::new(SVC, url, broken)));

        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.A");
        assert_eq!(locator.locate_all(SVC).len(), 1);
    }

    #[test]
    fn test_override_pins_implementation() {
        let locator =
            Locator::with_overrides(Arc::new(StaticOverrides::new().with(SVC, "impl.A")));
        locator.register(SVC, provider(1, "impl.A"));
        locator.register(SVC, provider(2, "impl.B"));

        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.A");
        // locate_all은 override를 보지 않는다
        assert_eq!(locator.locate_all(SVC).len(), 2);
    }

    #[test]
    fn test_override_without_match() {
        let locator =
            Locator::with_overrides(Arc::new(StaticOverrides::new().with(SVC, "impl.Z")));
        locator.register(SVC, provider(1, "impl.A"));
        assert!(locator.locate(SVC).is_none());
    }

    #[test]
    fn test_contract_filters_candidates() {
        let locator = isolated();
        locator.register(SVC, provider(1, "impl.A"));

        let foreign: Arc<dyn Module> = Arc::new(
            StaticModule::builder(2)
                .service(SVC, "impl.B")
                .defines("impl.B")
                .imports(SVC, ModuleId(200))
                .build(),
        );
        let url = ResourceUrl::for_entry(ModuleId(2), &format!("META-INF/services/{}", SVC));
        locator.register(SVC, Arc::new(FactoryLoader::new(SVC, url, foreign)));

        let contract = Contract::defined_by(SVC, ModuleId(100));
        assert_eq!(locator.locate(SVC).unwrap().name(), "impl.B");
        assert_eq!(locator.locate_as(&contract, SVC).unwrap().name(), "impl.A");
        assert_eq!(locator.locate_all_as(&contract, SVC).len(), 1);
    }

    #[test]
    fn test_group_registration() {
        let module: Arc<dyn Module> = Arc::new(
            StaticModule::builder(9)
                .service("a.Svc", "a.Impl")
                .service("b.Svc", "b.Impl")
                .defines("a.Impl")
                .defines("b.Impl")
                .build(),
        );
        let group = crate::scanner::ModuleScanner::new().scan(&module);

        let locator = isolated();
        locator.register_group(&group);
        assert_eq!(locator.factory_ids(), vec!["a.Svc", "b.Svc"]);
        assert_eq!(locator.len(), 2);

        assert_eq!(locator.unregister_group(&group), 2);
        assert_eq!(locator.unregister_group(&group), 0);
        assert!(locator.is_empty());
    }
}
