//! Overrides - factory id를 특정 구현 타입으로 고정하는 외부 설정
//!
//! `locate()`는 factory id를 키로 override 값을 조회하고, 값이 있으면
//! 해석된 타입 이름이 그 값과 같은 후보만 돌려준다.

use locator_foundation::LocatorConfig;
use std::collections::BTreeMap;
use std::sync::Arc;

/// override 값 조회
pub trait OverrideSource: Send + Sync {
    /// 소스 이름 (디버깅용)
    fn name(&self) -> &str;

    /// factory id에 고정된 구현 타입 이름
    fn lookup(&self, factory_id: &str) -> Option<String>;
}

// ============================================================================
// 기본 소스들
// ============================================================================

/// 프로세스 환경 변수 (factory id = 변수 이름)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOverrides;

impl OverrideSource for EnvOverrides {
    fn name(&self) -> &str {
        "env"
    }

    fn lookup(&self, factory_id: &str) -> Option<String> {
        std::env::var(factory_id).ok().filter(|v| !v.is_empty())
    }
}

/// 고정 목록
#[derive(Debug, Clone, Default)]
pub struct StaticOverrides {
    pins: BTreeMap<String, String>,
}

impl StaticOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory_id: impl Into<String>, implementation: impl Into<String>) -> Self {
        self.pins.insert(factory_id.into(), implementation.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl From<BTreeMap<String, String>> for StaticOverrides {
    fn from(pins: BTreeMap<String, String>) -> Self {
        Self { pins }
    }
}

impl OverrideSource for StaticOverrides {
    fn name(&self) -> &str {
        "static"
    }

    fn lookup(&self, factory_id: &str) -> Option<String> {
        self.pins.get(factory_id).cloned()
    }
}

// ============================================================================
// OverrideChain
// ============================================================================

/// 여러 소스를 순서대로 조회 (먼저 찾은 값이 이김)
#[derive(Clone, Default)]
pub struct OverrideChain {
    sources: Vec<Arc<dyn OverrideSource>>,
}

impl OverrideChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정에서 체인 구성: 환경 변수(`consultEnv`일 때) → 설정의 고정 목록
    pub fn from_config(config: &LocatorConfig) -> Self {
        let mut chain = Self::new();
        if config.consult_env {
            chain = chain.with(Arc::new(EnvOverrides));
        }
        if !config.overrides.is_empty() {
            chain = chain.with(Arc::new(StaticOverrides::from(config.overrides.clone())));
        }
        chain
    }

    /// 체인 끝에 추가 (가장 낮은 우선순위)
    pub fn with(mut self, source: Arc<dyn OverrideSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// 체인 앞에 추가 (가장 높은 우선순위)
    pub fn prepend(mut self, source: Arc<dyn OverrideSource>) -> Self {
        self.sources.insert(0, source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

impl OverrideSource for OverrideChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn lookup(&self, factory_id: &str) -> Option<String> {
        self.sources.iter().find_map(|s| s.lookup(factory_id))
    }
}

impl std::fmt::Debug for OverrideChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideChain")
            .field("sources", &self.source_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_overrides() {
        let pins = StaticOverrides::new().with("a.Svc", "a.Impl");
        assert_eq!(pins.lookup("a.Svc").as_deref(), Some("a.Impl"));
        assert_eq!(pins.lookup("b.Svc"), None);
        assert_eq!(pins.len(), 1);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("test.overrides.EnvSvc", "test.overrides.EnvImpl");
        std::env::set_var("test.overrides.Blank", "");

        let env = EnvOverrides;
        assert_eq!(
            env.lookup("test.overrides.EnvSvc").as_deref(),
            Some("test.overrides.EnvImpl")
        );
        assert_eq!(env.lookup("test.overrides.Blank"), None);
        assert_eq!(env.lookup("test.overrides.Unset"), None);
    }

    #[test]
    fn test_chain_first_hit_wins() {
        let chain = OverrideChain::new()
            .with(Arc::new(StaticOverrides::new().with("a.Svc", "first")))
            .with(Arc::new(
                StaticOverrides::new()
                    .with("a.Svc", "second")
                    .with("b.Svc", "only"),
            ))
            .prepend(Arc::new(StaticOverrides::new().with("c.Svc", "top")));

        assert_eq!(chain.lookup("a.Svc").as_deref(), Some("first"));
        assert_eq!(chain.lookup("b.Svc").as_deref(), Some("only"));
        assert_eq!(chain.lookup("c.Svc").as_deref(), Some("top"));
        assert_eq!(chain.lookup("d.Svc"), None);
        assert_eq!(chain.source_names(), vec!["static", "static", "static"]);
    }

    #[test]
    fn test_chain_from_config() {
        let config = LocatorConfig::new()
            .consult_env(false)
            .with_override("x.Svc", "x.Impl");
        let chain = OverrideChain::from_config(&config);
        assert_eq!(chain.source_names(), vec!["static"]);
        assert_eq!(chain.lookup("x.Svc").as_deref(), Some("x.Impl"));

        let chain = OverrideChain::from_config(&LocatorConfig::new());
        assert_eq!(chain.source_names(), vec!["env"]);
    }
}
