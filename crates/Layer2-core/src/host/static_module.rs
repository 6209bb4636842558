//! Static Module - 메모리 상의 모듈

use super::{dir_path, owned_path, TypeSpace};
use locator_foundation::{
    Module, ModuleId, ResourceUrl, TypeHandle, TypeLoadError, DEFAULT_DESCRIPTOR_DIR,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};

/// 엔트리와 타입 공간을 메모리에 들고 있는 모듈
#[derive(Debug, Clone)]
pub struct StaticModule {
    id: ModuleId,
    name: String,
    entries: BTreeMap<String, Vec<u8>>,
    types: TypeSpace,
}

impl StaticModule {
    pub fn builder(id: u64) -> StaticModuleBuilder {
        let id = ModuleId(id);
        StaticModuleBuilder {
            module: StaticModule {
                id,
                name: format!("module-{}", id),
                entries: BTreeMap::new(),
                types: TypeSpace::default(),
            },
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
        }
    }

    pub fn types(&self) -> &TypeSpace {
        &self.types
    }
}

impl Module for StaticModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self, path: &str) -> std::io::Result<Vec<ResourceUrl>> {
        let dir = dir_path(path);
        let mut children = BTreeSet::new();

        for key in self.entries.keys() {
            let Some(rest) = key.strip_prefix(dir.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((sub, _)) if !sub.is_empty() => {
                    children.insert(format!("{}{}/", dir, sub));
                }
                Some(_) => {}
                None if !rest.is_empty() => {
                    children.insert(key.clone());
                }
                None => {}
            }
        }

        Ok(children
            .into_iter()
            .map(|path| ResourceUrl::for_entry(self.id, &path))
            .collect())
    }

    fn open(&self, url: &ResourceUrl) -> std::io::Result<Box<dyn Read + Send>> {
        let path = owned_path(self.id, url)?;
        match self.entries.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no entry {} in module {}", path, self.id),
            )),
        }
    }

    fn load_type(&self, name: &str) -> Result<TypeHandle, TypeLoadError> {
        self.types.load(self.id, name)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// StaticModule 빌더
pub struct StaticModuleBuilder {
    module: StaticModule,
    descriptor_dir: String,
}

impl StaticModuleBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.module.name = name.into();
        self
    }

    /// `service()`가 기술자를 놓을 디렉토리
    pub fn descriptor_dir(mut self, dir: impl AsRef<str>) -> Self {
        self.descriptor_dir = dir_path(dir.as_ref());
        self
    }

    /// 임의 경로의 엔트리
    pub fn entry(mut self, path: impl AsRef<str>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.as_ref().trim_start_matches('/').to_string();
        self.module.entries.insert(path, content.into());
        self
    }

    /// 기술자 디렉토리 아래의 서비스 기술자
    pub fn service(self, factory_id: &str, content: impl Into<Vec<u8>>) -> Self {
        let path = format!("{}{}", self.descriptor_dir, factory_id);
        self.entry(path, content)
    }

    /// 모듈이 정의하는 타입
    pub fn defines(mut self, type_name: impl Into<String>) -> Self {
        self.module.types.defined.insert(type_name.into());
        self
    }

    /// 다른 모듈에서 가져온 타입
    pub fn imports(mut self, type_name: impl Into<String>, origin: ModuleId) -> Self {
        self.module.types.imports.insert(type_name.into(), origin);
        self
    }

    /// 로드가 거부되는 타입
    pub fn rejects(mut self, type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.module
            .types
            .rejected
            .insert(type_name.into(), reason.into());
        self
    }

    pub fn build(self) -> StaticModule {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_entries_only() {
        let module = StaticModule::builder(1)
            .service("a.Svc", "a.Impl")
            .service("b.Svc", "b.Impl")
            .entry("META-INF/services/nested/c.Svc", "c.Impl")
            .entry("META-INF/other/d", "d")
            .build();

        let entries: Vec<String> = module
            .entries("META-INF/services")
            .unwrap()
            .into_iter()
            .map(|u| u.entry_path().unwrap_or_default().to_string())
            .collect();

        assert_eq!(
            entries,
            vec![
                "META-INF/services/a.Svc",
                "META-INF/services/b.Svc",
                "META-INF/services/nested/",
            ]
        );
    }

    #[test]
    fn test_open_entry() {
        let module = StaticModule::builder(2).service("a.Svc", "a.Impl").build();
        let url = ResourceUrl::for_entry(ModuleId(2), "META-INF/services/a.Svc");

        let mut content = String::new();
        module.open(&url).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "a.Impl");

        let foreign = ResourceUrl::for_entry(ModuleId(3), "META-INF/services/a.Svc");
        assert!(module.open(&foreign).is_err());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let module = StaticModule::builder(4).name("empty").build();
        assert!(module.entries("META-INF/services/").unwrap().is_empty());
        assert_eq!(module.name(), "empty");
    }
}
