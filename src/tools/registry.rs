use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::core::tool::{Capability, DynTool};
use crate::infra::config::Config;
use crate::tools::{
    ExtractGbxTool, ExtractThumbnailTool, GbxHeaderToJsonTool, GbxToJsonTool, InspectBytesTool,
    TextStatsTool,
};

/// Builds a fresh tool instance for every batch.
pub type ToolFactory = Arc<dyn Fn() -> Arc<dyn DynTool> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ToolRegistry {
    by_key: Arc<HashMap<&'static str, ToolFactory>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under the key the factory's tool reports. A later registration replaces an earlier one.
    pub fn register<T, F>(&mut self, factory: F)
    where
        T: DynTool + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let key = factory().key();
        let map = Arc::make_mut(&mut self.by_key);
        map.insert(key, Arc::new(move || Arc::new(factory()) as Arc<dyn DynTool>));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn instantiate(&self, key: &str) -> Option<Arc<dyn DynTool>> {
        self.by_key.get(key).map(|factory| factory())
    }

    /// Registered tools, sorted by key.
    pub fn list(&self) -> Vec<ToolMeta> {
        let mut metas: Vec<ToolMeta> = self
            .by_key
            .values()
            .map(|factory| {
                let t = factory();
                ToolMeta {
                    key: t.key(),
                    name: t.name(),
                    description: t.description(),
                    capability: t.capability(),
                }
            })
            .collect();
        metas.sort_by_key(|m| m.key);
        metas
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMeta {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub capability: Capability,
}

/// Registry with every built-in tool.
pub fn build_registry(cfg: &Config) -> ToolRegistry {
    let pretty = cfg.pretty_json;
    let mut reg = ToolRegistry::new();
    reg.register(|| InspectBytesTool);
    reg.register(|| TextStatsTool);
    reg.register(|| ExtractGbxTool);
    reg.register(move || GbxToJsonTool::new(pretty));
    reg.register(move || GbxHeaderToJsonTool::new(pretty));
    reg.register(|| ExtractThumbnailTool);
    reg
}
