use crate::stage::{Stage, StageReport, StageStatus};
use deen_domain::{Buffer, Direction};
use deen_plugins::{Plugin, PluginRegistry};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Plugin {plugin} has no inverse operation")]
    NotReversible { plugin: String },

    #[error("Plugin {plugin} is unavailable: prerequisites not met")]
    Unavailable { plugin: String },

    #[error("Stage index {index} out of range (chain has {len} stages)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An ordered sequence of plugin applications over a root buffer.
///
/// Stage `i` always consumes the output of stage `i - 1` (or the root for
/// stage 0). Any edit at position `i` marks stages `i..` pending and
/// re-executes them in order before returning, so outside of a mutating call
/// no stage is ever pending.
pub struct Chain {
    registry: Arc<PluginRegistry>,
    root: Buffer,
    stages: Vec<Stage>,
    last_run: Vec<StageReport>,
}

impl Chain {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self::with_root(registry, Buffer::new())
    }

    pub fn with_root(registry: Arc<PluginRegistry>, root: Buffer) -> Self {
        Self {
            registry,
            root,
            stages: Vec::new(),
            last_run: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    fn resolve(&self, key: &str, direction: Direction) -> Result<Arc<dyn Plugin>, ChainError> {
        let plugin = self
            .registry
            .lookup(key)
            .ok_or_else(|| ChainError::UnknownPlugin(key.to_string()))?;
        Self::check_capability(plugin.as_ref(), direction)?;
        Ok(Arc::clone(plugin))
    }

    fn check_capability(plugin: &dyn Plugin, direction: Direction) -> Result<(), ChainError> {
        if !plugin.prerequisites() {
            return Err(ChainError::Unavailable {
                plugin: plugin.name().to_string(),
            });
        }
        if direction == Direction::Reverse && !plugin.descriptor().reversible {
            return Err(ChainError::NotReversible {
                plugin: plugin.name().to_string(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize, len: usize) -> Result<(), ChainError> {
        if index < len {
            Ok(())
        } else {
            Err(ChainError::IndexOutOfRange {
                index,
                len: self.stages.len(),
            })
        }
    }

    /// Append a stage resolved by name or alias and run it. Returns its index.
    pub fn append(&mut self, key: &str, direction: Direction) -> Result<usize, ChainError> {
        let plugin = self.resolve(key, direction)?;
        Ok(self.push(plugin, direction))
    }

    /// Append a plugin that is not necessarily in the registry.
    pub fn append_plugin(
        &mut self,
        plugin: Arc<dyn Plugin>,
        direction: Direction,
    ) -> Result<usize, ChainError> {
        Self::check_capability(plugin.as_ref(), direction)?;
        Ok(self.push(plugin, direction))
    }

    fn push(&mut self, plugin: Arc<dyn Plugin>, direction: Direction) -> usize {
        self.stages.push(Stage::new(plugin, direction));
        let index = self.stages.len() - 1;
        self.execute_from(index);
        index
    }

    /// Insert a stage at `index` (`index == len()` appends) and re-run the suffix.
    pub fn insert(
        &mut self,
        index: usize,
        key: &str,
        direction: Direction,
    ) -> Result<(), ChainError> {
        self.check_index(index, self.stages.len() + 1)?;
        let plugin = self.resolve(key, direction)?;
        self.stages.insert(index, Stage::new(plugin, direction));
        self.invalidate_from(index);
        self.execute_from(index);
        Ok(())
    }

    /// Swap the plugin or direction of an existing stage and re-run from it.
    pub fn replace(
        &mut self,
        index: usize,
        key: &str,
        direction: Direction,
    ) -> Result<(), ChainError> {
        self.check_index(index, self.stages.len())?;
        let plugin = self.resolve(key, direction)?;
        self.stages[index] = Stage::new(plugin, direction);
        self.invalidate_from(index);
        self.execute_from(index);
        Ok(())
    }

    /// Delete a stage; every later stage is re-executed against the shorter prefix.
    pub fn remove(&mut self, index: usize) -> Result<Stage, ChainError> {
        self.check_index(index, self.stages.len())?;
        let removed = self.stages.remove(index);
        self.invalidate_from(index);
        self.execute_from(index);
        Ok(removed)
    }

    /// Replace the root buffer and re-run every stage.
    pub fn set_root(&mut self, root: Buffer) {
        self.root = root;
        self.rerun();
    }

    pub fn rerun(&mut self) {
        self.invalidate_from(0);
        self.execute_from(0);
    }

    pub fn clear(&mut self) {
        self.stages.clear();
        self.last_run.clear();
    }

    pub fn root(&self) -> &Buffer {
        &self.root
    }

    /// Output of the last stage, or the root buffer for an empty chain.
    pub fn final_output(&self) -> &Buffer {
        self.stages
            .iter()
            .rev()
            .find_map(Stage::output)
            .unwrap_or(&self.root)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn stage_status(&self, index: usize) -> Option<&StageStatus> {
        self.stages.get(index).map(Stage::status)
    }

    pub fn stage_output(&self, index: usize) -> Option<&Buffer> {
        self.stages.get(index).and_then(Stage::output)
    }

    /// The buffer stage `index` consumed.
    pub fn stage_input(&self, index: usize) -> Option<&Buffer> {
        match index {
            _ if index >= self.stages.len() => None,
            0 => Some(&self.root),
            _ => self.stages[index - 1].output(),
        }
    }

    pub fn failed_stages(&self) -> Vec<usize> {
        self.stages
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status().is_failed())
            .map(|(i, _)| i)
            .collect()
    }

    /// Reports from the most recent execution pass, in stage order.
    pub fn last_run(&self) -> &[StageReport] {
        &self.last_run
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    fn invalidate_from(&mut self, start: usize) {
        let pending = &mut self.stages[start..];
        for stage in pending.iter_mut() {
            stage.invalidate();
        }
        if !pending.is_empty() {
            debug!("Invalidated {} stages from index {}", pending.len(), start);
        }
    }

    /// Strictly sequential: stage `i` starts only once stage `i - 1` has settled.
    fn execute_from(&mut self, start: usize) {
        self.last_run.clear();
        for index in start..self.stages.len() {
            let (done, rest) = self.stages.split_at_mut(index);
            let input = done.last().and_then(Stage::output).unwrap_or(&self.root);
            let report = rest[0].execute(index, input);
            self.last_run.push(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deen_domain::{Category, PluginDescriptor};
    use deen_plugins::{PluginError, Result};

    fn registry() -> Arc<PluginRegistry> {
        Arc::new(PluginRegistry::with_builtins().unwrap())
    }

    fn chain_with(root: &[u8]) -> Chain {
        Chain::with_root(registry(), Buffer::from(root))
    }

    #[test]
    fn test_empty_chain_returns_root() {
        let mut chain = Chain::new(registry());
        chain.set_root(Buffer::from(b"hello"));
        assert_eq!(chain.final_output().as_bytes(), b"hello");
        assert!(chain.is_empty());
    }

    #[test]
    fn test_hex_then_reverse_restores_root() {
        let mut chain = chain_with(b"hello");
        chain.append("hex", Direction::Forward).unwrap();
        assert_eq!(chain.final_output().as_bytes(), b"68656c6c6f");
        chain.append("hex", Direction::Reverse).unwrap();
        assert_eq!(chain.final_output(), chain.root());
    }

    #[test]
    fn test_stage_input_is_previous_output() {
        let mut chain = chain_with(b"hi");
        chain.append("hex", Direction::Forward).unwrap();
        chain.append("base64", Direction::Forward).unwrap();

        assert_eq!(chain.stage_input(0), Some(chain.root()));
        assert_eq!(chain.stage_input(1), chain.stage_output(0));
        assert_eq!(chain.stage_output(1).unwrap().as_bytes(), b"Njg2OQ==");
        assert_eq!(chain.stage_input(2), None);
    }

    #[test]
    fn test_failed_stage_is_transparent() {
        let mut chain = chain_with(b"{bad json");
        let index = chain.append("json_formatter", Direction::Forward).unwrap();

        let status = chain.stage_status(index).unwrap();
        assert!(status.is_failed());
        assert!(matches!(status.error(), Some(PluginError::Format { .. })));
        assert_eq!(chain.stage_output(index), chain.stage_input(index));
        assert_eq!(chain.final_output().as_bytes(), b"{bad json");
    }

    #[test]
    fn test_failure_does_not_abort_downstream_stages() {
        let mut chain = chain_with(b"not hex!");
        chain.append("hex", Direction::Reverse).unwrap();
        chain.append("base64", Direction::Forward).unwrap();

        assert_eq!(chain.failed_stages(), vec![0]);
        assert!(chain.stage_status(1).unwrap().is_success());
        assert_eq!(chain.final_output().as_bytes(), b"bm90IGhleCE=");
    }

    #[test]
    fn test_earlier_results_survive_later_failure() {
        let mut chain = chain_with(br#"{"a":1}"#);
        chain.append("json_minify", Direction::Forward).unwrap();
        chain.append("base64", Direction::Reverse).unwrap();

        assert!(chain.stage_status(0).unwrap().is_success());
        assert!(chain.stage_status(1).unwrap().is_failed());
        assert_eq!(chain.stage_output(0).unwrap().as_bytes(), br#"{"a":1}"#);
        assert_eq!(chain.final_output().as_bytes(), br#"{"a":1}"#);
    }

    #[test]
    fn test_remove_cascades() {
        let mut chain = chain_with(b"abc");
        chain.append("hex", Direction::Forward).unwrap();
        chain.append("hex", Direction::Forward).unwrap();
        chain.append("hex", Direction::Reverse).unwrap();
        assert_eq!(chain.final_output().as_bytes(), b"616263");

        chain.remove(0).unwrap();
        // Remaining: hex forward then hex reverse on the root.
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.final_output().as_bytes(), b"abc");
        assert_eq!(chain.last_run().len(), 2);
    }

    #[test]
    fn test_remove_and_reinsert_restores_output() {
        let mut chain = chain_with(b"some bytes");
        chain.append("base64", Direction::Forward).unwrap();
        chain.append("url", Direction::Forward).unwrap();
        chain.append("sha256", Direction::Forward).unwrap();
        let before = chain.final_output().clone();

        chain.remove(1).unwrap();
        assert_ne!(chain.final_output(), &before);
        chain.insert(1, "url", Direction::Forward).unwrap();
        assert_eq!(chain.final_output(), &before);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut chain = chain_with(b"x");
        assert_eq!(
            chain.remove(0).unwrap_err(),
            ChainError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_insert_at_end_appends() {
        let mut chain = chain_with(b"x");
        chain.insert(0, "hex", Direction::Forward).unwrap();
        chain.insert(1, "hex", Direction::Forward).unwrap();
        assert_eq!(chain.final_output().as_bytes(), b"3738");
        assert!(matches!(
            chain.insert(5, "hex", Direction::Forward),
            Err(ChainError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_replace_reruns_suffix() {
        let mut chain = chain_with(b"hi");
        chain.append("hex", Direction::Forward).unwrap();
        chain.append("sha1", Direction::Forward).unwrap();
        let hashed_hex = chain.final_output().clone();

        chain.replace(0, "base64", Direction::Forward).unwrap();
        assert_ne!(chain.final_output(), &hashed_hex);
        assert_eq!(chain.stage_input(1).unwrap().as_bytes(), b"aGk=");
    }

    #[test]
    fn test_set_root_reruns_every_stage() {
        let mut chain = chain_with(b"a");
        chain.append("hex", Direction::Forward).unwrap();
        chain.append("base64", Direction::Forward).unwrap();

        chain.set_root(Buffer::from(b"b"));
        assert_eq!(chain.stage_output(0).unwrap().as_bytes(), b"62");
        assert_eq!(chain.final_output().as_bytes(), b"NjI=");
        assert_eq!(chain.last_run().len(), 2);
    }

    #[test]
    fn test_unknown_plugin() {
        let mut chain = chain_with(b"x");
        assert_eq!(
            chain.append("rot13", Direction::Forward).unwrap_err(),
            ChainError::UnknownPlugin("rot13".to_string())
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn test_reverse_of_one_way_plugin_rejected() {
        let mut chain = chain_with(b"x");
        let err = chain.append("sha1", Direction::Reverse).unwrap_err();
        assert_eq!(
            err,
            ChainError::NotReversible {
                plugin: "sha1".to_string()
            }
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn test_lookup_by_alias() {
        let mut chain = chain_with(b"{}");
        chain.append("json-format", Direction::Forward).unwrap();
        assert_eq!(chain.stage(0).unwrap().descriptor().name, "json_formatter");
        assert_eq!(chain.final_output().as_bytes(), b"{}");
    }

    struct Missing(PluginDescriptor);

    impl Plugin for Missing {
        fn descriptor(&self) -> &PluginDescriptor {
            &self.0
        }

        fn prerequisites(&self) -> bool {
            false
        }

        fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }
    }

    #[test]
    fn test_unavailable_plugin_rejected() {
        let mut chain = chain_with(b"x");
        let plugin = Arc::new(Missing(PluginDescriptor::new(
            "missing",
            "Missing",
            Category::Other,
        )));
        assert!(matches!(
            chain.append_plugin(plugin, Direction::Forward),
            Err(ChainError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_root() {
        let mut chain = chain_with(b"root");
        chain.append("hex", Direction::Forward).unwrap();
        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(chain.final_output().as_bytes(), b"root");
    }
}
