use std::collections::HashMap;

use scheduler::FrameId;

use crate::backend::GraphicsBackend;
use crate::instance::RenderingInstance;
use crate::types::InstanceId;

/// Every live instance, keyed by id. Only the lifecycle manager mutates it.
pub struct InstanceDirectory<B: GraphicsBackend> {
    instances: HashMap<InstanceId, RenderingInstance<B>>,
}

impl<B: GraphicsBackend> Default for InstanceDirectory<B> {
    fn default() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }
}

impl<B: GraphicsBackend> InstanceDirectory<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn get(&self, id: &InstanceId) -> Option<&RenderingInstance<B>> {
        self.instances.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &InstanceId) -> Option<&mut RenderingInstance<B>> {
        self.instances.get_mut(id)
    }

    /// Ids in a stable order.
    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderingInstance<B>> {
        self.instances.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderingInstance<B>> {
        self.instances.values_mut()
    }

    /// Inserts a new instance; hands it back if the id is already taken.
    pub(crate) fn insert(
        &mut self,
        instance: RenderingInstance<B>,
    ) -> Result<&mut RenderingInstance<B>, RenderingInstance<B>> {
        use std::collections::hash_map::Entry;

        match self.instances.entry(instance.id().clone()) {
            Entry::Occupied(_) => Err(instance),
            Entry::Vacant(slot) => Ok(slot.insert(instance)),
        }
    }

    /// Instance whose live animation handle carries `frame`.
    pub(crate) fn find_by_frame(&mut self, frame: FrameId) -> Option<&mut RenderingInstance<B>> {
        self.instances
            .values_mut()
            .find(|instance| instance.animation_id() == Some(frame))
    }

    pub(crate) fn drain(&mut self) -> Vec<RenderingInstance<B>> {
        let mut drained: Vec<_> = self.instances.drain().map(|(_, instance)| instance).collect();
        drained.sort_by(|a, b| a.id().cmp(b.id()));
        drained
    }
}
