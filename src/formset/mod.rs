//! Dynamic indexed form-block manager.
//!
//! Owns the ordered collection of repeatable sub-forms for one namespace and keeps three things
//! in agreement after every call: each block's position, the index baked into each field's
//! identifier and submission name, and the external [`ManagementRecord`].
//!
//! Indices of dynamic blocks always form the contiguous range
//! `non_dynamic..non_dynamic + dynamic_count()`; removal closes gaps instead of leaving
//! tombstones.

pub mod block;
pub mod error;
pub mod ident;
pub mod record;

pub use block::{BlockField, BlockHandle, BlockTemplate, FieldKind, FieldSpec, FormBlock, ReindexSet, Reindexable};
pub use error::FormsetError;
pub use record::ManagementRecord;

use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Everything the page hands over at construction.
#[derive(Clone, Debug)]
pub struct FormsetSetup {
    pub namespace: String,
    pub id_prefix: String,
    pub fields: Vec<FieldSpec>,
    // Values of the already-submitted blocks, keyed by field role
    pub bound: Vec<BTreeMap<String, String>>,
    pub initial_empty: usize,
    pub record: ManagementRecord,
    pub reindex: ReindexSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveStatus {
    Removed,
    // Exactly one dynamic block left; nothing changed
    AtFloor,
}

#[derive(Debug)]
pub struct FormsetManager {
    namespace: String,
    reindex: ReindexSet,
    template: BlockTemplate,
    bound: Vec<FormBlock>,
    blocks: Vec<FormBlock>,
    record: ManagementRecord,
    non_dynamic: usize,
    next_handle: u64,
    trigger_re: Regex,
}

impl FormsetManager {
    pub fn new(setup: FormsetSetup) -> Result<Self, FormsetError> {
        let FormsetSetup {
            namespace,
            id_prefix,
            fields,
            bound,
            initial_empty,
            record,
            reindex,
        } = setup;

        if namespace.trim().is_empty() || namespace.chars().any(char::is_whitespace) {
            return Err(FormsetError::Configuration(format!(
                "namespace must be a non-empty token, got '{namespace}'"
            )));
        }
        if fields.is_empty() {
            return Err(FormsetError::Configuration(
                "empty block template has no fields".into(),
            ));
        }
        let mut roles = HashSet::new();
        for f in &fields {
            if f.role.is_empty() {
                return Err(FormsetError::Configuration("field with empty role".into()));
            }
            if !roles.insert(f.role.as_str()) {
                return Err(FormsetError::Configuration(format!(
                    "duplicate field role '{}'",
                    f.role
                )));
            }
        }
        if initial_empty == 0 {
            return Err(FormsetError::Configuration(
                "at least one empty block is required".into(),
            ));
        }
        let total = usize::try_from(record.total_count).map_err(|_| {
            FormsetError::Configuration(format!(
                "negative total count {}",
                record.total_count
            ))
        })?;
        if total < initial_empty {
            return Err(FormsetError::Configuration(format!(
                "total count {total} is smaller than the {initial_empty} empty block(s)"
            )));
        }
        let non_dynamic = total - initial_empty;
        if bound.len() != non_dynamic {
            return Err(FormsetError::Configuration(format!(
                "expected {non_dynamic} bound block(s) from the management record, got {}",
                bound.len()
            )));
        }
        let trigger_re = Regex::new(&ident::trigger_pattern(&namespace))
            .map_err(|e| FormsetError::Configuration(format!("trigger pattern: {e}")))?;

        // The template is the last empty block on the page, i.e. the last form overall.
        let template = BlockTemplate::capture(&namespace, &id_prefix, total - 1, &fields);

        let mut mgr = Self {
            namespace,
            reindex,
            template,
            bound: Vec::with_capacity(non_dynamic),
            blocks: Vec::with_capacity(initial_empty),
            record,
            non_dynamic,
            next_handle: 0,
            trigger_re,
        };

        for (index, values) in bound.into_iter().enumerate() {
            // Server-rendered blocks always carry fully indexed attributes.
            let mut fields = mgr.template.stamp(index, &ReindexSet::all());
            for (role, value) in values {
                let Some(fld) = fields.iter_mut().find(|f| f.role == role) else {
                    return Err(FormsetError::Configuration(format!(
                        "bound block {index} sets unknown field '{role}'"
                    )));
                };
                fld.value = value;
            }
            let handle = mgr.fresh_handle();
            mgr.bound.push(FormBlock {
                handle,
                position: index,
                index,
                removable: false,
                container_id: ident::bound_container_id(&mgr.namespace, index),
                delete_trigger: None,
                fields,
            });
        }
        for position in 0..initial_empty {
            let block = mgr.materialize(position);
            mgr.blocks.push(block);
        }
        info!(
            namespace = %mgr.namespace,
            non_dynamic = mgr.non_dynamic,
            empty = initial_empty,
            total = mgr.record.total_count,
            "formset initialized"
        );
        Ok(mgr)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn record(&self) -> ManagementRecord {
        self.record
    }

    pub fn non_dynamic(&self) -> usize {
        self.non_dynamic
    }

    pub fn dynamic_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index the next added block will receive.
    pub fn next_index(&self) -> usize {
        self.non_dynamic + self.blocks.len()
    }

    pub fn template(&self) -> &BlockTemplate {
        &self.template
    }

    pub fn bound_blocks(&self) -> &[FormBlock] {
        &self.bound
    }

    pub fn blocks(&self) -> &[FormBlock] {
        &self.blocks
    }

    pub fn position_of(&self, handle: BlockHandle) -> Option<usize> {
        self.blocks.iter().position(|b| b.handle == handle)
    }

    pub fn block(&self, handle: BlockHandle) -> Option<&FormBlock> {
        self.blocks
            .iter()
            .chain(self.bound.iter())
            .find(|b| b.handle == handle)
    }

    /// Indices of the dynamic blocks in collection order.
    pub fn live_indices(&self) -> Vec<usize> {
        self.blocks.iter().map(|b| b.index).collect()
    }

    pub fn set_value(
        &mut self,
        handle: BlockHandle,
        role: &str,
        value: impl Into<String>,
    ) -> Result<(), FormsetError> {
        let block = self
            .blocks
            .iter_mut()
            .chain(self.bound.iter_mut())
            .find(|b| b.handle == handle)
            .ok_or(FormsetError::UnknownHandle(handle))?;
        let fld = block
            .field_mut(role)
            .ok_or_else(|| FormsetError::UnknownField(role.to_string()))?;
        fld.value = value.into();
        Ok(())
    }

    /// Set a value by its current submission name. Returns false when no field carries it.
    pub fn set_value_by_name(&mut self, name: &str, value: impl Into<String>) -> bool {
        let fld = self
            .bound
            .iter_mut()
            .chain(self.blocks.iter_mut())
            .flat_map(|b| b.fields.iter_mut())
            .find(|f| f.name == name);
        match fld {
            Some(f) => {
                f.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn add_block(&mut self) -> BlockHandle {
        let position = self.blocks.len();
        let block = self.materialize(position);
        let handle = block.handle;
        debug!(namespace = %self.namespace, index = block.index, %handle, "block added");
        self.blocks.push(block);
        self.update_management_record(true);
        handle
    }

    pub fn remove_block(&mut self, handle: BlockHandle) -> Result<RemoveStatus, FormsetError> {
        if self.at_floor() {
            return Ok(RemoveStatus::AtFloor);
        }
        let position = self
            .position_of(handle)
            .ok_or(FormsetError::UnknownHandle(handle))?;
        self.remove_at(position);
        Ok(RemoveStatus::Removed)
    }

    /// Remove the block whose delete trigger is `trigger_id`.
    ///
    /// The position is read from the trigger's trailing `-{index}` token, so trigger ids must be
    /// the ones this manager last assigned.
    pub fn remove_by_trigger(&mut self, trigger_id: &str) -> Result<RemoveStatus, FormsetError> {
        if self.at_floor() {
            return Ok(RemoveStatus::AtFloor);
        }
        let position = self.parse_trigger(trigger_id).inspect_err(|e| {
            warn!(namespace = %self.namespace, error = %e, "rejected delete trigger");
        })?;
        self.remove_at(position);
        Ok(RemoveStatus::Removed)
    }

    /// Every field of every block as `(submission name, value)`, management record first.
    pub fn submission(&self) -> Vec<(String, String)> {
        let mut out = vec![
            (
                ident::management_name(&self.namespace, "TOTAL_FORMS"),
                self.record.total_count.to_string(),
            ),
            (
                ident::management_name(&self.namespace, "MIN_NUM_FORMS"),
                self.record.min_required_count.to_string(),
            ),
        ];
        for b in self.bound.iter().chain(self.blocks.iter()) {
            for f in &b.fields {
                out.push((f.name.clone(), f.value.clone()));
            }
        }
        out
    }

    fn at_floor(&self) -> bool {
        self.blocks.len() <= 1
    }

    fn parse_trigger(&self, trigger_id: &str) -> Result<usize, FormsetError> {
        let caps = self
            .trigger_re
            .captures(trigger_id)
            .ok_or_else(|| FormsetError::InvariantViolation {
                id: trigger_id.to_string(),
                reason: format!("expected '{}-delete-<index>'", self.namespace),
            })?;
        let position: usize = caps[1]
            .parse()
            .map_err(|e| FormsetError::InvariantViolation {
                id: trigger_id.to_string(),
                reason: format!("bad index: {e}"),
            })?;
        if position >= self.blocks.len() {
            return Err(FormsetError::InvariantViolation {
                id: trigger_id.to_string(),
                reason: format!(
                    "index {position} outside {} live block(s)",
                    self.blocks.len()
                ),
            });
        }
        Ok(position)
    }

    fn fresh_handle(&mut self) -> BlockHandle {
        let h = BlockHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn materialize(&mut self, position: usize) -> FormBlock {
        let index = self.non_dynamic + position;
        let handle = self.fresh_handle();
        FormBlock {
            handle,
            position,
            index,
            removable: true,
            container_id: ident::container_id(&self.namespace, position),
            delete_trigger: Some(ident::delete_trigger_id(&self.namespace, position)),
            fields: self.template.stamp(index, &self.reindex),
        }
    }

    fn remove_at(&mut self, position: usize) {
        let removed = self.blocks.remove(position);
        debug!(
            namespace = %self.namespace,
            index = removed.index,
            handle = %removed.handle,
            "block removed"
        );
        self.renumber();
        self.update_management_record(false);
    }

    fn renumber(&mut self) {
        for (position, b) in self.blocks.iter_mut().enumerate() {
            let index = self.non_dynamic + position;
            b.position = position;
            b.index = index;
            b.container_id = ident::container_id(&self.namespace, position);
            b.delete_trigger = Some(ident::delete_trigger_id(&self.namespace, position));
            self.template.restamp(&mut b.fields, index, &self.reindex);
        }
    }

    fn update_management_record(&mut self, increment: bool) {
        self.record.step(increment);
    }
}
