use super::ident;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque identity of a block. Assigned from a counter, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHandle(pub(crate) u64);

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select { options: Vec<String> },
    TextArea,
    File,
}

impl FieldKind {
    pub fn target(&self) -> Reindexable {
        match self {
            FieldKind::Input => Reindexable::Input,
            FieldKind::Select { .. } => Reindexable::Select,
            FieldKind::TextArea => Reindexable::TextArea,
            FieldKind::File => Reindexable::File,
        }
    }
}

/// Attribute families the manager is allowed to rewrite on renumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reindexable {
    Input,
    Select,
    #[serde(alias = "text_area")]
    TextArea,
    File,
    Label,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReindexSet(BTreeSet<Reindexable>);

impl ReindexSet {
    pub fn all() -> Self {
        Self(
            [
                Reindexable::Input,
                Reindexable::Select,
                Reindexable::TextArea,
                Reindexable::File,
                Reindexable::Label,
            ]
            .into_iter()
            .collect(),
        )
    }

    pub fn only(targets: impl IntoIterator<Item = Reindexable>) -> Self {
        Self(targets.into_iter().collect())
    }

    pub fn covers(&self, kind: &FieldKind) -> bool {
        self.0.contains(&kind.target())
    }

    pub fn labels(&self) -> bool {
        self.0.contains(&Reindexable::Label)
    }
}

impl Default for ReindexSet {
    fn default() -> Self {
        Self::all()
    }
}

/// One field of the empty form as the page describes it.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub role: String,
    pub label: String,
    pub kind: FieldKind,
    pub default: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockField {
    pub role: String,
    pub label: String,
    pub kind: FieldKind,
    pub identifier: String,
    pub name: String,
    // `for` attribute of the field's label
    pub label_for: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormBlock {
    pub handle: BlockHandle,
    // Position inside its own list (bound or dynamic)
    pub position: usize,
    // Index used in identifiers and submission names
    pub index: usize,
    pub removable: bool,
    pub container_id: String,
    pub delete_trigger: Option<String>,
    pub fields: Vec<BlockField>,
}

impl FormBlock {
    pub fn field(&self, role: &str) -> Option<&BlockField> {
        self.fields.iter().find(|f| f.role == role)
    }

    pub fn field_mut(&mut self, role: &str) -> Option<&mut BlockField> {
        self.fields.iter_mut().find(|f| f.role == role)
    }
}

/// Deep copy of the last empty block, frozen at construction.
///
/// Its attributes carry `placeholder` as the index token; every new or renumbered block is
/// stamped from here, never from another live block.
#[derive(Clone, Debug)]
pub struct BlockTemplate {
    namespace: String,
    placeholder: usize,
    fields: Vec<BlockField>,
}

impl BlockTemplate {
    pub fn capture(namespace: &str, id_prefix: &str, placeholder: usize, specs: &[FieldSpec]) -> Self {
        let fields = specs
            .iter()
            .map(|s| {
                let identifier = ident::field_id(id_prefix, namespace, placeholder, &s.role);
                BlockField {
                    role: s.role.clone(),
                    label: s.label.clone(),
                    kind: s.kind.clone(),
                    name: ident::field_name(namespace, placeholder, &s.role),
                    label_for: identifier.clone(),
                    identifier,
                    value: s.default.clone(),
                }
            })
            .collect();
        Self {
            namespace: namespace.to_string(),
            placeholder,
            fields,
        }
    }

    pub fn placeholder(&self) -> usize {
        self.placeholder
    }

    /// Fresh field set for `index`, values taken from the template defaults.
    pub fn stamp(&self, index: usize, set: &ReindexSet) -> Vec<BlockField> {
        let mut fields = self.fields.clone();
        self.restamp(&mut fields, index, set);
        fields
    }

    /// Rewrite the attributes of `fields` for `index`, keeping their values.
    ///
    /// `fields` must have been stamped from this template (same order and length).
    pub fn restamp(&self, fields: &mut [BlockField], index: usize, set: &ReindexSet) {
        let (ns, from) = (self.namespace.as_str(), self.placeholder);
        for (fld, tmpl) in fields.iter_mut().zip(&self.fields) {
            if set.covers(&tmpl.kind) {
                fld.identifier = ident::reindex_attr(&tmpl.identifier, ns, from, index);
                fld.name = ident::reindex_attr(&tmpl.name, ns, from, index);
            } else {
                fld.identifier = tmpl.identifier.clone();
                fld.name = tmpl.name.clone();
            }
            fld.label_for = if set.labels() {
                ident::reindex_attr(&tmpl.label_for, ns, from, index)
            } else {
                tmpl.label_for.clone()
            };
        }
    }
}
