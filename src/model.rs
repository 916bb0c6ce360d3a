use crate::formset::{FieldKind, FieldSpec, FormsetSetup, ManagementRecord, ReindexSet, Reindexable};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKindName {
    #[default]
    Input,
    Select,
    #[serde(alias = "text_area")]
    Textarea,
    File,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FieldConfig {
    pub role: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKindName,
    // Select only
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateConfig {
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ManagementConfig {
    pub total_forms: i64,
    #[serde(default)]
    pub min_num_forms: i64,
    // Echoed into the payload unchanged
    #[serde(default)]
    pub initial_forms: Option<i64>,
    #[serde(default)]
    pub max_num_forms: Option<i64>,
}

/// Page description for one formset, as the server would have rendered it.
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,
    pub namespace: String,
    #[serde(default)]
    pub id_prefix: String,
    pub management: ManagementConfig,
    // Attribute families rewritten on renumber; all when omitted
    #[serde(default)]
    pub reindex: Option<Vec<Reindexable>>,
    pub template: TemplateConfig,
    #[serde(default)]
    pub bound: Vec<BTreeMap<String, JsonValue>>,
    #[serde(default = "default_one")]
    pub initial_empty: usize,
    #[serde(default)]
    pub submit_cmd: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            namespace: String::new(),
            id_prefix: String::new(),
            management: ManagementConfig::default(),
            reindex: None,
            template: TemplateConfig::default(),
            bound: vec![],
            initial_empty: 1,
            submit_cmd: None,
        }
    }
}

fn default_title() -> String {
    "Formset".to_string()
}

fn default_one() -> usize {
    1
}

fn scalar_text(v: &JsonValue) -> String {
    match v {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn validate_page_config(cfg: &PageConfig) -> Result<(), String> {
    use std::collections::HashSet;
    if cfg.namespace.trim().is_empty() {
        return Err("page requires a non-empty 'namespace'".into());
    }
    if cfg.template.fields.is_empty() {
        return Err("template must declare at least one field".into());
    }
    let mut roles = HashSet::new();
    for (i, f) in cfg.template.fields.iter().enumerate() {
        if f.role.trim().is_empty() {
            return Err(format!("template field at index {i} has no role"));
        }
        if !roles.insert(f.role.as_str()) {
            return Err(format!("duplicate field role: '{}' at index {}", f.role, i));
        }
        match f.kind {
            FieldKindName::Select => {
                if f.options.is_empty() {
                    return Err(format!("select field '{}' requires 'options'", f.role));
                }
                if let Some(d) = &f.default {
                    if !d.is_empty() && !f.options.contains(d) {
                        return Err(format!(
                            "select field '{}' default '{}' is not an option",
                            f.role, d
                        ));
                    }
                }
            }
            _ => {
                if !f.options.is_empty() {
                    return Err(format!("field '{}' has options but is not a select", f.role));
                }
            }
        }
    }
    for (i, b) in cfg.bound.iter().enumerate() {
        for (role, v) in b {
            let Some(f) = cfg.template.fields.iter().find(|f| &f.role == role) else {
                return Err(format!("bound block {i} sets unknown field '{role}'"));
            };
            if f.kind == FieldKindName::Select {
                let s = scalar_text(v);
                if !s.is_empty() && !f.options.contains(&s) {
                    return Err(format!(
                        "bound block {i} field '{role}' value '{s}' is not an option"
                    ));
                }
            }
        }
    }
    if cfg.initial_empty == 0 {
        return Err("'initial_empty' must be at least 1".into());
    }
    if cfg.management.total_forms < cfg.initial_empty as i64 {
        return Err(format!(
            "management.total_forms ({}) is smaller than initial_empty ({})",
            cfg.management.total_forms, cfg.initial_empty
        ));
    }
    if let Some(cmd) = &cfg.submit_cmd {
        if cmd.trim().is_empty() {
            return Err("'submit_cmd' is empty".into());
        }
    }
    Ok(())
}

impl PageConfig {
    pub fn to_setup(&self) -> FormsetSetup {
        let fields = self
            .template
            .fields
            .iter()
            .map(|f| FieldSpec {
                role: f.role.clone(),
                label: f.label.clone().unwrap_or_else(|| f.role.replace('_', " ")),
                kind: match f.kind {
                    FieldKindName::Input => FieldKind::Input,
                    FieldKindName::Select => FieldKind::Select {
                        options: f.options.clone(),
                    },
                    FieldKindName::Textarea => FieldKind::TextArea,
                    FieldKindName::File => FieldKind::File,
                },
                default: f.default.clone().unwrap_or_default(),
            })
            .collect();
        let bound = self
            .bound
            .iter()
            .map(|b| b.iter().map(|(k, v)| (k.clone(), scalar_text(v))).collect())
            .collect();
        FormsetSetup {
            namespace: self.namespace.clone(),
            id_prefix: self.id_prefix.clone(),
            fields,
            bound,
            initial_empty: self.initial_empty,
            record: ManagementRecord::new(
                self.management.total_forms,
                self.management.min_num_forms,
            ),
            reindex: self
                .reindex
                .clone()
                .map(ReindexSet::only)
                .unwrap_or_default(),
        }
    }
}
