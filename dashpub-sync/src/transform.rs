//! Per-stack rewrite of a dashboard document before upload.
//!
//! ## Steps, in order
//!
//! 1. Require the inner `dashboard` object.
//! 2. Drop `folderId`, set `folderUid` to the destination folder.
//! 3. Point recognised templating variables at the stack's own datasources.
//! 4. Drop `id` (the platform rejects updates carrying both `id` and `uid`).
//! 5. Resolve the uid (see [`crate::identifier`]).
//! 6. Append configured tags (no deduplication).

use dashpub_client::{ClientError, StackSession};
use dashpub_core::{Datasource, DashboardUpload, Folder, PublisherConfig, Stack};
use serde_json::{json, Value};
use thiserror::Error;

use crate::document::{
    self, expect_object_mut, mismatch, optional_array_mut, optional_object_mut, optional_str,
    DashboardDocument, DocumentError, Object,
};
use crate::identifier::{resolve_uid, UidSource};

/// A datasource-type templating variable and the stack datasource it selects.
struct DatasourceVariable {
    name: &'static str,
    /// Display name; `{slug}` is replaced by the stack slug.
    template: &'static str,
    /// Fixed value, when it differs from the display name.
    value: Option<&'static str>,
}

const DATASOURCE_VARIABLES: &[DatasourceVariable] = &[
    DatasourceVariable {
        name: "PROMPRO",
        template: "grafanacloud-{slug}-prom",
        value: None,
    },
    DatasourceVariable {
        name: "P1EUW1",
        template: "grafanacloud-{slug}-prom",
        value: None,
    },
    DatasourceVariable {
        name: "LOGSPRO",
        template: "grafanacloud-{slug}-logs",
        value: None,
    },
    DatasourceVariable {
        name: "LOGUSAGE",
        template: "grafanacloud-{slug}-usage-insights",
        value: Some("grafanacloud-usage-insights"),
    },
];

/// Custom-type variable holding the stack's numeric logs tenant id.
const STACK_ID_VARIABLE: &str = "STACKID";
const LOGS_DATASOURCE_TEMPLATE: &str = "grafanacloud-{slug}-logs";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to look up datasource {name}: {source}")]
    Datasource {
        name: String,
        #[source]
        source: ClientError,
    },

    #[error("datasource {name} has no owner identifier")]
    MissingOwner { name: String },
}

/// Datasource lookups needed while rewriting templating variables.
pub trait DatasourceLookup {
    fn datasource(&self, name: &str) -> Result<Datasource, ClientError>;
}

impl<T: StackSession + ?Sized> DatasourceLookup for T {
    fn datasource(&self, name: &str) -> Result<Datasource, ClientError> {
        self.get_datasource(name)
    }
}

/// Run-scoped inputs to the transformer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub tags: Option<Vec<String>>,
    pub id_suffix: Option<String>,
}

impl From<&PublisherConfig> for TransformOptions {
    fn from(config: &PublisherConfig) -> Self {
        Self {
            tags: config.tags.clone(),
            id_suffix: config.id_suffix().map(str::to_owned),
        }
    }
}

/// Produce the upload record for `document` on `stack` in `folder`.
pub fn transform<L: DatasourceLookup + ?Sized>(
    document: DashboardDocument,
    stack: &Stack,
    folder: &Folder,
    options: &TransformOptions,
    datasources: &L,
) -> Result<DashboardUpload, TransformError> {
    let mut dash = document.into_dashboard()?;

    document::remove_field(&mut dash, "folderId");
    dash.insert("folderUid".into(), Value::from(folder.uid.clone()));

    if let Some(templating) = optional_object_mut(&mut dash, "templating", "dashboard.templating")? {
        if let Some(list) = optional_array_mut(templating, "list", "dashboard.templating.list")? {
            rewrite_variables(list, stack, datasources)?;
        }
    }

    document::remove_field(&mut dash, "id");

    let uid = resolve_dashboard_uid(&dash, options.id_suffix.as_deref())?;
    dash.insert("uid".into(), Value::from(uid.clone()));

    if let Some(tags) = &options.tags {
        append_tags(&mut dash, tags)?;
    }

    Ok(DashboardUpload {
        folder_uid: folder.uid.clone(),
        uid,
        dashboard: dash,
    })
}

/// The document's own uid, or one derived from its title.
pub fn resolve_dashboard_uid(dash: &Object, suffix: Option<&str>) -> Result<String, DocumentError> {
    let source = match optional_str(dash, "uid", "dashboard.uid")? {
        Some(uid) if !uid.is_empty() => UidSource::Provided(uid),
        _ => match optional_str(dash, "title", "dashboard.title")? {
            Some(title) => UidSource::Title(title),
            None => {
                return Err(DocumentError::MissingField {
                    field: "dashboard.title".into(),
                })
            }
        },
    };
    Ok(resolve_uid(source, suffix))
}

pub fn datasource_name(template: &str, stack: &Stack) -> String {
    template.replace("{slug}", stack.slug.as_str())
}

fn rewrite_variables<L: DatasourceLookup + ?Sized>(
    list: &mut [Value],
    stack: &Stack,
    datasources: &L,
) -> Result<(), TransformError> {
    for (i, entry) in list.iter_mut().enumerate() {
        let variable = expect_object_mut(entry, &format!("dashboard.templating.list[{i}]"))?;
        let kind = variable.get("type").and_then(Value::as_str).map(str::to_owned);
        let name = variable.get("name").and_then(Value::as_str).map(str::to_owned);

        match (kind.as_deref(), name.as_deref()) {
            (Some("datasource"), Some(name)) => {
                let Some(known) = DATASOURCE_VARIABLES.iter().find(|v| v.name == name) else {
                    continue;
                };
                let text = datasource_name(known.template, stack);
                let value = known.value.map_or_else(|| text.clone(), str::to_owned);
                variable.insert("current".into(), selection(false, &text, &value));
            }
            (Some("custom"), Some(STACK_ID_VARIABLE)) => {
                let stack_id = logs_owner(stack, datasources)?;
                variable.insert("current".into(), selection(false, &stack_id, &stack_id));
                variable.insert(
                    "options".into(),
                    Value::Array(vec![selection(true, &stack_id, &stack_id)]),
                );
                variable.insert("query".into(), Value::from(stack_id));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Owner id of the stack's hosted logs datasource.
fn logs_owner<L: DatasourceLookup + ?Sized>(
    stack: &Stack,
    datasources: &L,
) -> Result<String, TransformError> {
    let name = datasource_name(LOGS_DATASOURCE_TEMPLATE, stack);
    let datasource = datasources
        .datasource(&name)
        .map_err(|source| TransformError::Datasource {
            name: name.clone(),
            source,
        })?;
    if datasource.user.is_empty() {
        return Err(TransformError::MissingOwner { name });
    }
    Ok(datasource.user)
}

fn selection(selected: bool, text: &str, value: &str) -> Value {
    json!({
        "selected": selected,
        "text": text,
        "value": value,
    })
}

fn append_tags(dash: &mut Object, tags: &[String]) -> Result<(), DocumentError> {
    let extra = tags.iter().cloned().map(Value::from);
    match dash.get_mut("tags") {
        Some(Value::Array(existing)) => existing.extend(extra),
        None | Some(Value::Null) => {
            dash.insert("tags".into(), Value::Array(extra.collect()));
        }
        Some(other) => return Err(mismatch("dashboard.tags", "an array", other)),
    }
    Ok(())
}
