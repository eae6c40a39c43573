//! ConfigNode hierarchy: cycle prevention and materialized paths.
//!
//! Both work on an in-memory snapshot of `(id, parent_id, name)` rows. Stored data may already
//! contain a cycle (written before validation existed, or by hand), so neither walk assumes the
//! parent graph is a forest.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ErrorCode, ErrorStruct};
use crate::model::{Device, EnumValue};

pub const PATH_SEPARATOR: &str = " > ";

/// One edge of the parent graph.
#[derive(Clone, Debug, PartialEq, Eq, FromRow)]
pub struct NodeLink {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
}

impl NodeLink {
    pub fn new(id: Uuid, parent_id: Option<Uuid>, name: impl Into<String>) -> Self {
        NodeLink {
            id,
            parent_id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializedPath {
    pub id: Uuid,
    pub path: String,
}

/// id -> parent_id view of a snapshot.
pub fn parent_map(links: &[NodeLink]) -> HashMap<Uuid, Option<Uuid>> {
    links.iter().map(|l| (l.id, l.parent_id)).collect()
}

/// Reject `parent_id` as the parent of `node_id` if `node_id` is reachable from it by
/// following parent edges.
///
/// A walk that runs into a cycle not containing `node_id` stops there and accepts.
pub fn ensure_acyclic(
    parents: &HashMap<Uuid, Option<Uuid>>,
    node_id: Uuid,
    parent_id: Uuid,
) -> Result<(), ErrorStruct> {
    let mut seen = HashSet::new();
    let mut current = Some(parent_id);
    while let Some(id) = current {
        if id == node_id {
            return Err(cyclic_parent(node_id, parent_id));
        }
        if !seen.insert(id) {
            tracing::warn!(
                node_id = %node_id,
                parent_id = %parent_id,
                loop_at = %id,
                "existing cycle in confignode hierarchy"
            );
            break;
        }
        current = parents.get(&id).copied().flatten();
    }
    Ok(())
}

fn cyclic_parent(node_id: Uuid, parent_id: Uuid) -> ErrorStruct {
    let mut ctx = Map::new();
    ctx.insert("node_id".into(), Value::String(node_id.to_string()));
    ctx.insert("parent_id".into(), Value::String(parent_id.to_string()));
    ErrorCode::CyclicParent
        .at(&["parent_id"])
        .with_input(parent_id.to_string())
        .with_ctx(ctx)
}

/// Full `" > "`-joined path for every node reachable from a root, parents before children.
///
/// Roots are nodes whose parent is null or missing from the snapshot. Nodes only reachable
/// through a cycle get no path.
pub fn materialize_paths(links: &[NodeLink]) -> Vec<MaterializedPath> {
    let known: HashSet<Uuid> = links.iter().map(|l| l.id).collect();
    let mut children: HashMap<Uuid, Vec<&NodeLink>> = HashMap::new();
    for link in links {
        if let Some(parent) = link.parent_id {
            children.entry(parent).or_default().push(link);
        }
    }

    let mut queue: VecDeque<(Uuid, String, HashSet<Uuid>)> = links
        .iter()
        .filter(|l| l.parent_id.map_or(true, |p| !known.contains(&p)))
        .map(|l| (l.id, l.name.clone(), HashSet::from([l.id])))
        .collect();

    let mut out = Vec::with_capacity(links.len());
    while let Some((id, path, visited)) = queue.pop_front() {
        for child in children.get(&id).into_iter().flatten() {
            if visited.contains(&child.id) {
                tracing::warn!(node_id = %child.id, "cycle while materializing confignode paths");
                continue;
            }
            let mut branch = visited.clone();
            branch.insert(child.id);
            queue.push_back((
                child.id,
                format!("{}{}{}", path, PATH_SEPARATOR, child.name),
                branch,
            ));
        }
        out.push(MaterializedPath { id, path });
    }
    out
}

pub fn device_label(device: &Device, path: &str) -> String {
    format!("Device: {}({})[{}]", device.name, device.base.id, path)
}

/// Selector options for devices, labelled with their node's path. Devices whose node has no
/// path are left out.
pub fn device_enum_values(devices: &[Device], paths: &[MaterializedPath]) -> Vec<EnumValue> {
    let by_id: HashMap<Uuid, &str> = paths.iter().map(|p| (p.id, p.path.as_str())).collect();
    devices
        .iter()
        .filter_map(|d| {
            by_id.get(&d.config_node_id).map(|path| EnumValue {
                const_: d.base.id,
                title: device_label(d, path),
            })
        })
        .collect()
}

pub fn config_node_enum_values(paths: Vec<MaterializedPath>) -> Vec<EnumValue> {
    paths
        .into_iter()
        .map(|p| EnumValue {
            const_: p.id,
            title: p.path,
        })
        .collect()
}
