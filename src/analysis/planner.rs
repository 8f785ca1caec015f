//! Field ordering: group members under their owning type, then order by access tier and size.

use crate::dump::DebugModel;
use crate::error::{Error, Result};
use crate::types::{CompositeType, Member, PlannedField, ReorderPlan};
use globset::GlobSet;
use indexmap::IndexMap;

use super::TypeResolver;
use super::qualify_types;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Record names (without the file prefix) that are never reordered.
    pub exclude: GlobSet,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { exclude: GlobSet::empty() }
    }
}

/// Turns a parsed dump into one plan per composite type that owns at least one member.
///
/// Consumes the model: namespaces are dropped after qualification, the alias map after
/// size resolution.
pub fn plan_layouts(model: DebugModel, options: &PlanOptions) -> Result<Vec<ReorderPlan>> {
    let DebugModel { namespaces, composites, members, aliases } = model;

    let composites = qualify_types(composites, namespaces);

    let sized: Vec<(Member, u64)> = {
        let mut resolver = TypeResolver::new(&aliases);
        members
            .into_iter()
            .map(|m| {
                let type_ref = m
                    .type_ref
                    .ok_or_else(|| Error::UntypedMember { name: m.name.clone(), loc: m.loc })?;
                let size = resolver.resolve_size(type_ref)?;
                Ok((m, size))
            })
            .collect::<Result<_>>()?
    };
    drop(aliases);

    let mut plans = group_members(&composites, sized);
    drop(composites);

    plans.retain(|_, plan| {
        // The reorder tool needs every field named; anonymous unions and structs are not.
        if plan.fields.iter().any(|f| f.name.is_empty()) {
            tracing::debug!(record = plan.record_name(), "skipping type with unnamed members");
            return false;
        }
        let excluded = options.exclude.is_match(plan.record_name());
        if excluded {
            tracing::debug!(record = plan.record_name(), "excluded by config");
        }
        !excluded
    });

    let mut plans: Vec<ReorderPlan> = plans.into_values().collect();
    for plan in &mut plans {
        order_fields(&mut plan.fields);
    }

    tracing::debug!(plans = plans.len(), "planned field orders");
    Ok(plans)
}

/// Assigns each member to the first type (in the given order) whose range contains it.
/// Types sharing a qualified name share one plan; repeated member names are dropped.
fn group_members(
    composites: &[CompositeType],
    members: Vec<(Member, u64)>,
) -> IndexMap<String, ReorderPlan> {
    let mut plans: IndexMap<String, ReorderPlan> = IndexMap::new();
    let mut orphans = 0usize;

    for (member, size) in members {
        let Some(owner) = composites.iter().find(|ty| ty.contains(member.loc)) else {
            orphans += 1;
            continue;
        };

        let access = if member.access.is_empty() {
            owner.default_access().to_string()
        } else {
            member.access
        };

        let plan = plans
            .entry(owner.name.clone())
            .or_insert_with(|| ReorderPlan::new(owner.name.clone(), owner.is_class));

        if plan.fields.iter().any(|f| f.name == member.name) {
            continue;
        }
        plan.fields.push(PlannedField::new(member.name, size, access));
    }

    if orphans > 0 {
        tracing::debug!(orphans, "members without an owning type");
    }
    plans
}

/// Public tier, then protected, then everything else; ascending size inside each tier.
pub fn order_fields(fields: &mut [PlannedField]) {
    fields.sort_by_key(|f| (f.tier, f.size));
}
