use crate::types::{CompositeType, FILE_SEPARATOR, Namespace};

/// Qualifies every composite type with the namespaces enclosing it and prefixes the
/// declaring file. Returns the types sorted by descending start address.
///
/// Every containing namespace is applied, in descending start order, so for
/// `namespace A { namespace B { struct C; } }` the inner `B` is prepended first and the
/// result is `A::B::C`. Namespaces are consumed.
pub fn qualify_types(
    mut composites: Vec<CompositeType>,
    mut namespaces: Vec<Namespace>,
) -> Vec<CompositeType> {
    composites.sort_by(|a, b| b.start.cmp(&a.start));
    namespaces.sort_by(|a, b| b.start.cmp(&a.start));

    for ty in &mut composites {
        for ns in namespaces.iter().filter(|ns| ns.contains(ty.start)) {
            ty.name = format!("{}::{}", ns.name, ty.name);
        }
        ty.name = format!("{}{}{}", ty.decl_file, FILE_SEPARATOR, ty.name);
    }

    composites
}
