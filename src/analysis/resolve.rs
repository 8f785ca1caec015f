use crate::error::{Error, Result};
use crate::types::{Address, TypeAliasEntry};
use std::collections::{HashMap, HashSet};

/// Follows `DW_AT_type` links until an entry with an explicit byte size is found.
pub struct TypeResolver<'a> {
    aliases: &'a HashMap<Address, TypeAliasEntry>,
    cache: HashMap<Address, u64>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(aliases: &'a HashMap<Address, TypeAliasEntry>) -> Self {
        Self { aliases, cache: HashMap::new() }
    }

    pub fn resolve_size(&mut self, address: Address) -> Result<u64> {
        let mut chain: Vec<Address> = Vec::new();
        let mut seen: HashSet<Address> = HashSet::new();
        let mut current = address;

        let size = loop {
            if let Some(&size) = self.cache.get(&current) {
                break size;
            }
            if !seen.insert(current) {
                return Err(Error::CyclicType(current));
            }

            let entry = self.aliases.get(&current).ok_or(Error::TypeNotFound(current))?;
            chain.push(current);

            if let Some(size) = entry.byte_size {
                break size;
            }
            current = entry.type_ref.ok_or(Error::UnsizedType(current))?;
        };

        // Every link on the way shares the final size.
        for link in chain {
            self.cache.insert(link, size);
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(type_ref: Option<Address>, byte_size: Option<u64>) -> TypeAliasEntry {
        TypeAliasEntry { type_ref, byte_size }
    }

    #[test]
    fn chain_resolves_from_every_link() {
        // typedef -> const -> volatile -> base(8)
        let aliases: HashMap<_, _> = [
            (0x10, alias(Some(0x20), None)),
            (0x20, alias(Some(0x30), None)),
            (0x30, alias(Some(0x40), None)),
            (0x40, alias(None, Some(8))),
        ]
        .into_iter()
        .collect();

        let mut resolver = TypeResolver::new(&aliases);
        for addr in [0x10, 0x20, 0x30, 0x40] {
            assert_eq!(resolver.resolve_size(addr).unwrap(), 8);
        }
    }

    #[test]
    fn explicit_size_wins_over_type_link() {
        // A structure carries both a size and, for enums, an underlying type.
        let aliases: HashMap<_, _> =
            [(0x10, alias(Some(0x20), Some(4))), (0x20, alias(None, Some(1)))].into_iter().collect();
        assert_eq!(TypeResolver::new(&aliases).resolve_size(0x10).unwrap(), 4);
    }

    #[test]
    fn missing_entry_is_reported() {
        let aliases: HashMap<_, _> = [(0x10, alias(Some(0x99), None))].into_iter().collect();
        let err = TypeResolver::new(&aliases).resolve_size(0x10).unwrap_err();
        assert!(matches!(err, Error::TypeNotFound(0x99)));

        let err = TypeResolver::new(&aliases).resolve_size(0x11).unwrap_err();
        assert!(matches!(err, Error::TypeNotFound(0x11)));
    }

    #[test]
    fn cycles_fail_instead_of_looping() {
        let aliases: HashMap<_, _> = [
            (0x10, alias(Some(0x20), None)),
            (0x20, alias(Some(0x30), None)),
            (0x30, alias(Some(0x10), None)),
        ]
        .into_iter()
        .collect();
        let err = TypeResolver::new(&aliases).resolve_size(0x10).unwrap_err();
        assert!(matches!(err, Error::CyclicType(0x10)));

        let selfref: HashMap<_, _> = [(0x10, alias(Some(0x10), None))].into_iter().collect();
        let err = TypeResolver::new(&selfref).resolve_size(0x10).unwrap_err();
        assert!(matches!(err, Error::CyclicType(0x10)));
    }

    #[test]
    fn dead_end_without_size() {
        let aliases: HashMap<_, _> = [(0x10, alias(None, None))].into_iter().collect();
        let err = TypeResolver::new(&aliases).resolve_size(0x10).unwrap_err();
        assert!(matches!(err, Error::UnsizedType(0x10)));
    }
}
