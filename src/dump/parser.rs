use crate::error::{Error, Result};
use crate::types::{Address, CompositeType, Member, Namespace, TypeAliasEntry};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{
    normalize_line, parse_hex, parse_paren_hex, parse_quoted, parse_size, parse_symbol,
    parse_type_ref,
};

/// Tags whose entries can be the target of a `DW_AT_type` link.
const TYPE_TAGS: &[&str] = &[
    "DW_TAG_class_type",
    "DW_TAG_array_type",
    "DW_TAG_base_type",
    "DW_TAG_const_type",
    "DW_TAG_enumeration_type",
    "DW_TAG_file_type",
    "DW_TAG_interface_type",
    "DW_TAG_packed_type",
    "DW_TAG_pointer_type",
    "DW_TAG_ptr_to_member_type",
    "DW_TAG_reference_type",
    "DW_TAG_set_type",
    "DW_TAG_shared_type",
    "DW_TAG_string_type",
    "DW_TAG_structure_type",
    "DW_TAG_subrange_type",
    "DW_TAG_subroutine_type",
    "DW_TAG_thrown_type",
    "DW_TAG_union_type",
    "DW_TAG_unspecified_type",
    "DW_TAG_volatile_type",
    "DW_TAG_typedef",
];

/// Compiler-synthesized declarations carry this in place of a real file.
const BUILTIN_MARKER: &str = "<built-in>";

#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Commit entities still pending when the input ends.
    pub flush_at_eof: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { flush_at_eof: true }
    }
}

/// Everything collected from one dump. Namespaces and composite types are related only
/// through their address ranges.
#[derive(Debug, Default)]
pub struct DebugModel {
    pub namespaces: Vec<Namespace>,
    pub composites: Vec<CompositeType>,
    pub members: Vec<Member>,
    pub aliases: HashMap<Address, TypeAliasEntry>,
}

/// Entities under construction. More than one can be active at once: a structure tag
/// opens both a composite type and a type alias.
#[derive(Debug, Default)]
struct PendingSlots {
    namespace: Option<Namespace>,
    composite: Option<CompositeType>,
    member: Option<Member>,
    alias: Option<(Address, TypeAliasEntry)>,
}

impl PendingSlots {
    fn any_named(&self) -> bool {
        self.namespace.is_some() || self.composite.is_some() || self.member.is_some()
    }
}

pub struct DumpParser {
    root: PathBuf,
    options: ParserOptions,
    slots: PendingSlots,
    model: DebugModel,
    line_no: usize,
}

impl DumpParser {
    pub fn new(root: impl Into<PathBuf>, options: ParserOptions) -> Self {
        Self {
            root: root.into(),
            options,
            slots: PendingSlots::default(),
            model: DebugModel::default(),
            line_no: 0,
        }
    }

    /// Parses a whole dump. Lines are decoded lossily; dumps may quote non-UTF-8 names.
    pub fn parse_reader<R: BufRead>(mut self, mut reader: R) -> Result<DebugModel> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.feed_line(&String::from_utf8_lossy(&buf))?;
        }
        Ok(self.finish())
    }

    pub fn parse_file(self, path: &Path) -> Result<DebugModel> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_str(self, text: &str) -> Result<DebugModel> {
        self.parse_reader(text.as_bytes())
    }

    /// Feeds one raw line. Blank lines only advance the line counter.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line_no += 1;
        let line = normalize_line(raw);
        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with("0x") {
            self.address_line(&line)
        } else {
            self.attribute_line(&line)
        }
    }

    pub fn finish(mut self) -> DebugModel {
        if self.options.flush_at_eof {
            self.commit();
        } else if self.slots.any_named() || self.slots.alias.is_some() {
            tracing::debug!("dropping entities pending at end of input");
        }

        tracing::debug!(
            namespaces = self.model.namespaces.len(),
            composites = self.model.composites.len(),
            members = self.model.members.len(),
            aliases = self.model.aliases.len(),
            lines = self.line_no,
            "parsed dump"
        );
        self.model
    }

    fn address_line(&mut self, line: &str) -> Result<()> {
        self.commit();

        let mut tokens = line.split(' ');
        let label = tokens.next().unwrap_or_default();
        let label = label.strip_suffix(':').unwrap_or(label);
        let address = self.check(line, parse_hex(label))?;
        let tag = tokens.next().unwrap_or_default();

        if TYPE_TAGS.contains(&tag) {
            self.slots.alias = Some((address, TypeAliasEntry::default()));

            let is_class = tag == "DW_TAG_class_type";
            if is_class || tag == "DW_TAG_structure_type" || tag == "DW_TAG_union_type" {
                self.slots.composite = Some(CompositeType {
                    start: address,
                    end: None,
                    decl_file: String::new(),
                    name: String::new(),
                    is_class,
                });
            }
        } else if tag == "DW_TAG_member" {
            self.slots.member = Some(Member {
                loc: address,
                name: String::new(),
                decl_file: String::new(),
                type_ref: None,
                access: String::new(),
            });
        } else if tag == "DW_TAG_namespace" {
            self.slots.namespace = Some(Namespace {
                start: address,
                end: None,
                decl_file: String::new(),
                name: String::new(),
            });
        }

        Ok(())
    }

    fn attribute_line(&mut self, line: &str) -> Result<()> {
        let (tag, value) = line.split_once(' ').unwrap_or((line, ""));
        let slots = &self.slots;

        match tag {
            "DW_AT_name" if slots.any_named() => {
                let name = self.check(line, parse_quoted(value))?;
                let slots = &mut self.slots;
                if let Some(ns) = slots.namespace.as_mut() {
                    ns.name = name.to_string();
                }
                if let Some(ty) = slots.composite.as_mut() {
                    ty.name = name.to_string();
                }
                if let Some(m) = slots.member.as_mut() {
                    m.name = name.to_string();
                }
            }
            "DW_AT_decl_file" if slots.any_named() => {
                let file = self.check(line, parse_quoted(value))?;
                if !self.is_project_file(file) {
                    tracing::trace!(file, line = self.line_no, "skipping entity outside root");
                    let slots = &mut self.slots;
                    slots.namespace = None;
                    slots.composite = None;
                    slots.member = None;
                    return Ok(());
                }
                let slots = &mut self.slots;
                if let Some(ns) = slots.namespace.as_mut() {
                    ns.decl_file = file.to_string();
                }
                if let Some(ty) = slots.composite.as_mut() {
                    ty.decl_file = file.to_string();
                }
                if let Some(m) = slots.member.as_mut() {
                    m.decl_file = file.to_string();
                }
            }
            "DW_AT_sibling" if slots.namespace.is_some() || slots.composite.is_some() => {
                let end = self.check(line, parse_paren_hex(value))?;
                if let Some(ns) = self.slots.namespace.as_mut() {
                    ns.end = Some(end);
                }
                if let Some(ty) = self.slots.composite.as_mut() {
                    ty.end = Some(end);
                }
            }
            "DW_AT_type" if slots.member.is_some() || slots.alias.is_some() => {
                let type_ref = self.check(line, parse_type_ref(value))?;
                if let Some(m) = self.slots.member.as_mut() {
                    m.type_ref = Some(type_ref);
                }
                if let Some((_, alias)) = self.slots.alias.as_mut() {
                    alias.type_ref = Some(type_ref);
                }
            }
            "DW_AT_accessibility" if slots.member.is_some() => {
                let access = self.check(line, parse_symbol(value))?.to_string();
                if let Some(m) = self.slots.member.as_mut() {
                    m.access = access;
                }
            }
            "DW_AT_byte_size" if slots.alias.is_some() => {
                let size = self.check(line, parse_size(value))?;
                if let Some((_, alias)) = self.slots.alias.as_mut() {
                    alias.byte_size = Some(size);
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Moves finished entities into the model and clears every slot.
    fn commit(&mut self) {
        let slots = std::mem::take(&mut self.slots);

        if let Some(ns) = slots.namespace.filter(|ns| !ns.decl_file.is_empty()) {
            self.model.namespaces.push(ns);
        }
        if let Some(ty) = slots.composite.filter(|ty| !ty.decl_file.is_empty()) {
            self.model.composites.push(ty);
        }
        if let Some(member) = slots.member {
            self.model.members.push(member);
        }
        if let Some((address, alias)) = slots.alias {
            self.model.aliases.entry(address).or_insert(alias);
        }
    }

    fn is_project_file(&self, file: &str) -> bool {
        Path::new(file).starts_with(&self.root) && !file.contains(BUILTIN_MARKER)
    }

    fn check<T>(&self, line: &str, parsed: std::result::Result<T, String>) -> Result<T> {
        parsed.map_err(|reason| Error::MalformedInput {
            line: self.line_no,
            text: line.to_string(),
            reason,
        })
    }
}
