//! Function catalog input and resolved signature metadata.
//!
//! The catalog is static session input: an ordered list of
//! `{name, signature, description}` entries supplied by the host once and
//! consulted read-only. Signature strings are parsed lazily into
//! [`FunctionSignatureInfo`] by the analysis crate and memoized there.

use rustc_hash::FxHashMap;

/// One catalog entry, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionSpec {
    pub name: String,
    /// Declared form, e.g. `IF(condition, value_if_true, [value_if_false])`.
    pub signature: String,
    pub description: String,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        FunctionSpec {
            name: name.into(),
            signature: signature.into(),
            description: description.into(),
        }
    }
}

/// The session's function catalog: ordered specs plus a case-insensitive
/// lookup index.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    specs: Vec<FunctionSpec>,
    index: FxHashMap<String, usize>,
}

impl FunctionCatalog {
    pub fn new(specs: Vec<FunctionSpec>) -> Self {
        let mut index = FxHashMap::default();
        for (i, spec) in specs.iter().enumerate() {
            // First entry wins on duplicate names.
            index.entry(spec.name.to_ascii_uppercase()).or_insert(i);
        }
        FunctionCatalog { specs, index }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.index
            .get(&name.to_ascii_uppercase())
            .map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Parsed arity metadata for one function, cached per uppercased name for the
/// lifetime of an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionSignatureInfo {
    pub display_name: String,
    pub signature: String,
    pub min_args: usize,
    /// `None` means unbounded (variadic tail).
    pub max_args: Option<usize>,
    pub variadic: bool,
}

impl FunctionSignatureInfo {
    /// Whether an argument count satisfies `[min_args, max_args]`.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}
