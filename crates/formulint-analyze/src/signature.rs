//! Declared-signature parsing and the per-session signature cache.
//!
//! A signature string has the form `NAME(param, param, [optional], rest...)`.
//! A trailing `...` on the last parameter marks the function variadic
//! (unbounded `max_args`; `min_args` at least 1 when it is the only
//! parameter). A parameter wrapped in `[...]` is optional and does not count
//! toward `min_args`.

use rustc_hash::FxHashMap;

use formulint_common::{FunctionCatalog, FunctionSignatureInfo};

/// Resolve a function's arity metadata from the catalog, or `None` when the
/// name is not in the catalog.
pub fn resolve_signature(name: &str, catalog: &FunctionCatalog) -> Option<FunctionSignatureInfo> {
    let spec = catalog.get(name)?;
    Some(parse_signature(&spec.name, &spec.signature))
}

fn parse_signature(display_name: &str, signature: &str) -> FunctionSignatureInfo {
    let inner = signature
        .find('(')
        .and_then(|open| {
            signature
                .rfind(')')
                .filter(|&close| close > open)
                .map(|close| &signature[open + 1..close])
        })
        .unwrap_or("");

    let params: Vec<&str> = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').collect()
    };

    let mut min_args = 0usize;
    let mut max_args = Some(0usize);
    let mut variadic = false;
    let count = params.len();

    for (idx, raw) in params.iter().enumerate() {
        let mut param = raw.trim();
        let mut optional = false;
        if param.starts_with('[') && param.ends_with(']') && param.len() >= 2 {
            optional = true;
            param = param[1..param.len() - 1].trim();
        }

        if idx + 1 == count && param.ends_with("...") {
            variadic = true;
            max_args = None;
            if count == 1 && !optional {
                min_args = min_args.max(1);
            }
            continue;
        }

        if !optional {
            min_args += 1;
        }
        if let Some(max) = max_args.as_mut() {
            *max += 1;
        }
    }

    FunctionSignatureInfo {
        display_name: display_name.to_string(),
        signature: signature.to_string(),
        min_args,
        max_args,
        variadic,
    }
}

/// Memoized signature lookups, keyed by uppercased function name.
///
/// Misses are cached too: the catalog is static session input, so a name
/// absent on first lookup stays absent. Purely additive; no invalidation.
#[derive(Debug, Default)]
pub struct SignatureCache {
    entries: FxHashMap<String, Option<FunctionSignatureInfo>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &mut self,
        name: &str,
        catalog: &FunctionCatalog,
    ) -> Option<&FunctionSignatureInfo> {
        self.entries
            .entry(name.to_ascii_uppercase())
            .or_insert_with(|| resolve_signature(name, catalog))
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formulint_common::FunctionSpec;

    fn catalog() -> FunctionCatalog {
        FunctionCatalog::new(vec![
            FunctionSpec::new("IF", "IF(condition, value_if_true, [value_if_false])", ""),
            FunctionSpec::new("SUM", "SUM(number1, number2...)", ""),
            FunctionSpec::new("CONCATENATE", "CONCATENATE(text1...)", ""),
            FunctionSpec::new("PI", "PI()", ""),
            FunctionSpec::new("COUNT", "COUNT(value1, [value2...])", ""),
        ])
    }

    #[test]
    fn required_and_optional_params() {
        let info = resolve_signature("IF", &catalog()).unwrap();
        assert_eq!(info.min_args, 2);
        assert_eq!(info.max_args, Some(3));
        assert!(!info.variadic);
    }

    #[test]
    fn variadic_tail_unbounds_max() {
        let info = resolve_signature("SUM", &catalog()).unwrap();
        assert_eq!(info.min_args, 1);
        assert_eq!(info.max_args, None);
        assert!(info.variadic);
    }

    #[test]
    fn sole_variadic_param_requires_one() {
        let info = resolve_signature("CONCATENATE", &catalog()).unwrap();
        assert_eq!(info.min_args, 1);
        assert_eq!(info.max_args, None);
    }

    #[test]
    fn optional_variadic_tail_requires_nothing_extra() {
        let info = resolve_signature("COUNT", &catalog()).unwrap();
        assert_eq!(info.min_args, 1);
        assert_eq!(info.max_args, None);
    }

    #[test]
    fn nullary_signature() {
        let info = resolve_signature("PI", &catalog()).unwrap();
        assert_eq!(info.min_args, 0);
        assert_eq!(info.max_args, Some(0));
    }

    #[test]
    fn unknown_name_is_none_and_cached() {
        let catalog = catalog();
        let mut cache = SignatureCache::new();
        assert!(cache.resolve("NOPE", &catalog).is_none());
        assert!(cache.resolve("nope", &catalog).is_none());
        assert!(cache.resolve("sum", &catalog).is_some());
        assert!(cache.resolve("SUM", &catalog).is_some());
    }
}
