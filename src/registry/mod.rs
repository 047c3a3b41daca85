//! Type name registry: builders, resolution and memoization
//!
//! The registry is an explicit value constructed at process start and
//! injected into callers; there is no global instance. `resolve` is safe
//! under concurrent readers (the cache sits behind an `RwLock` and
//! resolved instances are immutable `Arc`s); `register` takes `&mut self`,
//! so the write-before-concurrent-reads discipline is enforced by the
//! borrow checker for the usual share-after-setup pattern.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::common::error::{ParseError, ParseResult};
use crate::types::descriptor::TypeDescriptor;
use crate::types::enumeration::EnumType;
use crate::types::instance::TypeInstance;
use crate::types::parser;
use crate::types::split::unquote;

/// Builder invoked when a descriptor's name matches a registered type.
/// Builders receive the raw descriptor (argument descriptors included,
/// uninterpreted) plus the registry for resolving child types.
pub type Builder =
    Arc<dyn Fn(&TypeDescriptor, &Registry) -> ParseResult<TypeInstance> + Send + Sync>;

/// Maps type names to builders and memoizes resolution results per exact
/// type-string.
pub struct Registry {
    builders: HashMap<String, Builder>,
    cache: RwLock<HashMap<String, Arc<TypeInstance>>>,
}

impl Registry {
    /// Registry with every built-in type name pre-registered.
    pub fn new() -> Self {
        let mut registry = Registry {
            builders: HashMap::new(),
            cache: RwLock::new(HashMap::new()),
        };
        registry.register_builtins();
        registry
    }

    /// Associate `name` with a builder. Clears the whole resolution cache:
    /// registration is a startup-time operation and whole-cache
    /// invalidation keeps the cache a pure function of the builder map.
    pub fn register(&mut self, name: impl Into<String>, builder: Builder) {
        let name = name.into();
        debug!(type_name = %name, "registering type builder");
        self.builders.insert(name, builder);
        self.cache.write().clear();
    }

    /// Resolve a type-string into a shared type instance. Results are
    /// memoized by the exact input string; unknown type names resolve to
    /// a passthrough scalar rather than failing, so new server-side types
    /// degrade gracefully.
    pub fn resolve(&self, type_string: &str) -> ParseResult<Arc<TypeInstance>> {
        if let Some(cached) = self.cache.read().get(type_string) {
            return Ok(Arc::clone(cached));
        }

        debug!(type_string, "resolving uncached type-string");
        let descriptor = parser::parse(type_string)?;
        let instance = self.resolve_descriptor(&descriptor)?;
        self.cache
            .write()
            .insert(type_string.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Resolve an already-parsed descriptor (used by builders for their
    /// child arguments; not memoized).
    pub fn resolve_descriptor(&self, descriptor: &TypeDescriptor) -> ParseResult<Arc<TypeInstance>> {
        match self.builders.get(&descriptor.name) {
            Some(builder) => builder(descriptor, self).map(Arc::new),
            None => {
                debug!(type_name = %descriptor.name, "unknown type name, using passthrough");
                Ok(Arc::new(TypeInstance::Passthrough {
                    name: descriptor.to_string(),
                }))
            }
        }
    }

    fn register_builtins(&mut self) {
        for (bits, signed) in [
            (8u16, true),
            (16, true),
            (32, true),
            (64, true),
            (128, true),
            (256, true),
            (8, false),
            (16, false),
            (32, false),
            (64, false),
            (128, false),
            (256, false),
        ] {
            let name = if signed {
                format!("Int{}", bits)
            } else {
                format!("UInt{}", bits)
            };
            self.builders.insert(
                name,
                Arc::new(move |descriptor, _| {
                    expect_args(descriptor, 0)?;
                    Ok(TypeInstance::Int { bits, signed })
                }),
            );
        }

        for bits in [32u16, 64] {
            self.builders.insert(
                format!("Float{}", bits),
                Arc::new(move |descriptor, _| {
                    expect_args(descriptor, 0)?;
                    Ok(TypeInstance::Float { bits })
                }),
            );
        }

        for name in ["Bool", "Boolean"] {
            self.builders.insert(
                name.to_string(),
                Arc::new(|descriptor, _| {
                    expect_args(descriptor, 0)?;
                    Ok(TypeInstance::Bool)
                }),
            );
        }

        self.builders.insert(
            "String".to_string(),
            Arc::new(|descriptor, _| {
                expect_args(descriptor, 0)?;
                Ok(TypeInstance::String { fixed_length: None })
            }),
        );
        self.builders.insert(
            "FixedString".to_string(),
            Arc::new(|descriptor, _| {
                expect_args(descriptor, 1)?;
                let length = numeric_arg(descriptor, 0)?;
                if length == 0 {
                    return Err(builder_error(descriptor, "FixedString length must be positive"));
                }
                Ok(TypeInstance::String {
                    fixed_length: Some(length as usize),
                })
            }),
        );

        self.builders.insert(
            "Decimal".to_string(),
            Arc::new(|descriptor, _| {
                if descriptor.args.is_empty() || descriptor.args.len() > 2 {
                    return Err(builder_error(descriptor, "Decimal takes (precision[, scale])"));
                }
                let precision = numeric_arg(descriptor, 0)?;
                let scale = if descriptor.args.len() == 2 {
                    numeric_arg(descriptor, 1)?
                } else {
                    0
                };
                checked_decimal(descriptor, precision, scale)
            }),
        );
        for (suffix, precision) in [("32", 9u64), ("64", 18), ("128", 38), ("256", 76)] {
            self.builders.insert(
                format!("Decimal{}", suffix),
                Arc::new(move |descriptor, _| {
                    expect_args(descriptor, 1)?;
                    let scale = numeric_arg(descriptor, 0)?;
                    checked_decimal(descriptor, precision, scale)
                }),
            );
        }

        self.builders.insert(
            "Date".to_string(),
            Arc::new(|descriptor, _| {
                expect_args(descriptor, 0)?;
                Ok(TypeInstance::Date { extended: false })
            }),
        );
        self.builders.insert(
            "Date32".to_string(),
            Arc::new(|descriptor, _| {
                expect_args(descriptor, 0)?;
                Ok(TypeInstance::Date { extended: true })
            }),
        );
        self.builders.insert(
            "DateTime".to_string(),
            Arc::new(|descriptor, _| {
                if descriptor.args.len() > 1 {
                    return Err(builder_error(descriptor, "DateTime takes ([timezone])"));
                }
                let timezone = match descriptor.args.first() {
                    Some(arg) => Some(literal_arg(descriptor, &arg.name)?),
                    None => None,
                };
                Ok(TypeInstance::DateTime {
                    precision: None,
                    timezone,
                })
            }),
        );
        self.builders.insert(
            "DateTime64".to_string(),
            Arc::new(|descriptor, _| {
                if descriptor.args.is_empty() || descriptor.args.len() > 2 {
                    return Err(builder_error(
                        descriptor,
                        "DateTime64 takes (precision[, timezone])",
                    ));
                }
                let precision = numeric_arg(descriptor, 0)?;
                if precision > 9 {
                    return Err(builder_error(descriptor, "DateTime64 precision is 0..=9"));
                }
                let timezone = match descriptor.args.get(1) {
                    Some(arg) => Some(literal_arg(descriptor, &arg.name)?),
                    None => None,
                };
                Ok(TypeInstance::DateTime {
                    precision: Some(precision as u8),
                    timezone,
                })
            }),
        );

        self.builders.insert(
            "UUID".to_string(),
            Arc::new(|descriptor, _| {
                expect_args(descriptor, 0)?;
                Ok(TypeInstance::Uuid)
            }),
        );

        for (name, width) in [("Enum", 16u16), ("Enum8", 8), ("Enum16", 16)] {
            self.builders.insert(
                name.to_string(),
                Arc::new(move |descriptor, _| {
                    EnumType::from_args(width, &descriptor.args)
                        .map(TypeInstance::Enum)
                        .map_err(|message| builder_error(descriptor, message))
                }),
            );
        }

        self.builders.insert(
            "Array".to_string(),
            Arc::new(|descriptor, registry| {
                expect_args(descriptor, 1)?;
                Ok(TypeInstance::Array(
                    registry.resolve_descriptor(&descriptor.args[0])?,
                ))
            }),
        );
        self.builders.insert(
            "Map".to_string(),
            Arc::new(|descriptor, registry| {
                expect_args(descriptor, 2)?;
                Ok(TypeInstance::Map(
                    registry.resolve_descriptor(&descriptor.args[0])?,
                    registry.resolve_descriptor(&descriptor.args[1])?,
                ))
            }),
        );
        self.builders.insert(
            "Tuple".to_string(),
            Arc::new(|descriptor, registry| {
                let elements: ParseResult<Vec<_>> = descriptor
                    .args
                    .iter()
                    .map(|arg| registry.resolve_descriptor(arg))
                    .collect();
                Ok(TypeInstance::Tuple(elements?))
            }),
        );
        self.builders.insert(
            "Nullable".to_string(),
            Arc::new(|descriptor, registry| {
                expect_args(descriptor, 1)?;
                Ok(TypeInstance::Nullable(
                    registry.resolve_descriptor(&descriptor.args[0])?,
                ))
            }),
        );
        self.builders.insert(
            "LowCardinality".to_string(),
            Arc::new(|descriptor, registry| {
                expect_args(descriptor, 1)?;
                Ok(TypeInstance::LowCardinality(
                    registry.resolve_descriptor(&descriptor.args[0])?,
                ))
            }),
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn builder_error(descriptor: &TypeDescriptor, message: impl Into<String>) -> ParseError {
    ParseError::new(0, descriptor.to_string(), message)
}

fn expect_args(descriptor: &TypeDescriptor, count: usize) -> ParseResult<()> {
    if descriptor.args.len() == count {
        Ok(())
    } else {
        Err(builder_error(
            descriptor,
            format!(
                "{} takes {} argument(s), got {}",
                descriptor.name,
                count,
                descriptor.args.len()
            ),
        ))
    }
}

fn numeric_arg(descriptor: &TypeDescriptor, index: usize) -> ParseResult<u64> {
    let arg = &descriptor.args[index];
    if !arg.args.is_empty() {
        return Err(builder_error(descriptor, "expected a numeric argument"));
    }
    arg.name
        .trim()
        .parse()
        .map_err(|_| builder_error(descriptor, format!("invalid numeric argument '{}'", arg.name)))
}

fn literal_arg(descriptor: &TypeDescriptor, raw: &str) -> ParseResult<String> {
    unquote(raw).map_err(|e| builder_error(descriptor, e.message))
}

fn checked_decimal(
    descriptor: &TypeDescriptor,
    precision: u64,
    scale: u64,
) -> ParseResult<TypeInstance> {
    if precision > u8::MAX as u64 || scale > u8::MAX as u64 {
        return Err(builder_error(descriptor, "decimal parameters out of range"));
    }
    TypeInstance::decimal(precision as u8, scale as u8)
        .map_err(|message| builder_error(descriptor, message))
}
