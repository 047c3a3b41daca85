//! Enum types: declaration parsing and name/code conversion

use std::collections::{BTreeMap, HashMap};

use crate::common::error::CastResult;
use crate::types::descriptor::TypeDescriptor;
use crate::types::instance::TypeInstance;
use crate::types::split::{quote_literal, split_top_level, unquote};
use crate::types::value::Value;

/// A resolved enum: declaration-ordered member names with a bijective
/// name/code mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    /// Code width in bits (8 or 16)
    pub width: u16,
    /// Member names in declaration order
    pub names: Vec<String>,
    pub name_to_code: HashMap<String, i64>,
    pub code_to_name: BTreeMap<i64, String>,
}

impl EnumType {
    /// Build from the opaque argument descriptors captured by the
    /// grammar. Each argument is either `'name' = code` or a bare name;
    /// bare names auto-increment from 1 (or from the last explicit code).
    pub fn from_args(width: u16, args: &[TypeDescriptor]) -> Result<EnumType, String> {
        if args.is_empty() {
            return Err("enum declaration needs at least one member".to_string());
        }

        let mut names = Vec::with_capacity(args.len());
        let mut name_to_code = HashMap::with_capacity(args.len());
        let mut code_to_name = BTreeMap::new();
        let mut next_code: i64 = 1;

        for arg in args {
            let raw = arg.to_string();
            let parts = split_top_level(&raw, '(', ')', '=')
                .map_err(|e| format!("malformed enum member '{}': {}", raw, e.message))?;
            let (name, code) = match parts.as_slice() {
                [name] => (name.clone(), next_code),
                [name, code] => {
                    let parsed: i64 = code
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid enum code '{}'", code))?;
                    (name.clone(), parsed)
                }
                _ => return Err(format!("malformed enum member '{}'", raw)),
            };
            let name =
                unquote(&name).map_err(|e| format!("malformed enum name '{}': {}", name, e.message))?;

            if !code_fits(width, code) {
                return Err(format!("enum code {} out of range for Enum{}", code, width));
            }
            if name_to_code.contains_key(&name) {
                return Err(format!("duplicate enum name '{}'", name));
            }
            if code_to_name.contains_key(&code) {
                return Err(format!("duplicate enum code {}", code));
            }

            name_to_code.insert(name.clone(), code);
            code_to_name.insert(code, name.clone());
            names.push(name);
            next_code = code + 1;
        }

        Ok(EnumType {
            width,
            names,
            name_to_code,
            code_to_name,
        })
    }

    pub fn type_name(&self) -> String {
        let members: Vec<String> = self
            .names
            .iter()
            .map(|name| {
                let code = self.name_to_code[name];
                format!("{} = {}", quote_literal(name), code)
            })
            .collect();
        format!("Enum{}({})", self.width, members.join(", "))
    }

    /// First declared member
    pub fn default_value(&self) -> Value {
        self.names
            .first()
            .map(|name| Value::String(name.clone()))
            .unwrap_or(Value::Null)
    }

    /// Accept a member name or an integer code; the canonical form is
    /// always the name. Unknown either way fails.
    pub fn cast(&self, value: Value, target: &TypeInstance) -> CastResult<Value> {
        match &value {
            Value::String(s) => {
                if self.name_to_code.contains_key(s.as_str()) {
                    return Ok(Value::String(s.clone()));
                }
                // a numeric string can still be a code
                if let Ok(code) = s.trim().parse::<i64>() {
                    if let Some(name) = self.code_to_name.get(&code) {
                        return Ok(Value::String(name.clone()));
                    }
                }
                Err(target.cast_error(&value))
            }
            Value::Int(i) => {
                let code = i64::try_from(*i).map_err(|_| target.cast_error(&value))?;
                match self.code_to_name.get(&code) {
                    Some(name) => Ok(Value::String(name.clone())),
                    None => Err(target.cast_error(&value)),
                }
            }
            Value::UInt(u) => {
                let code = i64::try_from(*u).map_err(|_| target.cast_error(&value))?;
                match self.code_to_name.get(&code) {
                    Some(name) => Ok(Value::String(name.clone())),
                    None => Err(target.cast_error(&value)),
                }
            }
            _ => Err(target.cast_error(&value)),
        }
    }

    pub fn serialize(&self, value: &Value, target: &TypeInstance) -> CastResult<String> {
        match value {
            Value::String(name) if self.name_to_code.contains_key(name.as_str()) => {
                Ok(quote_literal(name))
            }
            _ => Err(target.cast_error(value)),
        }
    }

    /// Code for a canonical member name, for callers emitting compact
    /// wire forms.
    pub fn code_of(&self, name: &str) -> Option<i64> {
        self.name_to_code.get(name).copied()
    }
}

fn code_fits(width: u16, code: i64) -> bool {
    match width {
        8 => i8::try_from(code).is_ok(),
        16 => i16::try_from(code).is_ok(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn active_inactive() -> TypeInstance {
        let spec = EnumType::from_args(
            8,
            &[
                TypeDescriptor::leaf("'active' = 1"),
                TypeDescriptor::leaf("'inactive' = 2"),
            ],
        )
        .unwrap();
        TypeInstance::Enum(spec)
    }

    #[test]
    fn test_name_and_code_agree() {
        let e = active_inactive();
        assert_eq!(
            e.cast(Value::Int(1)).unwrap(),
            e.cast(Value::from("active")).unwrap()
        );
        assert_eq!(
            e.cast(Value::Int(2)).unwrap(),
            e.cast(Value::from("inactive")).unwrap()
        );
    }

    #[test]
    fn test_unknown_name_and_code_fail() {
        let e = active_inactive();
        assert!(e.cast(Value::Int(99)).is_err());
        assert!(e.cast(Value::from("unknown")).is_err());
    }

    #[test]
    fn test_auto_increment_codes() {
        let spec = EnumType::from_args(
            8,
            &[
                TypeDescriptor::leaf("'red'"),
                TypeDescriptor::leaf("'green'"),
                TypeDescriptor::leaf("'blue' = 10"),
                TypeDescriptor::leaf("'cyan'"),
            ],
        )
        .unwrap();
        assert_eq!(spec.code_of("red"), Some(1));
        assert_eq!(spec.code_of("green"), Some(2));
        assert_eq!(spec.code_of("blue"), Some(10));
        assert_eq!(spec.code_of("cyan"), Some(11));
    }

    #[test]
    fn test_bijectivity_enforced() {
        assert!(EnumType::from_args(
            8,
            &[
                TypeDescriptor::leaf("'a' = 1"),
                TypeDescriptor::leaf("'a' = 2")
            ]
        )
        .is_err());
        assert!(EnumType::from_args(
            8,
            &[
                TypeDescriptor::leaf("'a' = 1"),
                TypeDescriptor::leaf("'b' = 1")
            ]
        )
        .is_err());
    }

    #[test]
    fn test_width_range_enforced() {
        assert!(EnumType::from_args(8, &[TypeDescriptor::leaf("'a' = 128")]).is_err());
        assert!(EnumType::from_args(16, &[TypeDescriptor::leaf("'a' = 128")]).is_ok());
        assert!(EnumType::from_args(16, &[TypeDescriptor::leaf("'a' = 40000")]).is_err());
    }

    #[test]
    fn test_escaped_member_names() {
        let spec = EnumType::from_args(8, &[TypeDescriptor::leaf(r"'it\'s, odd' = 1")]).unwrap();
        assert_eq!(spec.names, vec!["it's, odd"]);
        let e = TypeInstance::Enum(spec);
        let cast = e.cast(Value::from("it's, odd")).unwrap();
        assert_eq!(e.serialize(&cast).unwrap(), r"'it\'s, odd'");
    }

    #[test]
    fn test_serialize_quotes_and_rejects_strays() {
        let e = active_inactive();
        assert_eq!(
            e.serialize(&Value::from("active")).unwrap(),
            "'active'"
        );
        assert!(e.serialize(&Value::from("stray")).is_err());
    }
}
