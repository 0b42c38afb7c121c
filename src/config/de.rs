//! Typed extraction of configuration sub-trees.

use std::str::FromStr;

use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;

use super::node::Node;
use super::ConfigError;

impl<'de> IntoDeserializer<'de, ConfigError> for &'de Node {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

fn unexpected(node: &Node) -> Unexpected<'_> {
    match node {
        Node::Null => Unexpected::Unit,
        Node::Scalar(text) => Unexpected::Str(text),
        Node::Object(_) => Unexpected::Map,
        Node::Array(_) => Unexpected::Seq,
    }
}

/// Parses scalar text into a primitive, reporting the scalar text on failure.
fn parse_scalar<'de, T, V>(node: &'de Node, visitor: &V) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Visitor<'de>,
{
    match node {
        Node::Scalar(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(text), visitor)),
        other => Err(de::Error::invalid_type(unexpected(other), visitor)),
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
                let value = parse_scalar(self, &visitor)?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &'de Node {
    type Error = ConfigError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self {
            Node::Null => visitor.visit_unit(),
            Node::Scalar(text) => visitor.visit_borrowed_str(text),
            Node::Object(map) => {
                let mut access = MapDeserializer::<_, ConfigError>::new(
                    map.iter().map(|(k, v)| (k.as_str(), v)),
                );
                let value = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(value)
            }
            Node::Array(items) => {
                let mut access = SeqDeserializer::<_, ConfigError>::new(items.iter());
                let value = visitor.visit_seq(&mut access)?;
                access.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self {
            Node::Scalar(text) if text.eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            Node::Scalar(text) if text.eq_ignore_ascii_case("false") => visitor.visit_bool(false),
            Node::Scalar(text) => Err(de::Error::invalid_value(Unexpected::Str(text), &visitor)),
            other => Err(de::Error::invalid_type(unexpected(other), &visitor)),
        }
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_i128 => visit_i128,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_u128 => visit_u128,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
        deserialize_char => visit_char,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        match self {
            Node::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        match self {
            Node::Scalar(text) => {
                visitor.visit_enum(IntoDeserializer::<ConfigError>::into_deserializer(
                    text.as_str(),
                ))
            }
            Node::Object(map) if map.len() == 1 => {
                let Some((variant, value)) = map.iter().next() else {
                    return Err(de::Error::invalid_length(0, &"a single-key object"));
                };
                visitor.visit_enum(EnumNode { variant, value })
            }
            other => Err(de::Error::invalid_type(unexpected(other), &"an enum variant")),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ConfigError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier
    }
}

struct EnumNode<'de> {
    variant: &'de str,
    value: &'de Node,
}

impl<'de> EnumAccess<'de> for EnumNode<'de> {
    type Error = ConfigError;
    type Variant = &'de Node;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> Result<(S::Value, Self::Variant), ConfigError> {
        let variant = seed.deserialize(IntoDeserializer::<ConfigError>::into_deserializer(
            self.variant,
        ))?;
        Ok((variant, self.value))
    }
}

impl<'de> VariantAccess<'de> for &'de Node {
    type Error = ConfigError;

    fn unit_variant(self) -> Result<(), ConfigError> {
        match self {
            Node::Null => Ok(()),
            other => Err(de::Error::invalid_type(unexpected(other), &"a unit variant")),
        }
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value, ConfigError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, ConfigError> {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError> {
        de::Deserializer::deserialize_map(self, visitor)
    }
}
