//! Deterministic binary codec for [`StackValue`].
//!
//! Both directions are iterative: serialization drives an explicit
//! work stack so deeply nested values cannot overflow the call stack,
//! and deserialization parses a flat token sequence that a second pass
//! folds bottom-up into containers. The emitted byte stream is part of
//! consensus; every node must produce it bit for bit.

use std::collections::HashSet;

use crate::constants::{MAX_ARRAY_SIZE, MAX_ITEM_SIZE};
use crate::error::{InteropError, InteropResult};
use crate::io::{BinaryWriter, MemoryReader};
use crate::stack_value::{bigint_from_bytes, bigint_to_bytes, StackValue, ValueKind, ValueList, ValueMap};

/// Binary (de)serializer for stack values.
pub struct BinarySerializer;

enum Token {
    Value(StackValue),
    Container { kind: ValueKind, count: usize },
}

impl BinarySerializer {
    /// Serializes a value under the default item size cap.
    pub fn serialize(item: &StackValue) -> InteropResult<Vec<u8>> {
        Self::serialize_with_limit(item, MAX_ITEM_SIZE)
    }

    /// Serializes a value, failing once the output exceeds `max_size`.
    ///
    /// Containers reachable from themselves (or reachable twice) fail
    /// with `NotSupported`, as do interop handles.
    pub fn serialize_with_limit(item: &StackValue, max_size: usize) -> InteropResult<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut pending: Vec<StackValue> = vec![item.clone()];

        while let Some(current) = pending.pop() {
            match &current {
                StackValue::ByteArray(bytes) => {
                    writer.write_u8(ValueKind::ByteArray as u8);
                    writer.write_var_bytes(bytes);
                }
                StackValue::Boolean(value) => {
                    writer.write_u8(ValueKind::Boolean as u8);
                    writer.write_bool(*value);
                }
                StackValue::Integer(value) => {
                    writer.write_u8(ValueKind::Integer as u8);
                    writer.write_var_bytes(&bigint_to_bytes(value));
                }
                StackValue::Array(list) | StackValue::Struct(list) => {
                    if !visited.insert(list.id()) {
                        return Err(InteropError::not_supported(
                            "circular reference in serialized value",
                        ));
                    }
                    writer.write_u8(current.kind() as u8);
                    let items = list.items();
                    writer.write_var_int(items.len() as u64);
                    // Reverse push so the stream is an in-order traversal.
                    pending.extend(items.into_iter().rev());
                }
                StackValue::Map(map) => {
                    if !visited.insert(map.id()) {
                        return Err(InteropError::not_supported(
                            "circular reference in serialized value",
                        ));
                    }
                    writer.write_u8(ValueKind::Map as u8);
                    let entries = map.entries();
                    writer.write_var_int(entries.len() as u64);
                    // (value, key) push order emits each key before its value.
                    for (key, value) in entries.into_iter().rev() {
                        pending.push(value);
                        pending.push(key);
                    }
                }
                StackValue::InteropHandle(_) => {
                    return Err(InteropError::not_supported(
                        "interop handles are not serializable",
                    ));
                }
            }

            if writer.len() > max_size {
                return Err(InteropError::ItemTooLarge {
                    size: writer.len(),
                    limit: max_size,
                });
            }
        }

        Ok(writer.into_bytes())
    }

    /// Deserializes a value under the default limits.
    pub fn deserialize(data: &[u8]) -> InteropResult<StackValue> {
        Self::deserialize_with_limits(data, MAX_ITEM_SIZE, MAX_ARRAY_SIZE)
    }

    /// Deserializes a value, bounding scalar payloads by `max_size`
    /// and each container header by `max_array`.
    pub fn deserialize_with_limits(
        data: &[u8],
        max_size: usize,
        max_array: usize,
    ) -> InteropResult<StackValue> {
        let mut reader = MemoryReader::new(data);
        let mut tokens: Vec<Token> = Vec::new();
        let mut undecoded: usize = 1;

        while undecoded > 0 {
            undecoded -= 1;
            let tag = reader.read_u8()?;
            let kind = ValueKind::from_byte(tag).ok_or_else(|| {
                InteropError::deformed(format!("unknown tag byte {tag:#04x}"))
            })?;
            match kind {
                ValueKind::ByteArray => {
                    let bytes = reader.read_var_bytes(max_size)?.to_vec();
                    tokens.push(Token::Value(StackValue::ByteArray(bytes)));
                }
                ValueKind::Boolean => {
                    tokens.push(Token::Value(StackValue::Boolean(reader.read_bool()?)));
                }
                ValueKind::Integer => {
                    let bytes = reader.read_var_bytes(max_size)?;
                    tokens.push(Token::Value(StackValue::Integer(bigint_from_bytes(bytes))));
                }
                ValueKind::Array | ValueKind::Struct => {
                    let count = reader.read_var_int(max_array as u64)? as usize;
                    tokens.push(Token::Container { kind, count });
                    undecoded += count;
                }
                ValueKind::Map => {
                    let count = reader.read_var_int(max_array as u64)? as usize;
                    tokens.push(Token::Container { kind, count });
                    undecoded += count * 2;
                }
                ValueKind::InteropHandle => {
                    return Err(InteropError::deformed(
                        "interop handles cannot appear in a serialized stream",
                    ));
                }
            }
        }

        // Fold the flat token sequence bottom-up: walking the tokens in
        // reverse leaves each container's children on the rebuild stack
        // in stream order.
        let mut rebuilt: Vec<StackValue> = Vec::new();
        while let Some(token) = tokens.pop() {
            match token {
                Token::Value(value) => rebuilt.push(value),
                Token::Container { kind, count } => match kind {
                    ValueKind::Array | ValueKind::Struct => {
                        let list = ValueList::new(Vec::new());
                        for _ in 0..count {
                            list.push(rebuilt.pop().ok_or_else(|| {
                                InteropError::deformed("container children missing")
                            })?);
                        }
                        rebuilt.push(match kind {
                            ValueKind::Array => StackValue::Array(list),
                            _ => StackValue::Struct(list),
                        });
                    }
                    ValueKind::Map => {
                        let map = ValueMap::new();
                        for _ in 0..count {
                            let key = rebuilt.pop().ok_or_else(|| {
                                InteropError::deformed("map key missing")
                            })?;
                            let value = rebuilt.pop().ok_or_else(|| {
                                InteropError::deformed("map value missing")
                            })?;
                            if key.is_container() {
                                return Err(InteropError::deformed(
                                    "map key must not be a container",
                                ));
                            }
                            map.push_entry(key, value);
                        }
                        rebuilt.push(StackValue::Map(map));
                    }
                    _ => unreachable!(),
                },
            }
        }

        rebuilt
            .pop()
            .ok_or_else(|| InteropError::deformed("empty stream"))
    }
}
