use crate::error::{RegisterError, Result};
use crate::snapshot::{ObjectNode, ObjectStatus, RegisterNode};
use crate::types::{extract_bits, BitGroup, FieldLocation, ObjectType};
use mxt_transport::ObjectPayload;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Decoded object payload: field (or bit group) name to integer value.
pub type RawFields = BTreeMap<String, i64>;

/// Objects whose length depends on the sensor; short images are zero-filled.
const ZERO_PADDED: &[u8] = &[56];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub node: ObjectNode,
    /// Payload keys that matched no descriptor, in key order
    pub unknown: Vec<String>,
}

/// Flatten a device payload into integer fields.
pub fn raw_fields_from_payload(object: u8, payload: &ObjectPayload) -> Result<RawFields> {
    let map = payload.as_object().ok_or_else(|| RegisterError::Decode {
        object,
        reason: "payload is not an object".into(),
    })?;
    let mut raw = RawFields::new();
    for (name, value) in map {
        let v = value
            .as_i64()
            .ok_or_else(|| RegisterError::Decode {
                object,
                reason: format!("{name} is not an integer: {value}"),
            })?;
        raw.insert(name.clone(), v);
    }
    Ok(raw)
}

/// Build the field tree of one object from its raw fields.
///
/// Nodes follow descriptor order. Sibling bitfields are emitted once, under
/// their group node, at the position of the first of them. Reserved fields
/// become read-only leaves without a value, whatever the payload carries.
/// Unknown payload keys are logged and returned, never fatal.
pub fn build(ty: &ObjectType, raw: &RawFields) -> Result<BuildOutput> {
    let key = ty.key();
    let padded = ZERO_PADDED.contains(&ty.id);
    let lookup = |name: &str| -> Option<i64> {
        raw.get(name)
            .copied()
            .or(if padded { Some(0) } else { None })
    };

    let mut fields = Vec::with_capacity(ty.fields.len());
    let mut emitted: HashSet<u8> = HashSet::new();
    for f in ty.fields {
        match f.location {
            FieldLocation::Concrete { .. } => {
                fields.push(RegisterNode::leaf(
                    format!("{key}.{}", f.name),
                    f.name,
                    lookup(f.name),
                    false,
                ));
            }
            FieldLocation::Bitfield { offset, .. } => {
                if !emitted.insert(offset) {
                    continue;
                }
                let Some(group) = ty.group_at(offset) else {
                    continue;
                };
                let byte = match lookup(group.name) {
                    Some(v) => Some(u8::try_from(v).map_err(|_| RegisterError::Decode {
                        object: ty.id,
                        reason: format!("{} = {v} does not fit a byte", group.name),
                    })?),
                    None => None,
                };
                let mut node = RegisterNode::leaf(
                    format!("{key}.{}", group.name),
                    group.name,
                    byte.map(i64::from),
                    false,
                );
                node.children = group_children(ty, group, byte);
                fields.push(node);
            }
            FieldLocation::Unmapped => {
                fields.push(RegisterNode::leaf(format!("{key}.{}", f.name), f.name, None, true));
            }
        }
    }

    let unknown: Vec<String> = raw
        .keys()
        .filter(|name| ty.field(name).is_none() && ty.group(name).is_none())
        .cloned()
        .collect();
    for name in &unknown {
        warn!(object = ty.id, field = %name, "payload field has no descriptor");
    }

    Ok(BuildOutput {
        node: ObjectNode {
            id: ty.id,
            key,
            name: ty.name.to_string(),
            status: ObjectStatus::Fresh,
            fields,
        },
        unknown,
    })
}

/// Child nodes of a bit group, valued from the parent byte.
pub(crate) fn group_children(ty: &ObjectType, group: &BitGroup, byte: Option<u8>) -> Vec<RegisterNode> {
    ty.bitfields_at(group.offset)
        .filter_map(|f| match f.location {
            FieldLocation::Bitfield { shift, mask, .. } => Some(RegisterNode::leaf(
                format!("{}.{}.{}", ty.key(), group.name, f.name),
                f.name,
                byte.map(|b| i64::from(extract_bits(b, shift, mask))),
                false,
            )),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{T56, T7, T8};
    use serde_json::json;

    fn raw(payload: serde_json::Value) -> RawFields {
        raw_fields_from_payload(0, &payload).unwrap()
    }

    #[test]
    fn cfg_byte_decodes_into_bitfields() {
        let out = build(&T7, &raw(json!({ "CFG": 0x03 }))).unwrap();
        let cfg = out.node.field("CFG").unwrap();
        assert_eq!(cfg.value, Some(0x03));
        let values: Vec<(&str, Option<i64>)> = cfg
            .children
            .iter()
            .map(|c| (c.name.as_str(), c.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("IDLEPIPEEN", Some(1)),
                ("ACTVPIPEEN", Some(1)),
                ("ACTV2IDLETOMSB", Some(0)),
                ("OVFRPTSUP", Some(0)),
                ("INITACTV", Some(0)),
            ]
        );
        assert_eq!(cfg.children[1].key, "t7.CFG.ACTVPIPEEN");
    }

    #[test]
    fn nodes_follow_descriptor_order() {
        let out = build(
            &T7,
            &raw(json!({ "ACTVACQINTFINE": 1, "IDLEACQINT": 32, "CFG2": 0, "CFG": 0 })),
        )
        .unwrap();
        let names: Vec<&str> = out.node.fields.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "IDLEACQINT",
                "ACTVACQINT",
                "ACTV2IDLETO",
                "CFG",
                "CFG2",
                "IDLEACQINTFINE",
                "ACTVACQINTFINE",
            ]
        );
        assert_eq!(out.node.field("IDLEACQINT").unwrap().value, Some(32));
        assert_eq!(out.node.field("ACTVACQINT").unwrap().value, None);
    }

    #[test]
    fn reserved_fields_are_readonly_leaves() {
        let out = build(&T8, &raw(json!({ "CHRGTIME": 10 }))).unwrap();
        for name in ["reserved", "reserved2"] {
            let node = out.node.field(name).unwrap();
            assert!(node.readonly);
            assert_eq!(node.value, None);
        }
        assert!(out
            .node
            .fields
            .iter()
            .filter(|n| !n.readonly)
            .all(|n| n.name != "reserved" && n.name != "reserved2"));
    }

    #[test]
    fn reserved_leaves_ignore_payload_values() {
        let out = build(&T8, &raw(json!({ "reserved": 0x55, "reserved2": 1, "CHRGTIME": 3 }))).unwrap();
        assert_eq!(out.node.field("reserved").unwrap().value, None);
        assert_eq!(out.node.field("reserved2").unwrap().value, None);
        assert_eq!(out.node.field("CHRGTIME").unwrap().value, Some(3));
        assert!(out.unknown.is_empty());
    }

    #[test]
    fn unknown_keys_are_reported_without_aborting() {
        let out = build(&T7, &raw(json!({ "IDLEACQINT": 5, "BOGUS": 1 }))).unwrap();
        assert_eq!(out.unknown, vec!["BOGUS".to_string()]);
        assert_eq!(out.node.field("IDLEACQINT").unwrap().value, Some(5));
    }

    #[test]
    fn non_integer_payload_is_a_decode_error() {
        let err = raw_fields_from_payload(7, &json!({ "IDLEACQINT": "fast" })).unwrap_err();
        assert!(matches!(err, RegisterError::Decode { object: 7, .. }));
        assert!(raw_fields_from_payload(7, &json!([1, 2])).is_err());
    }

    #[test]
    fn oversized_group_byte_is_a_decode_error() {
        let err = build(&T7, &raw(json!({ "CFG": 0x1FF }))).unwrap_err();
        assert!(matches!(err, RegisterError::Decode { .. }));
    }

    #[test]
    fn short_t56_image_is_zero_filled() {
        let out = build(&T56, &raw(json!({ "CTRL": 1, "OPTINT": 4 }))).unwrap();
        assert_eq!(out.node.field("OPTINT").unwrap().value, Some(4));
        assert_eq!(out.node.field("YLONOISEMUL").unwrap().value, Some(0));
        assert_eq!(out.node.field("ENABLE").unwrap().value, Some(1));
    }
}
