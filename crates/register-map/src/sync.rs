use crate::diag::DiagnosticKind;
use crate::encode::{check_range, plan_write, resolve, EditTarget};
use crate::error::{RegisterError, Result};
use crate::objects::object_type;
use crate::snapshot::{NodeStatus, ObjectNode};
use crate::store::RegisterStore;
use crate::types::{extract_bits, FieldLocation, ObjectType};
use serde::Serialize;
use std::sync::{Arc, PoisonError};
use tracing::{debug, warn};

/// The write that confirmed an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub object: u8,
    pub offset: u8,
    pub data: Vec<u8>,
}

impl RegisterStore {
    /// Write one field (or a whole bit group byte) to the device.
    ///
    /// Writes to the same byte are queued: each waits for the previous one
    /// to settle and merges against the byte that write left behind, so
    /// concurrent edits of sibling bitfields never lose each other's bits.
    /// While the write is in flight the node reads `Pending`. A failed write
    /// marks the node `Stale` and leaves it at whatever the snapshot now
    /// holds for it: the parent byte for bitfields, the value from before the
    /// edit when nothing has replaced the pending node.
    pub async fn edit_field(&self, object: u8, field: &str, value: i64) -> Result<EditOutcome> {
        let ty = object_type(object).ok_or(RegisterError::UnknownObject(object))?;
        let target = resolve(ty, field)?;
        check_range(ty, &target, value)?;
        let offset = target.offset().ok_or_else(|| RegisterError::ReadOnlyField {
            object,
            field: field.to_string(),
        })?;

        let lock = self.byte_lock(object, offset);
        let _turn = lock.lock().await;

        let (plan, previous) = {
            let mut snap = self.write_snapshot();
            let obj = snap
                .object_mut(object)
                .ok_or(RegisterError::UnknownObject(object))?;
            let cached = parent_byte(ty, obj, offset);
            let plan = plan_write(ty, &target, value, cached)?;
            let node = obj
                .field_mut(target.name())
                .ok_or_else(|| RegisterError::UnknownField {
                    object,
                    field: field.to_string(),
                })?;
            let previous = node.value;
            node.value = Some(value);
            node.status = NodeStatus::Pending { requested: value };
            (plan, previous)
        };
        debug!(object, offset, data = ?plan.data, field = target.name(), "writing register");

        match self
            .device
            .write_register(object, plan.offset, &plan.data)
            .await
        {
            Ok(()) => {
                self.count(|m| m.reg.register_writes.inc());
                {
                    let mut snap = self.write_snapshot();
                    *self
                        .write_generations
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .entry(object)
                        .or_default() += 1;
                    if let Some(obj) = snap.object_mut(object) {
                        confirm(ty, obj, &target, value, &plan.data);
                    }
                }
                Ok(EditOutcome {
                    object,
                    offset: plan.offset,
                    data: plan.data,
                })
            }
            Err(source) => {
                self.count(|m| m.reg.register_write_failures.inc());
                warn!(object, offset, field = target.name(), error = %source, "register write failed");
                if let Some(obj) = self.write_snapshot().object_mut(object) {
                    restore(ty, obj, &target, value, previous);
                }
                self.report(DiagnosticKind::WriteFailure {
                    object,
                    offset,
                    field: target.name().to_string(),
                    requested: value,
                    reason: source.to_string(),
                });
                Err(RegisterError::Write {
                    object,
                    offset,
                    source,
                })
            }
        }
    }

    fn byte_lock(&self, object: u8, offset: u8) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .byte_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry((object, offset)).or_default())
    }
}

/// Last confirmed value of the bit group byte at `offset`, if there is one.
fn parent_byte(ty: &ObjectType, obj: &ObjectNode, offset: u8) -> Option<u8> {
    let group = ty.group_at(offset)?;
    let value = obj.field(group.name)?.value?;
    u8::try_from(value).ok()
}

/// Settle a node after a failed write without overwriting newer values.
fn restore(
    ty: &ObjectType,
    obj: &mut ObjectNode,
    target: &EditTarget<'_>,
    value: i64,
    previous: Option<i64>,
) {
    let from_byte = match target {
        EditTarget::Field(f) => match f.location {
            FieldLocation::Bitfield {
                offset,
                shift,
                mask,
            } => Some(parent_byte(ty, obj, offset).map(|b| i64::from(extract_bits(b, shift, mask)))),
            _ => None,
        },
        EditTarget::Group(_) => None,
    };
    if let Some(node) = obj.field_mut(target.name()) {
        match from_byte {
            Some(v) => node.value = v,
            // a refresh may have replaced the pending node
            None if node.status == (NodeStatus::Pending { requested: value }) => {
                node.value = previous
            }
            None => {}
        }
        node.status = NodeStatus::Stale { requested: value };
    }
}

fn confirm(ty: &ObjectType, obj: &mut ObjectNode, target: &EditTarget<'_>, value: i64, data: &[u8]) {
    let group = match target {
        EditTarget::Group(g) => Some(*g),
        EditTarget::Field(f) if target.is_bitfield() => {
            f.location.offset().and_then(|o| ty.group_at(o))
        }
        EditTarget::Field(_) => None,
    };
    if let (Some(group), Some(&byte)) = (group, data.first()) {
        if let Some(node) = obj.field_mut(group.name) {
            node.value = Some(i64::from(byte));
            for child in &mut node.children {
                if let Some(FieldLocation::Bitfield { shift, mask, .. }) =
                    ty.field(&child.name).map(|f| f.location)
                {
                    child.value = Some(i64::from(extract_bits(byte, shift, mask)));
                }
            }
        }
    }
    if let Some(node) = obj.field_mut(target.name()) {
        node.value = Some(value);
        node.status = NodeStatus::Confirmed;
    }
}
