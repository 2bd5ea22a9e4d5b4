//! Consistency checks over descriptor tables.
//!
//! Run once by `RegisterStore::new`; a table that fails here never reaches a device.

use crate::objects::CATALOG;
use crate::types::{FieldLocation, ObjectType};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("T{object}: duplicate name {name}")]
    DuplicateName { object: u8, name: &'static str },
    #[error("T{object}.{field}: empty mask")]
    EmptyMask { object: u8, field: &'static str },
    #[error("T{object}.{field}: shift {shift} does not match mask {mask:#04x}")]
    ShiftMismatch {
        object: u8,
        field: &'static str,
        shift: u8,
        mask: u8,
    },
    #[error("T{object}.{field}: mask {mask:#04x} is not contiguous")]
    SplitMask {
        object: u8,
        field: &'static str,
        mask: u8,
    },
    #[error("T{object}.{field}: no bit group declared at offset {offset}")]
    MissingGroup {
        object: u8,
        field: &'static str,
        offset: u8,
    },
    #[error("T{object}: bit group {group} has no bitfields")]
    EmptyGroup { object: u8, group: &'static str },
    #[error("T{object}.{field}: overlaps bits {bits:#04x} at offset {offset}")]
    Overlap {
        object: u8,
        field: &'static str,
        offset: u8,
        bits: u8,
    },
    #[error("T{object}.{field}: width {width} is not 1 or 2")]
    BadWidth {
        object: u8,
        field: &'static str,
        width: u8,
    },
    #[error("T{object}.{field}: offset {offset} lies outside the {size}-byte object")]
    OutOfObject {
        object: u8,
        field: &'static str,
        offset: u8,
        size: u8,
    },
}

/// Check one descriptor table.
pub fn validate(ty: &ObjectType) -> Result<(), LayoutError> {
    let object = ty.id;
    let mut names = HashSet::new();
    for name in ty
        .fields
        .iter()
        .map(|f| f.name)
        .chain(ty.groups.iter().map(|g| g.name))
    {
        if !names.insert(name) {
            return Err(LayoutError::DuplicateName { object, name });
        }
    }

    let mut claimed = vec![0u8; ty.size as usize];
    let mut claim = |field: &'static str, offset: u8, bits: u8| -> Result<(), LayoutError> {
        let slot = claimed
            .get_mut(offset as usize)
            .ok_or(LayoutError::OutOfObject {
                object,
                field,
                offset,
                size: ty.size,
            })?;
        if *slot & bits != 0 {
            return Err(LayoutError::Overlap {
                object,
                field,
                offset,
                bits: *slot & bits,
            });
        }
        *slot |= bits;
        Ok(())
    };

    for f in ty.fields {
        match f.location {
            FieldLocation::Concrete { offset, width } => {
                if !(1..=2).contains(&width) {
                    return Err(LayoutError::BadWidth {
                        object,
                        field: f.name,
                        width,
                    });
                }
                for i in 0..width {
                    let at = offset.checked_add(i).ok_or(LayoutError::OutOfObject {
                        object,
                        field: f.name,
                        offset,
                        size: ty.size,
                    })?;
                    claim(f.name, at, 0xFF)?;
                }
            }
            FieldLocation::Bitfield {
                offset,
                shift,
                mask,
            } => {
                if mask == 0 {
                    return Err(LayoutError::EmptyMask {
                        object,
                        field: f.name,
                    });
                }
                if u32::from(shift) != mask.trailing_zeros() {
                    return Err(LayoutError::ShiftMismatch {
                        object,
                        field: f.name,
                        shift,
                        mask,
                    });
                }
                let run = mask >> shift;
                if run & run.wrapping_add(1) != 0 {
                    return Err(LayoutError::SplitMask {
                        object,
                        field: f.name,
                        mask,
                    });
                }
                if ty.group_at(offset).is_none() {
                    return Err(LayoutError::MissingGroup {
                        object,
                        field: f.name,
                        offset,
                    });
                }
                claim(f.name, offset, mask)?;
            }
            FieldLocation::Unmapped => {}
        }
    }

    let mut group_offsets = HashSet::new();
    for g in ty.groups {
        if !group_offsets.insert(g.offset) || ty.bitfields_at(g.offset).next().is_none() {
            return Err(LayoutError::EmptyGroup {
                object,
                group: g.name,
            });
        }
    }
    Ok(())
}

/// Check every table in the catalog, reporting the first violation.
pub fn validate_catalog() -> Result<(), LayoutError> {
    CATALOG.iter().try_for_each(|ty| validate(ty))
}
