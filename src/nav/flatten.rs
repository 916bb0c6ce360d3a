use crate::formset::{BlockHandle, FormsetManager};

/// One rendered line of the block list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlatRow {
    Header {
        handle: BlockHandle,
        removable: bool,
    },
    Field {
        handle: BlockHandle,
        field: usize,
    },
}

pub fn flatten_rows(formset: &FormsetManager) -> Vec<FlatRow> {
    let mut out = Vec::new();
    for b in formset.bound_blocks().iter().chain(formset.blocks()) {
        out.push(FlatRow::Header {
            handle: b.handle,
            removable: b.removable,
        });
        for field in 0..b.fields.len() {
            out.push(FlatRow::Field {
                handle: b.handle,
                field,
            });
        }
    }
    out
}

/// Row numbers of the selectable (field) rows.
pub fn field_rows(rows: &[FlatRow]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, r)| matches!(r, FlatRow::Field { .. }))
        .map(|(i, _)| i)
        .collect()
}

/// Ordinal of the first selectable row belonging to `handle`.
pub fn first_field_of(rows: &[FlatRow], handle: BlockHandle) -> Option<usize> {
    rows.iter()
        .filter(|r| matches!(r, FlatRow::Field { .. }))
        .position(|r| matches!(r, FlatRow::Field { handle: h, .. } if *h == handle))
}
