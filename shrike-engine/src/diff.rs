//! Schema migration plans.

use schema::Schema;


/// Column mapping between an old and a new schema.
///
/// Attributes are matched by name and type; an attribute that keeps its name
/// but changes type is treated as dropped and re-added. Computed once per
/// `update_attributes` call and discarded after the migration pass.
#[derive(Debug)]
pub struct SchemaDiff {
    retained: Vec<(usize, usize)>,
    dropped: Vec<usize>,
    added: Vec<usize>,
    new_len: usize,
}

impl SchemaDiff {
    pub fn new(old: &Schema, new: &Schema) -> SchemaDiff {
        let mut retained = Vec::new();
        let mut dropped = Vec::new();

        for (old_idx, attr) in old.iter().enumerate() {
            match new.index_of(attr.name()) {
                Some(new_idx) if new.attr(new_idx).ty().id() == attr.ty().id() => {
                    retained.push((old_idx, new_idx));
                }
                _ => {
                    dropped.push(old_idx);
                }
            }
        }

        let mut kept = vec![false; new.len()];

        for &(_, new_idx) in &retained {
            kept[new_idx] = true;
        }

        let added = (0..new.len()).filter(|&idx| !kept[idx]).collect();

        SchemaDiff {
            retained,
            dropped,
            added,
            new_len: new.len(),
        }
    }

    /// Column pairs present in both schemas, as (old index, new index).
    #[inline]
    pub fn retained(&self) -> &[(usize, usize)] {
        &self.retained
    }

    /// Old indices of columns absent from the new schema.
    #[inline]
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    /// New indices of columns absent from the old schema.
    #[inline]
    pub fn added(&self) -> &[usize] {
        &self.added
    }

    #[inline]
    pub fn new_len(&self) -> usize {
        self.new_len
    }
}
