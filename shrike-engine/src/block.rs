//! Fixed-capacity attribute blocks.
//!
//! A block holds one aligned buffer per schema column, each sized for
//! `capacity` rows. Rows `[0, len)` are live in every column; the tail is
//! uninitialized memory that is never read and never destructed. All element
//! lifecycle operations go through the column's `AttrType` descriptor.

use std::cmp::min;
use std::sync::Arc;
use uuid::Uuid;

use buffer::RawBuffer;
use container::ContainerId;
use diff::SchemaDiff;
use schema::Schema;
use ty::AttrElement;
use ty::array::{AnyArrayMut, AnyArrayRef};


pub type BlockId = Uuid;

#[derive(Debug)]
pub struct Block {
    id: BlockId,
    container_id: ContainerId,
    info: Arc<Schema>,
    size: usize,
    head: usize,
    buffers: Vec<RawBuffer>,
}

impl Block {
    pub(crate) fn new(container_id: ContainerId, info: Arc<Schema>, size: usize) -> Block {
        assert!(size > 0, "block capacity must be non-zero");

        let buffers = info.iter()
            .map(|attr| RawBuffer::for_attr(attr.ty(), size))
            .collect();

        let block = Block {
            id: Uuid::new_v4(),
            container_id,
            info,
            size,
            head: 0,
            buffers,
        };

        trace!(
            "block {}: allocated {} column buffers of {} rows",
            block.id,
            block.info.len(),
            size
        );

        block
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub(crate) fn container_id(&self) -> ContainerId {
        self.container_id
    }

    #[inline]
    pub fn info(&self) -> &Arc<Schema> {
        &self.info
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// The number of live rows
    #[inline]
    pub fn len(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.head == self.size
    }

    #[inline]
    pub fn unused_capacity(&self) -> usize {
        self.size - self.head
    }

    fn attr_index(&self, name: &str) -> usize {
        match self.info.index_of(name) {
            Some(idx) => idx,
            None => panic!("no attribute {:?} in block {}", name, self.id),
        }
    }

    /// View over the live rows of one column.
    pub fn attr<'b>(&'b self, name: &str) -> AnyArrayRef<'b> {
        let idx = self.attr_index(name);

        self.attr_at(idx)
    }

    pub(crate) fn attr_at<'b>(&'b self, idx: usize) -> AnyArrayRef<'b> {
        let ty = self.info.attr(idx).ty();

        unsafe { AnyArrayRef::from_raw(self.buffers[idx].as_ptr(), self.head, ty) }
    }

    /// Exclusive view over the live rows of one column.
    pub fn attr_mut<'b>(&'b mut self, name: &str) -> AnyArrayMut<'b> {
        let idx = self.attr_index(name);
        let ty = self.info.attr(idx).ty();

        unsafe { AnyArrayMut::from_raw(self.buffers[idx].as_ptr(), self.head, ty) }
    }

    /// Exclusive view spanning the whole capacity, including the
    /// uninitialized tail; relocation target for block-to-block moves.
    pub(crate) fn attr_full_mut<'b>(&'b mut self, idx: usize) -> AnyArrayMut<'b> {
        let ty = self.info.attr(idx).ty();

        unsafe { AnyArrayMut::from_raw(self.buffers[idx].as_ptr(), self.size, ty) }
    }

    /// Typed slice over the live rows of one column.
    pub fn attr_slice<T: AttrElement>(&self, name: &str) -> &[T] {
        self.attr(name).as_slice()
    }

    /// Typed mutable slice over the live rows of one column.
    pub fn attr_slice_mut<T: AttrElement>(&mut self, name: &str) -> &mut [T] {
        use std::any::type_name;
        use std::slice;

        let idx = self.attr_index(name);
        let ty = self.info.attr(idx).ty();

        assert!(
            ty.is::<T>(),
            "attribute type mismatch: {} viewed as {}",
            ty,
            type_name::<T>()
        );

        unsafe { slice::from_raw_parts_mut(self.buffers[idx].as_ptr() as *mut T, self.head) }
    }

    /// Default-constructs `count` rows in every column and extends the live
    /// range over them.
    pub fn append_default(&mut self, count: usize) {
        assert!(
            self.head + count <= self.size,
            "block capacity exceeded: {} + {} rows in a block of {}",
            self.head,
            count,
            self.size
        );

        for (attr, buffer) in self.info.iter().zip(self.buffers.iter()) {
            let ty = attr.ty();

            unsafe {
                ty.construct_default_n(buffer.row_ptr(ty, self.head), count);
            }
        }

        self.head += count;
    }

    /// Default-constructs the live range of a single column.
    ///
    /// This is the populate step for a column introduced by a schema
    /// migration: its rows are allocated but hold no live elements until the
    /// caller makes them live.
    pub fn construct_default(&mut self, name: &str) {
        let idx = self.attr_index(name);
        let ty = self.info.attr(idx).ty();

        unsafe {
            ty.construct_default_n(self.buffers[idx].row_ptr(ty, 0), self.head);
        }
    }

    /// Directly adjusts the live-row count.
    ///
    /// Rows `[0, len)` of every column must be live after the call and rows
    /// beyond it must not be; violating this corrupts later destruction.
    pub unsafe fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.size,
            "length {} exceeds block capacity {}",
            len,
            self.size
        );

        self.head = len;
    }

    /// Destructs the given rows in every column, then compacts the
    /// survivors into a contiguous prefix by pulling replacement rows from
    /// the tail.
    ///
    /// `indices` must be sorted, unique and within the live range. Survivor
    /// order is not preserved; cross-column row correspondence is.
    pub fn destruct_and_reorder(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }

        assert!(
            indices.windows(2).all(|pair| pair[0] < pair[1]),
            "row indices must be sorted and unique"
        );
        assert!(
            *indices.last().unwrap() < self.head,
            "row index out of live range"
        );

        let new_head = self.head - indices.len();

        // pair each hole below the new live range with a surviving tail row;
        // holes within the tail need no filler
        let mut moves = Vec::with_capacity(indices.len());
        let mut src = self.head;

        for &hole in indices.iter().take_while(|&&idx| idx < new_head) {
            src -= 1;
            while indices.binary_search(&src).is_ok() {
                src -= 1;
            }
            moves.push((src, hole));
        }

        debug_assert!(moves.iter().all(|&(src, _)| src >= new_head));

        for (attr, buffer) in self.info.iter().zip(self.buffers.iter()) {
            let ty = attr.ty();

            unsafe {
                for &idx in indices {
                    ty.destruct_n(buffer.row_ptr(ty, idx), 1);
                }

                for &(src, dst) in &moves {
                    ty.relocate_n(buffer.row_ptr(ty, src), buffer.row_ptr(ty, dst), 1);
                }
            }
        }

        self.head = new_head;
    }

    /// Relocates `min(from.len(), to.unused_capacity())` rows from the tail
    /// of `from` into the free tail of `to`.
    ///
    /// Both blocks must belong to the same container; anything else is a
    /// caller bug and aborts.
    pub fn move_until_full(from: &mut Block, to: &mut Block) {
        assert_eq!(
            from.container_id, to.container_id,
            "blocks belong to different containers"
        );
        debug_assert!(Arc::ptr_eq(&from.info, &to.info));

        let amount = min(from.len(), to.unused_capacity());

        if amount == 0 {
            return;
        }

        let attr_count = from.info.len();
        let src_offset = from.head - amount;
        let dst_offset = to.head;

        for idx in 0..attr_count {
            let src = from.attr_full_mut(idx).into_slice(src_offset, amount);
            let mut dst = to.attr_full_mut(idx).into_slice(dst_offset, amount);

            dst.relocate_from_uninitialized(src);
        }

        from.head -= amount;
        to.head += amount;
    }

    /// Migrates this block's buffers to a new schema.
    ///
    /// Every destination buffer is staged before any old buffer is
    /// released, so a single block either migrates fully or aborts.
    /// Columns added by the migration are left without live rows; the
    /// caller populates them before they are read or destructed.
    pub(crate) fn apply_diff(&mut self, diff: &SchemaDiff, new_info: &Arc<Schema>) {
        let new_buffers: Vec<RawBuffer> = new_info
            .iter()
            .map(|attr| RawBuffer::for_attr(attr.ty(), self.size))
            .collect();

        for &(old_idx, new_idx) in diff.retained() {
            let ty = new_info.attr(new_idx).ty();

            unsafe {
                ty.relocate_n(
                    self.buffers[old_idx].row_ptr(ty, 0),
                    new_buffers[new_idx].row_ptr(ty, 0),
                    self.head,
                );
            }
        }

        for &old_idx in diff.dropped() {
            let ty = self.info.attr(old_idx).ty();

            unsafe {
                ty.destruct_n(self.buffers[old_idx].row_ptr(ty, 0), self.head);
            }
        }

        // retained rows were moved out and dropped rows destructed, so the
        // old buffers are free-only at this point
        self.buffers = new_buffers;
        self.info = Arc::clone(new_info);

        trace!("block {}: migrated to {} columns", self.id, self.info.len());
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        for (attr, buffer) in self.info.iter().zip(self.buffers.iter()) {
            let ty = attr.ty();

            unsafe {
                ty.destruct_n(buffer.row_ptr(ty, 0), self.head);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use params::tests::BLOCK_SIZE;
    use schema::SchemaBuilder;
    use ty::AttrType;

    fn xy_schema() -> Arc<Schema> {
        Arc::new(
            SchemaBuilder::new()
                .add("x", AttrType::of::<u64>())
                .add("y", AttrType::of::<u64>())
                .build()
                .unwrap(),
        )
    }

    fn xy_block(owner: ContainerId, rows: &[u64]) -> Block {
        let mut block = Block::new(owner, xy_schema(), BLOCK_SIZE);

        block.append_default(rows.len());
        block.attr_slice_mut::<u64>("x").copy_from_slice(rows);

        {
            let column = block.attr_slice_mut::<u64>("y");
            for (idx, value) in rows.iter().enumerate() {
                column[idx] = value * 10;
            }
        }

        block
    }

    fn xy_rows(block: &Block) -> Vec<(u64, u64)> {
        let x = block.attr_slice::<u64>("x");
        let y = block.attr_slice::<u64>("y");

        x.iter().cloned().zip(y.iter().cloned()).collect()
    }

    fn sorted(mut rows: Vec<(u64, u64)>) -> Vec<(u64, u64)> {
        rows.sort_unstable();
        rows
    }

    #[test]
    fn it_appends_default_rows() {
        let mut block = Block::new(Uuid::new_v4(), xy_schema(), BLOCK_SIZE);

        assert!(block.is_empty());
        assert_eq!(block.unused_capacity(), BLOCK_SIZE);

        block.append_default(3);

        assert_eq!(block.len(), 3);
        assert_eq!(block.unused_capacity(), BLOCK_SIZE - 3);
        assert_eq!(block.attr_slice::<u64>("x"), &[0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "block capacity exceeded")]
    fn it_rejects_capacity_overflow() {
        let mut block = Block::new(Uuid::new_v4(), xy_schema(), BLOCK_SIZE);

        block.append_default(BLOCK_SIZE + 1);
    }

    #[test]
    fn it_exposes_erased_views() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3]);

        {
            let array = block.attr("x");

            assert_eq!(array.len(), 3);
            assert!(array.attr_type().is::<u64>());
            assert_eq!(array.slice(1, 2).as_slice::<u64>(), &[2, 3]);
        }

        let array = block.attr_mut("y");

        assert_eq!(array.len(), 3);
        assert!(array.attr_type().is::<u64>());
    }

    #[test]
    #[should_panic(expected = "no attribute")]
    fn it_rejects_unknown_attributes() {
        let block = Block::new(Uuid::new_v4(), xy_schema(), BLOCK_SIZE);

        block.attr("z");
    }

    #[test]
    #[should_panic(expected = "attribute type mismatch")]
    fn it_rejects_mistyped_column_access() {
        let block = Block::new(Uuid::new_v4(), xy_schema(), BLOCK_SIZE);

        block.attr_slice::<u32>("x");
    }

    #[test]
    fn it_destructs_and_reorders() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3, 4]);

        block.destruct_and_reorder(&[1]);

        assert_eq!(block.len(), 3);
        assert_eq!(sorted(xy_rows(&block)), vec![(1, 10), (3, 30), (4, 40)]);
    }

    #[test]
    fn it_destructs_and_reorders_tail_rows() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3, 4]);

        block.destruct_and_reorder(&[2, 3]);

        assert_eq!(block.len(), 2);
        assert_eq!(sorted(xy_rows(&block)), vec![(1, 10), (2, 20)]);
    }

    #[test]
    fn it_destructs_and_reorders_everything() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3, 4]);

        block.destruct_and_reorder(&[0, 1, 2, 3]);

        assert!(block.is_empty());
    }

    #[test]
    fn it_destructs_and_reorders_mixed_sets() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3, 4]);

        block.destruct_and_reorder(&[0, 3]);

        assert_eq!(block.len(), 2);
        assert_eq!(sorted(xy_rows(&block)), vec![(2, 20), (3, 30)]);
    }

    #[test]
    #[should_panic(expected = "sorted and unique")]
    fn it_rejects_unsorted_removal_indices() {
        let mut block = xy_block(Uuid::new_v4(), &[1, 2, 3]);

        block.destruct_and_reorder(&[2, 0]);
    }

    #[test]
    fn it_tracks_element_lifetimes_across_removal() {
        tracked_type!(Tracked, LIVE);

        let info = Arc::new(
            SchemaBuilder::new()
                .add("payload", AttrType::of::<Tracked>())
                .build()
                .unwrap(),
        );

        {
            let mut block = Block::new(Uuid::new_v4(), info, BLOCK_SIZE);

            block.append_default(4);
            assert_eq!(Tracked::live(), 4);

            block.destruct_and_reorder(&[0, 2]);
            assert_eq!(Tracked::live(), 2);
        }

        // dropping the block destructs the remaining live rows exactly once
        assert_eq!(Tracked::live(), 0);
    }

    #[test]
    fn it_moves_until_full() {
        let owner = Uuid::new_v4();
        let info = xy_schema();

        let mut from = Block::new(owner, Arc::clone(&info), BLOCK_SIZE);
        let mut to = Block::new(owner, info, BLOCK_SIZE);

        from.append_default(3);
        from.attr_slice_mut::<u64>("x").copy_from_slice(&[1, 2, 3]);
        from.attr_slice_mut::<u64>("y").copy_from_slice(&[10, 20, 30]);

        to.append_default(2);
        to.attr_slice_mut::<u64>("x").copy_from_slice(&[8, 9]);
        to.attr_slice_mut::<u64>("y").copy_from_slice(&[80, 90]);

        Block::move_until_full(&mut from, &mut to);

        // min(3 live, 2 free) rows moved, taken from the tail of `from`
        assert_eq!(from.len(), 1);
        assert_eq!(to.len(), BLOCK_SIZE);
        assert_eq!(xy_rows(&from), vec![(1, 10)]);
        assert_eq!(
            sorted(xy_rows(&to)),
            vec![(2, 20), (3, 30), (8, 80), (9, 90)]
        );
    }

    #[test]
    fn it_skips_moves_into_full_blocks() {
        let owner = Uuid::new_v4();
        let info = xy_schema();

        let mut from = Block::new(owner, Arc::clone(&info), BLOCK_SIZE);
        let mut to = Block::new(owner, info, BLOCK_SIZE);

        from.append_default(2);
        to.append_default(BLOCK_SIZE);

        Block::move_until_full(&mut from, &mut to);

        assert_eq!(from.len(), 2);
        assert_eq!(to.len(), BLOCK_SIZE);
    }

    #[test]
    #[should_panic(expected = "different containers")]
    fn it_rejects_cross_container_moves() {
        let info = xy_schema();

        let mut from = Block::new(Uuid::new_v4(), Arc::clone(&info), BLOCK_SIZE);
        let mut to = Block::new(Uuid::new_v4(), info, BLOCK_SIZE);

        from.append_default(1);

        Block::move_until_full(&mut from, &mut to);
    }

    #[test]
    fn it_migrates_retained_columns() {
        use diff::SchemaDiff;

        let mut block = xy_block(Uuid::new_v4(), &[10, 20]);

        let new_info = Arc::new(
            SchemaBuilder::new()
                .add("y", AttrType::of::<u64>())
                .add("z", AttrType::of::<u64>())
                .build()
                .unwrap(),
        );

        let diff = SchemaDiff::new(block.info(), &new_info);
        block.apply_diff(&diff, &new_info);

        assert_eq!(block.len(), 2);
        assert_eq!(block.attr_slice::<u64>("y"), &[100, 200]);

        // the added column holds no live rows until populated
        block.construct_default("z");
        assert_eq!(block.attr_slice::<u64>("z"), &[0, 0]);
    }

    #[test]
    fn it_migrates_dropped_columns_with_destruction() {
        tracked_type!(Tracked, LIVE);

        use diff::SchemaDiff;

        let info = Arc::new(
            SchemaBuilder::new()
                .add("id", AttrType::of::<u64>())
                .add("payload", AttrType::of::<Tracked>())
                .build()
                .unwrap(),
        );

        let mut block = Block::new(Uuid::new_v4(), info, BLOCK_SIZE);
        block.append_default(3);
        assert_eq!(Tracked::live(), 3);

        let new_info = Arc::new(
            SchemaBuilder::new()
                .add("id", AttrType::of::<u64>())
                .build()
                .unwrap(),
        );

        let diff = SchemaDiff::new(block.info(), &new_info);
        block.apply_diff(&diff, &new_info);

        assert_eq!(Tracked::live(), 0);
        assert_eq!(block.len(), 3);
        assert_eq!(block.info().len(), 1);
    }
}
