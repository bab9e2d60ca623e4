//! Block containers.
//!
//! A container owns the current schema, a fixed block capacity and the set
//! of active blocks. Membership of the active set is the only internally
//! synchronized state: `new_block` / `release_block` may race freely.
//! Row data inside blocks and the schema pointer are deliberately not
//! guarded; callers must quiesce all readers and writers before
//! `update_attributes` or `compress`, and `count_active` /
//! `flatten_attribute` only produce a consistent result while nothing else
//! mutates the container.

use std::sync::{Arc, RwLock};

use rayon::prelude::*;
use uuid::Uuid;

use block::Block;
use diff::SchemaDiff;
use error::*;
use params::DEFAULT_BLOCK_SIZE;
use schema::{Schema, SchemaBuilder};
use ty::AttrElement;
use ty::array::AnyArrayMut;


pub type ContainerId = Uuid;

/// Shared handle to an active block.
///
/// The container holds one reference; callers may hold more. A released
/// block is destructed once the last handle goes away.
pub type SharedBlock = Arc<RwLock<Block>>;

#[derive(Debug)]
pub struct BlockContainer {
    id: ContainerId,
    info: RwLock<Arc<Schema>>,
    block_size: usize,
    blocks: RwLock<Vec<SharedBlock>>,
}

impl BlockContainer {
    pub fn new(schema: SchemaBuilder, block_size: usize) -> Result<BlockContainer> {
        ensure!(block_size > 0, "block size must be non-zero");

        let info = Arc::new(schema.build()?);

        Ok(BlockContainer {
            id: Uuid::new_v4(),
            info: locked!(rw info),
            block_size,
            blocks: locked!(rw Vec::new()),
        })
    }

    pub fn with_default_block_size(schema: SchemaBuilder) -> Result<BlockContainer> {
        BlockContainer::new(schema, DEFAULT_BLOCK_SIZE)
    }

    #[inline]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Snapshot of the current schema.
    pub fn info(&self) -> Arc<Schema> {
        Arc::clone(acquire!(read self.info))
    }

    /// Allocates a block for the current schema and registers it in the
    /// active set.
    pub fn new_block(&self) -> SharedBlock {
        let block = Block::new(self.id, self.info(), self.block_size);

        debug!(
            "container {}: new block {} (capacity {})",
            self.id,
            block.id(),
            self.block_size
        );

        let block = Arc::new(locked!(rw block));

        acquire!(write self.blocks).push(Arc::clone(&block));

        block
    }

    /// Removes the block from the active set.
    ///
    /// The block's rows are destructed and its buffers freed once the last
    /// outstanding handle is dropped; it must not be used after this call.
    pub fn release_block(&self, block: &SharedBlock) -> Result<()> {
        let mut blocks = acquire!(raw write self.blocks);

        let position = blocks
            .iter()
            .position(|registered| Arc::ptr_eq(registered, block))
            .ok_or_else(|| {
                format_err!("block is not registered in container {}", self.id)
            })?;

        let released = blocks.remove(position);

        debug!(
            "container {}: released block {}",
            self.id,
            acquire!(read released).id()
        );

        Ok(())
    }

    /// Sum of live rows over the active set; a snapshot only.
    pub fn count_active(&self) -> usize {
        acquire!(read self.blocks)
            .iter()
            .map(|block| acquire!(read block).len())
            .sum()
    }

    /// Copy-constructs one column's live rows from every active block, in
    /// active-set order, into `dst`.
    ///
    /// `dst` must hold exactly `count_active()` uninitialized slots of the
    /// column's type; a mismatch is a caller bug and aborts.
    pub fn flatten_attribute(&self, name: &str, dst: &mut AnyArrayMut) {
        let info = self.info();
        let ty = match info.type_of(name) {
            Some(ty) => ty,
            None => panic!("no attribute {:?} in container {}", name, self.id),
        };

        assert_eq!(dst.attr_type(), &**ty, "flatten destination type mismatch");

        let blocks = acquire!(raw read self.blocks);

        let total: usize = blocks.iter().map(|block| acquire!(read block).len()).sum();

        assert_eq!(
            dst.len(),
            total,
            "flatten destination must hold exactly {} rows",
            total
        );

        BlockContainer::flatten_into(&blocks, name, dst);
    }

    /// Flattens one column into a freshly allocated `Vec`.
    pub fn flatten_attribute_vec<T: AttrElement>(&self, name: &str) -> Vec<T> {
        use std::any::type_name;

        let info = self.info();
        let ty = match info.type_of(name) {
            Some(ty) => ty,
            None => panic!("no attribute {:?} in container {}", name, self.id),
        };

        assert!(
            ty.is::<T>(),
            "attribute type mismatch: {} flattened as {}",
            ty,
            type_name::<T>()
        );

        let blocks = acquire!(raw read self.blocks);

        let total: usize = blocks.iter().map(|block| acquire!(read block).len()).sum();

        let mut out: Vec<T> = Vec::with_capacity(total);

        {
            let mut dst =
                unsafe { AnyArrayMut::from_raw(out.as_mut_ptr() as *mut u8, total, &**ty) };

            BlockContainer::flatten_into(&blocks, name, &mut dst);
        }

        unsafe {
            out.set_len(total);
        }

        out
    }

    fn flatten_into(blocks: &[SharedBlock], name: &str, dst: &mut AnyArrayMut) {
        let mut offset = 0;

        for block in blocks {
            let block = acquire!(read block);
            let src = block.attr(name);

            dst.slice_mut(offset, src.len()).copy_from_uninitialized(&src);

            offset += src.len();
        }
    }

    /// Replaces the container schema, migrating every active block in
    /// place.
    ///
    /// Retained columns keep their values through an uninitialized move,
    /// dropped columns are destructed, and added columns come up without
    /// live rows; callers populate them (e.g. via
    /// `Block::construct_default`) before treating them as valid. The new
    /// schema becomes visible only after every block has been migrated.
    ///
    /// Blocks are migrated independently and in parallel; an allocation
    /// failure along the way aborts the process, as there is no way to roll
    /// back blocks whose old buffers were already released.
    pub fn update_attributes(&self, schema: SchemaBuilder) -> Result<()> {
        let new_info = Arc::new(schema.build()?);

        let mut info = acquire!(carry write self.info)?;
        let blocks = acquire!(carry write self.blocks)?;

        let diff = SchemaDiff::new(&info, &new_info);

        debug!(
            "container {}: migrating {} blocks ({} retained, {} added, {} dropped columns)",
            self.id,
            blocks.len(),
            diff.retained().len(),
            diff.added().len(),
            diff.dropped().len()
        );

        blocks.par_iter().for_each(|block| {
            let mut block = acquire!(raw write block);

            block.apply_diff(&diff, &new_info);
        });

        *info = new_info;

        Ok(())
    }
}
