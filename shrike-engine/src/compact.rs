//! Cross-block compaction.

use error::*;

use block::Block;
use container::SharedBlock;


/// Repacks rows across `blocks` so that at most one of them is left
/// partially filled.
///
/// Operates on the blocks directly, bypassing their container: active-set
/// membership is untouched, and emptied blocks stay registered for the
/// caller to release. The blocks must be distinct and belong to a single
/// container; callers must serialize the call against any other access to
/// the same blocks.
///
/// The blocks are sorted ascending by live-row count, then a low cursor
/// (candidate to fill) and a high cursor (candidate to drain) converge:
/// every `move_until_full` either fills the low block or empties the high
/// one, so the scan finishes in at most `2 × blocks.len()` steps.
pub fn compress(blocks: &[SharedBlock]) {
    if blocks.is_empty() {
        return;
    }

    let mut guards: Vec<_> = blocks
        .iter()
        .map(|block| acquire!(raw write block))
        .collect();

    let owner = guards[0].container_id();

    assert!(
        guards.iter().all(|block| block.container_id() == owner),
        "compress across containers"
    );

    debug!("compressing {} blocks of container {}", guards.len(), owner);

    guards.sort_unstable_by_key(|block| block.len());

    let mut first_non_full = 0;
    let mut last_non_empty = guards.len() - 1;

    while first_non_full < last_non_empty {
        if guards[first_non_full].is_full() {
            first_non_full += 1;
        } else if guards[last_non_empty].is_empty() {
            last_non_empty -= 1;
        } else {
            let (filled, drained) = guards.split_at_mut(last_non_empty);

            Block::move_until_full(&mut drained[0], &mut filled[first_non_full]);
        }
    }
}
