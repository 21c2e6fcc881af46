use crate::policy::markcompactspace::MarkCompactSpace;
use crate::util::options::Options;
use crate::util::statistics::CollectionStats;
use crate::util::Address;
use crate::vm::MutatorStack;

/// Everything a work packet may touch during one collection: the frozen mutator stack,
/// the heap, and the state that packets of earlier stages leave for later ones.
pub struct GCWorker<'w, 's, 'h> {
    pub stack: &'w mut MutatorStack<'s>,
    pub space: &'w mut MarkCompactSpace<'h>,
    /// The innermost frame pointer of the mutator.
    pub first_frame: Address,
    pub options: &'w Options,
    /// Root slot addresses, in stack order. Filled in by root scanning.
    pub roots: Vec<Address>,
    /// The root slots whose word named a block start when marking began. Only these are
    /// rewritten and checked; every other root is left as it was.
    pub traced_roots: Vec<Address>,
    /// Blocks marked but not yet scanned.
    pub mark_queue: Vec<usize>,
    /// The allocation cursor after compaction.
    pub new_cursor: Option<Address>,
    pub stats: CollectionStats,
}

impl<'w, 's, 'h> GCWorker<'w, 's, 'h> {
    pub fn new(
        stack: &'w mut MutatorStack<'s>,
        space: &'w mut MarkCompactSpace<'h>,
        first_frame: Address,
        options: &'w Options,
    ) -> Self {
        GCWorker {
            stack,
            space,
            first_frame,
            options,
            roots: vec![],
            traced_roots: vec![],
            mark_queue: vec![],
            new_cursor: None,
            stats: CollectionStats::default(),
        }
    }
}
