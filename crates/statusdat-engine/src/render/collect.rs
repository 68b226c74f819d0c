use std::io::{self, Write};

use crate::block::Block;

use super::Renderer;

/// Keeps every emitted block instead of writing anything.
///
/// Backs the batch API ([`StatusParser::collect`](crate::StatusParser::collect)).
#[derive(Debug, Default)]
pub struct BlockCollector {
    blocks: Vec<Block>,
}

impl BlockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl Renderer for BlockCollector {
    fn name(&self) -> &str {
        "collect"
    }

    fn begin(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        self.blocks.clear();
        Ok(())
    }

    fn emit(&mut self, block: &Block, _out: &mut dyn Write) -> io::Result<()> {
        self.blocks.push(block.clone());
        Ok(())
    }
}

/// Groups blocks by type, types in order of first appearance.
pub fn group_by_type(blocks: Vec<Block>) -> Vec<(String, Vec<Block>)> {
    let mut groups: Vec<(String, Vec<Block>)> = Vec::new();
    for block in blocks {
        match groups.iter_mut().find(|(t, _)| t == block.block_type()) {
            Some((_, members)) => members.push(block),
            None => groups.push((block.block_type().to_string(), vec![block])),
        }
    }
    groups
}
