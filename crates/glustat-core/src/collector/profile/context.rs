//! Brick context tracking while walking a profile report.

use crate::models::TagSet;

/// Current tags for one volume's report.
///
/// Starts empty; every `Brick:` header replaces the tags for the lines that
/// follow, until the next header.
#[derive(Debug, Clone)]
pub struct BrickContext<'a> {
    volume: &'a str,
    tags: TagSet,
}

impl<'a> BrickContext<'a> {
    pub fn new(volume: &'a str) -> Self {
        Self {
            volume,
            tags: TagSet::new(),
        }
    }

    /// Switches to a new brick and returns the resulting tags.
    pub fn on_brick_header(&mut self, brick: &str) -> &TagSet {
        self.tags = TagSet::for_brick(self.volume, brick);
        &self.tags
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn volume(&self) -> &str {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_empty() {
        let ctx = BrickContext::new("vol0");
        assert!(ctx.tags().is_empty());
        assert_eq!(ctx.volume(), "vol0");
    }

    #[test]
    fn test_context_brick_header_replaces_tags() {
        let mut ctx = BrickContext::new("vol0");
        ctx.on_brick_header("node1:/bricks/b1");
        assert_eq!(ctx.tags().brick(), Some("node1:/bricks/b1"));

        let tags = ctx.on_brick_header("node2:/bricks/b2").clone();
        assert_eq!(tags.volume(), Some("vol0"));
        assert_eq!(tags.brick(), Some("node2:/bricks/b2"));
        assert_eq!(ctx.tags(), &tags);
    }
}
