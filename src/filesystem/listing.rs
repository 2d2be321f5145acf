use std::fmt;

use colored::Colorize;

use crate::filesystem::{NodeId, ResourceTree};

/// Indented rendering of a directory and everything below it.
///
/// ```text
/// /
///  - a  (Dir, 94853)
///    - e  (Dir, 584)
///      - i  (File, 584)
///  - b.txt  (File, 14848514)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    tree: &'a ResourceTree,
    start: NodeId,
    max_depth: Option<usize>,
    colorize: bool,
}

impl<'a> Listing<'a> {
    pub fn new(tree: &'a ResourceTree, start: NodeId) -> Self {
        Listing {
            tree,
            start,
            max_depth: None,
            colorize: false,
        }
    }

    /// Limits how many levels below the start are shown. `0` shows only the
    /// start itself.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    fn directory_name(&self, name: &str) -> String {
        if self.colorize {
            name.blue().bold().to_string()
        } else {
            name.to_string()
        }
    }

    fn push_children(&self, stack: &mut Vec<(NodeId, usize)>, parent: NodeId, level: usize) {
        let children: Vec<_> = self.tree.children(parent).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, level)));
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            self.directory_name(self.tree.node(self.start).name())
        )?;

        let mut stack = Vec::new();
        self.push_children(&mut stack, self.start, 0);
        while let Some((id, level)) = stack.pop() {
            if self.max_depth.is_some_and(|max| level >= max) {
                continue;
            }

            let node = self.tree.node(id);
            let indent = "  ".repeat(level);
            let size = self.tree.aggregate_size(id);
            if node.is_directory() {
                writeln!(
                    f,
                    "{indent} - {}  (Dir, {size})",
                    self.directory_name(node.name())
                )?;
                self.push_children(&mut stack, id, level + 1);
            } else {
                writeln!(f, "{indent} - {}  (File, {size})", node.name())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::filesystem::Size;

    fn small_tree() -> ResourceTree {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let a = tree.add_directory(root, "a").unwrap();
        tree.add_file(root, "f1", Size::new(100)).unwrap();
        let e = tree.add_directory(a, "e").unwrap();
        tree.add_file(a, "f2", Size::new(50)).unwrap();
        tree.add_file(e, "i", Size::new(7)).unwrap();
        tree
    }

    #[test]
    fn renders_whole_tree_in_insertion_order() {
        let tree = small_tree();
        let rendered = Listing::new(&tree, tree.root()).to_string();
        assert_eq!(
            rendered,
            indoc! {"
                /
                 - a  (Dir, 57)
                   - e  (Dir, 7)
                     - i  (File, 7)
                   - f2  (File, 50)
                 - f1  (File, 100)
            "}
        );
    }

    #[test]
    fn depth_limit_hides_deeper_levels() {
        let tree = small_tree();
        let rendered = Listing::new(&tree, tree.root())
            .max_depth(Some(1))
            .to_string();
        assert_eq!(
            rendered,
            indoc! {"
                /
                 - a  (Dir, 57)
                 - f1  (File, 100)
            "}
        );
    }

    #[test]
    fn zero_depth_shows_only_the_start() {
        let tree = small_tree();
        let rendered = Listing::new(&tree, tree.root())
            .max_depth(Some(0))
            .to_string();
        assert_eq!(rendered, "/\n");
    }

    #[test]
    fn can_start_below_the_root() {
        let tree = small_tree();
        let a = tree.child(tree.root(), "a").unwrap();
        let rendered = Listing::new(&tree, a).to_string();
        assert_eq!(
            rendered,
            indoc! {"
                a
                 - e  (Dir, 7)
                   - i  (File, 7)
                 - f2  (File, 50)
            "}
        );
    }
}
