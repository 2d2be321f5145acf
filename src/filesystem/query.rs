use snafu::{OptionExt, Snafu};
use tracing::debug;

use crate::filesystem::{NodeId, NodeRef, ResourceTree, Size};

/// Walks every directory of a tree exactly once, root first.
///
/// Uses a LIFO stack, so siblings come out in reverse insertion order and a
/// directory's descendants are interleaved with its siblings. Callers should
/// rely only on each directory appearing once.
#[derive(Debug, Clone)]
pub struct DepthFirstDirectories<'a> {
    tree: &'a ResourceTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirstDirectories<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.subdirectories(id));
        Some(self.tree.node_ref(id))
    }
}

impl ResourceTree {
    pub fn depth_first_directories(&self) -> DepthFirstDirectories<'_> {
        DepthFirstDirectories {
            tree: self,
            stack: vec![self.root()],
        }
    }

    pub fn find_directories_where<P>(&self, mut predicate: P) -> impl Iterator<Item = NodeRef<'_>>
    where
        P: FnMut(&NodeRef<'_>) -> bool,
    {
        self.depth_first_directories()
            .filter(move |directory| predicate(directory))
    }

    /// The directory with the smallest aggregate size among those matching
    /// `predicate`. Ties go to the first match in traversal order.
    pub fn find_smallest_satisfying<P>(&self, predicate: P) -> Result<NodeRef<'_>, NoMatchError>
    where
        P: FnMut(&NodeRef<'_>) -> bool,
    {
        self.find_directories_where(predicate)
            .min_by_key(|directory| directory.size())
            .context(NoMatchSnafu {
                directories_searched: self.directory_count(),
            })
    }

    /// Sum of the aggregate sizes of every directory no larger than `threshold`.
    ///
    /// Nested directories are counted once for themselves and again inside
    /// each qualifying ancestor.
    pub fn sum_of_sizes_at_most(&self, threshold: Size) -> Size {
        let total = self
            .find_directories_where(|directory| directory.size() <= threshold)
            .map(|directory| directory.size())
            .sum();
        debug!("Directories of at most {threshold} sum to {total}");
        total
    }

    /// How much has to be deleted so that `required` bytes are free on a
    /// device of `capacity` bytes.
    ///
    /// Zero when enough space is already free. When `required` exceeds
    /// `capacity` the deficit is larger than the whole tree.
    pub fn space_deficit(&self, capacity: Size, required: Size) -> Size {
        let used = self.aggregate_size(self.root());
        let deficit = match capacity.get().checked_sub(required.get()) {
            Some(allowed) => used.saturating_sub(Size::new(allowed)),
            None => used.saturating_add(required.saturating_sub(capacity)),
        };
        debug!("Used {used} of {capacity}, {required} required free, deficit {deficit}");
        deficit
    }

    /// Smallest directory whose deletion frees enough space.
    pub fn smallest_directory_to_free(
        &self,
        capacity: Size,
        required: Size,
    ) -> Result<NodeRef<'_>, NoMatchError> {
        let deficit = self.space_deficit(capacity, required);
        self.find_smallest_satisfying(|directory| directory.size() >= deficit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("None of the {directories_searched} directories satisfy the query"))]
pub struct NoMatchError {
    directories_searched: usize,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::*;

    use super::*;

    /// `/` with `a` (containing `e`) and `d`, as in the day seven example.
    #[fixture]
    fn example_tree() -> ResourceTree {
        let mut tree = ResourceTree::new();
        let root = tree.root();
        let a = tree.add_directory(root, "a").unwrap();
        tree.add_file(root, "b.txt", Size::new(14848514)).unwrap();
        tree.add_file(root, "c.dat", Size::new(8504156)).unwrap();
        let d = tree.add_directory(root, "d").unwrap();
        let e = tree.add_directory(a, "e").unwrap();
        tree.add_file(a, "f", Size::new(29116)).unwrap();
        tree.add_file(a, "g", Size::new(2557)).unwrap();
        tree.add_file(a, "h.lst", Size::new(62596)).unwrap();
        tree.add_file(e, "i", Size::new(584)).unwrap();
        tree.add_file(d, "j", Size::new(4060174)).unwrap();
        tree.add_file(d, "d.log", Size::new(8033020)).unwrap();
        tree.add_file(d, "d.ext", Size::new(5626152)).unwrap();
        tree.add_file(d, "k", Size::new(7214296)).unwrap();
        tree
    }

    #[rstest]
    fn depth_first_visits_every_directory_once(example_tree: ResourceTree) {
        let visited: Vec<_> = example_tree
            .depth_first_directories()
            .map(|directory| directory.path())
            .collect();
        let unique: HashSet<_> = visited.iter().cloned().collect();

        assert_eq!(visited.len(), example_tree.directory_count());
        assert_eq!(unique.len(), visited.len());
        assert_eq!(visited[0], "/");
        for path in ["/", "/a", "/a/e", "/d"] {
            assert!(unique.contains(path), "missing {path}");
        }
    }

    #[rstest]
    fn depth_first_yields_fresh_iterators(example_tree: ResourceTree) {
        assert_eq!(example_tree.depth_first_directories().count(), 4);
        assert_eq!(example_tree.depth_first_directories().count(), 4);
    }

    #[test]
    fn depth_first_on_lone_root() {
        let tree = ResourceTree::new();
        let paths: Vec<_> = tree.depth_first_directories().map(|d| d.path()).collect();
        assert_eq!(paths, ["/"]);
    }

    #[rstest]
    fn filters_directories_by_predicate(example_tree: ResourceTree) {
        let mut small: Vec<_> = example_tree
            .find_directories_where(|d| d.size() <= Size::new(100000))
            .map(|d| d.name().to_string())
            .collect();
        small.sort();
        assert_eq!(small, ["a", "e"]);
    }

    #[rstest]
    fn sums_directories_under_threshold(example_tree: ResourceTree) {
        assert_eq!(
            example_tree.sum_of_sizes_at_most(Size::new(100000)),
            Size::new(95437)
        );
    }

    #[rstest]
    fn finds_smallest_directory_to_free(example_tree: ResourceTree) {
        let directory = example_tree
            .smallest_directory_to_free(Size::new(70000000), Size::new(30000000))
            .unwrap();
        assert_eq!(directory.path(), "/d");
        assert_eq!(directory.size(), Size::new(24933642));
    }

    #[rstest]
    #[case::already_enough_space(100_000_000, 30_000_000, 0)]
    #[case::example_device(70_000_000, 30_000_000, 8_381_165)]
    #[case::required_exceeds_capacity(10, 20, 48_381_175)]
    fn computes_space_deficit(
        example_tree: ResourceTree,
        #[case] capacity: u64,
        #[case] required: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(
            example_tree.space_deficit(Size::new(capacity), Size::new(required)),
            Size::new(expected)
        );
    }

    #[rstest]
    fn zero_deficit_picks_the_smallest_directory(example_tree: ResourceTree) {
        let directory = example_tree
            .smallest_directory_to_free(Size::new(100_000_000), Size::new(1))
            .unwrap();
        assert_eq!(directory.path(), "/a/e");
    }

    #[rstest]
    fn no_match_is_reported(example_tree: ResourceTree) {
        let result = example_tree.find_smallest_satisfying(|d| d.size() > Size::new(u64::MAX - 1));
        assert_eq!(
            result.unwrap_err(),
            NoMatchError {
                directories_searched: 4
            }
        );
    }

    #[rstest]
    fn impossible_requirement_has_no_match(example_tree: ResourceTree) {
        let result = example_tree.smallest_directory_to_free(Size::new(10), Size::new(20));
        assert!(result.is_err());
    }

    #[test]
    fn no_match_error_display() {
        let error = NoMatchError {
            directories_searched: 7,
        };
        assert_eq!(
            error.to_string(),
            "None of the 7 directories satisfy the query"
        );
    }
}
