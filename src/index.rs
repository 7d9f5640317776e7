//! In-memory ordered index of courses.
//!
//! `CourseIndex` is an AVL tree keyed on the course number. Every insertion
//! rebalances on the way back up the recursion, so lookups stay logarithmic
//! and the in-order walk always yields courses in ascending course-number
//! order. Nodes are owned exclusively by their parent (or by the index for the
//! root); rotations only move `Box`es between slots and never clone or drop a
//! course once it has been stored.
//!
//! There is no removal. When the catalog needs to reflect fresh data the
//! caller builds a new index from a bulk load.

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::models::Course;

#[derive(Debug)]
struct Node {
    course: Course,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    height: usize,
}

/// Height of an optional subtree; an absent child counts as zero.
fn height(node: &Option<Box<Node>>) -> usize {
    node.as_ref().map_or(0, |node| node.height)
}

impl Node {
    fn new(course: Course) -> Self {
        Self {
            course,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn key(&self) -> &str {
        &self.course.number
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

/// AVL tree of courses keyed by course number.
///
/// Inserting a number that is already present is a silent no-op and looking up
/// a missing number returns `None`; neither is treated as an error.
#[derive(Debug, Default)]
pub struct CourseIndex {
    root: Option<Box<Node>>,
    len: usize,
}

impl CourseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct courses stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree, zero when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Course stored at the root, mostly useful to observe rebalancing.
    pub fn root(&self) -> Option<&Course> {
        self.root.as_deref().map(|node| &node.course)
    }

    /// Insert a course, rebalancing along the insertion path.
    ///
    /// Returns `false` when a course with the same number already exists; the
    /// stored course is kept unchanged in that case.
    pub fn insert(&mut self, course: Course) -> bool {
        let key = course.number.clone();
        let mut inserted = false;
        self.root = Some(insert_at(self.root.take(), course, &key, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Exact lookup by course number.
    pub fn find(&self, number: &str) -> Option<&Course> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match number.cmp(node.key()) {
                Ordering::Equal => return Some(&node.course),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Start a fresh in-order walk. Each call is independent of any other
    /// traversal in progress.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(self.root.as_deref(), self.len)
    }
}

/// Recursive insertion that hands the (possibly new) subtree root back to the
/// caller so the parent slot can be relinked.
fn insert_at(
    slot: Option<Box<Node>>,
    course: Course,
    key: &str,
    inserted: &mut bool,
) -> Box<Node> {
    let mut node = match slot {
        Some(node) => node,
        None => {
            *inserted = true;
            return Box::new(Node::new(course));
        }
    };

    match key.cmp(node.key()) {
        Ordering::Less => node.left = Some(insert_at(node.left.take(), course, key, inserted)),
        Ordering::Greater => {
            node.right = Some(insert_at(node.right.take(), course, key, inserted))
        }
        Ordering::Equal => return node,
    }

    node.update_height();
    rebalance(node, key)
}

/// Pick the rotation case from where the inserted key landed relative to the
/// heavy child, not from the child's own balance.
fn rebalance(mut node: Box<Node>, key: &str) -> Box<Node> {
    let balance = node.balance_factor();

    if balance > 1 {
        match node.left.as_ref().map(|left| key.cmp(left.key())) {
            Some(Ordering::Less) => return rotate_right(node),
            Some(Ordering::Greater) => {
                node.left = node.left.take().map(rotate_left);
                return rotate_right(node);
            }
            _ => {}
        }
    } else if balance < -1 {
        match node.right.as_ref().map(|right| key.cmp(right.key())) {
            Some(Ordering::Greater) => return rotate_left(node),
            Some(Ordering::Less) => {
                node.right = node.right.take().map(rotate_right);
                return rotate_left(node);
            }
            _ => {}
        }
    }

    node
}

/// Promote `x.right` to the subtree root. `x` keeps the promoted node's old
/// left subtree as its new right child.
fn rotate_left(mut x: Box<Node>) -> Box<Node> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

/// Mirror of [`rotate_left`].
fn rotate_right(mut y: Box<Node>) -> Box<Node> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

/// Lazy in-order iterator over an index, driven by an explicit stack of the
/// left spine still to visit.
#[derive(Clone)]
pub struct InOrder<'a> {
    stack: Vec<&'a Node>,
    remaining: usize,
}

impl<'a> InOrder<'a> {
    fn new(root: Option<&'a Node>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Course;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.course)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for InOrder<'_> {}

impl FusedIterator for InOrder<'_> {}

impl<'a> IntoIterator for &'a CourseIndex {
    type Item = &'a Course;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Course> for CourseIndex {
    fn extend<I: IntoIterator<Item = Course>>(&mut self, iter: I) {
        for course in iter {
            self.insert(course);
        }
    }
}

impl FromIterator<Course> for CourseIndex {
    fn from_iter<I: IntoIterator<Item = Course>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn course(number: &str) -> Course {
        Course::new(number, format!("Title {number}"), Vec::new())
    }

    /// Walk the whole tree checking cached heights, AVL balance and key order.
    /// Returns the verified height of the subtree.
    fn check_subtree(node: &Option<Box<Node>>, lower: Option<&str>, upper: Option<&str>) -> usize {
        let Some(node) = node else {
            return 0;
        };
        if let Some(lower) = lower {
            assert!(node.key() > lower, "{} not above {}", node.key(), lower);
        }
        if let Some(upper) = upper {
            assert!(node.key() < upper, "{} not below {}", node.key(), upper);
        }
        let left = check_subtree(&node.left, lower, Some(node.key()));
        let right = check_subtree(&node.right, Some(node.key()), upper);
        assert!(
            left.abs_diff(right) <= 1,
            "node {} unbalanced: left {left}, right {right}",
            node.key()
        );
        assert_eq!(node.height, 1 + left.max(right), "stale height at {}", node.key());
        node.height
    }

    fn check_invariants(index: &CourseIndex) {
        let height = check_subtree(&index.root, None, None);
        assert_eq!(height, index.height());
        assert_eq!(index.iter().count(), index.len());
    }

    fn keys(index: &CourseIndex) -> Vec<&str> {
        index.iter().map(|course| course.number.as_str()).collect()
    }

    fn child_keys(index: &CourseIndex) -> (Option<&str>, Option<&str>) {
        let root = index.root.as_deref().expect("root present");
        (
            root.left.as_deref().map(Node::key),
            root.right.as_deref().map(Node::key),
        )
    }

    #[test]
    fn empty_index_has_nothing() {
        let index = CourseIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.height(), 0);
        assert!(index.find("CS101").is_none());
        assert_eq!(index.iter().next(), None);
        check_invariants(&index);
    }

    #[rstest]
    #[case::right_right(["A", "B", "C"])]
    #[case::left_left(["C", "B", "A"])]
    #[case::left_right(["C", "A", "B"])]
    #[case::right_left(["A", "C", "B"])]
    fn three_keys_settle_with_middle_at_root(#[case] order: [&str; 3]) {
        let index: CourseIndex = order.iter().map(|number| course(number)).collect();

        check_invariants(&index);
        assert_eq!(index.root().map(|c| c.number.as_str()), Some("B"));
        assert_eq!(child_keys(&index), (Some("A"), Some("C")));
        assert_eq!(index.height(), 2);
    }

    #[test]
    fn balanced_insert_order_needs_no_rotation() {
        let mut index = CourseIndex::new();
        index.insert(course("CS101"));
        index.insert(course("CS050"));
        index.insert(course("CS201"));

        assert_eq!(keys(&index), ["CS050", "CS101", "CS201"]);
        assert_eq!(index.root().map(|c| c.number.as_str()), Some("CS101"));
        assert_eq!(child_keys(&index), (Some("CS050"), Some("CS201")));
    }

    #[test]
    fn duplicate_insert_keeps_original_record() {
        let mut index = CourseIndex::new();
        assert!(index.insert(Course::new("X100", "First", vec!["A1".into()])));
        assert!(!index.insert(Course::new("X100", "Second", Vec::new())));

        let found = index.find("X100").expect("course stored");
        assert_eq!(found.title, "First");
        assert_eq!(found.prerequisites, vec!["A1".to_string()]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn keys_compare_as_text() {
        let index: CourseIndex = ["CS50", "CS100", "CS9"].iter().map(|n| course(n)).collect();
        assert_eq!(keys(&index), ["CS100", "CS50", "CS9"]);
    }

    #[test]
    fn invariants_hold_after_every_sequential_insert() {
        let mut index = CourseIndex::new();
        for n in 0..1000 {
            index.insert(course(&format!("C{n:04}")));
            check_invariants(&index);
        }
        assert_eq!(index.len(), 1000);
        // AVL height bound for 1000 nodes.
        assert!(index.height() <= 14, "height {}", index.height());
    }

    #[test]
    fn invariants_hold_for_zigzag_inserts() {
        let mut index = CourseIndex::new();
        let (mut low, mut high) = (0, 500);
        while low < high {
            index.insert(course(&format!("Z{low:03}")));
            check_invariants(&index);
            high -= 1;
            index.insert(course(&format!("Z{high:03}")));
            check_invariants(&index);
            low += 1;
        }
        assert_eq!(index.len(), 500);
    }

    proptest::proptest! {
        #[test]
        fn every_insert_keeps_tree_balanced(keys in proptest::collection::vec("[A-F][0-9]{1,2}", 0..200)) {
            let mut index = CourseIndex::new();
            for key in &keys {
                index.insert(course(key));
                check_invariants(&index);
            }
        }
    }

    #[test]
    fn traversals_are_independent() {
        let index: CourseIndex = ["B", "A", "C", "D"].iter().map(|n| course(n)).collect();
        let mut first = index.iter();
        assert_eq!(first.next().map(|c| c.number.as_str()), Some("A"));
        let second: Vec<_> = index.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(second, ["A", "B", "C", "D"]);
        assert_eq!(first.len(), 3);
        assert_eq!(first.next().map(|c| c.number.as_str()), Some("B"));
    }
}
