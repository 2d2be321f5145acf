use tracing::{debug, warn};

use crate::filesystem::{NodeId, ResourceTree, Size, TreeError};
use crate::interpreter::{Diagnostic, Event};

/// Replays session log records against a [`ResourceTree`], tracking the
/// directory the session is currently in.
#[derive(Debug, Clone)]
pub struct Interpreter {
    tree: ResourceTree,
    focus: NodeId,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let tree = ResourceTree::new();
        let focus = tree.root();
        Interpreter {
            tree,
            focus,
            diagnostics: Vec::new(),
        }
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    /// Classifies and applies one raw record. `line_number` is 1-based and is
    /// only used for diagnostics.
    pub fn feed(&mut self, line_number: usize, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        match Event::parse(line) {
            Some(event) => self.apply(line_number, event),
            None => self.report(Diagnostic::MalformedLine {
                line_number,
                line: line.to_string(),
            }),
        }
    }

    pub fn apply(&mut self, line_number: usize, event: Event) {
        match event {
            Event::NavigateRoot => self.navigate_root(),
            Event::NavigateUp => self.navigate_up(line_number),
            Event::NavigateInto(name) => self.navigate_into(line_number, name),
            Event::List => {}
            Event::DeclareDirectory(name) => {
                let result = self.tree.add_directory(self.focus, name);
                self.record_declaration(line_number, result);
            }
            Event::DeclareFile(name, size) => self.declare_file(line_number, name, size),
        }
    }

    pub fn finish(self) -> Interpretation {
        debug!(
            "Built tree with {} directories and {} files, {} diagnostics",
            self.tree.directory_count(),
            self.tree.file_count(),
            self.diagnostics.len()
        );
        Interpretation {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    fn navigate_root(&mut self) {
        self.focus = self.tree.root();
        debug!("Moving to /");
    }

    fn navigate_up(&mut self, line_number: usize) {
        match self.tree.parent(self.focus) {
            Some(parent) => {
                self.focus = parent;
                debug!("Moving to {}", self.tree.path(parent));
            }
            None => self.report(Diagnostic::NavigateUpFromRoot { line_number }),
        }
    }

    /// Names that were never declared are created on the spot, so logs where
    /// `cd` precedes the listing still replay.
    fn navigate_into(&mut self, line_number: usize, name: String) {
        let target = match self.tree.child(self.focus, &name) {
            Some(child) => child,
            None => match self.tree.add_directory(self.focus, name) {
                Ok(created) => {
                    debug!("Created undeclared directory {}", self.tree.path(created));
                    created
                }
                Err(error) => return self.report_tree_error(line_number, error),
            },
        };

        if self.tree.node(target).is_directory() {
            self.focus = target;
            debug!("Moving to {}", self.tree.path(target));
        } else {
            self.report(Diagnostic::NavigateIntoFile {
                line_number,
                path: self.tree.path(target),
            });
        }
    }

    fn declare_file(&mut self, line_number: usize, name: String, size: Size) {
        let result = self.tree.add_file(self.focus, name, size);
        self.record_declaration(line_number, result);
    }

    fn record_declaration(&mut self, line_number: usize, result: Result<NodeId, TreeError>) {
        match result {
            Ok(id) => debug!("Declared {}", self.tree.path(id)),
            Err(error) => self.report_tree_error(line_number, error),
        }
    }

    fn report_tree_error(&mut self, line_number: usize, error: TreeError) {
        let diagnostic = match error {
            TreeError::NameConflict { name, directory } => Diagnostic::NameConflict {
                line_number,
                name,
                directory,
            },
            TreeError::NotADirectory { path } => Diagnostic::NavigateIntoFile { line_number, path },
        };
        self.report(diagnostic);
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// A finished tree together with every problem met while building it.
#[derive(Debug, Clone)]
pub struct Interpretation {
    tree: ResourceTree,
    diagnostics: Vec<Diagnostic>,
}

impl Interpretation {
    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_tree(self) -> ResourceTree {
        self.tree
    }

    pub fn into_parts(self) -> (ResourceTree, Vec<Diagnostic>) {
        (self.tree, self.diagnostics)
    }
}

/// Replays a whole log from the root.
pub fn interpret<I, S>(records: I) -> Interpretation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut interpreter = Interpreter::new();
    for (index, record) in records.into_iter().enumerate() {
        interpreter.feed(index + 1, record.as_ref());
    }
    interpreter.finish()
}

/// Like [`interpret`], discarding the diagnostics.
pub fn build<I, S>(records: I) -> ResourceTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    interpret(records).into_tree()
}
