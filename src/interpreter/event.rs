use crate::filesystem::{ROOT_NAME, Size};

const COMMAND_MARKER: &str = "$ ";
const PARENT_DIRECTORY: &str = "..";

/// One classified line of a session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `$ cd /`
    NavigateRoot,
    /// `$ cd ..`
    NavigateUp,
    /// `$ cd <name>`
    NavigateInto(String),
    /// `$ ls`. Listing lines describe themselves, so this carries nothing.
    List,
    /// `dir <name>`
    DeclareDirectory(String),
    /// `<size> <name>`
    DeclareFile(String, Size),
}

impl Event {
    /// Classifies a line, or returns `None` when it matches no known record.
    pub fn parse(line: &str) -> Option<Self> {
        match line.strip_prefix(COMMAND_MARKER) {
            Some(command) => Self::parse_command(command),
            None => Self::parse_listing(line),
        }
    }

    /// Commands are matched on single spaces, like listing lines, so a
    /// directory declared as `dir my dir` is entered with `$ cd my dir`.
    fn parse_command(command: &str) -> Option<Self> {
        if command == "ls" {
            return Some(Event::List);
        }
        let event = match command.strip_prefix("cd ")? {
            ROOT_NAME => Event::NavigateRoot,
            PARENT_DIRECTORY => Event::NavigateUp,
            name if !name.is_empty() && !name.contains('/') => {
                Event::NavigateInto(name.to_string())
            }
            _ => return None,
        };
        Some(event)
    }

    fn parse_listing(line: &str) -> Option<Self> {
        let (head, name) = line.split_once(' ')?;
        if name.is_empty() {
            return None;
        }
        if head == "dir" {
            return Some(Event::DeclareDirectory(name.to_string()));
        }
        let size = head.parse::<u64>().ok()?;
        Some(Event::DeclareFile(name.to_string(), Size::new(size)))
    }
}
