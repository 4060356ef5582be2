//! Line-oriented command interpreter over one tree of each kind.
//!
//! Each input line is parsed into a [`Command`] and executed against the
//! shell's AVL, Red-Black or B-tree instance. Execution never fails: every
//! problem (unknown token, missing argument, absent key, unsupported order)
//! is reported as an [`Output::Error`] line and the shell stays usable.

use std::str::FromStr;

use crate::avl::AvlTree;
use crate::btree::{BTree, BTreeError};
use crate::config::ShellConfig;
use crate::ordered_tree::{OrderedTree, extend_from};
use crate::red_black::RedBlackTree;
use crate::traversal::{ParseOrderError, TraversalOrder};

const HELP_HINT: &str = "Type HELP to see the available commands";

const HELP_TEXT: &[&str] = &[
    "Insertion: <Tree> I <key>",
    "Deletion:  <Tree> R <key>",
    "Search:    <Tree> S <key>",
    "Creation:  <Tree> NEW",
    "        PS: a B-tree takes an optional minimum degree: BT NEW <number>",
    "Print:     PRINT <Order> <Tree>",
    "Copy:      COPY <Order> <Tree> <Tree>",
    "Size:      SIZE <Tree>",
    "Check:     CHECK <Tree>",
    "",
    "<Tree>: VL or AVL (AVL tree); RB (Red-Black tree); BT (B-tree)",
    "<Order>: PRE (pre-order); IN (in-order); POS (post-order)",
    "<key>: any text without spaces",
    "<number>: a natural number, at least 1",
];

/// One line of shell output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Regular output, meant for stdout.
    Line(String),
    /// A diagnostic, meant for stderr.
    Error(String),
}

/// Which of the shell's trees a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Avl,
    RedBlack,
    BTree,
}

impl TreeKind {
    /// Name echoed before a tree command's output.
    const fn banner(self) -> &'static str {
        match self {
            Self::Avl => "AVL",
            Self::RedBlack => "RedBlack",
            Self::BTree => "BTree",
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Avl => "VL",
            Self::RedBlack => "RB",
            Self::BTree => "BT",
        }
    }
}

impl FromStr for TreeKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VL" | "AVL" => Ok(Self::Avl),
            "RB" => Ok(Self::RedBlack),
            "BT" => Ok(Self::BTree),
            _ => Err(CommandError::UnexpectedToken(s.to_string())),
        }
    }
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New {
        tree: TreeKind,
        min_degree: Option<usize>,
    },
    Insert {
        tree: TreeKind,
        key: String,
    },
    Remove {
        tree: TreeKind,
        key: String,
    },
    Search {
        tree: TreeKind,
        key: String,
    },
    Print {
        order: TraversalOrder,
        tree: TreeKind,
    },
    Copy {
        order: TraversalOrder,
        source: TreeKind,
        target: TreeKind,
    },
    Size(TreeKind),
    Check(TreeKind),
    Help,
}

/// Error returned when an input line is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A token that is not a known command word or tree name.
    UnexpectedToken(String),
    /// The command ended before a required argument.
    MissingArgument(&'static str),
    /// An order tag other than `PRE`, `IN` or `POS`.
    InvalidOrder(ParseOrderError),
    /// A B-tree minimum degree that is not a positive integer.
    InvalidDegree(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken(token) => {
                write!(f, "unexpected token '{token}' - {HELP_HINT}")
            }
            Self::MissingArgument(what) => write!(f, "missing {what} - {HELP_HINT}"),
            Self::InvalidOrder(err) => write!(f, "{err}"),
            Self::InvalidDegree(value) => {
                write!(f, "invalid minimum degree '{value}' (must be at least 1)")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ParseOrderError> for CommandError {
    fn from(err: ParseOrderError) -> Self {
        Self::InvalidOrder(err)
    }
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match head.to_ascii_uppercase().as_str() {
            "PRINT" => Self::Print {
                order: order_arg(args.first().copied())?,
                tree: tree_arg(args.get(1).copied())?,
            },
            "COPY" => Self::Copy {
                order: order_arg(args.first().copied())?,
                source: tree_arg(args.get(1).copied())?,
                target: tree_arg(args.get(2).copied())?,
            },
            "SIZE" => Self::Size(tree_arg(args.first().copied())?),
            "CHECK" => Self::Check(tree_arg(args.first().copied())?),
            "HELP" => Self::Help,
            _ => Self::parse_tree_command(head.parse()?, args)?,
        };
        Ok(Some(command))
    }

    fn parse_tree_command(tree: TreeKind, args: &[&str]) -> Result<Self, CommandError> {
        let operation = args
            .first()
            .ok_or(CommandError::MissingArgument("operation"))?;
        let key = || {
            args.get(1)
                .map(|key| (*key).to_string())
                .ok_or(CommandError::MissingArgument("key"))
        };

        match operation.to_ascii_uppercase().as_str() {
            "NEW" => {
                let min_degree = match (tree, args.get(1)) {
                    (TreeKind::BTree, Some(value)) => Some(
                        value
                            .parse::<usize>()
                            .ok()
                            .filter(|&degree| degree >= 1)
                            .ok_or_else(|| CommandError::InvalidDegree((*value).to_string()))?,
                    ),
                    _ => None,
                };
                Ok(Self::New { tree, min_degree })
            }
            "I" => Ok(Self::Insert { tree, key: key()? }),
            "R" => Ok(Self::Remove { tree, key: key()? }),
            "S" => Ok(Self::Search { tree, key: key()? }),
            _ => Err(CommandError::UnexpectedToken((*operation).to_string())),
        }
    }

    /// Line echoed before the command's output.
    const fn banner(&self) -> Option<&'static str> {
        match self {
            Self::New { tree, .. }
            | Self::Insert { tree, .. }
            | Self::Remove { tree, .. }
            | Self::Search { tree, .. } => Some(tree.banner()),
            Self::Print { .. } => Some("Print"),
            Self::Copy { .. } => Some("Copy"),
            Self::Size(_) => Some("Size"),
            Self::Check(_) => Some("Check"),
            Self::Help => None,
        }
    }
}

fn order_arg(token: Option<&str>) -> Result<TraversalOrder, CommandError> {
    let token = token.ok_or(CommandError::MissingArgument("traversal order"))?;
    Ok(token.parse()?)
}

fn tree_arg(token: Option<&str>) -> Result<TreeKind, CommandError> {
    token
        .ok_or(CommandError::MissingArgument("tree"))?
        .parse()
}

/// The interpreter state: one tree of each kind over string keys.
pub struct Shell {
    avl: AvlTree<String>,
    red_black: RedBlackTree<String>,
    btree: BTree<String>,
    config: ShellConfig,
}

impl Shell {
    /// Create a shell with empty trees.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.btree_min_degree` is 0.
    pub fn new(config: ShellConfig) -> Result<Self, BTreeError> {
        Ok(Self {
            avl: AvlTree::new(),
            red_black: RedBlackTree::new(),
            btree: BTree::new(config.btree_min_degree)?,
            config,
        })
    }

    /// Parse and execute one input line.
    pub fn handle_line(&mut self, line: &str) -> Vec<Output> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::debug!(line, %err, "shell: rejected line");
                return vec![Output::Error(err.to_string())];
            }
        };
        tracing::debug!(?command, "shell: executing");

        let mut out = Vec::new();
        if let Some(banner) = command.banner().filter(|_| self.config.echo) {
            out.push(Output::Line(banner.to_string()));
        }
        self.execute(command, &mut out);
        out
    }

    fn tree(&self, kind: TreeKind) -> &dyn OrderedTree<String> {
        match kind {
            TreeKind::Avl => &self.avl,
            TreeKind::RedBlack => &self.red_black,
            TreeKind::BTree => &self.btree,
        }
    }

    fn tree_mut(&mut self, kind: TreeKind) -> &mut dyn OrderedTree<String> {
        match kind {
            TreeKind::Avl => &mut self.avl,
            TreeKind::RedBlack => &mut self.red_black,
            TreeKind::BTree => &mut self.btree,
        }
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Output>) {
        match command {
            Command::New { tree, min_degree } => {
                if tree == TreeKind::BTree {
                    let degree = min_degree.unwrap_or(self.config.btree_min_degree);
                    match BTree::new(degree) {
                        Ok(btree) => self.btree = btree,
                        Err(err) => {
                            out.push(Output::Error(err.to_string()));
                            return;
                        }
                    }
                } else {
                    self.tree_mut(tree).clear();
                }
                out.push(Output::Line("new tree".to_string()));
            }
            Command::Insert { tree, key } => {
                let line = format!("insertion {key}");
                if self.tree_mut(tree).insert(key) {
                    out.push(Output::Line(line));
                } else {
                    out.push(Output::Error(format!("key already present in {}", tree.tag())));
                }
            }
            Command::Remove { tree, key } => match self.tree_mut(tree).remove(&key) {
                Some(removed) => out.push(Output::Line(format!("deletion {removed}"))),
                None => out.push(Output::Error(format!("key not found: {key}"))),
            },
            Command::Search { tree, key } => match self.tree(tree).search(&key) {
                Some(found) => out.push(Output::Line(format!("found {found}"))),
                None => out.push(Output::Error(format!("key not found: {key}"))),
            },
            Command::Print { order, tree } => match self.tree(tree).export(order) {
                Ok(Some(keys)) => out.extend(keys.into_iter().map(Output::Line)),
                Ok(None) => out.push(Output::Error("empty tree".to_string())),
                Err(err) => out.push(Output::Error(err.to_string())),
            },
            Command::Copy {
                order,
                source,
                target,
            } => {
                let keys = match self.tree(source).export(order) {
                    Ok(keys) => keys.unwrap_or_default(),
                    Err(err) => {
                        out.push(Output::Error(err.to_string()));
                        return;
                    }
                };
                let total = keys.len();
                let destination = self.tree_mut(target);
                destination.clear();
                let copied = extend_from(destination, keys);
                out.push(Output::Line(format!(
                    "copied {copied} of {total} keys from {} to {}",
                    source.tag(),
                    target.tag()
                )));
            }
            Command::Size(tree) => {
                out.push(Output::Line(self.tree(tree).len().to_string()));
            }
            Command::Check(tree) => match self.tree(tree).check_invariants() {
                Ok(()) => out.push(Output::Line("ok".to_string())),
                Err(violation) => {
                    tracing::warn!(%violation, tree = tree.tag(), "shell: invariant check failed");
                    out.push(Output::Error(violation.to_string()));
                }
            },
            Command::Help => {
                out.extend(HELP_TEXT.iter().map(|line| Output::Line((*line).to_string())));
            }
        }
    }
}
