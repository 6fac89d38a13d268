use clap::{Args, ValueEnum};
use dao_tlk::{TalkTable, TlkItemPair};
use itertools::Itertools;
use miette::{miette, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{fmt::Display, path::PathBuf};

use super::open_table;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    #[default]
    Symantic,
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String, String),
    Removed(String, String),
    Comparison(String, String, String),
    Context(Vec<String>),
    Modified(String, String, Vec<Change>, Vec<Change>),
}

impl Change {
    fn table(name: &str) -> Self {
        Change::Modified("tables".into(), name.into(), Vec::new(), Vec::new())
    }

    pub fn with_children(&mut self, children: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, vec, _) => {
                vec.extend(children);
                Ok(())
            }
            _ => Err(miette!("tried to add children to an addition or removal")),
        }
    }

    pub fn with_related(&mut self, related: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, _, vec) => {
                vec.extend(related);
                Ok(())
            }
            _ => Err(miette!("tried to add related to an addition or removal")),
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(_, v) => {
                writeln!(f, "✅ {}", v.green())
            }
            Change::Removed(_, v) => {
                writeln!(f, "❌ {}", v.red())
            }
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Context(values) => {
                writeln!(f, "{}", values.iter().map(|l| format!(" {l}")).join("\n"))
            }
            Change::Modified(_, v, children, related) => {
                let mut txt_final = related.iter().map(|c| format!("{}", c)).join("");

                let mut section = String::new();
                let mut current_key = String::new();
                for c in children {
                    let key = match c {
                        Change::Added(key, _) => format!("* {} added:\n", key),
                        Change::Removed(key, _) => format!("* {} removed:\n", key),
                        Change::Modified(key, _, _, _) => format!("* {} modified:\n", key),
                        _ => current_key.clone(),
                    };

                    if current_key != key {
                        if !section.is_empty() {
                            txt_final.push_str(
                                &section.split('\n').map(|l| "  ".to_string() + l).join("\n"),
                            );
                            txt_final.push('\n');
                        }
                        section.clear();

                        txt_final.push_str(&key);
                        current_key = key
                    }

                    section.push_str(&format!("{}\n", c));
                }

                txt_final.push_str(&section.split('\n').map(|l| "  ".to_string() + l).join("\n"));

                writeln!(f, "🔃 {}", v.blue())?;
                writeln!(
                    f,
                    "{}",
                    txt_final
                        .split('\n')
                        .filter(|l| l.trim().len() > 1)
                        .map(|l| "  ".to_string() + l)
                        .join("\n")
                )
            }
        }
    }
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input TLK file
    #[arg(value_name = "LEFT")]
    left: PathBuf,

    /// An input TLK file
    #[arg(value_name = "RIGHT")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t=Mode::Symantic)]
    mode: Mode,

    /// Print the differences as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DiffArgs {
    fn inline_changes(old: &str, new: &str) -> Vec<String> {
        let diff = TextDiff::from_lines(old, new);

        let mut comparison = Vec::new();
        for op in diff.ops().iter() {
            for change in diff.iter_inline_changes(op) {
                let mut context = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    if emphasized {
                        if change.tag() == ChangeTag::Insert {
                            context.push_str(&format!("{}", value.green().underline()));
                        } else {
                            context.push_str(&format!("{}", value.red().underline()));
                        }
                    } else {
                        context.push_str(&format!("{}", value.dimmed()));
                    }
                }
                comparison.push(context.trim_end().to_string());
            }
        }
        comparison
    }

    fn handle_strings(&self, pairs: &[TlkItemPair]) -> Vec<Change> {
        pairs
            .iter()
            .map(|pair| match (&pair.left, &pair.right) {
                (Some(l), Some(r)) => {
                    let context = if self.mode == Mode::Full {
                        Self::inline_changes(
                            &l.text.to_string_lossy(),
                            &r.text.to_string_lossy(),
                        )
                    } else {
                        Vec::new()
                    };
                    Change::Modified(
                        "strings".into(),
                        pair.ref_id().to_string(),
                        vec![],
                        vec![Change::Context(context)],
                    )
                }
                (Some(l), None) => Change::Removed("strings".into(), l.to_string()),
                (None, Some(r)) => Change::Added("strings".into(), r.to_string()),
                (None, None) => Change::Context(Vec::new()),
            })
            .collect()
    }

    fn handle_tlk(
        &self,
        name: &str,
        left: &TalkTable,
        right: &TalkTable,
        pairs: &[TlkItemPair],
    ) -> Result<Option<Change>> {
        let mut result: Option<Change> = None;

        if left.len() != right.len() {
            result
                .get_or_insert_with(|| Change::table(name))
                .with_related(vec![Change::Comparison(
                    "references".into(),
                    left.len().to_string(),
                    right.len().to_string(),
                )])?;
        }

        if self.mode == Mode::Full {
            if left.records().len() != right.records().len() {
                result
                    .get_or_insert_with(|| Change::table(name))
                    .with_related(vec![Change::Comparison(
                        "strings".into(),
                        left.records().len().to_string(),
                        right.records().len().to_string(),
                    )])?;
            }

            if left.metadata() != right.metadata() {
                let hex = |m: &[u8]| m.iter().map(|b| format!("{b:02X}")).join("");
                result
                    .get_or_insert_with(|| Change::table(name))
                    .with_related(vec![Change::Comparison(
                        "metadata".into(),
                        hex(left.metadata()),
                        hex(right.metadata()),
                    )])?;
            }
        }

        let changes = self.handle_strings(pairs);
        if !changes.is_empty() {
            result
                .get_or_insert_with(|| Change::table(name))
                .with_children(changes)?;
        }

        Ok(result)
    }

    pub fn handle(&self) -> Result<()> {
        let left = open_table(&self.left)?;
        let right = open_table(&self.right)?;

        let pairs = left.diff(&right);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&pairs).into_diagnostic()?
            );
            return Ok(());
        }

        let difference = self.handle_tlk(&self.left.to_string_lossy(), &left, &right, &pairs)?;

        if let Some(d) = difference {
            println!("{}", d);
        }

        Ok(())
    }
}
