//! Value-table inspection commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use smartcab_core::Action;
use smartcab_rl::export::{load_snapshot, SnapshotFile};
use smartcab_rl::ValueTable;

#[derive(Subcommand)]
pub enum TableCommands {
    /// Show the best action per state from a JSON snapshot
    Show {
        /// Snapshot written with `--format json`
        path: PathBuf,
        /// Only show the first N states
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

pub async fn run(cmd: TableCommands) -> Result<()> {
    match cmd {
        TableCommands::Show { path, limit } => show(&path, limit).await,
    }
}

async fn show(path: &Path, limit: Option<usize>) -> Result<()> {
    let snapshot = load_snapshot(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    print!("{}", render(&snapshot, limit));
    Ok(())
}

fn render(snapshot: &SnapshotFile, limit: Option<usize>) -> String {
    let mut table = ValueTable::default();
    table.merge_snapshot(&snapshot.table);
    let rows = table.sorted_rows();

    let mut out = format!(
        "Trial {} exported at {} ({} states)\n\n",
        snapshot.trial,
        snapshot.exported_at.to_rfc3339(),
        rows.len()
    );
    out.push_str(&format!("{:<55} {:<8}", "STATE", "BEST"));
    for action in Action::ALL {
        out.push_str(&format!(" {:>8}", action.as_str()));
    }
    out.push('\n');

    for (state, values) in rows.iter().take(limit.unwrap_or(usize::MAX)) {
        out.push_str(&format!(
            "{:<55} {:<8}",
            state.to_string(),
            values.best_action().as_str()
        ));
        for (_, value) in values.iter() {
            out.push_str(&format!(" {value:>8.2}"));
        }
        out.push('\n');
    }

    if let Some(limit) = limit {
        if rows.len() > limit {
            out.push_str(&format!("... {} more\n", rows.len() - limit));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcab_rl::StateKey;

    fn snapshot() -> SnapshotFile {
        let mut table = ValueTable::default();
        for key in StateKey::all().take(3) {
            table.set(key, Action::Right, 4.0);
        }
        SnapshotFile {
            trial: 9,
            exported_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            table: table.snapshot(),
        }
    }

    #[test]
    fn test_render_lists_best_actions() {
        let out = render(&snapshot(), None);

        assert!(out.starts_with("Trial 9 exported at 2024-05-01T12:00:00+00:00 (3 states)"));
        assert_eq!(out.lines().filter(|l| l.contains("oncoming:")).count(), 3);
        for line in out.lines().filter(|l| l.contains("oncoming:")) {
            assert!(line.contains(" right "));
            assert!(line.contains("4.00"));
        }
    }

    #[test]
    fn test_render_respects_limit() {
        let out = render(&snapshot(), Some(1));

        assert_eq!(out.lines().filter(|l| l.contains("oncoming:")).count(), 1);
        assert!(out.ends_with("... 2 more\n"));
    }
}
