// Text posted on pull requests: titles, bodies, manual instructions, summaries

use super::types::{BackportBranch, ConflictReason, TargetBranch};
use crate::github::CreatedProposal;
use std::fmt::Write;

pub fn proposal_title(target: &TargetBranch, title: &str) -> String {
    format!("[{target}] Backport {title}")
}

pub fn proposal_body(change: u64, target: &TargetBranch) -> String {
    format!("Backport #{change} to {target}.")
}

/// Inputs for the manual backport recipe
#[derive(Debug, Clone, Copy)]
pub struct ManualInstructions<'a> {
    pub clone_url: &'a str,
    pub change: u64,
    pub title: &'a str,
    pub commits: &'a [String],
    pub target: &'a TargetBranch,
    pub backport_branch: &'a BackportBranch,
}

impl ManualInstructions<'_> {
    /// Renders the command sequence a maintainer runs to finish the backport
    /// by hand, followed by the pull request fields to use.
    pub fn render(&self) -> String {
        let target = self.target;
        let head = self.backport_branch;
        let change = self.change;

        let mut text = String::new();
        let _ = writeln!(text, "Run:");
        let _ = writeln!(text, "```");
        let _ = writeln!(text, "git clone {}", self.clone_url);
        let _ = writeln!(text, "git fetch origin pull/{change}/head:pr-{change}");
        let _ = writeln!(text, "git checkout -b {target} origin/{target}");
        let _ = writeln!(text, "git checkout -b {head}");
        let _ = writeln!(
            text,
            "# One or more of the following commands will fail, you will need to fix the conflict manually"
        );
        for commit in self.commits {
            let _ = writeln!(text, "git cherry-pick {commit}");
        }
        let _ = writeln!(text, "# Once all commits have been cherry-picked:");
        let _ = writeln!(text, "git push --set-upstream origin {head}");
        let _ = writeln!(text, "```");
        let _ = writeln!(
            text,
            "To fix the conflict, first check which file is impacted using: `git status`"
        );
        let _ = writeln!(
            text,
            "For each file with a resolved conflict, execute: `git add $FILE`"
        );
        let _ = writeln!(
            text,
            "Then, commit the files using the same commit message as the original commit: `git commit -m \"...\"`"
        );
        let _ = writeln!(text);
        let _ = writeln!(text, "Once done and pushed, open the pull request.");
        let _ = writeln!(text);
        let _ = writeln!(text, "* Title: {}", proposal_title(target, self.title));
        let _ = writeln!(text, "* Message: {}", proposal_body(change, target));
        let _ = writeln!(text, "* ⚡ **Set the target branch to {target}**");
        let _ = writeln!(text, "* Set the milestone and the labels if needed");
        text
    }
}

/// Comment posted when a target branch needs a manual backport
pub fn conflict_comment(instructions: &ManualInstructions<'_>, reason: &ConflictReason) -> String {
    let target = instructions.target;
    let headline = match reason {
        ConflictReason::MergeConflict { commit, files } if files.is_empty() => {
            format!("Cannot backport to {target} due to merge conflicts on commit {commit}.")
        }
        ConflictReason::MergeConflict { commit, files } => format!(
            "Cannot backport to {target} due to merge conflicts on commit {commit} in {}.",
            files.join(", ")
        ),
        ConflictReason::Local { message } => {
            format!("Cannot backport to {target} automatically: {message}.")
        }
    };

    format!(
        "{headline} Please backport manually:\n{}",
        instructions.render()
    )
}

/// Comment listing the backport pull requests opened by a run.
///
/// Returns `None` when nothing was opened.
pub fn summary_comment(proposals: &[&CreatedProposal], repository_html_url: &str) -> Option<String> {
    if proposals.is_empty() {
        return None;
    }

    let mut text = String::from("Created Backports:\n");
    for proposal in proposals {
        let _ = writeln!(
            text,
            "- #{} to [{}]({}/tree/{})",
            proposal.number, proposal.head_ref, repository_html_url, proposal.base_ref
        );
    }
    Some(text)
}
