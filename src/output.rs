use colored::Colorize;

use crate::domain::{PendingBattle, Summary};
use crate::history::{BattleRecord, WizardReport};
use crate::services::SimulationReport;
use crate::stats::RankedItem;

pub fn print_battle(battle: &PendingBattle, left_label: &str, right_label: &str) {
    println!("{}", "Next battle".bold());
    println!("  {} {}", "left: ".cyan(), left_label);
    println!("  {} {}", "right:".cyan(), right_label);
    println!("Resolve with `pick left` or `pick right` ({} vs {})", battle.left, battle.right);
}

pub fn print_exhausted() {
    println!("{}", "Every pair has been battled. Nothing left to compare.".green());
}

pub fn print_result(record: &BattleRecord) {
    let (winner, loser) = if record.winner == record.left {
        (&record.stats_a, &record.stats_b)
    } else {
        (&record.stats_b, &record.stats_a)
    };

    println!(
        "{} beats {}",
        record.winner.as_str().green().bold(),
        record.loser.as_str().red()
    );
    println!(
        "  {}: {:.1} -> {:.1} (#{} -> #{})",
        record.winner,
        winner.rating_before,
        winner.rating_after,
        winner.rank_before,
        winner.rank_after
    );
    println!(
        "  {}: {:.1} -> {:.1} (#{} -> #{})",
        record.loser, loser.rating_before, loser.rating_after, loser.rank_before, loser.rank_after
    );
    if record.close_fight {
        println!("  {}", "close fight".yellow());
    }
}

pub fn print_ranking(rows: &[RankedItem]) {
    println!(
        "{}",
        format!(
            "{:>4}  {:<40} {:>8} {:>7} {:>5} {:>5}",
            "#", "item", "rating", "rd", "won", "lost"
        )
        .bold()
    );
    for row in rows {
        let line = format!(
            "{:>4}  {:<40} {:>8.1} {:>7.1} {:>5} {:>5}",
            row.position,
            truncate(&row.name, 40),
            row.displayed_rating,
            row.state.rd,
            row.state.wins,
            row.state.losses
        );
        if row.state.battles == 0 {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
}

/// Most recent entries first, numbered by their position in the history.
pub fn print_history(entries: &[BattleRecord], limit: usize) {
    if entries.is_empty() {
        println!("No battles yet.");
        return;
    }

    for (index, entry) in entries.iter().enumerate().rev().take(limit) {
        let marker = if entry.close_fight { "*".yellow() } else { " ".normal() };
        println!(
            "{:>5}{} {}  {} > {}",
            index,
            marker,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.winner.as_str().green(),
            entry.loser
        );
    }
}

pub fn print_wizard(report: &WizardReport) {
    let status = if report.converged {
        "converged".green()
    } else {
        "stopped at the pass limit".yellow()
    };
    println!(
        "Wizard: {} passes, {} rank changes, {}",
        report.iterations, report.total_changes, status
    );
}

pub fn print_simulation(report: &SimulationReport) {
    println!(
        "Simulated {}/{} battles{}",
        report.resolved,
        report.requested,
        if report.failed > 0 { format!(", {} failed", report.failed) } else { String::new() }
    );
    if report.exhausted {
        print_exhausted();
    }
}

pub fn print_summary(user: &str, summary: &Summary) {
    println!("{} {}", "Summary for".bold(), user.bold());
    println!("  items:              {}", summary.items);
    println!("  battles:            {}", summary.total_battles);
    println!("  battles per item:   {:.2}", summary.average_battles_per_item);
    println!(
        "  pairs completed:    {}/{} ({:.1}%)",
        summary.completed_pairs, summary.possible_pairs, summary.completion_percent
    );
    println!("  history entries:    {}", summary.history_entries);
    println!("  undo available:     {}", summary.undo_depth);
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
