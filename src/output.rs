use clap::ValueEnum;
use colored::Colorize;

use crate::error::Result;
use crate::metrics::{FilteredReport, IssueMetrics, PeriodStats, PeriodSummary, ProjectReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

fn hours(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.2}h"))
}

pub fn truncate_key(key: &str, max_len: usize) -> String {
    if key.chars().count() > max_len {
        let truncated: String = key.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        key.to_string()
    }
}

fn print_ticket_row(ticket: &IssueMetrics) {
    println!(
        "{:14} {:>12} {:>12} {:>12}",
        truncate_key(&ticket.ticket_key, 14),
        hours(ticket.time_in_progress_hours),
        hours(ticket.time_in_review_hours),
        hours(ticket.lead_time_hours)
    );
}

fn print_ticket_table(tickets: &[IssueMetrics]) {
    println!(
        "{:14} {:>12} {:>12} {:>12}",
        "TICKET", "PROGRESS", "REVIEW", "LEAD"
    );
    println!("{}", "-".repeat(53));
    for ticket in tickets {
        print_ticket_row(ticket);
    }
}

fn print_stats(stats: &PeriodStats) {
    println!("  tickets: {}", stats.ticket_count);
    println!(
        "  in progress: {:.2}h ({:.2}d)",
        stats.avg_time_in_progress_hours, stats.avg_time_in_progress_days
    );
    println!(
        "  in review:   {:.2}h ({:.2}d)",
        stats.avg_time_in_review_hours, stats.avg_time_in_review_days
    );
    println!(
        "  lead time:   {:.2}h ({:.2}d)",
        stats.avg_lead_time_hours, stats.avg_lead_time_days
    );
}

fn print_periods(periods: &[PeriodSummary]) {
    println!(
        "{:10} {:>7} {:>10} {:>10} {:>10}",
        "PERIOD", "TICKETS", "PROGRESS", "REVIEW", "LEAD"
    );
    println!("{}", "-".repeat(51));
    for summary in periods {
        let stats = &summary.stats;
        println!(
            "{:10} {:>7} {:>9.2}h {:>9.2}h {:>9.2}h",
            summary.period,
            stats.ticket_count,
            stats.avg_time_in_progress_hours,
            stats.avg_time_in_review_hours,
            stats.avg_lead_time_hours
        );
    }
}

pub fn print_ticket(ticket: &IssueMetrics, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(ticket)?),
        Format::Pretty => {
            println!("{}", ticket.ticket_key.bold());
            println!("  in progress: {}", hours(ticket.time_in_progress_hours));
            println!("  in review:   {}", hours(ticket.time_in_review_hours));
            match ticket.lead_time_hours {
                Some(_) => println!("  lead time:   {}", hours(ticket.lead_time_hours)),
                None => println!("  lead time:   {}", "not done".yellow()),
            }
        }
        Format::Minimal => print_ticket_row(ticket),
    }
    Ok(())
}

pub fn print_project(report: &ProjectReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            println!("{}", "Summary".bold());
            print_stats(&report.summary);
            println!();
            println!("{}", "Tickets".bold());
            print_ticket_table(&report.tickets);
        }
        Format::Minimal => print_ticket_table(&report.tickets),
    }
    Ok(())
}

pub fn print_filtered(report: &FilteredReport, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Pretty => {
            println!("{}", "Summary".bold());
            if let Some(ref assignee) = report.summary.assignee_name {
                println!("  assignee: {assignee}");
            }
            if let Some(start) = report.summary.start_date {
                println!("  from: {}", start.to_rfc3339());
            }
            if let Some(end) = report.summary.end_date {
                println!("  to:   {}", end.to_rfc3339());
            }
            print_stats(&report.summary.stats);

            if let Some(ref breakdown) = report.period_breakdown {
                println!();
                println!("{}", format!("Breakdown ({})", breakdown.granularity).bold());
                print_periods(&breakdown.periods);
            }

            if !report.data_quality.is_empty() {
                println!();
                println!(
                    "{}",
                    format!(
                        "excluded: {} not done, {} outside window",
                        report.data_quality.incomplete_issues, report.data_quality.outside_window
                    )
                    .dimmed()
                );
            }

            println!();
            println!("{}", "Tickets".bold());
            print_ticket_table(&report.tickets);
        }
        Format::Minimal => match report.period_breakdown {
            Some(ref breakdown) => print_periods(&breakdown.periods),
            None => print_ticket_table(&report.tickets),
        },
    }
    Ok(())
}
