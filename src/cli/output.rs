//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{format_short_id, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entity::Status;
use crate::entities::submission::Submission;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Tsv
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// One line of tabular output
#[derive(Debug, Serialize)]
struct Row<'a> {
    key: &'a str,
    collection: Status,
    institution: &'a str,
    location: &'a str,
    #[serde(rename = "type")]
    institution_type: &'a str,
    fees: Option<f64>,
    courses: usize,
    comment: &'a str,
}

impl<'a> Row<'a> {
    fn new(status: Status, sub: &'a Submission) -> Self {
        Self {
            key: sub.key_id.as_str(),
            collection: status,
            institution: &sub.fields.institution_name,
            location: &sub.fields.location,
            institution_type: &sub.fields.institution_type,
            fees: sub.fields.admission_fees,
            courses: sub.courses.len(),
            comment: sub.rejection_comment.as_deref().unwrap_or(""),
        }
    }
}

/// Print a list of submissions in `format`
pub fn print_submissions(records: &[(Status, Submission)], format: OutputFormat) -> Result<()> {
    match effective_format(format, true) {
        OutputFormat::Yaml => {
            let subs: Vec<&Submission> = records.iter().map(|(_, s)| s).collect();
            print!("{}", serde_yml::to_string(&subs).into_diagnostic()?);
        }
        OutputFormat::Json => {
            let subs: Vec<&Submission> = records.iter().map(|(_, s)| s).collect();
            println!("{}", serde_json::to_string_pretty(&subs).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for (_, sub) in records {
                println!("{}", sub.key_id);
            }
        }
        OutputFormat::Csv => write_delimited(records, b',')?,
        OutputFormat::Tsv | OutputFormat::Auto if console::user_attended() => print_table(records),
        OutputFormat::Tsv | OutputFormat::Auto => write_delimited(records, b'\t')?,
    }
    Ok(())
}

/// Print a single submission in `format`
pub fn print_submission(status: Status, sub: &Submission, format: OutputFormat) -> Result<()> {
    match effective_format(format, false) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(sub).into_diagnostic()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(sub).into_diagnostic()?),
        OutputFormat::Id => println!("{}", sub.key_id),
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Auto => {
            return print_submissions(&[(status, sub.clone())], format);
        }
    }
    Ok(())
}

fn write_delimited(records: &[(Status, Submission)], delimiter: u8) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(stdout.lock());
    for (status, sub) in records {
        writer.serialize(Row::new(*status, sub)).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn print_table(records: &[(Status, Submission)]) {
    // Column widths: KEY(16), STATUS(10), INSTITUTION(32), LOCATION(20), FEES(10)
    println!(
        "{:<16} {:<10} {:<32} {:<20} {:>10}",
        style("KEY").bold(),
        style("STATUS").bold(),
        style("INSTITUTION").bold(),
        style("LOCATION").bold(),
        style("FEES").bold()
    );
    println!("{}", "-".repeat(92));

    for (status, sub) in records {
        let fees = sub
            .fields
            .admission_fees
            .map(|f| format!("{}", f))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<10} {:<32} {:<20} {:>10}",
            format_short_id(&sub.key_id),
            status_styled(*status),
            truncate_str(sub.title(), 30),
            truncate_str(&sub.fields.location, 18),
            fees
        );
    }

    println!();
    println!("{} submission(s) found", style(records.len()).cyan());
}

/// Collection name colored by outcome
pub fn status_styled(status: Status) -> console::StyledObject<String> {
    let padded = format!("{:<10}", status);
    match status {
        Status::Pending => style(padded).yellow(),
        Status::Approved => style(padded).green(),
        Status::Rejected => style(padded).red(),
    }
}

/// Human readable detail view used by `sub show` on a terminal
pub fn print_details(status: Status, sub: &Submission) {
    fn line(label: &str, value: &str) {
        if !value.is_empty() {
            println!("{}: {}", style(label).bold(), value);
        }
    }
    fn number(label: &str, value: Option<f64>) {
        if let Some(v) = value {
            println!("{}: {}", style(label).bold(), v);
        }
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Key").bold(), style(sub.key_id.as_str()).cyan());
    println!("{}: {}", style("Institution").bold(), style(sub.title()).yellow());
    println!("{}: {}", style("Status").bold(), status_styled(status));
    println!("{}", style("─".repeat(60)).dim());

    let f = &sub.fields;
    line("Location", &f.location);
    line("Type", &f.institution_type);
    line("Website", &f.website_link);
    line("Established", &f.established);
    line("Affiliation", &f.affiliation);
    line("Hostel", &f.hostel_facilities);
    line("Mess", &f.mess_facilities);
    number("Admission fees", f.admission_fees);
    line("REAP percentile", &f.reap_percentile_required);
    number("Placement records", f.placement_records);
    number("Average package", f.average_package);
    number("Highest package", f.highest_package);

    if !sub.courses.is_empty() {
        println!();
        println!("{}", style("Courses:").bold());
        for course in &sub.courses {
            println!(
                "  • {}  {}  {}",
                course.name,
                style(&course.placement_stats).dim(),
                style(&course.cutoff).dim()
            );
        }
    }

    if let Some(comment) = &sub.rejection_comment {
        println!();
        println!("{} {}", style("Rejection:").red().bold(), comment);
    }

    if let Some(pdf) = &sub.pdf_content {
        println!();
        println!(
            "{} {} characters of extracted text",
            style("PDF:").bold(),
            pdf.chars().count()
        );
    }

    println!("{}", style("─".repeat(60)).dim());
    if let Some(at) = sub.submitted_at {
        println!("{}: {}", style("Submitted").dim(), at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(at) = sub.updated_at {
        println!("{}: {}", style("Updated").dim(), at.format("%Y-%m-%d %H:%M"));
    }
}
