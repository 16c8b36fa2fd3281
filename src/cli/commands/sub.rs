//! `institrack sub` command - Submission management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use miette::{bail, IntoDiagnostic, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::filters::CollectionFilter;
use crate::cli::helpers::{open_engine, resolve_key};
use crate::cli::output::{print_details, print_submission, print_submissions};
use crate::cli::OutputFormat;
use crate::core::entity::Status;
use crate::core::team::Action;
use crate::entities::submission::{Course, FieldUpdate, Submission, SubmissionFields};

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Create a new submission in the pending collection
    New(NewArgs),

    /// List submissions with filtering
    List(ListArgs),

    /// Show a submission's details
    Show(ShowArgs),

    /// Change fields of a submission without moving it
    Edit(EditArgs),
}

/// Field flags shared by `new`, `edit` and `resubmit`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Institution name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Institution type (e.g. Engineering, Medical)
    #[arg(long = "type")]
    pub institution_type: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    /// Year of establishment
    #[arg(long)]
    pub established: Option<String>,

    #[arg(long)]
    pub affiliation: Option<String>,

    /// Hostel facilities (e.g. yes/no or a description)
    #[arg(long)]
    pub hostel: Option<String>,

    /// Mess facilities
    #[arg(long)]
    pub mess: Option<String>,

    /// Admission fees
    #[arg(long)]
    pub fees: Option<f64>,

    /// REAP percentile required
    #[arg(long)]
    pub reap_percentile: Option<String>,

    #[arg(long)]
    pub placement_records: Option<f64>,

    #[arg(long)]
    pub average_package: Option<f64>,

    #[arg(long)]
    pub highest_package: Option<f64>,

    /// Course as name:placementStats:cutoff (repeatable)
    #[arg(long = "course")]
    pub courses: Vec<Course>,

    /// File holding text extracted from the institution's PDF
    #[arg(long)]
    pub pdf_text: Option<PathBuf>,

    /// YAML file with submission fields (flags override it)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Contents accepted by `--file`
#[derive(Debug, Default, Deserialize)]
struct FieldFile {
    #[serde(flatten)]
    fields: SubmissionFields,
    #[serde(default)]
    courses: Vec<Course>,
}

impl FieldArgs {
    fn load_file(&self) -> Result<Option<FieldFile>> {
        match &self.file {
            Some(path) => Ok(Some(crate::yaml::parse_yaml_file(path)?)),
            None => Ok(None),
        }
    }

    /// Field changes requested by the flags, on top of `--file` if given
    pub fn update(&self) -> Result<FieldUpdate> {
        let mut update = match self.load_file()? {
            Some(file) => FieldUpdate::from(file.fields),
            None => FieldUpdate::default(),
        };

        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }
        set(&mut update.institution_name, &self.name);
        set(&mut update.location, &self.location);
        set(&mut update.institution_type, &self.institution_type);
        set(&mut update.website_link, &self.website);
        set(&mut update.established, &self.established);
        set(&mut update.affiliation, &self.affiliation);
        set(&mut update.hostel_facilities, &self.hostel);
        set(&mut update.mess_facilities, &self.mess);
        set(&mut update.admission_fees, &self.fees);
        set(&mut update.reap_percentile_required, &self.reap_percentile);
        set(&mut update.placement_records, &self.placement_records);
        set(&mut update.average_package, &self.average_package);
        set(&mut update.highest_package, &self.highest_package);

        if let Some(path) = &self.pdf_text {
            let text = std::fs::read_to_string(path)
                .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
            update.pdf_content = Some(text);
        }
        Ok(update)
    }

    /// Replacement course list; `None` keeps the current one
    pub fn courses(&self, clear: bool) -> Result<Option<Vec<Course>>> {
        if !self.courses.is_empty() {
            return Ok(Some(self.courses.clone()));
        }
        if let Some(file) = self.load_file()? {
            if !file.courses.is_empty() {
                return Ok(Some(file.courses));
            }
        }
        Ok(clear.then(Vec::new))
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Collection to list
    #[arg(value_enum, default_value_t = CollectionFilter::Pending)]
    pub collection: CollectionFilter,

    /// Case-insensitive match on institution name or location
    #[arg(long)]
    pub search: Option<String>,

    /// Show count only
    #[arg(long)]
    pub count: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Submission key (or unique prefix)
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Submission key (or unique prefix)
    pub key: String,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Remove all courses
    #[arg(long, conflicts_with = "courses")]
    pub courses_clear: bool,
}

/// Run a sub command
pub fn run(cmd: SubCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SubCommands::New(args) => run_new(args, global),
        SubCommands::List(args) => run_list(args, global),
        SubCommands::Show(args) => run_show(args, global),
        SubCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    engine.authorize(Action::Submit).into_diagnostic()?;

    let update = args.fields.update()?;
    let mut fields = update.applied_to(&SubmissionFields::default());
    let mut courses = args.fields.courses(false)?.unwrap_or_default();

    if args.interactive {
        run_wizard(&mut fields, &mut courses)?;
    }

    let mut submission = Submission::create(fields, courses).into_diagnostic()?;
    submission.pdf_content = update.pdf_content;
    let submission = engine.submit_record(submission).into_diagnostic()?;

    if global.format == OutputFormat::Id {
        println!("{}", submission.key_id);
        return Ok(());
    }
    println!(
        "{} Submitted {} {}",
        style("✓").green(),
        style(&submission.key_id).cyan(),
        style(submission.title()).yellow()
    );
    println!("   Awaiting review in {}", style(Status::Pending).dim());
    Ok(())
}

fn run_wizard(fields: &mut SubmissionFields, courses: &mut Vec<Course>) -> Result<()> {
    let theme = ColorfulTheme::default();

    let prompt = |label: &str, current: &str| -> Result<String> {
        Input::<String>::with_theme(&theme)
            .with_prompt(label)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()
    };

    fields.institution_name = Input::<String>::with_theme(&theme)
        .with_prompt("Institution name")
        .with_initial_text(fields.institution_name.as_str())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Institution name is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()?;
    fields.location = prompt("Location", &fields.location)?;
    fields.institution_type = prompt("Type", &fields.institution_type)?;
    fields.website_link = prompt("Website", &fields.website_link)?;
    fields.established = prompt("Established", &fields.established)?;
    fields.affiliation = prompt("Affiliation", &fields.affiliation)?;
    fields.hostel_facilities = prompt("Hostel facilities", &fields.hostel_facilities)?;
    fields.mess_facilities = prompt("Mess facilities", &fields.mess_facilities)?;

    let fees = prompt(
        "Admission fees",
        &fields.admission_fees.map(|f| f.to_string()).unwrap_or_default(),
    )?;
    fields.admission_fees = parse_optional_number("Admission fees", &fees)?;
    fields.reap_percentile_required =
        prompt("REAP percentile required", &fields.reap_percentile_required)?;

    while Confirm::with_theme(&theme)
        .with_prompt("Add a course?")
        .default(courses.is_empty())
        .interact()
        .into_diagnostic()?
    {
        let name = prompt("  Course name", "")?;
        if name.trim().is_empty() {
            break;
        }
        let stats = prompt("  Placement stats", "")?;
        let cutoff = prompt("  Cutoff", "")?;
        courses.push(Course::new(name.trim(), stats.trim(), cutoff.trim()));
    }

    Ok(())
}

fn parse_optional_number(label: &str, input: &str) -> Result<Option<f64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse() {
        Ok(n) => Ok(Some(n)),
        Err(_) => bail!("{} must be a number, got '{}'", label, input),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;

    // "all" means every collection this role may see
    let statuses = match (args.collection, engine.role()) {
        (CollectionFilter::All, Some(role)) => role.visible_collections(),
        (collection, _) => collection.statuses(),
    };

    let mut records: Vec<(Status, Submission)> = Vec::new();
    for status in statuses {
        let subs = engine.list(status).into_diagnostic()?;
        records.extend(subs.into_iter().map(|s| (status, s)));
    }

    if let Some(search) = &args.search {
        let needle = search.to_lowercase();
        records.retain(|(_, s)| {
            s.fields.institution_name.to_lowercase().contains(&needle)
                || s.fields.location.to_lowercase().contains(&needle)
        });
    }

    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    let table = matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv);
    if table && console::user_attended() {
        if let Some(role) = engine.role() {
            println!("{}", style(role.title()).bold());
        }
    }
    if records.is_empty() && table {
        if console::user_attended() {
            println!("No {} submissions found.", args.collection);
        }
        return Ok(());
    }

    print_submissions(&records, global.format)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;
    let key = resolve_key(&engine, &args.key)?;

    let Some((status, sub)) = engine.find(&key).into_diagnostic()? else {
        bail!("Submission {} not found", key);
    };

    match global.format {
        OutputFormat::Auto => {
            print_details(status, &sub);
            Ok(())
        }
        format => print_submission(status, &sub, format),
    }
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    let key = resolve_key(&engine, &args.key)?;

    let update = args.fields.update()?;
    let courses = args.fields.courses(args.courses_clear)?;
    if update.is_empty() && courses.is_none() {
        bail!("Nothing to change. Pass field flags, --course, --courses-clear or --file");
    }

    let (status, sub) = engine.edit(&key, &update, courses).into_diagnostic()?;
    println!(
        "{} Updated {} in {}",
        style("✓").green(),
        style(&sub.key_id).cyan(),
        style(status).dim()
    );
    Ok(())
}
