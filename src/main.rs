use miette::{GraphicalReportHandler, GraphicalTheme, IntoDiagnostic, Report, miette};
use rust_decimal::Decimal;
use rustyline::DefaultEditor;
use seqcalc::{AtomicDatabase, IsotopeLabelType};
use std::{env, fs, io, sync::LazyLock};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use transitions::{LibraryMatch, MassCalcs, SrmSettings, TransitionError, TransitionGroup, pick_transitions};

static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

/// Reads precursors like `PEPTIDE`, `PEPTIDEK 3`, or `PEPTIDEK 2 heavy` and lists the transitions picked for them.
/// A trailing `*` lists every measurable transition instead of only those the filter accepts. Settings are read from
/// the KDL file given as the first argument, or the bundled defaults otherwise
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let settings = match load_settings(env::args().nth(1)) {
        Ok(settings) => settings,
        Err(report) => return render_error(&report),
    };
    let calcs = match MassCalcs::new(&DB, &settings) {
        Ok(calcs) => calcs,
        Err(error) => return render_error(&report(error)),
    };

    let Ok(mut rl) = DefaultEditor::new() else {
        return eprintln!("failed to start an interactive prompt");
    };
    while let Ok(line) = rl.readline("Precursor: ") {
        if let Err(error) = rl.add_history_entry(&line) {
            warn!(%error, "failed to add {line:?} to the prompt history");
        }
        match transition_info(&settings, &calcs, &line) {
            Ok(info) => print!("{info}"),
            Err(report) => render_error(&report),
        }
    }
}

fn load_settings(path: Option<String>) -> miette::Result<SrmSettings> {
    let Some(path) = path else {
        return Ok(SrmSettings::default());
    };
    let kdl = fs::read_to_string(&path).into_diagnostic()?;
    SrmSettings::from_kdl(&DB, &path, kdl)
}

fn transition_info(settings: &SrmSettings, calcs: &MassCalcs, line: &str) -> miette::Result<String> {
    let mut words: Vec<_> = line.split_whitespace().collect();
    let use_filter = words.last() != Some(&"*");
    if !use_filter {
        words.pop();
    }
    let [peptide, rest @ ..] = words.as_slice() else {
        return Ok(String::new());
    };

    let charges = match rest.first() {
        Some(charge) => vec![charge.parse::<u32>().map_err(|_| miette!("{:?} is not a precursor charge", charge))?],
        None => settings.filter.precursor_charges().to_vec(),
    };
    let label_type = match rest.get(1) {
        Some(&name) => calcs
            .label_types()
            .find(|label_type| label_type.name() == name)
            .cloned()
            .ok_or_else(|| miette!("the settings have no label type named {:?}", name))?,
        None => IsotopeLabelType::light(),
    };

    let mut lines = Vec::new();
    for charge in charges {
        let group = TransitionGroup::new(*peptide, charge, label_type.clone()).map_err(report)?;
        let precursor_mz = calcs.precursor_mz(&group, None).map_err(report)?;
        let nodes = pick_transitions(
            &group,
            settings,
            calcs,
            None,
            precursor_mz,
            LibraryMatch::Unavailable,
            use_filter,
        )
        .map_err(report)?;

        lines.push(format!(
            "{peptide} ({label_type}, {charge}+) m/z: {}",
            rounded(precursor_mz, 6)
        ));
        for node in nodes {
            let label = node.transition.label(group.len());
            let loss = if node.losses.is_some() {
                format!(" -{}", rounded(node.lost_mass(), 4))
            } else {
                String::new()
            };
            lines.push(format!("  {label}{loss}: {}", rounded(node.ion_mz(), 6)));
        }
        lines.push(String::new());
    }
    Ok(lines.join("\n") + "\n")
}

fn report(error: Box<TransitionError>) -> Report {
    Report::new(*error)
}

fn render_error(report: &Report) {
    let mut buf = String::new();
    match GraphicalReportHandler::new_themed(GraphicalTheme::unicode()).render_report(&mut buf, &**report) {
        Ok(()) => println!("{buf}"),
        Err(_) => println!("{report}"),
    }
}

fn rounded(value: f64, decimal_points: u32) -> String {
    Decimal::try_from(value).map_or_else(|_| value.to_string(), |value| value.round_dp(decimal_points).to_string())
}
