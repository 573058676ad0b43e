//! Interactive wizard driven by `dialoguer` prompts.
//!
//! Walks the same state machine as the `analyze` subcommand, one step at a
//! time, printing each step's outputs and letting the user move forward,
//! go back or restart.

use std::path::{Path, PathBuf};

use avm_analysis::AnalysisConfig;
use avm_analysis_models::{GroupLookup, Observation, Projection, ProximityContext};
use avm_catastro::DatasetStore;
use avm_cli_utils::MultiProgress;
use avm_report::format_currency;
use avm_wizard::{ChartRenderer, Step, Wizard, WizardError};
use dialoguer::{Input, Select};

use crate::render::JsonRenderer;

/// What the user can do once a step's outputs are shown.
enum Navigation {
    Continue,
    Back,
    Restart,
    Exit,
}

impl Navigation {
    const fn label(&self) -> &'static str {
        match self {
            Self::Continue => "Continuar",
            Self::Back => "Volver",
            Self::Restart => "Reiniciar",
            Self::Exit => "Salir",
        }
    }
}

/// Runs the wizard until the user exits.
///
/// # Errors
///
/// Returns an error if a prompt cannot read from the terminal. Loading
/// failures and wizard errors inside a step are printed and the user is
/// asked again.
pub async fn run(
    multi: &MultiProgress,
    data_dir: Option<&Path>,
    config: AnalysisConfig,
    charts_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("AVM Bogotá");
    println!();

    let mut wizard = Wizard::new(config, JsonRenderer::new(charts_dir));

    loop {
        let outcome = match wizard.step() {
            Step::Loading => {
                let loaded = crate::load_store(multi, data_dir).await;
                finish_loading(&mut wizard, loaded, retry_loading)?
            }
            Step::SelectLocality => select_locality(&mut wizard)?,
            Step::SelectBlock => select_block(&mut wizard)?,
            step => {
                print_step(&wizard, step);
                navigate(&mut wizard, step)?
            }
        };

        match outcome {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(e) => recover(&mut wizard, &e),
        }
    }
}

type StepOutcome = Result<bool, WizardError>;

/// Hands a loading attempt to the wizard. A failed load is reported, the
/// wizard stays at [`Step::Loading`] and `retry` decides whether to try
/// again or exit.
fn finish_loading<R: ChartRenderer, E: std::fmt::Display>(
    wizard: &mut Wizard<R>,
    loaded: Result<DatasetStore, E>,
    retry: impl FnOnce() -> Result<bool, Box<dyn std::error::Error>>,
) -> Result<StepOutcome, Box<dyn std::error::Error>> {
    match loaded {
        Ok(store) => Ok(wizard.load(store).map(|()| true)),
        Err(e) => {
            log::error!("Dataset loading failed: {e}");
            println!("⚠ No se pudieron cargar los datos: {e}");
            Ok(Ok(retry()?))
        }
    }
}

fn retry_loading() -> Result<bool, Box<dyn std::error::Error>> {
    let options = ["Reintentar", "Salir"];
    let idx = Select::new()
        .with_prompt("¿Qué desea hacer?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(idx == 0)
}

/// Prints a wizard error and follows a guard's fallback.
fn recover<R: ChartRenderer>(wizard: &mut Wizard<R>, error: &WizardError) {
    println!("⚠ {error}");
    if let WizardError::MissingSelection { fallback, .. } = error {
        while wizard.step() > *fallback {
            let previous = Step::all()
                .iter()
                .rev()
                .copied()
                .find(|s| s < &wizard.step() && wizard.step().can_go_to(*s));
            match previous {
                Some(step) if wizard.go_to(step).is_ok() => {}
                _ => {
                    wizard.reset();
                    return;
                }
            }
        }
    }
}

fn select_locality(
    wizard: &mut Wizard<JsonRenderer>,
) -> Result<StepOutcome, Box<dyn std::error::Error>> {
    let Some(store) = wizard.store() else {
        return Ok(Err(WizardError::NotLoaded));
    };
    let mut names: Vec<String> = store.localities().iter().map(|l| l.name.clone()).collect();
    names.sort();

    let mut options: Vec<String> = names.clone();
    options.push("Seleccionar por coordenadas".to_string());
    options.push("Salir".to_string());

    let idx = Select::new()
        .with_prompt(Step::SelectLocality.title())
        .items(&options)
        .default(0)
        .interact()?;

    let selected = if idx < names.len() {
        wizard.select_locality(&names[idx]).map(|s| s.name.clone())
    } else if idx == names.len() {
        let input: String = Input::new()
            .with_prompt("Longitud, latitud")
            .interact_text()?;
        match parse_coordinate(&input) {
            Some((lng, lat)) => wizard.select_locality_at(lng, lat).map(|s| s.name.clone()),
            None => {
                println!("Coordenada no válida: {input}");
                return Ok(Ok(true));
            }
        }
    } else {
        return Ok(Ok(false));
    };

    Ok(selected.and_then(|name| {
        println!("Localidad seleccionada: {name}");
        wizard.confirm_locality().map(|()| true)
    }))
}

fn parse_coordinate(input: &str) -> Option<(f64, f64)> {
    let (lng, lat) = input.split_once(',')?;
    Some((lng.trim().parse().ok()?, lat.trim().parse().ok()?))
}

fn select_block(
    wizard: &mut Wizard<JsonRenderer>,
) -> Result<StepOutcome, Box<dyn std::error::Error>> {
    if let Some(frame) = wizard.frame() {
        println!(
            "{} manzanas en {}; categorías de uso:",
            frame.blocks().len(),
            frame.locality().name
        );
        for (land_use, color) in frame.colors().entries() {
            println!("  {color}  {land_use}");
        }
    }

    let options = ["Ingresar código de manzana", "Volver", "Salir"];
    let idx = Select::new()
        .with_prompt(Step::SelectBlock.title())
        .items(&options)
        .default(0)
        .interact()?;

    Ok(match idx {
        0 => {
            let id: String = Input::new()
                .with_prompt("Código de manzana (id_manzana_unif)")
                .interact_text()?;
            wizard
                .select_block(&id)
                .map(|_| ())
                .and_then(|()| wizard.go_to(Step::SpatialContext))
                .map(|()| true)
        }
        1 => wizard.go_to(Step::SelectLocality).map(|()| true),
        _ => Ok(false),
    })
}

fn navigate(
    wizard: &mut Wizard<JsonRenderer>,
    step: Step,
) -> Result<StepOutcome, Box<dyn std::error::Error>> {
    let mut choices = Vec::new();
    if step.next().is_some() {
        choices.push(Navigation::Continue);
    }
    choices.extend([Navigation::Back, Navigation::Restart, Navigation::Exit]);
    let labels: Vec<&str> = choices.iter().map(Navigation::label).collect();

    let idx = Select::new()
        .with_prompt("¿Qué desea hacer?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(match choices[idx] {
        Navigation::Continue => wizard.advance().map(|_| true),
        Navigation::Back => {
            let previous = Step::all()
                .iter()
                .rev()
                .copied()
                .find(|s| *s < step && step.can_go_to(*s))
                .unwrap_or(Step::Loading);
            wizard.go_to(previous).map(|()| true)
        }
        Navigation::Restart => {
            wizard.reset();
            Ok(true)
        }
        Navigation::Exit => Ok(false),
    })
}

fn print_step(wizard: &Wizard<JsonRenderer>, step: Step) {
    let session = wizard.session();
    println!();
    println!("== {} ==", step.title());

    match step {
        Step::SpatialContext => {
            if let Some(spatial) = &session.spatial {
                if let Some(c) = spatial.centroid {
                    println!("Centroide: {:.6}, {:.6}", c.lat, c.lon);
                }
                print_proximity("Transporte", &spatial.transit);
                print_proximity("Colegios", &spatial.schools);
            }
        }
        Step::Comparison => {
            if let Some(outputs) = &session.comparison {
                let c = &outputs.comparison;
                println!("Valor m²:            {}", format_currency(c.own_value.value_or_zero()));
                println!(
                    "{:<20} {} ({} manzanas)",
                    format!("{}:", c.area_scope.label()),
                    format_currency(c.area_average.value_or_zero()),
                    c.area_block_count
                );
                println!(
                    "Promedio {}m:       {} ({} manzanas)",
                    c.ring_radius_m,
                    format_currency(c.ring_average.value_or_zero()),
                    c.ring_block_count
                );
                println!(
                    "Uso predominante en {}m: {}",
                    outputs.usage_mix.radius_m,
                    outputs.usage_mix.majority_label()
                );
                for count in &outputs.usage_mix.counts {
                    println!("  {:<30} {}", count.land_use.label(), count.count);
                }
                match &outputs.projection {
                    Projection::Complete { points } => {
                        for p in points {
                            println!("  {}: {}", p.period, format_currency(p.value));
                        }
                    }
                    Projection::Incomplete { missing } => {
                        println!("Proyección incompleta ({} periodos sin dato)", missing.len());
                    }
                }
            }
        }
        Step::Security => {
            if let Some(security) = &session.security {
                match &security.snapshot {
                    Observation::Observed(s) => println!(
                        "{}: {} delitos, riesgo {}",
                        s.locality_name, s.crime_count, s.risk_level
                    ),
                    Observation::NoData => println!("Sin datos de seguridad"),
                }
                for row in &security.ranking {
                    let marker = if row.is_current { "▶" } else { " " };
                    println!("{marker} {:<28} {:>7}", row.locality_name, row.crime_count);
                }
            }
        }
        Step::Report => {
            if let Some(report) = &session.report {
                for (label, value) in report.summary.rows() {
                    println!("{label:<16} {value}");
                }
                for section in &report.sections {
                    println!();
                    println!("{}", section.title);
                    println!("{}", section.text);
                }
                if let Err(e) = crate::write_output(wizard, Some(Path::new("informe.json"))) {
                    println!("⚠ {e}");
                } else {
                    println!();
                    println!("Informe guardado en informe.json");
                }
            }
        }
        Step::Loading | Step::SelectLocality | Step::SelectBlock => {}
    }

    for (kind, chart) in session.charts.iter() {
        if let Some(location) = &chart.location {
            log::debug!("{kind} chart at {location}");
        }
    }
}

fn print_proximity(label: &str, context: &ProximityContext) {
    let status = match &context.lookup {
        GroupLookup::NoAccessId => "sin grupo de acceso".to_string(),
        GroupLookup::Unmatched { access_id } => format!("grupo {access_id} sin coincidencias"),
        GroupLookup::Matched { access_id, sites } => {
            format!("grupo {access_id}, {sites} registros")
        }
    };
    println!(
        "{label}: {} puntos en el radio de {}m ({status})",
        context.points.len(),
        context.radius_m
    );
}
